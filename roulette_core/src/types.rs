//! Core domain types for the Roulette system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Difficulty levels and measure types
//! - Exercise definitions as stored in the catalog
//! - Selection results produced by a spin

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Difficulty and Measure Types
// ============================================================================

/// Difficulty of an exercise, ordered from easiest to hardest
#[derive(
    Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Nouveau,
    Primaire,
    Facile,
    #[default]
    Moyen,
    Difficile,
    Extreme,
}

impl Difficulty {
    /// All levels, easiest first
    pub const ALL: [Difficulty; 6] = [
        Difficulty::Nouveau,
        Difficulty::Primaire,
        Difficulty::Facile,
        Difficulty::Moyen,
        Difficulty::Difficile,
        Difficulty::Extreme,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Nouveau => "nouveau",
            Difficulty::Primaire => "primaire",
            Difficulty::Facile => "facile",
            Difficulty::Moyen => "moyen",
            Difficulty::Difficile => "difficile",
            Difficulty::Extreme => "extreme",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Difficulty::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == wanted)
            .ok_or_else(|| Error::Validation(format!("Unknown difficulty: {}", s)))
    }
}

/// Whether an exercise amount counts repetitions or seconds
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum MeasureType {
    #[default]
    #[serde(rename = "reps")]
    Reps,
    #[serde(rename = "time", alias = "time_seconds")]
    TimeSeconds,
}

impl MeasureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasureType::Reps => "reps",
            MeasureType::TimeSeconds => "time",
        }
    }

    /// Unit suffix used when displaying an amount
    pub fn unit(&self) -> &'static str {
        match self {
            MeasureType::Reps => "reps",
            MeasureType::TimeSeconds => "s",
        }
    }
}

impl fmt::Display for MeasureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeasureType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "reps" | "rep" | "r" => Ok(MeasureType::Reps),
            "time" | "seconds" | "secs" | "s" | "time_seconds" => Ok(MeasureType::TimeSeconds),
            other => Err(Error::Validation(format!("Unknown measure type: {}", other))),
        }
    }
}

// ============================================================================
// Exercise Types
// ============================================================================

/// An exercise definition owned by the catalog
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub tag: String,
    pub difficulty: Difficulty,
    /// Records written before timed exercises existed carry no measure type
    #[serde(default, alias = "measureType")]
    pub measure_type: MeasureType,
}

/// User-submitted exercise, before an identifier is assigned
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewExercise {
    pub name: String,
    pub tag: String,
    pub difficulty: Difficulty,
    pub measure_type: MeasureType,
}

impl NewExercise {
    /// Validate the submission and assign a fresh identifier
    ///
    /// Name and tag are trimmed; either being empty afterwards is rejected.
    pub fn into_exercise(self) -> Result<Exercise> {
        let name = self.name.trim();
        let tag = self.tag.trim();

        if name.is_empty() {
            return Err(Error::Validation("Exercise name must not be empty".into()));
        }
        if tag.is_empty() {
            return Err(Error::Validation("Exercise tag must not be empty".into()));
        }

        Ok(Exercise {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            tag: tag.to_string(),
            difficulty: self.difficulty,
            measure_type: self.measure_type,
        })
    }
}

// ============================================================================
// Selection Type
// ============================================================================

/// The outcome of a spin: one exercise and the amount to perform
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionResult {
    pub exercise: Exercise,
    pub amount: u32,
}

impl fmt::Display for SelectionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.exercise.name,
            self.amount,
            self.exercise.measure_type.unit()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_parses_case_insensitively() {
        assert_eq!("Facile".parse::<Difficulty>().unwrap(), Difficulty::Facile);
        assert_eq!(" EXTREME ".parse::<Difficulty>().unwrap(), Difficulty::Extreme);
        assert!("impossible".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_difficulty_is_ordered() {
        assert!(Difficulty::Nouveau < Difficulty::Primaire);
        assert!(Difficulty::Difficile < Difficulty::Extreme);
        let mut sorted = Difficulty::ALL;
        sorted.sort();
        assert_eq!(sorted, Difficulty::ALL);
    }

    #[test]
    fn test_default_difficulty_is_moyen() {
        assert_eq!(Difficulty::default(), Difficulty::Moyen);
    }

    #[test]
    fn test_legacy_record_defaults_to_reps() {
        let json = r#"{"id":"1","name":"Pompes","tag":"bras","difficulty":"facile"}"#;
        let exercise: Exercise = serde_json::from_str(json).unwrap();
        assert_eq!(exercise.measure_type, MeasureType::Reps);
    }

    #[test]
    fn test_time_measure_serializes_as_time() {
        let exercise = Exercise {
            id: "2".into(),
            name: "Gainage".into(),
            tag: "abdos".into(),
            difficulty: Difficulty::Moyen,
            measure_type: MeasureType::TimeSeconds,
        };
        let json = serde_json::to_string(&exercise).unwrap();
        assert!(json.contains(r#""measure_type":"time""#));

        let camel = r#"{"id":"2","name":"Gainage","tag":"abdos","difficulty":"moyen","measureType":"time"}"#;
        let parsed: Exercise = serde_json::from_str(camel).unwrap();
        assert_eq!(parsed, exercise);
    }

    #[test]
    fn test_new_exercise_trims_and_assigns_id() {
        let exercise = NewExercise {
            name: "  Squats ".into(),
            tag: " jambes".into(),
            difficulty: Difficulty::Primaire,
            measure_type: MeasureType::Reps,
        }
        .into_exercise()
        .unwrap();

        assert_eq!(exercise.name, "Squats");
        assert_eq!(exercise.tag, "jambes");
        assert!(!exercise.id.is_empty());
    }

    #[test]
    fn test_new_exercise_rejects_blank_fields() {
        let blank_name = NewExercise {
            name: "   ".into(),
            tag: "bras".into(),
            difficulty: Difficulty::Moyen,
            measure_type: MeasureType::Reps,
        };
        assert!(matches!(blank_name.into_exercise(), Err(Error::Validation(_))));

        let blank_tag = NewExercise {
            name: "Pompes".into(),
            tag: "".into(),
            difficulty: Difficulty::Moyen,
            measure_type: MeasureType::Reps,
        };
        assert!(matches!(blank_tag.into_exercise(), Err(Error::Validation(_))));
    }
}
