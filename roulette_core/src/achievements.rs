//! Session achievements.
//!
//! Progress is derived from the session log's stats. Once an achievement is
//! unlocked it stays unlocked for the rest of the process, even if the log
//! is cleared afterwards.

use crate::session_log::SessionStats;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Grouping shown by the presentation layer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AchievementCategory {
    Reps,
    Variety,
    Time,
    Streak,
    Difficulty,
}

impl AchievementCategory {
    pub const ALL: [AchievementCategory; 5] = [
        AchievementCategory::Reps,
        AchievementCategory::Variety,
        AchievementCategory::Time,
        AchievementCategory::Streak,
        AchievementCategory::Difficulty,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementCategory::Reps => "reps",
            AchievementCategory::Variety => "variety",
            AchievementCategory::Time => "time",
            AchievementCategory::Streak => "streak",
            AchievementCategory::Difficulty => "difficulty",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            AchievementCategory::Reps => "Répétitions",
            AchievementCategory::Variety => "Variété",
            AchievementCategory::Time => "Temps",
            AchievementCategory::Streak => "Régularité",
            AchievementCategory::Difficulty => "Difficulté",
        }
    }
}

impl fmt::Display for AchievementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AchievementCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        AchievementCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| Error::Validation(format!("Unknown achievement category: {}", s)))
    }
}

/// Quantity an achievement is measured against
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AchievementMetric {
    Completions,
    UniqueExercises,
    TotalReps,
}

impl AchievementMetric {
    fn measure(&self, stats: &SessionStats) -> u64 {
        match self {
            AchievementMetric::Completions => u64::from(stats.completions),
            AchievementMetric::UniqueExercises => stats.unique_exercises as u64,
            AchievementMetric::TotalReps => stats.total_reps,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AchievementDef {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub requirement: u64,
    pub metric: AchievementMetric,
    pub category: AchievementCategory,
}

static DEFINITIONS: Lazy<Vec<AchievementDef>> = Lazy::new(|| {
    vec![
        AchievementDef {
            id: "first-workout",
            title: "Premier pas",
            description: "Complétez votre premier exercice",
            icon: "🎯",
            requirement: 1,
            metric: AchievementMetric::Completions,
            category: AchievementCategory::Reps,
        },
        AchievementDef {
            id: "variety-master",
            title: "Maître de la variété",
            description: "Essayez 10 exercices différents",
            icon: "🎨",
            requirement: 10,
            metric: AchievementMetric::UniqueExercises,
            category: AchievementCategory::Variety,
        },
        AchievementDef {
            id: "endurance-king",
            title: "Roi de l'endurance",
            description: "Accumulez 1000 répétitions",
            icon: "👑",
            requirement: 1000,
            metric: AchievementMetric::TotalReps,
            category: AchievementCategory::Reps,
        },
    ]
});

/// The built-in achievement table
pub fn definitions() -> &'static [AchievementDef] {
    &DEFINITIONS
}

/// An achievement with its current progress
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Achievement {
    pub id: &'static str,
    pub category: AchievementCategory,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub requirement: u64,
    pub progress: u64,
    pub unlocked_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default)]
pub struct AchievementTracker {
    unlocked: HashMap<&'static str, DateTime<Utc>>,
}

impl AchievementTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unlock whatever the stats now satisfy; returns the newly unlocked ones
    pub fn update(&mut self, stats: &SessionStats, now: DateTime<Utc>) -> Vec<&'static AchievementDef> {
        let mut newly = Vec::new();
        for def in definitions() {
            if self.unlocked.contains_key(def.id) {
                continue;
            }
            if def.metric.measure(stats) >= def.requirement {
                tracing::info!("Achievement unlocked: {}", def.title);
                self.unlocked.insert(def.id, now);
                newly.push(def);
            }
        }
        newly
    }

    /// All achievements with progress capped at their requirement
    pub fn view(&self, stats: &SessionStats) -> Vec<Achievement> {
        definitions()
            .iter()
            .map(|def| Achievement {
                id: def.id,
                category: def.category,
                title: def.title,
                description: def.description,
                icon: def.icon,
                requirement: def.requirement,
                progress: def.metric.measure(stats).min(def.requirement),
                unlocked_at: self.unlocked.get(def.id).copied(),
            })
            .collect()
    }
}

/// Achievements in `category`, or all of them when `None`, in table order
pub fn in_category(
    achievements: &[Achievement],
    category: Option<AchievementCategory>,
) -> Vec<&Achievement> {
    achievements
        .iter()
        .filter(|a| match category {
            Some(c) => a.category == c,
            None => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(completions: u32, unique: usize, reps: u64) -> SessionStats {
        SessionStats {
            total_reps: reps,
            total_seconds: 0,
            completions,
            unique_exercises: unique,
        }
    }

    #[test]
    fn test_definitions_are_unique() {
        let defs = definitions();
        assert_eq!(defs.len(), 3);
        let mut ids: Vec<_> = defs.iter().map(|d| d.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_first_completion_unlocks_first_workout() {
        let mut tracker = AchievementTracker::new();
        assert!(tracker.update(&stats(0, 0, 0), Utc::now()).is_empty());

        let newly = tracker.update(&stats(1, 1, 5), Utc::now());
        assert_eq!(newly.len(), 1);
        assert_eq!(newly[0].id, "first-workout");

        // not reported twice
        assert!(tracker.update(&stats(2, 1, 10), Utc::now()).is_empty());
    }

    #[test]
    fn test_unlock_survives_reset_stats() {
        let mut tracker = AchievementTracker::new();
        let newly = tracker.update(&stats(1, 1, 1000), Utc::now());
        assert!(newly.iter().any(|d| d.id == "endurance-king"));

        let view = tracker.view(&SessionStats::default());
        let king = view.iter().find(|a| a.id == "endurance-king").unwrap();
        assert!(king.unlocked_at.is_some());
        assert_eq!(king.progress, 0);
    }

    #[test]
    fn test_progress_is_capped() {
        let tracker = AchievementTracker::new();
        let view = tracker.view(&stats(40, 12, 50));
        let variety = view.iter().find(|a| a.id == "variety-master").unwrap();
        assert_eq!(variety.progress, 10);
        assert!(variety.unlocked_at.is_none());
    }

    #[test]
    fn test_category_filter_keeps_table_order() {
        let view = AchievementTracker::new().view(&SessionStats::default());

        let reps: Vec<_> = in_category(&view, Some(AchievementCategory::Reps))
            .iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(reps, vec!["first-workout", "endurance-king"]);

        assert_eq!(in_category(&view, None).len(), view.len());
        assert!(in_category(&view, Some(AchievementCategory::Streak)).is_empty());
    }

    #[test]
    fn test_category_parses_by_key() {
        assert_eq!(
            " Variety ".parse::<AchievementCategory>().unwrap(),
            AchievementCategory::Variety
        );
        assert_eq!(AchievementCategory::Time.label(), "Temps");
        assert!("speed".parse::<AchievementCategory>().is_err());
    }
}
