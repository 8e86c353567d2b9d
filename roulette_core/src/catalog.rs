//! The user's exercise catalog.
//!
//! Holds exercise definitions in insertion order and guarantees identifier
//! uniqueness. Persistence lives behind [`crate::store::ExerciseStore`]; the
//! catalog is the in-memory copy the session filters from.

use crate::{Error, Exercise, Result};
use std::collections::HashSet;

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    exercises: Vec<Exercise>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from stored records
    ///
    /// Records repeating an earlier identifier are dropped with a warning so a
    /// damaged store never yields an ambiguous catalog.
    pub fn from_exercises(exercises: Vec<Exercise>) -> Self {
        let mut catalog = Self::new();
        for exercise in exercises {
            if catalog.contains(&exercise.id) {
                tracing::warn!("Dropping duplicate exercise id {}", exercise.id);
                continue;
            }
            catalog.exercises.push(exercise);
        }
        catalog
    }

    pub fn insert(&mut self, exercise: Exercise) -> Result<()> {
        if self.contains(&exercise.id) {
            return Err(Error::Validation(format!(
                "Exercise id '{}' already exists",
                exercise.id
            )));
        }
        tracing::info!("Added exercise '{}' [{}]", exercise.name, exercise.tag);
        self.exercises.push(exercise);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<Exercise> {
        let idx = self
            .exercises
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let removed = self.exercises.remove(idx);
        tracing::info!("Removed exercise '{}'", removed.name);
        Ok(removed)
    }

    pub fn get(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Exercise> {
        self.exercises.iter()
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Distinct tags in first-seen order
    pub fn tags(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.exercises
            .iter()
            .filter(|e| seen.insert(e.tag.as_str()))
            .map(|e| e.tag.clone())
            .collect()
    }

    /// Validate the catalog, returning a list of problems
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut ids = HashSet::new();

        for exercise in &self.exercises {
            if !ids.insert(exercise.id.as_str()) {
                errors.push(format!("Duplicate exercise id '{}'", exercise.id));
            }
            if exercise.id.trim().is_empty() {
                errors.push(format!("Exercise '{}' has an empty id", exercise.name));
            }
            if exercise.name.trim().is_empty() {
                errors.push(format!("Exercise '{}' has an empty name", exercise.id));
            }
            if exercise.tag.trim().is_empty() {
                errors.push(format!("Exercise '{}' has an empty tag", exercise.id));
            }
        }

        errors
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Exercise;
    type IntoIter = std::slice::Iter<'a, Exercise>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Difficulty, MeasureType};

    fn exercise(id: &str, name: &str, tag: &str) -> Exercise {
        Exercise {
            id: id.into(),
            name: name.into(),
            tag: tag.into(),
            difficulty: Difficulty::Moyen,
            measure_type: MeasureType::Reps,
        }
    }

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let mut catalog = Catalog::new();
        catalog.insert(exercise("1", "Pompes", "bras")).unwrap();
        let err = catalog.insert(exercise("1", "Squats", "jambes")).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_remove_unknown_is_not_found() {
        let mut catalog = Catalog::new();
        assert!(matches!(catalog.remove("nope"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_remove_keeps_order_of_the_rest() {
        let mut catalog = Catalog::from_exercises(vec![
            exercise("1", "Pompes", "bras"),
            exercise("2", "Squats", "jambes"),
            exercise("3", "Dips", "bras"),
        ]);
        let removed = catalog.remove("2").unwrap();
        assert_eq!(removed.name, "Squats");
        let ids: Vec<_> = catalog.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_tags_are_distinct_in_first_seen_order() {
        let catalog = Catalog::from_exercises(vec![
            exercise("1", "Pompes", "bras"),
            exercise("2", "Squats", "jambes"),
            exercise("3", "Dips", "bras"),
            exercise("4", "Crunch", "abdos"),
        ]);
        assert_eq!(catalog.tags(), vec!["bras", "jambes", "abdos"]);
    }

    #[test]
    fn test_from_exercises_drops_duplicates() {
        let catalog = Catalog::from_exercises(vec![
            exercise("1", "Pompes", "bras"),
            exercise("1", "Copy", "bras"),
        ]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("1").unwrap().name, "Pompes");
        assert!(catalog.validate().is_empty());
    }

    #[test]
    fn test_validate_reports_blank_fields() {
        let catalog = Catalog::from_exercises(vec![exercise("1", " ", "")]);
        let errors = catalog.validate();
        assert_eq!(errors.len(), 2, "{:?}", errors);
    }
}
