//! Tag filtering of the exercise catalog.
//!
//! An exercise is eligible when it matches the include tag (if any) and its
//! tag is not in the exclude set. Include matching always ignores case and
//! surrounding whitespace; exclude matching follows [`TagMatch`].

use crate::Exercise;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How exclude tags are compared against an exercise's tag
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TagMatch {
    /// Trimmed, case-insensitive equality (same rule as the include tag)
    #[default]
    Normalized,
    /// Exact string equality
    Exact,
}

/// Current include/exclude tag selection
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagFilter {
    pub include: Option<String>,
    pub exclude: BTreeSet<String>,
    pub exclude_match: TagMatch,
}

impl TagFilter {
    pub fn new(exclude_match: TagMatch) -> Self {
        Self {
            exclude_match,
            ..Self::default()
        }
    }

    /// Set or clear the include tag. A blank tag clears it.
    pub fn set_include(&mut self, tag: Option<String>) {
        self.include = tag.filter(|t| !t.trim().is_empty());
    }

    /// Add the tag to the exclude set, or remove it if already present.
    /// Presence is judged with the same rule as [`TagMatch`] uses for matching.
    /// Returns true when the tag is excluded afterwards.
    pub fn toggle_exclude(&mut self, tag: &str) -> bool {
        let removed = match self.exclude_match {
            TagMatch::Exact => self.exclude.remove(tag),
            TagMatch::Normalized => {
                let wanted = normalize(tag);
                let before = self.exclude.len();
                self.exclude.retain(|t| normalize(t) != wanted);
                self.exclude.len() != before
            }
        };

        if removed {
            false
        } else {
            self.exclude.insert(tag.to_string());
            true
        }
    }

    /// Whether a single exercise passes both stages
    pub fn accepts(&self, exercise: &Exercise) -> bool {
        let included = match &self.include {
            Some(tag) => normalize(&exercise.tag) == normalize(tag),
            None => true,
        };

        let excluded = match self.exclude_match {
            TagMatch::Exact => self.exclude.contains(&exercise.tag),
            TagMatch::Normalized => {
                let tag = normalize(&exercise.tag);
                self.exclude.iter().any(|t| normalize(t) == tag)
            }
        };

        included && !excluded
    }
}

fn normalize(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// Reduce the catalog to eligible exercises, preserving catalog order
pub fn filter_exercises<'a, I>(catalog: I, filter: &TagFilter) -> Vec<Exercise>
where
    I: IntoIterator<Item = &'a Exercise>,
{
    catalog
        .into_iter()
        .filter(|e| filter.accepts(e))
        .cloned()
        .collect()
}
