//! In-memory log of completed exercises for the current session.
//!
//! Entries are keyed by exercise identifier and only ever accumulate; the
//! whole log can be cleared but individual entries are never removed. The
//! log is not persisted.

use crate::MeasureType;
use chrono::{DateTime, Utc};

/// Accumulated completions of one exercise
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionLogEntry {
    pub exercise_id: String,
    /// Name at the time of the first completion
    pub name: String,
    pub total_amount: u64,
    pub count: u32,
    pub measure_type: MeasureType,
    pub first_completed_at: DateTime<Utc>,
}

/// Totals derived from the log
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub total_reps: u64,
    pub total_seconds: u64,
    pub completions: u32,
    pub unique_exercises: usize,
}

#[derive(Clone, Debug, Default)]
pub struct SessionLog {
    entries: Vec<SessionLogEntry>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completion
    ///
    /// An existing entry keeps its name and measure type; only the total and
    /// count move.
    pub fn record_completion(
        &mut self,
        exercise_id: &str,
        exercise_name: &str,
        amount: u32,
        measure_type: MeasureType,
    ) -> &SessionLogEntry {
        let idx = match self.entries.iter().position(|e| e.exercise_id == exercise_id) {
            Some(idx) => {
                let entry = &mut self.entries[idx];
                entry.total_amount += u64::from(amount);
                entry.count += 1;
                idx
            }
            None => {
                self.entries.push(SessionLogEntry {
                    exercise_id: exercise_id.to_string(),
                    name: exercise_name.to_string(),
                    total_amount: u64::from(amount),
                    count: 1,
                    measure_type,
                    first_completed_at: Utc::now(),
                });
                self.entries.len() - 1
            }
        };

        let entry = &self.entries[idx];
        tracing::debug!(
            "Logged {} x{} (total {} over {} completions)",
            entry.name,
            amount,
            entry.total_amount,
            entry.count
        );
        entry
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        tracing::info!("Clearing session log ({} entries)", self.entries.len());
        self.entries.clear();
    }

    /// Entries in order of first completion
    pub fn entries(&self) -> &[SessionLogEntry] {
        &self.entries
    }

    pub fn get(&self, exercise_id: &str) -> Option<&SessionLogEntry> {
        self.entries.iter().find(|e| e.exercise_id == exercise_id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn stats(&self) -> SessionStats {
        self.entries
            .iter()
            .fold(SessionStats::default(), |mut stats, entry| {
                match entry.measure_type {
                    MeasureType::Reps => stats.total_reps += entry.total_amount,
                    MeasureType::TimeSeconds => stats.total_seconds += entry.total_amount,
                }
                stats.completions += entry.count;
                stats.unique_exercises += 1;
                stats
            })
    }
}
