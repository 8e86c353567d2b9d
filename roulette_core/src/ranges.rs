//! Difficulty → amount ranges.
//!
//! The table is fixed: six difficulty levels for each of the two measure
//! types. It is not user-editable.

use crate::{Difficulty, MeasureType};

/// Inclusive amount range
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AmountRange {
    pub min: u32,
    pub max: u32,
}

impl AmountRange {
    const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, amount: u32) -> bool {
        (self.min..=self.max).contains(&amount)
    }
}

/// Look up the amount range for an exercise of the given kind
pub const fn amount_range(measure_type: MeasureType, difficulty: Difficulty) -> AmountRange {
    match (measure_type, difficulty) {
        (MeasureType::Reps, Difficulty::Extreme) => AmountRange::new(10, 25),
        (MeasureType::Reps, Difficulty::Difficile) => AmountRange::new(7, 15),
        (MeasureType::Reps, Difficulty::Moyen) => AmountRange::new(6, 9),
        (MeasureType::Reps, Difficulty::Facile) => AmountRange::new(5, 8),
        (MeasureType::Reps, Difficulty::Primaire) => AmountRange::new(3, 5),
        (MeasureType::Reps, Difficulty::Nouveau) => AmountRange::new(3, 3),

        (MeasureType::TimeSeconds, Difficulty::Extreme) => AmountRange::new(60, 120),
        (MeasureType::TimeSeconds, Difficulty::Difficile) => AmountRange::new(45, 90),
        (MeasureType::TimeSeconds, Difficulty::Moyen) => AmountRange::new(30, 60),
        (MeasureType::TimeSeconds, Difficulty::Facile) => AmountRange::new(20, 45),
        (MeasureType::TimeSeconds, Difficulty::Primaire) => AmountRange::new(15, 30),
        (MeasureType::TimeSeconds, Difficulty::Nouveau) => AmountRange::new(15, 15),
    }
}
