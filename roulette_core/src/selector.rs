//! Random selection of an exercise and an amount.
//!
//! Every eligible exercise has the same probability regardless of its tag or
//! difficulty. The amount is drawn uniformly from the inclusive range for
//! the exercise's (measure type, difficulty).

use crate::ranges::amount_range;
use crate::{Error, Exercise, Result, SelectionResult};
use rand::Rng;

/// Pick one exercise from `eligible` and an amount for it
///
/// Fails with [`Error::Precondition`] when `eligible` is empty; callers are
/// expected to check first.
pub fn select<R: Rng + ?Sized>(eligible: &[Exercise], rng: &mut R) -> Result<SelectionResult> {
    debug_assert!(!eligible.is_empty(), "select called with no eligible exercises");
    if eligible.is_empty() {
        return Err(Error::Precondition(
            "cannot select from an empty eligible set".into(),
        ));
    }

    let exercise = &eligible[rng.gen_range(0..eligible.len())];
    let amount = draw_amount(exercise, rng);

    tracing::debug!(
        "Selected '{}' ({}) x{} out of {} eligible",
        exercise.name,
        exercise.difficulty,
        amount,
        eligible.len()
    );

    Ok(SelectionResult {
        exercise: exercise.clone(),
        amount,
    })
}

/// Draw an amount for a single exercise
pub fn draw_amount<R: Rng + ?Sized>(exercise: &Exercise, rng: &mut R) -> u32 {
    let range = amount_range(exercise.measure_type, exercise.difficulty);
    rng.gen_range(range.min..=range.max)
}
