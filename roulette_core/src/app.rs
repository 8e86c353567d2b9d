//! Intent dispatch between a presentation layer, the session and the store.
//!
//! Catalog edits go to the store first and are applied in memory only once
//! the store accepted them. Failures are reported as events; dispatch itself
//! never fails.

use crate::session::{Session, SessionEvent, SessionTiming, Snapshot};
use crate::store::ExerciseStore;
use crate::{Catalog, Config, Error, Exercise, NewExercise, Result, TagFilter};
use rand::Rng;
use std::time::Instant;

/// A user request coming from the presentation layer
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    Spin,
    Complete,
    Skip,
    ClearLog,
    SetIncludeTag(Option<String>),
    ToggleExcludeTag(String),
    AddExercise(NewExercise),
    DeleteExercise(String),
    PauseCountdown,
    ResumeCountdown,
}

pub struct App<S: ExerciseStore> {
    session: Session,
    store: S,
}

impl<S: ExerciseStore> App<S> {
    /// Load the catalog from the store and start an idle session
    pub fn open(store: S, config: &Config) -> Result<Self> {
        let exercises = store.list().map_err(Error::into_storage)?;
        let catalog = Catalog::from_exercises(exercises);

        for problem in catalog.validate() {
            tracing::warn!("Catalog: {}", problem);
        }
        tracing::info!("Loaded {} exercises", catalog.len());

        let session = Session::new(
            catalog,
            TagFilter::new(config.filter.exclude_match),
            SessionTiming::from(&config.session),
        );
        Ok(Self { session, store })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn snapshot(&self) -> Snapshot {
        self.session.snapshot()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.session.next_deadline()
    }

    /// Apply one intent
    pub fn dispatch(&mut self, intent: Intent, now: Instant) -> Vec<SessionEvent> {
        tracing::debug!("Intent: {:?}", intent);
        match intent {
            Intent::Spin => vec![SessionEvent::Spin(self.session.spin(now))],
            Intent::Complete => self.session.complete(now),
            Intent::Skip => self.session.skip(now),
            Intent::ClearLog => vec![self.session.clear_log()],
            Intent::SetIncludeTag(tag) => vec![self.session.set_include_tag(tag)],
            Intent::ToggleExcludeTag(tag) => vec![self.session.toggle_exclude_tag(&tag)],
            Intent::PauseCountdown => self.session.pause_countdown(now).into_iter().collect(),
            Intent::ResumeCountdown => self.session.resume_countdown(now).into_iter().collect(),
            Intent::AddExercise(new) => match self.add_exercise(new) {
                Ok(exercise) => vec![SessionEvent::ExerciseAdded(exercise)],
                Err(e) => vec![failure_event(e)],
            },
            Intent::DeleteExercise(id) => match self.delete_exercise(&id) {
                Ok(removed) => vec![SessionEvent::ExerciseDeleted { id: removed.id }],
                Err(e) => vec![failure_event(e)],
            },
        }
    }

    /// Fire due timers
    pub fn advance<R: Rng + ?Sized>(&mut self, now: Instant, rng: &mut R) -> Vec<SessionEvent> {
        self.session.advance(now, rng)
    }

    /// Validate, persist, then add to the in-memory catalog
    pub fn add_exercise(&mut self, new: NewExercise) -> Result<Exercise> {
        let exercise = new.into_exercise()?;
        self.store.create(&exercise).map_err(Error::into_storage)?;
        self.session.catalog_mut().insert(exercise.clone())?;
        Ok(exercise)
    }

    /// Delete from the store, then from the in-memory catalog
    pub fn delete_exercise(&mut self, id: &str) -> Result<Exercise> {
        if !self.session.catalog().contains(id) {
            return Err(Error::NotFound(id.to_string()));
        }
        self.store.delete(id).map_err(Error::into_storage)?;
        self.session.catalog_mut().remove(id)
    }
}

fn failure_event(error: Error) -> SessionEvent {
    match error {
        Error::Storage(msg) => {
            tracing::warn!("Storage failure, keeping in-memory state: {}", msg);
            SessionEvent::StorageFailed(msg)
        }
        other => {
            tracing::warn!("Rejected: {}", other);
            SessionEvent::Rejected(other.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Phase, SpinOutcome};
    use crate::store::MemoryStore;
    use crate::{Difficulty, MeasureType};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    fn pompes() -> Exercise {
        Exercise {
            id: "1".into(),
            name: "Pompes".into(),
            tag: "bras".into(),
            difficulty: Difficulty::Facile,
            measure_type: MeasureType::Reps,
        }
    }

    fn new_exercise(name: &str, tag: &str) -> NewExercise {
        NewExercise {
            name: name.into(),
            tag: tag.into(),
            difficulty: Difficulty::Moyen,
            measure_type: MeasureType::Reps,
        }
    }

    fn open(exercises: Vec<Exercise>) -> App<MemoryStore> {
        App::open(MemoryStore::with_exercises(exercises), &Config::default()).unwrap()
    }

    #[test]
    fn test_open_fails_when_store_fails() {
        let mut store = MemoryStore::new();
        store.set_failing(true);
        let result = App::open(store, &Config::default());
        assert!(matches!(result, Err(Error::Storage(_))));
    }

    #[test]
    fn test_add_exercise_persists_and_updates_catalog() {
        let mut app = open(vec![]);
        let events = app.dispatch(
            Intent::AddExercise(new_exercise("Squats", "jambes")),
            Instant::now(),
        );

        assert!(matches!(events.as_slice(), [SessionEvent::ExerciseAdded(_)]));
        assert_eq!(app.session().catalog().len(), 1);
        assert_eq!(app.store().list().unwrap().len(), 1);
        assert_eq!(app.session().catalog().tags(), vec!["jambes"]);
    }

    #[test]
    fn test_storage_failure_keeps_catalog() {
        let mut app = open(vec![pompes()]);
        app.store.set_failing(true);

        let events = app.dispatch(
            Intent::AddExercise(new_exercise("Squats", "jambes")),
            Instant::now(),
        );
        assert!(matches!(events.as_slice(), [SessionEvent::StorageFailed(_)]));
        assert_eq!(app.session().catalog().len(), 1);

        let events = app.dispatch(Intent::DeleteExercise("1".into()), Instant::now());
        assert!(matches!(events.as_slice(), [SessionEvent::StorageFailed(_)]));
        assert!(app.session().catalog().contains("1"));
    }

    #[test]
    fn test_invalid_exercise_is_rejected() {
        let mut app = open(vec![]);
        let events = app.dispatch(Intent::AddExercise(new_exercise("", "bras")), Instant::now());
        assert!(matches!(events.as_slice(), [SessionEvent::Rejected(_)]));
        assert!(app.store().list().unwrap().is_empty());
    }

    #[test]
    fn test_delete_unknown_is_rejected_without_store_call() {
        let mut app = open(vec![pompes()]);
        app.store.set_failing(true);
        let events = app.dispatch(Intent::DeleteExercise("9".into()), Instant::now());
        assert!(matches!(events.as_slice(), [SessionEvent::Rejected(_)]));
    }

    #[test]
    fn test_delete_removes_from_both() {
        let mut app = open(vec![pompes()]);
        let events = app.dispatch(Intent::DeleteExercise("1".into()), Instant::now());
        assert_eq!(events, vec![SessionEvent::ExerciseDeleted { id: "1".into() }]);
        assert!(app.session().catalog().is_empty());
        assert!(app.store().list().unwrap().is_empty());
    }

    #[test]
    fn test_excluded_catalog_spin_is_noop() {
        let mut app = open(vec![pompes()]);
        let now = Instant::now();
        app.dispatch(Intent::ToggleExcludeTag("bras".into()), now);

        let events = app.dispatch(Intent::Spin, now);
        assert_eq!(events, vec![SessionEvent::Spin(SpinOutcome::NoEligibleExercises)]);
        assert_eq!(app.snapshot().phase, Phase::Idle);
    }

    #[test]
    fn test_full_round_through_intents() {
        let mut app = open(vec![pompes()]);
        let mut rng = StdRng::seed_from_u64(5);
        let t0 = Instant::now();
        let delay = Duration::from_millis(2000);

        app.dispatch(Intent::Spin, t0);
        assert_eq!(app.next_deadline(), Some(t0 + delay));
        app.advance(t0 + delay, &mut rng);
        let first = app.snapshot().selection.unwrap().amount;

        app.dispatch(Intent::Complete, t0 + delay);
        app.advance(t0 + delay * 2, &mut rng);
        let second = app.snapshot().selection.unwrap().amount;
        app.dispatch(Intent::Complete, t0 + delay * 2);

        let snapshot = app.snapshot();
        assert_eq!(snapshot.log.len(), 1);
        assert_eq!(snapshot.log[0].exercise_id, "1");
        assert_eq!(snapshot.log[0].total_amount, u64::from(first + second));
        assert_eq!(snapshot.log[0].count, 2);

        app.dispatch(Intent::ClearLog, t0 + delay * 2);
        assert!(app.snapshot().log.is_empty());
    }
}
