//! Spin → present → complete/skip session state machine.
//!
//! The session owns the catalog copy, the tag filter, the current selection
//! and the session log. Time never passes on its own: callers report the
//! current instant to every transition and call [`Session::advance`] when a
//! deadline from [`Session::next_deadline`] is reached. At most one timer
//! exists at a time and it lives inside the state it belongs to, so replacing
//! the state cancels it.
//!
//! ```text
//!   Idle ──spin──▶ Spinning ──delay elapsed──▶ Presenting
//!                     ▲                            │
//!                     └──── complete / skip ───────┘
//! ```

use crate::achievements::{Achievement, AchievementTracker};
use crate::config::SessionConfig;
use crate::filter::{filter_exercises, TagFilter};
use crate::selector::select;
use crate::session_log::{SessionLog, SessionLogEntry, SessionStats};
use crate::{Catalog, Exercise, MeasureType, SelectionResult};
use chrono::Utc;
use rand::Rng;
use std::time::{Duration, Instant};

/// Timing parameters for a session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionTiming {
    pub spin_delay: Duration,
    pub countdown_tick: Duration,
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            spin_delay: Duration::from_millis(2000),
            countdown_tick: Duration::from_millis(1000),
        }
    }
}

impl From<&SessionConfig> for SessionTiming {
    fn from(config: &SessionConfig) -> Self {
        Self {
            spin_delay: config.spin_delay(),
            countdown_tick: config.countdown_tick(),
        }
    }
}

/// A pending spin timer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerHandle {
    id: u64,
    deadline: Instant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CountdownClock {
    Running { next_tick: Instant },
    Paused { left_in_tick: Duration },
}

/// Countdown for a timed selection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Countdown {
    remaining_secs: u32,
    clock: CountdownClock,
}

#[derive(Clone, Debug)]
enum SessionState {
    Idle,
    Spinning {
        timer: TimerHandle,
    },
    Presenting {
        selection: SelectionResult,
        countdown: Option<Countdown>,
    },
}

/// Coarse state for display
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Spinning,
    Presenting,
}

/// Result of asking for a spin
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpinOutcome {
    Started,
    /// A spin is already pending; nothing changed
    AlreadySpinning,
    /// The filters leave nothing to pick from; nothing changed
    NoEligibleExercises,
}

/// Something that happened during a transition, for the presentation layer
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Spin(SpinOutcome),
    Presented(SelectionResult),
    /// The spin delay elapsed but the filters changed meanwhile and left
    /// nothing eligible
    SpinAbandoned,
    CountdownTick { remaining_secs: u32 },
    CountdownPaused,
    CountdownResumed,
    Completed {
        exercise_id: String,
        name: String,
        amount: u32,
        measure_type: MeasureType,
    },
    Skipped { exercise_id: String },
    LogCleared,
    FilterChanged { eligible: usize },
    AchievementUnlocked { id: &'static str, title: &'static str },
    ExerciseAdded(Exercise),
    ExerciseDeleted { id: String },
    /// The exercise store failed; nothing in memory changed
    StorageFailed(String),
    /// Input was refused (validation, unknown id)
    Rejected(String),
}

/// Countdown state as shown to the user
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CountdownView {
    pub remaining_secs: u32,
    pub paused: bool,
}

/// Everything the presentation layer needs after a state change
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub phase: Phase,
    pub eligible_count: usize,
    pub selection: Option<SelectionResult>,
    pub countdown: Option<CountdownView>,
    pub log: Vec<SessionLogEntry>,
    pub stats: SessionStats,
    pub achievements: Vec<Achievement>,
}

pub struct Session {
    catalog: Catalog,
    filter: TagFilter,
    timing: SessionTiming,
    state: SessionState,
    log: SessionLog,
    achievements: AchievementTracker,
    next_timer_id: u64,
}

impl Session {
    pub fn new(catalog: Catalog, filter: TagFilter, timing: SessionTiming) -> Self {
        Self {
            catalog,
            filter,
            timing,
            state: SessionState::Idle,
            log: SessionLog::new(),
            achievements: AchievementTracker::new(),
            next_timer_id: 0,
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Mutable catalog access; the in-flight selection is a copy and is not
    /// affected by edits.
    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    pub fn filter(&self) -> &TagFilter {
        &self.filter
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            SessionState::Idle => Phase::Idle,
            SessionState::Spinning { .. } => Phase::Spinning,
            SessionState::Presenting { .. } => Phase::Presenting,
        }
    }

    /// Exercises passing the current filters, in catalog order
    pub fn eligible(&self) -> Vec<Exercise> {
        filter_exercises(&self.catalog, &self.filter)
    }

    pub fn eligible_count(&self) -> usize {
        self.catalog.iter().filter(|e| self.filter.accepts(e)).count()
    }

    pub fn selection(&self) -> Option<&SelectionResult> {
        match &self.state {
            SessionState::Presenting { selection, .. } => Some(selection),
            _ => None,
        }
    }

    pub fn pending_timer(&self) -> Option<TimerHandle> {
        match self.state {
            SessionState::Spinning { timer } => Some(timer),
            _ => None,
        }
    }

    pub fn countdown(&self) -> Option<CountdownView> {
        match &self.state {
            SessionState::Presenting {
                countdown: Some(c), ..
            } => Some(CountdownView {
                remaining_secs: c.remaining_secs,
                paused: matches!(c.clock, CountdownClock::Paused { .. }),
            }),
            _ => None,
        }
    }

    /// The next instant at which [`Session::advance`] has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::Spinning { timer } => Some(timer.deadline),
            SessionState::Presenting { countdown, .. } => match countdown {
                Some(Countdown {
                    clock: CountdownClock::Running { next_tick },
                    ..
                }) => Some(*next_tick),
                _ => None,
            },
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let stats = self.log.stats();
        Snapshot {
            phase: self.phase(),
            eligible_count: self.eligible_count(),
            selection: self.selection().cloned(),
            countdown: self.countdown(),
            log: self.log.entries().to_vec(),
            stats,
            achievements: self.achievements.view(&stats),
        }
    }

    // ------------------------------------------------------------------
    // Filters
    // ------------------------------------------------------------------

    pub fn set_include_tag(&mut self, tag: Option<String>) -> SessionEvent {
        self.filter.set_include(tag);
        tracing::info!("Include tag set to {:?}", self.filter.include);
        SessionEvent::FilterChanged {
            eligible: self.eligible_count(),
        }
    }

    pub fn toggle_exclude_tag(&mut self, tag: &str) -> SessionEvent {
        let excluded = self.filter.toggle_exclude(tag);
        tracing::info!(
            "Tag '{}' {}",
            tag,
            if excluded { "excluded" } else { "re-included" }
        );
        SessionEvent::FilterChanged {
            eligible: self.eligible_count(),
        }
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Start a spin
    ///
    /// Refused while a spin is pending or when nothing is eligible; a
    /// presented selection is discarded without being logged.
    pub fn spin(&mut self, now: Instant) -> SpinOutcome {
        if let SessionState::Spinning { .. } = self.state {
            tracing::debug!("Spin ignored: already spinning");
            return SpinOutcome::AlreadySpinning;
        }

        if self.eligible_count() == 0 {
            tracing::warn!("Spin refused: no eligible exercises");
            return SpinOutcome::NoEligibleExercises;
        }

        self.next_timer_id += 1;
        let timer = TimerHandle {
            id: self.next_timer_id,
            deadline: now + self.timing.spin_delay,
        };
        self.state = SessionState::Spinning { timer };
        tracing::debug!("Spin timer {} armed for {:?}", timer.id, self.timing.spin_delay);
        SpinOutcome::Started
    }

    /// Log the presented selection and spin again
    pub fn complete(&mut self, now: Instant) -> Vec<SessionEvent> {
        let selection = match self.take_selection() {
            Some(selection) => selection,
            None => {
                tracing::debug!("Complete ignored: nothing presented");
                return Vec::new();
            }
        };

        let exercise = &selection.exercise;
        self.log.record_completion(
            &exercise.id,
            &exercise.name,
            selection.amount,
            exercise.measure_type,
        );
        tracing::info!("Completed {}", selection);

        let mut events = vec![SessionEvent::Completed {
            exercise_id: exercise.id.clone(),
            name: exercise.name.clone(),
            amount: selection.amount,
            measure_type: exercise.measure_type,
        }];

        let stats = self.log.stats();
        events.extend(
            self.achievements
                .update(&stats, Utc::now())
                .into_iter()
                .map(|def| SessionEvent::AchievementUnlocked {
                    id: def.id,
                    title: def.title,
                }),
        );

        events.push(SessionEvent::Spin(self.spin(now)));
        events
    }

    /// Drop the presented selection without logging and spin again
    pub fn skip(&mut self, now: Instant) -> Vec<SessionEvent> {
        let selection = match self.take_selection() {
            Some(selection) => selection,
            None => {
                tracing::debug!("Skip ignored: nothing presented");
                return Vec::new();
            }
        };
        tracing::info!("Skipped {}", selection);

        vec![
            SessionEvent::Skipped {
                exercise_id: selection.exercise.id,
            },
            SessionEvent::Spin(self.spin(now)),
        ]
    }

    pub fn clear_log(&mut self) -> SessionEvent {
        self.log.clear();
        SessionEvent::LogCleared
    }

    pub fn pause_countdown(&mut self, now: Instant) -> Option<SessionEvent> {
        let countdown = self.countdown_mut()?;
        match countdown.clock {
            CountdownClock::Running { next_tick } => {
                countdown.clock = CountdownClock::Paused {
                    left_in_tick: next_tick.saturating_duration_since(now),
                };
                tracing::debug!("Countdown paused at {}s", countdown.remaining_secs);
                Some(SessionEvent::CountdownPaused)
            }
            CountdownClock::Paused { .. } => None,
        }
    }

    pub fn resume_countdown(&mut self, now: Instant) -> Option<SessionEvent> {
        let countdown = self.countdown_mut()?;
        match countdown.clock {
            CountdownClock::Paused { left_in_tick } => {
                countdown.clock = CountdownClock::Running {
                    next_tick: now + left_in_tick,
                };
                tracing::debug!("Countdown resumed at {}s", countdown.remaining_secs);
                Some(SessionEvent::CountdownResumed)
            }
            CountdownClock::Running { .. } => None,
        }
    }

    /// Fire every timer due at `now`
    ///
    /// An elapsed spin runs the selector against the eligible set as it is
    /// now, not as it was when the spin started. An elapsed countdown
    /// completes the selection.
    pub fn advance<R: Rng + ?Sized>(&mut self, now: Instant, rng: &mut R) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        if let SessionState::Spinning { timer } = self.state {
            if now < timer.deadline {
                return events;
            }
            tracing::debug!("Spin timer {} elapsed", timer.id);

            let eligible = self.eligible();
            if eligible.is_empty() {
                tracing::warn!("Spin abandoned: no eligible exercises left");
                self.state = SessionState::Idle;
                events.push(SessionEvent::SpinAbandoned);
                return events;
            }

            match select(&eligible, rng) {
                Ok(selection) => {
                    let countdown = match selection.exercise.measure_type {
                        MeasureType::TimeSeconds => Some(Countdown {
                            remaining_secs: selection.amount,
                            clock: CountdownClock::Running {
                                next_tick: now + self.timing.countdown_tick,
                            },
                        }),
                        MeasureType::Reps => None,
                    };
                    tracing::info!("Presenting {}", selection);
                    events.push(SessionEvent::Presented(selection.clone()));
                    self.state = SessionState::Presenting {
                        selection,
                        countdown,
                    };
                }
                Err(e) => {
                    tracing::warn!("Spin abandoned: {}", e);
                    self.state = SessionState::Idle;
                    events.push(SessionEvent::SpinAbandoned);
                }
            }
            return events;
        }

        let tick = self.timing.countdown_tick;
        let mut finished = false;
        if let Some(countdown) = self.countdown_mut() {
            while let CountdownClock::Running { next_tick } = countdown.clock {
                if now < next_tick || countdown.remaining_secs == 0 {
                    break;
                }
                countdown.remaining_secs -= 1;
                countdown.clock = CountdownClock::Running {
                    next_tick: next_tick + tick,
                };
                events.push(SessionEvent::CountdownTick {
                    remaining_secs: countdown.remaining_secs,
                });
            }
            finished = countdown.remaining_secs == 0;
        }

        if finished {
            tracing::debug!("Countdown elapsed");
            events.extend(self.complete(now));
        }
        events
    }

    fn take_selection(&mut self) -> Option<SelectionResult> {
        match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::Presenting { selection, .. } => Some(selection),
            other => {
                self.state = other;
                None
            }
        }
    }

    fn countdown_mut(&mut self) -> Option<&mut Countdown> {
        match &mut self.state {
            SessionState::Presenting {
                countdown: Some(c), ..
            } => Some(c),
            _ => None,
        }
    }
}
