//! Countdown-driven playback of the exercise catalog.
//!
//! [`SessionController`] owns the catalog and the playback position. It is
//! fed user actions and one [`SessionController::tick`] per elapsed second,
//! speaks a cue whenever an exercise becomes current, and raises the
//! completion notifier once the last countdown reaches zero.

use serde::Serialize;

use crate::{
    Announcer, Catalog, CompletionNotifier, CompletionSummary, ExerciseDraft, ExerciseEntry,
    Result, WorkoutConfig,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlaybackPhase {
    Idle,
    Running,
    /// The notifier has fired; waiting for the user to acknowledge.
    Completed,
}

/// Position of the countdown within the catalog.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlaybackState {
    running: bool,
    current_index: usize,
    remaining_seconds: u32,
    total_remaining_seconds: u32,
}

impl PlaybackState {
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Seconds left in the current exercise.
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    /// Seconds left across the whole session.
    pub fn total_remaining_seconds(&self) -> u32 {
        self.total_remaining_seconds
    }
}

/// Serializable view of a session for status output.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot<'a> {
    pub phase: PlaybackPhase,
    pub locked: bool,
    pub playback: PlaybackState,
    pub exercises: &'a [ExerciseEntry],
}

impl SessionSnapshot<'_> {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// What a single tick did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Playback was not running.
    Ignored,
    /// The current exercise is still counting down.
    Counting { remaining_seconds: u32 },
    /// The next exercise became current and was announced.
    Advanced { index: usize },
    /// The last exercise finished and the notifier fired.
    Completed(CompletionSummary),
    /// Playback pointed outside the catalog and was stopped.
    Halted,
}

/// Single owner of the catalog and playback state.
#[derive(Debug)]
pub struct SessionController<A, N> {
    config: WorkoutConfig,
    catalog: Catalog,
    playback: PlaybackState,
    phase: PlaybackPhase,
    announcer: A,
    notifier: N,
}

impl<A: Announcer, N: CompletionNotifier> SessionController<A, N> {
    /// Builds an idle controller. Fails when `config` does not validate.
    pub fn new(config: WorkoutConfig, announcer: A, notifier: N) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            catalog: Catalog::new(config.durations),
            config,
            playback: PlaybackState::default(),
            phase: PlaybackPhase::Idle,
            announcer,
            notifier,
        })
    }

    pub fn config(&self) -> &WorkoutConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn announcer(&self) -> &A {
        &self.announcer
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        SessionSnapshot {
            phase: self.phase,
            locked: self.catalog.is_locked(),
            playback: self.playback,
            exercises: self.catalog.entries(),
        }
    }

    /// The exercise currently counting down, if playback is running.
    pub fn current_entry(&self) -> Option<&ExerciseEntry> {
        if self.playback.running {
            self.catalog.get(self.playback.current_index)
        } else {
            None
        }
    }

    /// A blank add-exercise input bound to this session's duration range.
    pub fn new_draft(&self) -> ExerciseDraft {
        ExerciseDraft::new(self.config.durations)
    }

    pub fn add(&mut self, name: &str, duration_seconds: u32) -> bool {
        self.catalog.add(name, duration_seconds)
    }

    /// Adds the drafted exercise and clears the draft's name on success.
    pub fn submit_draft(&mut self, draft: &mut ExerciseDraft) -> bool {
        let added = self.catalog.add(draft.name(), draft.duration_seconds());
        if added {
            draft.clear_name();
        }
        added
    }

    pub fn remove(&mut self, index: usize) -> bool {
        self.catalog.remove(index).is_some()
    }

    /// Saves the catalog for playback. Edits are refused until the session
    /// completes and is acknowledged.
    pub fn lock(&mut self) {
        if !self.catalog.is_locked() {
            tracing::info!(exercises = self.catalog.len(), "catalog locked");
        }
        self.catalog.lock();
    }

    /// Begins playback at the first exercise. Returns `false` when ignored.
    pub fn start(&mut self) -> bool {
        if self.phase != PlaybackPhase::Idle {
            tracing::debug!(phase = ?self.phase, "ignoring start");
            return false;
        }
        if !self.catalog.is_locked() || self.catalog.is_empty() {
            tracing::debug!(
                locked = self.catalog.is_locked(),
                exercises = self.catalog.len(),
                "catalog not ready, ignoring start"
            );
            return false;
        }

        self.playback = PlaybackState {
            running: true,
            current_index: 0,
            remaining_seconds: 0,
            total_remaining_seconds: self.catalog.total_duration(),
        };
        self.phase = PlaybackPhase::Running;
        self.enter_current();

        tracing::info!(
            exercises = self.catalog.len(),
            total_seconds = self.playback.total_remaining_seconds,
            "session started"
        );
        true
    }

    /// Consumes one elapsed second.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != PlaybackPhase::Running {
            return TickOutcome::Ignored;
        }
        if self.playback.current_index >= self.catalog.len() {
            tracing::warn!(
                index = self.playback.current_index,
                exercises = self.catalog.len(),
                "playback outside catalog, stopping"
            );
            self.stop();
            return TickOutcome::Halted;
        }

        let playback = &mut self.playback;
        if playback.remaining_seconds > 0 {
            playback.remaining_seconds -= 1;
            playback.total_remaining_seconds = playback.total_remaining_seconds.saturating_sub(1);
        }
        if playback.remaining_seconds > 0 {
            tracing::debug!(remaining = playback.remaining_seconds, "tick");
            return TickOutcome::Counting {
                remaining_seconds: playback.remaining_seconds,
            };
        }

        playback.current_index += 1;
        if playback.current_index < self.catalog.len() {
            let index = playback.current_index;
            self.enter_current();
            tracing::debug!(index, "advanced to next exercise");
            return TickOutcome::Advanced { index };
        }

        let summary = CompletionSummary {
            exercises: self.catalog.len(),
            total_seconds: self.catalog.total_duration(),
        };
        self.phase = PlaybackPhase::Completed;
        tracing::info!(
            exercises = summary.exercises,
            total_seconds = summary.total_seconds,
            "session completed"
        );
        self.notifier.workout_completed(&summary);
        self.stop();
        TickOutcome::Completed(summary)
    }

    /// Halts playback and rewinds to the first exercise. The catalog is kept.
    pub fn stop(&mut self) {
        let was_running = self.playback.running;
        self.playback = PlaybackState {
            running: false,
            current_index: 0,
            remaining_seconds: 0,
            total_remaining_seconds: self.catalog.total_duration(),
        };
        if self.phase == PlaybackPhase::Running {
            self.phase = PlaybackPhase::Idle;
        }
        self.announcer.cancel_all();

        if was_running && self.phase == PlaybackPhase::Idle {
            tracing::info!("session stopped");
        }
    }

    /// Clears the finished workout so a new one can be built. Ignored unless
    /// a completion is pending.
    pub fn acknowledge_completion(&mut self) -> bool {
        if self.phase != PlaybackPhase::Completed {
            tracing::debug!(phase = ?self.phase, "no completion to acknowledge");
            return false;
        }
        self.catalog.reset();
        self.playback = PlaybackState::default();
        self.phase = PlaybackPhase::Idle;
        tracing::debug!("completion acknowledged, catalog cleared");
        true
    }

    /// Loads the current exercise's countdown and announces it. Always speaks,
    /// even when the exercise was announced before.
    fn enter_current(&mut self) {
        let Some(entry) = self.catalog.get_mut(self.playback.current_index) else {
            return;
        };
        entry.mark_spoken();
        let instruction = entry.instruction();
        self.playback.remaining_seconds = entry.duration_seconds();

        self.announcer
            .speak(&instruction, &self.config.speech.language);
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::{CompletionFlag, RecordingAnnouncer, WorkoutError};

    type TestController = SessionController<RecordingAnnouncer, CompletionFlag>;

    fn controller() -> TestController {
        SessionController::new(
            WorkoutConfig::default(),
            RecordingAnnouncer::new(),
            CompletionFlag::new(),
        )
        .expect("default config is valid")
    }

    fn locked(plan: &[(&str, u32)]) -> TestController {
        let mut session = controller();
        for (name, seconds) in plan {
            assert!(session.add(name, *seconds));
        }
        session.lock();
        session
    }

    fn ticks(session: &mut TestController, count: usize) -> Vec<TickOutcome> {
        (0..count).map(|_| session.tick()).collect()
    }

    #[test]
    fn runs_two_exercise_workout_to_completion() {
        let mut session = locked(&[("Push-ups", 10), ("Plank", 20)]);

        assert!(session.start());
        assert_eq!(session.phase(), PlaybackPhase::Running);
        assert_eq!(session.playback().current_index(), 0);
        assert_eq!(session.playback().remaining_seconds(), 10);

        let outcomes = ticks(&mut session, 10);
        assert_eq!(outcomes[8], TickOutcome::Counting { remaining_seconds: 1 });
        assert_eq!(outcomes[9], TickOutcome::Advanced { index: 1 });
        assert_eq!(session.playback().current_index(), 1);
        assert_eq!(session.playback().remaining_seconds(), 20);

        let texts = session.announcer().texts();
        assert_eq!(texts, ["Push-ups for 10 seconds", "Plank for 20 seconds"]);
        assert!(session.announcer().cues().iter().all(|c| c.language == "en-US"));

        let outcomes = ticks(&mut session, 20);
        assert!(matches!(outcomes[19], TickOutcome::Completed(_)));
        assert_eq!(session.phase(), PlaybackPhase::Completed);
        assert_eq!(session.notifier().times_fired(), 1);
        assert_eq!(
            session.notifier().last_summary(),
            Some(CompletionSummary {
                exercises: 2,
                total_seconds: 30
            })
        );

        assert_eq!(session.tick(), TickOutcome::Ignored);
        assert_eq!(session.notifier().times_fired(), 1);
    }

    #[test]
    fn completion_rewinds_playback_but_keeps_catalog() {
        let mut session = locked(&[("Push-ups", 10)]);
        session.start();
        ticks(&mut session, 10);

        let playback = session.playback();
        assert!(!playback.is_running());
        assert_eq!(playback.current_index(), 0);
        assert_eq!(playback.total_remaining_seconds(), 10);
        assert_eq!(session.catalog().len(), 1);
        assert!(session.announcer().cancellations() >= 1);
    }

    #[test]
    fn total_remaining_drops_by_one_per_tick() {
        for count in 0..30 {
            let mut session = locked(&[("Push-ups", 10), ("Plank", 20)]);
            session.start();
            ticks(&mut session, count);
            assert_eq!(
                session.playback().total_remaining_seconds(),
                30 - count as u32,
                "after {count} ticks"
            );
        }
    }

    #[test]
    fn marks_entries_spoken_when_entered() {
        let mut session = locked(&[("Push-ups", 10), ("Plank", 20)]);
        session.start();
        assert!(session.catalog().get(0).unwrap().has_been_spoken());
        assert!(!session.catalog().get(1).unwrap().has_been_spoken());

        ticks(&mut session, 10);
        assert!(session.catalog().get(1).unwrap().has_been_spoken());
    }

    #[test]
    fn repeats_cue_when_exercise_is_entered_again() {
        let mut session = locked(&[("Push-ups", 10)]);
        session.start();
        session.stop();
        session.start();

        assert_eq!(
            session.announcer().texts(),
            ["Push-ups for 10 seconds", "Push-ups for 10 seconds"]
        );
    }

    #[test]
    fn stop_mid_session_rewinds_to_start() {
        let mut session = locked(&[("Push-ups", 10), ("Plank", 20), ("Squats", 30)]);
        session.start();
        ticks(&mut session, 17);
        assert_eq!(session.playback().current_index(), 1);

        session.stop();
        let playback = session.playback();
        assert_eq!(session.phase(), PlaybackPhase::Idle);
        assert!(!playback.is_running());
        assert_eq!(playback.current_index(), 0);
        assert_eq!(playback.total_remaining_seconds(), 60);
        assert_eq!(session.announcer().cancellations(), 1);
        assert_eq!(session.notifier().times_fired(), 0);
        assert_eq!(session.catalog().len(), 3);
        assert_eq!(session.tick(), TickOutcome::Ignored);
    }

    #[test]
    fn stop_while_completed_keeps_completion_pending() {
        let mut session = locked(&[("Push-ups", 10)]);
        session.start();
        ticks(&mut session, 10);

        session.stop();
        assert_eq!(session.phase(), PlaybackPhase::Completed);
        assert!(session.acknowledge_completion());
    }

    #[test]
    fn acknowledging_clears_catalog_and_playback() {
        let mut session = locked(&[("Push-ups", 10), ("Plank", 10), ("Squats", 10)]);
        session.start();
        ticks(&mut session, 30);

        assert!(session.acknowledge_completion());
        assert_eq!(session.phase(), PlaybackPhase::Idle);
        assert!(session.catalog().is_empty());
        assert!(!session.catalog().is_locked());
        assert_eq!(*session.playback(), PlaybackState::default());

        assert!(session.add("Lunges", 20));
        assert!(!session.acknowledge_completion());
    }

    #[test]
    fn second_start_is_ignored() {
        let mut session = locked(&[("Push-ups", 10), ("Plank", 20)]);
        assert!(session.start());
        let after_first = *session.playback();

        assert!(!session.start());
        assert_eq!(*session.playback(), after_first);
        assert_eq!(session.announcer().cues().len(), 1);
    }

    #[test]
    fn start_requires_locked_non_empty_catalog() {
        let mut session = controller();
        session.lock();
        assert!(!session.start());
        assert!(session.announcer().cues().is_empty());

        let mut session = controller();
        session.add("Push-ups", 10);
        assert!(!session.start());
        assert_eq!(session.phase(), PlaybackPhase::Idle);
    }

    #[test]
    fn locked_catalog_ignores_edits_through_controller() {
        let mut session = locked(&[("Push-ups", 10)]);
        assert!(!session.add("Plank", 20));
        assert!(!session.remove(0));
        assert_eq!(session.catalog().len(), 1);
    }

    #[test]
    fn submitting_draft_clears_name_only_on_success() {
        let mut session = controller();
        let mut draft = session.new_draft();
        draft.set_name("Push-ups");
        draft.increment();

        assert!(session.submit_draft(&mut draft));
        assert_eq!(draft.name(), "");
        assert_eq!(draft.duration_seconds(), 20);
        assert_eq!(session.catalog().get(0).unwrap().duration_seconds(), 20);

        session.lock();
        draft.set_name("Plank");
        assert!(!session.submit_draft(&mut draft));
        assert_eq!(draft.name(), "Plank");
    }

    #[test]
    fn current_entry_follows_playback() {
        let mut session = locked(&[("Push-ups", 10), ("Plank", 20)]);
        assert!(session.current_entry().is_none());

        session.start();
        assert_eq!(session.current_entry().unwrap().name(), "Push-ups");
        ticks(&mut session, 10);
        assert_eq!(session.current_entry().unwrap().name(), "Plank");
    }

    #[test]
    fn out_of_bounds_position_halts_instead_of_panicking() {
        let mut session = locked(&[("Push-ups", 10)]);
        session.start();
        session.playback.current_index = session.catalog.len();

        assert_eq!(session.tick(), TickOutcome::Halted);
        assert_eq!(session.phase(), PlaybackPhase::Idle);
        assert!(!session.playback().is_running());
        assert_eq!(session.announcer().cancellations(), 1);
        assert_eq!(session.notifier().times_fired(), 0);
    }

    #[test]
    fn rejects_invalid_configs() {
        let mut config = WorkoutConfig::default();
        config.timer.tick_interval_ms = 0;
        let err = SessionController::new(config, RecordingAnnouncer::new(), CompletionFlag::new())
            .unwrap_err();
        assert!(matches!(err, WorkoutError::InvalidConfig(_)));

        let mut config = WorkoutConfig::default();
        config.durations.min_seconds = 0;
        assert!(
            SessionController::new(config, RecordingAnnouncer::new(), CompletionFlag::new())
                .is_err()
        );
    }

    struct EventLog(Rc<RefCell<Vec<&'static str>>>);

    impl Announcer for EventLog {
        fn speak(&mut self, _text: &str, _language: &str) {
            self.0.borrow_mut().push("speak");
        }

        fn cancel_all(&mut self) {
            self.0.borrow_mut().push("cancel");
        }
    }

    #[test]
    fn notifies_before_playback_is_reset() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let notified = Rc::clone(&events);
        let mut session = SessionController::new(
            WorkoutConfig::default(),
            EventLog(Rc::clone(&events)),
            move |_: &CompletionSummary| notified.borrow_mut().push("complete"),
        )
        .unwrap();
        session.add("Push-ups", 10);
        session.lock();
        session.start();
        for _ in 0..10 {
            session.tick();
        }

        assert_eq!(*events.borrow(), ["speak", "complete", "cancel"]);
    }

    #[test]
    fn snapshot_serializes_progress() {
        let mut session = locked(&[("Push-ups", 10), ("Plank", 20)]);
        session.start();
        session.tick();

        let json = session.snapshot().to_json_pretty().unwrap();
        assert!(json.contains("\"phase\": \"Running\""));
        assert!(json.contains("\"remaining_seconds\": 9"));
        assert!(json.contains("\"name\": \"Plank\""));
    }
}
