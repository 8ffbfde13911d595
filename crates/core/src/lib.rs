//! Core library for the Workout Timer application.
//!
//! A workout is an ordered catalog of named, timed exercises. Once the
//! catalog is locked, a [`SessionController`] plays it back one second at a
//! time: it announces each exercise as it becomes current, counts it down,
//! and raises a completion signal after the last one. Speech and completion
//! handling are injected through the [`Announcer`] and
//! [`CompletionNotifier`] traits so front ends and tests can plug in their
//! own.

pub mod announcer;
pub mod catalog;
pub mod config;
pub mod error;
pub mod notifier;
pub mod playback;
pub mod timeline;

pub use announcer::{
    Announcer, CommandAnnouncer, RecordingAnnouncer, SilentAnnouncer, SpokenCue, TracingAnnouncer,
};
pub use catalog::{Catalog, ExerciseDraft, ExerciseEntry};
pub use config::{DurationConfig, SpeechConfig, TimerConfig, WorkoutConfig};
pub use error::{Result, WorkoutError};
pub use notifier::{CompletionFlag, CompletionNotifier, CompletionSummary};
pub use playback::{
    PlaybackPhase, PlaybackState, SessionController, SessionSnapshot, TickOutcome,
};
pub use timeline::SessionTimer;
