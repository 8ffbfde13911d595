use std::future;

use tokio::{
    sync::mpsc::UnboundedReceiver,
    time::{self, Instant, Interval, MissedTickBehavior},
};
use workout_core::{
    Announcer, CompletionNotifier, ExerciseDraft, PlaybackPhase, Result, SessionController,
    SessionTimer, TickOutcome,
};

use crate::{
    celebration::format_clock,
    commands::{Action, HELP},
};

/// Everything the event loop reacts to besides timer ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Action(Action),
    /// Ctrl+C was pressed.
    Interrupted,
    /// The input source hung up.
    InputClosed,
}

/// When [`Session::run`] should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitPolicy {
    /// Return as soon as playback is no longer running. Used by `run`.
    WhenPlaybackEnds,
    /// Return only on `quit`, end of input, or Ctrl+C while idle.
    OnQuit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Presentation layer around a [`SessionController`].
///
/// All actions and ticks go through this one value on one task, so the
/// controller never sees concurrent mutation.
pub struct Session<A, N> {
    controller: SessionController<A, N>,
    draft: ExerciseDraft,
    timer: SessionTimer,
    /// Present only while playback is running.
    ticker: Option<Interval>,
    last_tick: Instant,
}

impl<A: Announcer, N: CompletionNotifier> Session<A, N> {
    pub fn new(controller: SessionController<A, N>) -> Self {
        let draft = controller.new_draft();
        let timer = SessionTimer::new(controller.config().timer.tick_interval());
        Self {
            controller,
            draft,
            timer,
            ticker: None,
            last_tick: Instant::now(),
        }
    }

    pub fn controller(&self) -> &SessionController<A, N> {
        &self.controller
    }

    pub fn draft(&self) -> &ExerciseDraft {
        &self.draft
    }

    /// Pumps events and ticks until the exit policy says stop.
    pub async fn run(
        &mut self,
        events: &mut UnboundedReceiver<SessionEvent>,
        policy: ExitPolicy,
    ) -> Result<()> {
        let mut input_open = true;
        self.sync_ticker();

        loop {
            if policy == ExitPolicy::WhenPlaybackEnds && self.finish_if_ended() {
                return Ok(());
            }

            tokio::select! {
                now = next_tick(&mut self.ticker), if self.ticker.is_some() => {
                    let due = self.timer.advance(now.duration_since(self.last_tick));
                    self.last_tick = now;
                    self.deliver_ticks(due);
                }
                event = events.recv(), if input_open => {
                    let event = event.unwrap_or_else(|| {
                        input_open = false;
                        SessionEvent::InputClosed
                    });
                    if self.handle(event, policy) == Flow::Exit {
                        self.controller.stop();
                        return Ok(());
                    }
                }
                else => {
                    tracing::debug!("no input and no playback left, leaving session loop");
                    return Ok(());
                }
            }

            self.sync_ticker();
        }
    }

    /// Starts the interval when playback begins and drops it when it ends.
    /// The first tick fires one full interval after the start.
    fn sync_ticker(&mut self) {
        let running = self.controller.playback().is_running();
        self.timer.sync(running);
        match (running, self.ticker.is_some()) {
            (true, false) => {
                let period = self.timer.interval();
                let now = Instant::now();
                let mut ticker = time::interval_at(now + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                self.ticker = Some(ticker);
                self.last_tick = now;
            }
            (false, true) => self.ticker = None,
            _ => {}
        }
    }

    fn handle(&mut self, event: SessionEvent, policy: ExitPolicy) -> Flow {
        match event {
            SessionEvent::Action(action) => self.apply(action),
            SessionEvent::Interrupted => {
                if self.controller.playback().is_running() {
                    println!("Interrupted, stopping the session.");
                    self.controller.stop();
                    match policy {
                        ExitPolicy::WhenPlaybackEnds => Flow::Exit,
                        ExitPolicy::OnQuit => Flow::Continue,
                    }
                } else {
                    Flow::Exit
                }
            }
            SessionEvent::InputClosed => match policy {
                ExitPolicy::WhenPlaybackEnds => Flow::Continue,
                ExitPolicy::OnQuit => Flow::Exit,
            },
        }
    }

    /// Applies one user action to the controller and prints the result.
    pub fn apply(&mut self, action: Action) -> Flow {
        match action {
            Action::Name(name) => {
                self.draft.set_name(name);
                self.print_draft();
            }
            Action::More => {
                self.draft.increment();
                self.print_draft();
            }
            Action::Less => {
                self.draft.decrement();
                self.print_draft();
            }
            Action::AddDraft => {
                if self.controller.submit_draft(&mut self.draft) {
                    self.print_catalog();
                } else {
                    println!("Nothing added. Name the draft first; saved workouts can't change.");
                }
            }
            Action::Add { seconds, name } => {
                if self.controller.add(&name, seconds) {
                    self.print_catalog();
                } else {
                    println!("Nothing added.");
                }
            }
            Action::Remove(index) => {
                if self.controller.remove(index) {
                    self.print_catalog();
                } else {
                    println!("Nothing removed.");
                }
            }
            Action::List => self.print_catalog(),
            Action::Lock => {
                self.controller.lock();
                println!("Workout saved. Type `start` to begin.");
            }
            Action::Start => {
                if !self.controller.start() {
                    println!("Cannot start. Add exercises and `lock`, or `stop` first.");
                }
            }
            Action::Stop => {
                self.controller.stop();
                self.print_status();
            }
            Action::Ack => {
                if self.controller.acknowledge_completion() {
                    println!("Workout cleared.");
                } else {
                    println!("No finished workout to acknowledge.");
                }
            }
            Action::Status { json: false } => self.print_status(),
            Action::Status { json: true } => match self.controller.snapshot().to_json_pretty() {
                Ok(json) => println!("{json}"),
                Err(err) => tracing::warn!(%err, "failed to serialize session status"),
            },
            Action::Help => println!("{HELP}"),
            Action::Quit => return Flow::Exit,
        }
        Flow::Continue
    }

    fn deliver_ticks(&mut self, count: u32) {
        for _ in 0..count {
            let outcome = self.controller.tick();
            self.render_tick(outcome);
            if !matches!(
                outcome,
                TickOutcome::Counting { .. } | TickOutcome::Advanced { .. }
            ) {
                break;
            }
        }
    }

    /// In `run` mode a finished workout is acknowledged right away.
    fn finish_if_ended(&mut self) -> bool {
        match self.controller.phase() {
            PlaybackPhase::Running => false,
            PlaybackPhase::Completed => {
                self.controller.acknowledge_completion();
                true
            }
            PlaybackPhase::Idle => true,
        }
    }

    fn render_tick(&self, outcome: TickOutcome) {
        match outcome {
            TickOutcome::Ignored => {}
            TickOutcome::Counting { remaining_seconds } => {
                if let Some(entry) = self.controller.current_entry() {
                    println!(
                        "  {:<24} {}  (total {})",
                        entry.name(),
                        format_clock(remaining_seconds),
                        format_clock(self.controller.playback().total_remaining_seconds())
                    );
                }
            }
            TickOutcome::Advanced { .. } => self.print_current(),
            TickOutcome::Completed(_) => {
                tracing::debug!("completion rendered by notifier");
            }
            TickOutcome::Halted => println!("Playback stopped."),
        }
    }

    fn print_current(&self) {
        if let Some(entry) = self.controller.current_entry() {
            println!(
                "> {} ({})",
                entry.name(),
                format_clock(entry.duration_seconds())
            );
        }
    }

    fn print_draft(&self) {
        println!(
            "Draft: {} ({})",
            if self.draft.name().is_empty() {
                "<no name>"
            } else {
                self.draft.name()
            },
            format_clock(self.draft.duration_seconds())
        );
    }

    fn print_catalog(&self) {
        let catalog = self.controller.catalog();
        if catalog.is_empty() {
            println!("The workout is empty.");
            return;
        }
        for (number, entry) in catalog.entries().iter().enumerate() {
            println!(
                "{:>3}. {:<24} {}",
                number + 1,
                entry.name(),
                format_clock(entry.duration_seconds())
            );
        }
        println!(
            "     total {}{}",
            format_clock(catalog.total_duration()),
            if catalog.is_locked() { " (saved)" } else { "" }
        );
    }

    fn print_status(&self) {
        let playback = self.controller.playback();
        match self.controller.phase() {
            PlaybackPhase::Running => {
                self.print_current();
                println!(
                    "  {} left in exercise, {} in workout",
                    format_clock(playback.remaining_seconds()),
                    format_clock(playback.total_remaining_seconds())
                );
            }
            PlaybackPhase::Idle => println!(
                "Idle. {} exercises, {} total.",
                self.controller.catalog().len(),
                format_clock(self.controller.catalog().total_duration())
            ),
            PlaybackPhase::Completed => println!("Workout complete. Type `ack` to clear it."),
        }
    }
}

/// Waits for the next interval tick. Never resolves without an interval.
async fn next_tick(ticker: &mut Option<Interval>) -> Instant {
    match ticker {
        Some(ticker) => ticker.tick().await,
        None => future::pending().await,
    }
}
