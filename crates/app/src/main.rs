mod celebration;
mod commands;
mod session;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc::{self, UnboundedSender},
};
use tracing_subscriber::EnvFilter;
use workout_core::{
    Announcer, CommandAnnouncer, CompletionSummary, SessionController, SilentAnnouncer,
    TracingAnnouncer, WorkoutConfig, WorkoutError,
};

use crate::{
    commands::{parse_action, parse_exercise, ExerciseArg, HELP},
    session::{ExitPolicy, Session, SessionEvent},
};

fn main() -> workout_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(async move {
        match cli.command {
            Commands::Run {
                exercises,
                config,
                voice,
            } => run_workout(&exercises, config.as_deref(), voice).await,
            Commands::Interactive { config, voice } => {
                run_interactive(config.as_deref(), voice).await
            }
            Commands::Defaults => {
                println!("{}", WorkoutConfig::default().to_json_pretty()?);
                Ok(())
            }
        }
    });
    // A pending stdin read cannot be cancelled; do not wait for it.
    runtime.shutdown_background();
    result
}

async fn run_workout(
    exercises: &[ExerciseArg],
    config: Option<&Path>,
    voice: Voice,
) -> workout_core::Result<()> {
    let config = load_config(config)?;
    tracing::info!(exercises = exercises.len(), ?voice, "starting workout");

    let (tx, mut rx) = mpsc::unbounded_channel();
    forward_interrupts(tx);

    let mut controller = build_controller(config, voice)?;
    for exercise in exercises {
        controller.add(&exercise.name, exercise.seconds);
    }
    controller.lock();
    if !controller.start() {
        return Err(WorkoutError::msg("no exercises to run"));
    }

    let mut session = Session::new(controller);
    session.run(&mut rx, ExitPolicy::WhenPlaybackEnds).await
}

async fn run_interactive(config: Option<&Path>, voice: Voice) -> workout_core::Result<()> {
    let config = load_config(config)?;
    tracing::info!(?voice, "starting interactive session");

    let (tx, mut rx) = mpsc::unbounded_channel();
    forward_interrupts(tx.clone());
    spawn_input_reader(tx);

    println!("{HELP}");
    let mut session = Session::new(build_controller(config, voice)?);
    session.run(&mut rx, ExitPolicy::OnQuit).await
}

fn load_config(path: Option<&Path>) -> workout_core::Result<WorkoutConfig> {
    match path {
        Some(path) => {
            tracing::debug!(?path, "loading configuration");
            WorkoutConfig::load(path)
        }
        None => Ok(WorkoutConfig::default()),
    }
}

fn build_controller(
    config: WorkoutConfig,
    voice: Voice,
) -> workout_core::Result<SessionController<Box<dyn Announcer>, impl FnMut(&CompletionSummary)>>
{
    let announcer: Box<dyn Announcer> = match voice {
        Voice::Log => Box::new(TracingAnnouncer),
        Voice::Silent => Box::new(SilentAnnouncer),
        Voice::Command => {
            let announcer = match config.speech.program.as_deref() {
                Some(program) => CommandAnnouncer::new(program),
                None => CommandAnnouncer::platform_default(),
            };
            tracing::info!(program = announcer.program(), "speaking cues");
            Box::new(announcer)
        }
    };

    let celebrate = |summary: &CompletionSummary| {
        println!("{}", celebration::banner(summary, &mut rand::thread_rng()));
    };

    SessionController::new(config, announcer, celebrate)
}

/// Forwards Ctrl+C into the event loop instead of killing the process.
fn forward_interrupts(tx: UnboundedSender<SessionEvent>) {
    tokio::spawn(async move {
        loop {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!(%err, "failed to listen for Ctrl+C");
                return;
            }
            if tx.send(SessionEvent::Interrupted).is_err() {
                return;
            }
        }
    });
}

/// Reads stdin on its own task. Only parsed actions cross over; the
/// controller stays with the session loop.
fn spawn_input_reader(tx: UnboundedSender<SessionEvent>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(err) => {
                    tracing::warn!(%err, "failed to read input");
                    break;
                }
            };
            match parse_action(&line) {
                Ok(Some(action)) => {
                    if tx.send(SessionEvent::Action(action)).is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(err) => println!("{err}"),
            }
        }
        let _ = tx.send(SessionEvent::InputClosed);
    });
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Timed workout sessions with spoken cues", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a workout given on the command line, then exit.
    Run {
        /// Exercise as NAME=SECONDS. Repeat for each exercise, in order.
        #[arg(short, long = "exercise", value_parser = parse_exercise, required = true)]
        exercises: Vec<ExerciseArg>,
        /// Optional JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// How exercise cues are spoken.
        #[arg(long, value_enum, default_value_t = Voice::Log)]
        voice: Voice,
    },
    /// Build and run workouts by typing commands.
    Interactive {
        /// Optional JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// How exercise cues are spoken.
        #[arg(long, value_enum, default_value_t = Voice::Log)]
        voice: Voice,
    },
    /// Print the default configuration as JSON.
    Defaults,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Voice {
    /// Write cues to the log.
    Log,
    /// Do not announce anything.
    Silent,
    /// Use the system speech program.
    Command,
}
