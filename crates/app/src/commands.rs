use workout_core::{Result, WorkoutError};

/// An exercise given on the command line as `NAME=SECONDS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseArg {
    pub name: String,
    pub seconds: u32,
}

/// Value parser for `--exercise`.
pub fn parse_exercise(raw: &str) -> Result<ExerciseArg> {
    let (name, seconds) = raw.rsplit_once('=').ok_or_else(|| {
        WorkoutError::InvalidExercise(format!("`{raw}` is not in NAME=SECONDS form"))
    })?;

    let name = name.trim();
    if name.is_empty() {
        return Err(WorkoutError::InvalidExercise(format!(
            "`{raw}` has an empty name"
        )));
    }

    Ok(ExerciseArg {
        name: name.to_string(),
        seconds: parse_seconds(seconds)?,
    })
}

/// A user action typed into the interactive session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Sets the draft's name.
    Name(String),
    /// Steps the draft duration up.
    More,
    /// Steps the draft duration down.
    Less,
    /// Submits the draft.
    AddDraft,
    /// Adds an exercise directly, bypassing the draft.
    Add { seconds: u32, name: String },
    /// Removes the exercise at a zero-based index.
    Remove(usize),
    List,
    Lock,
    Start,
    Stop,
    Ack,
    /// Prints progress, or the full session state as JSON.
    Status { json: bool },
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  name <text>            set the name of the exercise being drafted
  more | less            step the drafted duration up or down
  add                    add the drafted exercise
  add <seconds> <name>   add an exercise directly
  remove <n>             delete exercise number n
  list                   show the workout
  lock                   save the workout for playback
  start | stop           start or stop the session
  ack                    acknowledge a finished workout and clear it
  status [--json]        show playback progress
  help | quit";

/// Parses one line of interactive input. Blank lines yield `None`.
pub fn parse_action(line: &str) -> Result<Option<Action>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let action = match word.to_ascii_lowercase().as_str() {
        "name" => Action::Name(rest.to_string()),
        "more" | "+" => Action::More,
        "less" | "-" => Action::Less,
        "add" if rest.is_empty() => Action::AddDraft,
        "add" => {
            let (seconds, name) = rest.split_once(char::is_whitespace).ok_or_else(|| {
                WorkoutError::InvalidExercise("usage: add <seconds> <name>".into())
            })?;
            Action::Add {
                seconds: parse_seconds(seconds)?,
                name: name.trim().to_string(),
            }
        }
        "remove" | "rm" => {
            let number: usize = rest
                .parse()
                .map_err(|_| WorkoutError::msg("usage: remove <n>"))?;
            let index = number
                .checked_sub(1)
                .ok_or_else(|| WorkoutError::msg("exercise numbers start at 1"))?;
            Action::Remove(index)
        }
        "list" | "ls" => Action::List,
        "lock" | "save" => Action::Lock,
        "start" => Action::Start,
        "stop" => Action::Stop,
        "ack" | "done" => Action::Ack,
        "status" => match rest {
            "" => Action::Status { json: false },
            "--json" | "json" => Action::Status { json: true },
            other => return Err(WorkoutError::msg(format!("unknown status option `{other}`"))),
        },
        "help" | "?" => Action::Help,
        "quit" | "exit" => Action::Quit,
        other => return Err(WorkoutError::msg(format!("unknown command `{other}`"))),
    };

    Ok(Some(action))
}

fn parse_seconds(raw: &str) -> Result<u32> {
    let raw = raw.trim();
    raw.parse().map_err(|_| {
        WorkoutError::InvalidExercise(format!("`{raw}` is not a number of seconds"))
    })
}
