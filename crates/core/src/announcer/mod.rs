use std::process::{Child, Command, Stdio};

/// Text-to-speech capability used for exercise cues.
///
/// Both calls are fire-and-forget. Implementations swallow synthesis
/// failures; the session keeps counting down silently.
pub trait Announcer {
    fn speak(&mut self, text: &str, language: &str);

    /// Best-effort cancellation of every cue still being spoken.
    fn cancel_all(&mut self);
}

impl<A: Announcer + ?Sized> Announcer for Box<A> {
    fn speak(&mut self, text: &str, language: &str) {
        (**self).speak(text, language);
    }

    fn cancel_all(&mut self) {
        (**self).cancel_all();
    }
}

/// Announcer that never makes a sound.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAnnouncer;

impl Announcer for SilentAnnouncer {
    fn speak(&mut self, _text: &str, _language: &str) {}

    fn cancel_all(&mut self) {}
}

/// Announcer that writes each cue to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAnnouncer;

impl Announcer for TracingAnnouncer {
    fn speak(&mut self, text: &str, language: &str) {
        tracing::info!(language, "announce: {text}");
    }

    fn cancel_all(&mut self) {
        tracing::debug!("announcements cancelled");
    }
}

/// A cue captured by [`RecordingAnnouncer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpokenCue {
    pub text: String,
    pub language: String,
}

/// Keeps every cue in memory. Handy for tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct RecordingAnnouncer {
    cues: Vec<SpokenCue>,
    cancellations: usize,
}

impl RecordingAnnouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cues(&self) -> &[SpokenCue] {
        &self.cues
    }

    pub fn texts(&self) -> Vec<&str> {
        self.cues.iter().map(|cue| cue.text.as_str()).collect()
    }

    pub fn cancellations(&self) -> usize {
        self.cancellations
    }
}

impl Announcer for RecordingAnnouncer {
    fn speak(&mut self, text: &str, language: &str) {
        self.cues.push(SpokenCue {
            text: text.to_string(),
            language: language.to_string(),
        });
    }

    fn cancel_all(&mut self) {
        self.cancellations += 1;
    }
}

/// Speaks through a system program such as `say` or `espeak`.
///
/// Each cue spawns a child process without waiting on it. Cancelling kills
/// whatever is still running.
#[derive(Debug)]
pub struct CommandAnnouncer {
    program: String,
    children: Vec<Child>,
}

impl CommandAnnouncer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            children: Vec::new(),
        }
    }

    /// Uses the speech program bundled with the host platform.
    pub fn platform_default() -> Self {
        Self::new(default_program())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Number of spawned cues that have not been reaped yet.
    pub fn pending(&self) -> usize {
        self.children.len()
    }

    fn reap_finished(&mut self) {
        self.children
            .retain_mut(|child| matches!(child.try_wait(), Ok(None)));
    }
}

impl Announcer for CommandAnnouncer {
    fn speak(&mut self, text: &str, language: &str) {
        self.reap_finished();

        let spawned = Command::new(&self.program)
            .args(language_args(&self.program, language))
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(child) => self.children.push(child),
            Err(err) => {
                tracing::warn!(program = %self.program, %err, "speech synthesis unavailable");
            }
        }
    }

    fn cancel_all(&mut self) {
        for mut child in self.children.drain(..) {
            if let Err(err) = child.kill() {
                tracing::debug!(%err, "speech process already finished");
            }
            let _ = child.wait();
        }
    }
}

fn default_program() -> &'static str {
    if cfg!(target_os = "macos") {
        "say"
    } else {
        "espeak"
    }
}

/// Flags that select a voice for `language` on programs that understand one.
fn language_args(program: &str, language: &str) -> Vec<String> {
    let name = std::path::Path::new(program)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(program);

    match name {
        "espeak" | "espeak-ng" => vec!["-v".to_string(), language.to_lowercase()],
        "spd-say" => vec!["-l".to_string(), language.to_string()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_announcer_keeps_cues_in_order() {
        let mut announcer = RecordingAnnouncer::new();
        announcer.speak("Push-ups for 10 seconds", "en-US");
        announcer.speak("Plank for 20 seconds", "en-US");
        announcer.cancel_all();

        assert_eq!(
            announcer.texts(),
            ["Push-ups for 10 seconds", "Plank for 20 seconds"]
        );
        assert_eq!(announcer.cues()[0].language, "en-US");
        assert_eq!(announcer.cancellations(), 1);
    }

    #[test]
    fn boxed_announcers_forward_calls() {
        let mut boxed: Box<dyn Announcer> = Box::new(SilentAnnouncer);
        boxed.speak("ignored", "en-US");
        boxed.cancel_all();
    }

    #[test]
    fn picks_voice_flags_per_program() {
        assert_eq!(language_args("espeak", "en-US"), ["-v", "en-us"]);
        assert_eq!(language_args("/usr/bin/espeak-ng", "en-US"), ["-v", "en-us"]);
        assert_eq!(language_args("spd-say", "en-US"), ["-l", "en-US"]);
        assert!(language_args("say", "en-US").is_empty());
    }

    #[test]
    fn missing_program_degrades_silently() {
        let mut announcer = CommandAnnouncer::new("definitely-not-a-speech-binary");
        announcer.speak("Plank for 20 seconds", "en-US");
        assert_eq!(announcer.pending(), 0);
        announcer.cancel_all();
    }
}
