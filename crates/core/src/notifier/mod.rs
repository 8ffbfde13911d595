/// Describes the session that just finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionSummary {
    pub exercises: usize,
    pub total_seconds: u32,
}

/// One-shot signal raised when the last exercise's countdown reaches zero.
pub trait CompletionNotifier {
    fn workout_completed(&mut self, summary: &CompletionSummary);
}

impl<F> CompletionNotifier for F
where
    F: FnMut(&CompletionSummary),
{
    fn workout_completed(&mut self, summary: &CompletionSummary) {
        self(summary)
    }
}

/// Counts completions and remembers the most recent summary.
#[derive(Debug, Default, Clone)]
pub struct CompletionFlag {
    fired: usize,
    last: Option<CompletionSummary>,
}

impl CompletionFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn times_fired(&self) -> usize {
        self.fired
    }

    pub fn last_summary(&self) -> Option<CompletionSummary> {
        self.last
    }
}

impl CompletionNotifier for CompletionFlag {
    fn workout_completed(&mut self, summary: &CompletionSummary) {
        self.fired += 1;
        self.last = Some(*summary);
    }
}
