use std::time::Duration;

/// Shortest interval a timer will tick at.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Converts elapsed wall time into whole ticks.
///
/// Fractions of an interval are carried over to the next call. A paused
/// timer delivers nothing and forgets any partial interval, so a fresh
/// session always waits a full interval before its first tick.
#[derive(Debug, Clone)]
pub struct SessionTimer {
    interval: Duration,
    carried: Duration,
    paused: bool,
}

impl SessionTimer {
    /// Creates a paused timer ticking every `interval`, floored at
    /// [`MIN_INTERVAL`].
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(MIN_INTERVAL),
            carried: Duration::ZERO,
            paused: true,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.carried = Duration::ZERO;
        }
    }

    pub fn pause(&mut self) {
        self.paused = true;
        self.carried = Duration::ZERO;
    }

    /// Pauses or resumes to mirror whether playback is running.
    pub fn sync(&mut self, running: bool) {
        if running {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Accounts for `delta` of elapsed time and returns the ticks now due.
    pub fn advance(&mut self, delta: Duration) -> u32 {
        if self.paused {
            return 0;
        }

        let interval = self.interval.as_nanos();
        let elapsed = self.carried.as_nanos() + delta.as_nanos();
        let ticks = elapsed / interval;
        // The remainder is below one interval, which itself fits in a Duration.
        self.carried = Duration::from_nanos((elapsed % interval) as u64);

        u32::try_from(ticks).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(interval_ms: u64) -> SessionTimer {
        let mut timer = SessionTimer::new(Duration::from_millis(interval_ms));
        timer.resume();
        timer
    }

    #[test]
    fn starts_paused() {
        let mut timer = SessionTimer::new(Duration::from_secs(1));
        assert!(timer.is_paused());
        assert_eq!(timer.advance(Duration::from_secs(5)), 0);
    }

    #[test]
    fn delivers_whole_ticks_and_carries_remainder() {
        let mut timer = running(1_000);
        assert_eq!(timer.advance(Duration::from_millis(2_500)), 2);
        assert_eq!(timer.advance(Duration::from_millis(400)), 0);
        assert_eq!(timer.advance(Duration::from_millis(100)), 1);
    }

    #[test]
    fn pausing_drops_partial_interval() {
        let mut timer = running(1_000);
        timer.advance(Duration::from_millis(900));
        timer.sync(false);
        timer.sync(true);
        assert_eq!(timer.advance(Duration::from_millis(200)), 0);
        assert_eq!(timer.advance(Duration::from_millis(800)), 1);
    }

    #[test]
    fn resume_while_running_keeps_progress() {
        let mut timer = running(1_000);
        timer.advance(Duration::from_millis(600));
        timer.resume();
        assert_eq!(timer.advance(Duration::from_millis(400)), 1);
    }

    #[test]
    fn zero_interval_is_floored() {
        let mut timer = SessionTimer::new(Duration::ZERO);
        assert_eq!(timer.interval(), MIN_INTERVAL);

        timer.resume();
        assert_eq!(timer.advance(Duration::from_millis(5)), 5);
    }
}
