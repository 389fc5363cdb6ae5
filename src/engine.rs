//! Timing engine: accumulated duration plus the active stint.
//!
//! All operations take the current wall-clock reading as an explicit epoch-ms
//! argument, so the engine itself never touches the clock and every operation
//! is a pure function of its inputs.

/// Start/stop clock state. `elapsed = accumulated_ms + (running ? now - stint_start_ms : 0)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerState {
    pub running: bool,
    /// Instant the current stint began. Meaningful only while `running`.
    pub stint_start_ms: i64,
    /// Total elapsed time from all completed stints.
    pub accumulated_ms: i64,
}

impl TimerState {
    /// Begin a stint. No-op while already running.
    pub fn start(&mut self, now_ms: i64) {
        if self.running {
            return;
        }
        self.stint_start_ms = now_ms;
        self.running = true;
    }

    /// End the current stint, folding it into the accumulator. Idempotent:
    /// stopping a stopped timer changes nothing.
    pub fn stop(&mut self, now_ms: i64) {
        if !self.running {
            return;
        }
        self.accumulated_ms += now_ms - self.stint_start_ms;
        self.running = false;
    }

    pub fn toggle(&mut self, now_ms: i64) {
        if self.running {
            self.stop(now_ms);
        } else {
            self.start(now_ms);
        }
    }

    /// Unconditionally back to zero and stopped. Confirmation is the
    /// interface layer's job, not the engine's.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Pure read of the total elapsed time as of `now_ms`.
    pub fn elapsed(&self, now_ms: i64) -> i64 {
        self.accumulated_ms
            + if self.running {
                now_ms - self.stint_start_ms
            } else {
                0
            }
    }
}

/// Current wall clock in epoch milliseconds. The only place the process
/// reads the clock; everything downstream takes the value as an argument.
pub fn now_ms() -> i64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_counts_only_while_running() {
        let mut t = TimerState::default();
        assert_eq!(t.elapsed(0), 0);

        t.start(100);
        assert_eq!(t.elapsed(100), 0);
        assert_eq!(t.elapsed(350), 250);
        assert_eq!(t.elapsed(1_100), 1_000);

        t.stop(1_100);
        assert_eq!(t.accumulated_ms, 1_000);
        assert_eq!(t.elapsed(1_100), 1_000);
        assert_eq!(t.elapsed(50_000), 1_000);
    }

    #[test]
    fn elapsed_is_monotonic_while_running() {
        let mut t = TimerState::default();
        t.start(0);
        let mut last = 0;
        for now in [1, 5, 5, 80, 400, 90_000] {
            let e = t.elapsed(now);
            assert!(e >= last);
            last = e;
        }
    }

    #[test]
    fn stop_then_start_preserves_accumulated() {
        let mut t = TimerState::default();
        t.start(0);
        t.stop(30_000);
        t.start(60_000);
        // Continuity: nothing double counted and nothing lost across the
        // boundary.
        assert_eq!(t.elapsed(60_000), 30_000);
        assert_eq!(t.elapsed(70_000), 40_000);
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let mut t = TimerState::default();
        t.start(100);
        t.start(9_999);
        assert_eq!(t.stint_start_ms, 100);

        t.stop(200);
        t.stop(500);
        assert_eq!(t.accumulated_ms, 100);
    }

    #[test]
    fn toggle_flips_between_states() {
        let mut t = TimerState::default();
        t.toggle(10);
        assert!(t.running);
        t.toggle(20);
        assert!(!t.running);
        assert_eq!(t.accumulated_ms, 10);
    }

    #[test]
    fn reset_clears_everything_from_any_state() {
        let mut t = TimerState::default();
        t.start(0);
        t.stop(500);
        t.start(600);
        t.reset();
        assert_eq!(t, TimerState::default());
    }
}
