//! The one state object the rest of the program operates on: timing engine,
//! lap ledger, and the warning threshold, with snapshot conversion for
//! persistence.

use crate::engine::TimerState;
use crate::ledger::LedgerState;
use crate::model::{PersistedSnapshot, SessionView, DEFAULT_WARNING_SECONDS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub timer: TimerState,
    pub ledger: LedgerState,
    pub warning_threshold_seconds: i64,
}

impl Session {
    pub fn new() -> Self {
        Self {
            timer: TimerState::default(),
            ledger: LedgerState::default(),
            warning_threshold_seconds: DEFAULT_WARNING_SECONDS,
        }
    }

    /// Rebuild a session from durable state. Always comes back stopped:
    /// only cumulative state round-trips.
    pub fn restore(snapshot: PersistedSnapshot) -> Self {
        Self {
            timer: TimerState {
                running: false,
                stint_start_ms: 0,
                accumulated_ms: snapshot.accumulated_ms.max(0),
            },
            ledger: LedgerState {
                splits: snapshot.splits,
                last_boundary_ms: 0,
                next_label: snapshot.next_label_suggestion,
            },
            warning_threshold_seconds: snapshot.warning_threshold_seconds,
        }
    }

    /// Durable subset of the state. Timestamps and the running flag are
    /// intentionally not part of it.
    pub fn snapshot(&self) -> PersistedSnapshot {
        PersistedSnapshot {
            accumulated_ms: self.timer.accumulated_ms,
            splits: self.ledger.splits.clone(),
            next_label_suggestion: self.ledger.next_label.clone(),
            warning_threshold_seconds: self.warning_threshold_seconds,
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            running: self.timer.running,
            stint_start_ms: self.timer.stint_start_ms,
            accumulated_ms: self.timer.accumulated_ms,
            splits: self.ledger.splits.clone(),
            next_label: self.ledger.next_label.clone(),
            warning_threshold_seconds: self.warning_threshold_seconds,
        }
    }

    /// Start a stint. Every start re-arms the split boundary, so time spent
    /// stopped never leaks into the next recorded split.
    pub fn start(&mut self, now_ms: i64) {
        if self.timer.running {
            return;
        }
        self.timer.start(now_ms);
        self.ledger.arm(now_ms);
    }

    pub fn stop(&mut self, now_ms: i64) {
        self.timer.stop(now_ms);
    }

    pub fn toggle(&mut self, now_ms: i64) {
        if self.timer.running {
            self.stop(now_ms);
        } else {
            self.start(now_ms);
        }
    }

    /// Record a split, or start the run if it is not running: a split
    /// request while stopped means "begin", and records nothing.
    pub fn split(&mut self, now_ms: i64, label_override: Option<&str>) {
        if !self.timer.running {
            self.start(now_ms);
            return;
        }
        self.ledger.record_split(now_ms, label_override);
    }

    pub fn undo_last_split(&mut self, now_ms: i64) -> bool {
        self.ledger.undo_last(now_ms, self.timer.running)
    }

    pub fn edit_label(&mut self, index: usize, label: &str) -> bool {
        self.ledger.edit_label(index, label)
    }

    pub fn delete_split(&mut self, index: usize) -> bool {
        self.ledger.delete(index)
    }

    pub fn set_next_label(&mut self, label: &str) {
        self.ledger.set_next_label(label);
    }

    /// Positive values only; returns `false` and changes nothing otherwise.
    pub fn set_threshold(&mut self, seconds: i64) -> bool {
        if seconds <= 0 {
            return false;
        }
        self.warning_threshold_seconds = seconds;
        true
    }

    /// Clear everything. The confirmation gate lives in the interface
    /// layers.
    pub fn reset(&mut self) {
        self.timer.reset();
        self.ledger.reset();
    }
}
