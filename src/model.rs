use serde::{Deserialize, Serialize};

/// Default label prefix used for positional suggestions ("Item 1", "Item 2", ...).
pub const DEFAULT_LABEL_PREFIX: &str = "Item";

/// Default per-row warning threshold, in seconds.
pub const DEFAULT_WARNING_SECONDS: i64 = 120;

/// Initial next-label suggestion for a fresh session.
pub fn initial_label() -> String {
    format!("{DEFAULT_LABEL_PREFIX} 1")
}

/// One recorded item: display label plus the time spent on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub label: String,
    /// Milliseconds since the previous split boundary. Never negative.
    pub duration: i64,
}

/// The durable on-disk unit. Deliberately carries no running flag and no
/// timestamps: a reloaded session always resumes stopped, because resuming a
/// wall clock across process restarts would be ambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSnapshot {
    #[serde(default)]
    pub accumulated_ms: i64,
    #[serde(default)]
    pub splits: Vec<Split>,
    #[serde(default = "initial_label")]
    pub next_label_suggestion: String,
    #[serde(default = "default_warning_seconds")]
    pub warning_threshold_seconds: i64,
}

fn default_warning_seconds() -> i64 {
    DEFAULT_WARNING_SECONDS
}

impl Default for PersistedSnapshot {
    fn default() -> Self {
        Self {
            accumulated_ms: 0,
            splits: Vec::new(),
            next_label_suggestion: initial_label(),
            warning_threshold_seconds: DEFAULT_WARNING_SECONDS,
        }
    }
}

impl PersistedSnapshot {
    /// Shape validation beyond what serde enforces: stored quantities are
    /// non-negative and the threshold is strictly positive.
    pub fn is_well_formed(&self) -> bool {
        self.accumulated_ms >= 0
            && self.warning_threshold_seconds > 0
            && self.splits.iter().all(|s| s.duration >= 0)
    }
}

/// Read-only copy of the full session state, handed to presentation layers.
/// Everything derived (elapsed, cumulative sums, stats, threshold flags) is
/// recomputed from this on each read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub running: bool,
    pub stint_start_ms: i64,
    pub accumulated_ms: i64,
    pub splits: Vec<Split>,
    pub next_label: String,
    pub warning_threshold_seconds: i64,
}

impl SessionView {
    /// Total elapsed time as of `now_ms`: accumulated stints plus the live
    /// one. Pure; never mutates.
    pub fn elapsed(&self, now_ms: i64) -> i64 {
        self.accumulated_ms
            + if self.running {
                now_ms - self.stint_start_ms
            } else {
                0
            }
    }
}

/// One table row with its running prefix sum attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CumulativeRow {
    pub label: String,
    pub duration: i64,
    pub cumulative: i64,
}

/// Aggregate statistics over the recorded splits. Only exists when at least
/// one split has been recorded; an empty ledger has no statistics, not
/// zeroed ones.
#[derive(Debug, Clone, PartialEq)]
pub struct LapStats {
    pub total_ms: i64,
    pub average_ms: f64,
    pub fastest_ms: i64,
    pub slowest_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_serde_uses_camel_case_keys() {
        let snap = PersistedSnapshot {
            accumulated_ms: 42,
            splits: vec![Split {
                label: "Q1".into(),
                duration: 1000,
            }],
            next_label_suggestion: "Q2".into(),
            warning_threshold_seconds: 90,
        };
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["accumulatedMs"], 42);
        assert_eq!(json["splits"][0]["label"], "Q1");
        assert_eq!(json["splits"][0]["duration"], 1000);
        assert_eq!(json["nextLabelSuggestion"], "Q2");
        assert_eq!(json["warningThresholdSeconds"], 90);
    }

    #[test]
    fn snapshot_missing_fields_fill_defaults() {
        let snap: PersistedSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(snap, PersistedSnapshot::default());
        assert_eq!(snap.next_label_suggestion, "Item 1");
        assert_eq!(snap.warning_threshold_seconds, 120);
    }

    #[test]
    fn well_formed_rejects_negatives() {
        let mut snap = PersistedSnapshot::default();
        assert!(snap.is_well_formed());
        snap.accumulated_ms = -1;
        assert!(!snap.is_well_formed());

        let mut snap = PersistedSnapshot::default();
        snap.warning_threshold_seconds = 0;
        assert!(!snap.is_well_formed());

        let mut snap = PersistedSnapshot::default();
        snap.splits.push(Split {
            label: "x".into(),
            duration: -5,
        });
        assert!(!snap.is_well_formed());
    }

    #[test]
    fn elapsed_is_pure_over_the_view() {
        let view = SessionView {
            running: true,
            stint_start_ms: 1_000,
            accumulated_ms: 500,
            splits: Vec::new(),
            next_label: initial_label(),
            warning_threshold_seconds: DEFAULT_WARNING_SECONDS,
        };
        assert_eq!(view.elapsed(1_000), 500);
        assert_eq!(view.elapsed(2_000), 1_500);

        let stopped = SessionView {
            running: false,
            ..view
        };
        assert_eq!(stopped.elapsed(9_999), 500);
    }
}
