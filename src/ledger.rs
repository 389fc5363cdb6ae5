//! Lap ledger: the ordered record of splits, the next-label suggestion, and
//! one level of undo.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::{initial_label, Split, DEFAULT_LABEL_PREFIX};

/// Matches a label ending in digits, splitting it into prefix + integer.
fn trailing_int_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.*?)(\d+)$").expect("trailing-int regex"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerState {
    /// Insertion order is chronological order; cumulative sums and
    /// index-based edits all key off it.
    pub splits: Vec<Split>,
    /// Instant the most recent split was recorded, or the run started.
    pub last_boundary_ms: i64,
    /// Pre-filled label for the next split.
    pub next_label: String,
}

impl Default for LedgerState {
    fn default() -> Self {
        Self {
            splits: Vec::new(),
            last_boundary_ms: 0,
            next_label: initial_label(),
        }
    }
}

impl LedgerState {
    /// Set the split boundary to `now_ms`. Called whenever the engine
    /// starts a stint.
    pub fn arm(&mut self, now_ms: i64) {
        self.last_boundary_ms = now_ms;
    }

    /// Record a split ending now. The caller guarantees the engine is
    /// running; a split request while stopped is reinterpreted as a start
    /// one level up and never reaches here.
    ///
    /// Label resolution: trimmed override if non-empty, else the trimmed
    /// suggestion, else a positional default.
    pub fn record_split(&mut self, now_ms: i64, label_override: Option<&str>) {
        let duration = (now_ms - self.last_boundary_ms).max(0);
        let label = label_override
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| {
                let s = self.next_label.trim();
                (!s.is_empty()).then(|| s.to_string())
            })
            .unwrap_or_else(|| {
                format!("{DEFAULT_LABEL_PREFIX} {}", self.splits.len() + 1)
            });

        self.splits.push(Split {
            label: label.clone(),
            duration,
        });
        self.last_boundary_ms = now_ms;
        self.advance_suggestion(&label);
    }

    /// Remove the most recent split. While the run is active the boundary is
    /// reset to `now_ms`, so the undone time keeps accruing into the next
    /// split instead of being lost or double-counted. The removed label
    /// becomes the suggestion again so the same item can be retried.
    pub fn undo_last(&mut self, now_ms: i64, running: bool) -> bool {
        let Some(last) = self.splits.pop() else {
            return false;
        };
        if running {
            self.last_boundary_ms = now_ms;
        }
        self.next_label = last.label;
        true
    }

    /// Replace the label at `index`. Duration and ordering are untouched.
    /// Returns `false` when the index is out of range.
    pub fn edit_label(&mut self, index: usize, new_label: &str) -> bool {
        let Some(split) = self.splits.get_mut(index) else {
            return false;
        };
        split.label = new_label.to_string();
        true
    }

    /// Remove the row at `index`. Neighboring durations and the split
    /// boundary are deliberately left alone: a deleted row's time is never
    /// reclaimed or redistributed, so the sum of durations may afterwards
    /// stay below the engine's elapsed total. Returns `false` when the
    /// index is out of range.
    pub fn delete(&mut self, index: usize) -> bool {
        if index >= self.splits.len() {
            return false;
        }
        self.splits.remove(index);
        true
    }

    /// Overwrite the suggestion directly (the user typed one in).
    pub fn set_next_label(&mut self, label: &str) {
        self.next_label = label.to_string();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Derive the next suggestion from the label just recorded: a trailing
    /// integer increments in place; anything else falls back to scanning
    /// the recorded labels for the default prefix.
    ///
    /// The prefix keeps its own separator: "Item 7" suggests "Item 8",
    /// "Q1" suggests "Q2". Interior whitespace runs collapse to one space.
    fn advance_suggestion(&mut self, just_recorded: &str) {
        if let Some(caps) = trailing_int_re().captures(just_recorded) {
            let prefix = caps.get(1).map_or("", |m| m.as_str());
            if let Ok(n) = caps.get(2).map_or("", |m| m.as_str()).parse::<i64>() {
                let spaced = prefix.ends_with(char::is_whitespace);
                let core = prefix.split_whitespace().collect::<Vec<_>>().join(" ");
                self.next_label = if core.is_empty() {
                    (n + 1).to_string()
                } else if spaced {
                    format!("{core} {}", n + 1)
                } else {
                    format!("{core}{}", n + 1)
                };
                return;
            }
        }
        self.next_label = self.positional_suggestion();
    }

    /// Max recorded "Item N" plus one; count plus one when no such label
    /// exists.
    fn positional_suggestion(&self) -> String {
        let prefix = format!("{DEFAULT_LABEL_PREFIX} ");
        let max = self
            .splits
            .iter()
            .filter_map(|s| s.label.strip_prefix(&prefix))
            .filter_map(|rest| rest.trim().parse::<i64>().ok())
            .max();
        let n = match max {
            Some(m) => m + 1,
            None => self.splits.len() as i64 + 1,
        };
        format!("{DEFAULT_LABEL_PREFIX} {n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn armed() -> LedgerState {
        let mut ledger = LedgerState::default();
        ledger.arm(0);
        ledger
    }

    #[test]
    fn record_measures_from_last_boundary() {
        let mut ledger = armed();
        ledger.record_split(45_000, None);
        ledger.record_split(130_000, None);
        assert_eq!(ledger.splits[0].duration, 45_000);
        assert_eq!(ledger.splits[1].duration, 85_000);
        assert_eq!(ledger.last_boundary_ms, 130_000);
    }

    #[test]
    fn label_resolution_prefers_override_then_suggestion() {
        let mut ledger = armed();
        ledger.record_split(1_000, Some("  Algebra 3  "));
        assert_eq!(ledger.splits[0].label, "Algebra 3");

        // Blank override falls through to the suggestion.
        ledger.next_label = "Geometry 1".into();
        ledger.record_split(2_000, Some("   "));
        assert_eq!(ledger.splits[1].label, "Geometry 1");

        // Blank suggestion falls through to the positional default.
        ledger.next_label = "  ".into();
        ledger.record_split(3_000, None);
        assert_eq!(ledger.splits[2].label, "Item 3");
    }

    #[test]
    fn trailing_integer_increments() {
        let mut ledger = armed();
        ledger.record_split(1_000, Some("Item 7"));
        assert_eq!(ledger.next_label, "Item 8");

        ledger.record_split(2_000, Some("Q7"));
        assert_eq!(ledger.next_label, "Q8");

        ledger.record_split(3_000, Some("42"));
        assert_eq!(ledger.next_label, "43");

        ledger.record_split(4_000, Some("Mat  Soru  9"));
        assert_eq!(ledger.next_label, "Mat Soru 10");
    }

    #[test]
    fn non_numeric_label_falls_back_to_prefix_scan() {
        let mut ledger = armed();
        ledger.record_split(1_000, Some("Item 4"));
        ledger.record_split(2_000, Some("Warm-up"));
        // Max "Item N" on record is 4.
        assert_eq!(ledger.next_label, "Item 5");
    }

    #[test]
    fn fallback_uses_count_when_no_default_labels_exist() {
        let mut ledger = armed();
        ledger.record_split(1_000, Some("Warm-up"));
        assert_eq!(ledger.next_label, "Item 2");
    }

    #[test]
    fn undo_is_left_inverse_of_record() {
        let mut ledger = armed();
        ledger.record_split(1_000, Some("Q1"));
        let before = ledger.splits.clone();
        ledger.record_split(5_000, None);
        assert!(ledger.undo_last(6_000, true));
        assert_eq!(ledger.splits, before);
        assert_eq!(ledger.next_label, "Q2");
        // Active run: boundary moves to the undo instant.
        assert_eq!(ledger.last_boundary_ms, 6_000);
    }

    #[test]
    fn undo_while_stopped_keeps_boundary() {
        let mut ledger = armed();
        ledger.record_split(1_000, Some("Q1"));
        assert!(ledger.undo_last(9_000, false));
        assert_eq!(ledger.last_boundary_ms, 1_000);
        assert_eq!(ledger.next_label, "Q1");
    }

    #[test]
    fn undo_on_empty_ledger_is_a_noop() {
        let mut ledger = armed();
        assert!(!ledger.undo_last(1_000, true));
        assert_eq!(ledger, armed());
    }

    #[test]
    fn edit_and_delete_respect_bounds() {
        let mut ledger = armed();
        ledger.record_split(1_000, Some("a"));
        ledger.record_split(2_000, Some("b"));
        ledger.record_split(3_000, Some("c"));

        assert!(ledger.edit_label(1, "renamed"));
        assert_eq!(ledger.splits[1].label, "renamed");
        assert_eq!(ledger.splits[1].duration, 1_000);
        assert!(!ledger.edit_label(3, "nope"));

        assert!(ledger.delete(0));
        assert_eq!(ledger.splits.len(), 2);
        assert_eq!(ledger.splits[0].label, "renamed");
        assert_eq!(ledger.splits[1].label, "c");
        assert!(!ledger.delete(2));
        // Boundary untouched by deletion.
        assert_eq!(ledger.last_boundary_ms, 3_000);
    }

    #[test]
    fn reset_restores_the_initial_suggestion() {
        let mut ledger = armed();
        ledger.record_split(1_000, Some("Q1"));
        ledger.reset();
        assert_eq!(ledger, LedgerState::default());
        assert_eq!(ledger.next_label, "Item 1");
    }
}
