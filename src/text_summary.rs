//! Text rendering of the split table for headless output.

use crate::format::{format_duration, ms_to_minutes};
use crate::model::SessionView;
use crate::stats;

/// Pre-formatted lines for text output.
pub struct TextSummary {
    pub lines: Vec<String>,
}

/// Build the table plus summary statistics for a stopped, loaded session.
pub fn build_text_summary(view: &SessionView) -> TextSummary {
    let mut lines = Vec::new();

    // Loaded sessions are always stopped, so accumulated time is the total.
    lines.push(format!(
        "Total elapsed: {}   (warning threshold {}s)",
        format_duration(view.accumulated_ms),
        view.warning_threshold_seconds
    ));

    if view.splits.is_empty() {
        lines.push("No splits recorded.".into());
        return TextSummary { lines };
    }

    lines.push(String::new());
    lines.push(format!(
        "{:>4}  {:<28} {:>12} {:>12}",
        "#", "Label", "Duration", "Cumulative"
    ));
    for (i, row) in stats::cumulative_rows(&view.splits).iter().enumerate() {
        let flag = if stats::is_over_threshold(row.duration, view.warning_threshold_seconds) {
            "  over"
        } else {
            ""
        };
        lines.push(format!(
            "{:>4}  {:<28} {:>12} {:>12}{}",
            i + 1,
            row.label,
            format_duration(row.duration),
            format_duration(row.cumulative),
            flag
        ));
    }

    if let Some(s) = stats::compute_stats(&view.splits) {
        lines.push(String::new());
        lines.push(format!(
            "Splits: {}   Total: {}   Average: {} ({:.2} min)   Fastest: {}   Slowest: {}",
            view.splits.len(),
            format_duration(s.total_ms),
            format_duration(s.average_ms as i64),
            ms_to_minutes(s.average_ms as i64),
            format_duration(s.fastest_ms),
            format_duration(s.slowest_ms)
        ));
    }

    TextSummary { lines }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{initial_label, SessionView, Split};

    fn view(splits: Vec<Split>) -> SessionView {
        SessionView {
            running: false,
            stint_start_ms: 0,
            accumulated_ms: splits.iter().map(|s| s.duration).sum(),
            splits,
            next_label: initial_label(),
            warning_threshold_seconds: 120,
        }
    }

    #[test]
    fn empty_session_reports_no_splits() {
        let summary = build_text_summary(&view(Vec::new()));
        assert!(summary.lines.iter().any(|l| l.contains("No splits recorded")));
    }

    #[test]
    fn rows_carry_threshold_markers() {
        let summary = build_text_summary(&view(vec![
            Split {
                label: "Q1".into(),
                duration: 45_000,
            },
            Split {
                label: "Q2".into(),
                duration: 125_000,
            },
        ]));
        let q1 = summary.lines.iter().find(|l| l.contains("Q1")).unwrap();
        let q2 = summary.lines.iter().find(|l| l.contains("Q2")).unwrap();
        assert!(!q1.contains("over"));
        assert!(q2.ends_with("over"));
    }

    #[test]
    fn stats_line_present_with_splits() {
        let summary = build_text_summary(&view(vec![Split {
            label: "Q1".into(),
            duration: 45_000,
        }]));
        assert!(summary
            .lines
            .iter()
            .any(|l| l.contains("Splits: 1") && l.contains("Fastest")));
    }
}
