//! Derived views over the recorded splits. Everything here is recomputed
//! from the current split list on each call; nothing is cached.

use crate::model::{CumulativeRow, LapStats, Split};

/// Running prefix sums, one row per split in ledger order.
pub fn cumulative_rows(splits: &[Split]) -> Vec<CumulativeRow> {
    let mut sum = 0;
    splits
        .iter()
        .map(|s| {
            sum += s.duration;
            CumulativeRow {
                label: s.label.clone(),
                duration: s.duration,
                cumulative: sum,
            }
        })
        .collect()
}

/// Total, average, fastest, slowest. `None` for an empty ledger; absence of
/// data is not zero data.
pub fn compute_stats(splits: &[Split]) -> Option<LapStats> {
    if splits.is_empty() {
        return None;
    }
    let total: i64 = splits.iter().map(|s| s.duration).sum();
    let fastest = splits.iter().map(|s| s.duration).min().unwrap_or(0);
    let slowest = splits.iter().map(|s| s.duration).max().unwrap_or(0);
    Some(LapStats {
        total_ms: total,
        average_ms: total as f64 / splits.len() as f64,
        fastest_ms: fastest,
        slowest_ms: slowest,
    })
}

/// Strictly over the configured limit.
pub fn is_over_threshold(duration_ms: i64, threshold_seconds: i64) -> bool {
    duration_ms > threshold_seconds * 1_000
}
