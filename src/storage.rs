//! Durable snapshot storage.
//!
//! One JSON file under the platform data directory. The `v2` in the file
//! name is the format version; bumping it orphans (rather than corrupts)
//! older state.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

use crate::model::PersistedSnapshot;

const APP_DIR: &str = "question-timer";
const STATE_FILE: &str = "state-v2.json";

/// Default snapshot location: `<data_dir>/question-timer/state-v2.json`.
pub fn default_state_path() -> Result<PathBuf> {
    let base = dirs::data_dir().context("no platform data directory")?;
    Ok(base.join(APP_DIR).join(STATE_FILE))
}

/// Load the snapshot at `path`. Absence and malformed content both recover
/// to the default empty state with a warning; neither is fatal.
pub fn load_snapshot(path: &Path) -> PersistedSnapshot {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return PersistedSnapshot::default();
        }
        Err(e) => {
            warn!("failed to read state file {}: {e}", path.display());
            return PersistedSnapshot::default();
        }
    };
    match serde_json::from_str::<PersistedSnapshot>(&raw) {
        Ok(snap) if snap.is_well_formed() => snap,
        Ok(_) => {
            warn!(
                "state file {} has out-of-range values, starting fresh",
                path.display()
            );
            PersistedSnapshot::default()
        }
        Err(e) => {
            warn!("state file {} is malformed ({e}), starting fresh", path.display());
            PersistedSnapshot::default()
        }
    }
}

/// Write the snapshot to `path`, creating parent directories as needed.
pub fn save_snapshot(path: &Path, snapshot: &PersistedSnapshot) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create state directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json).with_context(|| format!("write state file {}", path.display()))
}

/// Save, demoting any failure to a warning. Persistence is fire-and-forget:
/// a failed write is not retried and never blocks the operation that
/// triggered it.
pub fn save_snapshot_best_effort(path: &Path, snapshot: &PersistedSnapshot) {
    if let Err(e) = save_snapshot(path, snapshot) {
        warn!("state save failed: {e:#}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Split;

    #[test]
    fn round_trip_preserves_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state-v2.json");
        let snap = PersistedSnapshot {
            accumulated_ms: 130_000,
            splits: vec![
                Split {
                    label: "Q1".into(),
                    duration: 45_000,
                },
                Split {
                    label: "Q2".into(),
                    duration: 85_000,
                },
            ],
            next_label_suggestion: "Q3".into(),
            warning_threshold_seconds: 90,
        };
        save_snapshot(&path, &snap).unwrap();
        assert_eq!(load_snapshot(&path), snap);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        assert_eq!(load_snapshot(&path), PersistedSnapshot::default());
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state-v2.json");
        fs::write(&path, "{not json").unwrap();
        assert_eq!(load_snapshot(&path), PersistedSnapshot::default());

        fs::write(&path, "[1, 2, 3]").unwrap();
        assert_eq!(load_snapshot(&path), PersistedSnapshot::default());
    }

    #[test]
    fn out_of_range_values_yield_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state-v2.json");
        fs::write(
            &path,
            r#"{"accumulatedMs": -5, "splits": [], "nextLabelSuggestion": "Item 1", "warningThresholdSeconds": 120}"#,
        )
        .unwrap();
        assert_eq!(load_snapshot(&path), PersistedSnapshot::default());
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("state-v2.json");
        save_snapshot(&path, &PersistedSnapshot::default()).unwrap();
        assert!(path.exists());
    }
}
