//! CSV and clipboard export of the split table.

use std::path::Path;
#[cfg(feature = "tui")]
use std::path::PathBuf;
#[cfg(feature = "tui")]
use std::sync::mpsc as std_mpsc;
#[cfg(feature = "tui")]
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::format::{format_duration, ms_to_minutes};
use crate::model::{CumulativeRow, DEFAULT_LABEL_PREFIX};

// Global clipboard manager channel - initialized once on first use
#[cfg(feature = "tui")]
static CLIPBOARD_SENDER: OnceLock<std_mpsc::Sender<String>> = OnceLock::new();

const CSV_HEADER: &str = "#,Label,Duration (ms),Duration (min),Duration (MM:SS.cc),Cumulative (MM:SS.cc)";

/// Quote a CSV field, doubling embedded quotes.
fn csv_quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Build the CSV document: UTF-8 BOM (spreadsheet compatibility), header
/// row, one row per split. Labels are quoted so embedded delimiters
/// survive; an empty label falls back to its positional default.
pub fn csv_document(rows: &[CumulativeRow]) -> String {
    let mut lines = vec![CSV_HEADER.to_string()];
    for (i, r) in rows.iter().enumerate() {
        let label = if r.label.is_empty() {
            format!("{DEFAULT_LABEL_PREFIX} {}", i + 1)
        } else {
            r.label.clone()
        };
        lines.push(format!(
            "{},{},{},{:.3},{},{}",
            i + 1,
            csv_quote(&label),
            r.duration,
            ms_to_minutes(r.duration),
            format_duration(r.duration),
            format_duration(r.cumulative)
        ));
    }
    format!("\u{FEFF}{}", lines.join("\n"))
}

/// Plain-text table for the clipboard: one line per split.
pub fn clipboard_text(rows: &[CumulativeRow]) -> String {
    rows.iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "{}. {}\t{}\t(cumulative: {})",
                i + 1,
                r.label,
                format_duration(r.duration),
                format_duration(r.cumulative)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write the CSV document to `path`.
pub fn write_csv(path: &Path, rows: &[CumulativeRow]) -> Result<()> {
    std::fs::write(path, csv_document(rows))
        .with_context(|| format!("write CSV to {}", path.display()))
}

/// Timestamped default CSV path in the current directory.
#[cfg(feature = "tui")]
pub fn default_csv_path() -> Result<PathBuf> {
    let fmt = time::macros::format_description!("[year][month][day]-[hour][minute][second]");
    let stamp = time::OffsetDateTime::now_utc()
        .format(&fmt)
        .context("format export timestamp")?;
    let current_dir = std::env::current_dir().context("get current directory")?;
    Ok(current_dir.join(format!("question-times-{stamp}.csv")))
}

/// Initialize the clipboard manager thread if not already initialized.
/// A dedicated thread processes clipboard writes sequentially and keeps each
/// clipboard instance alive long enough for clipboard managers to read it.
#[cfg(feature = "tui")]
fn init_clipboard_manager() -> Result<&'static std_mpsc::Sender<String>> {
    CLIPBOARD_SENDER.get_or_init(|| {
        let (tx, rx) = std_mpsc::channel::<String>();

        std::thread::spawn(move || {
            use arboard::Clipboard;

            for text in rx {
                if let Ok(mut clipboard) = Clipboard::new() {
                    if clipboard.set_text(&text).is_ok() {
                        // Linux clipboard managers read the selection from
                        // the owning process; dropping too early loses it.
                        std::thread::sleep(Duration::from_secs(2));
                    }
                }
            }
        });

        tx
    });

    CLIPBOARD_SENDER
        .get()
        .ok_or_else(|| anyhow::anyhow!("Failed to initialize clipboard manager"))
}

/// Queue `text` for the system clipboard. Returns once queued; the manager
/// thread performs the actual write. For long-lived processes (the TUI).
#[cfg(feature = "tui")]
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let sender = init_clipboard_manager()?;
    sender
        .send(text.to_string())
        .map_err(|_| anyhow::anyhow!("Clipboard manager channel closed"))?;
    Ok(())
}

/// Clipboard write for short-lived processes: holds the clipboard open
/// until managers have had time to read it, since exiting immediately
/// would drop the selection on Linux.
pub fn copy_to_clipboard_blocking(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("open system clipboard")?;
    clipboard
        .set_text(text)
        .context("write to system clipboard")?;
    std::thread::sleep(Duration::from_secs(2));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<CumulativeRow> {
        vec![
            CumulativeRow {
                label: "Q1".into(),
                duration: 45_000,
                cumulative: 45_000,
            },
            CumulativeRow {
                label: "Algebra, part \"b\"".into(),
                duration: 85_000,
                cumulative: 130_000,
            },
        ]
    }

    #[test]
    fn csv_has_bom_header_and_quoted_labels() {
        let doc = csv_document(&rows());
        assert!(doc.starts_with('\u{FEFF}'));

        let lines: Vec<&str> = doc.trim_start_matches('\u{FEFF}').lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "#,Label,Duration (ms),Duration (min),Duration (MM:SS.cc),Cumulative (MM:SS.cc)"
        );
        assert_eq!(lines[1], "1,\"Q1\",45000,0.750,00:45.00,00:45.00");
        // Embedded comma stays inside the quotes, embedded quotes double.
        assert_eq!(
            lines[2],
            "2,\"Algebra, part \"\"b\"\"\",85000,1.417,01:25.00,02:10.00"
        );
    }

    #[test]
    fn csv_empty_label_gets_positional_default() {
        let doc = csv_document(&[CumulativeRow {
            label: String::new(),
            duration: 1_000,
            cumulative: 1_000,
        }]);
        assert!(doc.contains("\"Item 1\""));
    }

    #[test]
    fn clipboard_lines_are_tab_separated() {
        let text = clipboard_text(&rows());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "1. Q1\t00:45.00\t(cumulative: 00:45.00)");
        assert_eq!(
            lines[1],
            "2. Algebra, part \"b\"\t01:25.00\t(cumulative: 02:10.00)"
        );
    }

    #[test]
    fn clipboard_text_empty_for_no_rows() {
        assert_eq!(clipboard_text(&[]), "");
    }
}
