use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use crate::model::SessionView;
use crate::session::Session;
use crate::{export, stats, storage, text_summary};

#[derive(Debug, Parser, Clone)]
#[command(
    name = "question-timer",
    version,
    about = "Question/lap stopwatch for exam practice with TUI interface"
)]
pub struct Cli {
    /// Path to the state file (defaults to the platform data directory)
    #[arg(long, global = true)]
    pub state_file: Option<PathBuf>,

    /// With no subcommand the interactive TUI opens.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Print the split table and summary statistics
    Show,
    /// Write the split table as CSV (UTF-8 with BOM)
    ExportCsv {
        /// Output path (default: question-times.csv)
        path: Option<PathBuf>,
    },
    /// Copy the split table to the system clipboard
    ExportClipboard,
    /// Rename a split without touching its duration
    EditLabel {
        /// 1-based row index as shown in the table
        index: usize,
        label: String,
    },
    /// Delete a split; remaining rows keep their durations
    Delete {
        /// 1-based row index as shown in the table
        index: usize,
    },
    /// Set the per-split warning threshold in seconds
    SetThreshold { seconds: i64 },
    /// Clear the timer and all recorded splits
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

pub async fn run(args: Cli) -> Result<()> {
    let state_path = match args.state_file.clone() {
        Some(p) => p,
        None => storage::default_state_path()?,
    };

    let Some(command) = args.command else {
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(state_path).await;
        }
        #[cfg(not(feature = "tui"))]
        {
            // Fallback when built without TUI support.
            return run_show(&state_path);
        }
    };

    // Headless paths log to stderr; the TUI uses its info line instead.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match command {
        Command::Show => run_show(&state_path),
        Command::ExportCsv { path } => run_export_csv(&state_path, path),
        Command::ExportClipboard => run_export_clipboard(&state_path),
        Command::EditLabel { index, label } => {
            run_mutation(&state_path, |session| {
                let idx = to_zero_based(index, session)?;
                session.edit_label(idx, &label);
                Ok(format!("Renamed split #{index} to {label:?}"))
            })
        }
        Command::Delete { index } => run_mutation(&state_path, |session| {
            let idx = to_zero_based(index, session)?;
            session.delete_split(idx);
            Ok(format!("Deleted split #{index}"))
        }),
        Command::SetThreshold { seconds } => run_mutation(&state_path, |session| {
            if !session.set_threshold(seconds) {
                bail!("threshold must be a positive number of seconds");
            }
            Ok(format!(
                "Warning threshold set to {}",
                humantime::format_duration(std::time::Duration::from_secs(seconds as u64))
            ))
        }),
        Command::Reset { yes } => run_reset(&state_path, yes),
    }
}

/// Translate a displayed 1-based index into a ledger index, with bounds
/// checked up front so the core never sees an invalid one.
fn to_zero_based(index: usize, session: &Session) -> Result<usize> {
    let count = session.ledger.splits.len();
    if index == 0 || index > count {
        bail!("no split #{index} (recorded: {count})");
    }
    Ok(index - 1)
}

fn load_view(state_path: &std::path::Path) -> SessionView {
    Session::restore(storage::load_snapshot(state_path)).view()
}

fn run_show(state_path: &std::path::Path) -> Result<()> {
    let summary = text_summary::build_text_summary(&load_view(state_path));
    for line in summary.lines {
        println!("{line}");
    }
    Ok(())
}

fn run_export_csv(state_path: &std::path::Path, path: Option<PathBuf>) -> Result<()> {
    let view = load_view(state_path);
    let rows = stats::cumulative_rows(&view.splits);
    let path = path.unwrap_or_else(|| PathBuf::from("question-times.csv"));
    export::write_csv(&path, &rows)?;
    println!("Exported CSV: {}", path.display());
    Ok(())
}

fn run_export_clipboard(state_path: &std::path::Path) -> Result<()> {
    let view = load_view(state_path);
    if view.splits.is_empty() {
        bail!("no splits to copy");
    }
    let rows = stats::cumulative_rows(&view.splits);
    export::copy_to_clipboard_blocking(&export::clipboard_text(&rows))?;
    println!("Copied {} split(s) to clipboard", rows.len());
    Ok(())
}

/// Load, mutate, save, report. The snapshot on disk is the single source of
/// truth between headless invocations, so a failed save fails the command.
fn run_mutation(
    state_path: &std::path::Path,
    op: impl FnOnce(&mut Session) -> Result<String>,
) -> Result<()> {
    let mut session = Session::restore(storage::load_snapshot(state_path));
    let message = op(&mut session)?;
    storage::save_snapshot(state_path, &session.snapshot())?;
    println!("{message}");
    Ok(())
}

fn run_reset(state_path: &std::path::Path, yes: bool) -> Result<()> {
    if !yes {
        let count = load_view(state_path).splits.len();
        print!(
            "This clears the timer and all {count} recorded split(s). Type 'y' to confirm: "
        );
        std::io::stdout().flush().context("flush stdout")?;
        let mut answer = String::new();
        std::io::stdin()
            .read_line(&mut answer)
            .context("read confirmation")?;
        if answer.trim() != "y" {
            println!("Cancelled.");
            return Ok(());
        }
    }
    run_mutation(state_path, |session| {
        session.reset();
        Ok("Timer and splits cleared".into())
    })
}
