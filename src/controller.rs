//! Session lifecycle controller.
//!
//! Owns the one `Session` instance, applies commands from presentation
//! layers one at a time, and persists the snapshot after every mutation.

use std::path::PathBuf;

use anyhow::Result;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::engine::now_ms;
use crate::model::SessionView;
use crate::session::Session;
use crate::storage;

/// Commands emitted by presentation layers. The controller stamps the wall
/// clock when it applies each one.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// Start when stopped, stop when running. A split while stopped also
    /// starts, so this plus `Split` covers the whole clock surface.
    Toggle,
    Split { label_override: Option<String> },
    Undo,
    /// Unconditional; the sender is responsible for having confirmed it.
    Reset,
    EditLabel { index: usize, label: String },
    Delete { index: usize },
    SetThreshold { seconds: i64 },
    SetNextLabel { label: String },
    Quit,
}

/// Events back to presentation layers.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Full state after a mutation; the UI derives everything else from it.
    Updated(SessionView),
    /// Transient status line material.
    Info(String),
}

/// Apply commands until `Quit` or the command channel closes. Each command
/// runs to completion before the next is taken, so no locking is needed
/// anywhere in the state layer.
pub async fn run_controller(
    mut session: Session,
    state_path: PathBuf,
    mut cmd_rx: UnboundedReceiver<SessionCommand>,
    event_tx: UnboundedSender<SessionEvent>,
) -> Result<()> {
    // Seed the UI with the restored state before any command arrives.
    let _ = event_tx.send(SessionEvent::Updated(session.view()));

    while let Some(cmd) = cmd_rx.recv().await {
        let now = now_ms();
        let mut changed = true;
        match cmd {
            SessionCommand::Quit => break,
            SessionCommand::Toggle => session.toggle(now),
            SessionCommand::Split { label_override } => {
                session.split(now, label_override.as_deref());
            }
            SessionCommand::Undo => {
                if !session.undo_last_split(now) {
                    changed = false;
                    let _ = event_tx.send(SessionEvent::Info("Nothing to undo".into()));
                }
            }
            SessionCommand::Reset => {
                session.reset();
                let _ = event_tx.send(SessionEvent::Info("Timer and splits cleared".into()));
            }
            SessionCommand::EditLabel { index, label } => {
                if !session.edit_label(index, &label) {
                    changed = false;
                    let _ = event_tx.send(SessionEvent::Info(format!(
                        "No split #{} to edit",
                        index + 1
                    )));
                }
            }
            SessionCommand::Delete { index } => {
                if session.delete_split(index) {
                    let _ = event_tx
                        .send(SessionEvent::Info(format!("Deleted split #{}", index + 1)));
                } else {
                    changed = false;
                    let _ = event_tx.send(SessionEvent::Info(format!(
                        "No split #{} to delete",
                        index + 1
                    )));
                }
            }
            SessionCommand::SetThreshold { seconds } => {
                if session.set_threshold(seconds) {
                    let _ = event_tx.send(SessionEvent::Info(format!(
                        "Warning threshold set to {seconds}s"
                    )));
                } else {
                    changed = false;
                    let _ = event_tx.send(SessionEvent::Info(
                        "Threshold must be a positive number of seconds".into(),
                    ));
                }
            }
            SessionCommand::SetNextLabel { label } => session.set_next_label(&label),
        }

        if changed {
            storage::save_snapshot_best_effort(&state_path, &session.snapshot());
            let _ = event_tx.send(SessionEvent::Updated(session.view()));
        }
    }

    Ok(())
}
