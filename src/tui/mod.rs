mod help;

use std::path::PathBuf;
use std::{io, time::Duration, time::Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Terminal,
};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::controller::{self, SessionCommand, SessionEvent};
use crate::engine::now_ms;
use crate::format::{format_duration, ms_to_minutes};
use crate::model::{initial_label, SessionView, DEFAULT_WARNING_SECONDS};
use crate::session::Session;
use crate::{export, stats, storage};

/// Draw cadence while the clock runs: fast enough for a live centisecond
/// counter.
const RUNNING_TICK: Duration = Duration::from_millis(50);
/// Draw cadence while stopped: nothing moves, so relax.
const IDLE_TICK: Duration = Duration::from_millis(500);

/// Rows the split table is assumed to show at once, for scroll tracking.
const TABLE_PAGE: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
enum InputMode {
    Normal,
    /// Typing a replacement next-label suggestion.
    EditNextLabel,
    /// Typing a new label for the row at this index.
    EditRowLabel(usize),
    /// Typing a threshold in seconds.
    EditThreshold,
    /// Reset armed; waiting for `y`.
    ConfirmReset,
}

struct UiState {
    tab: usize,
    view: SessionView,
    info: String,
    selected: usize,
    scroll_offset: usize,
    input_mode: InputMode,
    input: String,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            tab: 0,
            view: SessionView {
                running: false,
                stint_start_ms: 0,
                accumulated_ms: 0,
                splits: Vec::new(),
                next_label: initial_label(),
                warning_threshold_seconds: DEFAULT_WARNING_SECONDS,
            },
            info: String::new(),
            selected: 0,
            scroll_offset: 0,
            input_mode: InputMode::Normal,
            input: String::new(),
        }
    }
}

enum KeyOutcome {
    Continue,
    Quit,
}

pub async fn run(state_path: PathBuf) -> Result<()> {
    // Unbounded channels avoid backpressure between the UI thread and the
    // controller.
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<SessionCommand>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<SessionEvent>();

    let session = Session::restore(storage::load_snapshot(&state_path));

    // TUI runs in a dedicated thread to keep all blocking terminal I/O out
    // of the Tokio runtime.
    let ui_handle = std::thread::spawn(move || run_threaded(event_rx, cmd_tx));

    let res = controller::run_controller(session, state_path, cmd_rx, event_tx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread.
fn run_threaded(
    mut event_rx: UnboundedReceiver<SessionEvent>,
    cmd_tx: UnboundedSender<SessionCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let mut state = UiState::default();
    let mut last_tick = Instant::now();
    let mut dirty = true;

    let res = loop {
        // Drain controller events without blocking to keep the UI
        // responsive.
        while let Ok(ev) = event_rx.try_recv() {
            apply_event(&mut state, ev);
            dirty = true;
        }

        // The cadence follows the running flag: the live counter needs
        // frequent frames, a stopped display does not. The switch takes
        // effect the same iteration the flag flips, so no fast ticking
        // survives a stop.
        let tick_rate = if state.view.running {
            RUNNING_TICK
        } else {
            IDLE_TICK
        };
        if dirty || last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| draw(f.area(), f, &state)).ok();
            last_tick = Instant::now();
            dirty = false;
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                match handle_key(&mut state, &cmd_tx, k.modifiers, k.code) {
                    KeyOutcome::Continue => dirty = true,
                    KeyOutcome::Quit => break Ok(()),
                }
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

fn apply_event(state: &mut UiState, ev: SessionEvent) {
    match ev {
        SessionEvent::Updated(view) => {
            state.view = view;
            let count = state.view.splits.len();
            if count == 0 {
                state.selected = 0;
                state.scroll_offset = 0;
            } else if state.selected >= count {
                state.selected = count - 1;
            }
            if state.scroll_offset > state.selected {
                state.scroll_offset = state.selected;
            }
        }
        SessionEvent::Info(msg) => state.info = msg,
    }
}

fn handle_key(
    state: &mut UiState,
    cmd_tx: &UnboundedSender<SessionCommand>,
    modifiers: KeyModifiers,
    code: KeyCode,
) -> KeyOutcome {
    // Ctrl-C quits from any mode, including mid-edit.
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        let _ = cmd_tx.send(SessionCommand::Quit);
        return KeyOutcome::Quit;
    }

    match state.input_mode.clone() {
        InputMode::ConfirmReset => {
            if code == KeyCode::Char('y') {
                let _ = cmd_tx.send(SessionCommand::Reset);
            } else {
                state.info = "Reset cancelled".into();
            }
            state.input_mode = InputMode::Normal;
            KeyOutcome::Continue
        }
        InputMode::EditNextLabel | InputMode::EditRowLabel(_) | InputMode::EditThreshold => {
            handle_input_key(state, cmd_tx, code);
            KeyOutcome::Continue
        }
        InputMode::Normal => handle_normal_key(state, cmd_tx, code),
    }
}

/// Text-entry handling shared by the three edit modes. Global shortcuts are
/// suspended while typing.
fn handle_input_key(
    state: &mut UiState,
    cmd_tx: &UnboundedSender<SessionCommand>,
    code: KeyCode,
) {
    match code {
        KeyCode::Esc => {
            state.input_mode = InputMode::Normal;
            state.input.clear();
            state.info = "Edit cancelled".into();
        }
        KeyCode::Backspace => {
            state.input.pop();
        }
        KeyCode::Char(ch) => state.input.push(ch),
        KeyCode::Enter => {
            let entered = state.input.clone();
            match state.input_mode {
                InputMode::EditNextLabel => {
                    let _ = cmd_tx.send(SessionCommand::SetNextLabel { label: entered });
                }
                InputMode::EditRowLabel(index) => {
                    let _ = cmd_tx.send(SessionCommand::EditLabel {
                        index,
                        label: entered,
                    });
                }
                InputMode::EditThreshold => match entered.trim().parse::<i64>() {
                    Ok(seconds) => {
                        let _ = cmd_tx.send(SessionCommand::SetThreshold { seconds });
                    }
                    Err(_) => state.info = "Enter a whole number of seconds".into(),
                },
                _ => {}
            }
            state.input_mode = InputMode::Normal;
            state.input.clear();
        }
        _ => {}
    }
}

fn handle_normal_key(
    state: &mut UiState,
    cmd_tx: &UnboundedSender<SessionCommand>,
    code: KeyCode,
) -> KeyOutcome {
    match code {
        KeyCode::Char('q') => {
            let _ = cmd_tx.send(SessionCommand::Quit);
            return KeyOutcome::Quit;
        }
        KeyCode::Tab => {
            state.tab = (state.tab + 1) % 2;
        }
        KeyCode::Char('?') => {
            state.tab = 1;
        }
        KeyCode::Esc => {
            state.tab = 0;
        }
        // Everything else acts on the timer tab.
        _ if state.tab != 0 => {}
        KeyCode::Char(' ') => {
            let _ = cmd_tx.send(SessionCommand::Split {
                label_override: None,
            });
        }
        KeyCode::Char('s') => {
            let _ = cmd_tx.send(SessionCommand::Toggle);
        }
        KeyCode::Char('u') | KeyCode::Backspace => {
            let _ = cmd_tx.send(SessionCommand::Undo);
        }
        KeyCode::Char('r') => {
            state.input_mode = InputMode::ConfirmReset;
        }
        KeyCode::Char('n') => {
            state.input_mode = InputMode::EditNextLabel;
            state.input = state.view.next_label.clone();
        }
        KeyCode::Char('e') => {
            if state.view.splits.is_empty() {
                state.info = "No split selected".into();
            } else {
                state.input_mode = InputMode::EditRowLabel(state.selected);
                state.input = state.view.splits[state.selected].label.clone();
            }
        }
        KeyCode::Char('d') => {
            if state.view.splits.is_empty() {
                state.info = "No split selected".into();
            } else {
                let _ = cmd_tx.send(SessionCommand::Delete {
                    index: state.selected,
                });
            }
        }
        KeyCode::Char('t') => {
            state.input_mode = InputMode::EditThreshold;
            state.input = state.view.warning_threshold_seconds.to_string();
        }
        KeyCode::Char('c') => {
            let rows = stats::cumulative_rows(&state.view.splits);
            match export::default_csv_path().and_then(|p| {
                export::write_csv(&p, &rows)?;
                Ok(p)
            }) {
                Ok(p) => state.info = format!("Exported CSV: {}", p.display()),
                Err(e) => state.info = format!("CSV export failed: {e:#}"),
            }
        }
        KeyCode::Char('y') => {
            if state.view.splits.is_empty() {
                state.info = "No splits to copy".into();
            } else {
                let rows = stats::cumulative_rows(&state.view.splits);
                match export::copy_to_clipboard(&export::clipboard_text(&rows)) {
                    Ok(()) => {
                        state.info = format!("Copied {} split(s) to clipboard", rows.len());
                    }
                    Err(e) => state.info = format!("Clipboard copy failed: {e:#}"),
                }
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            if state.selected > 0 {
                state.selected -= 1;
                if state.selected < state.scroll_offset {
                    state.scroll_offset = state.selected;
                }
            }
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.selected + 1 < state.view.splits.len() {
                state.selected += 1;
                if state.selected >= state.scroll_offset + TABLE_PAGE {
                    state.scroll_offset = state.selected.saturating_sub(TABLE_PAGE - 1);
                }
            }
        }
        _ => {}
    }
    KeyOutcome::Continue
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let tabs = Tabs::new(vec![Line::from("Timer"), Line::from("Help")])
        .select(state.tab)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("question-timer"),
        )
        .highlight_style(Style::default().fg(Color::Yellow));
    f.render_widget(tabs, chunks[0]);

    match state.tab {
        0 => draw_timer(chunks[1], f, state),
        _ => help::draw_help(chunks[1], f),
    }
}

fn draw_timer(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(5), // Elapsed readout
                Constraint::Length(5), // Stat cards
                Constraint::Min(0),    // Split table
                Constraint::Length(3), // Status / input line
            ]
            .as_ref(),
        )
        .split(area);

    draw_clock(main[0], f, state);
    draw_stat_cards(main[1], f, state);
    draw_table(main[2], f, state);
    draw_status(main[3], f, state);
}

fn draw_clock(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let elapsed = state.view.elapsed(now_ms());
    let (status, color) = if state.view.running {
        ("Running", Color::Green)
    } else {
        ("Stopped", Color::Gray)
    };

    let p = Paragraph::new(vec![
        Line::from(Span::styled(
            format_duration(elapsed),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("Next label: ", Style::default().fg(Color::Gray)),
            Span::raw(state.view.next_label.clone()),
        ]),
        Line::from(Span::styled(
            "Space records a split (and starts the run); s starts/stops; ? help",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Elapsed ({status})")),
    );
    f.render_widget(p, area);
}

fn draw_stat_cards(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
            ]
            .as_ref(),
        )
        .split(area);

    let lap_stats = stats::compute_stats(&state.view.splits);

    let card = |title: &str, value: String, sub: Option<String>| {
        let mut lines = vec![Line::from(Span::styled(
            value,
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        if let Some(sub) = sub {
            lines.push(Line::from(Span::styled(
                sub,
                Style::default().fg(Color::DarkGray),
            )));
        }
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string()),
        )
    };

    f.render_widget(
        card("Splits", state.view.splits.len().to_string(), None),
        cells[0],
    );
    match &lap_stats {
        Some(s) => {
            let avg = s.average_ms as i64;
            f.render_widget(
                card(
                    "Average",
                    format_duration(avg),
                    Some(format!("{:.2} min", ms_to_minutes(avg))),
                ),
                cells[1],
            );
            f.render_widget(card("Fastest", format_duration(s.fastest_ms), None), cells[2]);
            f.render_widget(card("Slowest", format_duration(s.slowest_ms), None), cells[3]);
        }
        None => {
            // Absent, not zero: no statistics without splits.
            f.render_widget(card("Average", "-".into(), None), cells[1]);
            f.render_widget(card("Fastest", "-".into(), None), cells[2]);
            f.render_widget(card("Slowest", "-".into(), None), cells[3]);
        }
    }
}

fn draw_table(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Splits ({})", state.view.splits.len()));

    if state.view.splits.is_empty() {
        let p = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No splits yet.",
                Style::default().fg(Color::Gray),
            )),
            Line::from(Span::styled(
                "Press Space to start the run, then Space again after each item.",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .block(block);
        f.render_widget(p, area);
        return;
    }

    let mut lines = vec![Line::from(Span::styled(
        format!("{:>4}  {:<28} {:>12} {:>12}", "#", "Label", "Duration", "Cumulative"),
        Style::default().fg(Color::Gray),
    ))];

    let visible = (area.height as usize).saturating_sub(3).max(1);
    let rows = stats::cumulative_rows(&state.view.splits);
    for (i, row) in rows
        .iter()
        .enumerate()
        .skip(state.scroll_offset)
        .take(visible)
    {
        let over = stats::is_over_threshold(row.duration, state.view.warning_threshold_seconds);
        let duration_style = if over {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Green)
        };
        let mut line = Line::from(vec![
            Span::styled(
                format!("{:>4}  ", i + 1),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw(format!("{:<28} ", row.label)),
            Span::styled(format!("{:>12}", format_duration(row.duration)), duration_style),
            Span::styled(
                format!(" {:>12}", format_duration(row.cumulative)),
                Style::default().fg(Color::Gray),
            ),
            Span::styled(
                if over { "  over" } else { "" }.to_string(),
                Style::default().fg(Color::Red),
            ),
        ]);
        if i == state.selected {
            line = line.style(Style::default().bg(Color::Rgb(40, 40, 48)));
        }
        lines.push(line);
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_status(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let line = match &state.input_mode {
        InputMode::Normal => Line::from(state.info.clone()),
        InputMode::ConfirmReset => Line::from(vec![
            Span::styled(
                "Clear the timer and ALL recorded splits? ",
                Style::default().fg(Color::Red),
            ),
            Span::raw("Press y to confirm, any other key to cancel."),
        ]),
        InputMode::EditNextLabel => input_line("Next label", &state.input),
        InputMode::EditRowLabel(i) => {
            input_line(&format!("Label for split #{}", i + 1), &state.input)
        }
        InputMode::EditThreshold => input_line("Warning threshold (seconds)", &state.input),
    };
    let p = Paragraph::new(vec![line]).block(Block::default().borders(Borders::ALL));
    f.render_widget(p, area);
}

fn input_line(prompt: &str, buffer: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{prompt}: "),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(buffer.to_string()),
        Span::styled("▏", Style::default().fg(Color::Yellow)),
        Span::styled(
            "  (Enter saves, Esc cancels)",
            Style::default().fg(Color::DarkGray),
        ),
    ])
}
