use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn bind(key: &str, pad: usize, action: &str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key.to_string(), Style::default().fg(Color::Magenta)),
        Span::raw(" ".repeat(pad.saturating_sub(key.len()))),
        Span::raw(action.to_string()),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        bind("Space", 12, "Record a split (starts the run when stopped)"),
        bind("s", 12, "Start / stop the clock"),
        bind("u / Bksp", 12, "Undo the last split"),
        bind("r", 12, "Reset timer and splits (asks for confirmation)"),
        bind("n", 12, "Edit the next-label suggestion"),
        Line::from(""),
        Line::from("Split table:"),
        bind("j/k or ↑/↓", 12, "Move selection"),
        bind("e", 12, "Edit the selected split's label"),
        bind("d", 12, "Delete the selected split"),
        Line::from(""),
        Line::from("Settings & export:"),
        bind("t", 12, "Set the warning threshold (seconds)"),
        bind("c", 12, "Export CSV to the working directory"),
        bind("y", 12, "Copy the split table to the clipboard"),
        Line::from(""),
        bind("Tab / ?", 12, "Switch tabs / show this help"),
        bind("q / Ctrl-C", 12, "Quit (state is saved after every change)"),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
