pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{AppState, Focus};

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

/// Height of the form block: four fields, the error line and borders.
const FORM_HEIGHT: u16 = 7;

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let theme = Theme::default();
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),           // Info bar
            Constraint::Length(FORM_HEIGHT), // Form
            Constraint::Length(1),           // Sort + total
            Constraint::Min(0),              // Table
            Constraint::Length(1),           // Bottom bar
        ])
        .split(area);

    render_info_bar(frame, layout[0], state, &theme);
    screens::form::render(frame, layout[1], state, &theme);
    screens::transactions::render_controls(frame, layout[2], state, &theme);
    screens::transactions::render_table(frame, layout[3], state, &theme);
    render_bottom_bar(frame, layout[4], state, &theme);
    components::toast::render(frame, area, state.toast.as_ref());
}

fn render_info_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let refresh = state
        .transactions
        .last_refresh
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    let (status, status_style) = if state.connected {
        ("OK", Style::default().fg(theme.positive))
    } else {
        ("ERR", Style::default().fg(theme.error))
    };

    let line = Line::from(vec![
        Span::styled("Penny Planner", Style::default().fg(theme.accent)),
        Span::raw("  "),
        Span::styled("Store", Style::default().fg(theme.dim)),
        Span::raw(format!(": {}  ", state.base_url)),
        Span::styled("Refresh", Style::default().fg(theme.dim)),
        Span::raw(format!(": {refresh}  ")),
        Span::styled(status, status_style),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    if state.confirm_delete_all {
        let count = state.transactions.items.len();
        let line = Line::from(vec![
            Span::styled(
                format!("Delete all {count} transactions?"),
                Style::default().fg(theme.error),
            ),
            Span::raw("  "),
            Span::styled("y", Style::default().fg(theme.accent)),
            Span::raw(" confirm  "),
            Span::styled("any key", Style::default().fg(theme.accent)),
            Span::raw(" cancel"),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let mut parts = components::hints::hints_to_spans(&context_hints(state), theme);
    parts.push(components::hints::hint_separator(theme));
    parts.push(Span::styled("Ctrl+C", Style::default().fg(theme.accent)));
    parts.push(Span::raw(" quit"));

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}

fn context_hints(state: &AppState) -> Vec<components::hints::KeyHint> {
    use components::hints::KeyHint;

    let count = state.transactions.items.len();
    match state.focus {
        Focus::Table => {
            let mut hints = vec![
                KeyHint::new("↑↓", "select"),
                KeyHint::new("d", "delete"),
            ];
            if count > 1 {
                hints.push(KeyHint::new("s", "sort date"));
                hints.push(KeyHint::new("c", "sort category"));
            }
            if count >= 2 {
                hints.push(KeyHint::new("D", "delete all"));
            }
            hints.push(KeyHint::new("r", "reload"));
            hints.push(KeyHint::new("a", "add"));
            hints
        }
        Focus::Category => vec![
            KeyHint::new("←→", "category"),
            KeyHint::new("Tab", "next"),
            KeyHint::new("Enter", "submit"),
            KeyHint::new("Esc", "table"),
        ],
        _ => vec![
            KeyHint::new("Tab", "next"),
            KeyHint::new("Enter", "submit"),
            KeyHint::new("Esc", "table"),
        ],
    }
}
