use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::{
    app::{AppState, Focus},
    ui::theme::Theme,
};

const LABEL_WIDTH: usize = 13;

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let border = if state.focus.is_form() {
        theme.accent
    } else {
        theme.border
    };
    let title = if state.transactions.draft.is_empty() {
        " new transaction "
    } else {
        " new transaction * "
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Amount
            Constraint::Length(1), // Category
            Constraint::Length(1), // Description
            Constraint::Length(1), // Date
            Constraint::Length(1), // Error
        ])
        .split(inner);

    let draft = &state.transactions.draft;
    let category = draft.category.map(|c| c.label()).unwrap_or_default();

    let fields = [
        (Focus::Amount, draft.amount.as_str(), "--Enter a value greater than 0"),
        (Focus::Category, category, "--Select a category"),
        (Focus::Description, draft.description.as_str(), "--Optional"),
        (Focus::Date, draft.date.as_str(), "--DD/MM/YYYY"),
    ];
    for (row, (field, value, placeholder)) in rows.iter().zip(fields) {
        let line = input_line(field, value, placeholder, state.focus == field, theme);
        frame.render_widget(Paragraph::new(line), *row);
    }

    if let Some(message) = &state.transactions.error {
        frame.render_widget(
            Paragraph::new(Span::styled(
                message.as_str(),
                Style::default().fg(theme.error),
            )),
            rows[4],
        );
    }
}

fn input_line(
    field: Focus,
    value: &str,
    placeholder: &str,
    focused: bool,
    theme: &Theme,
) -> Line<'static> {
    let label_style = if focused {
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.dim)
    };
    let label = Span::styled(
        format!("{:<width$}", field.label(), width = LABEL_WIDTH),
        label_style,
    );

    let body = if value.is_empty() {
        Span::styled(placeholder.to_string(), Style::default().fg(theme.dim))
    } else if field == Focus::Category && focused {
        Span::styled(format!("◂ {value} ▸"), Style::default().fg(theme.accent))
    } else {
        let style = if focused {
            Style::default().fg(theme.accent)
        } else {
            Style::default().fg(theme.text)
        };
        Span::styled(value.to_string(), style)
    };

    let mut spans = vec![label, body];
    if focused && field != Focus::Category {
        spans.push(Span::styled("│", Style::default().fg(theme.accent)));
    }
    Line::from(spans)
}
