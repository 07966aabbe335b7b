use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table, TableState},
};

use crate::{
    app::{
        AppState, Focus,
        draft::DISPLAY_DATE_FORMAT,
        transactions::round_for_display,
    },
    ui::theme::Theme,
};

/// Sort state and total. Sorting needs two rows to matter, the total one.
pub fn render_controls(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let transactions = &state.transactions;
    let count = transactions.items.len();
    let mut spans = Vec::new();

    if count > 1 {
        spans.push(Span::styled("Sort", Style::default().fg(theme.dim)));
        spans.push(Span::raw(format!(": {}   ", transactions.sort.label())));
    }
    if count > 0 {
        spans.push(Span::styled(
            "Total",
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!(": {}", round_for_display(transactions.total())),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn render_table(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let border = if state.focus == Focus::Table {
        theme.accent
    } else {
        theme.border
    };
    let block = Block::default()
        .title(" transactions ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let transactions = &state.transactions;
    if transactions.items.is_empty() {
        let message = if transactions.is_loaded() {
            "No transactions yet."
        } else {
            "No transactions yet. Press r to load from the store."
        };
        frame.render_widget(
            Paragraph::new(Span::styled(message, Style::default().fg(theme.dim))).block(block),
            area,
        );
        return;
    }

    let rows = transactions
        .sorted()
        .into_iter()
        .map(|tx| {
            let amount = tx
                .amount
                .map(|amount| round_for_display(amount).to_string())
                .unwrap_or_default();
            Row::new(vec![
                amount,
                tx.category.label().to_string(),
                tx.description.clone(),
                tx.date.format(DISPLAY_DATE_FORMAT).to_string(),
            ])
        })
        .collect::<Vec<_>>();

    let widths = [
        Constraint::Length(10),
        Constraint::Length(16),
        Constraint::Min(12),
        Constraint::Length(10),
    ];
    let header = Row::new(vec!["Amount", "Category", "Description", "Date"])
        .style(Style::default().fg(theme.dim).add_modifier(Modifier::BOLD));

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(2)
        .row_highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("» ");

    let mut table_state = TableState::default();
    if state.focus == Focus::Table {
        table_state.select(Some(transactions.selected));
    }

    frame.render_stateful_widget(table, area, &mut table_state);
}
