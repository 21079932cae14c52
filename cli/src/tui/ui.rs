//! TUI rendering.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
};

use super::app::App;

const SHORT_HELP: &str = "↑/k up | ↓/j down | t terminate | r refresh | / search | ? help | q quit";

const FULL_HELP: &[(&str, &str)] = &[
    ("↑ / k", "move up"),
    ("↓ / j", "move down"),
    ("t", "terminate the selected process (SIGTERM)"),
    ("r", "capture again"),
    ("/", "toggle search by process name"),
    ("esc", "close search or help, dismiss messages"),
    ("?", "toggle this help"),
    ("q / ctrl+c", "quit"),
];

pub fn draw<C, T, D>(f: &mut Frame, app: &mut App<C, T, D>) {
    let footer_height = if app.show_help {
        FULL_HELP.len() as u16 + 2
    } else {
        3
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),             // Header
            Constraint::Min(0),                // Table
            Constraint::Length(footer_height), // Footer
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    draw_table(f, app, chunks[1]);
    draw_footer(f, app, chunks[2]);
}

fn draw_header<C, T, D>(f: &mut Frame, app: &App<C, T, D>, area: Rect) {
    let title = if app.searching {
        format!("pvw | Search: {}_", app.search)
    } else {
        let captured = match (app.loading, app.last_capture) {
            (true, _) => "capturing...".to_string(),
            (false, Some(at)) => format!("captured {}", at.format("%H:%M:%S")),
            (false, None) => "no capture yet".to_string(),
        };
        let search = if app.search.is_empty() {
            String::new()
        } else {
            format!(" | filter: {}", app.search)
        };
        format!(
            "pvw | {} processes, {} connections{} | {}",
            app.derivation.processes.len(),
            app.derivation.connection_count(),
            search,
            captured
        )
    };

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).bold())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );

    f.render_widget(header, area);
}

fn draw_table<C, T, D>(f: &mut Frame, app: &mut App<C, T, D>, area: Rect) {
    let header_cells = app
        .columns
        .iter()
        .map(|c| Cell::from(c.title()).style(Style::default().fg(Color::Yellow).bold()));
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let rows = app.derivation.table.rows.iter().map(|row| {
        let cells = row
            .iter()
            .zip(&app.columns)
            .map(|(cell, column)| Cell::from(truncate(cell, column.width() as usize)));
        Row::new(cells)
    });

    // The last column takes whatever space is left
    let widths: Vec<Constraint> = app
        .columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let width = column.width().max(column.title().len() as u16);
            if i + 1 == app.columns.len() {
                Constraint::Min(width)
            } else {
                Constraint::Length(width)
            }
        })
        .collect();

    let title = if app.read_only {
        " Open Ports (read-only) "
    } else {
        " Open Ports "
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(title),
        )
        .row_highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

    f.render_stateful_widget(table, area, &mut app.table_state);
}

fn draw_footer<C, T, D>(f: &mut Frame, app: &App<C, T, D>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    if app.show_help {
        let lines: Vec<Line> = FULL_HELP
            .iter()
            .map(|(key, action)| {
                Line::from(vec![
                    Span::styled(format!("{:<12}", key), Style::default().fg(Color::Yellow)),
                    Span::raw(*action),
                ])
            })
            .collect();
        f.render_widget(Paragraph::new(lines).block(block), area);
        return;
    }

    let help = if app.searching {
        "Type to search | Enter or /: done | Esc: close"
    } else {
        SHORT_HELP
    };

    let line = match app.status() {
        Some(status) => {
            let color = if status.is_error { Color::Red } else { Color::Green };
            Line::from(vec![
                Span::styled(status.text.clone(), Style::default().fg(color)),
                Span::styled(format!(" | {}", help), Style::default().fg(Color::DarkGray)),
            ])
        }
        None => Line::styled(help, Style::default().fg(Color::DarkGray)),
    };

    let footer = Paragraph::new(line)
        .wrap(Wrap { trim: true })
        .block(block);

    f.render_widget(footer, area);
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}
