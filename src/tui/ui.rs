// UI rendering
//
// One frame is drawn top to bottom: title bar, transcript, log strip, status
// bar, then the toast on top. Drawing the transcript also tells every line
// component where it landed so pointer input can be routed back to it.

use super::app::App;
use crate::config::VERSION;
use crate::line::RenderedLine;
use crate::logging::{LogEntry, LogLevel};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

pub fn draw(f: &mut Frame, app: &mut App) {
    let log_height = log_strip_height(app.log_strip_lines);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),                // Title bar
            Constraint::Min(3),                   // Transcript
            Constraint::Length(log_height),       // Logs
            Constraint::Length(1),                // Status bar
        ])
        .split(f.area());

    render_title(f, chunks[0], app);
    render_transcript(f, chunks[1], app);
    if log_height > 0 {
        render_logs(f, chunks[2], app);
    }
    render_status(f, chunks[3], app);

    if let Some(toast) = &app.toast {
        toast.render(f, chunks[1]);
    }
}

fn render_title(f: &mut Frame, area: Rect, app: &App) {
    let source = app
        .source
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(empty)".to_string());

    let mut spans = vec![
        Span::styled(
            format!(" linecast v{} ", VERSION),
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::raw(source),
    ];
    if app.is_detached() {
        spans.push(Span::styled("  [detached]", Style::default().fg(Color::DarkGray)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Lay out every line, scroll, draw the visible rows and record regions
fn render_transcript(f: &mut Frame, area: Rect, app: &mut App) {
    let block = Block::default().borders(Borders::TOP);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let order: Vec<usize> = if app.reverse_order() {
        (0..app.components.len()).rev().collect()
    } else {
        (0..app.components.len()).collect()
    };

    let rendered: Vec<(usize, RenderedLine)> = order
        .into_iter()
        .map(|i| (i, app.components[i].render(inner.width)))
        .collect();

    let total: usize = rendered.iter().map(|(_, r)| usize::from(r.height())).sum();
    app.scroll.update_dimensions(total, usize::from(inner.height));
    app.apply_pending_scroll();
    let offset = app.scroll.offset();

    let mut rows: Vec<Line<'static>> = Vec::with_capacity(total);
    let mut row = 0usize;
    for (i, line) in rendered {
        let height = usize::from(line.height());
        let component = &mut app.components[i];
        if row + height <= offset || row >= offset + usize::from(inner.height) {
            component.unplace();
        } else {
            let top = i32::from(inner.y) + row as i32 - offset as i32;
            component.place(inner.x, top, inner.width, &line, inner);
        }
        row += height;
        rows.extend(line.rows);
    }

    let visible: Vec<Line<'static>> = rows
        .into_iter()
        .skip(offset)
        .take(usize::from(inner.height))
        .collect();
    f.render_widget(Paragraph::new(visible), inner);
}

/// Log strip height including borders
fn log_strip_height(lines: u16) -> u16 {
    if lines == 0 {
        0
    } else {
        lines.saturating_add(2)
    }
}

fn render_logs(f: &mut Frame, area: Rect, app: &App) {
    let height = usize::from(area.height.saturating_sub(2));
    let items: Vec<ListItem> = app
        .log_buffer
        .recent(height)
        .iter()
        .map(|entry| ListItem::new(format_log_entry(entry)).style(log_level_style(entry.level)))
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" Logs "));
    f.render_widget(list, area);
}

fn format_log_entry(entry: &LogEntry) -> String {
    let target = entry.target.rsplit("::").next().unwrap_or(&entry.target);
    format!(
        "[{}] {:5} {}: {}",
        entry.timestamp.format("%H:%M:%S"),
        entry.level.as_str(),
        target,
        entry.message
    )
}

fn log_level_style(level: LogLevel) -> Style {
    match level {
        LogLevel::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        LogLevel::Warn => Style::default().fg(Color::Yellow),
        LogLevel::Info => Style::default().fg(Color::Blue),
        LogLevel::Debug => Style::default().fg(Color::Gray),
        LogLevel::Trace => Style::default().fg(Color::DarkGray),
    }
}

fn render_status(f: &mut Frame, area: Rect, app: &App) {
    let key = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::DarkGray);

    let mut spans = vec![Span::raw(format!(
        " {} lines │ {} selected ",
        app.components.len(),
        app.selected_lines().len()
    ))];
    if let Some(id) = app.editing() {
        spans.push(Span::styled(
            format!("│ editing line {} ", id),
            Style::default().fg(Color::Yellow),
        ));
    }
    if !app.has_credential() {
        spans.push(Span::styled("│ no API key ", Style::default().fg(Color::Red)));
    }
    spans.push(Span::styled("│ ", dim));
    for (k, label) in [("q", "quit"), ("t", "translate"), ("y", "copy"), ("Esc", "clear")] {
        spans.push(Span::styled(k, key));
        spans.push(Span::styled(format!(" {}  ", label), dim));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_log_entry_shows_short_target() {
        let entry = LogEntry {
            timestamp: Utc::now(),
            level: LogLevel::Error,
            target: "linecast::translate".to_string(),
            message: "Translation failed line=3".to_string(),
        };
        let formatted = format_log_entry(&entry);
        assert!(formatted.contains("ERROR translate: Translation failed line=3"));
    }

    #[test]
    fn test_log_strip_hidden_at_zero_lines() {
        assert_eq!(log_strip_height(0), 0);
        assert_eq!(log_strip_height(4), 6);
    }
}
