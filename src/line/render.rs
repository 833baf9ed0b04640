//! Turning a line's state into terminal rows
//!
//! Every line is laid out as an optional milestone separator, the wrapped
//! source text behind a fixed-width gutter, then the wrapped translation.
//! The gutter's first cell row hosts the translate control.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

/// Columns reserved on the left of every text and translation row
pub const GUTTER: u16 = 4;

const CONTROL_IDLE: &str = "[T] ";
const CONTROL_PENDING: &str = "[…] ";
const OBSCURED: char = '░';

/// State of the translate control on the first text row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    Hidden,
    Idle,
    Pending,
}

/// Everything the renderer needs to know about one line
pub struct LineView<'a> {
    pub text: &'a str,
    pub translation: Option<&'a str>,
    pub translation_obscured: bool,
    pub milestone: Option<&'a str>,
    pub selected: bool,
    /// Char index of the edit cursor; `Some` only while editing
    pub cursor: Option<usize>,
    pub control: ControlState,
    pub preserve_whitespace: bool,
}

/// Rows produced for one line plus how they split into sections
pub struct RenderedLine {
    pub rows: Vec<Line<'static>>,
    pub milestone_rows: u16,
    pub text_rows: u16,
    pub translation_rows: u16,
}

impl RenderedLine {
    pub fn height(&self) -> u16 {
        self.milestone_rows + self.text_rows + self.translation_rows
    }
}

type Cell = (char, Style);

pub fn render(view: &LineView<'_>, width: u16) -> RenderedLine {
    let body_width = usize::from(width.saturating_sub(GUTTER)).max(1);
    let mut rows = Vec::new();

    let milestone_rows = match view.milestone {
        Some(label) => {
            rows.push(milestone_row(label, width));
            1
        }
        None => 0,
    };

    let text_cells = text_cells(view);
    let text_lines = wrap(&text_cells, body_width);
    let text_rows = text_lines.len() as u16;
    for (i, row) in text_lines.into_iter().enumerate() {
        let gutter = match (i, view.control) {
            (0, ControlState::Idle) => Span::styled(CONTROL_IDLE, Style::default().fg(Color::Cyan)),
            (0, ControlState::Pending) => {
                Span::styled(CONTROL_PENDING, Style::default().fg(Color::Yellow))
            }
            _ => Span::raw(" ".repeat(usize::from(GUTTER))),
        };
        rows.push(to_line(gutter, row));
    }

    let mut translation_rows = 0;
    if let Some(translation) = view.translation {
        let translation = translation.trim_end_matches(&['\r', '\n'][..]);
        let style = Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC);
        let cells: Vec<Cell> = if view.translation_obscured {
            obscure(translation)
                .chars()
                .map(|c| (c, Style::default().fg(Color::DarkGray)))
                .collect()
        } else {
            translation.chars().map(|c| (c, style)).collect()
        };
        for row in wrap(&cells, body_width) {
            rows.push(to_line(Span::raw(" ".repeat(usize::from(GUTTER))), row));
            translation_rows += 1;
        }
    }

    RenderedLine {
        rows,
        milestone_rows,
        text_rows,
        translation_rows,
    }
}

fn text_cells(view: &LineView<'_>) -> Vec<Cell> {
    let base = if view.selected {
        Style::default().bg(Color::Blue).fg(Color::White)
    } else {
        Style::default()
    };

    let Some(cursor) = view.cursor else {
        return display_text(view.text, view.preserve_whitespace)
            .chars()
            .map(|c| (c, base))
            .collect();
    };

    // Edit mode shows the buffer verbatim so the cursor lines up
    let base = base.add_modifier(Modifier::UNDERLINED);
    let cursor_style = Style::default().add_modifier(Modifier::REVERSED);
    let mut cells: Vec<Cell> = view.text.chars().map(|c| (c, base)).collect();
    match cells.get_mut(cursor) {
        Some(cell) if cell.0 != '\n' => cell.1 = cursor_style,
        _ => cells.insert(cursor.min(cells.len()), (' ', cursor_style)),
    }
    cells
}

/// Source text as shown outside edit mode
pub fn display_text(text: &str, preserve_whitespace: bool) -> String {
    let text = text.trim_end_matches(&['\r', '\n'][..]);
    if preserve_whitespace {
        text.to_string()
    } else {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Replace every visible char with blocks of the same display width
fn obscure(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\n' => "\n".to_string(),
            c => OBSCURED
                .to_string()
                .repeat(UnicodeWidthChar::width(c).unwrap_or(0)),
        })
        .collect()
}

fn milestone_row(label: &str, width: u16) -> Line<'static> {
    let style = Style::default().fg(Color::Magenta);
    let head = format!("── {} ", label);
    let used: usize = head.chars().filter_map(UnicodeWidthChar::width).sum();
    let tail = "─".repeat(usize::from(width).saturating_sub(used));
    Line::from(vec![
        Span::styled(head, style.add_modifier(Modifier::BOLD)),
        Span::styled(tail, style),
    ])
}

/// Break cells into rows of at most `width` columns; `\n` forces a break
fn wrap(cells: &[Cell], width: usize) -> Vec<Vec<Cell>> {
    let mut rows: Vec<Vec<Cell>> = vec![Vec::new()];
    let mut used = 0;

    for &(c, style) in cells {
        match c {
            '\n' => {
                rows.push(Vec::new());
                used = 0;
                continue;
            }
            '\r' => continue,
            _ => {}
        }
        let c = if c == '\t' { ' ' } else { c };
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > width && used > 0 {
            rows.push(Vec::new());
            used = 0;
        }
        if let Some(row) = rows.last_mut() {
            row.push((c, style));
        }
        used += w;
    }
    rows
}

/// Merge runs of equally styled cells into spans
fn to_line(gutter: Span<'static>, row: Vec<Cell>) -> Line<'static> {
    let mut spans = vec![gutter];
    let mut run = String::new();
    let mut run_style = None;

    for (c, style) in row {
        if run_style.is_some_and(|s| s != style) {
            spans.push(Span::styled(std::mem::take(&mut run), run_style.unwrap_or_default()));
        }
        run_style = Some(style);
        run.push(c);
    }
    if let Some(style) = run_style {
        spans.push(Span::styled(run, style));
    }
    Line::from(spans)
}
