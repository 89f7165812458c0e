// tui/ui.rs - Stateless ratatui rendering

use super::app::{App, Status};
use crate::edit::EditSession;
use crate::entry::EntryKind;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

const TITLE_FG: Color = Color::Rgb(0xFF, 0xFD, 0xF5);
const STATUS_OK: Color = Color::Rgb(0x04, 0xB5, 0x75);

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

/// Presentation settings. Built once from config and only read here.
#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    pub accent: Color,
}

impl Theme {
    /// Accepts a colour name or `#RRGGBB`; unknown values fall back to green.
    pub fn from_accent(accent: &str) -> Self {
        let accent = accent.parse::<Color>().unwrap_or_else(|_| {
            log::warn!("unknown accent colour '{}', using default", accent);
            Color::Green
        });
        Theme { accent }
    }

    fn title(&self) -> Style {
        Style::default()
            .fg(TITLE_FG)
            .bg(self.accent)
            .add_modifier(Modifier::BOLD)
    }
}

// ---------------------------------------------------------------------------
// Style helpers
// ---------------------------------------------------------------------------

fn kind_color(kind: EntryKind) -> Color {
    match kind {
        EntryKind::Default => Color::Yellow,
        EntryKind::Remote => Color::Cyan,
        EntryKind::Project => Color::White,
    }
}

/// Cursor arrow indicator.
fn cursor_char(is_cursor: bool) -> &'static str {
    if is_cursor {
        "▶"
    } else {
        " "
    }
}

/// Fit `value` into `room` columns. With `keep_tail` the end stays visible,
/// otherwise the start.
fn fit_value(value: &str, room: usize, keep_tail: bool) -> String {
    let len = value.chars().count();
    if len <= room {
        return value.to_string();
    }
    if room == 0 {
        return String::new();
    }
    let keep = room - 1;
    if keep_tail {
        let tail: String = value.chars().skip(len - keep).collect();
        format!("…{}", tail)
    } else {
        let head: String = value.chars().take(keep).collect();
        format!("{}…", head)
    }
}

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &App, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(5),    // content
            Constraint::Length(3), // footer
        ])
        .split(frame.area());

    draw_header(frame, app, theme, chunks[0]);

    match app.session() {
        Some(session) => draw_form(frame, session, theme, chunks[1]),
        None => draw_entry_list(frame, app, theme, chunks[1]),
    }

    draw_footer(frame, app, chunks[2]);
}

fn draw_header(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let manifest = app.manifest();
    let lines = vec![
        Line::from(vec![Span::styled(" Parsed Manifest ", theme.title())]),
        Line::from(vec![Span::raw(format!(
            "  {}  ({} remotes, {} projects)",
            app.path.display(),
            manifest.remotes.len(),
            manifest.projects.len()
        ))]),
    ];
    let block = Block::default().borders(Borders::BOTTOM);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_entry_list(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let items: Vec<ListItem> = app
        .entries()
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let is_cursor = idx == app.cursor;
            let title_style = if is_cursor {
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(kind_color(entry.kind))
            };
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(format!(" {} ", cursor_char(is_cursor)), title_style),
                    Span::styled(entry.title.clone(), title_style),
                ]),
                Line::from(Span::styled(
                    format!("   {}", entry.summary),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    // Fresh state per frame; ratatui scrolls to keep the selection visible
    let mut state = ListState::default().with_selected(app.selected_entry().map(|_| app.cursor));
    let list = List::new(items).block(Block::default().borders(Borders::NONE));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_form(frame: &mut Frame, session: &EditSession, theme: &Theme, area: Rect) {
    let width = session
        .fields()
        .iter()
        .map(|f| f.label.len())
        .max()
        .unwrap_or(0);

    // Borders, the cursor column and the padded label
    let prefix = 2 + 3 + width + 3;
    let inner = area.width as usize;

    let lines: Vec<Line> = session
        .fields()
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let focused = idx == session.focus();
            let suffix = usize::from(focused) + 3 * usize::from(field.is_modified());
            let room = inner.saturating_sub(prefix + suffix);
            let label_style = if focused {
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            let mut spans = vec![
                Span::styled(format!(" {} ", cursor_char(focused)), label_style),
                Span::styled(format!("{:<width$} : ", field.label, width = width), label_style),
                Span::raw(fit_value(&field.value, room, focused)),
            ];
            if focused {
                spans.push(Span::styled("█", Style::default().fg(theme.accent)));
            }
            if field.is_modified() {
                spans.push(Span::styled("  *", Style::default().fg(Color::Yellow)));
            }
            Line::from(spans)
        })
        .collect();

    let marker = if session.is_modified() { " [modified]" } else { "" };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(kind_color(session.kind())))
        .title(format!(" Edit {}{} ", session.title(), marker))
        .title_bottom(format!(" {} ", session.focused().label));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let status_line = match &app.status {
        Some(status) => {
            let color = match status {
                Status::Warning(_) => Color::Yellow,
                _ if status.is_error() => Color::Red,
                _ => STATUS_OK,
            };
            Line::from(Span::styled(
                format!(" {}", status.text()),
                Style::default().fg(color),
            ))
        }
        None => Line::from(""),
    };

    let hints = if app.is_editing() {
        " [Tab/↑↓] field  [Enter] save  [Ctrl-U] clear  [Esc] cancel"
    } else {
        " [↑↓/jk] move  [Enter] edit  [R] reload  [Q] quit"
    };

    let lines = vec![
        status_line,
        Line::from(Span::styled(hints, Style::default().fg(Color::DarkGray))),
    ];
    let block = Block::default().borders(Borders::TOP);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
