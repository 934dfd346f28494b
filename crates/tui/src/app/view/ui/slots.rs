use crate::app::state::files::format_size;
use crate::app::state::{PathComposer, SlotKind};
use crate::app::util::text::{truncate_front_to_width, truncate_to_width, visual_width};
use crate::app::{AppState, Focus};
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use super::super::theme::ui_colors;

const SLOTS_TITLE: &str = " Input files ";
const FOCUS_MARKER: &str = "› ";
const COMPOSER_PROMPT: &str = "path: ";
const LABEL_WIDTH: usize = 34;

/// Three slot rows plus the Generate row, inside a border.
pub(super) const SLOTS_PANEL_HEIGHT: u16 = 6;

fn marker(focused: bool) -> Span<'static> {
    let theme = ui_colors();
    if focused {
        Span::styled(FOCUS_MARKER, Style::default().fg(theme.accent_fg))
    } else {
        Span::raw("  ")
    }
}

fn padded_label(kind: SlotKind) -> String {
    let label = kind.label();
    let pad = LABEL_WIDTH.saturating_sub(visual_width(label));
    format!("{label}{}", " ".repeat(pad))
}

pub(super) fn slot_line(app: &AppState, kind: SlotKind, width: usize) -> Line<'static> {
    let theme = ui_colors();
    let focused = app.focus == Focus::Slot(kind);
    let mut spans = vec![
        marker(focused),
        Span::styled(
            padded_label(kind),
            Style::default()
                .fg(theme.text_fg)
                .add_modifier(Modifier::BOLD),
        ),
    ];
    let budget = width.saturating_sub(2 + LABEL_WIDTH);
    match app.files.get(kind) {
        Some(file) => {
            let detail = format!("  {}, {}", format_size(file.size), file.mime_type);
            let name_budget = budget.saturating_sub(visual_width(&detail) + 2);
            let mut name_style = Style::default().fg(theme.file_ok_fg);
            if !file.matches_accepted(kind) {
                name_style = Style::default().fg(theme.warn_fg);
                spans.push(Span::styled("⚠ ", name_style));
            }
            spans.push(Span::styled(
                truncate_front_to_width(&file.name, name_budget.max(8)),
                name_style,
            ));
            spans.push(Span::styled(detail, Style::default().fg(theme.muted_fg)));
        }
        None => {
            let hint = format!("Enter to choose a file ({})", kind.accepted_hint());
            spans.push(Span::styled(
                truncate_to_width(&hint, budget),
                Style::default()
                    .fg(theme.muted_fg)
                    .add_modifier(Modifier::DIM),
            ));
        }
    }
    let line = Line::from(spans);
    if focused {
        line.style(Style::default().bg(theme.focus_bg))
    } else {
        line
    }
}

// Returns the row and the cursor column relative to the row start.
fn composer_line(composer: &PathComposer, width: usize) -> (Line<'static>, u16) {
    let theme = ui_colors();
    let prefix = format!("{FOCUS_MARKER}{} {COMPOSER_PROMPT}", composer.slot.label());
    let before: String = composer.input.buffer[..composer.input.cursor].iter().collect();
    let after: String = composer.input.buffer[composer.input.cursor..].iter().collect();
    let room = width.saturating_sub(visual_width(&prefix) + 1);
    // Keep the cursor visible by dropping text from the front of the path.
    let shown_before = truncate_front_to_width(&before, room);
    let shown_after = truncate_to_width(&after, room.saturating_sub(visual_width(&shown_before)));
    let cursor_col = visual_width(&prefix) + visual_width(&shown_before);
    let style = Style::default().bg(theme.composer_bg).fg(theme.text_fg);
    let line = Line::from(vec![
        Span::styled(prefix, style.fg(theme.accent_fg)),
        Span::styled(shown_before, style),
        Span::styled(shown_after, style),
    ])
    .style(style);
    (line, cursor_col.min(u16::MAX as usize) as u16)
}

pub(super) fn generate_line(app: &AppState) -> Line<'static> {
    let theme = ui_colors();
    let focused = app.focus == Focus::Generate;
    let label = if app.is_running() {
        format!("[ Generating… {} ]", app.spinner_frame())
    } else {
        "[ Generate ]".to_string()
    };
    let button_style = if app.can_submit() {
        Style::default()
            .fg(theme.accent_fg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(theme.muted_fg)
            .add_modifier(Modifier::DIM)
    };
    let hint = format!(
        "  {} of 3 files selected  •  Ctrl+G",
        app.files.populated_count()
    );
    let line = Line::from(vec![
        marker(focused),
        Span::styled(label, button_style),
        Span::styled(hint, Style::default().fg(theme.muted_fg)),
    ]);
    if focused {
        line.style(Style::default().bg(theme.focus_bg))
    } else {
        line
    }
}

pub(super) fn render_slots(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ui_colors().panel_border_fg))
        .title(SLOTS_TITLE);
    let inner = block.inner(area);
    f.render_widget(block, area);
    let width = inner.width as usize;
    if width == 0 || inner.height == 0 {
        return;
    }

    let mut lines = Vec::with_capacity(SlotKind::ALL.len() + 1);
    let mut cursor = None;
    for (row, kind) in SlotKind::ALL.into_iter().enumerate() {
        match app.composer.as_ref().filter(|composer| composer.slot == kind) {
            Some(composer) => {
                let (line, col) = composer_line(composer, width);
                cursor = Some(Position::new(
                    inner.x.saturating_add(col.min(inner.width.saturating_sub(1))),
                    inner.y.saturating_add(row as u16),
                ));
                lines.push(line);
            }
            None => lines.push(slot_line(app, kind, width)),
        }
    }
    lines.push(generate_line(app));
    f.render_widget(Paragraph::new(lines), inner);
    if let Some(position) = cursor {
        if position.y < inner.y.saturating_add(inner.height) {
            f.set_cursor_position(position);
        }
    }
}
