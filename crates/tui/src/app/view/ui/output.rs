use crate::app::state::{GenerationState, LogKind, LogLine, LogSpan};
use crate::app::util::text::{char_width, visual_width};
use crate::app::view::markdown::element_lines;
use crate::app::{AppState, WrappedOutputCache};
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use super::super::theme::ui_colors;
use super::style::style_for;

const OUTPUT_TITLE: &str = " Architecture definition document ";
const PLACEHOLDER_LINES: [&str; 2] = [
    "The generated architecture definition document will appear here.",
    "Select the three input files above, then press Generate (Ctrl+G).",
];
const ERROR_TITLE: &str = "✖ An error occurred";

// Number of chars that fit in `width`, pulled back to the last space when the
// cut would split a word.
fn break_point(spans: &[LogSpan], width: usize) -> usize {
    let chars: Vec<char> = spans.iter().flat_map(|span| span.text.chars()).collect();
    let mut used = 0usize;
    let mut fit = 0usize;
    for ch in &chars {
        let ch_width = char_width(*ch);
        if used + ch_width > width {
            break;
        }
        used += ch_width;
        fit += 1;
    }
    if fit == 0 {
        return chars.len().min(1);
    }
    if fit >= chars.len() || chars[fit].is_whitespace() {
        return fit;
    }
    match chars[..fit].iter().rposition(|ch| ch.is_whitespace()) {
        Some(idx) if idx > 0 => idx + 1,
        _ => fit,
    }
}

fn take_spans_front(spans: &[LogSpan], chars_to_take: usize) -> Vec<LogSpan> {
    let mut remaining = chars_to_take;
    let mut out = Vec::new();
    for span in spans {
        if remaining == 0 {
            break;
        }
        let span_chars = span.text.chars().count();
        if span_chars == 0 {
            continue;
        }
        let mut next = span.clone();
        if span_chars > remaining {
            next.text = span.text.chars().take(remaining).collect();
            remaining = 0;
        } else {
            remaining -= span_chars;
        }
        out.push(next);
    }
    out
}

fn trim_spans_front(spans: &[LogSpan], chars_to_trim: usize) -> Vec<LogSpan> {
    if chars_to_trim == 0 {
        return spans.to_vec();
    }

    let mut remaining_trim = chars_to_trim;
    let mut out = Vec::new();

    for span in spans {
        if remaining_trim == 0 {
            out.push(span.clone());
            continue;
        }

        let span_chars = span.text.chars().count();
        if remaining_trim >= span_chars {
            remaining_trim -= span_chars;
            continue;
        }

        let tail: String = span.text.chars().skip(remaining_trim).collect();
        remaining_trim = 0;
        let mut next = span.clone();
        next.text = tail;
        out.push(next);
    }

    out
}

fn starts_with_space(spans: &[LogSpan]) -> bool {
    spans
        .iter()
        .find_map(|span| span.text.chars().next())
        .is_some_and(|ch| ch == ' ')
}

fn wrap_multi_span_line(line: &LogLine, width: usize) -> Vec<LogLine> {
    let mut remaining = line.spans().to_vec();
    let mut out = Vec::new();

    while remaining.iter().any(|span| !span.text.is_empty()) {
        let at = break_point(&remaining, width);
        if at == 0 {
            break;
        }
        out.push(LogLine::new_with_spans(take_spans_front(&remaining, at)));
        remaining = trim_spans_front(&remaining, at);
        // A wrapped prose line does not start with the space it broke on.
        if line.kind() != LogKind::Code && starts_with_space(&remaining) {
            remaining = trim_spans_front(&remaining, 1);
        }
    }

    if out.is_empty() {
        out.push(line.clone());
    }
    out
}

fn pad_background_line(mut line: LogLine, width: usize) -> LogLine {
    if line.kind() != LogKind::Code {
        return line;
    }
    let used: usize = line.spans().iter().map(|span| visual_width(&span.text)).sum();
    if used >= width {
        return line;
    }
    line.spans
        .push(LogSpan::new(LogKind::Code, " ".repeat(width - used)));
    line
}

pub(super) fn wrap_lines(lines: &[LogLine], width: usize) -> Vec<LogLine> {
    if width == 0 {
        return Vec::new();
    }
    let mut out = Vec::new();
    for line in lines {
        out.extend(
            wrap_multi_span_line(line, width)
                .into_iter()
                .map(|wrapped| pad_background_line(wrapped, width)),
        );
    }
    out
}

fn cached_document_lines(app: &mut AppState, width: usize) -> &[LogLine] {
    let cache_hit = matches!(
        app.wrapped_output_cache.as_ref(),
        Some(cache) if cache.width == width && cache.version == app.output_version
    );
    if !cache_hit {
        let elements = app.rendered_elements();
        let wrapped = wrap_lines(&element_lines(&elements, width), width);
        tracing::trace!(width, rows = wrapped.len(), "output rewrapped");
        app.wrapped_output_cache = Some(WrappedOutputCache {
            width,
            version: app.output_version,
            wrapped,
        });
    }
    app.wrapped_output_cache
        .as_ref()
        .map(|cache| cache.wrapped.as_slice())
        .unwrap_or(&[])
}

/// Rows shown above the document for the current state.
pub(super) fn status_lines(app: &AppState) -> Vec<LogLine> {
    let has_content = !app.generation.content().is_empty();
    match app.generation.state() {
        GenerationState::Idle if !has_content => PLACEHOLDER_LINES
            .iter()
            .map(|text| LogLine::new(LogKind::Placeholder, *text))
            .collect(),
        GenerationState::Loading(ticker) if !has_content => vec![LogLine::new(
            LogKind::Loading,
            format!("{} {}", app.spinner_frame(), ticker.message()),
        )],
        GenerationState::Error(message) => {
            let mut lines = vec![
                LogLine::new(LogKind::Error, ERROR_TITLE),
                LogLine::new(LogKind::Error, message.as_str()),
            ];
            if has_content {
                lines.push(LogLine::new(LogKind::Paragraph, ""));
            }
            lines
        }
        GenerationState::Idle | GenerationState::Loading(_) | GenerationState::Finished => {
            Vec::new()
        }
    }
}

pub(super) fn log_lines_to_lines(lines: &[LogLine]) -> Vec<Line<'static>> {
    lines
        .iter()
        .map(|line| {
            let styled = line
                .spans()
                .iter()
                .map(|span| Span::styled(span.text.clone(), style_for(span)))
                .collect::<Vec<_>>();
            Line::from(styled)
        })
        .collect()
}

pub(super) fn render_output(f: &mut Frame, area: Rect, app: &mut AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ui_colors().panel_border_fg))
        .title(OUTPUT_TITLE);
    let inner = block.inner(area);
    f.render_widget(block, area);
    let width = inner.width as usize;
    let height = inner.height as usize;
    if width == 0 || height == 0 {
        return;
    }

    let header = wrap_lines(&status_lines(app), width);
    let document_total = cached_document_lines(app, width).len();
    let total = header.len() + document_total;

    // Keep the same rows in view while the user is scrolled up.
    if app.scroll_from_bottom > 0 && app.last_wrap_width == width {
        let added = total.saturating_sub(app.last_wrapped_total);
        app.scroll_from_bottom = app.scroll_from_bottom.saturating_add(added);
    }
    let max_scroll = total.saturating_sub(height);
    app.scroll_from_bottom = app.scroll_from_bottom.min(max_scroll);
    app.last_wrapped_total = total;
    app.last_wrap_width = width;
    app.last_output_viewport_height = height;

    let end = total.saturating_sub(app.scroll_from_bottom);
    let start = end.saturating_sub(height);
    let document = cached_document_lines(app, width);
    let visible: Vec<LogLine> = header
        .iter()
        .chain(document.iter())
        .skip(start)
        .take(end - start)
        .cloned()
        .collect();
    f.render_widget(Paragraph::new(log_lines_to_lines(&visible)), inner);
}
