use crate::app::state::{GenerationState, NoticeLevel};
use crate::app::util::text::truncate_to_width;
use crate::app::AppState;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use std::time::Duration;

use super::super::theme::ui_colors;

const KEY_HINTS: &str = "Tab focus • Enter choose • Ctrl+G generate • Ctrl+Y copy code • Alt+Y copy doc • Alt+V paste image • q quit";

fn format_elapsed(duration: Duration) -> String {
    format!("{:.1}s", duration.as_secs_f64())
}

pub(super) fn build_run_line(app: &AppState, width: usize) -> Line<'static> {
    let generation = &app.generation;
    let state = generation.state();
    let mut label = format!("● {}", state.label());
    if let Some(message) = generation.loading_message() {
        label.push_str(&format!(" {} {message}", app.spinner_frame()));
    }
    if generation.chunk_count() > 0 {
        label.push_str(&format!("  chunks: {}", generation.chunk_count()));
    }
    if let Some(duration) = generation.duration() {
        label.push_str(&format!("  {}", format_elapsed(duration)));
    }
    let theme = ui_colors();
    let style = match state {
        GenerationState::Loading(_) => Style::default().fg(theme.run_ready_fg),
        GenerationState::Finished => Style::default().fg(theme.run_completed_fg),
        GenerationState::Error(_) => Style::default()
            .fg(theme.run_error_fg)
            .add_modifier(Modifier::BOLD),
        GenerationState::Idle => Style::default().add_modifier(Modifier::DIM),
    };
    Line::from(Span::styled(truncate_to_width(&label, width), style))
}

pub(super) fn build_status_line(app: &AppState, width: usize) -> Line<'static> {
    let theme = ui_colors();
    let key_state = if app.config.has_credential() {
        "API key: set"
    } else {
        "API key: missing"
    };
    let summary = format!(
        "model: {}  •  {key_state}  •  files: {}/3",
        app.config.model,
        app.files.populated_count()
    );
    let mut spans = vec![Span::styled(
        summary.clone(),
        Style::default().add_modifier(Modifier::DIM),
    )];
    let mut used = summary.chars().count();
    let tail = match app.notice.as_ref() {
        Some(notice) => {
            let color = match notice.level {
                NoticeLevel::Info => theme.file_ok_fg,
                NoticeLevel::Warn => theme.warn_fg,
                NoticeLevel::Error => theme.error_fg,
            };
            (notice.text.clone(), Style::default().fg(color))
        }
        None => (
            KEY_HINTS.to_string(),
            Style::default().add_modifier(Modifier::DIM),
        ),
    };
    used += 5;
    if width > used {
        spans.push(Span::styled("  •  ", Style::default().add_modifier(Modifier::DIM)));
        spans.push(Span::styled(truncate_to_width(&tail.0, width - used), tail.1));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::{build_run_line, build_status_line, format_elapsed};
    use crate::app::state::NoticeLevel;
    use crate::app::test_support::{app_with, fill_all_slots, run_to_completion};
    use std::time::{Duration, Instant};

    fn text(line: &ratatui::text::Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn run_line_reports_state_chunks_and_elapsed() {
        let mut app = app_with(vec!["# A\n", "b"], None);
        assert_eq!(text(&build_run_line(&app, 80)), "● idle");

        fill_all_slots(&mut app);
        app.submit(Instant::now());
        assert!(text(&build_run_line(&app, 80)).starts_with("● generating"));

        run_to_completion(&mut app);
        let line = text(&build_run_line(&app, 80));
        assert!(line.starts_with("● finished"));
        assert!(line.contains("chunks: 2"));
        assert!(line.ends_with('s'));
    }

    #[test]
    fn status_line_shows_notice_over_hints() {
        let mut app = app_with(Vec::new(), None);
        let idle = text(&build_status_line(&app, 200));
        assert!(idle.contains("API key: set"));
        assert!(idle.contains("files: 0/3"));
        assert!(idle.contains("Ctrl+G generate"));

        app.set_notice(NoticeLevel::Warn, "careful", Instant::now());
        let noticed = text(&build_status_line(&app, 200));
        assert!(noticed.ends_with("careful"));
        assert!(!noticed.contains("Ctrl+G generate"));
    }

    #[test]
    fn elapsed_is_shown_in_tenths() {
        assert_eq!(format_elapsed(Duration::from_millis(1250)), "1.2s");
    }
}
