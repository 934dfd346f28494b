mod output;
mod slots;
mod status;
mod style;

use crate::app::AppState;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph};
use ratatui::Frame;

use self::output::render_output;
use self::slots::{render_slots, SLOTS_PANEL_HEIGHT};
use self::status::{build_run_line, build_status_line};
use super::theme::ui_colors;

const HEADER_TITLE: &str = "4+1 View Architecture Definition Generator";
const HEADER_SUBTITLE: &str = "requirements + sequence diagram + configuration image → document";

fn header_line(width: usize) -> Line<'static> {
    let theme = ui_colors();
    let mut spans = vec![Span::styled(
        HEADER_TITLE,
        Style::default()
            .fg(theme.accent_fg)
            .add_modifier(Modifier::BOLD),
    )];
    if width > HEADER_TITLE.len() + HEADER_SUBTITLE.chars().count() + 3 {
        spans.push(Span::styled(
            format!("   {HEADER_SUBTITLE}"),
            Style::default().fg(theme.muted_fg),
        ));
    }
    Line::from(spans)
}

pub fn draw_ui(f: &mut Frame, app: &mut AppState) {
    let size = f.area();
    if size.width == 0 || size.height == 0 {
        return;
    }

    // Paragraph does not overwrite every cell; clear to avoid ghosts on scroll.
    f.render_widget(Clear, size);

    let [header_area, slots_area, output_area, run_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(SLOTS_PANEL_HEIGHT),
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(size);

    let width = size.width as usize;
    f.render_widget(Paragraph::new(header_line(width)), header_area);
    render_slots(f, slots_area, app);
    render_output(f, output_area, app);
    render_line(f, run_area, build_run_line(app, width));
    render_line(f, status_area, build_status_line(app, width));
}

fn render_line(f: &mut Frame, area: Rect, line: Line<'static>) {
    if area.height > 0 {
        f.render_widget(Paragraph::new(line), area);
    }
}

#[cfg(test)]
mod tests {
    use super::draw_ui;
    use crate::app::test_support::{app_with, fill_all_slots, run_to_completion};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::time::Instant;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width.max(1) as usize;
        let mut out = String::new();
        for row in buffer.content.chunks(width) {
            for cell in row {
                out.push_str(cell.symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn idle_screen_shows_slots_and_placeholder() {
        let mut app = app_with(Vec::new(), None);
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).expect("terminal");
        terminal.draw(|f| draw_ui(f, &mut app)).expect("draw");
        let screen = screen_text(&terminal);
        assert!(screen.contains("1. Requirements"));
        assert!(screen.contains("2. Sequence diagram"));
        assert!(screen.contains("[ Generate ]"));
        assert!(screen.contains("will appear here"));
        assert!(screen.contains("● idle"));
    }

    #[test]
    fn finished_document_is_rendered_in_the_output_pane() {
        let mut app = app_with(vec!["# Overview\n", "- logical view\n"], None);
        fill_all_slots(&mut app);
        app.submit(Instant::now());
        run_to_completion(&mut app);

        let mut terminal = Terminal::new(TestBackend::new(100, 24)).expect("terminal");
        terminal.draw(|f| draw_ui(f, &mut app)).expect("draw");
        let screen = screen_text(&terminal);
        assert!(screen.contains("Overview"));
        assert!(screen.contains("• logical view"));
        assert!(screen.contains("● finished"));
        assert!(!screen.contains("will appear here"));
    }

    #[test]
    fn tiny_terminals_do_not_panic() {
        let mut app = app_with(Vec::new(), None);
        let mut terminal = Terminal::new(TestBackend::new(10, 3)).expect("terminal");
        terminal.draw(|f| draw_ui(f, &mut app)).expect("draw");
    }
}
