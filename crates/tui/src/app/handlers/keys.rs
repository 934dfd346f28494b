use crate::app::state::InputState;
use crate::app::{AppState, Focus};
use crossterm::event::{KeyCode, KeyModifiers, MouseEventKind};
use std::time::Instant;

const WHEEL_STEP: usize = 3;

fn handle_input_edit_key(input: &mut InputState, key: KeyCode, modifiers: KeyModifiers) -> bool {
    match (key, modifiers) {
        (KeyCode::Char('u'), mods) if mods.contains(KeyModifiers::CONTROL) => {
            input.clear();
            true
        }
        (KeyCode::Char('k'), mods) if mods.contains(KeyModifiers::CONTROL) => {
            input.kill_to_end();
            true
        }
        (KeyCode::Char('w'), mods) if mods.contains(KeyModifiers::CONTROL) => {
            input.delete_segment_back();
            true
        }
        (KeyCode::Char('a'), mods) if mods.contains(KeyModifiers::CONTROL) => {
            input.move_home();
            true
        }
        (KeyCode::Char('e'), mods) if mods.contains(KeyModifiers::CONTROL) => {
            input.move_end();
            true
        }
        (KeyCode::Left, _) => {
            input.move_left();
            true
        }
        (KeyCode::Right, _) => {
            input.move_right();
            true
        }
        (KeyCode::Home, _) => {
            input.move_home();
            true
        }
        (KeyCode::End, _) => {
            input.move_end();
            true
        }
        (KeyCode::Delete, _) => {
            input.delete();
            true
        }
        (KeyCode::Backspace, _) => {
            input.backspace();
            true
        }
        (KeyCode::Char(ch), mods) => {
            if mods.contains(KeyModifiers::CONTROL) || mods.contains(KeyModifiers::ALT) {
                return false;
            }
            input.insert_char(ch);
            true
        }
        _ => false,
    }
}

fn handle_composer_key(app: &mut AppState, key: KeyCode, modifiers: KeyModifiers, now: Instant) -> bool {
    match key {
        KeyCode::Esc => {
            app.cancel_composer();
            true
        }
        KeyCode::Enter => {
            app.commit_composer(now);
            true
        }
        KeyCode::Tab => app.complete_composer(),
        _ => match app.composer.as_mut() {
            Some(composer) => handle_input_edit_key(&mut composer.input, key, modifiers),
            None => false,
        },
    }
}

fn activate_focus(app: &mut AppState, now: Instant) {
    match app.focus {
        Focus::Slot(kind) => app.open_composer(kind),
        Focus::Generate => app.submit(now),
    }
}

/// Returns true when the screen needs a redraw.
pub(crate) fn handle_key(app: &mut AppState, key: KeyCode, modifiers: KeyModifiers, now: Instant) -> bool {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    let alt = modifiers.contains(KeyModifiers::ALT);

    if ctrl && matches!(key, KeyCode::Char('c') | KeyCode::Char('q')) {
        app.should_quit = true;
        return true;
    }
    if app.composer.is_some() {
        return handle_composer_key(app, key, modifiers, now);
    }

    match key {
        KeyCode::Char('g') if ctrl => app.submit(now),
        KeyCode::Char('y') if ctrl => app.copy_code_block(now),
        KeyCode::Char('y') if alt => app.copy_document(now),
        KeyCode::Char('v') if alt => app.paste_clipboard_image(now),
        KeyCode::Char('q') if modifiers.is_empty() => app.should_quit = true,
        KeyCode::Tab | KeyCode::Down => app.focus_next(),
        KeyCode::BackTab | KeyCode::Up => app.focus_prev(),
        KeyCode::Enter | KeyCode::Char(' ') => activate_focus(app, now),
        KeyCode::Delete | KeyCode::Backspace => match app.focused_slot() {
            Some(kind) => return app.clear_slot(kind, now),
            None => return false,
        },
        KeyCode::PageUp => app.scroll_page_up(),
        KeyCode::PageDown => app.scroll_page_down(),
        KeyCode::Home => app.scroll_to_top(),
        KeyCode::End => app.scroll_to_bottom(),
        _ => return false,
    }
    true
}

pub(crate) fn handle_mouse_event(app: &mut AppState, kind: MouseEventKind) -> bool {
    match kind {
        MouseEventKind::ScrollUp => {
            app.scroll_up(WHEEL_STEP);
            true
        }
        MouseEventKind::ScrollDown => {
            app.scroll_down(WHEEL_STEP);
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{handle_key, handle_mouse_event};
    use crate::app::error::VALIDATION_MESSAGE;
    use crate::app::state::SlotKind;
    use crate::app::test_support::{app_with, fill_all_slots, run_to_completion};
    use crate::app::Focus;
    use crossterm::event::{KeyCode, KeyModifiers, MouseEventKind};
    use std::fs;
    use std::time::Instant;

    fn press(app: &mut crate::app::AppState, key: KeyCode) -> bool {
        handle_key(app, key, KeyModifiers::NONE, Instant::now())
    }

    #[test]
    fn enter_on_a_slot_opens_the_composer_and_esc_closes_it() {
        let mut app = app_with(Vec::new(), None);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.focus, Focus::Slot(SlotKind::SequenceDiagram));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.composer.as_ref().map(|composer| composer.slot), Some(SlotKind::SequenceDiagram));

        // Typing goes to the composer, not the global bindings.
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        assert_eq!(app.composer.as_ref().map(|c| c.input.current()), Some("q".to_string()));

        press(&mut app, KeyCode::Esc);
        assert!(app.composer.is_none());
    }

    #[test]
    fn typed_path_is_selected_on_enter() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("seq.puml");
        fs::write(&path, "@startuml\n@enduml\n").expect("write");
        let mut app = app_with(Vec::new(), None);
        app.focus = Focus::Slot(SlotKind::SequenceDiagram);

        press(&mut app, KeyCode::Enter);
        handle_key(&mut app, KeyCode::Char('u'), KeyModifiers::CONTROL, Instant::now());
        for ch in path.display().to_string().chars() {
            press(&mut app, KeyCode::Char(ch));
        }
        press(&mut app, KeyCode::Enter);

        assert!(app.composer.is_none());
        let selected = app.files.get(SlotKind::SequenceDiagram).expect("selected");
        assert_eq!(selected.name, "seq.puml");
        assert_eq!(selected.size, 18);
    }

    #[test]
    fn generate_with_missing_files_shows_validation_message() {
        let mut app = app_with(vec!["unused"], None);
        app.focus = Focus::Generate;
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.generation.error_message(), Some(VALIDATION_MESSAGE));
    }

    #[test]
    fn ctrl_g_submits_and_delete_clears_the_focused_slot() {
        let mut app = app_with(vec!["# Done\n"], None);
        fill_all_slots(&mut app);
        handle_key(&mut app, KeyCode::Char('g'), KeyModifiers::CONTROL, Instant::now());
        run_to_completion(&mut app);
        assert_eq!(app.generation.content(), "# Done\n");

        assert!(press(&mut app, KeyCode::Delete));
        assert!(app.files.get(SlotKind::Requirements).is_none());
        assert!(!press(&mut app, KeyCode::Backspace));
    }

    #[test]
    fn quit_keys_set_the_flag() {
        let mut app = app_with(Vec::new(), None);
        handle_key(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL, Instant::now());
        assert!(app.should_quit);

        let mut app = app_with(Vec::new(), None);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn scrolling_keys_and_wheel_move_the_viewport() {
        let mut app = app_with(Vec::new(), None);
        app.last_output_viewport_height = 10;
        press(&mut app, KeyCode::PageUp);
        assert_eq!(app.scroll_from_bottom, 9);
        assert!(handle_mouse_event(&mut app, MouseEventKind::ScrollDown));
        assert_eq!(app.scroll_from_bottom, 6);
        press(&mut app, KeyCode::End);
        assert_eq!(app.scroll_from_bottom, 0);
        press(&mut app, KeyCode::Home);
        assert_eq!(app.scroll_from_bottom, usize::MAX);
        assert!(!handle_mouse_event(&mut app, MouseEventKind::Moved));
    }
}
