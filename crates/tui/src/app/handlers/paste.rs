use crate::app::AppState;
use std::time::Instant;

/// Bracketed paste: text for the open composer, otherwise a dropped file.
pub(crate) fn handle_paste(app: &mut AppState, text: &str, now: Instant) -> bool {
    let first_line = text.lines().map(str::trim).find(|line| !line.is_empty());
    let Some(first_line) = first_line else {
        return false;
    };
    if let Some(composer) = app.composer.as_mut() {
        composer.input.insert_str(first_line);
        return true;
    }
    app.drop_path(first_line, now);
    true
}
