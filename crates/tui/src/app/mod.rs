pub(crate) mod config;
pub(crate) mod error;
pub(crate) mod handlers;
pub(crate) mod runtime;
pub(crate) mod state;
pub(crate) mod util;
pub(crate) mod view;

use crate::app::config::Config;
use crate::app::error::GenerationError;
use crate::app::runtime::{spawn_generation, StreamClient};
use crate::app::state::notice::{COPIED_NOTICE_TTL, NOTICE_TTL};
pub(crate) use crate::app::state::WrappedOutputCache;
use crate::app::state::{
    GenerationController, GenerationEvent, Notice, NoticeLevel, PathComposer, SelectedFile,
    SlotKind, UploadedFiles,
};
use crate::app::util::clipboard::{self, ClipboardImageError};
use crate::app::util::paths::{complete_path, display_dir, parse_dropped_path};
use crate::app::view::markdown::{code_blocks, render, DisplayElement};
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const MAX_CLIPBOARD_IMAGE_BYTES: usize = 5 * 1024 * 1024;
const SPINNER_INTERVAL: Duration = Duration::from_millis(120);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Slot(SlotKind),
    Generate,
}

const FOCUS_ORDER: [Focus; 4] = [
    Focus::Slot(SlotKind::Requirements),
    Focus::Slot(SlotKind::SequenceDiagram),
    Focus::Slot(SlotKind::ConfigImage),
    Focus::Generate,
];

fn slot_for_dropped_name(name: &str, files: &UploadedFiles) -> SlotKind {
    let ext = std::path::Path::new(name)
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
        .unwrap_or_default();
    if SlotKind::ConfigImage
        .accepted_extensions()
        .contains(&ext.as_str())
    {
        return SlotKind::ConfigImage;
    }
    if ext == "puml" || ext == "plantuml" {
        return SlotKind::SequenceDiagram;
    }
    [SlotKind::Requirements, SlotKind::SequenceDiagram]
        .into_iter()
        .find(|kind| files.get(*kind).is_none())
        .unwrap_or(SlotKind::Requirements)
}

/// Which code block Ctrl+Y copied last, for the output it was taken from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodeCopyCursor {
    pub version: u64,
    pub index: usize,
}

pub struct AppState {
    pub config: Config,
    client: Arc<dyn StreamClient>,
    pub files: UploadedFiles,
    pub generation: GenerationController,
    events: Option<Receiver<GenerationEvent>>,
    pub focus: Focus,
    pub composer: Option<PathComposer>,
    pub notice: Option<Notice>,
    pub output_version: u64,
    pub wrapped_output_cache: Option<WrappedOutputCache>,
    pub code_copy_cursor: Option<CodeCopyCursor>,
    pub scroll_from_bottom: usize,
    pub last_wrapped_total: usize,
    pub last_wrap_width: usize,
    pub last_output_viewport_height: usize,
    pub spinner_index: usize,
    pub spinner_last_tick: Instant,
    pub last_browse_dir: Option<PathBuf>,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(config: Config, client: Arc<dyn StreamClient>) -> Self {
        Self {
            config,
            client,
            files: UploadedFiles::default(),
            generation: GenerationController::default(),
            events: None,
            focus: Focus::Slot(SlotKind::Requirements),
            composer: None,
            notice: None,
            output_version: 0,
            wrapped_output_cache: None,
            code_copy_cursor: None,
            scroll_from_bottom: 0,
            last_wrapped_total: 0,
            last_wrap_width: 0,
            last_output_viewport_height: 0,
            spinner_index: 0,
            spinner_last_tick: Instant::now(),
            last_browse_dir: None,
            should_quit: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.generation.is_loading()
    }

    /// Submit is offered only with all three files and no cycle in flight.
    pub fn can_submit(&self) -> bool {
        self.files.all_present() && !self.generation.is_loading()
    }

    pub fn rendered_elements(&self) -> Vec<DisplayElement> {
        render(self.generation.content(), self.generation.is_loading())
    }

    pub fn mark_output_changed(&mut self) {
        self.output_version = self.output_version.wrapping_add(1);
    }

    pub fn set_notice(&mut self, level: NoticeLevel, text: impl Into<String>, now: Instant) {
        self.notice = Some(Notice::new(level, text, now, NOTICE_TTL));
    }

    pub fn submit(&mut self, now: Instant) {
        if self.generation.is_loading() {
            self.set_notice(NoticeLevel::Warn, "A generation is already running", now);
            return;
        }
        if let Some(inputs) = self.generation.submit(&self.files, now) {
            self.events = Some(spawn_generation(inputs, Arc::clone(&self.client)));
        }
        self.scroll_from_bottom = 0;
        self.mark_output_changed();
    }

    /// Applies everything the worker has sent so far, in arrival order.
    pub fn drain_generation_events(&mut self, now: Instant) -> bool {
        let Some(rx) = self.events.as_ref() else {
            return false;
        };
        let mut changed = false;
        let mut disconnected = false;
        loop {
            match rx.try_recv() {
                Ok(event) => changed |= self.generation.apply(event, now),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }
        if disconnected && self.generation.is_loading() {
            let error = GenerationError::Stream("generation worker stopped unexpectedly".to_string());
            changed |= self.generation.apply(GenerationEvent::Failed(error), now);
        }
        if disconnected || !self.generation.is_loading() {
            self.events = None;
        }
        if changed {
            self.mark_output_changed();
        }
        changed
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        let mut redraw = false;
        if self.generation.tick(now) {
            redraw = true;
        }
        if self.update_spinner(now) {
            redraw = true;
        }
        if self
            .notice
            .as_ref()
            .is_some_and(|notice| notice.is_expired(now))
        {
            self.notice = None;
            redraw = true;
        }
        redraw
    }

    pub fn spinner_frame(&self) -> &'static str {
        const FRAMES: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];
        FRAMES[self.spinner_index % FRAMES.len()]
    }

    pub fn update_spinner(&mut self, now: Instant) -> bool {
        if !self.is_running() {
            self.spinner_index = 0;
            self.spinner_last_tick = now;
            return false;
        }
        if now.duration_since(self.spinner_last_tick) >= SPINNER_INTERVAL {
            self.spinner_last_tick = now;
            self.spinner_index = self.spinner_index.saturating_add(1);
            return true;
        }
        false
    }

    pub fn focus_next(&mut self) {
        let idx = FOCUS_ORDER
            .iter()
            .position(|focus| *focus == self.focus)
            .unwrap_or(0);
        self.focus = FOCUS_ORDER[(idx + 1) % FOCUS_ORDER.len()];
    }

    pub fn focus_prev(&mut self) {
        let idx = FOCUS_ORDER
            .iter()
            .position(|focus| *focus == self.focus)
            .unwrap_or(0);
        self.focus = FOCUS_ORDER[(idx + FOCUS_ORDER.len() - 1) % FOCUS_ORDER.len()];
    }

    pub fn focused_slot(&self) -> Option<SlotKind> {
        match self.focus {
            Focus::Slot(kind) => Some(kind),
            Focus::Generate => None,
        }
    }

    pub fn set_file(&mut self, kind: SlotKind, file: SelectedFile, now: Instant) {
        if let Some(dir) = file.parent_dir() {
            self.last_browse_dir = Some(dir);
        }
        if file.matches_accepted(kind) {
            self.set_notice(NoticeLevel::Info, format!("{}: {}", kind.label(), file.name), now);
        } else {
            self.set_notice(
                NoticeLevel::Warn,
                format!("{} is not one of {}; using it anyway", file.name, kind.accepted_hint()),
                now,
            );
        }
        tracing::info!(slot = kind.label(), name = %file.name, size = file.size, "file selected");
        self.files.set(kind, file);
    }

    pub fn clear_slot(&mut self, kind: SlotKind, now: Instant) -> bool {
        match self.files.clear(kind) {
            Some(previous) => {
                tracing::info!(slot = kind.label(), name = %previous.name, "file removed");
                self.set_notice(NoticeLevel::Info, format!("Removed {}", previous.name), now);
                true
            }
            None => false,
        }
    }

    /// Resolves typed or dropped text to a file and stores it in `kind`.
    pub fn select_path(&mut self, kind: SlotKind, raw: &str, now: Instant) -> bool {
        let Some(path) = parse_dropped_path(raw) else {
            return false;
        };
        match SelectedFile::from_path(&path, kind) {
            Ok(file) => {
                self.set_file(kind, file, now);
                true
            }
            Err(error) => {
                tracing::warn!(%error, "file selection failed");
                self.set_notice(NoticeLevel::Error, error.to_string(), now);
                false
            }
        }
    }

    /// A drop lands on the focused slot, or on the slot the file looks like.
    pub fn drop_path(&mut self, raw: &str, now: Instant) -> bool {
        let Some(path) = parse_dropped_path(raw) else {
            return false;
        };
        let kind = match self.focused_slot() {
            Some(kind) => kind,
            None => {
                let name = path
                    .file_name()
                    .map(|value| value.to_string_lossy().into_owned())
                    .unwrap_or_default();
                slot_for_dropped_name(&name, &self.files)
            }
        };
        let selected = self.select_path(kind, raw, now);
        if selected {
            self.focus = Focus::Slot(kind);
        }
        selected
    }

    pub fn open_composer(&mut self, kind: SlotKind) {
        let initial = self
            .files
            .get(kind)
            .and_then(SelectedFile::parent_dir)
            .or_else(|| self.last_browse_dir.clone())
            .map(|dir| display_dir(&dir))
            .unwrap_or_default();
        self.composer = Some(PathComposer::new(kind, &initial));
    }

    pub fn cancel_composer(&mut self) {
        self.composer = None;
    }

    /// Keeps the composer open when the path does not resolve.
    pub fn commit_composer(&mut self, now: Instant) {
        let Some(composer) = self.composer.take() else {
            return;
        };
        let raw = composer.input.current();
        if raw.trim().is_empty() {
            return;
        }
        if !self.select_path(composer.slot, &raw, now) {
            self.composer = Some(composer);
        }
    }

    pub fn complete_composer(&mut self) -> bool {
        let Some(composer) = self.composer.as_mut() else {
            return false;
        };
        match complete_path(&composer.input.current()) {
            Some(completed) => {
                composer.input.set_from(&completed);
                true
            }
            None => false,
        }
    }

    pub fn paste_clipboard_image(&mut self, now: Instant) {
        match clipboard::read_clipboard_image(MAX_CLIPBOARD_IMAGE_BYTES) {
            Ok(file) => {
                self.set_file(SlotKind::ConfigImage, file, now);
                self.focus = Focus::Slot(SlotKind::ConfigImage);
            }
            Err(error) => self.report_clipboard_paste_error(error, now),
        }
    }

    fn report_clipboard_paste_error(&mut self, error: ClipboardImageError, now: Instant) {
        match error {
            ClipboardImageError::NotAvailable => {
                self.set_notice(NoticeLevel::Info, "No image found in clipboard", now);
            }
            ClipboardImageError::TooLarge { bytes, max_bytes } => {
                self.set_notice(
                    NoticeLevel::Error,
                    format!(
                        "Clipboard image is too large ({}KB > {}KB)",
                        bytes / 1024,
                        max_bytes / 1024
                    ),
                    now,
                );
            }
            ClipboardImageError::Clipboard(error) | ClipboardImageError::Encode(error) => {
                tracing::warn!(%error, "clipboard image paste failed");
                self.set_notice(
                    NoticeLevel::Error,
                    format!("Clipboard image paste failed: {error}"),
                    now,
                );
            }
        }
    }

    fn copy_to_clipboard(&mut self, text: &str, label: String, now: Instant) {
        match clipboard::copy_text(text) {
            Ok(()) => {
                self.notice = Some(Notice::new(NoticeLevel::Info, label, now, COPIED_NOTICE_TTL));
            }
            Err(error) => {
                tracing::warn!(%error, "clipboard copy failed");
                self.set_notice(NoticeLevel::Error, error.to_string(), now);
            }
        }
    }

    /// The first press copies the last block; each repeat over unchanged
    /// output steps one block earlier, wrapping to the last.
    pub fn copy_code_block(&mut self, now: Instant) {
        let elements = render(self.generation.content(), false);
        let blocks = code_blocks(&elements);
        if blocks.is_empty() {
            self.code_copy_cursor = None;
            self.set_notice(NoticeLevel::Info, "No code block to copy", now);
            return;
        }
        let count = blocks.len();
        let index = match self.code_copy_cursor {
            Some(cursor) if cursor.version == self.output_version && cursor.index < count => {
                (cursor.index + count - 1) % count
            }
            _ => count - 1,
        };
        let code = blocks[index].to_string();
        self.code_copy_cursor = Some(CodeCopyCursor {
            version: self.output_version,
            index,
        });
        self.copy_to_clipboard(&code, format!("Copied code block {} of {count}", index + 1), now);
    }

    pub fn copy_document(&mut self, now: Instant) {
        if self.generation.content().is_empty() {
            self.set_notice(NoticeLevel::Info, "Nothing generated yet", now);
            return;
        }
        let content = self.generation.content().to_string();
        self.copy_to_clipboard(&content, "Copied document".to_string(), now);
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(lines);
    }

    pub fn scroll_page_up(&mut self) {
        let page = self.last_output_viewport_height.saturating_sub(1).max(1);
        self.scroll_up(page);
    }

    pub fn scroll_page_down(&mut self) {
        let page = self.last_output_viewport_height.saturating_sub(1).max(1);
        self.scroll_down(page);
    }

    /// Clamped to the real maximum on the next draw.
    pub fn scroll_to_top(&mut self) {
        self.scroll_from_bottom = usize::MAX;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_from_bottom = 0;
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{app_with, fill_all_slots, run_to_completion};
    use super::{slot_for_dropped_name, Focus};
    use crate::app::error::VALIDATION_MESSAGE;
    use crate::app::state::{GenerationState, NoticeLevel, SlotKind, UploadedFiles};
    use std::fs;
    use std::time::{Duration, Instant};

    #[test]
    fn submit_streams_through_the_worker_to_finished() {
        let mut app = app_with(vec!["# Hi\n", "- a\n- b\n"], None);
        fill_all_slots(&mut app);
        assert!(app.can_submit());

        app.submit(Instant::now());
        assert!(app.is_running());
        assert!(!app.can_submit());
        run_to_completion(&mut app);

        assert!(matches!(app.generation.state(), GenerationState::Finished));
        assert_eq!(app.generation.content(), "# Hi\n- a\n- b\n");
        assert!(app.events.is_none());
    }

    #[test]
    fn submit_without_all_files_reports_validation() {
        let mut app = app_with(vec!["unused"], None);
        app.submit(Instant::now());
        assert_eq!(app.generation.error_message(), Some(VALIDATION_MESSAGE));
        assert!(app.events.is_none());
    }

    #[test]
    fn stream_failure_keeps_partial_output() {
        let mut app = app_with(vec!["# Partial\n", "never"], Some(1));
        fill_all_slots(&mut app);
        app.submit(Instant::now());
        run_to_completion(&mut app);

        assert_eq!(app.generation.content(), "# Partial\n");
        assert!(app
            .generation
            .error_message()
            .is_some_and(|message| message.contains("connection reset")));
    }

    #[test]
    fn second_submit_while_running_only_warns() {
        let mut app = app_with(vec!["a"], None);
        fill_all_slots(&mut app);
        let now = Instant::now();
        app.submit(now);
        app.submit(now);
        assert_eq!(app.notice.as_ref().map(|notice| notice.level), Some(NoticeLevel::Warn));
        run_to_completion(&mut app);
        assert_eq!(app.generation.content(), "a");
    }

    #[test]
    fn focus_cycles_through_slots_and_generate() {
        let mut app = app_with(Vec::new(), None);
        app.focus_prev();
        assert_eq!(app.focus, Focus::Generate);
        app.focus_next();
        assert_eq!(app.focus, Focus::Slot(SlotKind::Requirements));
        app.focus_next();
        app.focus_next();
        assert_eq!(app.focus, Focus::Slot(SlotKind::ConfigImage));
    }

    #[test]
    fn composer_selects_files_and_stays_open_on_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("requirements.md");
        fs::write(&path, "# Login").expect("write");
        let mut app = app_with(Vec::new(), None);
        let now = Instant::now();

        app.open_composer(SlotKind::Requirements);
        let composer = app.composer.as_mut().expect("composer");
        composer.input.set_from(&dir.path().join("missing.md").display().to_string());
        app.commit_composer(now);
        assert!(app.composer.is_some());
        assert_eq!(app.notice.as_ref().map(|notice| notice.level), Some(NoticeLevel::Error));

        let composer = app.composer.as_mut().expect("composer");
        composer.input.set_from(&format!("{}/requi", dir.path().display()));
        assert!(app.complete_composer());
        app.commit_composer(now);
        assert!(app.composer.is_none());
        let selected = app.files.get(SlotKind::Requirements).expect("selected");
        assert_eq!(selected.name, "requirements.md");
        assert_eq!(app.last_browse_dir.as_deref(), Some(dir.path()));
    }

    #[test]
    fn drops_go_to_the_focused_slot_or_the_matching_one() {
        let dir = tempfile::tempdir().expect("tempdir");
        let image = dir.path().join("infra diagram.png");
        fs::write(&image, [0x89, b'P', b'N', b'G']).expect("write");
        let mut app = app_with(Vec::new(), None);
        let now = Instant::now();

        app.focus = Focus::Generate;
        assert!(app.drop_path(&format!("'{}'", image.display()), now));
        assert!(app.files.get(SlotKind::ConfigImage).is_some());
        assert_eq!(app.focus, Focus::Slot(SlotKind::ConfigImage));

        app.focus = Focus::Slot(SlotKind::Requirements);
        assert!(app.drop_path(&image.display().to_string().replace(' ', "\\ "), now));
        assert_eq!(app.notice.as_ref().map(|notice| notice.level), Some(NoticeLevel::Warn));
        assert!(app.files.get(SlotKind::Requirements).is_some());
    }

    #[test]
    fn dropped_names_pick_a_plausible_slot() {
        let mut files = UploadedFiles::default();
        assert_eq!(slot_for_dropped_name("a.JPG", &files), SlotKind::ConfigImage);
        assert_eq!(slot_for_dropped_name("flow.puml", &files), SlotKind::SequenceDiagram);
        assert_eq!(slot_for_dropped_name("notes.md", &files), SlotKind::Requirements);
        files.set(
            SlotKind::Requirements,
            crate::app::state::SelectedFile::from_memory("r.md", "text/markdown", Vec::new()),
        );
        assert_eq!(slot_for_dropped_name("seq.txt", &files), SlotKind::SequenceDiagram);
    }

    #[test]
    fn clearing_a_slot_disables_submit() {
        let mut app = app_with(Vec::new(), None);
        fill_all_slots(&mut app);
        assert!(app.clear_slot(SlotKind::SequenceDiagram, Instant::now()));
        assert!(!app.can_submit());
        assert!(!app.clear_slot(SlotKind::SequenceDiagram, Instant::now()));
    }

    #[test]
    fn notices_expire_on_tick() {
        let mut app = app_with(Vec::new(), None);
        let now = Instant::now();
        app.set_notice(NoticeLevel::Info, "hello", now);
        assert!(!app.tick(now));
        assert!(app.tick(now + Duration::from_secs(5)));
        assert!(app.notice.is_none());
    }

    #[test]
    fn copy_without_code_block_only_notifies() {
        let mut app = app_with(Vec::new(), None);
        app.copy_code_block(Instant::now());
        assert_eq!(
            app.notice.as_ref().map(|notice| notice.text.as_str()),
            Some("No code block to copy")
        );
        assert!(app.code_copy_cursor.is_none());
    }

    #[test]
    fn repeated_code_copies_step_back_through_blocks() {
        let mut app = app_with(vec!["```\none\n```\n", "```\ntwo\n```\n```\nthree\n```\n"], None);
        fill_all_slots(&mut app);
        app.submit(Instant::now());
        run_to_completion(&mut app);

        let mut picked = Vec::new();
        for _ in 0..4 {
            app.copy_code_block(Instant::now());
            picked.push(app.code_copy_cursor.map(|cursor| cursor.index));
        }
        assert_eq!(picked, vec![Some(2), Some(1), Some(0), Some(2)]);

        app.copy_code_block(Instant::now());
        assert_eq!(app.code_copy_cursor.map(|cursor| cursor.index), Some(1));
        app.mark_output_changed();
        app.copy_code_block(Instant::now());
        assert_eq!(app.code_copy_cursor.map(|cursor| cursor.index), Some(2));
    }
}
