use crate::app::error::GenerationError;
use crate::app::state::files::{GenerationInputs, UploadedFiles};
use std::time::{Duration, Instant};

pub const LOADING_MESSAGES: [&str; 7] = [
    "Analyzing requirements...",
    "Interpreting the sequence diagram...",
    "Generating architecture views...",
    "Designing the logical view...",
    "Composing the process view...",
    "Placing the physical view...",
    "Almost done...",
];
pub const LOADING_MESSAGE_INTERVAL: Duration = Duration::from_millis(2500);

/// Rotating loading message. It only exists inside `GenerationState::Loading`,
/// so leaving Loading by any path drops it.
#[derive(Debug)]
pub struct LoadingTicker {
    index: usize,
    last_advance: Instant,
}

impl LoadingTicker {
    pub fn start(now: Instant) -> Self {
        Self {
            index: 0,
            last_advance: now,
        }
    }

    pub fn message(&self) -> &'static str {
        LOADING_MESSAGES[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Advances one phrase per elapsed interval, wrapping at the end.
    pub fn tick(&mut self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_advance);
        let steps = (elapsed.as_millis() / LOADING_MESSAGE_INTERVAL.as_millis()) as usize;
        if steps == 0 {
            return false;
        }
        self.index = (self.index + steps) % LOADING_MESSAGES.len();
        self.last_advance += LOADING_MESSAGE_INTERVAL * steps as u32;
        true
    }
}

#[derive(Debug)]
pub enum GenerationState {
    Idle,
    Loading(LoadingTicker),
    Finished,
    Error(String),
}

impl GenerationState {
    pub fn label(&self) -> &'static str {
        match self {
            GenerationState::Idle => "idle",
            GenerationState::Loading(_) => "generating",
            GenerationState::Finished => "finished",
            GenerationState::Error(_) => "error",
        }
    }
}

/// What the worker reports back, in production order.
#[derive(Debug)]
pub enum GenerationEvent {
    Chunk(String),
    Finished,
    Failed(GenerationError),
}

#[derive(Debug)]
pub struct GenerationController {
    state: GenerationState,
    content: String,
    chunk_count: usize,
    started_at: Option<Instant>,
    elapsed: Option<Duration>,
}

impl Default for GenerationController {
    fn default() -> Self {
        Self {
            state: GenerationState::Idle,
            content: String::new(),
            chunk_count: 0,
            started_at: None,
            elapsed: None,
        }
    }
}

impl GenerationController {
    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, GenerationState::Loading(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            GenerationState::Error(message) => Some(message.as_str()),
            GenerationState::Idle | GenerationState::Loading(_) | GenerationState::Finished => None,
        }
    }

    pub fn loading_message(&self) -> Option<&'static str> {
        match &self.state {
            GenerationState::Loading(ticker) => Some(ticker.message()),
            GenerationState::Idle | GenerationState::Finished | GenerationState::Error(_) => None,
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        self.elapsed
            .or_else(|| self.started_at.map(|start| start.elapsed()))
    }

    /// Starts a cycle. Returns the inputs to hand to the worker, or `None` when
    /// the cycle ended immediately (validation) or one is already running.
    pub fn submit(&mut self, files: &UploadedFiles, now: Instant) -> Option<GenerationInputs> {
        if self.is_loading() {
            tracing::warn!("submit ignored: a generation is already in flight");
            return None;
        }
        let Some(inputs) = files.snapshot() else {
            tracing::info!(
                populated = files.populated_count(),
                "submit rejected: missing input files"
            );
            self.fail(GenerationError::Validation, now);
            return None;
        };
        self.content.clear();
        self.chunk_count = 0;
        self.started_at = Some(now);
        self.elapsed = None;
        self.state = GenerationState::Loading(LoadingTicker::start(now));
        tracing::info!(
            requirements = %inputs.requirements.name,
            sequence_diagram = %inputs.sequence_diagram.name,
            config_image = %inputs.config_image.name,
            "generation started"
        );
        Some(inputs)
    }

    /// Applies one worker event. Returns true when the view needs a redraw.
    pub fn apply(&mut self, event: GenerationEvent, now: Instant) -> bool {
        if !self.is_loading() {
            tracing::warn!(?event, "dropping generation event outside of a cycle");
            return false;
        }
        match event {
            GenerationEvent::Chunk(chunk) => {
                self.chunk_count += 1;
                tracing::debug!(chunk = self.chunk_count, bytes = chunk.len(), "chunk received");
                self.content.push_str(&chunk);
            }
            GenerationEvent::Finished => {
                self.stop_clock(now);
                self.state = GenerationState::Finished;
                tracing::info!(
                    chunks = self.chunk_count,
                    bytes = self.content.len(),
                    "generation finished"
                );
            }
            GenerationEvent::Failed(error) => self.fail(error, now),
        }
        true
    }

    /// Drives the loading message rotation; a no-op outside Loading.
    pub fn tick(&mut self, now: Instant) -> bool {
        match &mut self.state {
            GenerationState::Loading(ticker) => ticker.tick(now),
            GenerationState::Idle | GenerationState::Finished | GenerationState::Error(_) => false,
        }
    }

    fn stop_clock(&mut self, now: Instant) {
        if let Some(start) = self.started_at {
            self.elapsed = Some(now.saturating_duration_since(start));
        }
    }

    fn fail(&mut self, error: GenerationError, now: Instant) {
        if self.is_loading() {
            self.stop_clock(now);
        }
        tracing::warn!(%error, retained_bytes = self.content.len(), "generation failed");
        self.state = GenerationState::Error(error.user_message());
    }
}
