pub(crate) mod composer;
pub(crate) mod files;
pub(crate) mod generation;
pub(crate) mod input;
pub(crate) mod log;
pub(crate) mod notice;

pub(crate) use composer::PathComposer;
pub(crate) use files::{SelectedFile, SlotKind, UploadedFiles};
pub(crate) use generation::{GenerationController, GenerationEvent, GenerationState};
pub(crate) use input::InputState;
pub(crate) use log::{LogKind, LogLine, LogSpan};
pub(crate) use notice::{Notice, NoticeLevel};

/// Wrapped document rows for one width and one content version.
pub struct WrappedOutputCache {
    pub width: usize,
    pub version: u64,
    pub wrapped: Vec<LogLine>,
}
