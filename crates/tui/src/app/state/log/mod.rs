use crate::app::util::text::sanitize_for_tui;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogKind {
    Heading1,
    Heading2,
    Heading3,
    HeadingRule,
    ListBullet,
    ListItem,
    Paragraph,
    CodeGutter,
    Code,
    Caret,
    Placeholder,
    Loading,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogSpan {
    pub kind: LogKind,
    pub text: String,
}

impl LogSpan {
    pub fn new(kind: LogKind, text: impl Into<String>) -> Self {
        let raw = text.into();
        Self {
            kind,
            text: sanitize_for_tui(&raw),
        }
    }
}

/// One styled output row before wrapping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogLine {
    pub spans: Vec<LogSpan>,
}

impl LogLine {
    pub fn new(kind: LogKind, text: impl Into<String>) -> Self {
        Self {
            spans: vec![LogSpan::new(kind, text)],
        }
    }

    pub fn new_with_spans(spans: Vec<LogSpan>) -> Self {
        Self { spans }
    }

    pub fn spans(&self) -> &[LogSpan] {
        &self.spans
    }

    /// Kind of the last span; the gutter/bullet prefix is decoration.
    pub fn kind(&self) -> LogKind {
        self.spans
            .last()
            .map(|span| span.kind)
            .unwrap_or(LogKind::Paragraph)
    }

    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}
