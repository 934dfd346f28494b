use std::time::{Duration, Instant};

pub const NOTICE_TTL: Duration = Duration::from_secs(4);
pub const COPIED_NOTICE_TTL: Duration = Duration::from_secs(2);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warn,
    Error,
}

/// Short-lived message shown in the status line.
#[derive(Clone, Debug)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    pub expires_at: Instant,
}

impl Notice {
    pub fn new(level: NoticeLevel, text: impl Into<String>, now: Instant, ttl: Duration) -> Self {
        Self {
            level,
            text: text.into(),
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}
