use std::io;

pub const VALIDATION_MESSAGE: &str = "All three files must be uploaded before generating.";
pub const MISSING_CREDENTIAL_MESSAGE: &str =
    "API key is not configured (set GEMINI_API_KEY or API_KEY)";
const FALLBACK_MESSAGE: &str = "An unknown error occurred.";

/// Every way a generation cycle can end in the Error state.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("all three input files are required")]
    Validation,

    #[error("{0}")]
    Configuration(String),

    #[error("failed to read {name}: {source}")]
    Conversion {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("provider returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("stream interrupted: {0}")]
    Stream(String),

    #[error("provider error: {0}")]
    Provider(String),
}

impl GenerationError {
    pub fn missing_credential() -> Self {
        Self::Configuration(MISSING_CREDENTIAL_MESSAGE.to_string())
    }

    /// The text shown in the single user-visible error slot. Never empty.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation => VALIDATION_MESSAGE.to_string(),
            other => {
                let detail = other.to_string();
                let detail = detail.trim();
                if detail.is_empty() {
                    format!("Generation failed: {FALLBACK_MESSAGE}")
                } else {
                    format!("Generation failed: {detail}")
                }
            }
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}
