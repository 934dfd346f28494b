use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_FILTER: &str = "warn";
const DEFAULT_LOG_FILE_NAME: &str = "addgen-tui.log";
const CREDENTIAL_VARS: [&str; 3] = ["GEMINI_API_KEY", "API_KEY", "GOOGLE_API_KEY"];

/// Process-wide settings, resolved once at startup and handed to whoever needs them.
#[derive(Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub connect_timeout: Duration,
    pub log_filter: String,
    pub log_file: PathBuf,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("connect_timeout", &self.connect_timeout)
            .field("log_filter", &self.log_filter)
            .field("log_file", &self.log_file)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_key = CREDENTIAL_VARS
            .iter()
            .find_map(|key| non_empty(lookup(key)));
        let model = non_empty(lookup("ADDGEN_MODEL")).unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_base = non_empty(lookup("GEMINI_API_BASE"))
            .map(|value| value.trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let connect_timeout = non_empty(lookup("ADDGEN_CONNECT_TIMEOUT_SECS"))
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS));
        let log_filter =
            non_empty(lookup("ADDGEN_LOG")).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        let log_file = non_empty(lookup("ADDGEN_LOG_FILE"))
            .map(PathBuf::from)
            .unwrap_or_else(|| env::temp_dir().join(DEFAULT_LOG_FILE_NAME));
        Self {
            api_key,
            model,
            api_base,
            connect_timeout,
            log_filter,
            log_file,
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}
