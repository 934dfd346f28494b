use crate::app::config::Config;
use crate::app::error::GenerationError;
use crate::app::runtime::prompt::RequestPart;
use crate::app::runtime::sse::{ErrorEnvelope, SseChunks};
use reqwest::blocking::Client as HttpClient;
use serde::Serialize;
use std::io::BufReader;
use std::time::Duration;

const ERROR_BODY_LIMIT: usize = 512;

/// Lazy, single-pass sequence of text chunks in arrival order.
pub type ChunkStream = Box<dyn Iterator<Item = Result<String, GenerationError>> + Send>;

pub trait StreamClient: Send + Sync {
    /// Cheap check run before any file is read.
    fn ensure_configured(&self) -> Result<(), GenerationError> {
        Ok(())
    }

    fn stream(&self, parts: &[RequestPart]) -> Result<ChunkStream, GenerationError>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<WirePart<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum WirePart<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: WireBlob<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireBlob<'a> {
    mime_type: &'a str,
    data: &'a str,
}

fn request_body(parts: &[RequestPart]) -> GenerateRequest<'_> {
    let parts = parts
        .iter()
        .map(|part| match part {
            RequestPart::Text(text) => WirePart::Text { text },
            RequestPart::InlineData { mime_type, data } => WirePart::InlineData {
                inline_data: WireBlob { mime_type, data },
            },
        })
        .collect();
    GenerateRequest {
        contents: [RequestContent {
            role: "user",
            parts,
        }],
    }
}

fn truncate_text(value: &str, max_chars: usize) -> String {
    let trimmed = value.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

fn http_error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.describe(),
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => truncate_text(body, ERROR_BODY_LIMIT),
    }
}

pub struct GeminiClient {
    api_key: Option<String>,
    model: String,
    api_base: String,
    http: HttpClient,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self, GenerationError> {
        // Streams run as long as the model writes; only connecting is bounded.
        let http = HttpClient::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(None::<Duration>)
            .build()?;
        Ok(Self::with_http(config, http))
    }

    pub fn with_http(config: &Config, http: HttpClient) -> Self {
        Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            api_base: config.api_base.clone(),
            http,
        }
    }

    fn endpoint(&self) -> String {
        let trimmed = self.model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{trimmed}")
        };
        format!("{}/{}:streamGenerateContent", self.api_base, model_path)
    }

    fn api_key(&self) -> Result<&str, GenerationError> {
        self.api_key
            .as_deref()
            .ok_or_else(GenerationError::missing_credential)
    }
}

impl StreamClient for GeminiClient {
    fn ensure_configured(&self) -> Result<(), GenerationError> {
        self.api_key().map(|_| ())
    }

    fn stream(&self, parts: &[RequestPart]) -> Result<ChunkStream, GenerationError> {
        let api_key = self.api_key()?;
        let endpoint = self.endpoint();
        tracing::info!(model = %self.model, parts = parts.len(), "opening generation stream");
        let response = self
            .http
            .post(&endpoint)
            .query(&[("alt", "sse")])
            .header("x-goog-api-key", api_key)
            .json(&request_body(parts))
            .send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let message = http_error_message(&body);
            tracing::warn!(status = status.as_u16(), %message, "provider rejected the request");
            return Err(GenerationError::Http {
                status: status.as_u16(),
                message,
            });
        }
        Ok(Box::new(SseChunks::new(BufReader::new(response))))
    }
}
