use crate::app::error::GenerationError;
use serde::Deserialize;
use std::io::BufRead;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StreamPayload {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ProviderErrorBody>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProviderErrorBody {
    pub code: Option<i64>,
    pub message: Option<String>,
    pub status: Option<String>,
}

impl ProviderErrorBody {
    pub(crate) fn describe(&self) -> String {
        let message = self
            .message
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());
        match (message, self.status.as_deref(), self.code) {
            (Some(message), _, _) => message.to_string(),
            (None, Some(status), _) => status.to_string(),
            (None, None, Some(code)) => format!("error code {code}"),
            (None, None, None) => "unspecified provider error".to_string(),
        }
    }
}

/// `{"error": {...}}` as returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ProviderErrorBody,
}

fn chunk_from_payload(payload: StreamPayload) -> Result<Option<String>, GenerationError> {
    if let Some(error) = payload.error {
        return Err(GenerationError::Provider(error.describe()));
    }
    if let Some(reason) = payload
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return Err(GenerationError::Provider(format!("prompt blocked: {reason}")));
    }
    let text: String = payload
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter(|part| !part.thought)
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();
    Ok((!text.is_empty()).then_some(text))
}

/// Forward-only reader over a server-sent-event body. Each event with text
/// becomes one chunk; the first error ends the sequence.
pub struct SseChunks<R> {
    reader: R,
    line: String,
    data: String,
    done: bool,
}

impl<R: BufRead> SseChunks<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            data: String::new(),
            done: false,
        }
    }

    fn dispatch(&mut self) -> Option<Result<String, GenerationError>> {
        let data = std::mem::take(&mut self.data);
        let data = data.trim();
        if data.is_empty() || data == "[DONE]" {
            return None;
        }
        let parsed = serde_json::from_str::<StreamPayload>(data)
            .map_err(|error| GenerationError::Stream(format!("malformed event payload: {error}")))
            .and_then(chunk_from_payload);
        match parsed {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => None,
            Err(error) => {
                self.done = true;
                Some(Err(error))
            }
        }
    }
}

impl<R: BufRead> Iterator for SseChunks<R> {
    type Item = Result<String, GenerationError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => {
                    self.done = true;
                    return self.dispatch();
                }
                Ok(_) => {
                    let line = self.line.trim_end_matches(|ch: char| ch == '\r' || ch == '\n');
                    if line.is_empty() {
                        if let Some(item) = self.dispatch() {
                            return Some(item);
                        }
                        continue;
                    }
                    // Comments and non-data fields carry nothing for us.
                    if let Some(rest) = line.strip_prefix("data:") {
                        let value = rest.strip_prefix(' ').unwrap_or(rest).to_string();
                        if !self.data.is_empty() {
                            self.data.push('\n');
                        }
                        self.data.push_str(&value);
                    }
                }
                Err(error) => {
                    self.done = true;
                    return Some(Err(GenerationError::Stream(error.to_string())));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorEnvelope, SseChunks};
    use crate::app::error::GenerationError;
    use std::io::{self, Cursor, Read};

    fn chunks(body: &str) -> Vec<Result<String, GenerationError>> {
        SseChunks::new(Cursor::new(body.as_bytes().to_vec())).collect()
    }

    fn event(text: &str) -> String {
        format!(
            "data: {}\r\n\r\n",
            serde_json::json!({"candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]})
        )
    }

    #[test]
    fn events_become_chunks_in_order() {
        let body = format!("{}{}", event("# Hi\n"), event("- a\n- b\n"));
        let out: Vec<String> = chunks(&body).into_iter().map(|item| item.expect("chunk")).collect();
        assert_eq!(out, vec!["# Hi\n".to_string(), "- a\n- b\n".to_string()]);
    }

    #[test]
    fn parts_are_concatenated_and_thoughts_skipped() {
        let body = concat!(
            "data: {\"candidates\":[{\"content\":{\"parts\":[",
            "{\"text\":\"thinking\",\"thought\":true},{\"text\":\"ab\"},{\"text\":\"cd\"}]}}]}\n\n"
        );
        let out = chunks(body);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].as_ref().expect("chunk"), "abcd");
    }

    #[test]
    fn payloads_without_text_yield_nothing() {
        let body = concat!(
            ": keep-alive\n\n",
            "data: {\"candidates\":[{\"content\":{\"parts\":[]},\"finishReason\":\"STOP\"}],",
            "\"usageMetadata\":{\"totalTokenCount\":10}}\n\n",
            "data: [DONE]\n\n"
        );
        assert!(chunks(body).is_empty());
    }

    #[test]
    fn trailing_event_without_blank_line_is_delivered() {
        let body = "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"tail\"}]}}]}";
        let out = chunks(body);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].as_ref().expect("chunk"), "tail");
    }

    #[test]
    fn provider_error_ends_the_stream() {
        let body = format!(
            "{}data: {{\"error\":{{\"code\":500,\"message\":\"internal\"}}}}\n\n{}",
            event("one"),
            event("never")
        );
        let out = chunks(&body);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].as_ref().expect("chunk"), "one");
        match &out[1] {
            Err(GenerationError::Provider(message)) => assert_eq!(message, "internal"),
            other => panic!("unexpected item: {other:?}"),
        }
    }

    #[test]
    fn blocked_prompt_is_a_provider_error() {
        let body = "data: {\"promptFeedback\":{\"blockReason\":\"SAFETY\"}}\n\n";
        match chunks(body).as_slice() {
            [Err(GenerationError::Provider(message))] => assert!(message.contains("SAFETY")),
            other => panic!("unexpected items: {other:?}"),
        }
    }

    #[test]
    fn malformed_payload_is_a_stream_error() {
        match chunks("data: {not json\n\n").as_slice() {
            [Err(GenerationError::Stream(message))] => assert!(message.contains("malformed")),
            other => panic!("unexpected items: {other:?}"),
        }
    }

    struct FailAfter {
        inner: Cursor<Vec<u8>>,
    }

    impl Read for FailAfter {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.inner.read(buf)? {
                0 => Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset")),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn read_failure_is_a_stream_error_and_fuses() {
        let reader = io::BufReader::new(FailAfter {
            inner: Cursor::new(event("partial").into_bytes()),
        });
        let mut stream = SseChunks::new(reader);
        assert_eq!(stream.next().expect("chunk").expect("ok"), "partial");
        match stream.next() {
            Some(Err(GenerationError::Stream(message))) => assert!(message.contains("reset")),
            other => panic!("unexpected item: {other:?}"),
        }
        assert!(stream.next().is_none());
    }

    #[test]
    fn error_envelope_prefers_message() {
        let envelope: ErrorEnvelope = serde_json::from_str(
            r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#,
        )
        .expect("parse");
        assert_eq!(envelope.error.describe(), "API key not valid");
    }
}
