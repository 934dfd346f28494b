const ADD_PROMPT: &str = include_str!("add_prompt.md");
const DOCUMENTS_SEPARATOR: &str = "\n\n--- USER UPLOADED DOCUMENTS ---\n\n";

/// One ordered element of the generation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestPart {
    Text(String),
    InlineData { mime_type: String, data: String },
}

impl RequestPart {
    pub fn text(&self) -> Option<&str> {
        match self {
            RequestPart::Text(text) => Some(text),
            RequestPart::InlineData { .. } => None,
        }
    }
}

fn fenced_section(header: &str, body: &str) -> String {
    format!("{header}\n\n```\n{body}\n```\n\n")
}

/// Template, separator, requirements, sequence diagram, image header, image.
pub fn assemble_parts(
    requirements_text: &str,
    sequence_diagram_text: &str,
    image_mime_type: &str,
    image_data: String,
) -> Vec<RequestPart> {
    vec![
        RequestPart::Text(ADD_PROMPT.to_string()),
        RequestPart::Text(DOCUMENTS_SEPARATOR.to_string()),
        RequestPart::Text(fenced_section(
            "## 1. 요구사항 정의서 내용:",
            requirements_text,
        )),
        RequestPart::Text(fenced_section(
            "## 2. 시퀀스 다이어그램 내용:",
            sequence_diagram_text,
        )),
        RequestPart::Text("## 3. 통합 구성도 이미지:\n\n".to_string()),
        RequestPart::InlineData {
            mime_type: image_mime_type.to_string(),
            data: image_data,
        },
    ]
}
