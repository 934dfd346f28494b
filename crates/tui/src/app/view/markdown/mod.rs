use crate::app::state::{LogKind, LogLine, LogSpan};

const FENCE: &str = "```";
const CARET: &str = "▍";
const BULLET: &str = "  • ";
const CODE_GUTTER: &str = "│ ";

/// One unit of rendered output derived from the accumulated text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisplayElement {
    Heading { level: u8, text: String },
    ListItem(String),
    Paragraph(String),
    CodeBlock(String),
    Caret,
}

fn source_lines(text: &str) -> impl Iterator<Item = &str> {
    // A trailing newline ends the last line; it does not start an empty one.
    let body = text.strip_suffix('\n').unwrap_or(text);
    let lines = if text.is_empty() {
        None
    } else {
        Some(body.split('\n'))
    };
    lines
        .into_iter()
        .flatten()
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

fn classify(line: &str) -> DisplayElement {
    if let Some(rest) = line.strip_prefix("# ") {
        return DisplayElement::Heading {
            level: 1,
            text: rest.to_string(),
        };
    }
    if let Some(rest) = line.strip_prefix("## ") {
        return DisplayElement::Heading {
            level: 2,
            text: rest.to_string(),
        };
    }
    if let Some(rest) = line.strip_prefix("### ") {
        return DisplayElement::Heading {
            level: 3,
            text: rest.to_string(),
        };
    }
    // Indented items count too; the indent and marker are dropped.
    if let Some(rest) = line.trim().strip_prefix("- ") {
        return DisplayElement::ListItem(rest.to_string());
    }
    DisplayElement::Paragraph(line.to_string())
}

/// Re-parses the whole text. Same text, same elements. `streaming` appends the
/// caret marker.
pub fn render(text: &str, streaming: bool) -> Vec<DisplayElement> {
    let mut out = Vec::new();
    let mut in_code_block = false;
    let mut code_buffer = String::new();

    for line in source_lines(text) {
        if line.trim().starts_with(FENCE) {
            if in_code_block {
                out.push(DisplayElement::CodeBlock(code_buffer.trim().to_string()));
                code_buffer.clear();
            }
            in_code_block = !in_code_block;
            continue;
        }
        if in_code_block {
            code_buffer.push_str(line);
            code_buffer.push('\n');
            continue;
        }
        out.push(classify(line));
    }

    // Unterminated fence: show what has arrived so far.
    if in_code_block {
        out.push(DisplayElement::CodeBlock(code_buffer.trim().to_string()));
    }
    if streaming {
        out.push(DisplayElement::Caret);
    }
    out
}

/// Code block texts in document order, for copying.
pub fn code_blocks(elements: &[DisplayElement]) -> Vec<&str> {
    elements
        .iter()
        .filter_map(|element| match element {
            DisplayElement::CodeBlock(code) => Some(code.as_str()),
            DisplayElement::Heading { .. }
            | DisplayElement::ListItem(_)
            | DisplayElement::Paragraph(_)
            | DisplayElement::Caret => None,
        })
        .collect()
}

fn heading_kind(level: u8) -> LogKind {
    match level {
        1 => LogKind::Heading1,
        2 => LogKind::Heading2,
        _ => LogKind::Heading3,
    }
}

/// Maps elements to styled rows. `width` sizes the rule under level 1 and 2
/// headings.
pub fn element_lines(elements: &[DisplayElement], width: usize) -> Vec<LogLine> {
    let mut out = Vec::new();
    for element in elements {
        match element {
            DisplayElement::Heading { level, text } => {
                out.push(LogLine::new(heading_kind(*level), text.as_str()));
                if *level <= 2 {
                    out.push(LogLine::new(LogKind::HeadingRule, "─".repeat(width.max(1))));
                }
            }
            DisplayElement::ListItem(text) => out.push(LogLine::new_with_spans(vec![
                LogSpan::new(LogKind::ListBullet, BULLET),
                LogSpan::new(LogKind::ListItem, text.as_str()),
            ])),
            DisplayElement::Paragraph(text) => {
                out.push(LogLine::new(LogKind::Paragraph, text.as_str()))
            }
            DisplayElement::CodeBlock(code) => {
                if code.is_empty() {
                    out.push(LogLine::new_with_spans(vec![
                        LogSpan::new(LogKind::CodeGutter, CODE_GUTTER),
                        LogSpan::new(LogKind::Code, ""),
                    ]));
                }
                for line in code.lines() {
                    out.push(LogLine::new_with_spans(vec![
                        LogSpan::new(LogKind::CodeGutter, CODE_GUTTER),
                        LogSpan::new(LogKind::Code, line),
                    ]));
                }
            }
            DisplayElement::Caret => out.push(LogLine::new(LogKind::Caret, CARET)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{code_blocks, element_lines, render, DisplayElement};
    use crate::app::state::LogKind;

    fn heading(level: u8, text: &str) -> DisplayElement {
        DisplayElement::Heading {
            level,
            text: text.to_string(),
        }
    }

    fn paragraph(text: &str) -> DisplayElement {
        DisplayElement::Paragraph(text.to_string())
    }

    #[test]
    fn mixed_document_renders_in_order() {
        let text = "# Title\n## Sub\ntext\n```\ncode\n```\n- item";
        assert_eq!(
            render(text, false),
            vec![
                heading(1, "Title"),
                heading(2, "Sub"),
                paragraph("text"),
                DisplayElement::CodeBlock("code".to_string()),
                DisplayElement::ListItem("item".to_string()),
            ]
        );
    }

    #[test]
    fn heading_markers_need_a_space() {
        assert_eq!(
            render("### Deep\n#### Deeper\n#NoSpace", false),
            vec![heading(3, "Deep"), paragraph("#### Deeper"), paragraph("#NoSpace")]
        );
        assert_eq!(render(" # indented", false), vec![paragraph(" # indented")]);
    }

    #[test]
    fn indented_list_items_are_recognized() {
        assert_eq!(
            render("   - nested\n-not a list", false),
            vec![
                DisplayElement::ListItem("nested".to_string()),
                paragraph("-not a list"),
            ]
        );
    }

    #[test]
    fn blank_lines_are_kept_as_paragraphs() {
        assert_eq!(
            render("a\n\nb\n", false),
            vec![paragraph("a"), paragraph(""), paragraph("b")]
        );
        assert!(render("", false).is_empty());
    }

    #[test]
    fn unterminated_fence_shows_partial_code() {
        assert_eq!(
            render("```\npartial", false),
            vec![DisplayElement::CodeBlock("partial".to_string())]
        );
        assert_eq!(
            render("intro\n```rust\nfn main() {}\n  ", true),
            vec![
                paragraph("intro"),
                DisplayElement::CodeBlock("fn main() {}".to_string()),
                DisplayElement::Caret,
            ]
        );
    }

    #[test]
    fn closing_fence_replaces_partial_block() {
        let partial = render("```\nline one\n", false);
        let complete = render("```\nline one\nline two\n```\nafter", false);
        assert_eq!(partial, vec![DisplayElement::CodeBlock("line one".to_string())]);
        assert_eq!(
            complete,
            vec![
                DisplayElement::CodeBlock("line one\nline two".to_string()),
                paragraph("after"),
            ]
        );
    }

    #[test]
    fn fence_lines_are_never_emitted_and_markup_inside_code_is_literal() {
        let elements = render("  ```mermaid\n# not a heading\n- not a list\n  ```", false);
        assert_eq!(
            elements,
            vec![DisplayElement::CodeBlock("# not a heading\n- not a list".to_string())]
        );
    }

    #[test]
    fn markup_characters_stay_verbatim() {
        assert_eq!(
            render("<script>alert(1)</script> **bold**", false),
            vec![paragraph("<script>alert(1)</script> **bold**")]
        );
    }

    #[test]
    fn rendering_is_deterministic() {
        let text = "# A\n```\nx\n";
        assert_eq!(render(text, true), render(text, true));
    }

    #[test]
    fn growing_text_keeps_finished_elements_stable() {
        let full = "# Title\n- one\n- two\nclosing words\n";
        let mut previous: Vec<DisplayElement> = Vec::new();
        for end in (0..=full.len()).filter(|idx| full.is_char_boundary(*idx)) {
            let current = render(&full[..end], false);
            // Every element before the last one is final once a later line began.
            let settled = previous.len().saturating_sub(1);
            assert_eq!(current[..settled], previous[..settled]);
            previous = current;
        }
    }

    #[test]
    fn crlf_line_endings_are_tolerated() {
        assert_eq!(render("# A\r\n- b\r\n", false), vec![heading(1, "A"), DisplayElement::ListItem("b".to_string())]);
    }

    #[test]
    fn code_blocks_are_listed_in_document_order() {
        let elements = render("```\nfirst\n```\n```\nsecond\n```\ntext", false);
        assert_eq!(code_blocks(&elements), vec!["first", "second"]);
        assert!(code_blocks(&render("no code", false)).is_empty());
    }

    #[test]
    fn lines_carry_rules_bullets_and_gutters() {
        let elements = render("# T\n### S\n- i\n```\na\nb\n```", true);
        let lines = element_lines(&elements, 4);
        let kinds: Vec<LogKind> = lines.iter().map(|line| line.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                LogKind::Heading1,
                LogKind::HeadingRule,
                LogKind::Heading3,
                LogKind::ListItem,
                LogKind::Code,
                LogKind::Code,
                LogKind::Caret,
            ]
        );
        assert_eq!(lines[1].plain_text(), "────");
        assert_eq!(lines[3].plain_text(), "  • i");
        assert_eq!(lines[5].plain_text(), "│ b");
    }
}
