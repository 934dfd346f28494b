use std::iter::Peekable;
use std::str::Chars;
use unicode_width::UnicodeWidthChar;

const TAB_WIDTH: usize = 4;

pub fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0).max(1)
}

pub fn visual_width(text: &str) -> usize {
    text.chars().map(char_width).sum()
}

pub fn truncate_to_width(text: &str, width: usize) -> String {
    if visual_width(text) <= width {
        return text.to_string();
    }
    if width <= 3 {
        return ".".repeat(width);
    }
    let target = width - 3;
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = char_width(ch);
        if used + w > target {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push_str("...");
    out
}

/// Keeps the tail of `text` when it does not fit, e.g. for long paths.
pub fn truncate_front_to_width(text: &str, width: usize) -> String {
    if visual_width(text) <= width {
        return text.to_string();
    }
    if width <= 3 {
        return ".".repeat(width);
    }
    let target = width - 3;
    let mut tail: Vec<char> = Vec::new();
    let mut used = 0;
    for ch in text.chars().rev() {
        let w = char_width(ch);
        if used + w > target {
            break;
        }
        tail.push(ch);
        used += w;
    }
    let mut out = String::from("...");
    out.extend(tail.into_iter().rev());
    out
}

// CSI runs to its final byte; OSC runs to BEL or ST; anything else drops one char.
fn skip_escape_sequence(chars: &mut Peekable<Chars<'_>>) {
    match chars.peek().copied() {
        None => {}
        Some('[') => {
            chars.next();
            for seq in chars.by_ref() {
                if (0x40..=0x7e).contains(&(seq as u32)) {
                    break;
                }
            }
        }
        Some(']') => {
            chars.next();
            while let Some(ch) = chars.next() {
                if ch == '\x07' {
                    break;
                }
                if ch == '\x1b' && chars.peek().copied() == Some('\\') {
                    chars.next();
                    break;
                }
            }
        }
        Some(_) => {
            chars.next();
        }
    }
}

/// Makes provider or file text safe to draw: no escape sequences, no tabs,
/// no carriage returns, no other control characters.
pub fn sanitize_for_tui(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut col = 0_usize;
    let mut chars = value.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\x1b' => skip_escape_sequence(&mut chars),
            '\t' => {
                let spaces = (TAB_WIDTH - col % TAB_WIDTH).max(1);
                out.extend(std::iter::repeat(' ').take(spaces));
                col += spaces;
            }
            '\r' => {}
            c if c.is_control() => {
                out.push(' ');
                col += 1;
            }
            c => {
                out.push(c);
                col += char_width(c);
            }
        }
    }

    out
}
