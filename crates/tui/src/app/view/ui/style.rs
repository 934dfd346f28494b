use crate::app::state::{LogKind, LogSpan};
use ratatui::style::{Modifier, Style};

use super::super::theme::ui_colors;

pub(super) fn style_for(span: &LogSpan) -> Style {
    style_for_kind(span.kind)
}

pub(super) fn style_for_kind(kind: LogKind) -> Style {
    let theme = ui_colors();
    match kind {
        LogKind::Heading1 => Style::default()
            .fg(theme.heading_fg)
            .add_modifier(Modifier::BOLD),
        LogKind::Heading2 => Style::default()
            .fg(theme.subheading_fg)
            .add_modifier(Modifier::BOLD),
        LogKind::Heading3 => Style::default()
            .fg(theme.text_fg)
            .add_modifier(Modifier::BOLD),
        LogKind::HeadingRule => Style::default().fg(theme.rule_fg),
        LogKind::ListBullet => Style::default().fg(theme.accent_fg),
        LogKind::ListItem | LogKind::Paragraph => Style::default().fg(theme.text_fg),
        LogKind::CodeGutter => Style::default()
            .fg(theme.rule_fg)
            .bg(theme.code_block_bg),
        LogKind::Code => Style::default().fg(theme.code_fg).bg(theme.code_block_bg),
        LogKind::Caret => Style::default()
            .fg(theme.accent_fg)
            .add_modifier(Modifier::SLOW_BLINK),
        LogKind::Placeholder => Style::default()
            .fg(theme.muted_fg)
            .add_modifier(Modifier::DIM),
        LogKind::Loading => Style::default().fg(theme.accent_fg),
        LogKind::Error => Style::default()
            .fg(theme.error_fg)
            .add_modifier(Modifier::BOLD),
    }
}
