use ratatui::style::Color;

#[derive(Clone, Copy)]
pub(crate) struct UiColors {
    pub(crate) accent_fg: Color,
    pub(crate) heading_fg: Color,
    pub(crate) subheading_fg: Color,
    pub(crate) rule_fg: Color,
    pub(crate) text_fg: Color,
    pub(crate) muted_fg: Color,
    pub(crate) code_fg: Color,
    pub(crate) code_block_bg: Color,
    pub(crate) focus_bg: Color,
    pub(crate) composer_bg: Color,
    pub(crate) panel_border_fg: Color,
    pub(crate) file_ok_fg: Color,
    pub(crate) warn_fg: Color,
    pub(crate) error_fg: Color,
    pub(crate) run_ready_fg: Color,
    pub(crate) run_completed_fg: Color,
    pub(crate) run_error_fg: Color,
}

const DEFAULT_UI: UiColors = UiColors {
    accent_fg: Color::Rgb(129, 140, 248),
    heading_fg: Color::Rgb(232, 178, 92),
    subheading_fg: Color::Rgb(248, 208, 120),
    rule_fg: Color::DarkGray,
    text_fg: Color::White,
    muted_fg: Color::Gray,
    code_fg: Color::LightGreen,
    code_block_bg: Color::Rgb(36, 44, 52),
    focus_bg: Color::Rgb(49, 46, 84),
    composer_bg: Color::Rgb(40, 40, 40),
    panel_border_fg: Color::DarkGray,
    file_ok_fg: Color::LightGreen,
    warn_fg: Color::Yellow,
    error_fg: Color::Red,
    run_ready_fg: Color::White,
    run_completed_fg: Color::LightGreen,
    run_error_fg: Color::Red,
};

pub(crate) fn ui_colors() -> UiColors {
    DEFAULT_UI
}
