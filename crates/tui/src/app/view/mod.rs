pub(crate) mod markdown;
pub(crate) mod theme;
pub(crate) mod ui;
