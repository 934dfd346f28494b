pub(crate) mod clipboard;
pub(crate) mod paths;
pub(crate) mod text;
