pub(crate) mod keys;
pub(crate) mod paste;

pub(crate) use keys::{handle_key, handle_mouse_event};
pub(crate) use paste::handle_paste;
