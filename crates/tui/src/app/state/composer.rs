use super::files::SlotKind;
use super::input::InputState;

/// Inline path prompt opened on a slot.
pub struct PathComposer {
    pub slot: SlotKind,
    pub input: InputState,
}

impl PathComposer {
    pub fn new(slot: SlotKind, initial: &str) -> Self {
        let mut input = InputState::default();
        input.set_from(initial);
        Self { slot, input }
    }
}
