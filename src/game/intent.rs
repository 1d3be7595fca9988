/// Held-key state polled once per tick from the input source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intent {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Fire key held this frame.
    pub fire: bool,
}

impl Intent {
    pub fn firing() -> Self {
        Self {
            fire: true,
            ..Self::default()
        }
    }
}
