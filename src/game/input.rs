//! Per-tick input capture

/// Directional keys currently held down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl HeldKeys {
    /// Build from key names as reported by the presentation layer.
    /// WASD and the arrow keys both steer.
    pub fn from_key_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut keys = Self::default();
        for name in names {
            match name {
                "w" | "W" | "ArrowUp" => keys.up = true,
                "s" | "S" | "ArrowDown" => keys.down = true,
                "a" | "A" | "ArrowLeft" => keys.left = true,
                "d" | "D" | "ArrowRight" => keys.right = true,
                _ => {}
            }
        }
        keys
    }

    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

/// Input captured once at the start of a tick and passed into the update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub keys: HeldKeys,
    /// Fire edge: true only on the tick the fire key went down
    pub fire: bool,
}

impl InputSnapshot {
    pub fn capture(keys: HeldKeys, fire: bool) -> Self {
        Self { keys, fire }
    }

    pub fn idle() -> Self {
        Self::default()
    }
}
