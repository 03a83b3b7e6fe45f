//! Keyboard input state for the player ship.
//!
//! Key events are folded into an [`InputBitmask`]: pressing a key sets its
//! action bit (and clears the opposite direction), releasing it clears the
//! bit. [`CheatCode`] watches the raw key stream for the classic
//! up-up-down-down sequence.
//!
//! # Examples
//!
//! ```
//! use bullet_purgatory::input::{InputAction, InputBitmask};
//!
//! let mut input = InputBitmask::new();
//! input.press(InputAction::Left);
//! input.press(InputAction::Right);
//!
//! assert!(input.pressed(InputAction::Right));
//! assert!(!input.pressed(InputAction::Left));
//! ```

/// Control actions, one bit each
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputAction {
    Left,
    Right,
    Up,
    Down,
    FirePrimary,
    FireSecondary,
    Menu,
    BossKey,
}

impl InputAction {
    /// Bit set while the action is held
    pub const fn bit(self) -> u8 {
        match self {
            InputAction::Left => 0b0000_0001,
            InputAction::Right => 0b0000_0010,
            InputAction::Up => 0b0000_0100,
            InputAction::Down => 0b0000_1000,
            InputAction::FirePrimary => 0b0001_0000,
            InputAction::FireSecondary => 0b0010_0000,
            InputAction::Menu => 0b0100_0000,
            InputAction::BossKey => 0b1000_0000,
        }
    }

    /// Bits kept when the action is pressed. A direction clears its opposite.
    pub const fn reset_mask(self) -> u8 {
        match self {
            InputAction::Left => 0b1111_1101,
            InputAction::Right => 0b1111_1110,
            InputAction::Up => 0b1111_0111,
            InputAction::Down => 0b1111_1011,
            _ => 0b1111_1111,
        }
    }

    /// Fixed key binding. Matching is case-insensitive.
    pub fn from_key(key: &str) -> Option<Self> {
        let action = match key.to_ascii_lowercase().as_str() {
            "escape" => InputAction::Menu,
            "space" => InputAction::BossKey,
            "a" => InputAction::Left,
            "d" => InputAction::Right,
            "w" => InputAction::Up,
            "s" => InputAction::Down,
            "j" => InputAction::FirePrimary,
            "k" => InputAction::FireSecondary,
            _ => return None,
        };
        Some(action)
    }
}

/// Currently held actions
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputBitmask(u8);

impl InputBitmask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn press(&mut self, action: InputAction) {
        self.0 &= action.reset_mask();
        self.0 |= action.bit();
    }

    pub fn release(&mut self, action: InputAction) {
        self.0 &= !action.bit();
    }

    pub fn pressed(self, action: InputAction) -> bool {
        self.0 & action.bit() == action.bit()
    }

    /// Apply a key press by key name. Unbound keys are ignored.
    pub fn key_pressed(&mut self, key: &str) {
        if let Some(action) = InputAction::from_key(key) {
            self.press(action);
        }
    }

    /// Apply a key release by key name. Unbound keys are ignored.
    pub fn key_released(&mut self, key: &str) {
        if let Some(action) = InputAction::from_key(key) {
            self.release(action);
        }
    }

    /// Unit-free movement direction (`-1`, `0` or `1` per axis), y down
    pub fn direction(self) -> (f32, f32) {
        let mut dx = 0.0;
        let mut dy = 0.0;
        if self.pressed(InputAction::Left) {
            dx = -1.0;
        }
        if self.pressed(InputAction::Right) {
            dx = 1.0;
        }
        if self.pressed(InputAction::Up) {
            dy = -1.0;
        }
        if self.pressed(InputAction::Down) {
            dy = 1.0;
        }
        (dx, dy)
    }
}

const CHEAT_SEQUENCE: [&str; 10] = [
    "up", "up", "down", "down", "left", "right", "left", "right", "b", "a",
];

/// Tracks progress through the cheat sequence. It can be completed once.
#[derive(Clone, Debug, Default)]
pub struct CheatCode {
    position: usize,
    completed: bool,
    pending: bool,
}

impl CheatCode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one pressed key. A wrong key restarts the sequence.
    pub fn advance(&mut self, key: &str) {
        if self.completed {
            return;
        }

        if !key.eq_ignore_ascii_case(CHEAT_SEQUENCE[self.position]) {
            self.position = 0;
            return;
        }

        self.position += 1;
        if self.position == CHEAT_SEQUENCE.len() {
            self.completed = true;
            self.pending = true;
        }
    }

    /// Whether the sequence was entered and its reward not yet applied
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Mark the reward as applied
    pub fn consume(&mut self) {
        self.pending = false;
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }
}
