//! Input boundary polled by the simulation once per tick.

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Logical actions the simulation reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Binding {
    MoveLeft,
    MoveRight,
    Jump,
    Run,
    Mine,
    Place,
    SpawnNpc,
    Fire,
    /// Select hotbar slot `n` (0-based).
    Hotbar(u8),
}

/// Device state as seen by one tick.
pub trait InputSource {
    /// The binding is currently held down.
    fn key_held(&self, binding: Binding) -> bool;
    /// The binding went down since the previous frame.
    fn key_first_down(&self, binding: Binding) -> bool;
    /// Cursor position in world units, if the cursor is over the world.
    fn cursor(&self) -> Option<Vec2>;
    /// Scroll wheel movement in notches since the previous frame.
    fn scroll_delta(&self) -> i32;
}

/// Plain snapshot of input for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    held: HashSet<Binding>,
    pressed: HashSet<Binding>,
    cursor: Option<Vec2>,
    scroll: i32,
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `binding` as held.
    pub fn hold(mut self, binding: Binding) -> Self {
        self.held.insert(binding);
        self
    }

    /// Mark `binding` as pressed this frame (also held).
    pub fn press(mut self, binding: Binding) -> Self {
        self.held.insert(binding);
        self.pressed.insert(binding);
        self
    }

    pub fn with_cursor(mut self, cursor: Vec2) -> Self {
        self.cursor = Some(cursor);
        self
    }

    pub fn with_scroll(mut self, scroll: i32) -> Self {
        self.scroll = scroll;
        self
    }

    /// Same held keys and cursor, without the one-shot edges. Used for the
    /// second and later ticks of a frame so a click is not applied twice.
    pub fn held_only(&self) -> Self {
        Self {
            held: self.held.clone(),
            pressed: HashSet::new(),
            cursor: self.cursor,
            scroll: 0,
        }
    }
}

impl InputSource for InputSnapshot {
    fn key_held(&self, binding: Binding) -> bool {
        self.held.contains(&binding)
    }

    fn key_first_down(&self, binding: Binding) -> bool {
        self.pressed.contains(&binding)
    }

    fn cursor(&self) -> Option<Vec2> {
        self.cursor
    }

    fn scroll_delta(&self) -> i32 {
        self.scroll
    }
}
