//! Held-key tracking and per-player key bindings
//!
//! Key events arrive asynchronously from the platform layer; the simulation
//! only ever sees an immutable [`FrameInput`] snapshot taken at the start of
//! its own tick. No queuing: a tap shorter than one frame is lost, exactly
//! like polling the live key map.

use std::collections::HashSet;

use serde::Deserialize;

use crate::sim::{FrameInput, PlayerInput};

/// Key names (browser `KeyboardEvent.key` values) controlling one player.
/// Configurable per level, fixed for the whole level.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyBindings {
    pub left: String,
    pub right: String,
    pub jump: String,
    pub ability: String,
}

impl KeyBindings {
    /// Fire player: WASD cluster with 'f' to float
    pub fn fire_default() -> Self {
        Self {
            left: "a".into(),
            right: "d".into(),
            jump: "w".into(),
            ability: "f".into(),
        }
    }

    /// Water player: arrow keys with 'g' to shrink
    pub fn water_default() -> Self {
        Self {
            left: "ArrowLeft".into(),
            right: "ArrowRight".into(),
            jump: "ArrowUp".into(),
            ability: "g".into(),
        }
    }

    pub fn default_pair() -> [KeyBindings; 2] {
        [Self::fire_default(), Self::water_default()]
    }
}

/// The set of currently-held keys. Pure latest-state: key-down inserts,
/// key-up removes, nothing is remembered in between.
#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<String>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-character keys are case-folded so Shift/CapsLock cannot strand
    /// a held key ("a" down, "A" up); named keys pass through unchanged.
    fn normalize(key: &str) -> String {
        if key.chars().count() == 1 {
            key.to_lowercase()
        } else {
            key.to_string()
        }
    }

    pub fn key_down(&mut self, key: &str) {
        self.held.insert(Self::normalize(key));
    }

    pub fn key_up(&mut self, key: &str) {
        self.held.remove(&Self::normalize(key));
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.held.contains(&Self::normalize(key))
    }

    /// Drop everything held. Called on window blur so keys released while
    /// unfocused do not stick.
    pub fn clear(&mut self) {
        self.held.clear();
    }

    /// Immutable per-tick snapshot through the level's bindings.
    pub fn snapshot(&self, bindings: &[KeyBindings; 2]) -> FrameInput {
        let player = |b: &KeyBindings| PlayerInput {
            left: self.is_held(&b.left),
            right: self.is_held(&b.right),
            jump: self.is_held(&b.jump),
            ability: self.is_held(&b.ability),
        };
        FrameInput {
            players: [player(&bindings[0]), player(&bindings[1])],
        }
    }
}
