//! Cinder Brook - a two-character fire/water cooperative platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, game state)
//! - `input`: Held-key tracking and per-player key bindings
//! - `render`: DOM adapter mirroring sim state (web only)
//! - `audio`: Procedural sound effects (web only)
//! - `progress`: Level completion persistence
//! - `settings`: Audio preferences

pub mod input;
pub mod progress;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod audio;
#[cfg(target_arch = "wasm32")]
pub mod render;

pub use progress::Progress;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Logical simulation rate; the browser drives one tick per display frame.
    pub const TICKS_PER_SECOND: u32 = 60;

    /// Tile edge length in pixels.
    pub const TILE_SIZE: f32 = 32.0;

    /// Per-frame horizontal displacement while a move key is held.
    pub const MOVE_SPEED: f32 = 3.0;
    /// Downward acceleration added to vertical velocity each frame.
    pub const GRAVITY: f32 = 0.5;
    /// Initial upward speed of a jump.
    pub const JUMP_POWER: f32 = 10.0;
    /// Constant rise rate while the fire player holds its float key.
    pub const FLOAT_RISE: f32 = -2.0;

    /// Player hitbox defaults (levels may override)
    pub const PLAYER_WIDTH: f32 = 20.0;
    pub const PLAYER_HEIGHT: f32 = 30.0;

    /// How close a shrunk water player's feet must be to a gated platform's
    /// underside for it to slip through.
    pub const GATED_BOTTOM_TOLERANCE: f32 = 10.0;

    /// Win-confirmation delay in ticks (1 s at 60 Hz).
    pub const WIN_DELAY_TICKS: u32 = 60;
}
