//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One logical tick per display frame, player A stepped before player B
//! - Input read as an immutable snapshot taken at tick start
//! - No rendering or platform dependencies

pub mod collision;
pub mod level;
pub mod rect;
pub mod state;
pub mod step;

pub use level::{DoorRule, LevelData, LevelError, TileKind, Zone, ZoneKind};
pub use rect::Rect;
pub use state::{Element, GameEvent, GamePhase, GameState, Player, PlayerId};
pub use step::{tick, FrameInput, PlayerInput};
