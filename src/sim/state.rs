//! Game state and core simulation types
//!
//! Everything the simulation mutates lives here; level geometry is read-only
//! and lives in [`super::level`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::level::LevelData;
use super::rect::Rect;

/// Elemental affinity of a player, hazard pool, door or gem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Fire,
    Water,
}

impl Element {
    /// The element this one is vulnerable to (fire dies in water, and vice versa)
    pub fn opposite(self) -> Self {
        match self {
            Element::Fire => Element::Water,
            Element::Water => Element::Fire,
        }
    }
}

/// Index into [`GameState::players`] (0 spawns as fire, 1 as water)
pub type PlayerId = usize;

/// Current phase of a level attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Normal play
    Playing,
    /// Both players are at their doors; victory fires when the countdown
    /// survives uninterrupted
    WinPending { ticks_left: u32 },
    /// Terminal until an external reset
    Won,
}

/// Semantically meaningful events produced by a tick, for the audio/render
/// sinks and the progress store. Consumers are best-effort; the simulation
/// never depends on them being handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Jumped { player: PlayerId },
    Died { player: PlayerId },
    Transmuted { player: PlayerId, now: Element },
    GemCollected { player: PlayerId, gem: usize },
    DoorEntered { player: PlayerId },
    Won,
}

/// A player-controlled avatar
#[derive(Debug, Clone)]
pub struct Player {
    /// Top-left corner of the full-size hitbox
    pub pos: Vec2,
    pub vel: Vec2,
    /// Full (unshrunk) hitbox dimensions
    pub size: Vec2,
    pub element: Element,
    /// Resting on the world floor or the top of a solid
    pub grounded: bool,
    /// Water ability engaged: hitbox height halved, top-anchored
    pub shrunk: bool,
    /// "was inside a transmute zone last frame" edge-trigger latch
    pub in_transmute: bool,
    /// "was touching a matching door last frame" edge-trigger latch
    pub at_door: bool,
    /// Float key state last frame; releasing it kills a fire player's rise
    pub ability_was_down: bool,
    spawn_pos: Vec2,
    spawn_element: Element,
}

impl Player {
    pub fn new(spawn: Vec2, size: Vec2, element: Element) -> Self {
        Self {
            pos: spawn,
            vel: Vec2::ZERO,
            size,
            element,
            grounded: true,
            shrunk: false,
            in_transmute: false,
            at_door: false,
            ability_was_down: false,
            spawn_pos: spawn,
            spawn_element: element,
        }
    }

    /// Collidable height right now. While the water ability is held the
    /// hitbox is half height with the top edge fixed, so the feet lift until
    /// gravity settles them again; every clamp must use this, never `size.y`.
    #[inline]
    pub fn hitbox_height(&self) -> f32 {
        if self.shrunk {
            self.size.y / 2.0
        } else {
            self.size.y
        }
    }

    /// Current collidable bounding box
    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: Vec2::new(self.size.x, self.hitbox_height()),
        }
    }

    /// Death: back to the spawn point with clean motion state. The element is
    /// kept; dying does not undo a transmutation.
    pub fn respawn(&mut self) {
        self.pos = self.spawn_pos;
        self.vel = Vec2::ZERO;
        self.grounded = true;
        self.shrunk = false;
    }

    /// Full reset to the level's starting configuration, element included.
    pub fn reset(&mut self) {
        self.respawn();
        self.element = self.spawn_element;
        self.in_transmute = false;
        self.at_door = false;
        self.ability_was_down = false;
    }
}

/// Complete mutable state of one level attempt
#[derive(Debug, Clone)]
pub struct GameState {
    pub players: [Player; 2],
    /// Parallel to `LevelData::gems`
    pub gems_collected: Vec<bool>,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl GameState {
    /// Create the starting state for a level
    pub fn new(level: &LevelData) -> Self {
        Self {
            players: [
                Player::new(level.spawns[0], level.player_size, Element::Fire),
                Player::new(level.spawns[1], level.player_size, Element::Water),
            ],
            gems_collected: vec![false; level.gems.len()],
            phase: GamePhase::Playing,
            time_ticks: 0,
        }
    }

    /// External restart command: fresh players, gems back, countdown gone.
    pub fn reset(&mut self) {
        for player in &mut self.players {
            player.reset();
        }
        self.gems_collected.fill(false);
        self.phase = GamePhase::Playing;
        self.time_ticks = 0;
    }

    /// The gem condition: vacuously true on levels without gems
    pub fn all_gems_collected(&self) -> bool {
        self.gems_collected.iter().all(|&c| c)
    }
}
