//! Level data: geometry, zones, gems, spawn points, tuning
//!
//! Levels are authored as JSON and fully validated at load time; the
//! simulation never re-checks any of this per frame. Geometry comes in two
//! interchangeable forms: explicit typed rectangles in `zones`, and an
//! optional character tile grid whose solid and door cells are merged into
//! zones during loading (the grid itself is only read back by the renderer).

use glam::Vec2;
use serde::Deserialize;

use crate::consts;
use crate::input::KeyBindings;

use super::rect::Rect;
use super::state::Element;

/// Terrain classification of one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileKind {
    Empty,
    /// Solid wall, collides
    Stone,
    /// Decorative platform tile, no collision of its own
    Platform,
    FireDoor,
    WaterDoor,
}

impl TileKind {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '.' | ' ' => Some(TileKind::Empty),
            '#' => Some(TileKind::Stone),
            '=' => Some(TileKind::Platform),
            'F' => Some(TileKind::FireDoor),
            'W' => Some(TileKind::WaterDoor),
            _ => None,
        }
    }
}

/// Which element satisfies a door, fixed per level and validated at load,
/// never inferred in collision code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorRule {
    /// A door admits the player of its own element
    #[default]
    Same,
    /// Cross-assignment: a door admits the player of the opposite element
    Opposite,
}

impl DoorRule {
    /// Does a door of `door_element` admit a player of `player_element`?
    pub fn admits(self, door_element: Element, player_element: Element) -> bool {
        match self {
            DoorRule::Same => door_element == player_element,
            DoorRule::Opposite => door_element == player_element.opposite(),
        }
    }
}

/// Semantic kind of a zone rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ZoneKind {
    /// Impassable; players are pushed out along the contact axis
    Solid,
    /// Ability-gated platform: passable only under the per-element condition,
    /// otherwise blocks horizontally
    Gated,
    /// Liquid pool; kills players of the opposite element
    Hazard { element: Element },
    /// Flips a player's element once per entry
    Transmute,
    /// Exit door with an affinity, interpreted through the level's DoorRule
    Door { element: Element },
}

/// A typed static rectangle in level space
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Zone {
    #[serde(flatten)]
    pub kind: ZoneKind,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Zone {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }
}

/// A collectible gem, picked up by the matching-element player
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Gem {
    pub element: Element,
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_gem_size")]
    pub size: f32,
}

fn default_gem_size() -> f32 {
    15.0
}

impl Gem {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.size, self.size)
    }
}

/// Per-level physics tuning; every field defaults to the standard feel.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PhysicsParams {
    /// Downward acceleration per frame
    pub gravity: f32,
    /// Horizontal displacement per frame while a move key is held
    pub move_speed: f32,
    /// Initial upward speed of a jump
    pub jump_power: f32,
    /// Rise rate while the fire player floats (negative = up)
    pub float_rise: f32,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            gravity: consts::GRAVITY,
            move_speed: consts::MOVE_SPEED,
            jump_power: consts::JUMP_POWER,
            float_rise: consts::FLOAT_RISE,
        }
    }
}

/// Everything wrong a level file can be
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("level JSON malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("grid row {row} has width {got}, expected {expected}")]
    RaggedGrid { row: usize, got: usize, expected: usize },
    #[error("unknown tile character {ch:?} at row {row}, column {col}")]
    BadTile { row: usize, col: usize, ch: char },
    #[error("level must have exactly two doors, found {0}")]
    DoorCount(usize),
    #[error("the two doors must have distinct elements")]
    DoorsSameElement,
    #[error("spawn point {0} lies outside the world bounds")]
    SpawnOutOfBounds(usize),
    #[error("win_delay_ticks must be greater than zero")]
    ZeroWinDelay,
    #[error("no such built-in level: {0}")]
    UnknownLevel(u32),
}

/// A fully loaded, validated level. Static for the whole attempt; read-only
/// to the simulation.
#[derive(Debug, Clone, Deserialize)]
pub struct LevelData {
    pub number: u32,
    pub name: String,
    /// World extent in pixels
    pub world: Vec2,
    #[serde(default = "default_tile_size")]
    pub tile_size: f32,
    /// Optional character grid, one string per row ('.', '#', '=', 'F', 'W')
    #[serde(default)]
    grid: Vec<String>,
    #[serde(default)]
    pub zones: Vec<Zone>,
    #[serde(default)]
    pub gems: Vec<Gem>,
    /// Starting positions: fire player first, water player second
    pub spawns: [Vec2; 2],
    #[serde(default = "default_player_size")]
    pub player_size: Vec2,
    #[serde(default)]
    pub physics: PhysicsParams,
    #[serde(default)]
    pub door_rule: DoorRule,
    #[serde(default = "default_win_delay")]
    pub win_delay_ticks: u32,
    /// Key bindings, fire player first
    #[serde(default = "KeyBindings::default_pair")]
    pub bindings: [KeyBindings; 2],

    #[serde(skip)]
    tiles: Vec<Vec<TileKind>>,
}

fn default_tile_size() -> f32 {
    consts::TILE_SIZE
}

fn default_player_size() -> Vec2 {
    Vec2::new(consts::PLAYER_WIDTH, consts::PLAYER_HEIGHT)
}

fn default_win_delay() -> u32 {
    consts::WIN_DELAY_TICKS
}

impl LevelData {
    /// Parse and validate a level from JSON.
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let mut level: LevelData = serde_json::from_str(json)?;
        level.parse_grid()?;
        level.derive_grid_zones();
        level.validate()?;
        Ok(level)
    }

    /// Load one of the levels shipped with the game.
    pub fn load_builtin(number: u32) -> Result<Self, LevelError> {
        let json = match number {
            1 => include_str!("../../assets/levels/level1.json"),
            2 => include_str!("../../assets/levels/level2.json"),
            3 => include_str!("../../assets/levels/level3.json"),
            n => return Err(LevelError::UnknownLevel(n)),
        };
        Self::from_json(json)
    }

    /// Number of levels shipped with the game.
    pub const BUILTIN_COUNT: u32 = 3;

    /// Parsed tile grid, row-major; empty if the level has no grid.
    pub fn tiles(&self) -> &[Vec<TileKind>] {
        &self.tiles
    }

    pub fn solids(&self) -> impl Iterator<Item = Rect> + '_ {
        self.zones.iter().filter_map(|z| match z.kind {
            ZoneKind::Solid => Some(z.rect()),
            _ => None,
        })
    }

    pub fn gated(&self) -> impl Iterator<Item = Rect> + '_ {
        self.zones.iter().filter_map(|z| match z.kind {
            ZoneKind::Gated => Some(z.rect()),
            _ => None,
        })
    }

    pub fn hazards(&self) -> impl Iterator<Item = (Rect, Element)> + '_ {
        self.zones.iter().filter_map(|z| match z.kind {
            ZoneKind::Hazard { element } => Some((z.rect(), element)),
            _ => None,
        })
    }

    pub fn transmutes(&self) -> impl Iterator<Item = Rect> + '_ {
        self.zones.iter().filter_map(|z| match z.kind {
            ZoneKind::Transmute => Some(z.rect()),
            _ => None,
        })
    }

    /// Doors in stable order; the index identifies a door for the "two
    /// distinct doors" win requirement.
    pub fn doors(&self) -> impl Iterator<Item = (Rect, Element)> + '_ {
        self.zones.iter().filter_map(|z| match z.kind {
            ZoneKind::Door { element } => Some((z.rect(), element)),
            _ => None,
        })
    }

    fn parse_grid(&mut self) -> Result<(), LevelError> {
        if self.grid.is_empty() {
            return Ok(());
        }
        let expected = self.grid[0].chars().count();
        let mut tiles = Vec::with_capacity(self.grid.len());
        for (row, line) in self.grid.iter().enumerate() {
            let got = line.chars().count();
            if got != expected {
                return Err(LevelError::RaggedGrid { row, got, expected });
            }
            let mut cells = Vec::with_capacity(got);
            for (col, ch) in line.chars().enumerate() {
                let kind =
                    TileKind::from_char(ch).ok_or(LevelError::BadTile { row, col, ch })?;
                cells.push(kind);
            }
            tiles.push(cells);
        }
        self.tiles = tiles;
        Ok(())
    }

    /// Merge the grid's solid and door cells into zone rectangles. Stone runs
    /// merge horizontally per row; door runs merge vertically per column
    /// (doors are drawn as stacked tiles).
    fn derive_grid_zones(&mut self) {
        let ts = self.tile_size;
        for (y, row) in self.tiles.iter().enumerate() {
            let mut run_start: Option<usize> = None;
            for x in 0..=row.len() {
                let solid = x < row.len() && row[x] == TileKind::Stone;
                match (solid, run_start) {
                    (true, None) => run_start = Some(x),
                    (false, Some(start)) => {
                        self.zones.push(Zone {
                            kind: ZoneKind::Solid,
                            x: start as f32 * ts,
                            y: y as f32 * ts,
                            w: (x - start) as f32 * ts,
                            h: ts,
                        });
                        run_start = None;
                    }
                    _ => {}
                }
            }
        }

        let height = self.tiles.len();
        let width = self.tiles.first().map_or(0, |r| r.len());
        for x in 0..width {
            let mut y = 0;
            while y < height {
                let element = match self.tiles[y][x] {
                    TileKind::FireDoor => Some(Element::Fire),
                    TileKind::WaterDoor => Some(Element::Water),
                    _ => None,
                };
                if let Some(element) = element {
                    let start = y;
                    while y < height && self.tiles[y][x] == self.tiles[start][x] {
                        y += 1;
                    }
                    self.zones.push(Zone {
                        kind: ZoneKind::Door { element },
                        x: x as f32 * ts,
                        y: start as f32 * ts,
                        w: ts,
                        h: (y - start) as f32 * ts,
                    });
                } else {
                    y += 1;
                }
            }
        }
    }

    fn validate(&self) -> Result<(), LevelError> {
        if self.win_delay_ticks == 0 {
            return Err(LevelError::ZeroWinDelay);
        }

        let doors: Vec<_> = self.doors().collect();
        if doors.len() != 2 {
            return Err(LevelError::DoorCount(doors.len()));
        }
        if doors[0].1 == doors[1].1 {
            return Err(LevelError::DoorsSameElement);
        }

        for (i, spawn) in self.spawns.iter().enumerate() {
            let inside = spawn.x >= 0.0
                && spawn.y >= 0.0
                && spawn.x + self.player_size.x <= self.world.x
                && spawn.y + self.player_size.y <= self.world.y;
            if !inside {
                return Err(LevelError::SpawnOutOfBounds(i));
            }
        }
        Ok(())
    }
}
