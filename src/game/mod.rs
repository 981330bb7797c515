//! Client-side arena simulation
//!
//! Each peer runs its own copy of these rules. Nothing here talks to the
//! network; the sync layer feeds remote state in and drains `SimEvent`s out.

pub mod engine;
pub mod grid;
pub mod input;
pub mod player;
pub mod projectile;
pub mod roles;
pub mod snapshot;
pub mod wall;

pub use engine::{SimEvent, Simulation};
pub use grid::{Grid, GridLayout, Grids, PlacedWall};
pub use input::{HeldKeys, InputSnapshot};
pub use player::Player;
pub use projectile::Projectile;
pub use roles::{LocalEntityController, RemoteEntityMirror};
pub use snapshot::Frame;
pub use wall::Wall;

use serde::{Deserialize, Serialize};

/// Arena width in world units
pub const GAME_WIDTH: f32 = 1200.0;
/// Arena height in world units
pub const GAME_HEIGHT: f32 = 800.0;

/// Player diameter
pub const PLAYER_SIZE: f32 = 30.0;
/// Player movement speed per held axis key (units per second)
pub const PLAYER_SPEED: f32 = 300.0;
pub const MAX_HEALTH: i32 = 100;
/// Seconds a dead player waits before respawning
pub const RESPAWN_SECS: f32 = 3.0;
/// Seconds between shots
pub const SHOOT_COOLDOWN: f32 = 0.25;

pub const PROJECTILE_SPEED: f32 = 500.0;
/// Projectile radius
pub const PROJECTILE_SIZE: f32 = 5.0;
pub const PROJECTILE_DAMAGE: i32 = 20;

/// Seconds between host wall placements
pub const WALL_INTERVAL_SECS: f32 = 15.0;
/// Fraction of a cell a placed wall covers on each axis
pub const WALL_FILL: f32 = 0.9;

pub const GRID_COLUMNS: usize = 6;
pub const GRID_ROWS: usize = 8;

/// Distance of the spawn point from the side's outer edge
pub const SPAWN_INSET: f32 = 100.0;

/// One of the two fixed halves of the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Facing direction in radians, fixed for the lifetime of the player
    pub fn facing(self) -> f32 {
        match self {
            Side::Left => 0.0,
            Side::Right => std::f32::consts::PI,
        }
    }

    /// Player color, also used as the projectile friendly-fire discriminator
    pub fn color(self) -> &'static str {
        match self {
            Side::Left => "red",
            Side::Right => "blue",
        }
    }

    /// Canonical spawn point inside the given arena
    pub fn spawn_point(self, bounds: &Bounds) -> (f32, f32) {
        let y = bounds.height / 2.0;
        match self {
            Side::Left => (SPAWN_INSET, y),
            Side::Right => (bounds.width - SPAWN_INSET, y),
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

/// Arena rectangle, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// X coordinate of the line separating the two halves
    pub fn center_line(&self) -> f32 {
        self.width / 2.0
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        (0.0..=self.width).contains(&x) && (0.0..=self.height).contains(&y)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(GAME_WIDTH, GAME_HEIGHT)
    }
}
