//! Render frames handed to the presentation layer

use serde::Serialize;

use super::grid::Grids;
use super::player::Player;
use super::projectile::Projectile;
use super::Side;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub side: Side,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: String,
    pub health: i32,
    pub dead: bool,
    pub respawn_timer: f32,
    /// True for the player this client controls
    pub local: bool,
}

impl PlayerView {
    fn from_player(player: &Player, local: bool) -> Self {
        Self {
            side: player.side,
            x: player.x,
            y: player.y,
            size: player.size,
            color: player.color.clone(),
            health: player.health(),
            dead: player.is_dead(),
            respawn_timer: player.respawn_timer(),
            local,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectileView {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WallView {
    pub side: Side,
    pub row: usize,
    pub col: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: String,
}

/// Everything needed to draw one tick
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Frame {
    pub tick: u64,
    /// Local player first, then the remote one if present
    pub players: Vec<PlayerView>,
    pub projectiles: Vec<ProjectileView>,
    /// Left grid walls then right grid walls, row-major
    pub walls: Vec<WallView>,
}

impl Frame {
    pub fn build(
        tick: u64,
        local: &Player,
        remote: Option<&Player>,
        projectiles: &[Projectile],
        grids: &Grids,
    ) -> Self {
        let mut players = vec![PlayerView::from_player(local, true)];
        if let Some(remote) = remote {
            players.push(PlayerView::from_player(remote, false));
        }

        let projectiles = projectiles
            .iter()
            .map(|p| ProjectileView {
                x: p.x,
                y: p.y,
                size: p.size,
                color: p.color.clone(),
            })
            .collect();

        let walls = [&grids.left, &grids.right]
            .into_iter()
            .flat_map(|grid| {
                grid.walls().map(move |(row, col, wall)| WallView {
                    side: grid.side(),
                    row,
                    col,
                    x: wall.x,
                    y: wall.y,
                    width: wall.width,
                    height: wall.height,
                    color: wall.color.clone(),
                })
            })
            .collect();

        Self {
            tick,
            players,
            projectiles,
            walls,
        }
    }
}
