//! Projectiles: constant-velocity travel, wall sweeps and the hit gate

use super::grid::Grids;
use super::player::Player;
use super::{Bounds, Side, PROJECTILE_SIZE, PROJECTILE_SPEED};

/// A projectile in flight
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub x: f32,
    pub y: f32,
    /// Travel direction in radians, fixed at spawn
    pub direction: f32,
    /// Owner's color
    pub color: String,
    pub speed: f32,
    /// Radius
    pub size: f32,
    /// Set when the projectile struck a wall and must be culled
    pub remove: bool,
}

impl Projectile {
    pub fn new(x: f32, y: f32, direction: f32, color: String) -> Self {
        Self {
            x,
            y,
            direction,
            color,
            speed: PROJECTILE_SPEED,
            size: PROJECTILE_SIZE,
            remove: false,
        }
    }

    /// Advance along the fixed direction. A swept segment that crosses a
    /// wall in either grid marks the projectile for removal instead.
    pub fn update(&mut self, dt: f32, grids: &Grids) {
        let next_x = self.x + self.direction.cos() * self.speed * dt;
        let next_y = self.y + self.direction.sin() * self.speed * dt;

        if grids.query_line(self.x, self.y, next_x, next_y) {
            self.remove = true;
            return;
        }

        self.x = next_x;
        self.y = next_y;
    }

    pub fn is_off_screen(&self, bounds: &Bounds) -> bool {
        self.x < 0.0 || self.x > bounds.width || self.y < 0.0 || self.y > bounds.height
    }

    /// Side this projectile can damage: a rightward shot can only hit the
    /// right half's player and vice versa
    pub fn target_side(&self) -> Side {
        if self.direction.cos() > 0.0 {
            Side::Right
        } else {
            Side::Left
        }
    }

    /// Overlap plus the color and direction gates
    pub fn hits(&self, player: &Player) -> bool {
        if player.is_dead() {
            return false;
        }

        let dx = self.x - player.x;
        let dy = self.y - player.y;
        let distance = (dx * dx + dy * dy).sqrt();

        distance < player.radius() + self.size
            && self.color != player.color
            && self.target_side() == player.side
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::wall::Wall;

    fn arena() -> (Bounds, Grids) {
        let bounds = Bounds::default();
        let grids = Grids::new(&bounds);
        (bounds, grids)
    }

    #[test]
    fn travels_along_direction() {
        let (_, grids) = arena();
        let mut projectile = Projectile::new(100.0, 400.0, 0.0, "red".into());
        projectile.update(0.1, &grids);
        assert_eq!((projectile.x, projectile.y), (150.0, 400.0));
        assert!(!projectile.remove);
    }

    #[test]
    fn wall_in_path_marks_removal_without_moving() {
        let (_, mut grids) = arena();
        // Right cell (3, 0) spans x 605..695, y 305..395
        grids.right.place(Wall::new(90.0, 90.0), 3, 0);

        let mut projectile = Projectile::new(580.0, 350.0, 0.0, "red".into());
        projectile.update(0.1, &grids);
        assert!(projectile.remove);
        assert_eq!(projectile.x, 580.0);
    }

    #[test]
    fn off_screen_on_any_axis() {
        let (bounds, _) = arena();
        assert!(Projectile::new(-1.0, 10.0, 0.0, "red".into()).is_off_screen(&bounds));
        assert!(Projectile::new(10.0, 801.0, 0.0, "red".into()).is_off_screen(&bounds));
        assert!(!Projectile::new(600.0, 400.0, 0.0, "red".into()).is_off_screen(&bounds));
    }

    #[test]
    fn rightward_shot_only_hits_right_side() {
        let bounds = Bounds::default();
        let mut right = Player::new(Side::Right, &bounds);
        right.set_position(700.0, 400.0);
        let mut left = Player::new(Side::Left, &bounds);
        left.set_position(700.0, 400.0);
        left.color = "green".into();

        let shot = Projectile::new(690.0, 400.0, 0.0, "red".into());
        assert!(shot.hits(&right));
        assert!(!shot.hits(&left));
    }

    #[test]
    fn same_color_never_hits() {
        let bounds = Bounds::default();
        let mut right = Player::new(Side::Right, &bounds);
        right.set_position(700.0, 400.0);

        let shot = Projectile::new(700.0, 400.0, 0.0, right.color.clone());
        assert!(!shot.hits(&right));
    }

    #[test]
    fn leftward_shot_targets_left_side() {
        let shot = Projectile::new(0.0, 0.0, std::f32::consts::PI, "blue".into());
        assert_eq!(shot.target_side(), Side::Left);
    }

    #[test]
    fn dead_players_are_not_hit() {
        let bounds = Bounds::default();
        let mut right = Player::new(Side::Right, &bounds);
        right.die();
        let shot = Projectile::new(right.x, right.y, 0.0, "red".into());
        assert!(!shot.hits(&right));
    }
}
