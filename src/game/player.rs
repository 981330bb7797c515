//! Player movement, shooting and the alive/dead state machine

use super::grid::Grids;
use super::input::HeldKeys;
use super::projectile::Projectile;
use super::{
    Bounds, Side, MAX_HEALTH, PLAYER_SIZE, PLAYER_SPEED, RESPAWN_SECS, SHOOT_COOLDOWN,
};

#[derive(Debug, Clone)]
pub struct Player {
    pub side: Side,
    pub x: f32,
    pub y: f32,
    /// Position at the start of the current tick, restored on wall contact
    prev_x: f32,
    prev_y: f32,
    pub color: String,
    pub size: f32,
    pub speed: f32,
    health: i32,
    dead: bool,
    respawn_timer: f32,
    shoot_cooldown: f32,
    spawn: (f32, f32),
}

impl Player {
    /// Create a player at its side's spawn point
    pub fn new(side: Side, bounds: &Bounds) -> Self {
        let spawn = side.spawn_point(bounds);
        Self {
            side,
            x: spawn.0,
            y: spawn.1,
            prev_x: spawn.0,
            prev_y: spawn.1,
            color: side.color().to_string(),
            size: PLAYER_SIZE,
            speed: PLAYER_SPEED,
            health: MAX_HEALTH,
            dead: false,
            respawn_timer: 0.0,
            shoot_cooldown: 0.0,
            spawn,
        }
    }

    /// Facing direction, a constant of the side
    pub fn direction(&self) -> f32 {
        self.side.facing()
    }

    pub fn radius(&self) -> f32 {
        self.size / 2.0
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn respawn_timer(&self) -> f32 {
        self.respawn_timer
    }

    pub fn shoot_cooldown(&self) -> f32 {
        self.shoot_cooldown
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    /// Teleport without simulating; also resets the tick anchor
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
        self.prev_x = x;
        self.prev_y = y;
    }

    /// Overwrite health from an authoritative source, clamped to the valid range
    pub fn set_health(&mut self, health: i32) {
        self.health = health.clamp(0, MAX_HEALTH);
    }

    /// Move along each held axis independently. Diagonals are not normalized.
    pub fn handle_input(&mut self, keys: &HeldKeys, dt: f32) {
        if self.dead {
            return;
        }

        self.prev_x = self.x;
        self.prev_y = self.y;

        let step = self.speed * dt;
        if keys.up {
            self.y -= step;
        }
        if keys.down {
            self.y += step;
        }
        if keys.left {
            self.x -= step;
        }
        if keys.right {
            self.x += step;
        }
    }

    /// Resolve walls, the center line and the arena edges, then tick timers.
    /// While dead only the respawn countdown runs.
    pub fn update(&mut self, dt: f32, bounds: &Bounds, grids: &Grids) {
        if self.dead {
            self.respawn_timer -= dt;
            if self.respawn_timer <= 0.0 {
                self.respawn();
            }
            return;
        }

        let radius = self.radius();

        if grids
            .get(self.side)
            .query_circle(self.x, self.y, radius)
            .is_some()
        {
            self.x = self.prev_x;
            self.y = self.prev_y;
        }

        let center_line = bounds.center_line();
        match self.side {
            Side::Left => {
                if self.x + radius > center_line {
                    self.x = center_line - radius;
                }
            }
            Side::Right => {
                if self.x - radius < center_line {
                    self.x = center_line + radius;
                }
            }
        }

        self.x = self.x.clamp(radius, bounds.width - radius);
        self.y = self.y.clamp(radius, bounds.height - radius);

        self.shoot_cooldown = (self.shoot_cooldown - dt).max(0.0);
    }

    /// Fire from the player's edge. Nothing happens while dead or cooling down.
    pub fn shoot(&mut self) -> Option<Projectile> {
        if self.dead || self.shoot_cooldown > 0.0 {
            return None;
        }

        let direction = self.direction();
        let projectile = Projectile::new(
            self.x + direction.cos() * self.radius(),
            self.y + direction.sin() * self.radius(),
            direction,
            self.color.clone(),
        );
        self.shoot_cooldown = SHOOT_COOLDOWN;
        Some(projectile)
    }

    /// Apply damage. Returns true if this hit killed the player.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if self.dead {
            return false;
        }

        self.health = (self.health - amount).max(0);
        if self.health <= 0 {
            self.die();
            return true;
        }
        false
    }

    pub fn die(&mut self) {
        if self.dead {
            return;
        }
        self.dead = true;
        self.health = 0;
        self.respawn_timer = RESPAWN_SECS;
    }

    /// Adopt a status reported by the player's owner
    pub fn sync_status(&mut self, health: i32, dead: bool) {
        if dead {
            self.die();
            return;
        }
        if self.dead {
            self.dead = false;
            self.respawn_timer = 0.0;
        }
        self.set_health(health);
    }

    pub fn respawn(&mut self) {
        self.dead = false;
        self.health = MAX_HEALTH;
        self.respawn_timer = 0.0;
        let (x, y) = self.spawn;
        self.set_position(x, y);
    }
}
