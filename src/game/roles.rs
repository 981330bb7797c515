//! Ownership roles for the two player copies a client holds
//!
//! A client is the only writer of its own player. The opponent is a mirror:
//! the network writes it, the simulation only reads it.

use super::grid::Grids;
use super::input::HeldKeys;
use super::player::Player;
use super::projectile::Projectile;
use super::{Bounds, Side};

/// After the mirror respawns on its own countdown, a resync still reporting
/// the opponent dead is treated as stale for this long
pub const RESPAWN_GRACE_SECS: f32 = 1.0;

/// Result of damage applied to the local player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageOutcome {
    pub health: i32,
    pub died: bool,
}

/// Read-write handle on the player this client owns
#[derive(Debug, Clone)]
pub struct LocalEntityController {
    player: Player,
}

impl LocalEntityController {
    pub fn new(side: Side, bounds: &Bounds) -> Self {
        Self {
            player: Player::new(side, bounds),
        }
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn side(&self) -> Side {
        self.player.side
    }

    pub fn handle_input(&mut self, keys: &HeldKeys, dt: f32) {
        self.player.handle_input(keys, dt);
    }

    pub fn update(&mut self, dt: f32, bounds: &Bounds, grids: &Grids) {
        self.player.update(dt, bounds, grids);
    }

    pub fn shoot(&mut self) -> Option<Projectile> {
        self.player.shoot()
    }

    /// Commit damage. Only the owning client ever calls this.
    pub fn take_damage(&mut self, amount: i32) -> Option<DamageOutcome> {
        if self.player.is_dead() {
            return None;
        }
        let died = self.player.take_damage(amount);
        Some(DamageOutcome {
            health: self.player.health(),
            died,
        })
    }
}

/// Network-written copy of the opponent
#[derive(Debug, Clone)]
pub struct RemoteEntityMirror {
    player: Player,
    bounds: Bounds,
    /// Seconds since the last local respawn, if it is still recent
    since_respawn: Option<f32>,
}

impl RemoteEntityMirror {
    pub fn new(side: Side, bounds: &Bounds) -> Self {
        Self {
            player: Player::new(side, bounds),
            bounds: *bounds,
            since_respawn: None,
        }
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn side(&self) -> Side {
        self.player.side
    }

    /// Last write wins. Points outside the arena (or not finite) are
    /// rejected and leave the mirror where it was.
    pub fn apply_position(&mut self, x: f32, y: f32) -> bool {
        if !self.bounds.contains(x, y) {
            return false;
        }
        self.player.set_position(x, y);
        true
    }

    /// Health reports arriving while dead are stale; the owner's resync or
    /// the local respawn countdown brings the mirror back.
    pub fn apply_health(&mut self, health: i32) {
        if self.player.is_dead() {
            return;
        }
        self.player.set_health(health);
        if self.player.health() <= 0 {
            self.player.die();
        }
    }

    pub fn apply_death(&mut self) {
        self.player.die();
    }

    /// Full status from a periodic resync. A report of death right after
    /// the mirror came back on its own countdown predates that respawn and
    /// is ignored.
    pub fn apply_status(&mut self, x: f32, y: f32, health: i32, dead: bool) {
        if dead && !self.player.is_dead() && self.in_respawn_grace() {
            return;
        }
        self.player.sync_status(health, dead);
        if !dead {
            self.apply_position(x, y);
        }
    }

    /// Run timers and bounds clamping without input
    pub fn advance(&mut self, dt: f32, bounds: &Bounds, grids: &Grids) {
        let was_dead = self.player.is_dead();
        self.player.update(dt, bounds, grids);

        if was_dead && !self.player.is_dead() {
            self.since_respawn = Some(0.0);
        } else if let Some(elapsed) = self.since_respawn.as_mut() {
            *elapsed += dt;
            if *elapsed >= RESPAWN_GRACE_SECS {
                self.since_respawn = None;
            }
        }
    }

    fn in_respawn_grace(&self) -> bool {
        self.since_respawn.is_some()
    }
}
