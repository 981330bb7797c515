//! Per-client simulation tick
//!
//! One `Simulation` holds a client's whole view of the match: the player it
//! controls, a mirror of the opponent, every projectile in flight and both
//! wall grids. `tick` runs the fixed update order and returns the events the
//! sync layer must publish.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use super::grid::{GridLayout, Grids, PlacedWall};
use super::input::InputSnapshot;
use super::projectile::Projectile;
use super::roles::{LocalEntityController, RemoteEntityMirror};
use super::snapshot::Frame;
use super::wall::Wall;
use super::{Bounds, Side, PROJECTILE_DAMAGE, WALL_FILL, WALL_INTERVAL_SECS};

/// State changes made by the local client that its peer must hear about
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    ProjectileFired(Projectile),
    HealthChanged { health: i32 },
    Died,
    WallPlaced(PlacedWall),
}

pub struct Simulation {
    bounds: Bounds,
    local: LocalEntityController,
    remote: Option<RemoteEntityMirror>,
    projectiles: Vec<Projectile>,
    grids: Grids,
    /// Only the host runs the wall placement timer
    is_host: bool,
    wall_timer: f32,
    rng: ChaCha8Rng,
    tick: u64,
}

impl Simulation {
    pub fn new(side: Side, is_host: bool, seed: u64) -> Self {
        Self::with_bounds(Bounds::default(), side, is_host, seed)
    }

    pub fn with_bounds(bounds: Bounds, side: Side, is_host: bool, seed: u64) -> Self {
        Self {
            bounds,
            local: LocalEntityController::new(side, &bounds),
            remote: None,
            projectiles: Vec::new(),
            grids: Grids::new(&bounds),
            is_host,
            wall_timer: 0.0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            tick: 0,
        }
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn local(&self) -> &LocalEntityController {
        &self.local
    }

    pub fn remote(&self) -> Option<&RemoteEntityMirror> {
        self.remote.as_ref()
    }

    /// Network-side write access to the opponent's mirror
    pub fn remote_mut(&mut self) -> Option<&mut RemoteEntityMirror> {
        self.remote.as_mut()
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn grids(&self) -> &Grids {
        &self.grids
    }

    pub fn is_host(&self) -> bool {
        self.is_host
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Create the opponent's mirror at its spawn point if it does not exist yet
    pub fn ensure_remote(&mut self) -> &mut RemoteEntityMirror {
        let side = self.local.side().opposite();
        let bounds = self.bounds;
        self.remote
            .get_or_insert_with(|| RemoteEntityMirror::new(side, &bounds))
    }

    pub fn remove_remote(&mut self) -> Option<RemoteEntityMirror> {
        self.remote.take()
    }

    /// Add a projectile fired by the peer. It flies and collides like a
    /// local one but is never re-published. One spawned outside the arena
    /// or with a non-finite heading is rejected.
    pub fn spawn_remote_projectile(&mut self, projectile: Projectile) -> bool {
        if !projectile.direction.is_finite() || !self.bounds.contains(projectile.x, projectile.y) {
            return false;
        }
        self.projectiles.push(projectile);
        true
    }

    /// Place a wall reported by the peer
    pub fn place_wall(&mut self, placed: &PlacedWall) -> bool {
        self.grids.place(placed)
    }

    pub fn wall_layout(&self) -> GridLayout {
        self.grids.layout()
    }

    /// Place any walls of the layout not already present
    pub fn apply_wall_layout(&mut self, layout: &GridLayout) -> usize {
        self.grids.apply_layout(layout)
    }

    /// Advance one tick: input, players, projectiles, wall timer, hits
    pub fn tick(&mut self, input: &InputSnapshot, dt: f32) -> Vec<SimEvent> {
        let mut events = Vec::new();
        self.tick += 1;

        self.local.handle_input(&input.keys, dt);
        if input.fire {
            if let Some(projectile) = self.local.shoot() {
                events.push(SimEvent::ProjectileFired(projectile.clone()));
                self.projectiles.push(projectile);
            }
        }

        self.local.update(dt, &self.bounds, &self.grids);
        if let Some(remote) = self.remote.as_mut() {
            remote.advance(dt, &self.bounds, &self.grids);
        }

        self.update_projectiles(dt);

        if self.is_host {
            if let Some(placed) = self.update_wall_timer(dt) {
                events.push(SimEvent::WallPlaced(placed));
            }
        }

        events.extend(self.resolve_hits());
        events
    }

    /// Render frame of the current state
    pub fn frame(&self) -> Frame {
        Frame::build(
            self.tick,
            self.local.player(),
            self.remote.as_ref().map(RemoteEntityMirror::player),
            &self.projectiles,
            &self.grids,
        )
    }

    fn update_projectiles(&mut self, dt: f32) {
        let grids = &self.grids;
        let bounds = &self.bounds;
        self.projectiles.retain_mut(|projectile| {
            projectile.update(dt, grids);
            !projectile.remove && !projectile.is_off_screen(bounds)
        });
    }

    fn update_wall_timer(&mut self, dt: f32) -> Option<PlacedWall> {
        self.wall_timer += dt;
        if self.wall_timer < WALL_INTERVAL_SECS {
            return None;
        }
        self.wall_timer = 0.0;
        self.place_random_wall()
    }

    /// Random side, random empty cell, wall sized to a fraction of the cell
    fn place_random_wall(&mut self) -> Option<PlacedWall> {
        let side = if self.rng.gen_bool(0.5) {
            Side::Left
        } else {
            Side::Right
        };
        let grid = self.grids.get_mut(side);

        let empty = grid.empty_cells();
        if empty.is_empty() {
            debug!(side = %side, "No empty cell for wall");
            return None;
        }
        let (row, col) = empty[self.rng.gen_range(0..empty.len())];

        let (cell_width, cell_height) = grid.cell_size();
        let width = cell_width * WALL_FILL;
        let height = cell_height * WALL_FILL;
        if !grid.place(Wall::new(width, height), row, col) {
            return None;
        }

        debug!(side = %side, row, col, "Wall placed");
        Some(PlacedWall {
            side,
            row,
            col,
            width,
            height,
        })
    }

    /// Hits on the local player are committed here and published. Hits on
    /// the mirror only consume the projectile; the peer decides its own
    /// health.
    fn resolve_hits(&mut self) -> Vec<SimEvent> {
        let mut events = Vec::new();
        let local = &mut self.local;
        let remote = self.remote.as_ref();

        self.projectiles.retain(|projectile| {
            if projectile.hits(local.player()) {
                if let Some(outcome) = local.take_damage(PROJECTILE_DAMAGE) {
                    events.push(SimEvent::HealthChanged {
                        health: outcome.health,
                    });
                    if outcome.died {
                        events.push(SimEvent::Died);
                    }
                }
                return false;
            }
            !remote.is_some_and(|mirror| projectile.hits(mirror.player()))
        });

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::input::HeldKeys;
    use crate::game::{MAX_HEALTH, SHOOT_COOLDOWN};
    use std::f32::consts::PI;

    const DT: f32 = 0.016;

    fn fire() -> InputSnapshot {
        InputSnapshot::capture(HeldKeys::default(), true)
    }

    #[test]
    fn firing_publishes_projectile_once_per_cooldown() {
        let mut sim = Simulation::new(Side::Left, false, 1);

        let events = sim.tick(&fire(), DT);
        assert!(matches!(events.as_slice(), [SimEvent::ProjectileFired(p)] if p.color == "red"));
        assert_eq!(sim.projectiles().len(), 1);

        let events = sim.tick(&fire(), DT);
        assert!(events.is_empty());
        assert_eq!(sim.projectiles().len(), 1);

        let ticks = (SHOOT_COOLDOWN / DT).ceil() as usize;
        for _ in 0..ticks {
            sim.tick(&InputSnapshot::idle(), DT);
        }
        assert_eq!(sim.tick(&fire(), DT).len(), 1);
    }

    #[test]
    fn incoming_projectile_damages_local_player() {
        let mut sim = Simulation::new(Side::Left, false, 1);
        sim.ensure_remote();
        sim.spawn_remote_projectile(Projectile::new(120.0, 400.0, PI, "blue".into()));

        let events = sim.tick(&InputSnapshot::idle(), DT);
        assert_eq!(events, vec![SimEvent::HealthChanged { health: 80 }]);
        assert!(sim.projectiles().is_empty());
    }

    #[test]
    fn fifth_hit_publishes_death() {
        let mut sim = Simulation::new(Side::Left, false, 1);

        let mut last = Vec::new();
        for _ in 0..5 {
            sim.spawn_remote_projectile(Projectile::new(120.0, 400.0, PI, "blue".into()));
            last = sim.tick(&InputSnapshot::idle(), DT);
        }
        assert_eq!(
            last,
            vec![SimEvent::HealthChanged { health: 0 }, SimEvent::Died]
        );
        assert!(sim.local().player().is_dead());
    }

    #[test]
    fn hits_on_mirror_only_consume_projectile() {
        let mut sim = Simulation::new(Side::Left, false, 1);
        sim.ensure_remote().apply_position(700.0, 400.0);

        sim.tick(&fire(), DT);
        let mut published = Vec::new();
        for _ in 0..80 {
            published.extend(sim.tick(&InputSnapshot::idle(), DT));
        }

        assert!(sim.projectiles().is_empty());
        assert!(published.is_empty());
        let remote = sim.remote().unwrap().player();
        assert_eq!(remote.health(), MAX_HEALTH);
        assert!(!remote.is_dead());
    }

    #[test]
    fn projectiles_leaving_arena_are_culled() {
        let mut sim = Simulation::new(Side::Right, false, 1);
        sim.spawn_remote_projectile(Projectile::new(1195.0, 100.0, 0.0, "red".into()));
        sim.tick(&InputSnapshot::idle(), DT);
        assert!(sim.projectiles().is_empty());
    }

    #[test]
    fn only_host_places_walls_on_interval() {
        let mut host = Simulation::new(Side::Left, true, 7);
        let mut guest = Simulation::new(Side::Right, false, 7);

        for _ in 0..29 {
            assert!(host.tick(&InputSnapshot::idle(), 0.5).is_empty());
            guest.tick(&InputSnapshot::idle(), 0.5);
        }

        let events = host.tick(&InputSnapshot::idle(), 0.5);
        guest.tick(&InputSnapshot::idle(), 0.5);
        let [SimEvent::WallPlaced(placed)] = events.as_slice() else {
            panic!("expected a wall placement, got {events:?}");
        };
        assert_eq!((placed.width, placed.height), (90.0, 90.0));
        assert_eq!(host.grids().wall_count(), 1);
        assert_eq!(guest.grids().wall_count(), 0);

        assert!(guest.place_wall(placed));
        assert!(!guest.place_wall(placed));
        assert_eq!(guest.wall_layout(), host.wall_layout());
    }

    #[test]
    fn frame_lists_local_player_first() {
        let mut sim = Simulation::new(Side::Right, false, 1);
        sim.ensure_remote();
        sim.tick(&fire(), DT);

        let frame = sim.frame();
        assert_eq!(frame.tick, 1);
        assert_eq!(frame.players.len(), 2);
        assert!(frame.players[0].local);
        assert_eq!(frame.players[0].side, Side::Right);
        assert_eq!(frame.projectiles.len(), 1);
        assert!(frame.walls.is_empty());
    }

    #[test]
    fn remote_projectiles_outside_arena_are_rejected() {
        let mut sim = Simulation::new(Side::Left, false, 1);

        assert!(!sim.spawn_remote_projectile(Projectile::new(-1e30, 400.0, PI, "blue".into())));
        assert!(!sim.spawn_remote_projectile(Projectile::new(600.0, f32::NAN, PI, "blue".into())));
        assert!(!sim.spawn_remote_projectile(Projectile::new(600.0, 400.0, f32::INFINITY, "blue".into())));
        assert!(sim.spawn_remote_projectile(Projectile::new(600.0, 400.0, PI, "blue".into())));

        sim.tick(&InputSnapshot::idle(), DT);
        assert_eq!(sim.projectiles().len(), 1);
    }
}
