//! Two reconcilers wired through an in-process room store

use tokio::sync::mpsc;
use uuid::Uuid;

use duel_arena::game::{HeldKeys, InputSnapshot, Side, MAX_HEALTH, PROJECTILE_DAMAGE};
use duel_arena::rooms::{ConnectionHandle, RoomStore};
use duel_arena::sync::{SyncHandler, SyncNotice};
use duel_arena::ws::protocol::{ClientMsg, ServerMsg};

const DT: f32 = 1.0 / 60.0;

struct Peer {
    handler: SyncHandler,
    connection: ConnectionHandle,
    rx: mpsc::Receiver<ServerMsg>,
    notices: Vec<SyncNotice>,
}

impl Peer {
    fn new(seed: u64) -> Self {
        let (tx, rx) = mpsc::channel(256);
        Self {
            handler: SyncHandler::new(seed),
            connection: ConnectionHandle::new(Uuid::new_v4(), tx),
            rx,
            notices: Vec::new(),
        }
    }

    fn pump(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            if let Some(notice) = self.handler.handle_server_msg(msg) {
                self.notices.push(notice);
            }
        }
    }

    fn health(&self) -> i32 {
        self.handler.simulation().unwrap().local().player().health()
    }

    fn is_dead(&self) -> bool {
        self.handler.simulation().unwrap().local().player().is_dead()
    }

    fn mirror_health(&self) -> i32 {
        self.handler
            .simulation()
            .unwrap()
            .remote()
            .unwrap()
            .player()
            .health()
    }

    fn mirror_dead(&self) -> bool {
        self.handler
            .simulation()
            .unwrap()
            .remote()
            .unwrap()
            .player()
            .is_dead()
    }
}

struct Arena {
    store: RoomStore,
    host: Peer,
    guest: Peer,
}

impl Arena {
    fn start() -> Self {
        let store = RoomStore::new();
        let mut host = Peer::new(11);
        let mut guest = Peer::new(22);
        store.register(host.connection.clone());
        store.register(guest.connection.clone());

        let room_id = store.create_room(&host.connection);
        store.join_room(&room_id, &guest.connection).unwrap();
        host.pump();
        guest.pump();

        assert!(host.handler.is_host());
        assert_eq!(guest.handler.side(), Some(Side::Right));
        assert_eq!(host.notices.last(), Some(&SyncNotice::GameStarted));
        assert_eq!(guest.notices.last(), Some(&SyncNotice::GameStarted));

        Self { store, host, guest }
    }

    fn relay_from(&self, peer: &Peer, msgs: Vec<ClientMsg>) {
        let sender = peer.connection.id();
        for msg in msgs {
            self.store.relay(sender, msg);
        }
    }

    /// One tick on both sides, then deliver everything in flight
    fn step(&mut self, host_input: InputSnapshot, guest_input: InputSnapshot) {
        let host_out = self.host.handler.tick(&host_input, DT);
        let guest_out = self.guest.handler.tick(&guest_input, DT);
        self.relay_from(&self.host, host_out);
        self.relay_from(&self.guest, guest_out);
        self.host.pump();
        self.guest.pump();
    }

    fn idle(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.step(InputSnapshot::idle(), InputSnapshot::idle());
        }
    }
}

fn firing() -> InputSnapshot {
    InputSnapshot::capture(HeldKeys::default(), true)
}

#[test]
fn hit_is_committed_by_the_target_and_mirrored_by_the_shooter() {
    let mut arena = Arena::start();

    arena.step(InputSnapshot::idle(), firing());
    assert_eq!(arena.guest.handler.simulation().unwrap().projectiles().len(), 1);
    assert_eq!(arena.host.handler.simulation().unwrap().projectiles().len(), 1);

    // Across the field is under two seconds of flight
    arena.idle(150);

    assert_eq!(arena.host.health(), MAX_HEALTH - PROJECTILE_DAMAGE);
    assert_eq!(arena.guest.mirror_health(), MAX_HEALTH - PROJECTILE_DAMAGE);
    assert!(arena.host.handler.simulation().unwrap().projectiles().is_empty());
    assert!(arena.guest.handler.simulation().unwrap().projectiles().is_empty());
    assert_eq!(arena.guest.health(), MAX_HEALTH);
}

#[test]
fn fifth_hit_kills_and_both_sides_respawn() {
    let mut arena = Arena::start();

    for i in 0..100 {
        let guest_input = if i % 20 == 0 {
            firing()
        } else {
            InputSnapshot::idle()
        };
        arena.step(InputSnapshot::idle(), guest_input);
    }
    arena.idle(160);

    assert!(arena.host.is_dead());
    assert_eq!(arena.host.health(), 0);
    assert!(arena.guest.mirror_dead());

    // Respawn takes three seconds on each side's own clock
    arena.idle(200);
    assert!(!arena.host.is_dead());
    assert_eq!(arena.host.health(), MAX_HEALTH);
    assert!(!arena.guest.mirror_dead());
    assert_eq!(arena.guest.mirror_health(), MAX_HEALTH);
}

#[test]
fn host_walls_reach_the_guest() {
    let mut arena = Arena::start();
    arena.idle(1000);

    let host_layout = arena.host.handler.simulation().unwrap().wall_layout();
    let guest_layout = arena.guest.handler.simulation().unwrap().wall_layout();
    assert_eq!(host_layout.walls.len(), 1);
    assert_eq!(host_layout, guest_layout);
}

#[test]
fn resync_restores_a_lost_wall() {
    let mut arena = Arena::start();

    // Run the host alone so its wall message never leaves
    for _ in 0..1000 {
        arena.host.handler.tick(&InputSnapshot::idle(), DT);
    }
    assert_eq!(arena.host.handler.simulation().unwrap().grids().wall_count(), 1);
    assert_eq!(arena.guest.handler.simulation().unwrap().grids().wall_count(), 0);

    let sync = arena.host.handler.state_sync().unwrap();
    arena.relay_from(&arena.host, vec![sync]);
    arena.guest.pump();

    assert_eq!(
        arena.guest.handler.simulation().unwrap().wall_layout(),
        arena.host.handler.simulation().unwrap().wall_layout()
    );
}

#[test]
fn position_updates_move_the_mirror() {
    let mut arena = Arena::start();
    let down = InputSnapshot::capture(
        HeldKeys {
            down: true,
            ..HeldKeys::default()
        },
        false,
    );
    for _ in 0..30 {
        arena.step(down, InputSnapshot::idle());
    }

    let update = arena.host.handler.position_update().unwrap();
    arena.relay_from(&arena.host, vec![update]);
    arena.guest.pump();

    let host_position = arena.host.handler.simulation().unwrap().local().player().position();
    let mirrored = arena
        .guest
        .handler
        .simulation()
        .unwrap()
        .remote()
        .unwrap()
        .player()
        .position();
    assert_eq!(mirrored, host_position);
}

#[test]
fn departure_clears_the_opponent() {
    let mut arena = Arena::start();
    arena.store.disconnect(arena.guest.connection.id());
    arena.host.pump();

    assert!(matches!(
        arena.host.notices.last(),
        Some(SyncNotice::PeerDisconnected { .. })
    ));
    assert!(arena.host.handler.simulation().unwrap().remote().is_none());
    assert_eq!(arena.store.len(), 1);
}
