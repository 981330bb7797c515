//! Client tick loop
//!
//! One task owns the relay connection, the reconciler and the simulation.
//! A `tokio::select!` loop interleaves inbound messages with fixed-rate
//! ticks, so no tick ever observes a half-applied message. The presentation
//! layer talks to the loop through a `SessionHandle`.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::game::{Frame, HeldKeys, InputSnapshot};
use crate::sync::{SyncHandler, SyncNotice};
use crate::util::time::{tick_duration, DeltaClock};
use crate::ws::protocol::{ClientMsg, RoomId};

use super::connection::{connect, RelayReceiver, RelaySender};
use super::ClientError;

const COMMAND_BUFFER: usize = 16;
const NOTICE_BUFFER: usize = 32;
const FIRE_BUFFER: usize = 8;

/// Presentation-side controls for a running session
pub struct SessionHandle {
    keys_tx: watch::Sender<HeldKeys>,
    fire_tx: mpsc::Sender<()>,
    command_tx: mpsc::Sender<ClientMsg>,
    frame_rx: watch::Receiver<Frame>,
    notice_rx: mpsc::Receiver<SyncNotice>,
}

impl SessionHandle {
    /// Replace the held-key set read at the start of every tick
    pub fn set_keys(&self, keys: HeldKeys) {
        self.keys_tx.send_replace(keys);
    }

    /// Fire edge, consumed by the next tick
    pub fn fire(&self) {
        let _ = self.fire_tx.try_send(());
    }

    pub async fn create_room(&self) -> Result<(), ClientError> {
        self.command(ClientMsg::CreateRoom).await
    }

    pub async fn join_room(&self, room_id: RoomId) -> Result<(), ClientError> {
        self.command(ClientMsg::JoinRoom { room_id }).await
    }

    /// Latest render frame; a fresh one is published after every tick
    pub fn frames(&self) -> watch::Receiver<Frame> {
        self.frame_rx.clone()
    }

    pub async fn next_notice(&mut self) -> Option<SyncNotice> {
        self.notice_rx.recv().await
    }

    async fn command(&self, msg: ClientMsg) -> Result<(), ClientError> {
        self.command_tx
            .send(msg)
            .await
            .map_err(|_| ClientError::Closed)
    }
}

pub struct ClientSession {
    config: ClientConfig,
    sync: SyncHandler,
    sender: RelaySender,
    receiver: RelayReceiver,
    keys_rx: watch::Receiver<HeldKeys>,
    fire_rx: mpsc::Receiver<()>,
    command_rx: mpsc::Receiver<ClientMsg>,
    frame_tx: watch::Sender<Frame>,
    notice_tx: mpsc::Sender<SyncNotice>,
}

impl ClientSession {
    /// Connect to the configured relay
    pub async fn connect(config: ClientConfig) -> Result<(Self, SessionHandle), ClientError> {
        let (sender, receiver) = connect(&config.server_url).await?;
        Ok(Self::new(config, sender, receiver, rand::random()))
    }

    pub fn new(
        config: ClientConfig,
        sender: RelaySender,
        receiver: RelayReceiver,
        seed: u64,
    ) -> (Self, SessionHandle) {
        let (keys_tx, keys_rx) = watch::channel(HeldKeys::default());
        let (fire_tx, fire_rx) = mpsc::channel(FIRE_BUFFER);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (frame_tx, frame_rx) = watch::channel(Frame::default());
        let (notice_tx, notice_rx) = mpsc::channel(NOTICE_BUFFER);

        let session = Self {
            config,
            sync: SyncHandler::new(seed),
            sender,
            receiver,
            keys_rx,
            fire_rx,
            command_rx,
            frame_tx,
            notice_tx,
        };
        let handle = SessionHandle {
            keys_tx,
            fire_tx,
            command_tx,
            frame_rx,
            notice_rx,
        };
        (session, handle)
    }

    /// Run until the handle is dropped (`Ok`) or the relay goes away
    pub async fn run(mut self) -> Result<(), ClientError> {
        let mut tick_interval = interval(tick_duration(self.config.tick_rate));
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut position_interval = interval(tick_duration(self.config.position_rate));
        position_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut resync_interval = interval(Duration::from_secs(self.config.resync_secs));
        resync_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut clock = DeltaClock::new();

        loop {
            tokio::select! {
                inbound = self.receiver.recv() => {
                    let Some(msg) = inbound? else {
                        info!("Relay closed the session");
                        return Err(ClientError::Closed);
                    };
                    if let Some(notice) = self.sync.handle_server_msg(msg) {
                        if self.notice_tx.try_send(notice).is_err() {
                            warn!("Notice queue full, dropping notice");
                        }
                    }
                }

                command = self.command_rx.recv() => {
                    let Some(msg) = command else {
                        debug!("Session handle dropped");
                        let _ = self.sender.close().await;
                        return Ok(());
                    };
                    self.sender.send(&msg).await?;
                }

                _ = tick_interval.tick() => {
                    let input = self.capture_input();
                    let dt = clock.delta();
                    for msg in self.sync.tick(&input, dt) {
                        self.sender.send(&msg).await?;
                    }
                    if let Some(sim) = self.sync.simulation() {
                        self.frame_tx.send_replace(sim.frame());
                    }
                }

                _ = position_interval.tick() => {
                    if let Some(msg) = self.sync.position_update() {
                        self.sender.send(&msg).await?;
                    }
                }

                _ = resync_interval.tick() => {
                    if let Some(msg) = self.sync.state_sync() {
                        self.sender.send(&msg).await?;
                    }
                }
            }
        }
    }

    /// Held keys plus any fire presses since the last tick
    fn capture_input(&mut self) -> InputSnapshot {
        let mut fire = false;
        while self.fire_rx.try_recv().is_ok() {
            fire = true;
        }
        let keys = *self.keys_rx.borrow();
        InputSnapshot::capture(keys, fire)
    }
}
