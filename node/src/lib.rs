// Copyright (C) ggpoker contributors.
// This file is part of the ggpoker library.

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at:

// http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Wires the transport, router and engine crates into one running node and
//! exposes the action-ingress port a future front-end drives.

mod error;

pub use error::NodeError;

use ggpoker_engine::{EngineError, GameEngine, PlayerAction as EnginePlayerAction, Round};
use ggpoker_node_messages::{ActionKind, EncryptedDeck, Message, PlayerAction as WirePlayerAction, Ready};
use ggpoker_node_router::{start as start_router, RouterConfig, RouterEvent, RouterHandle};

use async_trait::async_trait;
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub listen_addr: SocketAddr,
    pub connect: Vec<SocketAddr>,
    pub version: String,
    pub variant: u8,
    pub small_blind: u64,
    pub big_blind: u64,
    pub buy_in: u64,
    pub dial_timeout: std::time::Duration,
}

/// The external interface a front-end (CLI, bot, UI) drives a seated local
/// player through. Implemented by [`Node`].
#[async_trait]
pub trait ActionIngress {
    /// Marks the local player ready to be dealt in and announces this to
    /// the mesh.
    async fn set_ready(&self) -> Result<(), NodeError>;

    /// Submits a betting action for the local player and broadcasts it to
    /// the mesh.
    async fn take_action(&self, kind: ActionKind, amount: u64) -> Result<(), NodeError>;
}

fn to_engine_action(kind: ActionKind, amount: u64) -> EnginePlayerAction {
    match kind {
        ActionKind::Fold => EnginePlayerAction::Fold,
        ActionKind::Check => EnginePlayerAction::Check,
        ActionKind::Call => EnginePlayerAction::Call,
        ActionKind::Bet => EnginePlayerAction::Bet(amount),
        ActionKind::Raise => EnginePlayerAction::Raise(amount),
    }
}

fn serialize_message(message: &Message) -> Vec<u8> {
    let mut buf = Vec::new();
    message.serialize(&mut buf).expect("serializing into a Vec<u8> cannot fail");
    buf
}

/// A running poker node: owns the local engine state and forwards mesh
/// events into it.
pub struct Node {
    local_addr: String,
    buy_in: u64,
    router: RouterHandle,
    engine: Mutex<GameEngine>,
}

impl Node {
    pub async fn start(config: NodeConfig) -> Result<Arc<Self>, NodeError> {
        let router_config = RouterConfig {
            listen_addr: config.listen_addr,
            version: config.version.clone(),
            variant: config.variant,
            dial_timeout: config.dial_timeout,
        };
        let (router, events) = start_router(router_config).await?;

        let node = Arc::new(Self {
            local_addr: config.listen_addr.to_string(),
            buy_in: config.buy_in,
            router,
            engine: Mutex::new(GameEngine::new(config.small_blind, config.big_blind)),
        });

        tokio::spawn(node.clone().drive_events(events));

        for addr in config.connect {
            node.router.connect(addr).await;
        }

        Ok(node)
    }

    pub fn router(&self) -> &RouterHandle {
        &self.router
    }

    /// Snapshots the current engine state for a front-end to render; locks
    /// the engine only for the duration of the clone.
    pub fn players(&self) -> Vec<ggpoker_engine::PlayerState> {
        self.engine.lock().players().to_vec()
    }

    async fn drive_events(self: Arc<Self>, mut events: tokio::sync::mpsc::Receiver<RouterEvent>) {
        while let Some(event) = events.recv().await {
            match event {
                RouterEvent::PeerReady { from } => self.handle_peer_ready(from),
                RouterEvent::PlayerAction { from, kind, amount } => self.handle_player_action(from, kind, amount),
                RouterEvent::EncryptedDeck { from, deck } => self.handle_encrypted_deck(from, deck).await,
            }
        }
    }

    fn handle_peer_ready(&self, from: String) {
        let mut engine = self.engine.lock();
        match engine.add_player(from.clone(), self.buy_in) {
            Ok(()) => info!(peer = %from, "seated"),
            Err(EngineError::IllegalAction { reason, .. }) if reason == "already seated" => {
                debug!(peer = %from, "ready received for an already-seated player");
            }
            Err(error) => warn!(peer = %from, %error, "failed to seat player"),
        }
        self.maybe_start_hand(&mut engine);
    }

    fn handle_player_action(&self, from: String, kind: ActionKind, amount: u64) {
        let mut engine = self.engine.lock();
        match engine.player_action(&from, to_engine_action(kind, amount)) {
            Ok(Some(result)) => {
                info!(hand = result.hand_number, winners = ?result.winners, "hand complete");
                self.maybe_start_hand(&mut engine);
            }
            Ok(None) => {}
            Err(error) => warn!(peer = %from, %error, "rejected player action"),
        }
    }

    fn maybe_start_hand(&self, engine: &mut GameEngine) {
        if matches!(engine.round(), Round::Dealing | Round::Showdown) && engine.players().len() >= 2 {
            if let Err(error) = engine.start_new_hand(&mut rand::thread_rng()) {
                warn!(%error, "failed to start a new hand");
            }
        }
    }

    /// Relays an opaque encrypted-deck payload to the next seat in the ring,
    /// stopping once it would be handed back to us (the cycle is complete).
    /// The engine never inspects or decrypts the payload; mental-poker
    /// cryptography is out of scope.
    async fn handle_encrypted_deck(&self, from: String, deck: Vec<u8>) {
        let next_addr = {
            let engine = self.engine.lock();
            let players = engine.players();
            let Some(idx) = players.iter().position(|p| p.addr == from) else {
                warn!(peer = %from, "encrypted deck from an unseated player");
                return;
            };
            if players.is_empty() {
                return;
            }
            players[(idx + 1) % players.len()].addr.clone()
        };

        if next_addr == self.local_addr {
            debug!("encrypted deck shuffle cycle complete");
            return;
        }

        let payload = serialize_message(&Message::EncryptedDeck(EncryptedDeck { deck }));
        self.router.broadcast(Message::Broadcast(ggpoker_node_messages::Broadcast { to: vec![next_addr], payload })).await;
    }
}

#[async_trait]
impl ActionIngress for Node {
    async fn set_ready(&self) -> Result<(), NodeError> {
        self.handle_peer_ready(self.local_addr.clone());
        self.router.broadcast(Message::Ready(Ready)).await;
        Ok(())
    }

    async fn take_action(&self, kind: ActionKind, amount: u64) -> Result<(), NodeError> {
        self.handle_player_action(self.local_addr.clone(), kind, amount);
        self.router.broadcast(Message::PlayerAction(WirePlayerAction { from: self.local_addr.clone(), kind, amount })).await;
        Ok(())
    }
}
