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

//! Peer set, handshake, gossip and the server event loop.
//!
//! The router owns the peer set and is the only task that ever mutates it,
//! mirroring `network/src/server/server.rs`'s single accept-and-dispatch
//! loop (generalized here to the five-channel AddPeer/DelPeer/MsgCh/
//! BroadcastCh/Shutdown model) and `examples/original_source/p2p/server.go`'s
//! `loop()`.

mod error;
mod handshake;
mod peer_set;

pub use error::RouterError;
pub use handshake::{perform_handshake, DEFAULT_HANDSHAKE_TIMEOUT};
pub use peer_set::{PeerSet, RouterPeer};

use ggpoker_node_messages::{ActionKind, Broadcast, Disconnect, DisconnectReason, Handshake, Message, PeerList, PlayerAction as WirePlayerAction};
use ggpoker_node_tcp::{dial, frame, listen, spawn_peer, Direction};

use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Whether the table is between hands (accepting new players) or a hand is
/// already underway (late joiners are seated for the next hand).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Waiting,
    InProgress,
}

impl GameStatus {
    fn as_u8(self) -> u8 {
        match self {
            GameStatus::Waiting => 0,
            GameStatus::InProgress => 1,
        }
    }
}

/// Events the router forwards up to the node/engine layer. The router
/// itself never interprets game messages; it only moves bytes and
/// maintains the peer set.
#[derive(Debug, Clone)]
pub enum RouterEvent {
    /// A peer has finished joining the mesh and is ready to be dealt in.
    PeerReady { from: String },
    /// An opaque, encrypted deck payload to relay to the next peer in the
    /// shuffle ring. The router never inspects the bytes.
    EncryptedDeck { from: String, deck: Vec<u8> },
    /// A player action broadcast from its originating node.
    PlayerAction { from: String, kind: ActionKind, amount: u64 },
}

#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub listen_addr: SocketAddr,
    pub version: String,
    pub variant: u8,
    pub dial_timeout: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            listen_addr: ([0, 0, 0, 0], 0).into(),
            version: "1".into(),
            variant: 0,
            dial_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }
}

impl RouterConfig {
    fn handshake(&self, status: GameStatus) -> Handshake {
        Handshake {
            version: self.version.clone(),
            variant: self.variant,
            status: status.as_u8(),
            listen_addr: self.listen_addr.to_string(),
        }
    }
}

/// A cheap, cloneable handle for driving the router from other tasks.
#[derive(Clone)]
pub struct RouterHandle {
    config: RouterConfig,
    dial_tx: mpsc::Sender<SocketAddr>,
    broadcast_tx: mpsc::Sender<Message>,
    shutdown_tx: mpsc::Sender<()>,
    query_tx: mpsc::Sender<tokio::sync::oneshot::Sender<Vec<String>>>,
}

impl RouterHandle {
    pub fn listen_addr(&self) -> SocketAddr {
        self.config.listen_addr
    }

    /// Requests the router dial and admit a peer. Fire-and-forget: errors
    /// are logged by the router loop, not surfaced here.
    pub async fn connect(&self, addr: SocketAddr) {
        let _ = self.dial_tx.send(addr).await;
    }

    pub async fn broadcast(&self, message: Message) {
        let _ = self.broadcast_tx.send(message).await;
    }

    /// The advertised listen addresses of every peer currently admitted to
    /// the mesh, queried from the router's event loop.
    pub async fn connected_peers(&self) -> Vec<String> {
        let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
        if self.query_tx.send(reply_tx).await.is_err() {
            return Vec::new();
        }
        reply_rx.await.unwrap_or_default()
    }

    pub async fn number_of_connected_peers(&self) -> usize {
        self.connected_peers().await.len()
    }

    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

/// Builds the listener, spawns the accept loop and the event loop, and
/// returns a handle plus a channel of [`RouterEvent`]s for the node layer
/// to react to.
pub async fn start(config: RouterConfig) -> Result<(RouterHandle, mpsc::Receiver<RouterEvent>), RouterError> {
    let listener = listen(config.listen_addr).await?;
    let (handle, events_rx, inner) = Router::new(config, listener);
    tokio::spawn(inner.run());
    Ok((handle, events_rx))
}

struct Router {
    config: RouterConfig,
    status: GameStatus,
    peers: PeerSet,
    listener: TcpListener,
    inbound_tx: mpsc::Sender<(SocketAddr, Message)>,
    inbound_rx: mpsc::Receiver<(SocketAddr, Message)>,
    add_peer_rx: mpsc::Receiver<RouterPeer>,
    add_peer_tx: mpsc::Sender<RouterPeer>,
    del_peer_rx: mpsc::Receiver<SocketAddr>,
    del_peer_tx: mpsc::Sender<SocketAddr>,
    dial_rx: mpsc::Receiver<SocketAddr>,
    broadcast_rx: mpsc::Receiver<Message>,
    shutdown_rx: mpsc::Receiver<()>,
    query_rx: mpsc::Receiver<tokio::sync::oneshot::Sender<Vec<String>>>,
    events_tx: mpsc::Sender<RouterEvent>,
}

impl Router {
    fn new(config: RouterConfig, listener: TcpListener) -> (RouterHandle, mpsc::Receiver<RouterEvent>, Self) {
        let (inbound_tx, inbound_rx) = mpsc::channel(256);
        let (add_peer_tx, add_peer_rx) = mpsc::channel(64);
        let (del_peer_tx, del_peer_rx) = mpsc::channel(64);
        let (dial_tx, dial_rx) = mpsc::channel(64);
        let (broadcast_tx, broadcast_rx) = mpsc::channel(256);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let (query_tx, query_rx) = mpsc::channel(16);
        let (events_tx, events_rx) = mpsc::channel(256);

        let handle = RouterHandle { config: config.clone(), dial_tx, broadcast_tx, shutdown_tx, query_tx };
        let router = Router {
            config,
            status: GameStatus::Waiting,
            peers: PeerSet::default(),
            listener,
            inbound_tx,
            inbound_rx,
            add_peer_rx,
            add_peer_tx,
            del_peer_rx,
            del_peer_tx,
            dial_rx,
            broadcast_rx,
            shutdown_rx,
            query_rx,
            events_tx,
        };
        (handle, events_rx, router)
    }

    async fn run(mut self) {
        info!(addr = %self.config.listen_addr, variant = self.config.variant, "router running");
        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    if let Ok((stream, remote_addr)) = accepted {
                        self.spawn_inbound_handshake(stream, remote_addr);
                    }
                }
                Some(addr) = self.dial_rx.recv() => {
                    self.spawn_outbound_handshake(addr);
                }
                Some(peer) = self.add_peer_rx.recv() => {
                    self.admit(peer).await;
                }
                Some(remote_addr) = self.del_peer_rx.recv() => {
                    if let Some(peer) = self.peers.remove_by_remote_addr(remote_addr) {
                        info!(peer = %peer.listen_addr, "peer disconnected");
                    }
                }
                Some((remote_addr, message)) = self.inbound_rx.recv() => {
                    self.dispatch(remote_addr, message).await;
                }
                Some(message) = self.broadcast_rx.recv() => {
                    self.send_broadcast(message);
                }
                Some(reply) = self.query_rx.recv() => {
                    let _ = reply.send(self.peers.listen_addrs().map(str::to_string).collect());
                }
                Some(()) = self.shutdown_rx.recv() => {
                    info!("router shutting down");
                    break;
                }
            }
        }
    }

    /// Delivers a locally originated message to the mesh. A
    /// `Message::Broadcast{to,..}` envelope is selective delivery (spec's
    /// `BroadcastCh({recipients, payload})`): it is sent directly to each
    /// named recipient this router is connected to, never flooded, so a
    /// single-hop relay (e.g. the `EncryptedDeck` ring) reaches its addressee
    /// exactly once instead of arriving as third-party duplicates. Any other
    /// message is a genuine mesh-wide broadcast and fans out to every peer.
    fn send_broadcast(&self, message: Message) {
        if let Message::Broadcast(Broadcast { to, payload }) = &message {
            let Ok(inner) = Message::deserialize(bytes::BytesMut::from(&payload[..])) else {
                return;
            };
            for addr in to {
                if let Some(peer) = self.peers.get(addr) {
                    let _ = peer.handle.send(inner.clone());
                }
            }
            return;
        }
        for peer in self.peers.values() {
            let _ = peer.handle.send(message.clone());
        }
    }

    fn spawn_inbound_handshake(&self, stream: tokio::net::TcpStream, remote_addr: SocketAddr) {
        let ours = self.config.handshake(self.status);
        let timeout = self.config.dial_timeout;
        let add_peer_tx = self.add_peer_tx.clone();
        let inbound_tx = self.inbound_tx.clone();
        let del_peer_tx = self.del_peer_tx.clone();
        tokio::spawn(async move {
            match handshake::perform_handshake(frame(stream), Direction::Inbound, &ours, timeout).await {
                Ok((framed, theirs)) => {
                    let handle = spawn_peer(framed, remote_addr, Direction::Inbound, inbound_tx, del_peer_tx);
                    let _ = add_peer_tx.send(RouterPeer { listen_addr: theirs.listen_addr, handle }).await;
                }
                Err(error) => warn!(%remote_addr, %error, "inbound handshake failed"),
            }
        });
    }

    fn spawn_outbound_handshake(&self, addr: SocketAddr) {
        if addr == self.config.listen_addr {
            return;
        }
        let ours = self.config.handshake(self.status);
        let timeout = self.config.dial_timeout;
        let add_peer_tx = self.add_peer_tx.clone();
        let inbound_tx = self.inbound_tx.clone();
        let del_peer_tx = self.del_peer_tx.clone();
        tokio::spawn(async move {
            let stream = match dial(addr, timeout).await {
                Ok(stream) => stream,
                Err(error) => {
                    warn!(%addr, %error, "failed to dial peer");
                    return;
                }
            };
            match handshake::perform_handshake(frame(stream), Direction::Outbound, &ours, timeout).await {
                Ok((framed, theirs)) => {
                    let handle = spawn_peer(framed, addr, Direction::Outbound, inbound_tx, del_peer_tx);
                    let _ = add_peer_tx.send(RouterPeer { listen_addr: theirs.listen_addr, handle }).await;
                }
                Err(error) => warn!(%addr, %error, "outbound handshake failed"),
            }
        });
    }

    async fn admit(&mut self, peer: RouterPeer) {
        if peer.listen_addr == self.config.listen_addr.to_string() {
            debug!(peer = %peer.listen_addr, "rejecting self-connection");
            return;
        }

        if let Some(existing) = self.peers.get(&peer.listen_addr) {
            // Duplicate-connection tie-break: the node with the
            // lexicographically smaller listen address keeps the
            // connection it dialed outbound; the other keeps the one it
            // accepted inbound. Both sides apply the same rule
            // independently and converge on the same single connection.
            let we_are_smaller = self.config.listen_addr.to_string() < peer.listen_addr;
            let keep_new = if we_are_smaller { peer.handle.direction == Direction::Outbound } else { peer.handle.direction == Direction::Inbound };
            if !keep_new {
                debug!(peer = %peer.listen_addr, "dropping duplicate connection");
                let _ = peer.handle.send(Message::Disconnect(Disconnect::from(DisconnectReason::DuplicateConnection)));
                return;
            }
            debug!(peer = %existing.handle.remote_addr, "replacing duplicate connection");
        }

        info!(peer = %peer.listen_addr, "peer admitted");
        let known: Vec<String> = self.peers.listen_addrs().map(str::to_string).collect();
        let _ = peer.handle.send(Message::PeerList(PeerList { addrs: known }));
        self.peers.insert(peer);
    }

    async fn dispatch(&mut self, remote_addr: SocketAddr, message: Message) {
        let from = self.peers.listen_addr_of(remote_addr).map(str::to_string);
        match message {
            Message::Handshake(_) => {
                warn!(%remote_addr, "received a handshake after the connection was already admitted");
            }
            Message::PeerList(list) => {
                for addr in list.addrs {
                    if addr == self.config.listen_addr.to_string() || self.peers.contains(&addr) {
                        continue;
                    }
                    if let Ok(parsed) = addr.parse::<SocketAddr>() {
                        self.spawn_outbound_handshake(parsed);
                    }
                }
            }
            Message::Ready(_) => {
                if let Some(from) = from {
                    let _ = self.events_tx.send(RouterEvent::PeerReady { from }).await;
                }
            }
            Message::EncryptedDeck(msg) => {
                if let Some(from) = from {
                    let _ = self.events_tx.send(RouterEvent::EncryptedDeck { from, deck: msg.deck }).await;
                }
            }
            Message::PlayerAction(WirePlayerAction { from: claimed, kind, amount }) => {
                match from {
                    Some(actual) if actual == claimed => {
                        let _ = self.events_tx.send(RouterEvent::PlayerAction { from: actual, kind, amount }).await;
                    }
                    Some(actual) => {
                        warn!(%actual, %claimed, "player action address mismatch, ejecting peer");
                        if let Some(peer) = self.peers.remove_by_listen_addr(&actual) {
                            let _ = peer.handle.send(Message::Disconnect(Disconnect::from(DisconnectReason::ProtocolViolation)));
                        }
                    }
                    None => warn!(%remote_addr, "player action from an unadmitted connection"),
                }
            }
            Message::Broadcast(msg) => {
                for addr in &msg.to {
                    if let Some(peer) = self.peers.get(addr) {
                        if let Ok(inner) = Message::deserialize(bytes::BytesMut::from(&msg.payload[..])) {
                            let _ = peer.handle.send(inner);
                        }
                    }
                }
            }
            Message::Disconnect(msg) => {
                debug!(%remote_addr, reason = ?msg.reason, "peer announced disconnect");
            }
            Message::Unknown { id } => {
                debug!(%remote_addr, id, "dropping message with an unrecognized id");
            }
        }
    }
}
