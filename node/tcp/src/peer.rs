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

use crate::error::TransportError;
use ggpoker_node_messages::{Message, MessageCodec};

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use tracing::{debug, trace};

/// Wraps a freshly connected or accepted socket in the mesh's codec. Kept
/// separate from [`spawn_peer`] so a handshake can be performed over the
/// same framed connection before the read/write task takes ownership of it.
pub fn frame(stream: TcpStream) -> Framed<TcpStream, MessageCodec> {
    Framed::new(stream, MessageCodec::default())
}

/// Whether a connection was accepted from a listener or initiated by us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Inbound,
    Outbound,
}

/// A handle to a running peer connection. Dropping it does not close the
/// connection; call [`PeerHandle::send`] or let the read loop observe the
/// remote side closing first.
#[derive(Clone)]
pub struct PeerHandle {
    pub remote_addr: SocketAddr,
    pub direction: Direction,
    outbound: mpsc::UnboundedSender<Message>,
}

impl PeerHandle {
    pub fn send(&self, message: Message) -> Result<(), TransportError> {
        self.outbound.send(message).map_err(|_| TransportError::PeerGone)
    }
}

/// Wraps `stream` in the mesh's length-delimited [`MessageCodec`], spawns a
/// task that owns the socket, and returns a cloneable handle for sending to
/// it. Inbound messages are forwarded to `inbound_tx` as
/// `(remote_addr, message)`; when the connection ends for any reason,
/// `remote_addr` is sent once on `closed_tx`.
///
/// This mirrors the teacher's split reader/writer-task-plus-channel shape
/// (`network/src/peers/peer/peer.rs::run`, `network/src/server/server.rs::
/// spawn_connection_thread`), generalized away from that crate's encrypted
/// transport.
pub fn spawn_peer(
    framed: Framed<TcpStream, MessageCodec>,
    remote_addr: SocketAddr,
    direction: Direction,
    inbound_tx: mpsc::Sender<(SocketAddr, Message)>,
    closed_tx: mpsc::Sender<SocketAddr>,
) -> PeerHandle {
    let (mut sink, mut stream) = framed.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                outgoing = outbound_rx.recv() => {
                    match outgoing {
                        Some(message) => {
                            trace!(%remote_addr, message = message.name(), "sending");
                            if sink.send(message).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                incoming = stream.next() => {
                    match incoming {
                        Some(Ok(message)) => {
                            trace!(%remote_addr, message = message.name(), "received");
                            if inbound_tx.send((remote_addr, message)).await.is_err() {
                                break;
                            }
                        }
                        Some(Err(error)) => {
                            debug!(%remote_addr, %error, "connection error, closing");
                            break;
                        }
                        None => {
                            debug!(%remote_addr, "peer closed the connection");
                            break;
                        }
                    }
                }
            }
        }
        let _ = closed_tx.send(remote_addr).await;
    });

    PeerHandle { remote_addr, direction, outbound: outbound_tx }
}
