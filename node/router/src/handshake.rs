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

use crate::error::RouterError;
use ggpoker_node_messages::{Handshake, Message, MessageCodec};
use ggpoker_node_tcp::Direction;

use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::trace;

pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Exchanges [`Handshake`] messages over an already-framed connection and
/// validates them. The outbound side speaks first, mirroring the
/// initiator/responder asymmetry of `network/src/peers/peer/handshake.rs`
/// (minus its Noise key exchange, which is out of scope here).
pub async fn perform_handshake(
    mut framed: Framed<TcpStream, MessageCodec>,
    direction: Direction,
    ours: &Handshake,
    timeout: Duration,
) -> Result<(Framed<TcpStream, MessageCodec>, Handshake), RouterError> {
    let remote_addr = framed.get_ref().peer_addr().map(|a| a.to_string()).unwrap_or_default();

    let fut = async {
        match direction {
            Direction::Outbound => {
                framed
                    .send(Message::Handshake(ours.clone()))
                    .await
                    .map_err(|e| RouterError::Transport(e.into()))?;
                read_handshake(&mut framed).await
            }
            Direction::Inbound => {
                let theirs = read_handshake(&mut framed).await?;
                framed
                    .send(Message::Handshake(ours.clone()))
                    .await
                    .map_err(|e| RouterError::Transport(e.into()))?;
                Ok(theirs)
            }
        }
    };

    let theirs = tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| RouterError::HandshakeTimeout { addr: remote_addr.clone() })??;

    if theirs.version != ours.version || theirs.variant != ours.variant {
        return Err(RouterError::HandshakeMismatch {
            addr: remote_addr,
            ours_version: ours.version.clone(),
            ours_variant: ours.variant,
            theirs_version: theirs.version,
            theirs_variant: theirs.variant,
        });
    }
    if theirs.listen_addr == ours.listen_addr {
        return Err(RouterError::SelfConnectAttempt(theirs.listen_addr));
    }

    trace!(peer = %theirs.listen_addr, "handshake complete");
    Ok((framed, theirs))
}

async fn read_handshake(framed: &mut Framed<TcpStream, MessageCodec>) -> Result<Handshake, RouterError> {
    let remote_addr = framed.get_ref().peer_addr().map(|a| a.to_string()).unwrap_or_default();
    match framed.next().await {
        Some(Ok(Message::Handshake(handshake))) => Ok(handshake),
        Some(Ok(_other)) => Err(RouterError::ProtocolViolation(remote_addr, "expected a handshake first".into())),
        Some(Err(e)) => Err(RouterError::Transport(e.into())),
        None => Err(RouterError::ClosedDuringHandshake(remote_addr)),
    }
}
