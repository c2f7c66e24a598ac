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

//! The wire message set exchanged between mesh peers, and the codec that
//! frames them.

mod broadcast;
mod disconnect;
mod encrypted_deck;
mod handshake;
pub mod helpers;
mod peer_list;
mod player_action;
mod ready;

pub use broadcast::Broadcast;
pub use disconnect::{Disconnect, DisconnectReason};
pub use encrypted_deck::EncryptedDeck;
pub use handshake::Handshake;
pub use helpers::codec::MessageCodec;
pub use peer_list::PeerList;
pub use player_action::{ActionKind, PlayerAction};
pub use ready::Ready;

use bytes::{Buf, BytesMut};
use std::io::{self, Write};

/// Implemented by every wire message variant's payload type.
pub trait MessageTrait: Sized {
    /// A short human-readable name, used for logging.
    fn name(&self) -> &'static str;

    /// Serializes the payload (without the leading message id) into `writer`.
    fn serialize<W: Write>(&self, writer: W) -> io::Result<()>;

    /// Deserializes the payload (without the leading message id) from `bytes`.
    fn deserialize(bytes: BytesMut) -> io::Result<Self>;
}

/// The tagged union of every message this protocol knows how to send.
///
/// `Unknown` is not itself sent over the wire: it is produced by
/// `deserialize` when a peer sends a message id this build doesn't
/// recognize, so that a newer peer's novel message types don't tear down
/// the connection of an older one.
#[derive(Debug, Clone)]
pub enum Message {
    Handshake(Handshake),
    PeerList(PeerList),
    Ready(Ready),
    EncryptedDeck(EncryptedDeck),
    PlayerAction(PlayerAction),
    Broadcast(Broadcast),
    Disconnect(Disconnect),
    Unknown { id: u16 },
}

impl Message {
    fn id(&self) -> u16 {
        match self {
            Message::Handshake(..) => 0,
            Message::PeerList(..) => 1,
            Message::Ready(..) => 2,
            Message::EncryptedDeck(..) => 3,
            Message::PlayerAction(..) => 4,
            Message::Broadcast(..) => 5,
            Message::Disconnect(..) => 6,
            Message::Unknown { id } => *id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Message::Handshake(msg) => msg.name(),
            Message::PeerList(msg) => msg.name(),
            Message::Ready(msg) => msg.name(),
            Message::EncryptedDeck(msg) => msg.name(),
            Message::PlayerAction(msg) => msg.name(),
            Message::Broadcast(msg) => msg.name(),
            Message::Disconnect(msg) => msg.name(),
            Message::Unknown { .. } => "unknown",
        }
    }

    pub fn serialize<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(&self.id().to_le_bytes())?;
        match self {
            Message::Handshake(msg) => msg.serialize(writer),
            Message::PeerList(msg) => msg.serialize(writer),
            Message::Ready(msg) => msg.serialize(writer),
            Message::EncryptedDeck(msg) => msg.serialize(writer),
            Message::PlayerAction(msg) => msg.serialize(writer),
            Message::Broadcast(msg) => msg.serialize(writer),
            Message::Disconnect(msg) => msg.serialize(writer),
            Message::Unknown { .. } => Ok(()),
        }
    }

    /// Deserializes a full framed message. Unknown message ids are not an
    /// error: they deserialize to `Message::Unknown` so the caller can log
    /// and drop them without tearing down the connection.
    pub fn deserialize(mut bytes: BytesMut) -> io::Result<Self> {
        if bytes.remaining() < 2 {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "message too short to contain an id"));
        }
        let id = bytes.get_u16_le();
        Ok(match id {
            0 => Message::Handshake(Handshake::deserialize(bytes)?),
            1 => Message::PeerList(PeerList::deserialize(bytes)?),
            2 => Message::Ready(Ready::deserialize(bytes)?),
            3 => Message::EncryptedDeck(EncryptedDeck::deserialize(bytes)?),
            4 => Message::PlayerAction(PlayerAction::deserialize(bytes)?),
            5 => Message::Broadcast(Broadcast::deserialize(bytes)?),
            6 => Message::Disconnect(Disconnect::deserialize(bytes)?),
            other => Message::Unknown { id: other },
        })
    }
}

/// Helper for variants with no payload: errors if any bytes are left over,
/// mirroring the teacher's empty-message validation.
pub(crate) fn expect_empty(bytes: &BytesMut) -> io::Result<()> {
    if bytes.remaining() != 0 {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "expected an empty message body"));
    }
    Ok(())
}
