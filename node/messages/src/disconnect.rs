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

use crate::MessageTrait;
use bytes::{Buf, BytesMut};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// The reason a node is closing a connection. Sent best-effort before the
/// local side closes; receipt is purely informational and never blocks the
/// close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisconnectReason {
    NoReasonGiven,
    HandshakeMismatch,
    ProtocolViolation,
    DuplicateConnection,
    TooManyPeers,
    ShuttingDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disconnect {
    pub reason: DisconnectReason,
}

impl MessageTrait for Disconnect {
    fn name(&self) -> &'static str {
        "disconnect"
    }

    fn serialize<W: Write>(&self, writer: W) -> io::Result<()> {
        bincode::serialize_into(writer, &self.reason).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn deserialize(bytes: BytesMut) -> io::Result<Self> {
        if bytes.remaining() == 0 {
            return Ok(Self { reason: DisconnectReason::NoReasonGiven });
        }
        let reason = bincode::deserialize_from(&mut bytes.reader()).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(Self { reason })
    }
}

impl From<DisconnectReason> for Disconnect {
    fn from(reason: DisconnectReason) -> Self {
        Self { reason }
    }
}
