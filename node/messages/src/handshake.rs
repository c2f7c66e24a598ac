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

/// Sent immediately upon connecting, before a peer is admitted to the mesh.
/// `variant` identifies the game being played (0 = Texas Hold'em, others
/// reserved); `status` distinguishes a node that is still waiting for
/// players from one with a hand already underway, so a late joiner can be
/// told to wait for the next hand rather than dropped into the middle of
/// one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handshake {
    pub version: String,
    pub variant: u8,
    pub status: u8,
    pub listen_addr: String,
}

impl MessageTrait for Handshake {
    fn name(&self) -> &'static str {
        "handshake"
    }

    fn serialize<W: Write>(&self, writer: W) -> io::Result<()> {
        bincode::serialize_into(writer, self).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn deserialize(bytes: BytesMut) -> io::Result<Self> {
        bincode::deserialize_from(&mut bytes.reader()).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}
