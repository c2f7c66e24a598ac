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

/// An opaque, encrypted deck being passed around the mesh for a future
/// mental-poker shuffle protocol. This node never inspects or decrypts the
/// bytes; it only relays them to the next peer in the shuffle ring. Real
/// mental-poker cryptography is an open question (see DESIGN.md).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedDeck {
    pub deck: Vec<u8>,
}

impl MessageTrait for EncryptedDeck {
    fn name(&self) -> &'static str {
        "encrypted_deck"
    }

    fn serialize<W: Write>(&self, writer: W) -> io::Result<()> {
        bincode::serialize_into(writer, &self.deck).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn deserialize(bytes: BytesMut) -> io::Result<Self> {
        let deck = bincode::deserialize_from(&mut bytes.reader()).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(Self { deck })
    }
}
