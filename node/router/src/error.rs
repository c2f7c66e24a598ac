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

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error(transparent)]
    Transport(#[from] ggpoker_node_tcp::TransportError),

    #[error("handshake with {addr} timed out")]
    HandshakeTimeout { addr: String },

    #[error("handshake with {addr} failed: version/variant mismatch (ours {ours_version}/{ours_variant}, theirs {theirs_version}/{theirs_variant})")]
    HandshakeMismatch {
        addr: String,
        ours_version: String,
        ours_variant: u8,
        theirs_version: String,
        theirs_variant: u8,
    },

    #[error("refused to connect to our own advertised address {0}")]
    SelfConnectAttempt(String),

    #[error("the connection to {0} closed before the handshake completed")]
    ClosedDuringHandshake(String),

    #[error("peer {0} violated the protocol: {1}")]
    ProtocolViolation(String, String),
}
