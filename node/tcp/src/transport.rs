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
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tracing::info;

/// Binds a listener on `addr`. Mirrors `network/src/server/server.rs`'s
/// `TcpListener::bind` call, minus the consensus/storage wiring that crate
/// couples into the same function.
pub async fn listen(addr: SocketAddr) -> Result<TcpListener, TransportError> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "listening for inbound connections");
    Ok(listener)
}

/// Dials a peer at `addr`, bounding the connect attempt itself by
/// `dial_timeout` so an unreachable peer can't hang the caller indefinitely.
pub async fn dial(addr: SocketAddr, dial_timeout: Duration) -> Result<TcpStream, TransportError> {
    let stream = tokio::time::timeout(dial_timeout, TcpStream::connect(addr)).await.map_err(|_| TransportError::DialTimeout)??;
    info!(%addr, "dialed peer");
    Ok(stream)
}
