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

//! The framed TCP transport: listen/dial primitives and a per-connection
//! read/write task.

mod error;
mod peer;
mod transport;

pub use error::TransportError;
pub use peer::{frame, spawn_peer, Direction, PeerHandle};
pub use transport::{dial, listen};

#[cfg(test)]
mod tests {
    use super::*;
    use ggpoker_node_messages::{Message, Ready};
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn peers_exchange_a_message_over_a_real_socket() {
        let listener = listen("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let local_addr = listener.local_addr().unwrap();

        let (inbound_tx, mut inbound_rx) = mpsc::channel(8);
        let (closed_tx, _closed_rx) = mpsc::channel(8);

        let accept_inbound_tx = inbound_tx.clone();
        let accept_closed_tx = closed_tx.clone();
        tokio::spawn(async move {
            let (stream, remote_addr) = listener.accept().await.unwrap();
            spawn_peer(frame(stream), remote_addr, Direction::Inbound, accept_inbound_tx, accept_closed_tx);
        });

        let stream = dial(local_addr, Duration::from_secs(1)).await.unwrap();
        let handle = spawn_peer(frame(stream), local_addr, Direction::Outbound, inbound_tx, closed_tx);
        handle.send(Message::Ready(Ready)).unwrap();

        let (_from, message) = inbound_rx.recv().await.expect("the listener side received the message");
        assert_eq!(message.name(), "ready");
    }
}
