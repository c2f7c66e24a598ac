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

use ggpoker_node_router::{start, RouterConfig};
use std::net::SocketAddr;
use std::time::Duration;

async fn spin_up(variant: u8) -> (ggpoker_node_router::RouterHandle, tokio::sync::mpsc::Receiver<ggpoker_node_router::RouterEvent>) {
    let config = RouterConfig { listen_addr: "127.0.0.1:0".parse().unwrap(), version: "1".into(), variant, ..Default::default() };
    // bind an ephemeral port for real, then rebuild the config with the
    // address the OS actually handed us, since the router needs to
    // advertise the same address it's reachable on.
    let probe = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = probe.local_addr().unwrap();
    drop(probe);
    let config = RouterConfig { listen_addr: addr, ..config };
    start(config).await.unwrap()
}

async fn wait_until_peer_count(handle: &ggpoker_node_router::RouterHandle, expected: usize, timeout: Duration) {
    let start = tokio::time::Instant::now();
    loop {
        if handle.number_of_connected_peers().await == expected {
            return;
        }
        if start.elapsed() > timeout {
            panic!("{} did not reach {expected} connected peers within {timeout:?}", handle.listen_addr());
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test]
async fn two_nodes_converge_after_one_explicit_connect() {
    let (handle_a, _events_a) = spin_up(0).await;
    let (handle_b, _events_b) = spin_up(0).await;

    handle_a.connect(handle_b.listen_addr()).await;

    wait_until_peer_count(&handle_a, 1, Duration::from_secs(2)).await;
    wait_until_peer_count(&handle_b, 1, Duration::from_secs(2)).await;

    handle_a.broadcast(ggpoker_node_messages::Message::Ready(ggpoker_node_messages::Ready)).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    handle_a.shutdown().await;
    handle_b.shutdown().await;
}

#[tokio::test]
async fn third_node_learns_about_existing_peer_via_gossip() {
    let (handle_a, _events_a) = spin_up(0).await;
    let (handle_b, _events_b) = spin_up(0).await;
    let (handle_c, _events_c) = spin_up(0).await;

    handle_a.connect(handle_b.listen_addr()).await;
    wait_until_peer_count(&handle_a, 1, Duration::from_secs(2)).await;
    wait_until_peer_count(&handle_b, 1, Duration::from_secs(2)).await;

    // C only knows about A; gossip from A's PeerList should cause C to dial B.
    handle_c.connect(handle_a.listen_addr()).await;

    wait_until_peer_count(&handle_c, 2, Duration::from_secs(2)).await;

    let c_peers = handle_c.connected_peers().await;
    assert!(c_peers.contains(&handle_a.listen_addr().to_string()));
    assert!(c_peers.contains(&handle_b.listen_addr().to_string()));

    handle_a.shutdown().await;
    handle_b.shutdown().await;
    handle_c.shutdown().await;
}

#[tokio::test]
async fn duplicate_connection_tie_break_keeps_exactly_one_peer() {
    let (handle_a, _events_a) = spin_up(0).await;
    let (handle_b, _events_b) = spin_up(0).await;

    // Dial twice in the same direction so both sides admit a duplicate
    // connection to the same peer, forcing the tie-break in `admit`
    // regardless of which address happens to compare smaller.
    handle_a.connect(handle_b.listen_addr()).await;
    handle_a.connect(handle_b.listen_addr()).await;

    wait_until_peer_count(&handle_a, 1, Duration::from_secs(2)).await;
    wait_until_peer_count(&handle_b, 1, Duration::from_secs(2)).await;

    // Give the losing connection's task time to notice its handle was
    // dropped, exit, and fire `DelPeer` for its now-stale remote address.
    // The winning connection must survive that cleanup, not get evicted
    // as a side effect of it.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(handle_a.number_of_connected_peers().await, 1);
    assert_eq!(handle_b.number_of_connected_peers().await, 1);

    handle_a.shutdown().await;
    handle_b.shutdown().await;
}

#[tokio::test]
async fn handshake_with_mismatched_variant_does_not_admit_the_peer() {
    let (handle_a, _events_a) = spin_up(0).await;
    let (handle_b, _events_b) = spin_up(1).await;

    let addr_a: SocketAddr = handle_a.listen_addr();
    handle_b.connect(addr_a).await;

    // Give the rejected handshake plenty of time to run to completion, then
    // assert neither side ever admitted the other.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(handle_a.number_of_connected_peers().await, 0);
    assert_eq!(handle_b.number_of_connected_peers().await, 0);

    handle_a.shutdown().await;
    handle_b.shutdown().await;
}
