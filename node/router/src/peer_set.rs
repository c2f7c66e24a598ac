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

use ggpoker_node_tcp::PeerHandle;
use std::collections::HashMap;
use std::net::SocketAddr;

/// An admitted mesh peer: its advertised listen address (the identity key),
/// and the transport handle used to send it messages.
pub struct RouterPeer {
    pub listen_addr: String,
    pub handle: PeerHandle,
}

/// The set of currently admitted peers, keyed by advertised listen address
/// rather than socket remote address (the remote port of an inbound
/// connection is ephemeral and tells us nothing about how to dial the peer
/// back). A side index from socket remote address lets the read-loop
/// closure notification (which only knows the socket address) find the
/// right entry to remove.
#[derive(Default)]
pub struct PeerSet {
    by_listen_addr: HashMap<String, RouterPeer>,
    by_remote_addr: HashMap<SocketAddr, String>,
}

impl PeerSet {
    /// Inserts `peer`, keyed by its advertised listen address. If a
    /// connection to that listen address already exists (the
    /// duplicate-connection tie-break replacing it), its old remote-address
    /// entry is removed first so a later `DelPeer` for the stale socket can't
    /// resolve to the listen address and evict the peer that replaced it.
    pub fn insert(&mut self, peer: RouterPeer) {
        if let Some(old) = self.by_listen_addr.get(&peer.listen_addr) {
            self.by_remote_addr.remove(&old.handle.remote_addr);
        }
        self.by_remote_addr.insert(peer.handle.remote_addr, peer.listen_addr.clone());
        self.by_listen_addr.insert(peer.listen_addr.clone(), peer);
    }

    pub fn remove_by_remote_addr(&mut self, remote_addr: SocketAddr) -> Option<RouterPeer> {
        let listen_addr = self.by_remote_addr.remove(&remote_addr)?;
        self.by_listen_addr.remove(&listen_addr)
    }

    pub fn remove_by_listen_addr(&mut self, listen_addr: &str) -> Option<RouterPeer> {
        if let Some(peer) = self.by_listen_addr.remove(listen_addr) {
            self.by_remote_addr.remove(&peer.handle.remote_addr);
            return Some(peer);
        }
        None
    }

    pub fn contains(&self, listen_addr: &str) -> bool {
        self.by_listen_addr.contains_key(listen_addr)
    }

    pub fn get(&self, listen_addr: &str) -> Option<&RouterPeer> {
        self.by_listen_addr.get(listen_addr)
    }

    pub fn listen_addr_of(&self, remote_addr: SocketAddr) -> Option<&str> {
        self.by_remote_addr.get(&remote_addr).map(String::as_str)
    }

    pub fn listen_addrs(&self) -> impl Iterator<Item = &str> {
        self.by_listen_addr.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &RouterPeer> {
        self.by_listen_addr.values()
    }

    pub fn len(&self) -> usize {
        self.by_listen_addr.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_listen_addr.is_empty()
    }
}
