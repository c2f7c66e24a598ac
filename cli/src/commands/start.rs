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

use crate::helpers::initialize_logger;

use ggpoker_node::{Node, NodeConfig};

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::runtime::{self, Runtime};

/// Starts a ggpoker mesh node.
#[derive(Debug, Clone, Parser)]
pub struct Start {
    /// Specify the IP address and port to listen for peers on.
    #[clap(default_value = "0.0.0.0:4133", long = "listen")]
    pub listen: SocketAddr,

    /// Specify a peer to connect to and gossip-bootstrap the mesh from.
    /// May be repeated.
    #[clap(long = "connect")]
    pub connect: Vec<SocketAddr>,

    /// Specify the small blind, in chips.
    #[clap(default_value = "1", long = "small-blind")]
    pub small_blind: u64,

    /// Specify the big blind, in chips.
    #[clap(default_value = "2", long = "big-blind")]
    pub big_blind: u64,

    /// Specify the starting stack for a newly seated player.
    #[clap(default_value = "200", long = "buy-in")]
    pub buy_in: u64,

    /// Specify the protocol version string advertised during handshakes.
    #[clap(default_value = "1", long = "protocol-version")]
    pub protocol_version: String,

    /// Specify the game variant advertised during handshakes.
    #[clap(default_value = "0", long = "variant")]
    pub variant: u8,

    /// Specify how long to wait for a peer's handshake before giving up.
    #[clap(default_value = "10", long = "dial-timeout-secs")]
    pub dial_timeout_secs: u64,

    /// Specify the verbosity of the node [options: 0, 1, 2]
    #[clap(default_value = "0", long = "verbosity")]
    pub verbosity: u8,
}

impl Start {
    /// Starts the ggpoker node and blocks forever; a future front-end would
    /// drive the local player's actions through [`ggpoker_node::ActionIngress`]
    /// instead of returning here.
    pub fn parse(self) -> Result<()> {
        initialize_logger(self.verbosity);

        Self::runtime().block_on(async move {
            let config = NodeConfig {
                listen_addr: self.listen,
                connect: self.connect.clone(),
                version: self.protocol_version.clone(),
                variant: self.variant,
                small_blind: self.small_blind,
                big_blind: self.big_blind,
                buy_in: self.buy_in,
                dial_timeout: Duration::from_secs(self.dial_timeout_secs),
            };
            let node = Node::start(config).await.expect("failed to start node");
            tracing::info!(addr = %node.router().listen_addr(), "node started");

            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("received interrupt, shutting down");
            node.router().shutdown().await;
        });

        Ok(())
    }

    fn runtime() -> Runtime {
        runtime::Builder::new_multi_thread().enable_all().build().expect("failed to initialize the runtime")
    }
}
