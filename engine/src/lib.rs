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

//! Card, deck and Texas Hold'em engine primitives.
//!
//! This crate has no network or async dependencies: it is a pure state
//! machine driven by the router/node layer above it.

pub mod card;
pub mod deck;
pub mod error;
pub mod game;
pub mod hand;

pub use card::{Card, Suit};
pub use deck::Deck;
pub use error::EngineError;
pub use game::{GameEngine, HandResult, Pot, PlayerAction, PlayerState, Round};
pub use hand::{Hand, RankClass};
