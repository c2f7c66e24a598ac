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

/// Errors raised by the deck, hand evaluator and game state machine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("the deck has no cards left to draw")]
    DeckExhausted,

    #[error("{addr} attempted an illegal action: {reason}")]
    IllegalAction { addr: String, reason: String },

    #[error("{addr} does not have enough chips to {action} {amount}")]
    InsufficientChips {
        addr: String,
        action: &'static str,
        amount: u64,
    },

    #[error("no player seated at address {0}")]
    UnknownPlayer(String),

    #[error("cannot evaluate a hand with fewer than 5 cards (got {0})")]
    TooFewCards(usize),

    #[error("a hand cannot be built from more than 7 cards (got {0})")]
    TooManyCards(usize),

    #[error("the game is not in a state that allows this operation: {0}")]
    InvalidState(&'static str),
}
