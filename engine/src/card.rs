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

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four suits. Ordering carries no game meaning; it exists only
/// so cards can be enumerated deterministically when building a deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Suit::Spades => "s",
            Suit::Hearts => "h",
            Suit::Diamonds => "d",
            Suit::Clubs => "c",
        };
        write!(f, "{s}")
    }
}

/// A single playing card. `rank` is in `1..=13` with 1 meaning Ace; callers
/// that need "Ace high" semantics handle that at the evaluator layer rather
/// than here, since the wheel (A-2-3-4-5 straight) needs Ace to compare low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub suit: Suit,
    pub rank: u8,
}

impl Card {
    pub fn new(suit: Suit, rank: u8) -> Self {
        assert!((1..=13).contains(&rank), "card rank out of range: {rank}");
        Self { suit, rank }
    }

    /// Rank with Ace treated as high (14), used everywhere outside of the
    /// wheel special case.
    pub fn rank_high(&self) -> u8 {
        if self.rank == 1 { 14 } else { self.rank }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rank = match self.rank {
            1 => "A".to_string(),
            11 => "J".to_string(),
            12 => "Q".to_string(),
            13 => "K".to_string(),
            n => n.to_string(),
        };
        write!(f, "{rank}{}", self.suit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_high_treats_ace_as_fourteen() {
        let ace = Card::new(Suit::Spades, 1);
        assert_eq!(ace.rank_high(), 14);
        let king = Card::new(Suit::Spades, 13);
        assert_eq!(king.rank_high(), 13);
    }

    #[test]
    #[should_panic]
    fn rejects_out_of_range_rank() {
        Card::new(Suit::Clubs, 14);
    }
}
