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

use crate::card::{Card, Suit};
use crate::error::EngineError;
use rand::Rng;

/// A standard 52-card deck, shuffled with an injected RNG so tests and
/// replay tooling can reproduce a deal deterministically.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
    next: usize,
}

impl Deck {
    /// Builds the full 52-card deck in a fixed suit/rank order, then
    /// shuffles it in place with Fisher-Yates.
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        let mut cards = Vec::with_capacity(52);
        for suit in Suit::ALL {
            for rank in 1..=13u8 {
                cards.push(Card::new(suit, rank));
            }
        }
        Self::shuffle(&mut cards, rng);
        Self { cards, next: 0 }
    }

    fn shuffle<R: Rng>(cards: &mut [Card], rng: &mut R) {
        for i in (1..cards.len()).rev() {
            let j = rng.gen_range(0..=i);
            cards.swap(i, j);
        }
    }

    /// Draws the next card off the top of the deck.
    pub fn draw(&mut self) -> Result<Card, EngineError> {
        let card = *self.cards.get(self.next).ok_or(EngineError::DeckExhausted)?;
        self.next += 1;
        Ok(card)
    }

    /// Number of cards left to draw.
    pub fn remaining(&self) -> usize {
        self.cards.len() - self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    #[test]
    fn deck_has_fifty_two_distinct_cards() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let deck = Deck::new(&mut rng);
        assert_eq!(deck.remaining(), 52);
        let set: HashSet<Card> = deck.cards.iter().copied().collect();
        assert_eq!(set.len(), 52);
    }

    #[test]
    fn draw_until_exhausted_then_errors() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut deck = Deck::new(&mut rng);
        for _ in 0..52 {
            deck.draw().unwrap();
        }
        assert!(matches!(deck.draw(), Err(EngineError::DeckExhausted)));
    }

    #[test]
    fn different_seeds_produce_different_orders() {
        let mut rng_a = ChaCha8Rng::seed_from_u64(10);
        let mut rng_b = ChaCha8Rng::seed_from_u64(11);
        let a = Deck::new(&mut rng_a);
        let b = Deck::new(&mut rng_b);
        assert_ne!(a.cards, b.cards);
    }
}
