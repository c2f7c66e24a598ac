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

use crate::card::Card;
use crate::error::EngineError;
use std::cmp::Ordering;

/// Hand classification, ordered weakest to strongest. A straight flush
/// whose top card is an Ace (a royal flush) is simply the highest-tiebreak
/// `StraightFlush`; it does not need its own variant to sort correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RankClass {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

/// The best 5-card hand selected from a player's known cards, along with a
/// tiebreak value that lets two hands of the same class be compared without
/// re-deriving rank groups.
#[derive(Debug, Clone)]
pub struct Hand {
    pub cards: [Card; 5],
    pub rank_class: RankClass,
    pub tiebreak: u32,
}

impl PartialEq for Hand {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for Hand {}

impl PartialOrd for Hand {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Hand {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank_class
            .cmp(&other.rank_class)
            .then_with(|| self.tiebreak.cmp(&other.tiebreak))
            .then_with(|| compare_high_cards(&self.cards, &other.cards))
    }
}

/// Final tiebreak once class and packed tiebreak value agree: compare both
/// hands' cards, sorted descending by Ace-high rank, position by position.
fn compare_high_cards(a: &[Card; 5], b: &[Card; 5]) -> Ordering {
    let mut a_ranks: Vec<u8> = a.iter().map(Card::rank_high).collect();
    let mut b_ranks: Vec<u8> = b.iter().map(Card::rank_high).collect();
    a_ranks.sort_unstable_by(|x, y| y.cmp(x));
    b_ranks.sort_unstable_by(|x, y| y.cmp(x));
    a_ranks.cmp(&b_ranks)
}

/// Packs up to 5 rank values (most significant first) into a single `u32`
/// as 4-bit nibbles, so hands of the same class compare correctly with a
/// single integer comparison.
fn pack_ranks(ranks: &[u8]) -> u32 {
    let mut value = 0u32;
    for &r in ranks.iter().take(5) {
        value = (value << 4) | (r as u32 & 0xF);
    }
    value << (4 * (5 - ranks.len().min(5)))
}

/// Evaluates exactly 5 cards into a classified `Hand`.
pub fn evaluate_five(cards: [Card; 5]) -> Hand {
    let mut by_rank = [0u8; 15]; // index by ace-high rank, 2..=14
    for c in &cards {
        by_rank[c.rank_high() as usize] += 1;
    }

    let flush = cards.windows(2).all(|w| w[0].suit == w[1].suit);
    let straight_top = straight_top_rank(&cards);

    if flush {
        if let Some(top) = straight_top {
            return Hand {
                cards,
                rank_class: RankClass::StraightFlush,
                tiebreak: pack_ranks(&[top]),
            };
        }
    }

    // Group ranks by count, highest rank first within equal counts.
    let mut groups: Vec<(u8, u8)> = (2..=14u8)
        .rev()
        .filter_map(|r| {
            let n = by_rank[r as usize];
            if n > 0 { Some((n, r)) } else { None }
        })
        .collect();
    groups.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));

    if groups[0].0 == 4 {
        let kicker = groups[1].1;
        return Hand {
            cards,
            rank_class: RankClass::FourOfAKind,
            tiebreak: pack_ranks(&[groups[0].1, kicker]),
        };
    }
    if groups[0].0 == 3 && groups.len() > 1 && groups[1].0 >= 2 {
        return Hand {
            cards,
            rank_class: RankClass::FullHouse,
            tiebreak: pack_ranks(&[groups[0].1, groups[1].1]),
        };
    }
    if flush {
        let ranks: Vec<u8> = {
            let mut r: Vec<u8> = cards.iter().map(Card::rank_high).collect();
            r.sort_unstable_by(|a, b| b.cmp(a));
            r
        };
        return Hand {
            cards,
            rank_class: RankClass::Flush,
            tiebreak: pack_ranks(&ranks),
        };
    }
    if let Some(top) = straight_top {
        return Hand {
            cards,
            rank_class: RankClass::Straight,
            tiebreak: pack_ranks(&[top]),
        };
    }
    if groups[0].0 == 3 {
        let kickers: Vec<u8> = groups[1..].iter().map(|g| g.1).collect();
        let mut ranks = vec![groups[0].1];
        ranks.extend(kickers);
        return Hand {
            cards,
            rank_class: RankClass::ThreeOfAKind,
            tiebreak: pack_ranks(&ranks),
        };
    }
    if groups[0].0 == 2 && groups.len() > 1 && groups[1].0 == 2 {
        let kicker = groups[2].1;
        return Hand {
            cards,
            rank_class: RankClass::TwoPair,
            tiebreak: pack_ranks(&[groups[0].1, groups[1].1, kicker]),
        };
    }
    if groups[0].0 == 2 {
        let kickers: Vec<u8> = groups[1..].iter().map(|g| g.1).collect();
        let mut ranks = vec![groups[0].1];
        ranks.extend(kickers);
        return Hand {
            cards,
            rank_class: RankClass::OnePair,
            tiebreak: pack_ranks(&ranks),
        };
    }

    let ranks: Vec<u8> = groups.iter().map(|g| g.1).collect();
    Hand {
        cards,
        rank_class: RankClass::HighCard,
        tiebreak: pack_ranks(&ranks),
    }
}

/// Returns the straight's tiebreak top-card rank if the 5 cards form a
/// straight, handling the wheel (A-2-3-4-5, tiebreak value 5) specially.
fn straight_top_rank(cards: &[Card; 5]) -> Option<u8> {
    let mut ranks: Vec<u8> = cards.iter().map(Card::rank_high).collect();
    ranks.sort_unstable();
    ranks.dedup();
    if ranks.len() != 5 {
        return None;
    }
    if ranks == [2, 3, 4, 5, 14] {
        return Some(5);
    }
    if ranks[4] - ranks[0] == 4 {
        return Some(ranks[4]);
    }
    None
}

/// Selects the best 5-card hand out of 5, 6 or 7 known cards, enumerating
/// every 5-card combination when more than 5 are given.
pub fn best_hand(cards: &[Card]) -> Result<Hand, EngineError> {
    if cards.len() < 5 {
        return Err(EngineError::TooFewCards(cards.len()));
    }
    if cards.len() > 7 {
        return Err(EngineError::TooManyCards(cards.len()));
    }
    if cards.len() == 5 {
        let five: [Card; 5] = cards.try_into().unwrap();
        return Ok(evaluate_five(five));
    }

    let mut best: Option<Hand> = None;
    for combo in combinations(cards, 5) {
        let five: [Card; 5] = combo.try_into().unwrap();
        let hand = evaluate_five(five);
        if best.as_ref().map_or(true, |b| hand > *b) {
            best = Some(hand);
        }
    }
    Ok(best.expect("at least one 5-card combination exists for 6 or 7 cards"))
}

/// Enumerates all length-`k` combinations of `items`, preserving order.
fn combinations<T: Copy>(items: &[T], k: usize) -> Vec<Vec<T>> {
    let mut result = Vec::new();
    let mut chosen = Vec::with_capacity(k);
    combinations_helper(items, k, 0, &mut chosen, &mut result);
    result
}

fn combinations_helper<T: Copy>(
    items: &[T],
    k: usize,
    start: usize,
    chosen: &mut Vec<T>,
    out: &mut Vec<Vec<T>>,
) {
    if chosen.len() == k {
        out.push(chosen.clone());
        return;
    }
    for i in start..items.len() {
        chosen.push(items[i]);
        combinations_helper(items, k, i + 1, chosen, out);
        chosen.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Suit::*;

    fn c(suit: crate::card::Suit, rank: u8) -> Card {
        Card::new(suit, rank)
    }

    #[test]
    fn recognizes_royal_flush_as_top_straight_flush() {
        let hand = evaluate_five([c(Spades, 1), c(Spades, 13), c(Spades, 12), c(Spades, 11), c(Spades, 10)]);
        assert_eq!(hand.rank_class, RankClass::StraightFlush);
        assert_eq!(hand.tiebreak, pack_ranks(&[14]));
    }

    #[test]
    fn wheel_straight_ranks_as_five_high() {
        let hand = evaluate_five([c(Spades, 1), c(Hearts, 2), c(Diamonds, 3), c(Clubs, 4), c(Spades, 5)]);
        assert_eq!(hand.rank_class, RankClass::Straight);
        assert_eq!(hand.tiebreak, pack_ranks(&[5]));
    }

    #[test]
    fn wheel_loses_to_six_high_straight() {
        let wheel = evaluate_five([c(Spades, 1), c(Hearts, 2), c(Diamonds, 3), c(Clubs, 4), c(Spades, 5)]);
        let six_high = evaluate_five([c(Hearts, 2), c(Diamonds, 3), c(Clubs, 4), c(Spades, 5), c(Hearts, 6)]);
        assert!(six_high > wheel);
    }

    #[test]
    fn four_of_a_kind_beats_full_house() {
        let quads = evaluate_five([c(Spades, 5), c(Hearts, 5), c(Diamonds, 5), c(Clubs, 5), c(Spades, 2)]);
        let boat = evaluate_five([c(Spades, 9), c(Hearts, 9), c(Diamonds, 9), c(Clubs, 4), c(Spades, 4)]);
        assert!(quads > boat);
    }

    #[test]
    fn best_of_seven_selects_the_winning_five() {
        let seven = [
            c(Spades, 1),
            c(Hearts, 1),
            c(Diamonds, 1),
            c(Clubs, 1),
            c(Spades, 2),
            c(Hearts, 3),
            c(Diamonds, 4),
        ];
        let hand = best_hand(&seven).unwrap();
        assert_eq!(hand.rank_class, RankClass::FourOfAKind);
    }

    #[test]
    fn higher_kicker_breaks_one_pair_tie() {
        let a = evaluate_five([c(Spades, 5), c(Hearts, 5), c(Diamonds, 13), c(Clubs, 9), c(Spades, 2)]);
        let b = evaluate_five([c(Hearts, 5), c(Clubs, 5), c(Spades, 13), c(Diamonds, 10), c(Hearts, 2)]);
        assert!(b > a);
    }
}
