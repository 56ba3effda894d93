//! Hand totals under ace ambiguity, and the predicates derived from them.

pub mod dealer;

use std::collections::BTreeSet;

use crate::game::card::Card;
use crate::PayoutRatio;

pub use self::dealer::{dealer_decision, DealerDecision, DEALER_STANDS_AT};

pub const ACE_LOW: u32 = 2;
pub const ACE_HIGH: u32 = 11;
pub const BLACKJACK: u32 = 21;

/// How a hand reached 21.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlackjackKind {
    /// An ace together with a ten-valued card.
    Natural,
    /// Any other way of reaching 21, e.g. three sevens.
    TwentyOne,
}

impl BlackjackKind {
    /// The rate paid when the table rule does not override it.
    pub fn standard_ratio(&self) -> PayoutRatio {
        match self {
            BlackjackKind::Natural => PayoutRatio::ONE_TO_ONE,
            BlackjackKind::TwentyOne => PayoutRatio::THREE_TO_TWO,
        }
    }
}

/// Every distinct total the cards can make. Each ace counts either
/// `ACE_LOW` or `ACE_HIGH`, so `k` aces give at most `k + 1` totals.
pub fn hand_totals(cards: &[Card]) -> BTreeSet<u32> {
    let base: u32 = cards.iter().filter_map(|card| card.rank().pips()).sum();
    let aces = cards.iter().filter(|card| card.rank().is_ace()).count();

    let mut totals = BTreeSet::from([base]);
    for _ in 0..aces {
        totals = totals
            .iter()
            .flat_map(|total| [total + ACE_LOW, total + ACE_HIGH])
            .collect();
    }
    totals
}

/// True when no arrangement of aces keeps the hand at or below 21.
pub fn is_bust(cards: &[Card]) -> bool {
    hand_totals(cards).iter().all(|&total| total > BLACKJACK)
}

/// The highest total that does not bust, if any.
pub fn best_total(cards: &[Card]) -> Option<u32> {
    hand_totals(cards)
        .into_iter()
        .filter(|&total| total <= BLACKJACK)
        .max()
}

/// Returns how the hand makes 21, or `None` if no total equals 21.
pub fn natural_blackjack(cards: &[Card]) -> Option<BlackjackKind> {
    if !hand_totals(cards).contains(&BLACKJACK) {
        return None;
    }
    let has_ace = cards.iter().any(|card| card.rank().is_ace());
    let has_ten = cards.iter().any(|card| card.rank().is_ten_valued());
    if has_ace && has_ten {
        Some(BlackjackKind::Natural)
    } else {
        Some(BlackjackKind::TwentyOne)
    }
}

/// Whether the hand is a blackjack and the standard payout multiplier
/// (`0.0` when it is not).
pub fn is_natural_blackjack(cards: &[Card]) -> (bool, f64) {
    match natural_blackjack(cards) {
        Some(kind) => (true, kind.standard_ratio().as_f64()),
        None => (false, 0.0),
    }
}
