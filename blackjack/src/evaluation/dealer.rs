use crate::game::card::Card;

use super::{hand_totals, BLACKJACK};

pub const DEALER_STANDS_AT: u32 = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealerDecision {
    Draw,
    Stand,
}

/// The house drawing rule, evaluated once per decision point.
///
/// Without aces the dealer stands on 17 or more. With aces the dealer stands
/// as soon as any total lies in 17..=21, and otherwise draws while some total
/// is still below 17.
pub fn dealer_decision(cards: &[Card]) -> DealerDecision {
    let totals = hand_totals(cards);
    let has_aces = cards.iter().any(|card| card.rank().is_ace());

    if !has_aces {
        return if totals.iter().all(|&total| total >= DEALER_STANDS_AT) {
            DealerDecision::Stand
        } else {
            DealerDecision::Draw
        };
    }

    if totals
        .iter()
        .any(|&total| (DEALER_STANDS_AT..=BLACKJACK).contains(&total))
    {
        return DealerDecision::Stand;
    }
    if totals.iter().any(|&total| total < DEALER_STANDS_AT) {
        DealerDecision::Draw
    } else {
        DealerDecision::Stand
    }
}
