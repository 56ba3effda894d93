pub mod chips;
pub mod display;
pub mod error;
pub mod evaluation;
pub mod game;

use std::fmt;
use std::str::FromStr;

pub use chips::{ChipCounts, ChipStack, Denomination, DenominationTable, Exchange, SortBias};
pub use error::{ChipError, GameError};
pub use evaluation::BlackjackKind;
pub use game::{
    Action, ActionResult, GamePhase, Outcome, Prompt, Seat, Settlement, Table, TableEventHandler,
};

/// A payout rate such as 3:2. Payouts are computed exactly and rounded down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayoutRatio {
    numerator: u16,
    denominator: u16,
}

impl PayoutRatio {
    pub const ONE_TO_ONE: PayoutRatio = PayoutRatio {
        numerator: 1,
        denominator: 1,
    };
    pub const THREE_TO_TWO: PayoutRatio = PayoutRatio {
        numerator: 3,
        denominator: 2,
    };
    pub const SIX_TO_FIVE: PayoutRatio = PayoutRatio {
        numerator: 6,
        denominator: 5,
    };

    pub fn new(numerator: u16, denominator: u16) -> Result<Self, GameError> {
        if denominator == 0 {
            return Err(GameError::InvalidRule(format!(
                "payout ratio {}:{} has a zero denominator",
                numerator, denominator
            )));
        }
        Ok(PayoutRatio {
            numerator,
            denominator,
        })
    }

    /// The amount paid on a winning `bet`, not counting the bet itself.
    pub fn calculate_payout(&self, bet: u64) -> u64 {
        let payout = bet as u128 * self.numerator as u128 / self.denominator as u128;
        payout as u64
    }

    pub fn as_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

impl fmt::Display for PayoutRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.numerator, self.denominator)
    }
}

impl FromStr for PayoutRatio {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GameError::InvalidRule(format!("cannot parse {:?} as a payout ratio", s));
        let (numerator, denominator) = s.trim().split_once(':').ok_or_else(invalid)?;
        let numerator = numerator.trim().parse().map_err(|_| invalid())?;
        let denominator = denominator.trim().parse().map_err(|_| invalid())?;
        PayoutRatio::new(numerator, denominator)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub number_of_decks: u8,
    pub min_buy_in: u64,
    pub max_players: usize,
    pub denominations: DenominationTable,
    /// Starting stake of each player. `None` hands out the standard $300
    /// stack.
    pub player_stake: Option<u64>,
    pub house_stake: u64,

    /// Ace plus a ten-valued card.
    pub payout_natural: PayoutRatio,
    /// 21 reached any other way.
    pub payout_blackjack: PayoutRatio,
    /// Beating the dealer at showdown.
    pub payout_win: PayoutRatio,
}

impl Default for Rule {
    fn default() -> Self {
        Rule {
            number_of_decks: 1,
            min_buy_in: 5,
            max_players: 7,
            denominations: DenominationTable::standard(),
            player_stake: None,
            house_stake: 1_000_000,
            payout_natural: PayoutRatio::ONE_TO_ONE,
            payout_blackjack: PayoutRatio::THREE_TO_TWO,
            payout_win: PayoutRatio::THREE_TO_TWO,
        }
    }
}

impl Rule {
    pub fn validate(&self) -> Result<(), GameError> {
        if self.number_of_decks == 0 {
            return Err(GameError::InvalidRule(String::from(
                "at least one deck is required",
            )));
        }
        if self.max_players == 0 {
            return Err(GameError::InvalidRule(String::from(
                "the table must seat at least one player",
            )));
        }
        let buy_in_is_a_chip = u32::try_from(self.min_buy_in)
            .map(|value| self.denominations.contains(Denomination::new(value)))
            .unwrap_or(false);
        if !buy_in_is_a_chip {
            return Err(GameError::InvalidBuyIn(self.min_buy_in));
        }
        if let Some(stake) = self.player_stake {
            if stake < self.min_buy_in {
                return Err(GameError::InvalidRule(format!(
                    "a player stake of ${} cannot cover the ${} minimum buy-in",
                    stake, self.min_buy_in
                )));
            }
        }
        if self.house_stake == 0 {
            return Err(GameError::InvalidRule(String::from(
                "the house needs a stake to pay out from",
            )));
        }
        Ok(())
    }

    pub fn blackjack_ratio(&self, kind: BlackjackKind) -> PayoutRatio {
        match kind {
            BlackjackKind::Natural => self.payout_natural,
            BlackjackKind::TwentyOne => self.payout_blackjack,
        }
    }
}
