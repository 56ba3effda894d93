use thiserror::Error;

use crate::chips::Denomination;
use crate::game::card::Card;
use crate::game::GamePhase;

/// Failures of chip stack arithmetic. A failing operation never leaves a
/// stack partially modified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChipError {
    #[error("denomination {0} is not part of the chip set")]
    UnknownDenomination(Denomination),

    #[error("cannot parse {0:?} as a chip denomination")]
    UnparsableDenomination(String),

    #[error("invalid denomination table: {0}")]
    InvalidDenominations(String),

    #[error("the quantity of {denomination} chips cannot go negative (holding {held}, removing {requested})")]
    InsufficientQuantity {
        denomination: Denomination,
        held: u64,
        requested: u64,
    },

    #[error("cannot withdraw ${requested} from a stack worth ${held}")]
    InsufficientValue { held: u64, requested: u64 },

    #[error("exchanging {quantity} {from} chips cannot yield a whole {to} chip")]
    FractionalExchange {
        from: Denomination,
        to: Denomination,
        quantity: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("{operation} is only allowed in {expected:?} phase (table is in {actual:?})")]
    WrongPhase {
        operation: &'static str,
        expected: GamePhase,
        actual: GamePhase,
    },

    #[error(transparent)]
    Chip(#[from] ChipError),

    #[error("invalid rule: {0}")]
    InvalidRule(String),

    #[error("minimum buy-in ${0} is not the value of any chip denomination")]
    InvalidBuyIn(u64),

    #[error("bet ${bet} is below the table minimum of ${minimum}")]
    BetBelowMinimum { bet: u64, minimum: u64 },

    #[error("bet ${bet} exceeds the ${stack} available")]
    BetExceedsStack { bet: u64, stack: u64 },

    #[error("seat {0} does not exist")]
    NoSuchSeat(usize),

    #[error("no bets were placed")]
    NoBets,

    #[error("the table already seats {0} players")]
    TableFull(usize),

    #[error("both the draw pile and the discard pile are empty")]
    OutOfCards,

    #[error("{0:?} is not in that hand")]
    CardNotInHand(Card),

    #[error("no player is on turn")]
    NoActiveSeat,

    #[error("the input stream was closed")]
    InputClosed,

    #[error("{0:?} is not a valid choice")]
    InvalidChoice(String),
}
