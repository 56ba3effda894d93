use crate::chips::{ChipStack, SortBias};
use crate::error::ChipError;

use super::hand::Hand;

/// A player or the dealer: one hand, a working chip stack and the pot
/// committed to the current round.
#[derive(Debug, Clone)]
pub struct Participant {
    name: String,
    hand: Hand,
    chips: ChipStack,
    pot: ChipStack,
}

impl Participant {
    pub fn new(name: &str, chips: ChipStack) -> Participant {
        let pot = chips.empty_like();
        Participant {
            name: name.to_string(),
            hand: Hand::new(),
            chips,
            pot,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub(crate) fn hand_mut(&mut self) -> &mut Hand {
        &mut self.hand
    }

    pub fn chips(&self) -> &ChipStack {
        &self.chips
    }

    pub(crate) fn chips_mut(&mut self) -> &mut ChipStack {
        &mut self.chips
    }

    pub fn pot(&self) -> &ChipStack {
        &self.pot
    }

    /// Moves `amount` from the working chips into the pot.
    pub(crate) fn commit_bet(&mut self, amount: u64) -> Result<(), ChipError> {
        self.chips.withdraw_amount(&mut self.pot, amount)?;
        self.pot.sort(SortBias::High)
    }

    /// Returns the whole pot to the working chips. Returns the pot value.
    pub(crate) fn reclaim_pot(&mut self) -> Result<u64, ChipError> {
        let value = self.pot.value();
        self.pot.transfer_all(&mut self.chips)?;
        self.chips.sort(SortBias::High)?;
        Ok(value)
    }

    /// Hands the whole pot over to `winner`. Returns the pot value.
    pub(crate) fn forfeit_pot(&mut self, winner: &mut Participant) -> Result<u64, ChipError> {
        let value = self.pot.value();
        self.pot.transfer_all(&mut winner.chips)?;
        winner.chips.sort(SortBias::High)?;
        Ok(value)
    }

    /// Pays `amount` out of the working chips to `payee`.
    pub(crate) fn pay(&mut self, payee: &mut Participant, amount: u64) -> Result<(), ChipError> {
        self.chips.withdraw_amount(&mut payee.chips, amount)?;
        payee.chips.sort(SortBias::High)
    }
}
