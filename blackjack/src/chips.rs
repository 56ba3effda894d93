pub mod denomination;

use std::collections::BTreeMap;
use std::rc::Rc;

use log::debug;
use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};

use crate::error::ChipError;

pub use self::denomination::{Denomination, DenominationTable};

/// Chip quantities keyed by denomination.
pub type ChipCounts = BTreeMap<Denomination, u64>;

/// A $300 starting stack.
static STANDARD_STACK: [(u32, u64); 7] = [
    (1, 25),
    (5, 5),
    (10, 3),
    (20, 1),
    (25, 0),
    (50, 2),
    (100, 1),
];

/// How `ChipStack::sort` re-denominates a stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_enum_str, Deserialize_enum_str)]
#[serde(rename_all = "lowercase")]
pub enum SortBias {
    /// Everything in the lowest denomination.
    Low,
    /// Pairwise upgrades from the lowest denomination to the highest.
    High,
    /// Leaves the stack as it is.
    Uniform,
}

/// What a successful `ChipStack::exchange` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exchange {
    pub from: Denomination,
    pub to: Denomination,
    /// Chips of `from` taken out of the stack.
    pub consumed: u64,
    /// Chips of `to` added to the stack.
    pub gained: u64,
    /// Value re-deposited because it did not fill a whole `to` chip.
    pub remainder: u64,
}

/// A ledger of chip quantities per denomination.
///
/// The stack always holds an entry for every denomination of its table and
/// quantities never go negative. It is only changed through the operations
/// below, each of which either succeeds completely or leaves the stack as it
/// was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipStack {
    table: Rc<DenominationTable>,
    counts: ChipCounts,
    label: Option<String>,
}

impl ChipStack {
    /// Creates an empty stack.
    pub fn new(table: Rc<DenominationTable>) -> ChipStack {
        let counts = table.denominations().iter().map(|&d| (d, 0)).collect();
        ChipStack {
            table,
            counts,
            label: None,
        }
    }

    /// Creates the standard $300 player stack. Denominations the table does
    /// not know are left out.
    pub fn standard(table: Rc<DenominationTable>) -> ChipStack {
        let counts: ChipCounts = STANDARD_STACK
            .iter()
            .map(|&(value, quantity)| (Denomination::new(value), quantity))
            .collect();
        Self::from_counts(table, &counts)
    }

    pub fn from_counts(table: Rc<DenominationTable>, counts: &ChipCounts) -> ChipStack {
        let mut stack = Self::new(table);
        stack.add(counts);
        stack
    }

    /// Creates a stack worth `amount`, biased toward high denominations.
    pub fn from_amount(table: Rc<DenominationTable>, amount: u64) -> ChipStack {
        let mut stack = Self::new(table);
        stack.deposit_amount(amount);
        stack
    }

    /// Creates the dealer's working stack.
    pub fn house(table: Rc<DenominationTable>, amount: u64) -> ChipStack {
        Self::from_amount(table, amount).with_label("Dealer")
    }

    /// Creates an empty, unlabelled stack over the same denominations.
    pub fn empty_like(&self) -> ChipStack {
        Self::new(Rc::clone(&self.table))
    }

    /// Attaches a display label. Labels never take part in arithmetic.
    pub fn with_label(mut self, label: &str) -> ChipStack {
        self.label = Some(label.to_string());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn table(&self) -> &DenominationTable {
        &self.table
    }

    pub fn counts(&self) -> &ChipCounts {
        &self.counts
    }

    pub fn quantity(&self, denomination: Denomination) -> u64 {
        self.counts.get(&denomination).copied().unwrap_or(0)
    }

    /// Total value of all chips in the stack.
    pub fn value(&self) -> u64 {
        self.counts
            .iter()
            .map(|(denomination, quantity)| denomination.value() * quantity)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.values().all(|&quantity| quantity == 0)
    }

    /// Adds the quantities of every known denomination in `delta`. Unknown
    /// denominations are ignored.
    pub fn add(&mut self, delta: &ChipCounts) {
        for (denomination, quantity) in self.counts.iter_mut() {
            *quantity += delta.get(denomination).copied().unwrap_or(0);
        }
    }

    /// Removes the quantities in `delta`. Fails without touching the stack if
    /// any denomination would go negative.
    pub fn remove(&mut self, delta: &ChipCounts) -> Result<(), ChipError> {
        for (denomination, &held) in &self.counts {
            let requested = delta.get(denomination).copied().unwrap_or(0);
            if requested > held {
                return Err(ChipError::InsufficientQuantity {
                    denomination: *denomination,
                    held,
                    requested,
                });
            }
        }

        for (denomination, quantity) in self.counts.iter_mut() {
            *quantity -= delta.get(denomination).copied().unwrap_or(0);
        }
        Ok(())
    }

    /// Moves the chips in `delta` to `destination`. Neither stack changes if
    /// the removal fails.
    pub fn transfer(
        &mut self,
        destination: &mut ChipStack,
        delta: &ChipCounts,
    ) -> Result<(), ChipError> {
        let delta = delta.clone();
        self.remove(&delta)?;
        destination.add(&delta);
        Ok(())
    }

    /// Moves every chip of this stack to `destination`.
    pub fn transfer_all(&mut self, destination: &mut ChipStack) -> Result<(), ChipError> {
        let everything = self.counts.clone();
        self.transfer(destination, &everything)
    }

    /// Exchanges `quantity` chips of `from` (all of them when `None`) for the
    /// largest whole number of `to` chips. Whatever part of the consumed value
    /// does not fill a whole `to` chip is deposited back, so the stack value
    /// never changes.
    ///
    /// Only as many `from` chips as are needed for the whole `to` chips are
    /// consumed: exchanging three $25 chips for $10 chips takes all three,
    /// gives seven $10 chips and deposits the remaining $5.
    pub fn exchange(
        &mut self,
        from: Denomination,
        to: Denomination,
        quantity: Option<u64>,
    ) -> Result<Exchange, ChipError> {
        for denomination in [from, to] {
            if !self.table.contains(denomination) {
                return Err(ChipError::UnknownDenomination(denomination));
            }
        }

        let held = self.quantity(from);
        let requested = quantity.unwrap_or(held);
        if requested > held {
            return Err(ChipError::InsufficientQuantity {
                denomination: from,
                held,
                requested,
            });
        }
        let (v1, v2) = (from.value() as u128, to.value() as u128);
        let gained = v1 * requested as u128 / v2;
        if gained < 1 {
            return Err(ChipError::FractionalExchange {
                from,
                to,
                quantity: requested,
            });
        }
        let consumed = (v2 * gained + v1 - 1) / v1;
        let remainder = v1 * consumed - v2 * gained;
        let exchange = Exchange {
            from,
            to,
            consumed: consumed as u64,
            gained: gained as u64,
            remainder: remainder as u64,
        };

        self.remove(&ChipCounts::from([(from, exchange.consumed)]))?;
        self.add(&ChipCounts::from([(to, exchange.gained)]));
        self.deposit_amount(exchange.remainder);
        debug!(
            "exchanged {} {} chips for {} {} chips, ${} re-deposited",
            exchange.consumed, from, exchange.gained, to, exchange.remainder
        );
        Ok(exchange)
    }

    /// Adds chips worth `amount`, taking as many of each denomination as fit
    /// from the highest value down. The unit chip absorbs whatever is left.
    pub fn deposit_amount(&mut self, amount: u64) {
        let mut remaining = amount;
        for (denomination, quantity) in self.counts.iter_mut().rev() {
            let taken = remaining / denomination.value();
            remaining -= taken * denomination.value();
            *quantity += taken;
        }
        debug_assert_eq!(remaining, 0);
    }

    /// Moves chips worth `amount` to `destination` whatever the current
    /// layout of this stack. The destination receives unit chips and this
    /// stack is re-sorted high afterwards.
    pub fn withdraw_amount(
        &mut self,
        destination: &mut ChipStack,
        amount: u64,
    ) -> Result<(), ChipError> {
        let held = self.value();
        if amount > held {
            return Err(ChipError::InsufficientValue {
                held,
                requested: amount,
            });
        }
        if amount == 0 {
            return Ok(());
        }

        self.sort(SortBias::Low)?;
        let unit = self.table.lowest();
        self.transfer(destination, &ChipCounts::from([(unit, amount)]))?;
        self.sort(SortBias::High)?;
        debug!("withdrew ${} from a stack worth ${}", amount, held);
        Ok(())
    }

    /// Re-denominates the stack according to `bias`. Exchanges that cannot
    /// produce a whole chip end that step of the sweep and are not errors.
    pub fn sort(&mut self, bias: SortBias) -> Result<(), ChipError> {
        let table = Rc::clone(&self.table);
        let denominations = table.denominations();
        match bias {
            SortBias::Low => {
                let lowest = table.lowest();
                for &denomination in &denominations[1..] {
                    ignore_fractional(self.exchange(denomination, lowest, None))?;
                }
            }
            SortBias::High => {
                for pair in denominations.windows(2) {
                    ignore_fractional(self.exchange(pair[0], pair[1], None))?;
                }
            }
            SortBias::Uniform => {}
        }
        Ok(())
    }
}

fn ignore_fractional(result: Result<Exchange, ChipError>) -> Result<(), ChipError> {
    match result {
        Ok(_) | Err(ChipError::FractionalExchange { .. }) => Ok(()),
        Err(e) => Err(e),
    }
}
