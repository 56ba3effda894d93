use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ChipError;

static STANDARD_VALUES: [u32; 7] = [1, 5, 10, 20, 25, 50, 100];
static CHIP_COLORS: [(u32, &str); 7] = [
    (1, ""),
    (5, "\x1b[31m"),
    (10, "\x1b[34m"),
    (20, "\x1b[37m"),
    (25, "\x1b[32m"),
    (50, "\x1b[33m"),
    (100, "\x1b[30m"),
];

/// The face value of a chip. Ordering follows the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Denomination(u32);

impl Denomination {
    pub const fn new(value: u32) -> Self {
        Denomination(value)
    }

    pub fn value(&self) -> u64 {
        self.0 as u64
    }
}

impl fmt::Display for Denomination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// Accepts both `"$25"` and `"25"`.
impl FromStr for Denomination {
    type Err = ChipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix('$').unwrap_or(trimmed);
        match digits.parse::<u32>() {
            Ok(value) if value > 0 => Ok(Denomination(value)),
            _ => Err(ChipError::UnparsableDenomination(s.to_string())),
        }
    }
}

/// The fixed set of denominations chips can take, sorted by value ascending.
/// Every chip stack of a table refers to the same `DenominationTable`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenominationTable {
    denominations: Vec<Denomination>,
}

impl DenominationTable {
    /// Builds a table from face values. The values may come in any order but
    /// must be distinct and include the unit chip ($1), otherwise arbitrary
    /// amounts could not be represented exactly.
    pub fn new(values: &[u32]) -> Result<DenominationTable, ChipError> {
        let mut denominations: Vec<Denomination> =
            values.iter().map(|&value| Denomination(value)).collect();
        denominations.sort();

        if denominations.is_empty() {
            return Err(ChipError::InvalidDenominations(String::from(
                "at least one denomination is required",
            )));
        }
        if denominations[0].0 != 1 {
            return Err(ChipError::InvalidDenominations(format!(
                "the lowest denomination must be $1, found {}",
                denominations[0]
            )));
        }
        if let Some(pair) = denominations.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(ChipError::InvalidDenominations(format!(
                "{} appears more than once",
                pair[0]
            )));
        }

        Ok(DenominationTable { denominations })
    }

    /// $1, $5, $10, $20, $25, $50 and $100.
    pub fn standard() -> DenominationTable {
        DenominationTable {
            denominations: STANDARD_VALUES.iter().map(|&v| Denomination(v)).collect(),
        }
    }

    /// All denominations, lowest value first.
    pub fn denominations(&self) -> &[Denomination] {
        &self.denominations
    }

    pub fn contains(&self, denomination: Denomination) -> bool {
        self.denominations.binary_search(&denomination).is_ok()
    }

    pub fn lowest(&self) -> Denomination {
        self.denominations[0]
    }

    pub fn highest(&self) -> Denomination {
        self.denominations[self.denominations.len() - 1]
    }

    /// ANSI colour escape used when rendering chips of this denomination.
    /// Denominations without a colour render in the terminal default.
    pub fn color(&self, denomination: Denomination) -> &'static str {
        CHIP_COLORS
            .iter()
            .find(|(value, _)| *value == denomination.0)
            .map(|(_, color)| *color)
            .unwrap_or("")
    }

    /// Parses a denomination and checks that it belongs to this table.
    pub fn parse(&self, s: &str) -> Result<Denomination, ChipError> {
        let denomination: Denomination = s.parse()?;
        if !self.contains(denomination) {
            return Err(ChipError::UnknownDenomination(denomination));
        }
        Ok(denomination)
    }
}

impl Default for DenominationTable {
    fn default() -> Self {
        Self::standard()
    }
}
