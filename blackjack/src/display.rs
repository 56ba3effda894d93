//! Terminal rendering of cards, hands and chip stacks.

use std::fmt;

use crate::chips::ChipStack;
use crate::game::card::Card;
use crate::game::hand::Hand;

pub const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[31m";
const BLACK_ON_WHITE: &str = "\x1b[47m\x1b[30m";
pub const CHIP_CHAR: char = '▐';

/// Visible cards render as `[K♥]`, coloured by suit. Hidden cards render
/// as `[??]`.
impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_visible() {
            return write!(f, "[??]");
        }
        let color = if self.suit().is_red() { RED } else { BLACK_ON_WHITE };
        write!(
            f,
            "{}[{}{}]{}",
            color,
            self.rank().label(),
            self.suit().symbol(),
            RESET
        )
    }
}

/// Concatenates the card glyphs of a hand. With `all_visible` every card is
/// shown face up regardless of its own flag.
pub fn render_hand(hand: &Hand, all_visible: bool) -> String {
    hand.cards()
        .iter()
        .map(|card| {
            let mut card = *card;
            if all_visible {
                card.reveal();
            }
            card.to_string()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One row per denomination with its quantity and subtotal, followed by the
/// stack total.
pub fn render_stack_table(stack: &ChipStack) -> String {
    let mut lines = Vec::with_capacity(stack.counts().len() + 4);
    if let Some(label) = stack.label() {
        lines.push(label.to_string());
    }
    lines.push(format!("{:>8} {:>8} {:>10}", "Denom", "Qty", "Subtotal"));
    for (denomination, quantity) in stack.counts() {
        lines.push(format!(
            "{:>8} {:>8} {:>10}",
            denomination.to_string(),
            quantity,
            format!("${}", denomination.value() * quantity)
        ));
    }
    lines.push(format!("{:>8} {:>8} {:>10}", "Total", "", format!("${}", stack.value())));
    lines.join("\n")
}

/// The compact inline strip, highest denomination first, e.g.
/// `▐$100x1 ▐$50x2 ($200)`. Empty denominations are skipped.
impl fmt::Display for ChipStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(label) = self.label() {
            write!(f, "{}: ", label)?;
        }
        for (denomination, quantity) in self.counts().iter().rev() {
            if *quantity == 0 {
                continue;
            }
            let color = self.table().color(*denomination);
            if color.is_empty() {
                write!(f, "{}{}x{} ", CHIP_CHAR, denomination, quantity)?;
            } else {
                write!(f, "{}{}{}{}x{} ", color, CHIP_CHAR, RESET, denomination, quantity)?;
            }
        }
        write!(f, "(${})", self.value())
    }
}
