use strum::IntoEnumIterator;

use rand::seq::SliceRandom;
use rand::Rng;

use super::card::{Card, Rank, Suit};

/// A face-down pile of cards, used both as the draw pile and as the discard
/// pile. The top of the pile is the end of the vector.
#[derive(Debug, Clone, Default)]
pub struct CardPile {
    cards: Vec<Card>,
}

impl CardPile {
    pub fn new() -> CardPile {
        CardPile { cards: Vec::new() }
    }

    /// Creates an unshuffled pile of `number_of_decks` standard 52-card decks.
    pub fn standard(number_of_decks: u8) -> CardPile {
        let mut cards = Vec::with_capacity(number_of_decks as usize * 52);
        for _ in 0..number_of_decks {
            for suit in Suit::iter() {
                for rank in Rank::iter() {
                    cards.push(Card::new(rank, suit));
                }
            }
        }
        CardPile { cards }
    }

    /// Creates a pile that deals `cards` in the given order.
    pub fn stacked(cards: Vec<Card>) -> CardPile {
        let mut pile = CardPile::new();
        for card in cards.into_iter().rev() {
            pile.add(card);
        }
        pile
    }

    /// Removes and returns the top card. Returns None if empty.
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Puts a card face down on top of the pile.
    pub fn add(&mut self, mut card: Card) {
        card.conceal();
        self.cards.push(card);
    }

    /// Moves every card of `other` on top of this pile, leaving `other` empty.
    pub fn append(&mut self, other: &mut CardPile) {
        self.cards.append(&mut other.cards);
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
