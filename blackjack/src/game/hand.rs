use super::card::Card;

/// The ordered cards held by one participant.
#[derive(Debug, Clone, Default)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Hand {
        Hand {
            cards: Vec::with_capacity(5),
        }
    }

    pub fn receive_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Takes the first card equal to `card` out of the hand.
    pub fn remove_card(&mut self, card: &Card) -> Option<Card> {
        let index = self.cards.iter().position(|held| held == card)?;
        Some(self.cards.remove(index))
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Turns every card face up. Used at showdown.
    pub fn reveal_all(&mut self) {
        for card in self.cards.iter_mut() {
            card.reveal();
        }
    }

    /// Empties the hand, returning its cards.
    pub fn clear(&mut self) -> Vec<Card> {
        std::mem::take(&mut self.cards)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
