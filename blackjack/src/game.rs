pub mod card;
pub mod hand;
pub mod participant;
pub mod pile;

use std::collections::BTreeSet;
use std::ops::Bound::{Excluded, Unbounded};
use std::rc::Rc;

use blackjack_macros::allowed_phase;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::chips::{ChipStack, Denomination, DenominationTable, Exchange, SortBias};
use crate::error::GameError;
use crate::evaluation::{
    best_total, dealer_decision, is_bust, natural_blackjack, BlackjackKind, DealerDecision,
};
use crate::{display, Rule};

use self::{card::Card, participant::Participant, pile::CardPile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    AwaitingBets,
    Dealing,
    PlayerActions,
    DealerResolution,
    Settlement,
}

/// Someone holding a hand at the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    Player(usize),
    Dealer,
}

/// Everything a participant can do with cards at the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Hit,
    Stand,
    ViewHand(Seat),
    Draw(Seat),
    Discard(Seat, Card),
    Transfer { from: Seat, to: Seat, card: Card },
}

/// The keywords a player on turn answers with.
pub const PLAYER_KEYWORDS: [&str; 3] = ["hit", "stand", "view"];

impl Action {
    /// The action a player on `seat` asks for by keyword.
    pub fn from_keyword(keyword: &str, seat: usize) -> Option<Action> {
        match keyword {
            "hit" => Some(Action::Hit),
            "stand" => Some(Action::Stand),
            "view" => Some(Action::ViewHand(Seat::Player(seat))),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    Hit(Hit),
    Stood,
    Viewed(String),
    Drew(Card),
    Discarded(Card),
    Transferred(Card),
}

/// The card a hit produced, and the settlement it triggered, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub card: Card,
    pub settlement: Option<Settlement>,
}

/// How a player's hand was resolved. Amounts are in dollars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The pot is returned together with `payout`.
    Blackjack { kind: BlackjackKind, payout: u64 },
    /// The pot went to the dealer.
    Bust { lost: u64 },
    /// The pot is returned together with `payout`.
    Win { payout: u64 },
    /// The pot went to the dealer.
    Loss { lost: u64 },
    /// The pot is returned unchanged.
    Push { returned: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub seat: usize,
    pub outcome: Outcome,
}

/// Input collaborator. Blocks until the user picks one of `allowed`, and
/// returns `None` once no more input can be read.
pub trait Prompt {
    fn prompt_choice(&mut self, message: &str, allowed: &[String]) -> Option<String>;
}

/// Narration hooks called by `Table::play_round`. Every hook defaults to
/// doing nothing.
#[allow(unused_variables)]
pub trait TableEventHandler {
    fn on_round_begin(&mut self, table: &Table) {}
    fn on_sit_out(&mut self, table: &Table, seat: usize) {}
    fn on_bet_placed(&mut self, table: &Table, seat: usize, amount: u64) {}
    fn on_cards_dealt(&mut self, table: &Table) {}
    fn on_player_card(&mut self, table: &Table, seat: usize, card: Card) {}
    fn on_view_hand(&mut self, table: &Table, seat: usize, rendered: &str) {}
    fn on_dealer_played(&mut self, table: &Table, drawn: &[Card]) {}
    fn on_settlement(&mut self, table: &Table, settlement: &Settlement) {}
    fn on_round_end(&mut self, table: &Table, settlements: &[Settlement]) {}
}

/// A single blackjack table: the seated players, the dealer, the draw and
/// discard piles, and the phase of the current round.
///
/// A round goes through `AwaitingBets`, `Dealing`, `PlayerActions`,
/// `DealerResolution` and `Settlement`, then returns to `AwaitingBets`.
/// Operations that belong to one phase fail with `GameError::WrongPhase`
/// anywhere else.
pub struct Table {
    rule: Rule,
    denominations: Rc<DenominationTable>,
    phase: GamePhase,
    players: Vec<Participant>,
    dealer: Participant,
    draw_pile: CardPile,
    discard_pile: CardPile,
    dealt_in: BTreeSet<usize>,
    active_seat: Option<usize>,
    rng: StdRng,
}

impl Table {
    /// Creates a table with a freshly shuffled shoe.
    pub fn new(rule: &Rule) -> Result<Self, GameError> {
        Self::with_rng(rule, StdRng::from_entropy())
    }

    /// Like `new`, but every shuffle is reproducible.
    pub fn with_seed(rule: &Rule, seed: u64) -> Result<Self, GameError> {
        Self::with_rng(rule, StdRng::seed_from_u64(seed))
    }

    fn with_rng(rule: &Rule, mut rng: StdRng) -> Result<Self, GameError> {
        let mut draw_pile = CardPile::standard(rule.number_of_decks);
        draw_pile.shuffle(&mut rng);
        Self::with_draw_pile(rule, draw_pile, rng)
    }

    /// Creates a table that deals from `draw_pile` as given. `rng` is only
    /// used when the discard pile is shuffled back in.
    pub fn with_draw_pile(
        rule: &Rule,
        draw_pile: CardPile,
        rng: StdRng,
    ) -> Result<Self, GameError> {
        rule.validate()?;
        let denominations = Rc::new(rule.denominations.clone());
        let dealer = Participant::new(
            "Dealer",
            ChipStack::house(Rc::clone(&denominations), rule.house_stake),
        );
        Ok(Self {
            rule: rule.clone(),
            denominations,
            phase: GamePhase::AwaitingBets,
            players: Vec::with_capacity(rule.max_players),
            dealer,
            draw_pile,
            discard_pile: CardPile::new(),
            dealt_in: BTreeSet::new(),
            active_seat: None,
            rng,
        })
    }

    /// Seats a new player with the starting stake of the rule. Returns the
    /// seat number.
    #[allowed_phase(AwaitingBets)]
    pub fn seat_player(&mut self, name: &str) -> Result<usize, GameError> {
        if self.players.len() >= self.rule.max_players {
            return Err(GameError::TableFull(self.rule.max_players));
        }
        let table = Rc::clone(&self.denominations);
        let chips = match self.rule.player_stake {
            Some(amount) => ChipStack::from_amount(table, amount),
            None => ChipStack::standard(table),
        };
        self.players.push(Participant::new(name, chips.with_label(name)));
        info!("{} sits down at seat {}", name, self.players.len() - 1);
        Ok(self.players.len() - 1)
    }

    /// The bets `seat` may place this round: every multiple of the minimum
    /// buy-in its chips can cover. Empty when the player cannot afford to
    /// play.
    pub fn allowed_bets(&self, seat: usize) -> Result<Vec<u64>, GameError> {
        let available = self.player(seat)?.chips().value();
        let step = self.rule.min_buy_in;
        Ok((step..=available).step_by(step as usize).collect())
    }

    #[allowed_phase(AwaitingBets)]
    pub fn place_bet(&mut self, seat: usize, amount: u64) -> Result<(), GameError> {
        let minimum = self.rule.min_buy_in;
        let player = self.player_mut(seat)?;
        if amount < minimum {
            return Err(GameError::BetBelowMinimum {
                bet: amount,
                minimum,
            });
        }
        let stack = player.chips().value();
        if amount > stack {
            return Err(GameError::BetExceedsStack { bet: amount, stack });
        }
        player.commit_bet(amount)?;
        info!("{} bets ${}", player.name(), amount);
        Ok(())
    }

    /// Deals in every player with a pot and moves on to dealing.
    #[allowed_phase(AwaitingBets)]
    pub fn close_betting(&mut self) -> Result<(), GameError> {
        self.dealt_in = self
            .players
            .iter()
            .enumerate()
            .filter(|(_, player)| !player.pot().is_empty())
            .map(|(seat, _)| seat)
            .collect();
        if self.dealt_in.is_empty() {
            return Err(GameError::NoBets);
        }
        self.phase = GamePhase::Dealing;
        Ok(())
    }

    /// Deals two face-up cards to every player dealt in, and one face-up and
    /// one face-down card to the dealer. Naturals are paid on the spot.
    #[allowed_phase(Dealing)]
    pub fn deal_initial_cards(&mut self) -> Result<Vec<Settlement>, GameError> {
        let seats: Vec<usize> = self.dealt_in.iter().copied().collect();
        for round in 0..2 {
            for &seat in &seats {
                let mut card = self.draw_card()?;
                card.reveal();
                self.players[seat].hand_mut().receive_card(card);
            }
            let mut card = self.draw_card()?;
            if round == 0 {
                card.reveal();
            }
            self.dealer.hand_mut().receive_card(card);
        }

        let settlements = self.check_for_payouts(false)?;
        self.active_seat = self.dealt_in.iter().next().copied();
        self.phase = match self.active_seat {
            Some(_) => GamePhase::PlayerActions,
            None => GamePhase::DealerResolution,
        };
        info!("cards dealt, {:?}", self.phase);
        Ok(settlements)
    }

    /// Deals a face-up card to the player on turn. A bust or a 21 settles
    /// the hand immediately and passes the turn on.
    #[allowed_phase(PlayerActions)]
    pub fn play_hit(&mut self) -> Result<Hit, GameError> {
        let seat = self.active_seat.ok_or(GameError::NoActiveSeat)?;
        let mut card = self.draw_card()?;
        card.reveal();
        self.players[seat].hand_mut().receive_card(card);

        let settlement = self.check_for_payout(seat, false)?;
        if settlement.is_some() {
            self.dealt_in.remove(&seat);
            self.advance_turn(seat);
        }
        Ok(Hit { card, settlement })
    }

    #[allowed_phase(PlayerActions)]
    pub fn play_stand(&mut self) -> Result<(), GameError> {
        let seat = self.active_seat.ok_or(GameError::NoActiveSeat)?;
        info!("{} stands", self.players[seat].name());
        self.advance_turn(seat);
        Ok(())
    }

    /// Reveals the hole card and draws by the house rule until the dealer
    /// stands. The dealer does not draw when nobody is left to settle.
    /// Returns the cards drawn.
    #[allowed_phase(DealerResolution)]
    pub fn dealer_plays(&mut self) -> Result<Vec<Card>, GameError> {
        self.dealer.hand_mut().reveal_all();
        let mut drawn = Vec::new();
        if !self.dealt_in.is_empty() {
            while dealer_decision(self.dealer.hand().cards()) == DealerDecision::Draw {
                let mut card = self.draw_card()?;
                card.reveal();
                self.dealer.hand_mut().receive_card(card);
                drawn.push(card);
            }
        }
        info!(
            "dealer stands on {:?} after drawing {} cards",
            best_total(self.dealer.hand().cards()),
            drawn.len()
        );
        self.phase = GamePhase::Settlement;
        Ok(drawn)
    }

    /// Settles every hand still dealt in against the dealer, then clears the
    /// table for the next round.
    #[allowed_phase(Settlement)]
    pub fn settle(&mut self) -> Result<Vec<Settlement>, GameError> {
        let settlements = self.check_for_payouts(true)?;
        self.collect_cards();
        self.phase = GamePhase::AwaitingBets;
        Ok(settlements)
    }

    /// Exchanges chips in a seated player's stack between rounds.
    #[allowed_phase(AwaitingBets)]
    pub fn exchange_chips(
        &mut self,
        seat: usize,
        from: Denomination,
        to: Denomination,
        quantity: Option<u64>,
    ) -> Result<Exchange, GameError> {
        let exchange = self.player_mut(seat)?.chips_mut().exchange(from, to, quantity)?;
        Ok(exchange)
    }

    #[allowed_phase(AwaitingBets)]
    pub fn sort_chips(&mut self, seat: usize, bias: SortBias) -> Result<(), GameError> {
        self.player_mut(seat)?.chips_mut().sort(bias)?;
        Ok(())
    }

    /// Gives every pot back to its owner, discards all hands and returns to
    /// `AwaitingBets`. Works from any phase.
    pub fn abandon_round(&mut self) -> Result<(), GameError> {
        warn!("abandoning the round in {:?} phase", self.phase);
        for player in self.players.iter_mut() {
            if !player.pot().is_empty() {
                player.reclaim_pot()?;
            }
        }
        self.collect_cards();
        self.phase = GamePhase::AwaitingBets;
        Ok(())
    }

    pub fn perform(&mut self, action: Action) -> Result<ActionResult, GameError> {
        match action {
            Action::Hit => self.play_hit().map(ActionResult::Hit),
            Action::Stand => self.play_stand().map(|_| ActionResult::Stood),
            Action::ViewHand(seat) => self.render_hand(seat, false).map(ActionResult::Viewed),
            Action::Draw(seat) => {
                self.participant(seat)?;
                let mut card = self.draw_card()?;
                card.reveal();
                self.participant_mut(seat)?.hand_mut().receive_card(card);
                Ok(ActionResult::Drew(card))
            }
            Action::Discard(seat, card) => {
                let card = self
                    .participant_mut(seat)?
                    .hand_mut()
                    .remove_card(&card)
                    .ok_or(GameError::CardNotInHand(card))?;
                self.discard_pile.add(card);
                Ok(ActionResult::Discarded(card))
            }
            Action::Transfer { from, to, card } => {
                self.participant(to)?;
                let card = self
                    .participant_mut(from)?
                    .hand_mut()
                    .remove_card(&card)
                    .ok_or(GameError::CardNotInHand(card))?;
                self.participant_mut(to)?.hand_mut().receive_card(card);
                Ok(ActionResult::Transferred(card))
            }
        }
    }

    pub fn render_hand(&self, seat: Seat, all_visible: bool) -> Result<String, GameError> {
        Ok(display::render_hand(self.participant(seat)?.hand(), all_visible))
    }

    /// Runs one complete round: bets, dealing, the hit/stand loop of every
    /// player dealt in, the dealer's play and settlement. Returns every
    /// settlement of the round in the order they happened.
    #[allowed_phase(AwaitingBets)]
    pub fn play_round<P: Prompt, H: TableEventHandler>(
        &mut self,
        prompt: &mut P,
        handler: &mut H,
    ) -> Result<Vec<Settlement>, GameError> {
        handler.on_round_begin(self);
        for seat in 0..self.players.len() {
            let bets = self.allowed_bets(seat)?;
            let (Some(&lowest), Some(&highest)) = (bets.first(), bets.last()) else {
                handler.on_sit_out(self, seat);
                continue;
            };
            let mut allowed = vec![String::from("0")];
            allowed.extend(bets.iter().map(|bet| bet.to_string()));
            let message = format!(
                "{}, place your bet (${} to ${} in steps of ${}, 0 to sit out): ",
                self.players[seat].name(),
                lowest,
                highest,
                self.rule.min_buy_in
            );
            let choice = prompt
                .prompt_choice(&message, &allowed)
                .ok_or(GameError::InputClosed)?;
            let amount: u64 = choice
                .parse()
                .map_err(|_| GameError::InvalidChoice(choice.clone()))?;
            if amount == 0 {
                handler.on_sit_out(self, seat);
                continue;
            }
            self.place_bet(seat, amount)?;
            handler.on_bet_placed(self, seat, amount);
        }
        self.close_betting()?;

        let mut settlements = self.deal_initial_cards()?;
        handler.on_cards_dealt(self);
        for settlement in &settlements {
            handler.on_settlement(self, settlement);
        }

        let choices: Vec<String> = PLAYER_KEYWORDS.iter().map(|s| s.to_string()).collect();
        while let Some(seat) = self.active_seat {
            let message = format!("{}, hit, stand or view? ", self.players[seat].name());
            let choice = prompt
                .prompt_choice(&message, &choices)
                .ok_or(GameError::InputClosed)?;
            let action = Action::from_keyword(&choice, seat)
                .ok_or_else(|| GameError::InvalidChoice(choice.clone()))?;
            match self.perform(action)? {
                ActionResult::Hit(hit) => {
                    handler.on_player_card(self, seat, hit.card);
                    if let Some(settlement) = hit.settlement {
                        handler.on_settlement(self, &settlement);
                        settlements.push(settlement);
                    }
                }
                ActionResult::Viewed(rendered) => handler.on_view_hand(self, seat, &rendered),
                _ => {}
            }
        }

        let drawn = self.dealer_plays()?;
        handler.on_dealer_played(self, &drawn);
        let showdown = self.settle()?;
        for settlement in &showdown {
            handler.on_settlement(self, settlement);
        }
        settlements.extend(showdown);
        handler.on_round_end(self, &settlements);
        Ok(settlements)
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn denominations(&self) -> &DenominationTable {
        &self.denominations
    }

    pub fn players(&self) -> &[Participant] {
        &self.players
    }

    pub fn player(&self, seat: usize) -> Result<&Participant, GameError> {
        self.players.get(seat).ok_or(GameError::NoSuchSeat(seat))
    }

    pub fn dealer(&self) -> &Participant {
        &self.dealer
    }

    /// Seats still in play this round.
    pub fn dealt_in(&self) -> &BTreeSet<usize> {
        &self.dealt_in
    }

    pub fn active_seat(&self) -> Option<usize> {
        self.active_seat
    }

    pub fn draw_pile(&self) -> &CardPile {
        &self.draw_pile
    }

    pub fn discard_pile(&self) -> &CardPile {
        &self.discard_pile
    }

    fn player_mut(&mut self, seat: usize) -> Result<&mut Participant, GameError> {
        self.players.get_mut(seat).ok_or(GameError::NoSuchSeat(seat))
    }

    fn participant(&self, seat: Seat) -> Result<&Participant, GameError> {
        match seat {
            Seat::Player(seat) => self.player(seat),
            Seat::Dealer => Ok(&self.dealer),
        }
    }

    fn participant_mut(&mut self, seat: Seat) -> Result<&mut Participant, GameError> {
        match seat {
            Seat::Player(seat) => self.player_mut(seat),
            Seat::Dealer => Ok(&mut self.dealer),
        }
    }

    /// Settles every seat still dealt in that has reached a result. Before the
    /// end of the hand only busts and 21s count; at the end every hand is
    /// compared with the dealer's.
    fn check_for_payouts(&mut self, end_of_hand: bool) -> Result<Vec<Settlement>, GameError> {
        let mut settlements = Vec::new();
        let seats: Vec<usize> = self.dealt_in.iter().copied().collect();
        for seat in seats {
            if let Some(settlement) = self.check_for_payout(seat, end_of_hand)? {
                self.dealt_in.remove(&seat);
                settlements.push(settlement);
            }
        }
        Ok(settlements)
    }

    fn check_for_payout(
        &mut self,
        seat: usize,
        end_of_hand: bool,
    ) -> Result<Option<Settlement>, GameError> {
        let player = &mut self.players[seat];
        let dealer = &mut self.dealer;
        let cards = player.hand().cards();
        let pot = player.pot().value();

        let outcome = if is_bust(cards) {
            Outcome::Bust {
                lost: player.forfeit_pot(dealer)?,
            }
        } else if let Some(kind) = natural_blackjack(cards) {
            let payout = self.rule.blackjack_ratio(kind).calculate_payout(pot);
            dealer.pay(player, payout)?;
            player.reclaim_pot()?;
            Outcome::Blackjack { kind, payout }
        } else if !end_of_hand {
            return Ok(None);
        } else {
            let player_total = best_total(cards);
            let dealer_total = best_total(dealer.hand().cards());
            match (player_total, dealer_total) {
                (Some(mine), Some(theirs)) if mine < theirs => Outcome::Loss {
                    lost: player.forfeit_pot(dealer)?,
                },
                (Some(mine), Some(theirs)) if mine == theirs => Outcome::Push {
                    returned: player.reclaim_pot()?,
                },
                _ => {
                    let payout = self.rule.payout_win.calculate_payout(pot);
                    dealer.pay(player, payout)?;
                    player.reclaim_pot()?;
                    Outcome::Win { payout }
                }
            }
        };

        info!("{}: {:?}", player.name(), outcome);
        Ok(Some(Settlement { seat, outcome }))
    }

    fn advance_turn(&mut self, current: usize) {
        self.active_seat = self
            .dealt_in
            .range((Excluded(current), Unbounded))
            .next()
            .copied();
        if self.active_seat.is_none() {
            self.phase = GamePhase::DealerResolution;
        }
    }

    /// Draws the top card, shuffling the discard pile back in when the draw
    /// pile runs out.
    fn draw_card(&mut self) -> Result<Card, GameError> {
        if self.draw_pile.is_empty() {
            if self.discard_pile.is_empty() {
                return Err(GameError::OutOfCards);
            }
            self.draw_pile.append(&mut self.discard_pile);
            self.draw_pile.shuffle(&mut self.rng);
            debug!("reshuffled {} cards into the draw pile", self.draw_pile.len());
        }
        self.draw_pile.draw().ok_or(GameError::OutOfCards)
    }

    fn collect_cards(&mut self) {
        let hands = self
            .players
            .iter_mut()
            .chain(std::iter::once(&mut self.dealer))
            .flat_map(|participant| participant.hand_mut().clear());
        for card in hands.collect::<Vec<_>>() {
            self.discard_pile.add(card);
        }
        self.dealt_in.clear();
        self.active_seat = None;
    }
}

#[cfg(test)]
mod tests {
    use super::card::{Rank, Suit};
    use super::*;
    use std::collections::VecDeque;

    fn card(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    /// A one-player table dealing `cards` in order. With one player the deal
    /// goes player, dealer, player, dealer.
    fn stacked_table(cards: Vec<Card>) -> Table {
        let pile = CardPile::stacked(cards);
        let mut table =
            Table::with_draw_pile(&Rule::default(), pile, StdRng::seed_from_u64(1)).unwrap();
        table.seat_player("Alice").unwrap();
        table
    }

    fn bet_and_deal(table: &mut Table, amount: u64) -> Vec<Settlement> {
        table.place_bet(0, amount).unwrap();
        table.close_betting().unwrap();
        table.deal_initial_cards().unwrap()
    }

    #[test]
    fn test_allowed_phase() {
        let mut table = stacked_table(vec![]);
        assert_eq!(table.phase(), GamePhase::AwaitingBets);
        assert_eq!(
            table.play_hit(),
            Err(GameError::WrongPhase {
                operation: "play_hit",
                expected: GamePhase::PlayerActions,
                actual: GamePhase::AwaitingBets,
            })
        );
        assert!(matches!(
            table.settle(),
            Err(GameError::WrongPhase { .. })
        ));
    }

    #[test]
    fn should_reject_invalid_bets() {
        let mut table = stacked_table(vec![]);
        assert_eq!(
            table.place_bet(0, 4),
            Err(GameError::BetBelowMinimum { bet: 4, minimum: 5 })
        );
        assert_eq!(
            table.place_bet(0, 305),
            Err(GameError::BetExceedsStack {
                bet: 305,
                stack: 300
            })
        );
        assert_eq!(table.place_bet(3, 10), Err(GameError::NoSuchSeat(3)));
        assert_eq!(table.close_betting(), Err(GameError::NoBets));
        assert_eq!(table.player(0).unwrap().chips().value(), 300);
    }

    #[test]
    fn should_not_seat_more_than_max_players() {
        let rule = Rule {
            max_players: 2,
            ..Rule::default()
        };
        let mut table = Table::with_seed(&rule, 3).unwrap();
        assert_eq!(table.draw_pile().len(), 52);
        assert_eq!(table.seat_player("Alice"), Ok(0));
        assert_eq!(table.seat_player("Bob"), Ok(1));
        assert_eq!(table.seat_player("Carol"), Err(GameError::TableFull(2)));
        assert_eq!(table.player(1).unwrap().chips().label(), Some("Bob"));
    }

    #[test]
    fn allowed_bets_are_multiples_of_the_buy_in() {
        let table = stacked_table(vec![]);
        let bets = table.allowed_bets(0).unwrap();
        assert_eq!(bets.first(), Some(&5));
        assert_eq!(bets.last(), Some(&300));
        assert_eq!(bets.len(), 60);
    }

    #[test]
    fn natural_is_paid_when_dealt() {
        let mut table = stacked_table(vec![
            card(Rank::Ace, Suit::Spades),
            card(Rank::Nine, Suit::Clubs),
            card(Rank::King, Suit::Hearts),
            card(Rank::Seven, Suit::Diamonds),
        ]);
        let settlements = bet_and_deal(&mut table, 100);
        assert_eq!(
            settlements,
            vec![Settlement {
                seat: 0,
                outcome: Outcome::Blackjack {
                    kind: BlackjackKind::Natural,
                    payout: 100
                }
            }]
        );
        assert!(table.dealt_in().is_empty());
        assert_eq!(table.phase(), GamePhase::DealerResolution);

        // Nobody is left, so the dealer does not draw.
        assert!(table.dealer_plays().unwrap().is_empty());
        assert!(table.settle().unwrap().is_empty());
        assert_eq!(table.player(0).unwrap().chips().value(), 400);
        assert_eq!(table.dealer().chips().value(), 1_000_000 - 100);
        assert_eq!(table.discard_pile().len(), 4);
    }

    #[test]
    fn dealer_hole_card_stays_hidden_until_dealer_plays() {
        let mut table = stacked_table(vec![
            card(Rank::Ten, Suit::Spades),
            card(Rank::Ten, Suit::Hearts),
            card(Rank::Eight, Suit::Spades),
            card(Rank::Nine, Suit::Hearts),
        ]);
        bet_and_deal(&mut table, 20);
        let dealer_cards = table.dealer().hand().cards();
        assert!(dealer_cards[0].is_visible());
        assert!(!dealer_cards[1].is_visible());
        assert!(table.player(0).unwrap().hand().cards().iter().all(|c| c.is_visible()));

        table.play_stand().unwrap();
        table.dealer_plays().unwrap();
        assert!(table.dealer().hand().cards().iter().all(|c| c.is_visible()));
    }

    #[test]
    fn bust_on_hit_forfeits_the_pot() {
        let mut table = stacked_table(vec![
            card(Rank::Ten, Suit::Spades),
            card(Rank::Nine, Suit::Hearts),
            card(Rank::Six, Suit::Spades),
            card(Rank::Eight, Suit::Hearts),
            card(Rank::King, Suit::Clubs),
        ]);
        assert!(bet_and_deal(&mut table, 20).is_empty());
        assert_eq!(table.active_seat(), Some(0));

        let hit = table.play_hit().unwrap();
        assert_eq!(hit.card, card(Rank::King, Suit::Clubs));
        assert_eq!(
            hit.settlement,
            Some(Settlement {
                seat: 0,
                outcome: Outcome::Bust { lost: 20 }
            })
        );
        assert_eq!(table.phase(), GamePhase::DealerResolution);
        assert_eq!(table.active_seat(), None);
        assert_eq!(table.player(0).unwrap().chips().value(), 280);
        assert_eq!(table.dealer().chips().value(), 1_000_020);
    }

    #[test]
    fn dealer_bust_pays_three_to_two() {
        let mut table = stacked_table(vec![
            card(Rank::Ten, Suit::Spades),
            card(Rank::Ten, Suit::Hearts),
            card(Rank::Eight, Suit::Spades),
            card(Rank::Six, Suit::Hearts),
            card(Rank::King, Suit::Clubs),
        ]);
        bet_and_deal(&mut table, 20);
        table.play_stand().unwrap();
        assert_eq!(
            table.dealer_plays().unwrap(),
            vec![card(Rank::King, Suit::Clubs)]
        );
        let settlements = table.settle().unwrap();
        assert_eq!(
            settlements,
            vec![Settlement {
                seat: 0,
                outcome: Outcome::Win { payout: 30 }
            }]
        );
        assert_eq!(table.player(0).unwrap().chips().value(), 330);
        assert!(table.player(0).unwrap().pot().is_empty());
        assert_eq!(table.phase(), GamePhase::AwaitingBets);
    }

    #[test]
    fn higher_dealer_total_wins_the_pot() {
        let mut table = stacked_table(vec![
            card(Rank::Ten, Suit::Spades),
            card(Rank::Ten, Suit::Hearts),
            card(Rank::Seven, Suit::Spades),
            card(Rank::Nine, Suit::Hearts),
        ]);
        bet_and_deal(&mut table, 20);
        table.play_stand().unwrap();
        assert!(table.dealer_plays().unwrap().is_empty());
        assert_eq!(
            table.settle().unwrap(),
            vec![Settlement {
                seat: 0,
                outcome: Outcome::Loss { lost: 20 }
            }]
        );
        assert_eq!(table.player(0).unwrap().chips().value(), 280);
        assert_eq!(table.dealer().chips().value(), 1_000_020);
    }

    #[test]
    fn push_returns_the_pot() {
        let mut table = stacked_table(vec![
            card(Rank::Ten, Suit::Spades),
            card(Rank::Nine, Suit::Hearts),
            card(Rank::Eight, Suit::Spades),
            card(Rank::Nine, Suit::Clubs),
        ]);
        bet_and_deal(&mut table, 20);
        table.play_stand().unwrap();
        table.dealer_plays().unwrap();
        assert_eq!(
            table.settle().unwrap(),
            vec![Settlement {
                seat: 0,
                outcome: Outcome::Push { returned: 20 }
            }]
        );
        assert_eq!(table.player(0).unwrap().chips().value(), 300);
        assert_eq!(table.dealer().chips().value(), 1_000_000);
    }

    #[test]
    fn soft_dealer_draws_then_stands() {
        let mut table = stacked_table(vec![
            card(Rank::Ten, Suit::Spades),
            card(Rank::Ace, Suit::Hearts),
            card(Rank::Nine, Suit::Spades),
            card(Rank::Five, Suit::Hearts),
            card(Rank::Two, Suit::Clubs),
        ]);
        bet_and_deal(&mut table, 10);
        table.play_stand().unwrap();
        // {7, 16} draws, {9, 18} stands.
        assert_eq!(
            table.dealer_plays().unwrap(),
            vec![card(Rank::Two, Suit::Clubs)]
        );
        assert_eq!(
            table.settle().unwrap()[0].outcome,
            Outcome::Win { payout: 15 }
        );
        assert_eq!(table.player(0).unwrap().chips().value(), 315);
    }

    #[test]
    fn hitting_to_21_pays_the_blackjack_rate() {
        let mut table = stacked_table(vec![
            card(Rank::Seven, Suit::Spades),
            card(Rank::Ten, Suit::Hearts),
            card(Rank::Seven, Suit::Hearts),
            card(Rank::Eight, Suit::Hearts),
            card(Rank::Seven, Suit::Clubs),
        ]);
        bet_and_deal(&mut table, 10);
        let hit = table.play_hit().unwrap();
        assert_eq!(
            hit.settlement.map(|s| s.outcome),
            Some(Outcome::Blackjack {
                kind: BlackjackKind::TwentyOne,
                payout: 15
            })
        );
        assert_eq!(table.player(0).unwrap().chips().value(), 315);
    }

    #[test]
    fn turns_pass_between_players() {
        let pile = CardPile::stacked(vec![
            card(Rank::Ten, Suit::Spades),
            card(Rank::Ten, Suit::Hearts),
            card(Rank::Ten, Suit::Clubs),
            card(Rank::Eight, Suit::Spades),
            card(Rank::Seven, Suit::Hearts),
            card(Rank::Nine, Suit::Clubs),
        ]);
        let mut table =
            Table::with_draw_pile(&Rule::default(), pile, StdRng::seed_from_u64(1)).unwrap();
        table.seat_player("Alice").unwrap();
        table.seat_player("Bob").unwrap();
        table.place_bet(0, 10).unwrap();
        table.place_bet(1, 10).unwrap();
        table.close_betting().unwrap();
        table.deal_initial_cards().unwrap();

        assert_eq!(table.active_seat(), Some(0));
        table.play_stand().unwrap();
        assert_eq!(table.active_seat(), Some(1));
        assert_eq!(table.phase(), GamePhase::PlayerActions);
        table.play_stand().unwrap();
        assert_eq!(table.phase(), GamePhase::DealerResolution);

        table.dealer_plays().unwrap();
        let outcomes: Vec<Outcome> = table.settle().unwrap().iter().map(|s| s.outcome).collect();
        // Alice 18 and Bob 17 against the dealer's 19.
        assert_eq!(
            outcomes,
            vec![Outcome::Loss { lost: 10 }, Outcome::Loss { lost: 10 }]
        );
    }

    #[test]
    fn discard_pile_is_reshuffled_when_the_draw_pile_runs_out() {
        let mut table = stacked_table(vec![
            card(Rank::Ten, Suit::Spades),
            card(Rank::Ten, Suit::Hearts),
            card(Rank::Eight, Suit::Spades),
            card(Rank::Nine, Suit::Hearts),
        ]);
        bet_and_deal(&mut table, 10);
        table.play_stand().unwrap();
        table.dealer_plays().unwrap();
        table.settle().unwrap();
        assert!(table.draw_pile().is_empty());
        assert_eq!(table.discard_pile().len(), 4);

        bet_and_deal(&mut table, 10);
        assert_eq!(table.discard_pile().len(), 0);
        assert_eq!(table.player(0).unwrap().hand().len(), 2);
        assert_eq!(table.dealer().hand().len(), 2);
        assert_eq!(table.play_hit(), Err(GameError::OutOfCards));
    }

    #[test]
    fn abandoning_returns_every_pot() {
        let mut table = stacked_table(vec![
            card(Rank::Ten, Suit::Spades),
            card(Rank::Ten, Suit::Hearts),
            card(Rank::Eight, Suit::Spades),
            card(Rank::Nine, Suit::Hearts),
        ]);
        bet_and_deal(&mut table, 50);
        assert_eq!(table.player(0).unwrap().chips().value(), 250);

        table.abandon_round().unwrap();
        assert_eq!(table.phase(), GamePhase::AwaitingBets);
        assert_eq!(table.player(0).unwrap().chips().value(), 300);
        assert!(table.player(0).unwrap().hand().is_empty());
        assert!(table.dealer().hand().is_empty());
        assert_eq!(table.discard_pile().len(), 4);
        assert!(table.place_bet(0, 5).is_ok());
    }

    #[test]
    fn card_actions_move_cards_between_hands() {
        let ace = card(Rank::Ace, Suit::Spades);
        let mut table = stacked_table(vec![ace, card(Rank::Two, Suit::Hearts)]);

        assert_eq!(
            table.perform(Action::Draw(Seat::Player(0))),
            Ok(ActionResult::Drew(ace))
        );
        assert_eq!(
            table.perform(Action::Transfer {
                from: Seat::Player(0),
                to: Seat::Dealer,
                card: ace
            }),
            Ok(ActionResult::Transferred(ace))
        );
        assert!(table.player(0).unwrap().hand().is_empty());
        assert_eq!(table.dealer().hand().cards(), &[ace]);

        assert_eq!(
            table.perform(Action::Discard(Seat::Player(0), ace)),
            Err(GameError::CardNotInHand(ace))
        );
        assert_eq!(
            table.perform(Action::Discard(Seat::Dealer, ace)),
            Ok(ActionResult::Discarded(ace))
        );
        assert_eq!(table.discard_pile().len(), 1);
        assert_eq!(
            table.perform(Action::Draw(Seat::Player(4))),
            Err(GameError::NoSuchSeat(4))
        );
        assert!(matches!(
            table.perform(Action::Stand),
            Err(GameError::WrongPhase { .. })
        ));
    }

    #[test]
    fn view_hand_honours_visibility() {
        let mut table = stacked_table(vec![
            card(Rank::Ten, Suit::Spades),
            card(Rank::Ten, Suit::Hearts),
            card(Rank::Eight, Suit::Spades),
            card(Rank::Nine, Suit::Hearts),
        ]);
        bet_and_deal(&mut table, 10);
        let ActionResult::Viewed(dealer) = table.perform(Action::ViewHand(Seat::Dealer)).unwrap()
        else {
            panic!("expected a rendered hand");
        };
        assert!(dealer.ends_with("[??]"));
        let ActionResult::Viewed(player) =
            table.perform(Action::ViewHand(Seat::Player(0))).unwrap()
        else {
            panic!("expected a rendered hand");
        };
        assert!(!player.contains("[??]"));
    }

    #[test]
    fn chips_can_be_managed_between_rounds() {
        let mut table = stacked_table(vec![]);
        let exchange = table
            .exchange_chips(0, Denomination::new(100), Denomination::new(20), None)
            .unwrap();
        assert_eq!(exchange.gained, 5);
        assert_eq!(table.player(0).unwrap().chips().quantity(Denomination::new(20)), 6);

        table.sort_chips(0, SortBias::Low).unwrap();
        let chips = table.player(0).unwrap().chips();
        assert_eq!(chips.quantity(Denomination::new(1)), 300);
        assert_eq!(chips.value(), 300);
    }

    struct Scripted(VecDeque<&'static str>);

    impl Prompt for Scripted {
        fn prompt_choice(&mut self, _message: &str, allowed: &[String]) -> Option<String> {
            let answer = self.0.pop_front()?;
            assert!(allowed.iter().any(|choice| choice == answer));
            Some(answer.to_string())
        }
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl TableEventHandler for Recorder {
        fn on_bet_placed(&mut self, _table: &Table, seat: usize, amount: u64) {
            self.events.push(format!("bet {} {}", seat, amount));
        }

        fn on_player_card(&mut self, _table: &Table, seat: usize, _card: Card) {
            self.events.push(format!("card {}", seat));
        }

        fn on_view_hand(&mut self, _table: &Table, seat: usize, rendered: &str) {
            self.events.push(format!("view {} {}", seat, rendered.contains("[??]")));
        }

        fn on_settlement(&mut self, _table: &Table, settlement: &Settlement) {
            self.events.push(format!("{:?}", settlement.outcome));
        }
    }

    #[test]
    fn keywords_map_to_player_actions() {
        assert_eq!(Action::from_keyword("hit", 2), Some(Action::Hit));
        assert_eq!(Action::from_keyword("stand", 2), Some(Action::Stand));
        assert_eq!(
            Action::from_keyword("view", 2),
            Some(Action::ViewHand(Seat::Player(2)))
        );
        assert_eq!(Action::from_keyword("split", 2), None);
        assert!(PLAYER_KEYWORDS
            .iter()
            .all(|keyword| Action::from_keyword(keyword, 0).is_some()));
    }

    #[test]
    fn play_round_runs_a_whole_round() {
        let mut table = stacked_table(vec![
            card(Rank::Ten, Suit::Spades),
            card(Rank::Ten, Suit::Hearts),
            card(Rank::Two, Suit::Spades),
            card(Rank::Seven, Suit::Hearts),
            card(Rank::Six, Suit::Clubs),
        ]);
        let mut prompt = Scripted(VecDeque::from(["20", "view", "hit", "stand"]));
        let mut recorder = Recorder::default();

        let settlements = table.play_round(&mut prompt, &mut recorder).unwrap();
        // 18 against 17.
        assert_eq!(settlements.len(), 1);
        assert_eq!(settlements[0].outcome, Outcome::Win { payout: 30 });
        assert_eq!(
            recorder.events,
            vec!["bet 0 20", "view 0 false", "card 0", "Win { payout: 30 }"]
        );
        assert_eq!(table.phase(), GamePhase::AwaitingBets);
        assert_eq!(table.player(0).unwrap().chips().value(), 330);
    }

    #[test]
    fn play_round_fails_when_input_runs_out() {
        let mut table = stacked_table(vec![
            card(Rank::Ten, Suit::Spades),
            card(Rank::Ten, Suit::Hearts),
            card(Rank::Two, Suit::Spades),
            card(Rank::Seven, Suit::Hearts),
        ]);
        let mut prompt = Scripted(VecDeque::from(["20"]));
        let result = table.play_round(&mut prompt, &mut Recorder::default());
        assert_eq!(result, Err(GameError::InputClosed));
        assert_eq!(table.phase(), GamePhase::PlayerActions);

        table.abandon_round().unwrap();
        assert_eq!(table.player(0).unwrap().chips().value(), 300);
    }
}
