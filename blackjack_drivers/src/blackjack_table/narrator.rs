use blackjack::display::render_hand;
use blackjack::evaluation::hand_totals;
use blackjack::game::card::Card;
use blackjack::{Outcome, Seat, Settlement, Table, TableEventHandler};

/// Narrates a round on stdout.
#[derive(Debug, Clone, Default)]
pub struct Narrator {
    round: u64,
}

fn name(table: &Table, seat: usize) -> &str {
    table.player(seat).map(|player| player.name()).unwrap_or("?")
}

/// Every total a hand can still play as, e.g. `7/16`, or `bust`.
fn describe_totals(cards: &[Card]) -> String {
    let playable: Vec<String> = hand_totals(cards)
        .into_iter()
        .filter(|&total| total <= 21)
        .map(|total| total.to_string())
        .collect();
    if playable.is_empty() {
        String::from("bust")
    } else {
        playable.join("/")
    }
}

fn print_player(table: &Table, seat: usize) {
    if let Ok(player) = table.player(seat) {
        println!(
            "{:>10}: {} ({})",
            player.name(),
            render_hand(player.hand(), false),
            describe_totals(player.hand().cards())
        );
    }
}

impl TableEventHandler for Narrator {
    fn on_round_begin(&mut self, table: &Table) {
        self.round += 1;
        println!();
        println!("=== Round {} ===", self.round);
        for player in table.players() {
            println!("{}", player.chips());
        }
    }

    fn on_sit_out(&mut self, table: &Table, seat: usize) {
        println!("{} sits this round out.", name(table, seat));
    }

    fn on_bet_placed(&mut self, table: &Table, seat: usize, amount: u64) {
        println!("{} bets ${}.", name(table, seat), amount);
    }

    fn on_cards_dealt(&mut self, table: &Table) {
        println!(
            "{:>10}: {}",
            "Dealer",
            render_hand(table.dealer().hand(), false)
        );
        for &seat in table.dealt_in() {
            print_player(table, seat);
        }
    }

    fn on_player_card(&mut self, table: &Table, seat: usize, card: Card) {
        println!("{} draws {}", name(table, seat), card);
        print_player(table, seat);
    }

    fn on_view_hand(&mut self, table: &Table, seat: usize, rendered: &str) {
        let totals = table
            .player(seat)
            .map(|player| describe_totals(player.hand().cards()))
            .unwrap_or_default();
        println!("{:>10}: {} ({})", name(table, seat), rendered, totals);
    }

    fn on_dealer_played(&mut self, table: &Table, drawn: &[Card]) {
        let hand = table.render_hand(Seat::Dealer, true).unwrap_or_default();
        println!(
            "{:>10}: {} ({}), drew {} card(s)",
            "Dealer",
            hand,
            describe_totals(table.dealer().hand().cards()),
            drawn.len()
        );
    }

    fn on_settlement(&mut self, table: &Table, settlement: &Settlement) {
        let who = name(table, settlement.seat);
        match settlement.outcome {
            Outcome::Blackjack { kind, payout } => {
                println!("{} has blackjack ({:?}) and wins ${}!", who, kind, payout)
            }
            Outcome::Bust { lost } => println!("{} busts and loses ${}.", who, lost),
            Outcome::Win { payout } => println!("{} beats the dealer and wins ${}.", who, payout),
            Outcome::Loss { lost } => println!("{} loses ${} to the dealer.", who, lost),
            Outcome::Push { returned } => println!("{} pushes, ${} returned.", who, returned),
        }
    }

    fn on_round_end(&mut self, table: &Table, _settlements: &[Settlement]) {
        for player in table.players() {
            println!("{}", player.chips());
        }
    }
}
