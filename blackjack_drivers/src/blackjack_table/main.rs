mod narrator;

use std::error::Error;
use std::io;

use blackjack::display::render_stack_table;
use blackjack::{GameError, Prompt, Rule, SortBias, Table};
use blackjack_drivers::{parse_config_from_file, Config, ConsolePrompt};
use clap::Parser;
use log::{error, info};

use self::narrator::Narrator;

const DEFAULT_CONFIG_PATH: &str = "~/.blackjack.yml";
const MENU: [&str; 5] = ["play", "chips", "exchange", "sort", "quit"];

#[derive(Debug, Parser)]
#[command(author, about, long_about = None)]
struct CommandLineArgs {
    /// The path of the config file
    #[arg(short, long, default_value_t = String::from(DEFAULT_CONFIG_PATH))]
    config: String,

    /// Seat a player with this name. Repeat for more players. Overrides the
    /// players of the config file
    #[arg(short, long = "player")]
    players: Vec<String>,

    /// Seed the shuffle for a reproducible game
    #[arg(short, long)]
    seed: Option<u64>,

    /// Log phase transitions and settlements
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = CommandLineArgs::parse();
    let default_filter = if args.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

/// The default config file is optional, an explicitly named one is not.
fn load_config(path: &str) -> Result<Config, Box<dyn Error>> {
    if path != DEFAULT_CONFIG_PATH {
        return Ok(parse_config_from_file(path)?);
    }
    let home_dir = home::home_dir().ok_or("Cannot find home directory")?;
    let config_file_path = home_dir.join(".blackjack.yml");
    if !config_file_path.is_file() {
        info!(
            "{} not found, using the built-in rules",
            config_file_path.display()
        );
        return Ok(Config::default());
    }
    let path = config_file_path
        .to_str()
        .ok_or("The config path is not valid UTF-8")?;
    Ok(parse_config_from_file(path)?)
}

fn run(args: CommandLineArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(&args.config)?;
    let sort_bias = config.table.sort_bias()?;
    let rule: Rule = config.rule.try_into()?;
    let players = if args.players.is_empty() {
        config.table.players
    } else {
        args.players
    };

    let mut table = match args.seed.or(config.table.seed) {
        Some(seed) => Table::with_seed(&rule, seed)?,
        None => Table::new(&rule)?,
    };
    for name in &players {
        table.seat_player(name)?;
    }

    let stdin = io::stdin();
    let mut prompt = ConsolePrompt::new(stdin.lock(), io::stdout());
    let mut narrator = Narrator::default();
    play_session(&mut table, &mut prompt, &mut narrator, sort_bias)
}

fn anyone_can_bet(table: &Table) -> bool {
    (0..table.players().len()).any(|seat| {
        table
            .allowed_bets(seat)
            .map(|bets| !bets.is_empty())
            .unwrap_or(false)
    })
}

fn play_session<P: Prompt>(
    table: &mut Table,
    prompt: &mut P,
    narrator: &mut Narrator,
    sort_bias: SortBias,
) -> Result<(), Box<dyn Error>> {
    let menu: Vec<String> = MENU.iter().map(|item| item.to_string()).collect();
    loop {
        if !anyone_can_bet(table) {
            println!(
                "Nobody can cover the ${} minimum bet. Thanks for playing!",
                table.rule().min_buy_in
            );
            return Ok(());
        }

        let Some(choice) = prompt.prompt_choice(
            "\n[play] a round, view [chips], [exchange] chips, [sort] chips or [quit]? ",
            &menu,
        ) else {
            return Ok(());
        };

        match choice.as_str() {
            "play" => match table.play_round(prompt, narrator) {
                Ok(_) => {
                    for seat in 0..table.players().len() {
                        table.sort_chips(seat, sort_bias)?;
                    }
                }
                Err(GameError::InputClosed) => {
                    table.abandon_round()?;
                    return Ok(());
                }
                Err(GameError::NoBets) => {
                    println!("Nobody placed a bet, so no cards were dealt.");
                }
                Err(e) => {
                    error!("round failed: {}", e);
                    println!("The round was called off and every bet returned.");
                    table.abandon_round()?;
                }
            },
            "chips" => {
                for player in table.players() {
                    println!("{}\n", render_stack_table(player.chips()));
                }
            }
            "exchange" => exchange_chips(table, prompt)?,
            "sort" => sort_chips(table, prompt)?,
            _ => return Ok(()),
        }
    }
}

/// Asks which player to act for. Skips the question with a single player.
fn choose_seat<P: Prompt>(table: &Table, prompt: &mut P) -> Option<usize> {
    let count = table.players().len();
    if count == 1 {
        return Some(0);
    }
    let seats: Vec<String> = (1..=count).map(|seat| seat.to_string()).collect();
    let names: Vec<String> = table
        .players()
        .iter()
        .enumerate()
        .map(|(seat, player)| format!("{}) {}", seat + 1, player.name()))
        .collect();
    let message = format!("Which player ({})? ", names.join(", "));
    let choice = prompt.prompt_choice(&message, &seats)?;
    choice.parse::<usize>().ok().map(|seat| seat - 1)
}

fn exchange_chips<P: Prompt>(table: &mut Table, prompt: &mut P) -> Result<(), Box<dyn Error>> {
    let Some(seat) = choose_seat(table, prompt) else {
        return Ok(());
    };
    let denominations = table.denominations().denominations();
    let listed: Vec<String> = denominations.iter().map(|d| d.to_string()).collect();
    let allowed: Vec<String> = denominations
        .iter()
        .flat_map(|d| [d.to_string(), d.value().to_string()])
        .collect();

    let message = format!("Exchange from ({})? ", listed.join(", "));
    let Some(from) = prompt.prompt_choice(&message, &allowed) else {
        return Ok(());
    };
    let message = format!("Exchange to ({})? ", listed.join(", "));
    let Some(to) = prompt.prompt_choice(&message, &allowed) else {
        return Ok(());
    };
    let from = table.denominations().parse(&from)?;
    let to = table.denominations().parse(&to)?;

    let held = table.player(seat)?.chips().quantity(from);
    let mut quantities = vec![String::from("all")];
    quantities.extend((1..=held).map(|quantity| quantity.to_string()));
    let message = format!("How many {} chips (1 to {}, or all)? ", from, held);
    let Some(quantity) = prompt.prompt_choice(&message, &quantities) else {
        return Ok(());
    };
    let quantity = match quantity.as_str() {
        "all" => None,
        number => Some(number.parse::<u64>()?),
    };

    match table.exchange_chips(seat, from, to, quantity) {
        Ok(exchange) => println!(
            "Exchanged {} {} chips for {} {} chips, ${} came back as change.",
            exchange.consumed, exchange.from, exchange.gained, exchange.to, exchange.remainder
        ),
        Err(GameError::Chip(e)) => println!("{}", e),
        Err(e) => return Err(e.into()),
    }
    println!("{}", table.player(seat)?.chips());
    Ok(())
}

fn sort_chips<P: Prompt>(table: &mut Table, prompt: &mut P) -> Result<(), Box<dyn Error>> {
    let Some(seat) = choose_seat(table, prompt) else {
        return Ok(());
    };
    let biases: Vec<String> = ["low", "high", "uniform"]
        .iter()
        .map(|bias| bias.to_string())
        .collect();
    let message = "Sort toward [low] or [high] chips, or leave them [uniform]? ";
    let Some(bias) = prompt.prompt_choice(message, &biases) else {
        return Ok(());
    };
    table.sort_chips(seat, bias.parse()?)?;
    println!("{}", table.player(seat)?.chips());
    Ok(())
}
