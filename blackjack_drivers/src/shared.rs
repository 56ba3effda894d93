use blackjack::{ChipError, DenominationTable, GameError, Prompt, SortBias};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Rule(#[from] GameError),

    #[error(transparent)]
    Chip(#[from] ChipError),

    #[error("invalid sort bias: {0}")]
    SortBias(#[from] serde::de::value::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rule: ConfigRule,
    pub table: ConfigTable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigRule {
    pub number_of_decks: u8,
    pub min_buy_in: u64,
    pub max_players: usize,
    pub denominations: Vec<u32>,
    pub player_stake: Option<u64>,
    pub house_stake: u64,

    pub payout_natural: String,
    pub payout_blackjack: String,
    pub payout_win: String,
}

impl Default for ConfigRule {
    fn default() -> Self {
        let rule = blackjack::Rule::default();
        ConfigRule {
            number_of_decks: rule.number_of_decks,
            min_buy_in: rule.min_buy_in,
            max_players: rule.max_players,
            denominations: rule
                .denominations
                .denominations()
                .iter()
                .map(|d| d.value() as u32)
                .collect(),
            player_stake: rule.player_stake,
            house_stake: rule.house_stake,
            payout_natural: rule.payout_natural.to_string(),
            payout_blackjack: rule.payout_blackjack.to_string(),
            payout_win: rule.payout_win.to_string(),
        }
    }
}

impl TryInto<blackjack::Rule> for ConfigRule {
    type Error = ConfigError;

    fn try_into(self) -> Result<blackjack::Rule, Self::Error> {
        let blackjack_rule = blackjack::Rule {
            number_of_decks: self.number_of_decks,
            min_buy_in: self.min_buy_in,
            max_players: self.max_players,
            denominations: DenominationTable::new(&self.denominations)?,
            player_stake: self.player_stake,
            house_stake: self.house_stake,
            payout_natural: self.payout_natural.parse()?,
            payout_blackjack: self.payout_blackjack.parse()?,
            payout_win: self.payout_win.parse()?,
        };
        blackjack_rule.validate()?;

        Ok(blackjack_rule)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigTable {
    pub players: Vec<String>,
    pub seed: Option<u64>,
    /// How every stack is tidied after a round: `low`, `high` or `uniform`.
    pub sort_bias: String,
}

impl Default for ConfigTable {
    fn default() -> Self {
        ConfigTable {
            players: vec![String::from("Player")],
            seed: None,
            sort_bias: String::from("high"),
        }
    }
}

impl ConfigTable {
    pub fn sort_bias(&self) -> Result<SortBias, ConfigError> {
        Ok(self.sort_bias.parse()?)
    }
}

/// Reads the content of a given config file and parses it to a Config.
pub fn parse_config_from_file(filename: &str) -> Result<Config, ConfigError> {
    let file_content = fs::read_to_string(filename).map_err(|source| ConfigError::Io {
        path: filename.to_string(),
        source,
    })?;
    parse_config(&file_content)
}

pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    Ok(serde_yaml::from_str(content)?)
}

/// Choices are only listed back to the user when there are this few.
const MAX_LISTED_CHOICES: usize = 8;

/// Line based input collaborator. Asks again until the answer is one of the
/// allowed choices; answers are trimmed and lowercased first.
pub struct ConsolePrompt<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        ConsolePrompt { input, output }
    }
}

impl<R: BufRead, W: Write> Prompt for ConsolePrompt<R, W> {
    fn prompt_choice(&mut self, message: &str, allowed: &[String]) -> Option<String> {
        loop {
            write!(self.output, "{}", message).ok()?;
            self.output.flush().ok()?;

            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) | Err(_) => return None,
                Ok(_) => {}
            }
            let answer = line.trim().to_lowercase();
            if allowed.iter().any(|choice| *choice == answer) {
                return Some(answer);
            }

            debug!("rejected input {:?}", answer);
            if allowed.len() <= MAX_LISTED_CHOICES {
                writeln!(self.output, "Please enter one of: {}", allowed.join(", ")).ok()?;
            } else {
                writeln!(self.output, "{:?} is not a valid choice", answer).ok()?;
            }
        }
    }
}
