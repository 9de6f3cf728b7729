//! Command interpreter for the text protocol
//!
//! `apply` validates a single command against the store, mutates it in place
//! and returns the lines to deliver: broadcasts keyed by game name and an
//! optional direct reply to the issuing connection. It never performs I/O and
//! never fails: every protocol or domain error becomes an `error > ` reply
//! with no broadcasts and no mutation.

use crate::store::{ConnectionId, Game, GameStore, Outcome};
use log::debug;
use shared::ERROR_PREFIX;
use std::collections::HashMap;
use thiserror::Error;

const HELP_TEXT: &str = "commands:
help - list all commands
create: game_name word - creates new game
list - lists all active and previous games
join: game_name - joins a game
leave: game_name - leaves a game
guess: game_name char - guesses a character for a game";

/// Every way a command can be rejected
///
/// The display text is the reply sent after the `error > ` prefix. The
/// `GameNotFound` and `NotPlaying` texts are fixed strings kept for
/// compatibility with existing clients.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("args: {0}")]
    Usage(&'static str),
    #[error("no args expected")]
    UnexpectedArgs,
    #[error("game {0} already exists")]
    GameExists(String),
    #[error("invalid word '{0}'")]
    InvalidWord(String),
    #[error("fakegame doesnt exist")]
    GameNotFound(String),
    #[error("not playing game game2")]
    NotPlaying(String),
    #[error("can only guess one char at a time")]
    MultipleChars,
    #[error("not joined {0}")]
    NotJoined(String),
}

impl CommandError {
    pub fn reply(&self) -> String {
        format!("{}{}", ERROR_PREFIX, self)
    }
}

/// Lines produced by one command
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Message per game name, delivered to that game's participants
    pub broadcasts: HashMap<String, String>,
    /// Message for the issuing connection only
    pub reply: Option<String>,
}

impl CommandOutput {
    fn none() -> Self {
        Self::default()
    }

    fn reply(message: impl Into<String>) -> Self {
        Self {
            broadcasts: HashMap::new(),
            reply: Some(message.into()),
        }
    }

    fn broadcast(game_name: &str, message: String) -> Self {
        Self {
            broadcasts: HashMap::from([(game_name.to_string(), message)]),
            reply: None,
        }
    }
}

/// Applies one command issued by `connection_id` to the store
pub fn apply(
    store: &mut GameStore,
    command: &str,
    args: &[&str],
    connection_id: ConnectionId,
) -> CommandOutput {
    debug!("Client {} issued {} {:?}", connection_id, command, args);

    let result = match command {
        "help" => Ok(CommandOutput::reply(HELP_TEXT)),
        "create" => create_game(store, args),
        "list" => list_games(store, args),
        "join" => join_game(store, args, connection_id),
        "leave" => leave_game(store, args, connection_id),
        "guess" => guess(store, args, connection_id),
        _ => Err(CommandError::UnknownCommand(command.to_string())),
    };

    result.unwrap_or_else(|err| {
        debug!("Client {} command rejected: {:?}", connection_id, err);
        CommandOutput::reply(err.reply())
    })
}

fn create_game(store: &mut GameStore, args: &[&str]) -> Result<CommandOutput, CommandError> {
    let [name, word] = args else {
        return Err(CommandError::Usage("game_name word"));
    };

    if store.contains_name(name) {
        return Err(CommandError::GameExists(name.to_string()));
    }

    let cleaned = word.trim().to_lowercase();
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_lowercase()) {
        return Err(CommandError::InvalidWord(word.to_string()));
    }

    store.insert_game(*name, Game::new(cleaned));
    Ok(CommandOutput::none())
}

fn list_games(store: &GameStore, args: &[&str]) -> Result<CommandOutput, CommandError> {
    if !args.is_empty() {
        return Err(CommandError::UnexpectedArgs);
    }

    let mut lines = vec!["active:".to_string()];
    lines.extend(store.game_names().into_iter().map(|name| format!(" * {}", name)));
    lines.push("history:".to_string());
    lines.extend(
        store
            .history()
            .into_iter()
            .map(|entry| format!(" * {} ({})", entry.game_name, entry.outcome)),
    );

    Ok(CommandOutput::reply(lines.join("\n")))
}

fn join_game(
    store: &mut GameStore,
    args: &[&str],
    connection_id: ConnectionId,
) -> Result<CommandOutput, CommandError> {
    let [name] = args else {
        return Err(CommandError::Usage("game_name"));
    };

    let game = find_game(store, name)?;
    game.participants.insert(connection_id);
    Ok(CommandOutput::none())
}

fn leave_game(
    store: &mut GameStore,
    args: &[&str],
    connection_id: ConnectionId,
) -> Result<CommandOutput, CommandError> {
    let [name] = args else {
        return Err(CommandError::Usage("game_name"));
    };

    let game = find_game(store, name)?;
    if !game.participants.remove(&connection_id) {
        return Err(CommandError::NotPlaying(name.to_string()));
    }
    Ok(CommandOutput::none())
}

fn guess(
    store: &mut GameStore,
    args: &[&str],
    connection_id: ConnectionId,
) -> Result<CommandOutput, CommandError> {
    let [name, guess] = args else {
        return Err(CommandError::Usage("game_name char"));
    };

    let game = find_game(store, name)?;

    let mut chars = guess.chars();
    let (Some(letter), None) = (chars.next(), chars.next()) else {
        return Err(CommandError::MultipleChars);
    };

    if !game.is_participant(connection_id) {
        return Err(CommandError::NotJoined(name.to_string()));
    }

    game.guesses.insert(letter);

    let outcome = if game.is_won() {
        Some(Outcome::Won)
    } else if game.is_lost() {
        Some(Outcome::Lost)
    } else {
        None
    };

    let message = match outcome {
        Some(outcome) => {
            let message = format!("{}: {} {} (lives: {})", name, outcome, game.word, game.lives());
            store.finish_game(name, outcome);
            message
        }
        None => format!(
            "{}: {} ({}) (lives: {})",
            name,
            game.masked_word(),
            letter,
            game.lives()
        ),
    };

    Ok(CommandOutput::broadcast(name, message))
}

fn find_game<'a>(store: &'a mut GameStore, name: &str) -> Result<&'a mut Game, CommandError> {
    store
        .game_mut(name)
        .ok_or_else(|| CommandError::GameNotFound(name.to_string()))
}
