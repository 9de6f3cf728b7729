//! In-memory store of active games, finished-game history and connection ids
//!
//! This module holds the authoritative game data for the server:
//! - Active games keyed by name, each with its secret word, guesses and participants
//! - Immutable history entries for games that have been won or lost
//! - The connection id counter handed out to every new connection
//!
//! The store performs no locking and no I/O. Callers are expected to hold
//! exclusive access (see `session::Session`) for the duration of any mutation.

use log::info;
use shared::GAME_LIVES;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Dense, strictly increasing identifier assigned to each connection
pub type ConnectionId = u32;

/// Final result of a finished game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Won => write!(f, "WON"),
            Outcome::Lost => write!(f, "LOST"),
        }
    }
}

/// Record of a finished game. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub game_name: String,
    pub outcome: Outcome,
}

/// An in-progress game
///
/// The word is lowercase alphabetic and non-empty; the guess set only grows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub word: String,
    pub guesses: HashSet<char>,
    pub participants: HashSet<ConnectionId>,
}

impl Game {
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            guesses: HashSet::new(),
            participants: HashSet::new(),
        }
    }

    /// Remaining lives: one is lost per distinct guessed character not in the word
    pub fn lives(&self) -> u32 {
        let misses = self
            .guesses
            .iter()
            .filter(|c| !self.word.contains(**c))
            .count() as u32;
        GAME_LIVES.saturating_sub(misses)
    }

    pub fn is_won(&self) -> bool {
        self.word.chars().all(|c| self.guesses.contains(&c))
    }

    pub fn is_lost(&self) -> bool {
        self.lives() == 0
    }

    /// The word with every unguessed character replaced by `_`
    pub fn masked_word(&self) -> String {
        self.word
            .chars()
            .map(|c| if self.guesses.contains(&c) { c } else { '_' })
            .collect()
    }

    pub fn is_participant(&self, connection_id: ConnectionId) -> bool {
        self.participants.contains(&connection_id)
    }
}

/// Authoritative mapping of games, history and the connection id counter
///
/// A name is a key in at most one of `games` and `history`.
#[derive(Debug, Default)]
pub struct GameStore {
    games: HashMap<String, Game>,
    history: HashMap<String, HistoryEntry>,
    next_connection_id: ConnectionId,
}

impl GameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out the next connection id. Ids start at 0 and are never reused.
    pub fn allocate_connection_id(&mut self) -> ConnectionId {
        let connection_id = self.next_connection_id;
        self.next_connection_id += 1;
        connection_id
    }

    /// True if the name is taken by an active or a finished game
    pub fn contains_name(&self, name: &str) -> bool {
        self.games.contains_key(name) || self.history.contains_key(name)
    }

    pub fn game(&self, name: &str) -> Option<&Game> {
        self.games.get(name)
    }

    pub fn game_mut(&mut self, name: &str) -> Option<&mut Game> {
        self.games.get_mut(name)
    }

    pub fn insert_game(&mut self, name: impl Into<String>, game: Game) {
        let name = name.into();
        info!("Game {} created", name);
        self.games.insert(name, game);
    }

    /// Removes an active game and records its outcome in history
    pub fn finish_game(&mut self, name: &str, outcome: Outcome) -> Option<Game> {
        let game = self.games.remove(name)?;
        info!("Game {} finished: {}", name, outcome);
        self.insert_history(HistoryEntry {
            game_name: name.to_string(),
            outcome,
        });
        Some(game)
    }

    pub fn insert_history(&mut self, entry: HistoryEntry) {
        self.history.insert(entry.game_name.clone(), entry);
    }

    pub fn history_entry(&self, name: &str) -> Option<&HistoryEntry> {
        self.history.get(name)
    }

    /// Active game names in sorted order
    pub fn game_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.games.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// History entries sorted by game name
    pub fn history(&self) -> Vec<&HistoryEntry> {
        let mut entries: Vec<&HistoryEntry> = self.history.values().collect();
        entries.sort_unstable_by(|a, b| a.game_name.cmp(&b.game_name));
        entries
    }

    /// Copy of one active game's participant set
    pub fn participants(&self, name: &str) -> Option<HashSet<ConnectionId>> {
        self.games.get(name).map(|game| game.participants.clone())
    }

    /// Drops a connection from every active game. History is untouched.
    pub fn remove_participant(&mut self, connection_id: ConnectionId) {
        for game in self.games.values_mut() {
            game.participants.remove(&connection_id);
        }
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}
