//! # Hangman Server Library
//!
//! This library provides the authoritative server for the multiplayer word
//! guessing game. Clients connect over a line-based text protocol, create and
//! join named games, and every guess outcome is broadcast to all players of
//! the game it was made in.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative State
//! The server holds the only copy of every active game and of the history of
//! finished games. Clients never see the secret word until a game is over;
//! they only receive the masked word after each guess.
//!
//! ### Client Management
//! Handles the complete lifecycle of client connections including:
//! - Connection id assignment (dense, starting at 0, never reused)
//! - Line-by-line command processing in arrival order
//! - Disconnection handling and removal from every game played
//!
//! ### Outcome Broadcasting
//! A guess produces one line that is delivered to every participant of the
//! game. Finishing guesses are delivered to the players recorded before the
//! game was moved to history.
//!
//! ## Architecture Design
//!
//! ### Single Critical Section
//! All connection tasks share one [`session::Session`]. A command is applied
//! end to end, including working out who receives which line, under one lock.
//! No two commands ever interleave their reads and writes of the store.
//! Writing to sockets happens after the lock is released.
//!
//! ### Pure Interpreter
//! [`commands::apply`] is a pure function of the store and one command. It
//! never performs I/O and never fails: malformed or invalid commands become
//! `error > ` replies and leave the store untouched.
//!
//! ## Module Organization
//!
//! ### Store Module (`store`)
//! Games, history entries and the connection id counter. No locking, no I/O.
//!
//! ### Commands Module (`commands`)
//! The command interpreter and its error taxonomy.
//!
//! ### Session Module (`session`)
//! The coordinator owning the store and the connection registry.
//!
//! ### Connection Module (`connection`)
//! The per-connection read loop and writer task.
//!
//! ### Network Module (`network`)
//! The TCP accept loop.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::bind("127.0.0.1:8000").await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod connection;
pub mod network;
pub mod session;
pub mod store;
