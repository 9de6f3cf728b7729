//! # Hangman Client Library
//!
//! A thin terminal pass-through for the game server. The client holds no game
//! state of its own: every line typed on stdin is sent to the server as a
//! command, and every line the server sends is printed as-is.
//!
//! ## Module Organization
//!
//! ### Network Module (`network`)
//! - TCP connection to the server
//! - Line relays in both directions, run concurrently
//! - Disconnect detection: end of stream from the server, or an empty
//!   line / end of input from the terminal
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::connect("127.0.0.1:8000").await?;
//!     client.run().await?;
//!     Ok(())
//! }
//! ```

pub mod network;
