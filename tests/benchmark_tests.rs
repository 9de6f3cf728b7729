//! Performance benchmarks for the command interpreter and session

use server::commands::apply;
use server::session::Session;
use server::store::GameStore;
use std::time::Instant;
use tokio::sync::mpsc;

/// Benchmarks creating, joining and finishing many games
#[test]
fn benchmark_full_games() {
    let mut store = GameStore::new();
    let games = 10_000;
    let start = Instant::now();

    for i in 0..games {
        let name = format!("game{}", i);
        apply(&mut store, "create", &[name.as_str(), "hangman"], 0);
        apply(&mut store, "join", &[name.as_str()], 0);
        for c in ["h", "a", "n", "g", "m"] {
            apply(&mut store, "guess", &[name.as_str(), c], 0);
        }
    }

    let duration = start.elapsed();
    println!(
        "Full games: {} games in {:?} ({:.2} μs/game)",
        games,
        duration,
        duration.as_micros() as f64 / games as f64
    );

    assert!(store.is_empty());
    assert_eq!(store.history().len(), games);
    // Should complete in under 5 seconds
    assert!(duration.as_secs() < 5);
}

/// Benchmarks rejected commands, which must not touch the store
#[test]
fn benchmark_rejected_commands() {
    let mut store = GameStore::new();
    apply(&mut store, "create", &["g1", "cat"], 0);
    let iterations = 100_000;
    let start = Instant::now();

    for _ in 0..iterations {
        apply(&mut store, "guess", &["g1", "a"], 1);
    }

    let duration = start.elapsed();
    println!(
        "Rejected commands: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    assert!(store.game("g1").map_or(false, |g| g.guesses.is_empty()));
    assert!(duration.as_secs() < 5);
}

/// Benchmarks broadcast routing through the session with many participants
#[tokio::test]
async fn benchmark_broadcast_fanout() {
    let session = Session::new();
    let participants = 200;
    let guesses = "abcdefg";

    let mut receivers = Vec::new();
    let mut ids = Vec::new();
    for _ in 0..participants {
        let (tx, rx) = mpsc::unbounded_channel();
        ids.push(session.on_connect(tx).await);
        receivers.push(rx);
    }

    session.on_line(ids[0], "create big xyz").await;
    for &id in &ids {
        session.on_line(id, "join big").await;
    }

    let start = Instant::now();
    for c in guesses.chars() {
        session.on_line(ids[0], &format!("guess big {}", c)).await;
    }
    let duration = start.elapsed();
    println!(
        "Broadcast fanout: {} guesses to {} players in {:?}",
        guesses.len(),
        participants,
        duration
    );

    for rx in &mut receivers {
        let mut received = 0;
        while rx.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, guesses.len());
    }
    assert!(duration.as_secs() < 5);
}
