//! End-to-end tests for the Energy War engine.

use energy_war::{BoardRenderer, Game, GameErrorKind, GameStatus, ProposedPlant, StrikeOutcome};

fn plant(kind: &str, cells: &[&str]) -> ProposedPlant {
    ProposedPlant::from_strs(kind, cells)
}

/// Two players on a 5x5 grid with a required capacity of 100.
fn ready_game() -> Game {
    let mut game = Game::new("scenario".to_string(), 5, 100, false).expect("Invalid game");
    game.join("alice", "a-secret".to_string()).expect("Join failed");
    game.join("bob", "b-secret".to_string()).expect("Join failed");

    game.set_board(
        "alice",
        &[
            plant("SOLAR", &["A1"]),
            plant("SOLAR", &["A3"]),
            plant("SOLAR", &["A5"]),
            plant("SOLAR", &["C1"]),
        ],
    )
    .expect("Alice's board rejected");
    game.set_board(
        "bob",
        &[
            plant("WIND", &["B2", "C2"]),
            plant("SOLAR", &["E5"]),
            plant("SOLAR", &["E1"]),
        ],
    )
    .expect("Bob's board rejected");

    assert!(!game.set_ready("bob").expect("Ready failed"));
    assert!(game.set_ready("alice").expect("Ready failed"));
    game
}

#[test]
fn test_scenario_until_win() {
    let mut game = ready_game();
    assert_eq!(*game.status(), GameStatus::InProgress);
    assert_eq!(game.turn(), "alice");

    assert_eq!(game.strike("alice", "bob", "C2").expect("Strike failed"), StrikeOutcome::Hit);
    let bob = game.player("bob").expect("bob");
    assert_eq!(*bob.capacity(), 50);
    assert_eq!(bob.board().hits().len(), 2);
    assert_eq!(game.turn(), "bob");

    assert_eq!(game.strike("bob", "alice", "B2").expect("Strike failed"), StrikeOutcome::Miss);
    assert_eq!(game.turn(), "alice");

    assert_eq!(game.strike("alice", "bob", "E5").expect("Strike failed"), StrikeOutcome::Hit);
    assert_eq!(*game.status(), GameStatus::InProgress);
    game.strike("bob", "alice", "A1").expect("Strike failed");

    assert_eq!(game.strike("alice", "bob", "E1").expect("Strike failed"), StrikeOutcome::Hit);
    assert_eq!(*game.status(), GameStatus::Ended);
    assert_eq!(game.winner().as_deref(), Some("alice"));

    let err = game.strike("bob", "alice", "A3").expect_err("Game is over");
    assert!(matches!(err.kind(), GameErrorKind::NotInProgress));
}

#[test]
fn test_maps_after_strikes() {
    let mut game = ready_game();
    game.strike("alice", "bob", "B2").expect("Strike failed");
    game.strike("bob", "alice", "D4").expect("Strike failed");

    let bob = game.player("bob").expect("bob").board();
    assert_eq!(
        BoardRenderer::render(bob, 5, false),
        ".....\n.X...\n.X...\n.....\nS...S\n"
    );
    assert_eq!(
        BoardRenderer::render(bob, 5, true),
        ".....\n.X...\n.X...\n.....\n.....\n"
    );

    let alice = game.player("alice").expect("alice").board();
    assert_eq!(
        BoardRenderer::render(alice, 5, false),
        "S.S.S\n.....\nS....\n...O.\n.....\n"
    );
}

#[test]
fn test_status_summary() {
    let mut game = ready_game();
    game.strike("alice", "bob", "E1").expect("Strike failed");

    let summary = game.to_string();
    assert!(summary.starts_with("Game ID: scenario\n"));
    assert!(summary.contains("Status: IN_PROGRESS\n"));
    assert!(summary.contains("Turn: bob\n"));
    assert!(summary.contains("- alice: Ready=true, Capacity=100/100\n"));
    assert!(summary.contains("- bob: Ready=true, Capacity=125/150\n"));
    assert!(!summary.contains("Winner"));
}

#[test]
fn test_pending_summary_omits_turn() {
    let game = Game::new("fresh".to_string(), 5, 100, false).expect("Invalid game");
    let summary = game.to_string();
    assert!(summary.contains("Status: PENDING"));
    assert!(!summary.contains("Turn:"));
}

#[test]
fn test_blind_view_never_reveals_plants() {
    let game = ready_game();
    for name in ["alice", "bob"] {
        let board = game.player(name).expect("player").board();
        let blind = BoardRenderer::blind_projection(board);
        assert!(blind.plants().is_empty());
        assert!(!BoardRenderer::render(board, 5, true).contains(['N', 'G', 'W', 'S']));
    }
}

#[test]
fn test_public_view_has_no_secrets() {
    let game = ready_game();
    let json = serde_json::to_string(&game.public_view()).expect("Serialize failed");
    assert!(!json.contains("a-secret"));
    assert!(!json.contains("b-secret"));
    assert!(!json.contains("plants"));
}
