//! Tests for the game registry: persistence ordering, cache reloads and concurrency.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use energy_war::{
    DbError, Game, GameErrorKind, GameRegistry, GameStatus, GameStore, MemoryStore, ProposedPlant,
    TokenPolicy,
};

/// Store that can be told to fail every save.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_saves: AtomicBool,
}

impl GameStore for FlakyStore {
    fn create(&self, game: &Game) -> Result<(), DbError> {
        self.inner.create(game)
    }

    fn save(&self, game: &Game) -> Result<(), DbError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(DbError::new("disk unavailable"));
        }
        self.inner.save(game)
    }

    fn find_by_id(&self, id: &str) -> Result<Option<Game>, DbError> {
        self.inner.find_by_id(id)
    }

    fn list_public_pending(&self) -> Result<Vec<Game>, DbError> {
        self.inner.list_public_pending()
    }
}

fn solars(cells: &[&str]) -> Vec<ProposedPlant> {
    cells
        .iter()
        .map(|cell| ProposedPlant::from_strs("SOLAR", &[cell]))
        .collect()
}

#[test]
fn test_failed_save_leaves_cache_and_store_unchanged() {
    let store = Arc::new(FlakyStore::default());
    let registry = GameRegistry::new(store.clone(), TokenPolicy::default());
    let id = registry.create(5, 100, false).expect("Create failed").id().clone();
    registry.join(&id, "alice").expect("Join failed");

    store.fail_saves.store(true, Ordering::SeqCst);
    let err = registry.join(&id, "bob").expect_err("Save should fail");
    assert!(matches!(err.kind(), GameErrorKind::PersistenceFailure(_)));
    assert_eq!(err.code(), "PERSISTENCE_FAILURE");

    let cached = registry.get(&id).expect("Get failed");
    assert!(cached.player("bob").is_none());
    let stored = store.find_by_id(&id).expect("Find failed").expect("Game missing");
    assert_eq!(cached, stored);

    store.fail_saves.store(false, Ordering::SeqCst);
    registry.join(&id, "bob").expect("Join failed after recovery");
    assert!(registry.get(&id).expect("Get failed").player("bob").is_some());
}

#[test]
fn test_failed_strike_save_keeps_turn() {
    let store = Arc::new(FlakyStore::default());
    let registry = GameRegistry::new(store.clone(), TokenPolicy::default());
    let id = registry.create(5, 100, false).expect("Create failed").id().clone();
    for name in ["alice", "bob"] {
        registry.join(&id, name).expect("Join failed");
        registry
            .set_board(&id, name, &solars(&["A1", "A2", "A3", "A4"]))
            .expect("Board rejected");
        registry.set_ready(&id, name).expect("Ready failed");
    }

    store.fail_saves.store(true, Ordering::SeqCst);
    assert!(registry.strike(&id, "alice", "bob", "A1").is_err());

    let game = registry.get(&id).expect("Get failed");
    assert_eq!(game.turn(), "alice");
    assert!(game.player("bob").expect("bob").board().hits().is_empty());
}

#[test]
fn test_cache_miss_reloads_from_store() {
    let store = Arc::new(MemoryStore::new());
    let first = GameRegistry::new(store.clone(), TokenPolicy::default());
    let id = first.create(5, 100, true).expect("Create failed").id().clone();
    let secret = first.join(&id, "alice").expect("Join failed");

    let second = GameRegistry::new(store, TokenPolicy::default());
    let game = second.get(&id).expect("Game should load from store");
    assert_eq!(game.player("alice").expect("alice").token(), &secret);
    assert_eq!(second.secret(&id, "alice").expect("Secret failed"), secret);
}

#[test]
fn test_concurrent_joins_never_exceed_four_players() {
    let registry = GameRegistry::new(Arc::new(MemoryStore::new()), TokenPolicy::default());
    let id = registry.create(10, 1000, false).expect("Create failed").id().clone();

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let registry = registry.clone();
            let id = id.clone();
            thread::spawn(move || registry.join(&id, &format!("player{i:02}")))
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("Thread panicked"))
        .collect();

    let joined = results.iter().filter(|r| r.is_ok()).count();
    let full = results
        .iter()
        .filter(|r| matches!(r, Err(e) if matches!(e.kind(), GameErrorKind::GameFull(4))))
        .count();
    assert_eq!(joined, 4);
    assert_eq!(full, 12);
    assert_eq!(registry.get(&id).expect("Get failed").players().len(), 4);
}

#[test]
fn test_full_flow_through_registry() {
    let registry = GameRegistry::new(Arc::new(MemoryStore::new()), TokenPolicy::default());
    let id = registry.create(5, 25, false).expect("Create failed").id().clone();
    for name in ["alice", "bob"] {
        registry.join(&id, name).expect("Join failed");
        registry
            .set_board(&id, name, &solars(&["B2"]))
            .expect("Board rejected");
        registry.set_ready(&id, name).expect("Ready failed");
    }

    assert_eq!(registry.get(&id).expect("Get failed").turn(), "alice");
    registry.strike(&id, "alice", "bob", "B2").expect("Strike failed");

    let game = registry.get(&id).expect("Get failed");
    assert_eq!(*game.status(), GameStatus::Ended);
    assert_eq!(game.winner().as_deref(), Some("alice"));

    let blind = registry.blind_board(&id, "bob").expect("Blind board failed");
    assert!(blind.plants().is_empty());
    assert_eq!(blind.hits().len(), 1);
    assert_eq!(
        registry.render_board(&id, "bob", true).expect("Render failed"),
        ".....\n.X...\n.....\n.....\n.....\n"
    );
    assert_eq!(registry.board(&id, "bob").expect("Board failed").plants().len(), 1);
}

#[test]
fn test_repeat_strike_is_rejected_and_keeps_state() {
    let registry = GameRegistry::new(Arc::new(MemoryStore::new()), TokenPolicy::default());
    let id = registry.create(5, 100, false).expect("Create failed").id().clone();
    for name in ["alice", "bob"] {
        registry.join(&id, name).expect("Join failed");
        registry
            .set_board(&id, name, &solars(&["A1", "A2", "A3", "A4"]))
            .expect("Board rejected");
        registry.set_ready(&id, name).expect("Ready failed");
    }

    registry.strike(&id, "alice", "bob", "E5").expect("Strike failed");
    registry.strike(&id, "bob", "alice", "E5").expect("Strike failed");
    let before = registry.get(&id).expect("Get failed");

    let err = registry
        .strike(&id, "alice", "bob", "E5")
        .expect_err("Repeat strike should fail");
    assert!(matches!(err.kind(), GameErrorKind::AlreadyStruck(_)));
    assert_eq!(err.code(), "ALREADY_STRUCK");
    assert_eq!(registry.get(&id).expect("Get failed"), before);
}

#[test]
fn test_unknown_player_lookups() {
    let registry = GameRegistry::new(Arc::new(MemoryStore::new()), TokenPolicy::default());
    let id = registry.create(5, 100, false).expect("Create failed").id().clone();
    let err = registry.board(&id, "nobody").expect_err("No such player");
    assert!(matches!(err.kind(), GameErrorKind::PlayerNotFound(_)));
    let err = registry.secret("nope", "nobody").expect_err("No such game");
    assert!(matches!(err.kind(), GameErrorKind::NotFound(_)));
}
