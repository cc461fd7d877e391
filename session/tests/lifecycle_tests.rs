use std::sync::Arc;

use uuid::Uuid;

use session::{Db, ManualClock, SessionHandler, SqlSessionStore};

const T0: i64 = 1_700_000_000;
const DAY: u64 = 86_400;

/// Isolated shared-cache in-memory SQLite database per test.
async fn setup_db() -> Db {
    let db_name = Uuid::new_v4().simple().to_string();
    let conn_str = format!("sqlite:file:{}?mode=memory&cache=shared", db_name);

    Db::connect(&conn_str).await.unwrap()
}

async fn setup_store(max_age_secs: u64) -> (SqlSessionStore, Arc<ManualClock>) {
    let db = setup_db().await;
    let clock = Arc::new(ManualClock::new(T0));
    let store = SqlSessionStore::with_clock(db, "sessions", max_age_secs, clock.clone())
        .await
        .unwrap();
    (store, clock)
}

#[tokio::test]
async fn gc_removes_sessions_older_than_max_age() {
    let (store, clock) = setup_store(DAY).await;

    assert!(store.write("abc", "payload").await);

    clock.advance(DAY as i64 + 1);
    assert!(store.gc(DAY).await);

    assert_eq!(store.read("abc").await, "");
}

#[tokio::test]
async fn gc_keeps_sessions_at_exactly_max_age() {
    let (store, clock) = setup_store(DAY).await;

    assert!(store.write("abc", "payload").await);

    clock.advance(DAY as i64);
    assert!(store.gc(DAY).await);

    assert_eq!(store.read("abc").await, "payload");
}

#[tokio::test]
async fn gc_uses_caller_lifetime_not_store_default() {
    let (store, clock) = setup_store(DAY).await;

    assert!(store.write("abc", "payload").await);
    clock.advance(100);

    // within the store default, but past the caller's lifetime
    assert!(store.gc(50).await);
    assert_eq!(store.read("abc").await, "");
}

#[tokio::test]
async fn gc_on_empty_table_succeeds() {
    let (store, _) = setup_store(DAY).await;
    assert!(store.gc(0).await);
}

#[tokio::test]
async fn gc_spares_recently_written_sessions() {
    let (store, clock) = setup_store(DAY).await;

    assert!(store.write("old", "o").await);
    clock.advance(1_000);
    assert!(store.write("new", "n").await);
    clock.advance(1);

    assert!(store.gc(1_000).await);

    assert_eq!(store.read("old").await, "");
    assert_eq!(store.read("new").await, "n");
}

#[tokio::test]
async fn rewrite_refreshes_expiry() {
    let (store, clock) = setup_store(100).await;

    assert!(store.write("abc", "v1").await);
    clock.advance(90);
    assert!(store.write("abc", "v2").await);
    clock.advance(90);

    assert!(store.gc(100).await);
    assert_eq!(store.read("abc").await, "v2");
}

#[tokio::test]
async fn open_sweeps_with_default_max_age() {
    let (store, clock) = setup_store(3_600).await;

    assert!(store.write("abc", "payload").await);
    clock.advance(3_601);

    assert!(store.open("/var/lib/php/sessions", "PHPSESSID").await);
    assert_eq!(store.read("abc").await, "");
}

#[tokio::test]
async fn open_keeps_fresh_sessions_and_succeeds_on_empty_sweep() {
    let (store, clock) = setup_store(3_600).await;

    assert!(store.open("", "PHPSESSID").await);

    assert!(store.write("abc", "payload").await);
    clock.advance(10);

    assert!(store.open("", "PHPSESSID").await);
    assert_eq!(store.read("abc").await, "payload");
}

#[tokio::test]
async fn open_and_gc_agree_on_what_is_expired() {
    let (by_open, clock_a) = setup_store(500).await;
    let (by_gc, clock_b) = setup_store(500).await;

    for (store, clock) in [(&by_open, &clock_a), (&by_gc, &clock_b)] {
        assert!(store.write("stale", "s").await);
        clock.advance(200);
        assert!(store.write("fresh", "f").await);
        clock.advance(400);
    }

    assert!(by_open.open("", "PHPSESSID").await);
    assert!(by_gc.gc(500).await);

    for store in [&by_open, &by_gc] {
        assert_eq!(store.read("stale").await, "");
        assert_eq!(store.read("fresh").await, "f");
    }
}

#[tokio::test]
async fn close_always_returns_true() {
    let (store, _) = setup_store(DAY).await;

    assert!(store.close().await);
    assert!(store.close().await);
    assert!(!store.is_active());
}

#[tokio::test]
async fn closed_store_refuses_work_until_reopened() {
    let (store, _) = setup_store(DAY).await;

    assert!(store.write("abc", "before close").await);
    assert!(store.close().await);

    assert_eq!(store.read("abc").await, "");
    assert!(!store.write("abc", "while closed").await);
    assert!(!store.destroy("abc").await);
    assert!(!store.gc(DAY).await);

    assert!(store.open("", "PHPSESSID").await);
    assert!(store.is_active());

    assert_eq!(store.read("abc").await, "before close");
    assert!(store.write("abc", "after reopen").await);
    assert_eq!(store.read("abc").await, "after reopen");
}

#[tokio::test]
async fn full_episode_through_trait_object() {
    let (store, clock) = setup_store(DAY).await;
    let handler: Arc<dyn SessionHandler> = Arc::new(store);

    // request 1: new session
    assert!(handler.open("", "PHPSESSID").await);
    assert_eq!(handler.read("sid1").await, "");
    assert!(handler.write("sid1", "count|i:1;").await);
    assert!(handler.close().await);

    // request 2: existing session
    clock.advance(60);
    assert!(handler.open("", "PHPSESSID").await);
    assert_eq!(handler.read("sid1").await, "count|i:1;");
    assert!(handler.write("sid1", "count|i:2;").await);
    assert!(handler.close().await);

    // request 3: logout
    assert!(handler.open("", "PHPSESSID").await);
    assert!(handler.destroy("sid1").await);
    assert!(handler.close().await);

    assert!(handler.open("", "PHPSESSID").await);
    assert_eq!(handler.read("sid1").await, "");
    assert!(handler.close().await);
}
