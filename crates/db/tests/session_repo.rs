//! Integration tests for `SessionRepo` and `PgSessionStore`.
//!
//! These need a PostgreSQL server reachable through `DATABASE_URL`; run them
//! with `cargo test -p authgate-db -- --ignored`.

use authgate_core::session::{NewSession, SessionStore};
use authgate_db::models::session::CreateSession;
use authgate_db::repositories::SessionRepo;
use authgate_db::PgSessionStore;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

fn create_input(user_id: Uuid, hash: &str, created_offset_secs: i64) -> CreateSession {
    let created_at = Utc::now() + Duration::seconds(created_offset_secs);
    CreateSession {
        user_id,
        refresh_token_hash: hash.to_string(),
        user_agent: "agentA".to_string(),
        ip: "1.2.3.4".to_string(),
        created_at,
        expires_at: created_at + Duration::hours(48),
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn create_returns_inserted_row(pool: PgPool) {
    let user_id = Uuid::new_v4();
    let row = SessionRepo::create(&pool, &create_input(user_id, "hash-1", 0))
        .await
        .expect("insert should succeed");

    assert_eq!(row.user_id, user_id);
    assert_eq!(row.refresh_token_hash, "hash-1");
    assert_eq!(row.user_agent, "agentA");
    assert_eq!(row.ip, "1.2.3.4");
    assert!(row.expires_at > row.created_at);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn create_replaces_previous_session(pool: PgPool) {
    let user_id = Uuid::new_v4();
    SessionRepo::create(&pool, &create_input(user_id, "old", 0))
        .await
        .unwrap();
    let newest = SessionRepo::create(&pool, &create_input(user_id, "new", 1))
        .await
        .unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);

    let latest = SessionRepo::find_latest_by_user(&pool, user_id)
        .await
        .unwrap()
        .expect("session should exist");
    assert_eq!(latest.id, newest.id);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn latest_lookup_orders_by_creation_time(pool: PgPool) {
    let user_id = Uuid::new_v4();
    // Bypass the replace-on-create transaction to get two rows.
    for (hash, offset) in [("newer", 10_i64), ("older", 0)] {
        let input = create_input(user_id, hash, offset);
        sqlx::query(
            "INSERT INTO sessions (user_id, refresh_token_hash, user_agent, ip, created_at, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(input.user_id)
        .bind(&input.refresh_token_hash)
        .bind(&input.user_agent)
        .bind(&input.ip)
        .bind(input.created_at)
        .bind(input.expires_at)
        .execute(&pool)
        .await
        .unwrap();
    }

    let latest = SessionRepo::find_latest_by_user(&pool, user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(latest.refresh_token_hash, "newer");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn delete_is_compare_and_delete(pool: PgPool) {
    let row = SessionRepo::create(&pool, &create_input(Uuid::new_v4(), "h", 0))
        .await
        .unwrap();

    assert!(SessionRepo::delete(&pool, row.id).await.unwrap());
    assert!(!SessionRepo::delete(&pool, row.id).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn delete_all_and_expired(pool: PgPool) {
    let live_user = Uuid::new_v4();
    SessionRepo::create(&pool, &create_input(live_user, "live", 0))
        .await
        .unwrap();

    let stale_user = Uuid::new_v4();
    let mut stale = create_input(stale_user, "stale", -7200);
    stale.expires_at = Utc::now() - Duration::hours(1);
    SessionRepo::create(&pool, &stale).await.unwrap();

    assert_eq!(SessionRepo::delete_expired(&pool, Utc::now()).await.unwrap(), 1);
    assert_eq!(
        SessionRepo::delete_all_for_user(&pool, live_user).await.unwrap(),
        1
    );
    assert_eq!(
        SessionRepo::delete_all_for_user(&pool, live_user).await.unwrap(),
        0
    );
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn store_round_trips_domain_sessions(pool: PgPool) {
    let store = PgSessionStore::new(pool);
    store.ping().await.expect("database should answer");

    let user_id = Uuid::new_v4();
    let now = Utc::now();
    let created = store
        .create(NewSession {
            user_id,
            refresh_token_hash: "$argon2id$stub".into(),
            user_agent: "agentA".into(),
            ip: "1.2.3.4".into(),
            created_at: now,
            expires_at: now + Duration::hours(1),
        })
        .await
        .unwrap();

    let found = store.find_latest_by_user(user_id).await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert!(store.delete(created.id).await.unwrap());
    assert!(store.find_latest_by_user(user_id).await.unwrap().is_none());
}
