//! A refresh from a new address must succeed even when the sink is down.

use std::sync::Arc;
use std::time::{Duration, Instant};

use authgate_core::{
    MemorySessionStore, RefreshSecretManager, RotationEngine, RotationSettings, TokenCodec,
};
use authgate_events::WebhookNotifier;

#[tokio::test]
async fn refresh_from_new_ip_ignores_dead_sink() {
    // Nothing listens on the discard port in test environments.
    let (notifier, delivery) = WebhookNotifier::spawn("http://127.0.0.1:9/hook").unwrap();

    let params = argon2_params();
    let engine = RotationEngine::new(
        TokenCodec::new(b"events-test-secret"),
        RefreshSecretManager::with_params(params),
        Arc::new(MemorySessionStore::new()),
        Arc::new(notifier),
        RotationSettings {
            token_ttl: chrono::Duration::minutes(15),
            refresh_ttl: chrono::Duration::hours(48),
        },
    );

    let user_id = uuid::Uuid::new_v4();
    let pair = engine.issue(user_id, "agentA", "1.2.3.4").await.unwrap();

    let started = Instant::now();
    let rotated = engine
        .refresh(&pair.access_token, &pair.refresh_token, "agentA", "9.9.9.9")
        .await
        .expect("ip change must not fail the refresh");
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_ne!(rotated.refresh_token, pair.refresh_token);

    drop(engine);
    tokio::time::timeout(Duration::from_secs(15), delivery)
        .await
        .expect("delivery task should give up and stop")
        .unwrap();
}

fn argon2_params() -> argon2::Params {
    argon2::Params::new(1024, 1, 1, None).unwrap()
}
