use std::ops::ControlFlow;
use std::time::Duration;

use linkhop_core::{InvalidationSource, LongUrl, MappingStore, ShortCode, StoreError};
use linkhop_store::{RedisStore, StoreSettings};
use linkhop_test_infra::redis::RedisServer;

/// Test fixture that manages a Redis container using test-infra.
struct RedisFixture {
    #[allow(dead_code)]
    server: RedisServer,
    url: String,
}

impl RedisFixture {
    async fn start() -> Self {
        let server = RedisServer::start()
            .await
            .expect("Failed to start Redis container");
        let url = server.url(1).await.expect("Failed to get Redis url");
        Self { server, url }
    }

    async fn store(&self) -> RedisStore {
        RedisStore::connect(&self.url, StoreSettings::default())
            .await
            .expect("Failed to connect to Redis")
    }
}

fn code(s: &str) -> ShortCode {
    ShortCode::new_unchecked(s)
}

fn url(s: &str) -> LongUrl {
    LongUrl::new_unchecked(s)
}

#[tokio::test]
async fn test_set_if_absent_then_get() {
    let fixture = RedisFixture::start().await;
    let store = fixture.store().await;

    let err = store.get(&code("abcd1")).await.unwrap_err();
    assert!(err.is_not_found(), "Store should be empty initially");

    store
        .set_if_absent(&code("abcd1"), &url("http://example.com"))
        .await
        .unwrap();
    assert_eq!(
        store.get(&code("abcd1")).await.unwrap(),
        url("http://example.com")
    );
}

#[tokio::test]
async fn test_set_if_absent_does_not_overwrite() {
    let fixture = RedisFixture::start().await;
    let store = fixture.store().await;

    store
        .set_if_absent(&code("abcd1"), &url("http://first.com"))
        .await
        .unwrap();
    let err = store
        .set_if_absent(&code("abcd1"), &url("http://second.com"))
        .await
        .unwrap_err();

    assert_eq!(err, StoreError::AlreadyExists("abcd1".to_string()));
    assert_eq!(
        store.get(&code("abcd1")).await.unwrap(),
        url("http://first.com")
    );
}

#[tokio::test]
async fn test_delete_broadcasts_once() {
    let fixture = RedisFixture::start().await;
    let store = fixture.store().await;
    let mut subscription = InvalidationSource::connect(&store).await.unwrap();

    store
        .set_if_absent(&code("gone1"), &url("http://example.com"))
        .await
        .unwrap();
    assert!(store.delete(&code("gone1")).await.unwrap());
    assert!(!store.delete(&code("gone1")).await.unwrap());

    store
        .set_if_absent(&code("gone2"), &url("http://example.com"))
        .await
        .unwrap();
    assert!(store.delete(&code("gone2")).await.unwrap());

    let first = tokio::time::timeout(Duration::from_secs(5), subscription.next_message())
        .await
        .unwrap()
        .unwrap();
    let second = tokio::time::timeout(Duration::from_secs(5), subscription.next_message())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(first, "delete@gone1");
    assert_eq!(second, "delete@gone2");
}

#[tokio::test]
async fn test_subscription_ping() {
    let fixture = RedisFixture::start().await;
    let store = fixture.store().await;
    let mut subscription = InvalidationSource::connect(&store).await.unwrap();

    subscription.ping().await.unwrap();
    subscription.ping().await.unwrap();

    store
        .set_if_absent(&code("png01"), &url("http://example.com"))
        .await
        .unwrap();
    store.delete(&code("png01")).await.unwrap();

    let message = tokio::time::timeout(Duration::from_secs(5), subscription.next_message())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(message, "delete@png01");
}

#[tokio::test]
async fn test_scan_all_visits_every_mapping() {
    let fixture = RedisFixture::start().await;
    let store = fixture.store().await;

    for i in 0..250 {
        store
            .set_if_absent(&code(&format!("c{i:04}")), &url(&format!("http://{i}.com")))
            .await
            .unwrap();
    }

    let mut collected = Vec::new();
    let visited = store
        .scan_all(&mut |code, url| {
            collected.push((code, url));
            ControlFlow::Continue(())
        })
        .await
        .unwrap();

    assert_eq!(visited, 250);
    collected.sort();
    collected.dedup();
    assert_eq!(collected.len(), 250);
}

#[tokio::test]
async fn test_scan_all_early_exit() {
    let fixture = RedisFixture::start().await;
    let store = fixture.store().await;

    for i in 0..20 {
        store
            .set_if_absent(&code(&format!("c{i:04}")), &url("http://example.com"))
            .await
            .unwrap();
    }

    let visited = store
        .scan_all(&mut |_, _| ControlFlow::Break(()))
        .await
        .unwrap();
    assert_eq!(visited, 1);
}

#[tokio::test]
async fn test_connect_to_unreachable_server_fails() {
    let settings = StoreSettings::builder()
        .connect_timeout(Duration::from_millis(200))
        .op_timeout(Duration::from_millis(200))
        .build();

    let result = RedisStore::connect("redis://127.0.0.1:1/1", settings).await;
    assert!(matches!(result, Err(StoreError::Connection(_))));
}
