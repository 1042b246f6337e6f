use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use linkhop_cache::ConfiguredCache;
use linkhop_core::MappingStore;
use linkhop_gateway::{App, AppState};
use linkhop_generator::RandomGenerator;
use linkhop_repository::{Repository, RepositorySettings};
use linkhop_store::MemoryStore;
use tower::ServiceExt;

const HOST: &str = "hop.test";

fn router_with(store: Option<Arc<dyn MappingStore>>) -> Router {
    router_with_cache(ConfiguredCache::new(None), store)
}

fn router_with_cache(cache: ConfiguredCache, store: Option<Arc<dyn MappingStore>>) -> Router {
    let repository = Repository::new(
        cache,
        RandomGenerator::new(),
        store,
        RepositorySettings::default(),
    )
    .unwrap();
    App::router(AppState::new(Arc::new(repository), "http", HOST))
}

fn router() -> Router {
    router_with(None)
}

fn form(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Creates a link and returns its code.
async fn create(app: &Router, long: &str) -> String {
    let response = app
        .clone()
        .oneshot(form("/new", &format!("long={long}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let link = body_text(response).await;
    let prefix = format!("http://{HOST}/");
    assert!(link.starts_with(&prefix), "unexpected link {link}");
    link[prefix.len()..].to_string()
}

#[tokio::test]
async fn create_then_redirect() {
    let app = router();
    let code = create(&app, "https%3A%2F%2Fexample.com%2Fa%3Fb%3D1").await;
    assert_eq!(code.len(), 5);

    let response = app.oneshot(get(&format!("/{code}"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers()[header::LOCATION],
        "https://example.com/a?b=1"
    );
}

#[tokio::test]
async fn create_normalizes_scheme() {
    let app = router();
    let code = create(&app, "example.com").await;

    let response = app.oneshot(get(&format!("/{code}"))).await.unwrap();
    assert_eq!(response.headers()[header::LOCATION], "http://example.com");
}

#[tokio::test]
async fn create_rejects_short_url() {
    let response = router().oneshot(form("/new", "long=ab")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "invalid long url");
}

#[tokio::test]
async fn unknown_code_is_not_found() {
    let response = router().oneshot(get("/zzzzz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_code_is_not_found() {
    let response = router().oneshot(get("/a-b")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_link() {
    let app = router();
    let code = create(&app, "example.com").await;

    let response = app
        .clone()
        .oneshot(form("/del", &format!("short=+{code}+")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");

    let response = app.oneshot(get(&format!("/{code}"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_unknown_code_is_ok() {
    let response = router().oneshot(form("/del", "short=abcde")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn delete_rejects_malformed_code() {
    let response = router().oneshot(form("/del", "short=no")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_reports_store_outage() {
    let store = MemoryStore::new();
    let app = router_with(Some(Arc::new(store.clone())));
    let code = create(&app, "example.com").await;

    store.set_available(false);
    let response = app.oneshot(form("/del", &format!("short={code}"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "delete error");
}

#[tokio::test]
async fn create_reports_store_outage() {
    let store = MemoryStore::new();
    store.set_available(false);
    let app = router_with(Some(Arc::new(store)));

    let response = app.oneshot(form("/new", "long=example.com")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "generate error");
}

#[tokio::test]
async fn bounded_cache_falls_back_to_store() {
    let store = MemoryStore::new();
    let app = router_with_cache(ConfiguredCache::new(Some(2)), Some(Arc::new(store)));

    let mut codes = Vec::new();
    for i in 0..6 {
        codes.push(create(&app, &format!("example.com/{i}")).await);
    }

    for (i, code) in codes.iter().enumerate() {
        let response = app.clone().oneshot(get(&format!("/{code}"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[header::LOCATION],
            format!("http://example.com/{i}").as_str()
        );
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let response = router().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, r#"{"status":"ok"}"#);
}

#[tokio::test]
async fn pages_are_served() {
    let app = router();

    let response = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("action=\"/new\""));

    let response = app.oneshot(get("/del")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("action=\"/del\""));
}
