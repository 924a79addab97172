use super::*;
use crate::Config;
use crate::identity::MemoryIdentityProvider;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod feed;

const EMAIL: &str = "reader@example.com";
const PASSWORD: &str = "secret1";

/// Feed URL nothing listens on
const CLOSED_FEED: &str = "http://127.0.0.1:9/feed.json";

/// Serve a feed with one article per title at `/feed.json`
async fn mock_feed(titles: &[&str]) -> MockServer {
    let server = MockServer::start().await;
    let articles: Vec<_> = titles
        .iter()
        .map(|title| {
            serde_json::json!({
                "title": title,
                "description": format!("{title} description"),
                "url": format!("https://example.com/{}", title.to_lowercase()),
                "publishedAt": "2024-01-05T10:00:00Z",
                "source": {"name": "CNN"}
            })
        })
        .collect();

    Mock::given(method("GET"))
        .and(path("/feed.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"status": "ok", "articles": articles})),
        )
        .mount(&server)
        .await;
    server
}

/// App backed by an in-memory provider with one account, session resolved
async fn create_test_app(feed_url: &str) -> (NewsApp, Arc<MemoryIdentityProvider>) {
    let mut config = Config::default();
    config.feed.url = feed_url.to_string();

    let provider = Arc::new(MemoryIdentityProvider::new());
    provider.add_account(EMAIL, PASSWORD).unwrap();

    let app = NewsApp::with_provider(config, provider.clone())
        .await
        .unwrap();
    tokio::time::timeout(Duration::from_secs(1), app.session().resolved())
        .await
        .unwrap();
    (app, provider)
}

/// Same as [`create_test_app`] but signed in
async fn create_signed_in_app(feed_url: &str) -> (NewsApp, Arc<MemoryIdentityProvider>) {
    let (app, provider) = create_test_app(feed_url).await;
    app.session().login(EMAIL, PASSWORD).await.unwrap();
    (app, provider)
}

/// Wait until no feed fetch is in flight
async fn feed_settled(app: &NewsApp) {
    let mut rx = app.feed().watch();
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| !s.is_loading))
        .await
        .unwrap()
        .unwrap();
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Send one request; an empty body reads as `Value::Null`
async fn send(app: &NewsApp, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = create_router(app.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, headers, json)
}

#[tokio::test]
async fn test_api_server_serves_until_shutdown() {
    let (app, _provider) = create_test_app(CLOSED_FEED).await;

    // Port 0 = OS assigns a free port
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let server = tokio::spawn(serve(listener, app.clone()));

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap();
    let response = client
        .get(format!("http://{address}/api/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    app.shutdown().await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server should stop after shutdown")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_shutdown_closes_open_event_streams() {
    let (app, _provider) = create_test_app(CLOSED_FEED).await;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let server = tokio::spawn(serve(listener, app.clone()));

    let events = reqwest::get(format!("http://{address}/api/events"))
        .await
        .unwrap();
    assert_eq!(events.status(), 200);

    app.shutdown().await.unwrap();
    tokio::time::timeout(Duration::from_secs(3), server)
        .await
        .expect("server should stop with an event stream open")
        .unwrap()
        .unwrap();

    // the body completes once the stream has ended
    tokio::time::timeout(Duration::from_secs(1), events.text())
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_spawn_api_server_method() {
    let (app, _provider) = create_test_app(CLOSED_FEED).await;

    let api_handle = app.spawn_api_server();
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Either the server is running or the default port was taken; both are fine here
    app.shutdown().await.unwrap();
    let _ = tokio::time::timeout(Duration::from_secs(5), api_handle).await;
}

#[tokio::test]
async fn test_cors_enabled() {
    let (app, _provider) = create_test_app(CLOSED_FEED).await;

    let request = Request::builder()
        .uri("/api/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let (status, headers, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(
        headers.contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_specific_origins() {
    let mut config = Config::default();
    config.feed.url = CLOSED_FEED.to_string();
    config.server.api.cors_origins = vec!["http://allowed.example".to_string()];
    let app = NewsApp::with_provider(config, Arc::new(MemoryIdentityProvider::new()))
        .await
        .unwrap();

    let allowed = Request::builder()
        .uri("/api/health")
        .header("Origin", "http://allowed.example")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = send(&app, allowed).await;
    assert_eq!(
        headers.get("access-control-allow-origin").unwrap(),
        "http://allowed.example"
    );

    let denied = Request::builder()
        .uri("/api/health")
        .header("Origin", "http://evil.example")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = send(&app, denied).await;
    assert!(!headers.contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_cors_disabled() {
    let mut config = Config::default();
    config.feed.url = CLOSED_FEED.to_string();
    config.server.api.cors_enabled = false;
    let app = NewsApp::with_provider(config, Arc::new(MemoryIdentityProvider::new()))
        .await
        .unwrap();

    let request = Request::builder()
        .uri("/api/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let (status, headers, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(!headers.contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_provider_side_sign_out_locks_protected_routes() {
    let server = mock_feed(&["Alpha"]).await;
    let (app, provider) = create_signed_in_app(&format!("{}/feed.json", server.uri())).await;

    let (status, _, _) = send(&app, get("/api/feed")).await;
    assert_eq!(status, StatusCode::OK);

    provider.expire_session();
    let mut rx = app.session().watch();
    tokio::time::timeout(Duration::from_secs(1), rx.wait_for(|s| s.identity.is_none()))
        .await
        .unwrap()
        .unwrap();

    let (status, _, body) = send(&app, get("/api/feed")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthorized");
}
