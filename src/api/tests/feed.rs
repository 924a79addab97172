use super::*;

#[tokio::test]
async fn feed_requires_sign_in() {
    let server = mock_feed(&["Alpha"]).await;
    let (app, _provider) = create_test_app(&format!("{}/feed.json", server.uri())).await;

    let (status, _, body) = send(&app, get("/api/feed")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthorized");

    let (status, _, _) = send(&app, post("/api/feed/refresh")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn refresh_returns_article_count() {
    let server = mock_feed(&["Alpha", "Beta", "Gamma"]).await;
    let (app, _provider) = create_signed_in_app(&format!("{}/feed.json", server.uri())).await;

    let (status, _, body) = send(&app, post("/api/feed/refresh")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);

    let (status, _, body) = send(&app, get("/api/feed?q=gamma")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_matches"], 1);
    assert_eq!(body["sections"]["featured"]["title"], "Gamma");
}

#[tokio::test]
async fn refresh_failure_is_bad_gateway() {
    let (app, _provider) = create_signed_in_app(CLOSED_FEED).await;

    let (status, _, body) = send(&app, post("/api/feed/refresh")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "fetch_failed");

    let state = app.feed().state();
    assert!(state.articles.is_empty());
    assert_eq!(state.error, Some(crate::error::ErrorCategory::FetchFailed));
}

#[tokio::test]
async fn retry_after_failure_recovers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed.json"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/feed.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "ok",
            "articles": [{
                "title": "Back",
                "publishedAt": "2024-01-05T10:00:00Z",
                "source": {"name": "CNN"}
            }]
        })))
        .mount(&server)
        .await;
    let (app, _provider) = create_signed_in_app(&format!("{}/feed.json", server.uri())).await;

    let (status, _, _) = send(&app, post("/api/feed/refresh")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let (_, _, body) = send(&app, get("/api/feed")).await;
    assert_eq!(body["error"]["category"], "fetch_failed");

    let (status, _, _) = send(&app, post("/api/feed/refresh")).await;
    assert_eq!(status, StatusCode::OK);
    let (_, _, body) = send(&app, get("/api/feed")).await;
    assert!(body["error"].is_null());
    assert_eq!(body["sections"]["featured"]["title"], "Back");
}
