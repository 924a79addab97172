//! Feed payload fixtures and mock servers

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path the mock feed is served at
pub const FEED_PATH: &str = "/everything/cnn.json";

/// Feed payload shaped like the public NewsAPI mirror
pub fn feed_payload(count: usize) -> Value {
    let articles: Vec<Value> = (0..count)
        .map(|i| {
            let author = if i % 2 == 0 {
                Value::Null
            } else {
                Value::from(format!("Reporter {i}"))
            };
            let description = if i == 0 {
                "Climate summit opens".to_string()
            } else {
                format!("Description {i}")
            };
            // every third article has a blank image, as the real feed sometimes does
            let image = if i % 3 == 0 {
                String::new()
            } else {
                format!("https://cdn.cnn.com/{i}.jpg")
            };

            json!({
                "source": {"id": "cnn", "name": "CNN"},
                "author": author,
                "title": format!("Story {i}"),
                "description": description,
                "url": format!("https://edition.cnn.com/story-{i}"),
                "urlToImage": image,
                "publishedAt": format!("2024-01-{:02}T08:00:00Z", (i % 28) + 1),
                "content": "ignored"
            })
        })
        .collect();

    json!({
        "status": "ok",
        "totalResults": count,
        "articles": articles
    })
}

/// Mock server answering [`FEED_PATH`] with `count` articles
pub async fn start_feed_server(count: usize) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FEED_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(feed_payload(count)))
        .mount(&server)
        .await;
    server
}

/// Full feed URL on `server`
pub fn feed_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), FEED_PATH)
}
