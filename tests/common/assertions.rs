//! Custom test assertions for integration tests

use findnews::NewsApp;
use std::time::Duration;

/// Wait until the feed has no fetch in flight
pub async fn wait_for_feed(app: &NewsApp, timeout: Duration) {
    let mut rx = app.feed().watch();
    tokio::time::timeout(timeout, rx.wait_for(|state| !state.is_loading))
        .await
        .expect("feed did not settle in time")
        .expect("feed store dropped");
}
