//! Concurrent circulation through the HTTP surface

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{app, Client};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_checkouts_lend_a_copy_once() {
    let client = Client::new(app());
    let copy_id = client.seed_copy("The Very Hungry Caterpillar").await;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let client = client.clone();
            let copy_id = copy_id.clone();
            tokio::spawn(async move {
                client
                    .post("/checkout", json!({ "copy_id": copy_id, "borrower_name": format!("Reader {}", i) }))
                    .await
                    .0
            })
        })
        .collect();

    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.unwrap());
    }

    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::CREATED).count(), 1);
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::BAD_REQUEST).count(), 7);

    let (_, active) = client.get("/loans?filter=active").await;
    assert_eq!(active.as_array().unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_registrations_get_distinct_identifiers() {
    let client = Client::new(app());

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.post("/children", json!({})).await })
        })
        .collect();

    let mut ids = std::collections::HashSet::new();
    for handle in handles {
        let (status, child) = handle.await.unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert!(ids.insert(child["emoji_id"].as_str().unwrap().to_string()));
    }
}
