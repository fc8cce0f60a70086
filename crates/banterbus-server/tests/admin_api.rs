mod common;

use banterbus_management::testing::StaticCatalog;
use banterbus_server::config::Settings;
use serde_json::Value;

use common::*;

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let server = TestServer::new().await;

    let resp = reqwest::get(format!("{}/health", server.base_url()))
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn sweep_removes_players_past_their_grace_period() {
    let settings = Settings {
        disconnect_timer_in_seconds: 0,
        ..Settings::default()
    };
    let server = TestServer::with(settings, StaticCatalog::default()).await;

    let mut host = ws_connect(&server).await;
    let room_code = create_room(&mut host).await;
    join_room(&mut host, &room_code, "Majiy").await;

    let mut other = ws_connect(&server).await;
    let other_id = join_room(&mut other, &room_code, "CanIHaseeburger").await;
    expect_event(&mut host, "ROOM_JOINED").await;

    // Drop the second player's socket so they pick up a disconnect stamp.
    drop(other);
    expect_event(&mut host, "PLAYER_DISCONNECTED").await;
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let client = reqwest::Client::new();
    let resp = client
        .put(format!("{}/api/v1/player:disconnect", server.base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let removed: Vec<&str> = body["disconnected_players"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(removed, vec![other_id.as_str()]);

    // Nothing left to sweep on the second pass.
    let resp = client
        .put(format!("{}/api/v1/player:disconnect", server.base_url()))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["disconnected_players"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn sweep_leaves_players_within_grace_alone() {
    // Default grace is 300 seconds.
    let server = TestServer::new().await;

    let mut host = ws_connect(&server).await;
    let room_code = create_room(&mut host).await;
    join_room(&mut host, &room_code, "Majiy").await;

    let mut other = ws_connect(&server).await;
    join_room(&mut other, &room_code, "CanIHaseeburger").await;
    expect_event(&mut host, "ROOM_JOINED").await;

    drop(other);
    expect_event(&mut host, "PLAYER_DISCONNECTED").await;
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let client = reqwest::Client::new();
    let resp = client
        .put(format!("{}/api/v1/player:disconnect", server.base_url()))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["disconnected_players"].as_array().unwrap().is_empty());
}
