mod common;

use serde_json::{Value, json};

use common::*;

#[tokio::test]
async fn create_then_join_returns_membership_and_player_id() {
    let server = TestServer::new().await;
    let mut creator = ws_connect(&server).await;
    let room_code = create_room(&mut creator).await;

    let mut joiner = ws_connect(&server).await;
    send_event(
        &mut joiner,
        "JOIN_ROOM",
        json!({"nickname": "Majiy", "avatar": "aGVsbG8=", "room_code": room_code}),
    )
    .await;

    let new_room_joined = expect_event(&mut joiner, "NEW_ROOM_JOINED").await;
    assert!(!new_room_joined["player_id"].as_str().unwrap().is_empty());

    let room_joined = expect_event(&mut joiner, "ROOM_JOINED").await;
    assert_eq!(room_joined["host_player_nickname"], "Majiy");
    let players = room_joined["players"].as_array().unwrap();
    assert_eq!(players.len(), 1);
    assert_eq!(players[0]["nickname"], "Majiy");
    assert_eq!(players[0]["avatar"], "aGVsbG8=");

    // The creator never joined the room channel, so it sees nothing.
    assert!(try_read_event(&mut creator, 150).await.is_none());
}

#[tokio::test]
async fn join_broadcasts_to_existing_members() {
    let server = TestServer::new().await;
    let mut host = ws_connect(&server).await;
    let room_code = create_room(&mut host).await;
    join_room(&mut host, &room_code, "Majiy").await;

    let mut other = ws_connect(&server).await;
    join_room(&mut other, &room_code, "CanIHaseeburger").await;

    let room_joined = expect_event(&mut host, "ROOM_JOINED").await;
    assert_eq!(room_joined["host_player_nickname"], "Majiy");
    assert_eq!(room_joined["players"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn duplicate_nickname_is_rejected_without_a_join() {
    let server = TestServer::new().await;
    let mut host = ws_connect(&server).await;
    let room_code = create_room(&mut host).await;
    join_room(&mut host, &room_code, "Majiy").await;

    let mut dup = ws_connect(&server).await;
    send_event(
        &mut dup,
        "JOIN_ROOM",
        json!({"nickname": "Majiy", "avatar": "aGk=", "room_code": room_code}),
    )
    .await;

    let error = expect_event(&mut dup, "ERROR").await;
    assert_eq!(error["code"], "room_join_fail");
    assert_eq!(error["message"], "nickname Majiy already exists");

    // No ROOM_JOINED reaches the room.
    assert!(try_read_event(&mut host, 150).await.is_none());
}

#[tokio::test]
async fn joining_an_unknown_room_fails() {
    let server = TestServer::new().await;
    let mut joiner = ws_connect(&server).await;

    send_event(
        &mut joiner,
        "JOIN_ROOM",
        json!({"nickname": "Majiy", "avatar": "aGk=", "room_code": "5a18ffff"}),
    )
    .await;

    let error = expect_event(&mut joiner, "ERROR").await;
    assert_eq!(error["code"], "room_join_fail");
    assert_eq!(error["message"], "room not found");
}

#[tokio::test]
async fn host_can_kick_but_others_cannot() {
    let server = TestServer::new().await;
    let mut host = ws_connect(&server).await;
    let room_code = create_room(&mut host).await;
    let host_id = join_room(&mut host, &room_code, "Majiy").await;

    let mut target = ws_connect(&server).await;
    let target_id = join_room(&mut target, &room_code, "CanIHaseeburger").await;
    expect_event(&mut host, "ROOM_JOINED").await;

    // A non-host kick is refused.
    send_event(
        &mut target,
        "KICK_PLAYER",
        json!({
            "kick_player_nickname": "Majiy",
            "player_id": target_id,
            "room_code": room_code,
        }),
    )
    .await;
    let error = expect_event(&mut target, "ERROR").await;
    assert_eq!(error["code"], "kick_player_fail");
    assert_eq!(
        error["message"],
        "You are not host, so cannot kick another player"
    );

    // The host kick lands and the room hears about it.
    send_event(
        &mut host,
        "KICK_PLAYER",
        json!({
            "kick_player_nickname": "CanIHaseeburger",
            "player_id": host_id,
            "room_code": room_code,
        }),
    )
    .await;
    let kicked = expect_event(&mut host, "PLAYER_KICKED").await;
    assert_eq!(kicked["nickname"], "CanIHaseeburger");
}

#[tokio::test]
async fn malformed_payload_yields_server_error() {
    let server = TestServer::new().await;
    let mut stream = ws_connect(&server).await;

    // JOIN_ROOM without a nickname.
    send_event(
        &mut stream,
        "JOIN_ROOM",
        json!({"avatar": "aGk=", "room_code": "whatever"}),
    )
    .await;

    let error = expect_event(&mut stream, "ERROR").await;
    assert_eq!(error["code"], "server_error");
}

#[tokio::test]
async fn unknown_events_are_ignored() {
    let server = TestServer::new().await;
    let mut stream = ws_connect(&server).await;

    send_event(&mut stream, "MAKE_ME_A_SANDWICH", Value::Null).await;

    assert!(try_read_event(&mut stream, 150).await.is_none());
}

#[tokio::test]
async fn rejoin_replays_the_membership() {
    let server = TestServer::new().await;
    let mut host = ws_connect(&server).await;
    let room_code = create_room(&mut host).await;
    let host_id = join_room(&mut host, &room_code, "Majiy").await;

    // Drop the socket, then come back on a fresh one.
    drop(host);
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let mut back = ws_connect(&server).await;
    send_event(&mut back, "REJOIN_ROOM", json!({"player_id": host_id})).await;

    let room_joined = expect_event(&mut back, "ROOM_JOINED").await;
    assert_eq!(room_joined["host_player_nickname"], "Majiy");
    assert_eq!(room_joined["players"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn rejoin_with_an_unknown_player_fails() {
    let server = TestServer::new().await;
    let mut stream = ws_connect(&server).await;

    send_event(&mut stream, "REJOIN_ROOM", json!({"player_id": "ghost"})).await;

    let error = expect_event(&mut stream, "ERROR").await;
    assert_eq!(error["code"], "server_error");
}
