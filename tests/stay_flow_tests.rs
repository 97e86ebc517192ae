//! End-to-end flow over a live HTTP server: bootstrap an admin, register a
//! guest and a tag, reserve a room, open the door, then check out.

mod test_utils;

use innkeeper::config::AppConfig;
use innkeeper::models::notification::Recipient;
use innkeeper::models::rfid_tag::RfidStatus;
use innkeeper::models::room::RoomStatus;
use innkeeper::repositories::{NotificationRepository, RfidTagRepository, RoomRepository};
use reqwest::StatusCode;
use serde_json::{Value, json};
use test_utils::spawn_test_app;

async fn post_json(
    client: &reqwest::Client,
    url: String,
    body: Value,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut request = client.post(url).json(&body);
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }
    let response = request.send().await.expect("request sent");
    let status = response.status();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn guest_stay_from_reservation_to_checkout() {
    let (base, db, handle) = spawn_test_app(AppConfig::default())
        .await
        .expect("spawn app");
    let client = reqwest::Client::new();

    // Bootstrap the first admin and log in
    let (status, _) = post_json(
        &client,
        format!("{base}/api/admins/create"),
        json!({
            "username": "owner",
            "password": "correct horse",
            "email": "owner@example.com",
            "role": "superadmin"
        }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, login) = post_json(
        &client,
        format!("{base}/api/auth/login"),
        json!({ "identifier": "owner@example.com", "password": "correct horse" }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["data"]["token_type"], "Bearer");
    let token = login["data"]["token"].as_str().expect("token").to_string();
    let admin_id = login["data"]["admin"]["id"].as_i64().expect("admin id");

    // Guest and tag
    let (status, guest) = post_json(
        &client,
        format!("{base}/api/guests/register"),
        json!({
            "name": "Ana Lima",
            "email": "ana@example.com",
            "phone": "555-0100",
            "password": "hunter22"
        }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let guest_id = guest["data"]["id"].as_i64().expect("guest id");

    let (status, _) = post_json(
        &client,
        format!("{base}/api/rfid"),
        json!({ "rfid_uid": "A1" }),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = post_json(
        &client,
        format!("{base}/api/rfid/assign"),
        json!({ "guest_id": guest_id, "rfid_uid": "A1" }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Room reserved for two hours
    let (status, room) = post_json(
        &client,
        format!("{base}/api/rooms"),
        json!({ "room_number": "101" }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let room_id = room["data"]["id"].as_i64().expect("room id") as i32;

    let response = client
        .put(format!("{base}/api/rooms/assign"))
        .json(&json!({ "room_number": "101", "guest_id": guest_id, "hours_stay": 2 }))
        .send()
        .await
        .expect("assign room");
    assert_eq!(response.status(), StatusCode::OK);

    // First tap checks the guest in; the room is found without a number
    let (status, verified) = post_json(
        &client,
        format!("{base}/api/rfid/verify"),
        json!({ "rfid_uid": "A1" }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verified["data"]["room"]["room_number"], "101");
    assert_eq!(verified["data"]["room"]["status"], "occupied");
    assert_eq!(verified["data"]["rfid"]["status"], "active");

    // Second tap is still granted and changes nothing
    let (status, again) = post_json(
        &client,
        format!("{base}/api/rfid/verify"),
        json!({ "rfid_uid": "A1", "room_number": "101" }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["data"]["room"]["check_out"], verified["data"]["room"]["check_out"]);

    // Staff checkout frees the room and the tag
    let (status, checkout) = post_json(
        &client,
        format!("{base}/api/rooms/{room_id}/checkout"),
        json!({}),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(checkout["data"]["tags_reset"], 1);

    let room = RoomRepository::new(db.as_ref())
        .find_by_id(room_id)
        .await
        .unwrap()
        .expect("room exists");
    assert_eq!(room.status, RoomStatus::Available);
    assert!(room.guest_id.is_none());
    assert!(room.check_in.is_none() && room.check_out.is_none());

    let tag = RfidTagRepository::new(db.as_ref())
        .find_by_uid("A1")
        .await
        .unwrap()
        .expect("tag exists");
    assert_eq!(tag.status, RfidStatus::Available);
    assert!(tag.guest_id.is_none());

    // The tag no longer opens anything
    let (status, denied) = post_json(
        &client,
        format!("{base}/api/rfid/verify"),
        json!({ "rfid_uid": "A1" }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(denied["code"], "RFID_INVALID_STATE");

    let admin_inbox = NotificationRepository::new(db.as_ref())
        .list_for(Recipient::Admin(admin_id as i32))
        .await
        .unwrap();
    assert!(
        admin_inbox
            .iter()
            .any(|n| n.notification_type.as_deref() == Some("checkout"))
    );

    drop(client);
    handle.shutdown().await.expect("server stops cleanly");
}

#[tokio::test]
async fn public_endpoints_answer_without_auth() {
    let (base, _db, handle) = spawn_test_app(AppConfig::default())
        .await
        .expect("spawn app");
    let client = reqwest::Client::new();

    let response = client.get(format!("{base}/")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.get(format!("{base}/healthz")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.get(format!("{base}/api/rooms")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-trace-id"));

    let response = client.get(format!("{base}/api/admins")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    drop(client);
    handle.shutdown().await.expect("server stops cleanly");
}
