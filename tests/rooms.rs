mod common;

use axum::http::StatusCode;
use common::TestApp;

#[tokio::test]
async fn creating_rooms_reuses_topics() {
    let app = TestApp::new().await;
    let mut ada = app.signed_in("ada").await;

    let response = ada.create_room("Lifetimes", "Rust", "borrowck support group").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/"));
    ada.create_room("Async", "  Rust ", "").await;
    ada.create_room("Pointers", "C", "").await;

    assert_eq!(app.count("SELECT COUNT(*) FROM topics").await, 2);
    assert_eq!(app.count("SELECT COUNT(*) FROM rooms").await, 3);
    assert_eq!(
        app.count("SELECT COUNT(*) FROM rooms r JOIN topics t ON t.id=r.topic_id WHERE t.name='Rust'").await,
        2
    );
    assert_eq!(app.count("SELECT COUNT(*) FROM rooms WHERE description IS NULL").await, 2);
}

#[tokio::test]
async fn room_form_requires_name_and_topic() {
    let app = TestApp::new().await;
    let mut ada = app.signed_in("ada").await;

    let response = ada.create_room(" ", "", "").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Room name is required."));
    assert!(response.body.contains("Topic is required."));
    assert_eq!(app.count("SELECT COUNT(*) FROM rooms").await, 0);
}

#[tokio::test]
async fn anonymous_users_cannot_create_rooms() {
    let app = TestApp::new().await;
    let mut anon = app.client();

    let response = anon.create_room("Lifetimes", "Rust", "").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/login?return_url=/room/new"));
    assert_eq!(app.count("SELECT COUNT(*) FROM rooms").await, 0);
}

#[tokio::test]
async fn unknown_room_is_404() {
    let app = TestApp::new().await;
    let mut anon = app.client();

    let response = anon.get("/room/0190a6e0-0000-7000-8000-000000000000").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body.contains("room"));
}

#[tokio::test]
async fn malformed_room_ids_are_404() {
    let app = TestApp::new().await;
    let mut anon = app.client();
    let mut ada = app.signed_in("ada").await;

    let response = anon.get("/room/not-a-room").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(!response.body.contains("UUID"));

    let response = ada.get("/room/not-a-room/edit").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    let response = ada.post("/room/not-a-room", &[("body", "hello")]).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn topic_names_are_capped_at_200_characters() {
    let app = TestApp::new().await;
    let mut ada = app.signed_in("ada").await;

    let response = ada.create_room("Lifetimes", &"r".repeat(201), "").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Topic must be at most 200 characters."));
    assert_eq!(app.count("SELECT COUNT(*) FROM topics").await, 0);

    let response = ada.create_room("Lifetimes", &"r".repeat(200), "").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(app.count("SELECT COUNT(*) FROM topics").await, 1);
}

#[tokio::test]
async fn message_bodies_are_stored_as_sent() {
    let app = TestApp::new().await;
    let mut ada = app.signed_in("ada").await;
    ada.create_room("Lifetimes", "Rust", "").await;
    let room_path = format!("/room/{}", app.room_id("Lifetimes").await);

    ada.post(&room_path, &[("body", "    let x = 1;")]).await;
    assert_eq!(app.count("SELECT COUNT(*) FROM messages WHERE body='    let x = 1;'").await, 1);

    let page = ada.get(&room_path).await;
    assert!(page.body.contains("<pre><code>let x = 1;"));
}

#[tokio::test]
async fn posting_a_message_joins_the_room_once() {
    let app = TestApp::new().await;
    let mut ada = app.signed_in("ada").await;
    let mut bob = app.signed_in("bob").await;

    ada.create_room("Lifetimes", "Rust", "").await;
    let room_id = app.room_id("Lifetimes").await;
    let room_path = format!("/room/{room_id}");

    let response = bob.post(&room_path, &[("body", "first!")]).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some(room_path.as_str()));
    bob.post(&room_path, &[("body", "second")]).await;

    assert_eq!(app.count("SELECT COUNT(*) FROM messages").await, 2);
    assert_eq!(app.count("SELECT COUNT(*) FROM room_participants").await, 1);

    let page = ada.get(&room_path).await;
    assert!(page.body.contains("first!"));
    assert!(page.body.contains("1 joined"));
    // the newest message comes first
    assert!(page.body.find("second").unwrap() < page.body.find("first!").unwrap());
    // only the author gets edit links
    assert!(!page.body.contains("/message/"));
    // the host gets room controls
    assert!(page.body.contains(&format!("{room_path}/edit")));

    let page = bob.get(&room_path).await;
    assert!(page.body.contains("/message/"));
    assert!(!page.body.contains(&format!("{room_path}/edit")));
}

#[tokio::test]
async fn blank_messages_are_rejected() {
    let app = TestApp::new().await;
    let mut ada = app.signed_in("ada").await;
    ada.create_room("Lifetimes", "Rust", "").await;
    let room_path = format!("/room/{}", app.room_id("Lifetimes").await);

    let response = ada.post(&room_path, &[("body", "   ")]).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(app.count("SELECT COUNT(*) FROM messages").await, 0);

    let page = ada.get(&room_path).await;
    assert!(page.body.contains("Message can&#x27;t be empty."));
}

#[tokio::test]
async fn message_bodies_cannot_inject_markup() {
    let app = TestApp::new().await;
    let mut ada = app.signed_in("ada").await;
    ada.create_room("<b>Lifetimes</b>", "Rust", "").await;
    let room_path = format!("/room/{}", app.room_id("<b>Lifetimes</b>").await);

    ada.post(&room_path, &[("body", "**bold** <script>alert(1)</script>")]).await;

    let page = ada.get(&room_path).await;
    assert!(!page.body.contains("<script>"));
    assert!(!page.body.contains("<b>Lifetimes</b>"));
    assert!(page.body.contains("&lt;b&gt;Lifetimes&lt;/b&gt;"));
    assert!(page.body.contains("<strong>bold</strong>"));
}

#[tokio::test]
async fn only_the_host_can_update_a_room() {
    let app = TestApp::new().await;
    let mut ada = app.signed_in("ada").await;
    let mut bob = app.signed_in("bob").await;
    ada.create_room("Lifetimes", "Rust", "").await;
    let room_id = app.room_id("Lifetimes").await;
    let edit_path = format!("/room/{room_id}/edit");

    let response = bob.get(&edit_path).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body, "You are not allowed here!");

    let response = bob.post(&edit_path, &[("name", "Mine now"), ("topic", "Rust"), ("description", "")]).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let form = ada.get(&edit_path).await;
    assert_eq!(form.status, StatusCode::OK);
    assert!(form.body.contains("value=\"Lifetimes\""));
    assert!(form.body.contains("value=\"Rust\""));

    let response = ada.post(&edit_path, &[("name", "Ownership"), ("topic", "Systems"), ("description", "moved")]).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/"));

    assert_eq!(app.room_id("Ownership").await, room_id);
    assert_eq!(
        app.count("SELECT COUNT(*) FROM rooms r JOIN topics t ON t.id=r.topic_id WHERE t.name='Systems' AND r.description='moved'").await,
        1
    );
}

#[tokio::test]
async fn deleting_a_room_takes_its_messages() {
    let app = TestApp::new().await;
    let mut ada = app.signed_in("ada").await;
    let mut bob = app.signed_in("bob").await;
    ada.create_room("Lifetimes", "Rust", "").await;
    let room_id = app.room_id("Lifetimes").await;
    bob.post(&format!("/room/{room_id}"), &[("body", "hello")]).await;
    let delete_path = format!("/room/{room_id}/delete");

    let response = bob.post(&delete_path, &[]).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let confirm = ada.get(&delete_path).await;
    assert_eq!(confirm.status, StatusCode::OK);
    assert!(confirm.body.contains("Are you sure you want to delete Lifetimes?"));

    let response = ada.post(&delete_path, &[]).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/"));

    assert_eq!(app.count("SELECT COUNT(*) FROM rooms").await, 0);
    assert_eq!(app.count("SELECT COUNT(*) FROM messages").await, 0);
    assert_eq!(app.count("SELECT COUNT(*) FROM room_participants").await, 0);
    // topics outlive their rooms
    assert_eq!(app.count("SELECT COUNT(*) FROM topics").await, 1);
}
