use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio_tungstenite::tungstenite::Message;
use tower::ServiceExt;

use werewolf_server::app;
use werewolf_server::models::config::GameConfig;

#[tokio::test]
async fn health_reports_room_count() {
    let app = app::create_app(GameConfig::default());

    let request = Request::builder()
        .method("GET")
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let health: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["rooms"], 0);
}

type WsClient = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

async fn serve() -> String {
    let app = app::create_app(GameConfig::default());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("ws://{}/api/room/ws", addr)
}

async fn connect(url: &str) -> WsClient {
    let (ws, _) = tokio_tungstenite::connect_async(url).await.unwrap();
    ws
}

async fn send(ws: &mut WsClient, value: Value) {
    ws.send(Message::Text(value.to_string())).await.unwrap();
}

async fn recv(ws: &mut WsClient) -> Value {
    loop {
        match ws.next().await.expect("socket closed").unwrap() {
            Message::Text(text) => return serde_json::from_str(&text).unwrap(),
            _ => continue,
        }
    }
}

#[tokio::test]
async fn create_and_join_over_websocket() {
    let url = serve().await;

    let mut host = connect(&url).await;
    send(&mut host, json!({ "type": "create_room", "player_name": "Amira" })).await;

    let created = recv(&mut host).await;
    assert_eq!(created["type"], "room_created");
    let code = created["room_code"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 6);
    assert_eq!(created["state"]["players"][0]["is_host"], true);
    // Creator also gets the initial roster update.
    let update = recv(&mut host).await;
    assert_eq!(update["type"], "room_update");

    let mut guest = connect(&url).await;
    send(
        &mut guest,
        json!({ "type": "join_room", "room_code": code, "player_name": "Bilal" }),
    )
    .await;

    let joined = recv(&mut guest).await;
    assert_eq!(joined["type"], "room_joined");
    assert_eq!(joined["state"]["players"].as_array().unwrap().len(), 2);

    // The host sees the roster grow.
    let update = recv(&mut host).await;
    assert_eq!(update["type"], "room_update");
    assert_eq!(update["state"]["players"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn joining_a_nonexistent_room_yields_a_typed_error() {
    let url = serve().await;

    let mut ws = connect(&url).await;
    send(
        &mut ws,
        json!({ "type": "join_room", "room_code": "ZZZZZZ", "player_name": "Dina" }),
    )
    .await;

    let error = recv(&mut ws).await;
    assert_eq!(error["type"], "error");
    assert_eq!(error["kind"], "room_not_found");
}

#[tokio::test]
async fn gameplay_before_joining_is_rejected() {
    let url = serve().await;

    let mut ws = connect(&url).await;
    send(&mut ws, json!({ "type": "start_game" })).await;

    let error = recv(&mut ws).await;
    assert_eq!(error["type"], "error");
    assert_eq!(error["kind"], "not_in_room");
}

#[tokio::test]
async fn full_lobby_start_assigns_a_private_role_to_everyone() {
    let url = serve().await;

    let mut host = connect(&url).await;
    send(&mut host, json!({ "type": "create_room", "player_name": "Player0" })).await;
    let created = recv(&mut host).await;
    let code = created["room_code"].as_str().unwrap().to_string();

    let mut guests = Vec::new();
    for i in 1..5 {
        let mut ws = connect(&url).await;
        send(
            &mut ws,
            json!({ "type": "join_room", "room_code": code, "player_name": format!("Player{}", i) }),
        )
        .await;
        let joined = recv(&mut ws).await;
        assert_eq!(joined["type"], "room_joined");
        guests.push(ws);
    }

    send(&mut host, json!({ "type": "start_game" })).await;

    let mut sockets: Vec<&mut WsClient> = Vec::new();
    sockets.push(&mut host);
    for guest in guests.iter_mut() {
        sockets.push(guest);
    }

    for ws in sockets {
        let assigned = loop {
            let msg = recv(ws).await;
            if msg["type"] == "role_assigned" {
                break msg;
            }
        };
        assert!(assigned["role"].is_string());
        assert_eq!(assigned["state"]["phase"], "night");
        // Nobody sees anyone else's role in their projection.
        for player in assigned["state"]["players"].as_array().unwrap() {
            if player["is_me"] != true {
                assert!(player["role"].is_null());
            }
        }
    }
}
