mod common;

use std::time::Duration;

use anyhow::Context;
use common::TestServer;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsRead = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

async fn join(server: &TestServer, nickname: &str) -> anyhow::Result<(WsSink, WsRead)> {
    let (socket, _) = connect_async(server.ws_url()).await?;
    let (mut tx, rx) = socket.split();
    tx.send(Message::Text(
        json!({ "event": "join_room", "data": nickname })
            .to_string()
            .into(),
    ))
    .await?;
    Ok((tx, rx))
}

async fn send_chat(tx: &mut WsSink, author: &str, text: &str) -> anyhow::Result<()> {
    tx.send(Message::Text(
        json!({ "event": "send_message", "data": { "author": author, "text": text } })
            .to_string()
            .into(),
    ))
    .await?;
    Ok(())
}

async fn next_event(rx: &mut WsRead) -> anyhow::Result<Value> {
    loop {
        let frame = timeout(Duration::from_secs(5), rx.next())
            .await
            .context("timed out waiting for a salon event")?
            .context("socket closed early")??;
        if let Message::Text(text) = frame {
            return Ok(serde_json::from_str(&text)?);
        }
    }
}

#[tokio::test]
async fn one_message_reaches_the_salon_and_awards_xp() -> anyhow::Result<()> {
    let server = TestServer::spawn().await?;
    server
        .http
        .post(server.url("/api/register"))
        .json(&json!({ "nickname": "Gezgin", "password": "yol" }))
        .send()
        .await?
        .error_for_status()?;

    let (mut tx, mut rx) = join(&server, "Gezgin").await?;
    send_chat(&mut tx, "Gezgin", "Selam sakinler").await?;

    let received = next_event(&mut rx).await?;
    assert_eq!(received["event"], "message_received");
    assert_eq!(received["data"]["author"], "Gezgin");
    assert_eq!(received["data"]["text"], "Selam sakinler");
    assert_eq!(received["data"]["isSystem"], false);

    let updated = next_event(&mut rx).await?;
    assert_eq!(updated["event"], "user_updated");
    assert_eq!(updated["data"]["nickname"], "Gezgin");
    assert_eq!(updated["data"]["xp"], 10);
    assert_eq!(updated["data"]["rank"], "Aday");
    assert!(updated["data"].get("password").is_none());

    // History and roster agree with the broadcast.
    let messages: Value = server
        .http
        .get(server.url("/api/messages"))
        .send()
        .await?
        .json()
        .await?;
    let last = messages.as_array().unwrap().last().unwrap();
    assert_eq!(last["text"], "Selam sakinler");

    let users: Value = server
        .http
        .get(server.url("/api/users"))
        .send()
        .await?
        .json()
        .await?;
    let gezgin = users
        .as_array()
        .unwrap()
        .iter()
        .find(|user| user["nickname"] == "Gezgin")
        .unwrap();
    assert_eq!(gezgin["xp"], 10);

    Ok(())
}

#[tokio::test]
async fn crossing_a_threshold_promotes_in_the_same_event() -> anyhow::Result<()> {
    let server = TestServer::spawn().await?;
    server
        .http
        .post(server.url("/api/register"))
        .json(&json!({ "nickname": "Esikci", "password": "p" }))
        .send()
        .await?
        .error_for_status()?;
    server
        .http
        .put(server.url("/api/users/Esikci"))
        .json(&json!({ "xp": 95 }))
        .send()
        .await?
        .error_for_status()?;

    let (mut tx, mut rx) = join(&server, "Esikci").await?;
    send_chat(&mut tx, "Esikci", "Eşiği geçiyorum").await?;

    let received = next_event(&mut rx).await?;
    assert_eq!(received["event"], "message_received");

    let updated = next_event(&mut rx).await?;
    assert_eq!(updated["event"], "user_updated");
    assert_eq!(updated["data"]["xp"], 105);
    assert_eq!(updated["data"]["rank"], "Üye");

    Ok(())
}

#[tokio::test]
async fn a_socket_that_never_joins_hears_nothing() -> anyhow::Result<()> {
    let server = TestServer::spawn().await?;
    server
        .http
        .get(server.url("/api/init"))
        .send()
        .await?
        .error_for_status()?;

    let (silent_socket, _) = connect_async(server.ws_url()).await?;
    let (_silent_tx, mut silent_rx) = silent_socket.split();

    let (mut tx, mut rx) = join(&server, "Adept").await?;
    send_chat(&mut tx, "Adept", "Duyan var mı").await?;
    next_event(&mut rx).await?;

    let nothing = timeout(Duration::from_millis(300), silent_rx.next()).await;
    assert!(nothing.is_err(), "spectator received a frame without joining");

    Ok(())
}

#[tokio::test]
async fn clearing_the_salon_reaches_joined_clients() -> anyhow::Result<()> {
    let server = TestServer::spawn().await?;
    server
        .http
        .get(server.url("/api/init"))
        .send()
        .await?
        .error_for_status()?;

    let (mut tx, mut rx) = join(&server, "Adept").await?;

    // One chat round-trip so the wipe below is guaranteed to find the
    // subscription already live.
    send_chat(&mut tx, "Adept", "Temizlik öncesi").await?;
    let primed = next_event(&mut rx).await?;
    assert_eq!(primed["event"], "message_received");
    next_event(&mut rx).await?; // the sender's profile update

    let cleared: Value = server
        .http
        .delete(server.url("/api/messages"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(cleared["message"], "All messages cleared");

    let event = next_event(&mut rx).await?;
    assert_eq!(event["event"], "messages_cleared");

    let messages: Value = server
        .http
        .get(server.url("/api/messages"))
        .send()
        .await?
        .json()
        .await?;
    assert!(messages.as_array().unwrap().is_empty());

    Ok(())
}
