//! An in-process websocket peer that speaks just enough socket.io for
//! the client tests.
#![allow(dead_code)]

use async_std::net::{TcpListener, TcpStream};
use async_tungstenite::tungstenite::Message;
use async_tungstenite::WebSocketStream;
use futures::stream::StreamExt;
use std::sync::{Arc, Mutex};
use weathercast::ClientBuilder;

pub type ServerSocket = WebSocketStream<TcpStream>;

pub const OPEN: &str = r#"0{"sid":"lv_VI97HAXpY6yYWAAAC","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;
pub const CONNECT_ACK: &str = r#"40{"sid":"wZX3oN0bSVIhsaknAAAI"}"#;

/// Binds a free local port and returns the listener with its http url.
pub async fn listen() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    (listener, url)
}

pub async fn accept(listener: &TcpListener) -> ServerSocket {
    let (stream, _) = listener.accept().await.unwrap();
    async_tungstenite::accept_async(stream).await.unwrap()
}

pub async fn send_text(ws: &mut ServerSocket, text: &str) {
    ws.send(Message::text(text)).await.unwrap();
}

pub async fn next_text(ws: &mut ServerSocket) -> String {
    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => return text.to_string(),
            Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
            other => panic!("expected a text frame, got {:?}", other),
        }
    }
}

/// Sends `open`, then expects `connect` from the client and accepts it.
pub async fn handshake_with(ws: &mut ServerSocket, open: &str, connect: &str) {
    send_text(ws, open).await;
    assert_eq!(next_text(ws).await, connect);
    send_text(ws, CONNECT_ACK).await;
}

pub async fn handshake_expecting(ws: &mut ServerSocket, connect: &str) {
    handshake_with(ws, OPEN, connect).await;
}

pub async fn handshake(ws: &mut ServerSocket) {
    handshake_expecting(ws, "40").await;
}

/// Reads until the client goes away.
pub async fn drain(ws: &mut ServerSocket) {
    while let Some(Ok(_)) = ws.next().await {}
}

pub async fn close(ws: &mut ServerSocket) {
    ws.send(Message::Close(None)).await.unwrap();
    drain(ws).await;
}

pub type Log = Arc<Mutex<Vec<String>>>;

/// Records every lifecycle event and every `message` event into `log`.
pub fn record(builder: ClientBuilder, log: &Log) -> ClientBuilder {
    let connect = Arc::clone(log);
    let message = Arc::clone(log);
    let disconnect = Arc::clone(log);
    let error = Arc::clone(log);
    builder
        .on("connect", move |_, _| connect.lock().unwrap().push("connect".to_owned()))
        .on("message", move |payload, _| {
            message.lock().unwrap().push(format!("message:{}", payload))
        })
        .on("disconnect", move |payload, _| {
            disconnect.lock().unwrap().push(format!("disconnect:{}", payload))
        })
        .on("error", move |payload, _| {
            error.lock().unwrap().push(format!("error:{}", payload))
        })
}

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}
