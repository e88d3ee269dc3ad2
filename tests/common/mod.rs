//! In-process HTTP(S) servers on 127.0.0.1 for the integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use http_sweep_rs::Found;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;

const CERT_PEM: &[u8] = include_bytes!("../fixtures/cert.pem");
const KEY_PEM: &[u8] = include_bytes!("../fixtures/key.pem");

fn response(status: &str, extra_headers: &str) -> String {
    format!("HTTP/1.1 {status}\r\n{extra_headers}Content-Length: 0\r\nConnection: close\r\n\r\n")
}

fn server_header(server: Option<&str>) -> String {
    server.map(|s| format!("Server: {s}\r\n")).unwrap_or_default()
}

/// Read one request head, then write `resp` and close.
async fn answer<S>(mut sock: S, resp: &str)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut req = Vec::new();
    let mut buf = [0u8; 1024];
    while !req.windows(4).any(|w| w == b"\r\n\r\n") {
        match sock.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => req.extend_from_slice(&buf[..n]),
        }
    }
    let _ = sock.write_all(resp.as_bytes()).await;
    let _ = sock.shutdown().await;
}

/// Answer every connection with the raw `resp`. Returns the port and a
/// counter of accepted connections.
pub async fn spawn_raw_server(resp: String) -> (u16, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let resp = Arc::new(resp);
    tokio::spawn(async move {
        while let Ok((sock, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            let resp = resp.clone();
            tokio::spawn(async move { answer(sock, &resp).await });
        }
    });
    (port, hits)
}

/// Plain HTTP server replying `404` with the given `Server` header.
pub async fn spawn_http_server(server: Option<&str>) -> (u16, Arc<AtomicUsize>) {
    spawn_raw_server(response("404 Not Found", &server_header(server))).await
}

/// Plain HTTP server replying `301` towards `location`.
pub async fn spawn_redirect_server(server: &str, location: &str) -> (u16, Arc<AtomicUsize>) {
    let headers = format!("{}Location: {location}\r\n", server_header(Some(server)));
    spawn_raw_server(response("301 Moved Permanently", &headers)).await
}

/// HTTPS server with a self-signed certificate replying `200`.
pub async fn spawn_tls_server(server: &str) -> (u16, Arc<AtomicUsize>) {
    let identity = native_tls::Identity::from_pkcs8(CERT_PEM, KEY_PEM).unwrap();
    let acceptor = native_tls::TlsAcceptor::new(identity).unwrap();
    let acceptor = Arc::new(tokio_native_tls::TlsAcceptor::from(acceptor));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let resp = Arc::new(response("200 OK", &server_header(Some(server))));
    tokio::spawn(async move {
        while let Ok((sock, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            let acceptor = acceptor.clone();
            let resp = resp.clone();
            tokio::spawn(async move {
                if let Ok(tls) = acceptor.accept(sock).await {
                    answer(tls, &resp).await;
                }
            });
        }
    });
    (port, hits)
}

/// Accepts connections and never answers.
pub async fn spawn_silent_server() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((sock, _)) = listener.accept().await {
            held.push(sock);
        }
    });
    port
}

/// A port nothing is listening on.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

/// Sink that keeps every result.
pub fn collector() -> (Arc<Mutex<Vec<Found>>>, impl Fn(Found) + Send + Sync + 'static) {
    let found = Arc::new(Mutex::new(Vec::new()));
    let sink_found = found.clone();
    (found, move |f: Found| sink_found.lock().unwrap().push(f))
}
