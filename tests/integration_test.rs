//! Tests de integración para el servidor de archivos
//! tests/integration_test.rs
//!
//! Cada test levanta su propio servidor en 127.0.0.1 con un puerto libre
//! y un directorio temporal, y le habla por TCP real.

use file_server::server::{Dispatcher, FileService, WorkerPool};
use file_server::sync::{LockPolicy, ResourceLockRegistry};
use std::fs;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

/// Levanta un servidor en segundo plano y devuelve su dirección
fn spawn_server(root: &std::path::Path) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let address = listener.local_addr().expect("local addr");

    let registry = Arc::new(ResourceLockRegistry::new(LockPolicy::NWay(1)));
    let service = Arc::new(FileService::<TcpStream>::new(root));
    let pool = WorkerPool::start(4, 4, service, registry).expect("start pool");

    thread::spawn(move || Dispatcher::new(listener, pool).run());
    address
}

/// Helper: envía bytes crudos y retorna la response completa
fn send_raw(address: SocketAddr, raw: &[u8]) -> String {
    let mut stream = TcpStream::connect(address).expect("connect");
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    stream.set_write_timeout(Some(Duration::from_secs(5))).unwrap();

    stream.write_all(raw).unwrap();
    stream.flush().unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();
    response
}

fn put(address: SocketAddr, uri: &str, body: &str) -> String {
    let request = format!(
        "PUT {} HTTP/1.1\r\nContent-Length: {}\r\nRequest-Id: 1\r\n\r\n{}",
        uri,
        body.len(),
        body
    );
    send_raw(address, request.as_bytes())
}

fn get(address: SocketAddr, uri: &str) -> String {
    send_raw(address, format!("GET {} HTTP/1.1\r\n\r\n", uri).as_bytes())
}

/// Helper: extrae el body de una response HTTP
fn extract_body(response: &str) -> &str {
    match response.find("\r\n\r\n") {
        Some(pos) => &response[pos + 4..],
        None => "",
    }
}

#[test]
fn test_put_creates_then_overwrites() {
    let dir = TempDir::new().unwrap();
    let address = spawn_server(dir.path());

    let response = put(address, "/notes.txt", "first");
    assert!(response.starts_with("HTTP/1.1 201 Created\r\n"), "got: {}", response);
    assert_eq!(extract_body(&response), "Created\n");

    let response = put(address, "/notes.txt", "second");
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "got: {}", response);
    assert_eq!(extract_body(&response), "OK\n");

    assert_eq!(fs::read_to_string(dir.path().join("notes.txt")).unwrap(), "second");
}

#[test]
fn test_get_returns_file_content() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("hello.txt"), "hello world").unwrap();
    let address = spawn_server(dir.path());

    let response = get(address, "/hello.txt");
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "got: {}", response);
    assert!(response.contains("Content-Length: 11\r\n"));
    assert_eq!(extract_body(&response), "hello world");
}

#[test]
fn test_get_missing_file() {
    let dir = TempDir::new().unwrap();
    let address = spawn_server(dir.path());

    let response = get(address, "/nothing.txt");
    assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"), "got: {}", response);
    assert_eq!(extract_body(&response), "Not Found\n");
}

#[test]
fn test_malformed_requests() {
    let dir = TempDir::new().unwrap();
    let address = spawn_server(dir.path());

    let response = send_raw(address, b"garbage\r\n\r\n");
    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"), "got: {}", response);

    // Headers en blanco: el cliente sí envió algo, se le responde 400
    for raw in [&b"\r\n\r\n"[..], b"   \r\n\r\n"] {
        let response = send_raw(address, raw);
        assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"), "got: {}", response);
    }

    let response = send_raw(address, b"DELETE /a.txt HTTP/1.1\r\n\r\n");
    assert!(response.starts_with("HTTP/1.1 501 Not Implemented\r\n"), "got: {}", response);

    let response = send_raw(address, b"GET /a.txt HTTP/1.0\r\n\r\n");
    assert!(
        response.starts_with("HTTP/1.1 505 Version Not Supported\r\n"),
        "got: {}",
        response
    );

    let response = send_raw(address, b"PUT /a.txt HTTP/1.1\r\n\r\n");
    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"), "got: {}", response);
    assert!(!dir.path().join("a.txt").exists());
}

#[test]
fn test_concurrent_clients() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("shared.txt"), "0123456789").unwrap();
    let address = spawn_server(dir.path());

    let clients: Vec<_> = (0..16)
        .map(|i| {
            thread::spawn(move || {
                if i % 4 == 0 {
                    let response = put(address, "/shared.txt", "0123456789");
                    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "got: {}", response);
                } else {
                    let response = get(address, "/shared.txt");
                    // Un GET nunca ve un archivo a medio escribir
                    assert_eq!(extract_body(&response), "0123456789");
                }
            })
        })
        .collect();

    for client in clients {
        client.join().unwrap();
    }
}

#[test]
fn test_dispatcher_hands_connections_to_pool() {
    let dir = TempDir::new().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();

    let service = Arc::new(FileService::<TcpStream>::new(dir.path()));
    let pool = WorkerPool::with_policy(2, 2, service, LockPolicy::Writers).unwrap();
    let dispatcher = Dispatcher::new(listener, pool);
    assert_eq!(dispatcher.pool().threads(), 2);
    assert_eq!(dispatcher.pool().registry().policy(), LockPolicy::Writers);

    let clients = thread::spawn(move || {
        let first = put(address, "/one.txt", "1");
        let second = get(address, "/one.txt");
        (first, second)
    });

    dispatcher.dispatch_one().unwrap();
    dispatcher.dispatch_one().unwrap();
    let (first, second) = clients.join().unwrap();
    assert!(first.starts_with("HTTP/1.1 201 Created\r\n"), "got: {}", first);
    assert_eq!(extract_body(&second), "1");

    let stats = dispatcher.into_pool().shutdown();
    assert_eq!(stats.total_requests, 2);
    assert_eq!(stats.status_codes.get(&201), Some(&1));
}
