use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use xbattbar_rs_core::StatusSource;
use xbattbar_rs_debug::DebugSource;

async fn get(addr: SocketAddr, path_and_query: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "GET {path_and_query} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n"
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    response
        .split_once("\r\n\r\n")
        .map(|(_, body)| body.to_owned())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_plug_and_level_reach_check() {
    let mut source = DebugSource::new();
    source.init("127.0.0.1:0").await.unwrap();
    let addr = source.local_addr().unwrap();

    let body = get(addr, "/?plug=1&level=750").await;
    assert_eq!(body, "ok\n");

    let status = source.check().await.unwrap();
    assert!((status.charge_level - 0.75).abs() < 1e-6);
    assert!(status.charging);
    assert!(status.time_remaining.is_nan());

    source.stop().await;
}

#[tokio::test]
async fn test_bad_level_is_reported() {
    let mut source = DebugSource::new();
    source.init("127.0.0.1:0").await.unwrap();
    let addr = source.local_addr().unwrap();

    get(addr, "/?plug=0&level=200").await;
    let body = get(addr, "/?level=abc").await;
    assert!(body.starts_with("level: "), "{body}");

    let status = source.check().await.unwrap();
    assert!((status.charge_level - 0.2).abs() < 1e-6);
    assert!(!status.charging);

    source.stop().await;
}

#[tokio::test]
async fn test_repeated_params_use_first_value() {
    let mut source = DebugSource::new();
    source.init("127.0.0.1:0").await.unwrap();
    let addr = source.local_addr().unwrap();

    let body = get(addr, "/?plug=1&plug=0&level=400&level=abc").await;
    assert_eq!(body, "ok\n");

    let status = source.check().await.unwrap();
    assert!(status.charging);
    assert!((status.charge_level - 0.4).abs() < 1e-6);

    source.stop().await;
}

#[tokio::test]
async fn test_stop_closes_endpoint() {
    let mut source = DebugSource::new();
    source.init("127.0.0.1:0").await.unwrap();
    let addr = source.local_addr().unwrap();
    source.stop().await;

    assert!(TcpStream::connect(addr).await.is_err());
}
