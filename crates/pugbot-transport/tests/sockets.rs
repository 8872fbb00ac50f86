//! Integration tests for the TCP connection and UDP log socket.
//!
//! These bind real sockets on loopback with OS-assigned ports.

use pugbot_transport::{Connection, LogSocket, TcpConnection};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};

#[tokio::test]
async fn test_tcp_connect_send_and_receive() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 5];
        stream.read_exact(&mut buf).await.unwrap();
        stream.write_all(b"pong").await.unwrap();
        buf
    });

    let conn = TcpConnection::connect(&addr).await.expect("should connect");
    assert!(conn.id().into_inner() > 0);
    assert_eq!(conn.peer_addr().to_string(), addr);
    assert!(conn.local_addr().ip().is_loopback());

    conn.send(b"hello").await.expect("send should succeed");
    let received = server.await.unwrap();
    assert_eq!(&received, b"hello");

    let data = conn.recv().await.unwrap().expect("should receive data");
    assert_eq!(data, b"pong");
}

#[tokio::test]
async fn test_tcp_recv_returns_none_when_peer_closes() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        drop(stream);
    });

    let conn = TcpConnection::connect(&addr).await.unwrap();
    server.await.unwrap();

    let result = conn.recv().await.expect("clean close is not an error");
    assert!(result.is_none());
}

#[tokio::test]
async fn test_tcp_connect_refused_returns_error() {
    // Grab a free port, then close the listener so nothing is there.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let result = TcpConnection::connect(&addr).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_log_socket_receives_datagram() {
    let log = LogSocket::bind("127.0.0.1:0").await.expect("should bind");
    let target = log.local_addr().unwrap();

    let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    sender.send_to(b"\xff\xff\xff\xffRL hello\n\0", target).await.unwrap();

    let (data, from) = log.recv().await.expect("should receive");
    assert_eq!(data, b"\xff\xff\xff\xffRL hello\n\0");
    assert_eq!(from, sender.local_addr().unwrap());
}
