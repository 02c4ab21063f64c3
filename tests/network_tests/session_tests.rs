//! Tests for Session
//!
//! These tests verify:
//! - Login acceptance and rejection
//! - Dial and I/O failures surface as distinct errors
//! - Command round trips, including fragmented and coalesced replies
//! - Response id correlation
//! - Round-trip read deadlines, write timeouts and terminal states

#[path = "../common/mod.rs"]
mod common;

use std::io::Write;
use std::net::TcpListener;
use std::thread;
use std::time::{Duration, Instant};

use common::{
    drain, handle_login, read_request, reply, serve, test_config, write_fragmented, MockServer,
    PASSWORD,
};
use pmrcon::protocol::{encode, PacketType};
use pmrcon::{Config, RconError, Session, SessionState};

// =============================================================================
// Helper Functions
// =============================================================================

fn echo_server() -> MockServer<Vec<pmrcon::Packet>> {
    MockServer::spawn(|stream| serve(stream, PASSWORD, |cmd| format!("echo: {}", cmd)))
}

fn connect(server: &MockServer<impl Send + 'static>) -> Session {
    Session::connect_with_config(&server.address(), PASSWORD, test_config()).unwrap()
}

// =============================================================================
// Authentication Tests
// =============================================================================

#[test]
fn test_correct_password_is_ready() {
    let server = echo_server();
    let session = connect(&server);

    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(session.last_request_id(), Some(1));

    drop(session);
    let received = server.join();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].packet_type, PacketType::Auth);
    assert_eq!(received[0].body, PASSWORD.as_bytes());
}

#[test]
fn test_wrong_password_is_auth_error() {
    let server = echo_server();

    let result = Session::connect_with_config(&server.address(), "wrong", test_config());

    match result {
        Err(RconError::Auth(msg)) => assert!(msg.contains("incorrect password")),
        other => panic!("Expected auth error, got {:?}", other),
    }
    server.join();
}

#[test]
fn test_auth_reply_with_wrong_type_is_rejected() {
    let server = MockServer::spawn(|mut stream| {
        let login = read_request(&mut stream).unwrap();
        reply(&mut stream, login.id, PacketType::ResponseValue, b"");
        drain(&mut stream);
    });

    let result = Session::connect_with_config(&server.address(), PASSWORD, test_config());

    assert!(matches!(result, Err(RconError::Auth(_))));
    server.join();
}

#[test]
fn test_auth_connection_closed_is_io_error() {
    let server = MockServer::spawn(|mut stream| {
        read_request(&mut stream);
        // hang up without answering
    });

    let result = Session::connect_with_config(&server.address(), PASSWORD, test_config());

    match result {
        Err(RconError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
        other => panic!("Expected IO error, got {:?}", other),
    }
    server.join();
}

#[test]
fn test_auth_silence_is_timeout() {
    let server = MockServer::spawn(|mut stream| {
        read_request(&mut stream);
        drain(&mut stream);
    });
    let config = Config::builder().read_timeout_ms(100).build();

    let result = Session::connect_with_config(&server.address(), PASSWORD, config);

    match result {
        Err(e) => assert!(e.is_timeout(), "Expected timeout, got {:?}", e),
        Ok(_) => panic!("Expected timeout"),
    }
    server.join();
}

// =============================================================================
// Dial Tests
// =============================================================================

#[test]
fn test_dial_refused_is_dial_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap().to_string();
    drop(listener);

    let result = Session::connect_with_config(&address, PASSWORD, test_config());

    match result {
        Err(RconError::Dial { address: a, .. }) => assert_eq!(a, address),
        other => panic!("Expected dial error, got {:?}", other),
    }
}

#[test]
fn test_dial_unresolvable_is_dial_error() {
    let result = Session::connect_with_config("not an address", PASSWORD, test_config());
    assert!(matches!(result, Err(RconError::Dial { .. })));
}

#[test]
fn test_invalid_config_rejected_before_dial() {
    let config = Config::builder().max_packet_size(4).build();
    let result = Session::connect_with_config("127.0.0.1:1", PASSWORD, config);
    assert!(matches!(result, Err(RconError::Config(_))));
}

// =============================================================================
// Command Tests
// =============================================================================

#[test]
fn test_send_command_returns_body() {
    let server = echo_server();
    let mut session = connect(&server);

    assert_eq!(session.send_command("list").unwrap(), "echo: list");
    assert_eq!(session.send_command("say hi").unwrap(), "echo: say hi");
    assert_eq!(session.state(), SessionState::Ready);

    drop(session);
    let received = server.join();
    let ids: Vec<i32> = received.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(received[1].packet_type, PacketType::Command);
    assert_eq!(received[1].body, "list".as_bytes());
}

#[test]
fn test_execute_echoes_request_id() {
    let server = echo_server();
    let mut session = connect(&server);

    let first = session.execute("a").unwrap();
    assert_eq!(Some(first.id), session.last_request_id());
    let second = session.execute("b").unwrap();
    assert_eq!(Some(second.id), session.last_request_id());
    assert!(second.id > first.id);

    drop(session);
    server.join();
}

#[test]
fn test_empty_and_large_replies() {
    let large = "x".repeat(5000);
    let large_reply = large.clone();
    let server = MockServer::spawn(move |stream| {
        serve(stream, PASSWORD, move |cmd| {
            if cmd == "big" {
                large_reply.clone()
            } else {
                String::new()
            }
        })
    });
    let mut session = connect(&server);

    assert_eq!(session.send_command("quiet").unwrap(), "");
    assert_eq!(session.send_command("big").unwrap(), large);

    drop(session);
    server.join();
}

#[test]
fn test_fragmented_reply_is_reassembled() {
    let body = "players online: alice, bob, carol";
    let server = MockServer::spawn(move |mut stream| {
        handle_login(&mut stream, PASSWORD);
        let request = read_request(&mut stream).unwrap();
        let bytes = encode(request.id, PacketType::ResponseValue, body.as_bytes());
        // split inside the length prefix, the header and the body
        write_fragmented(&mut stream, &bytes, &[1, 3, 6, 13, 20, bytes.len() - 1]);
        drain(&mut stream);
    });
    let mut session = connect(&server);

    assert_eq!(session.send_command("list").unwrap(), body);

    drop(session);
    server.join();
}

#[test]
fn test_back_to_back_replies_stay_correlated() {
    let server = MockServer::spawn(|mut stream| {
        handle_login(&mut stream, PASSWORD);
        let first = read_request(&mut stream).unwrap();

        // both replies in one write; the second answers the next request id
        let mut bytes = encode(first.id, PacketType::ResponseValue, b"one").to_vec();
        bytes.extend_from_slice(&encode(first.id + 1, PacketType::ResponseValue, b"two"));
        write_fragmented(&mut stream, &bytes, &[]);

        let second = read_request(&mut stream).unwrap();
        drain(&mut stream);
        (first.id, second.id)
    });
    let mut session = connect(&server);

    let one = session.execute("first").unwrap();
    let two = session.execute("second").unwrap();

    assert_eq!(one.body_text(), "one");
    assert_eq!(two.body_text(), "two");

    drop(session);
    let (first_id, second_id) = server.join();
    assert_eq!(one.id, first_id);
    assert_eq!(two.id, second_id);
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_response_id_mismatch_is_framing_error() {
    let server = MockServer::spawn(|mut stream| {
        handle_login(&mut stream, PASSWORD);
        let request = read_request(&mut stream).unwrap();
        reply(&mut stream, request.id + 7, PacketType::ResponseValue, b"stale");
        drain(&mut stream);
    });
    let mut session = connect(&server);

    let result = session.send_command("list");

    match result {
        Err(RconError::Framing(msg)) => assert!(msg.contains("does not match")),
        other => panic!("Expected framing error, got {:?}", other),
    }
    assert_eq!(session.state(), SessionState::Failed);

    // terminal: nothing else goes over the socket
    assert!(matches!(session.send_command("list"), Err(RconError::SessionFailed)));

    drop(session);
    server.join();
}

#[test]
fn test_read_timeout_fails_session() {
    let server = MockServer::spawn(|mut stream| {
        handle_login(&mut stream, PASSWORD);
        read_request(&mut stream);
        drain(&mut stream);
    });
    let config = Config::builder().read_timeout_ms(150).build();
    let mut session = Session::connect_with_config(&server.address(), PASSWORD, config).unwrap();

    let err = session.send_command("hang").unwrap_err();

    assert!(err.is_timeout(), "Expected timeout, got {:?}", err);
    assert_eq!(session.state(), SessionState::Failed);

    drop(session);
    server.join();
}

#[test]
fn test_trickled_reply_is_bounded_by_round_trip_timeout() {
    let server = MockServer::spawn(|mut stream| {
        handle_login(&mut stream, PASSWORD);
        let request = read_request(&mut stream).unwrap();
        let bytes = encode(request.id, PacketType::ResponseValue, b"0123456789012345678901");

        // one byte per 100 ms keeps every single read under the timeout
        for byte in bytes.iter() {
            if stream.write_all(&[*byte]).is_err() {
                return;
            }
            thread::sleep(Duration::from_millis(100));
        }
    });
    let config = Config::builder().read_timeout_ms(300).build();
    let mut session = Session::connect_with_config(&server.address(), PASSWORD, config).unwrap();

    let started = Instant::now();
    let err = session.send_command("list").unwrap_err();
    let elapsed = started.elapsed();

    assert!(err.is_timeout(), "Expected timeout, got {:?}", err);
    assert!(elapsed < Duration::from_millis(1500), "round trip took {:?}", elapsed);
    assert_eq!(session.state(), SessionState::Failed);

    drop(session);
    server.join();
}

#[test]
fn test_write_timeout_reports_write_timeout_value() {
    let server = MockServer::spawn(|mut stream| {
        handle_login(&mut stream, PASSWORD);
        // never read the command so the socket buffers fill up
        thread::sleep(Duration::from_millis(1500));
    });
    let config = Config::builder()
        .read_timeout_ms(5000)
        .write_timeout_ms(200)
        .build();
    let mut session = Session::connect_with_config(&server.address(), PASSWORD, config).unwrap();

    let huge = "x".repeat(64 * 1024 * 1024);
    let err = session.send_command(&huge).unwrap_err();

    match err {
        RconError::Timeout(msg) => {
            assert!(msg.starts_with("write"), "unexpected message: {}", msg);
            assert!(msg.contains("200 ms"), "unexpected message: {}", msg);
        }
        other => panic!("Expected timeout, got {:?}", other),
    }
    assert_eq!(session.state(), SessionState::Failed);

    drop(session);
    server.join();
}

#[test]
fn test_oversized_reply_is_framing_error() {
    let server = MockServer::spawn(|stream| serve(stream, PASSWORD, |_| "y".repeat(1000)));
    let config = Config::builder().max_packet_size(64).build();
    let mut session = Session::connect_with_config(&server.address(), PASSWORD, config).unwrap();

    let result = session.send_command("list");

    assert!(matches!(result, Err(RconError::Framing(_))));
    assert_eq!(session.state(), SessionState::Failed);

    drop(session);
    server.join();
}

#[test]
fn test_server_hangup_is_io_error() {
    let server = MockServer::spawn(|mut stream| {
        handle_login(&mut stream, PASSWORD);
        read_request(&mut stream);
    });
    let mut session = connect(&server);

    let result = session.send_command("stop");

    assert!(matches!(result, Err(RconError::Io(_))));
    assert_eq!(session.state(), SessionState::Failed);

    server.join();
}

#[test]
fn test_close_is_terminal() {
    let server = echo_server();
    let mut session = connect(&server);

    session.close().unwrap();

    assert_eq!(session.state(), SessionState::Closed);
    assert!(matches!(session.send_command("list"), Err(RconError::SessionFailed)));
    session.close().unwrap();

    server.join();
}

// =============================================================================
// Request Id Isolation Tests
// =============================================================================

#[test]
fn test_sessions_have_independent_id_sequences() {
    let server_a = echo_server();
    let server_b = echo_server();

    let mut a = connect(&server_a);
    a.send_command("one").unwrap();
    a.send_command("two").unwrap();

    let mut b = connect(&server_b);
    b.send_command("one").unwrap();

    assert_eq!(a.last_request_id(), Some(3));
    assert_eq!(b.last_request_id(), Some(2));

    drop(a);
    drop(b);
    let ids_b: Vec<i32> = server_b.join().iter().map(|p| p.id).collect();
    assert_eq!(ids_b, vec![1, 2]);
    server_a.join();
}
