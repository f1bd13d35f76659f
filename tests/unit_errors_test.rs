// tests/unit_errors_test.rs

use peridot::ClientError;

#[test]
fn test_moved_parsing() {
    assert_eq!(
        ClientError::from_server_message("MOVED 3999 127.0.0.1:6381"),
        ClientError::Moved {
            slot: 3999,
            addr: "127.0.0.1:6381".to_string()
        }
    );
}

#[test]
fn test_ask_parsing() {
    assert_eq!(
        ClientError::from_server_message("ASK 42 10.2.0.8:7001"),
        ClientError::Ask {
            slot: 42,
            addr: "10.2.0.8:7001".to_string()
        }
    );
}

#[test]
fn test_tryagain_parsing() {
    assert_eq!(
        ClientError::from_server_message("TRYAGAIN Multiple keys request during rehashing"),
        ClientError::TryAgain("Multiple keys request during rehashing".to_string())
    );
}

#[test]
fn test_noscript_and_execabort_parsing() {
    assert_eq!(
        ClientError::from_server_message("NOSCRIPT No matching script."),
        ClientError::NoScript
    );
    assert_eq!(
        ClientError::from_server_message("EXECABORT Transaction discarded because of errors."),
        ClientError::ExecAbort
    );
}

#[test]
fn test_ordinary_errors_surface_verbatim() {
    let message = "WRONGTYPE Operation against a key holding the wrong kind of value";
    assert_eq!(
        ClientError::from_server_message(message),
        ClientError::Request(message.to_string())
    );
}

#[test]
fn test_malformed_moved_degrades_to_request_error() {
    assert_eq!(
        ClientError::from_server_message("MOVED nonsense"),
        ClientError::Request("MOVED nonsense".to_string())
    );
}

#[test]
fn test_io_errors_clone_through_arc() {
    let err: ClientError =
        std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset").into();
    let clone = err.clone();
    assert_eq!(err, clone);
    assert!(err.is_transport_error());
}
