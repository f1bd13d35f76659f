// src/core/errors.rs

//! Defines the primary error type for the entire client.

use std::sync::Arc;
use thiserror::Error;

/// The main error enum, representing all possible failures within the client.
/// Using `thiserror` allows for clean error definitions and automatic `From` trait implementations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// A node could not be reached, or the connection handshake failed.
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("IO Error: {0}")]
    Io(Arc<std::io::Error>),

    /// The per-request deadline elapsed before a response arrived.
    #[error("Request timed out")]
    Timeout,

    /// A server-side command error, surfaced with the server's message verbatim.
    #[error("{0}")]
    Request(String),

    /// An in-flight request was lost to a link failure. The server may or may
    /// not have executed the command.
    #[error("Disconnected with request in flight: {0}")]
    Disconnect(String),

    /// The transaction was aborted by the server (watched key changed, or a
    /// command failed to queue).
    #[error("EXECABORT Transaction discarded")]
    ExecAbort,

    /// Pre-submission validation failed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The client is shutting down and no longer accepts requests.
    #[error("Client is closing")]
    Closing,

    /// A malformed or unexpected frame was received.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Not enough bytes buffered to parse a full frame. Codec-internal.
    #[error("Incomplete data in stream")]
    IncompleteData,

    // --- Cluster redirections, consumed by the retry engine ---
    /// The slot now permanently lives on another node.
    #[error("MOVED {slot} {addr}")]
    Moved { slot: u16, addr: String },

    /// The key is being migrated; retry on the target with an ASKING prefix.
    #[error("ASK {slot} {addr}")]
    Ask { slot: u16, addr: String },

    /// The operation should be retried after a brief delay.
    #[error("TRYAGAIN {0}")]
    TryAgain(String),

    /// EVALSHA referenced a script unknown to the server. Consumed by the
    /// script cache, which reloads the source and retries once.
    #[error("NOSCRIPT No matching script. Please use EVAL.")]
    NoScript,

    /// Keys of an atomic batch hash to different slots.
    #[error("CROSSSLOT Keys in request don't hash to the same slot")]
    CrossSlot,
}

impl ClientError {
    /// Classifies a raw server error line into the matching variant.
    ///
    /// Redirection errors (`MOVED`, `ASK`, `TRYAGAIN`) and `NOSCRIPT` become
    /// dedicated variants so the retry engine and script cache can consume
    /// them; everything else surfaces as [`ClientError::Request`] verbatim.
    pub fn from_server_message(message: &str) -> Self {
        let mut parts = message.splitn(3, ' ');
        match parts.next().unwrap_or_default() {
            "MOVED" => {
                if let (Some(slot), Some(addr)) = (
                    parts.next().and_then(|s| s.parse::<u16>().ok()),
                    parts.next(),
                ) {
                    return ClientError::Moved {
                        slot,
                        addr: addr.to_string(),
                    };
                }
                ClientError::Request(message.to_string())
            }
            "ASK" => {
                if let (Some(slot), Some(addr)) = (
                    parts.next().and_then(|s| s.parse::<u16>().ok()),
                    parts.next(),
                ) {
                    return ClientError::Ask {
                        slot,
                        addr: addr.to_string(),
                    };
                }
                ClientError::Request(message.to_string())
            }
            "TRYAGAIN" => ClientError::TryAgain(
                message.strip_prefix("TRYAGAIN").unwrap_or("").trim().to_string(),
            ),
            "NOSCRIPT" => ClientError::NoScript,
            "EXECABORT" => ClientError::ExecAbort,
            _ => ClientError::Request(message.to_string()),
        }
    }

    /// Returns true for transport-level failures that may warrant picking a
    /// different connection, as opposed to errors the server itself produced.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            ClientError::Io(_) | ClientError::Connection(_) | ClientError::Disconnect(_)
        )
    }
}

// Manual implementation of Clone because `std::io::Error` is not cloneable.
// We wrap it in an Arc to allow for cheap, shared cloning.
impl Clone for ClientError {
    fn clone(&self) -> Self {
        match self {
            ClientError::Connection(s) => ClientError::Connection(s.clone()),
            ClientError::Io(e) => ClientError::Io(Arc::clone(e)),
            ClientError::Timeout => ClientError::Timeout,
            ClientError::Request(s) => ClientError::Request(s.clone()),
            ClientError::Disconnect(s) => ClientError::Disconnect(s.clone()),
            ClientError::ExecAbort => ClientError::ExecAbort,
            ClientError::Configuration(s) => ClientError::Configuration(s.clone()),
            ClientError::Closing => ClientError::Closing,
            ClientError::Protocol(s) => ClientError::Protocol(s.clone()),
            ClientError::IncompleteData => ClientError::IncompleteData,
            ClientError::Moved { slot, addr } => ClientError::Moved {
                slot: *slot,
                addr: addr.clone(),
            },
            ClientError::Ask { slot, addr } => ClientError::Ask {
                slot: *slot,
                addr: addr.clone(),
            },
            ClientError::TryAgain(s) => ClientError::TryAgain(s.clone()),
            ClientError::NoScript => ClientError::NoScript,
            ClientError::CrossSlot => ClientError::CrossSlot,
        }
    }
}

impl PartialEq for ClientError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ClientError::Io(e1), ClientError::Io(e2)) => e1.to_string() == e2.to_string(),
            (ClientError::Connection(s1), ClientError::Connection(s2)) => s1 == s2,
            (ClientError::Request(s1), ClientError::Request(s2)) => s1 == s2,
            (ClientError::Disconnect(s1), ClientError::Disconnect(s2)) => s1 == s2,
            (ClientError::Configuration(s1), ClientError::Configuration(s2)) => s1 == s2,
            (ClientError::Protocol(s1), ClientError::Protocol(s2)) => s1 == s2,
            (ClientError::TryAgain(s1), ClientError::TryAgain(s2)) => s1 == s2,
            (
                ClientError::Moved { slot: s1, addr: a1 },
                ClientError::Moved { slot: s2, addr: a2 },
            ) => s1 == s2 && a1 == a2,
            (
                ClientError::Ask { slot: s1, addr: a1 },
                ClientError::Ask { slot: s2, addr: a2 },
            ) => s1 == s2 && a1 == a2,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

// --- From trait implementations for easy error conversion ---

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        ClientError::Io(Arc::new(e))
    }
}

impl From<std::str::Utf8Error> for ClientError {
    fn from(e: std::str::Utf8Error) -> Self {
        ClientError::Protocol(format!("invalid UTF-8 in frame: {e}"))
    }
}

impl From<std::string::FromUtf8Error> for ClientError {
    fn from(e: std::string::FromUtf8Error) -> Self {
        ClientError::Protocol(format!("invalid UTF-8 in frame: {e}"))
    }
}
