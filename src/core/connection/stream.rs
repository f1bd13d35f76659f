// src/core/connection/stream.rs

//! Dialing and the plain-TCP / TLS stream abstraction.

use crate::config::NodeAddress;
use crate::core::errors::ClientError;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls;

/// An enum to wrap different stream types (plain TCP or TLS) into a single type.
pub enum AnyStream {
    Tcp(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

/// Opens a transport to `addr` within `timeout`, performing the TLS handshake
/// when requested.
pub async fn connect_stream(
    addr: &NodeAddress,
    use_tls: bool,
    timeout: Duration,
) -> Result<AnyStream, ClientError> {
    let target = format!("{}:{}", addr.host, addr.port);
    let tcp_stream = tokio::time::timeout(timeout, TcpStream::connect(&target))
        .await
        .map_err(|_| ClientError::Connection(format!("connect to {target} timed out")))?
        .map_err(|e| ClientError::Connection(format!("connect to {target} failed: {e}")))?;
    tcp_stream.set_nodelay(true)?;

    if !use_tls {
        return Ok(AnyStream::Tcp(tcp_stream));
    }

    let mut root_cert_store = rustls::RootCertStore::empty();
    root_cert_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let tls_config = rustls::ClientConfig::builder()
        .with_root_certificates(root_cert_store)
        .with_no_client_auth();
    let connector = TlsConnector::from(Arc::new(tls_config));

    let domain = rustls::pki_types::ServerName::try_from(addr.host.as_str())
        .map_err(|_| ClientError::Connection(format!("invalid TLS domain name {:?}", addr.host)))?
        .to_owned();

    let tls_stream = tokio::time::timeout(timeout, connector.connect(domain, tcp_stream))
        .await
        .map_err(|_| ClientError::Connection(format!("TLS handshake with {target} timed out")))?
        .map_err(|e| ClientError::Connection(format!("TLS handshake with {target} failed: {e}")))?;
    Ok(AnyStream::Tls(Box::new(tls_stream)))
}

impl AsyncRead for AnyStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            AnyStream::Tcp(s) => Pin::new(s).poll_read(cx, buf),
            AnyStream::Tls(s) => Pin::new(s.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for AnyStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<Result<usize, std::io::Error>> {
        match self.get_mut() {
            AnyStream::Tcp(s) => Pin::new(s).poll_write(cx, buf),
            AnyStream::Tls(s) => Pin::new(s.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), std::io::Error>> {
        match self.get_mut() {
            AnyStream::Tcp(s) => Pin::new(s).poll_flush(cx),
            AnyStream::Tls(s) => Pin::new(s.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<(), std::io::Error>> {
        match self.get_mut() {
            AnyStream::Tcp(s) => Pin::new(s).poll_shutdown(cx),
            AnyStream::Tls(s) => Pin::new(s.as_mut()).poll_shutdown(cx),
        }
    }
}
