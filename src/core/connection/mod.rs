// src/core/connection/mod.rs

//! One duplex channel to one node.
//!
//! A [`NodeConnection`] is a cheap handle onto an actor task that owns the
//! framed socket. Senders enqueue requests through a FIFO submission queue;
//! the actor writes them in order, keeps one waiter per in-flight request,
//! and matches each reply frame to the head of the FIFO. Push frames bypass
//! the FIFO and are forwarded to the Pub/Sub engine.

pub mod backoff;
pub mod manager;
pub mod stream;

use self::backoff::Backoff;
use self::stream::{AnyStream, connect_stream};
use crate::config::NodeAddress;
use crate::core::connection::manager::ConnectionContext;
use crate::core::errors::ClientError;
use crate::core::protocol::{RespCodec, RespFrame, push_kind, reply_to_value};
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// The lifecycle states of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Ready,
    Reconnecting,
    Closed,
}

/// Completes with the raw reply frame; server-side error frames are
/// delivered as `Ok(RespFrame::Error(..))` and classified by the caller.
type ReplyWaiter = oneshot::Sender<Result<RespFrame, ClientError>>;

/// A submission into the connection's FIFO queue.
enum Outbound {
    Single {
        frame: RespFrame,
        waiter: ReplyWaiter,
    },
    /// A run of back-to-back writes; waiters complete individually, in order.
    Batch {
        frames: Vec<RespFrame>,
        waiters: Vec<ReplyWaiter>,
    },
}

/// Out-of-band events delivered to the Pub/Sub engine.
#[derive(Debug)]
pub enum PushEvent {
    /// A push frame (or RESP2 subscriber-mode array) received from a node.
    Push {
        source: NodeAddress,
        frame: RespFrame,
    },
    /// The connection to a node dropped; its confirmed subscriptions are gone.
    Disconnected { source: NodeAddress },
}

/// Supplies the subscription frames to replay during a reconnect handshake.
pub trait ResubscribeHook: Send + Sync {
    fn resubscribe_frames(&self, addr: &NodeAddress) -> Vec<RespFrame>;
}

/// A cloneable handle to one node's connection actor.
#[derive(Clone)]
pub struct NodeConnection {
    shared: Arc<ConnectionShared>,
}

struct ConnectionShared {
    addr: NodeAddress,
    submit_tx: mpsc::UnboundedSender<Outbound>,
    state_rx: watch::Receiver<ConnectionState>,
    /// The credential epoch this connection last authenticated with.
    auth_epoch: AtomicU64,
    shutdown: CancellationToken,
}

impl NodeConnection {
    /// Spawns the actor for `addr` and returns its handle. The actor runs
    /// until the connection token (a child of the client's shutdown token)
    /// is cancelled or the reconnect budget is exhausted.
    pub(crate) fn spawn(
        addr: NodeAddress,
        ctx: Arc<ConnectionContext>,
    ) -> (NodeConnection, tokio::task::JoinHandle<()>) {
        let (submit_tx, submit_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
        let shutdown = ctx.shutdown.child_token();

        let shared = Arc::new(ConnectionShared {
            addr: addr.clone(),
            submit_tx,
            state_rx,
            auth_epoch: AtomicU64::new(0),
            shutdown: shutdown.clone(),
        });

        let actor = ConnectionActor {
            addr,
            ctx,
            submit_rx,
            state_tx,
            shutdown,
            shared: shared.clone(),
            pending: VecDeque::new(),
            subscriber_mode: false,
        };
        let handle = tokio::spawn(actor.run());
        (NodeConnection { shared }, handle)
    }

    pub fn addr(&self) -> &NodeAddress {
        &self.shared.addr
    }

    pub fn state(&self) -> ConnectionState {
        *self.shared.state_rx.borrow()
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ConnectionState::Ready
    }

    pub fn auth_epoch(&self) -> u64 {
        self.shared.auth_epoch.load(Ordering::Acquire)
    }

    pub fn set_auth_epoch(&self, epoch: u64) {
        self.shared.auth_epoch.store(epoch, Ordering::Release);
    }

    /// Signals the actor to terminate. Pending waiters complete with
    /// [`ClientError::Closing`].
    pub fn close(&self) {
        self.shared.shutdown.cancel();
    }

    /// Submits one command and waits for its reply frame.
    pub async fn request(&self, frame: RespFrame) -> Result<RespFrame, ClientError> {
        let (waiter, rx) = oneshot::channel();
        self.shared
            .submit_tx
            .send(Outbound::Single { frame, waiter })
            .map_err(|_| self.closed_error())?;
        match rx.await {
            Ok(result) => result,
            // Dropping the receiver cancels cleanly; a dropped *sender* means
            // the actor died between enqueue and write.
            Err(_) => Err(self.closed_error()),
        }
    }

    /// Submits a run of commands back-to-back as one FIFO unit and collects
    /// each command's reply independently.
    pub async fn request_batch(
        &self,
        frames: Vec<RespFrame>,
    ) -> Result<Vec<Result<RespFrame, ClientError>>, ClientError> {
        let mut waiters = Vec::with_capacity(frames.len());
        let mut receivers = Vec::with_capacity(frames.len());
        for _ in 0..frames.len() {
            let (waiter, rx) = oneshot::channel();
            waiters.push(waiter);
            receivers.push(rx);
        }
        self.shared
            .submit_tx
            .send(Outbound::Batch { frames, waiters })
            .map_err(|_| self.closed_error())?;

        let mut results = Vec::with_capacity(receivers.len());
        for rx in receivers {
            results.push(match rx.await {
                Ok(result) => result,
                Err(_) => Err(self.closed_error()),
            });
        }
        Ok(results)
    }

    fn closed_error(&self) -> ClientError {
        ClientError::Connection(format!("connection to {} is closed", self.shared.addr))
    }
}

impl std::fmt::Debug for NodeConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeConnection")
            .field("addr", &self.shared.addr)
            .field("state", &self.state())
            .finish()
    }
}

/// Why the serve loop stopped.
enum ServeOutcome {
    /// Transport loss or protocol corruption; reconnect.
    Lost(String),
    /// Shutdown was requested or every sender is gone.
    Shutdown,
}

struct ConnectionActor {
    addr: NodeAddress,
    ctx: Arc<ConnectionContext>,
    submit_rx: mpsc::UnboundedReceiver<Outbound>,
    state_tx: watch::Sender<ConnectionState>,
    shutdown: CancellationToken,
    shared: Arc<ConnectionShared>,
    /// Waiters for requests already written to the socket, in write order.
    pending: VecDeque<ReplyWaiter>,
    /// True once this connection carries subscriptions; needed to recognize
    /// RESP2 Pub/Sub traffic, which arrives as plain arrays.
    subscriber_mode: bool,
}

impl ConnectionActor {
    async fn run(mut self) {
        let mut backoff = Backoff::new(self.ctx.settings.reconnect_backoff.clone());
        let mut first_attempt = true;
        loop {
            if self.shutdown.is_cancelled() {
                break;
            }
            self.set_state(if first_attempt {
                ConnectionState::Connecting
            } else {
                ConnectionState::Reconnecting
            });

            match self.establish().await {
                Ok(mut framed) => {
                    backoff.reset();
                    self.set_state(ConnectionState::Ready);
                    info!("Connection to {} is ready.", self.addr);
                    match self.serve(&mut framed).await {
                        ServeOutcome::Shutdown => break,
                        ServeOutcome::Lost(reason) => {
                            warn!("Connection to {} lost: {}", self.addr, reason);
                            self.fail_pending(ClientError::Disconnect(reason));
                            let _ = self.ctx.push_tx.send(PushEvent::Disconnected {
                                source: self.addr.clone(),
                            });
                            first_attempt = false;
                        }
                    }
                }
                Err(e) => {
                    debug!("Connection attempt to {} failed: {}", self.addr, e);
                    first_attempt = false;
                    let Some(delay) = backoff.next_delay() else {
                        warn!(
                            "Giving up on {} after {} attempts.",
                            self.addr,
                            backoff.attempts_made()
                        );
                        break;
                    };
                    tokio::select! {
                        _ = self.shutdown.cancelled() => break,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
        self.terminate();
    }

    /// Dials the node and runs the full handshake: protocol negotiation and
    /// AUTH, CLIENT SETNAME, SELECT, then replay of the desired Pub/Sub set.
    /// No application request is written before the handshake completes.
    async fn establish(&mut self) -> Result<Framed<AnyStream, RespCodec>, ClientError> {
        let settings = &self.ctx.settings;
        let stream =
            connect_stream(&self.addr, settings.use_tls, settings.connect_timeout()).await?;
        let mut framed = Framed::new(stream, RespCodec);
        self.subscriber_mode = false;

        // HELLO 3, with inline AUTH when credentials are configured. Servers
        // predating HELLO reject it with ERR; fall back to RESP2 + AUTH.
        let credentials = self.ctx.credentials.snapshot();
        let credential_epoch = self.ctx.credentials.epoch();
        let mut hello: Vec<Bytes> = vec![Bytes::from_static(b"HELLO"), Bytes::from_static(b"3")];
        if let Some(creds) = &credentials {
            hello.push(Bytes::from_static(b"AUTH"));
            hello.push(Bytes::from(
                creds.username.clone().unwrap_or_else(|| "default".to_string()),
            ));
            hello.push(Bytes::from(creds.password.clone()));
        }
        match self.exchange(&mut framed, RespFrame::command(hello)).await? {
            RespFrame::Error(message) if message.starts_with("ERR") => {
                debug!("{} does not support HELLO; falling back to RESP2.", self.addr);
                if let Some(creds) = &credentials {
                    let auth = crate::core::commands::server::auth(
                        creds.username.as_deref(),
                        &creds.password,
                    );
                    self.expect_ok(&mut framed, auth.to_frame(), "AUTH").await?;
                }
            }
            RespFrame::Error(message) => {
                return Err(ClientError::Connection(format!(
                    "handshake with {} rejected: {message}",
                    self.addr
                )));
            }
            _ => {}
        }
        self.shared
            .auth_epoch
            .store(credential_epoch, Ordering::Release);

        if let Some(name) = &settings.client_name {
            let setname = crate::core::commands::server::client_setname(name.clone());
            self.expect_ok(&mut framed, setname.to_frame(), "CLIENT SETNAME")
                .await?;
        }

        let database_id = self.ctx.database_id.load(Ordering::Acquire);
        if database_id != 0 {
            let select = crate::core::commands::server::select(database_id);
            self.expect_ok(&mut framed, select.to_frame(), "SELECT").await?;
        }

        // Replay the desired subscription set before releasing application
        // traffic. Acknowledgements arrive as pushes once the serve loop runs.
        if let Some(hook) = self.ctx.resubscribe.get() {
            let frames = hook.resubscribe_frames(&self.addr);
            if !frames.is_empty() {
                self.subscriber_mode = true;
                for frame in frames {
                    framed.feed(frame).await?;
                }
                framed.flush().await?;
            }
        }
        Ok(framed)
    }

    /// Writes one handshake frame and reads its reply.
    async fn exchange(
        &self,
        framed: &mut Framed<AnyStream, RespCodec>,
        frame: RespFrame,
    ) -> Result<RespFrame, ClientError> {
        framed.send(frame).await?;
        match tokio::time::timeout(self.ctx.settings.connect_timeout(), framed.next()).await {
            Ok(Some(reply)) => reply,
            Ok(None) => Err(ClientError::Connection(format!(
                "{} closed the connection during the handshake",
                self.addr
            ))),
            Err(_) => Err(ClientError::Connection(format!(
                "handshake with {} timed out",
                self.addr
            ))),
        }
    }

    async fn expect_ok(
        &self,
        framed: &mut Framed<AnyStream, RespCodec>,
        frame: RespFrame,
        step: &str,
    ) -> Result<(), ClientError> {
        let reply = self.exchange(framed, frame).await?;
        reply_to_value(reply).map_err(|e| {
            ClientError::Connection(format!("{step} rejected by {}: {e}", self.addr))
        })?;
        Ok(())
    }

    /// The ready-state event loop: submissions out, frames in.
    async fn serve(&mut self, framed: &mut Framed<AnyStream, RespCodec>) -> ServeOutcome {
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    return ServeOutcome::Shutdown;
                }
                submission = self.submit_rx.recv() => {
                    match submission {
                        Some(outbound) => {
                            if let Err(e) = self.write_outbound(framed, outbound).await {
                                return ServeOutcome::Lost(e.to_string());
                            }
                        }
                        // All handles dropped; nothing can ever be submitted again.
                        None => return ServeOutcome::Shutdown,
                    }
                }
                incoming = framed.next() => {
                    match incoming {
                        Some(Ok(frame)) => self.dispatch_frame(frame),
                        Some(Err(e)) => return ServeOutcome::Lost(e.to_string()),
                        None => return ServeOutcome::Lost("connection closed by peer".to_string()),
                    }
                }
            }
        }
    }

    /// Writes a submission. Waiters are registered before the socket write so
    /// a mid-write failure still fails them in FIFO order.
    async fn write_outbound(
        &mut self,
        framed: &mut Framed<AnyStream, RespCodec>,
        outbound: Outbound,
    ) -> Result<(), ClientError> {
        match outbound {
            Outbound::Single { frame, waiter } => {
                // The caller may have given up (deadline, cancellation)
                // before the command was ever written; skip it entirely.
                if waiter.is_closed() {
                    return Ok(());
                }
                if let Some(subscribes) = subscription_command(&frame) {
                    // Subscription acknowledgements arrive as pushes and are
                    // consumed by the Pub/Sub engine, so the waiter completes
                    // on write rather than joining the reply FIFO.
                    if subscribes {
                        self.subscriber_mode = true;
                    }
                    framed.send(frame).await?;
                    let _ = waiter.send(Ok(RespFrame::SimpleString("OK".to_string())));
                } else {
                    self.pending.push_back(waiter);
                    framed.send(frame).await?;
                }
            }
            Outbound::Batch { frames, waiters } => {
                self.pending.extend(waiters);
                for frame in frames {
                    framed.feed(frame).await?;
                }
                framed.flush().await?;
            }
        }
        Ok(())
    }

    /// Routes one incoming frame: pushes to the Pub/Sub engine, replies to
    /// the waiter FIFO.
    fn dispatch_frame(&mut self, frame: RespFrame) {
        if push_kind(&frame, self.subscriber_mode).is_some() {
            let _ = self.ctx.push_tx.send(PushEvent::Push {
                source: self.addr.clone(),
                frame,
            });
            return;
        }
        match self.pending.pop_front() {
            // A dropped waiter means the caller cancelled after the write;
            // the reply is drained silently to keep the FIFO aligned.
            Some(waiter) => {
                let _ = waiter.send(Ok(frame));
            }
            None => {
                warn!("{} sent a reply with no pending request: {:?}", self.addr, frame);
            }
        }
    }

    fn fail_pending(&mut self, error: ClientError) {
        for waiter in self.pending.drain(..) {
            let _ = waiter.send(Err(error.clone()));
        }
    }

    fn set_state(&self, state: ConnectionState) {
        self.state_tx.send_replace(state);
    }

    /// Final teardown: fail everything still queued and publish `Closed`.
    fn terminate(&mut self) {
        self.fail_pending(ClientError::Closing);
        self.submit_rx.close();
        while let Ok(outbound) = self.submit_rx.try_recv() {
            match outbound {
                Outbound::Single { waiter, .. } => {
                    let _ = waiter.send(Err(ClientError::Closing));
                }
                Outbound::Batch { waiters, .. } => {
                    for waiter in waiters {
                        let _ = waiter.send(Err(ClientError::Closing));
                    }
                }
            }
        }
        self.set_state(ConnectionState::Closed);
        debug!("Connection actor for {} terminated.", self.addr);
    }
}

/// Recognizes subscription-management commands by their leading word.
/// Returns `Some(true)` for subscribes, `Some(false)` for unsubscribes.
fn subscription_command(frame: &RespFrame) -> Option<bool> {
    let RespFrame::Array(parts) = frame else {
        return None;
    };
    let RespFrame::BulkString(name) = parts.first()? else {
        return None;
    };
    let name = name.to_ascii_uppercase();
    match name.as_slice() {
        b"SUBSCRIBE" | b"PSUBSCRIBE" | b"SSUBSCRIBE" => Some(true),
        b"UNSUBSCRIBE" | b"PUNSUBSCRIBE" | b"SUNSUBSCRIBE" => Some(false),
        _ => None,
    }
}
