// src/core/pubsub/mod.rs

//! The client-side publish-subscribe engine.
//!
//! The engine tracks two sets per channel mode: `desired` (what the
//! application asked for) and `actual` (what the servers have acknowledged),
//! and drives them to equality across reconnects. Push frames delivered by
//! connection actors flow through a bounded queue to the user callback.

use crate::config::{NodeAddress, QueueOverflowPolicy};
use crate::core::cluster::key_hash_slot;
use crate::core::cluster::topology::TopologyView;
use crate::core::commands::pubsub as pubsub_commands;
use crate::core::connection::manager::ConnectionManager;
use crate::core::connection::{NodeConnection, PushEvent, ResubscribeHook};
use crate::core::errors::ClientError;
use crate::core::protocol::{PushKind, RespFrame, push_kind};
use bytes::Bytes;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Notify, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// The three subscription modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    /// A literal channel name.
    Exact,
    /// A glob-style pattern.
    Pattern,
    /// A channel routed by its slot (cluster mode only).
    Sharded,
}

/// One delivered Pub/Sub message.
#[derive(Debug, Clone, PartialEq)]
pub struct PushMessage {
    pub mode: ChannelMode,
    pub channel: Bytes,
    /// The matching pattern, for `Pattern` deliveries.
    pub pattern: Option<Bytes>,
    pub payload: Bytes,
}

/// The application's message callback.
pub type MessageHandler = Arc<dyn Fn(PushMessage) + Send + Sync>;

/// The desired or confirmed channels of every mode.
#[derive(Debug, Default, Clone)]
struct SubscriptionSets {
    exact: BTreeSet<Bytes>,
    pattern: BTreeSet<Bytes>,
    sharded: BTreeSet<Bytes>,
}

impl SubscriptionSets {
    fn set_mut(&mut self, mode: ChannelMode) -> &mut BTreeSet<Bytes> {
        match mode {
            ChannelMode::Exact => &mut self.exact,
            ChannelMode::Pattern => &mut self.pattern,
            ChannelMode::Sharded => &mut self.sharded,
        }
    }

    fn set(&self, mode: ChannelMode) -> &BTreeSet<Bytes> {
        match mode {
            ChannelMode::Exact => &self.exact,
            ChannelMode::Pattern => &self.pattern,
            ChannelMode::Sharded => &self.sharded,
        }
    }

    fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.pattern.is_empty() && self.sharded.is_empty()
    }
}

pub struct PubSubEngine {
    desired: Mutex<SubscriptionSets>,
    /// Updated solely by the push-processing task.
    actual: Mutex<SubscriptionSets>,

    /// The node carrying exact and pattern subscriptions. In standalone mode
    /// this is the sole node; in cluster mode one primary is designated and
    /// replaced if it goes away.
    exact_home: Mutex<Option<NodeAddress>>,

    queue: Mutex<VecDeque<PushMessage>>,
    queue_capacity: usize,
    overflow_policy: QueueOverflowPolicy,
    /// Wakes the delivery task when a message is queued.
    queue_ready: Notify,
    /// Wakes blocked producers when the delivery task frees a slot.
    queue_space: Notify,
    dropped: AtomicU64,

    handler: Mutex<Option<MessageHandler>>,
    topology: Arc<TopologyView>,
    /// Registered after construction; the engine and the connection layer
    /// reference each other only through this cell and the hook trait.
    manager: OnceCell<Arc<ConnectionManager>>,
}

impl PubSubEngine {
    pub fn new(
        topology: Arc<TopologyView>,
        queue_capacity: usize,
        overflow_policy: QueueOverflowPolicy,
        handler: Option<MessageHandler>,
    ) -> Self {
        Self {
            desired: Mutex::new(SubscriptionSets::default()),
            actual: Mutex::new(SubscriptionSets::default()),
            exact_home: Mutex::new(None),
            queue: Mutex::new(VecDeque::new()),
            queue_capacity,
            overflow_policy,
            queue_ready: Notify::new(),
            queue_space: Notify::new(),
            dropped: AtomicU64::new(0),
            handler: Mutex::new(handler),
            topology,
            manager: OnceCell::new(),
        }
    }

    pub fn register_manager(&self, manager: Arc<ConnectionManager>) {
        let _ = self.manager.set(manager);
    }

    pub fn set_handler(&self, handler: MessageHandler) {
        *self.handler.lock() = Some(handler);
    }

    /// Messages discarded by the overflow policy since the client started.
    pub fn dropped_messages(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// The server-acknowledged channels of a mode.
    pub fn confirmed(&self, mode: ChannelMode) -> Vec<Bytes> {
        self.actual.lock().set(mode).iter().cloned().collect()
    }

    pub fn desired(&self, mode: ChannelMode) -> Vec<Bytes> {
        self.desired.lock().set(mode).iter().cloned().collect()
    }

    /// Adds channels to the desired set and issues the subscribe commands on
    /// the relevant connections. Confirmation arrives asynchronously through
    /// acknowledgement pushes.
    pub async fn subscribe(
        &self,
        mode: ChannelMode,
        channels: Vec<Bytes>,
    ) -> Result<(), ClientError> {
        if channels.is_empty() {
            return Ok(());
        }
        self.desired
            .lock()
            .set_mut(mode)
            .extend(channels.iter().cloned());
        self.issue_subscriptions(mode, channels, true).await
    }

    /// Removes channels from the desired set and issues the unsubscribe
    /// commands. The `actual` entries clear when the server acknowledges.
    pub async fn unsubscribe(
        &self,
        mode: ChannelMode,
        channels: Vec<Bytes>,
    ) -> Result<(), ClientError> {
        if channels.is_empty() {
            return Ok(());
        }
        {
            let mut desired = self.desired.lock();
            let set = desired.set_mut(mode);
            for channel in &channels {
                set.remove(channel);
            }
        }
        self.issue_subscriptions(mode, channels, false).await
    }

    async fn issue_subscriptions(
        &self,
        mode: ChannelMode,
        channels: Vec<Bytes>,
        subscribe: bool,
    ) -> Result<(), ClientError> {
        match mode {
            ChannelMode::Exact | ChannelMode::Pattern => {
                let connection = self.home_connection()?;
                let cmd = match (mode, subscribe) {
                    (ChannelMode::Exact, true) => pubsub_commands::subscribe(channels),
                    (ChannelMode::Exact, false) => pubsub_commands::unsubscribe(channels),
                    (ChannelMode::Pattern, true) => pubsub_commands::psubscribe(channels),
                    (ChannelMode::Pattern, false) => pubsub_commands::punsubscribe(channels),
                    _ => unreachable!(),
                };
                connection.request(cmd.to_frame()).await?;
            }
            ChannelMode::Sharded => {
                // Sharded channels route individually by slot.
                for channel in channels {
                    let connection = self.shard_connection(&channel)?;
                    let cmd = if subscribe {
                        pubsub_commands::ssubscribe(channel)
                    } else {
                        pubsub_commands::sunsubscribe(channel)
                    };
                    connection.request(cmd.to_frame()).await?;
                }
            }
        }
        Ok(())
    }

    fn manager(&self) -> Result<&Arc<ConnectionManager>, ClientError> {
        self.manager.get().ok_or(ClientError::Closing)
    }

    /// The connection carrying exact/pattern subscriptions, designating a
    /// home node if none is set.
    fn home_connection(&self) -> Result<NodeConnection, ClientError> {
        let manager = self.manager()?;
        let mut home = self.exact_home.lock();
        let addr = match home.as_ref() {
            Some(addr) => addr.clone(),
            None => {
                let topology = self.topology.load();
                let addr = topology.random_primary().addr.clone();
                *home = Some(addr.clone());
                addr
            }
        };
        Ok(manager.get_or_connect(&addr))
    }

    fn shard_connection(&self, channel: &Bytes) -> Result<NodeConnection, ClientError> {
        let manager = self.manager()?;
        let topology = self.topology.load();
        let shard = topology.shard_for_slot(key_hash_slot(channel))?;
        Ok(manager.get_or_connect(&shard.primary.addr))
    }

    /// Spawns the push-processing and delivery tasks.
    pub fn spawn_tasks(
        self: Arc<Self>,
        push_rx: mpsc::UnboundedReceiver<PushEvent>,
        shutdown: CancellationToken,
    ) -> Vec<tokio::task::JoinHandle<()>> {
        let processor = tokio::spawn(
            self.clone().process_events(push_rx, shutdown.clone()),
        );
        let deliverer = tokio::spawn(self.deliver_messages(shutdown));
        vec![processor, deliverer]
    }

    /// Consumes [`PushEvent`]s from every connection actor. Single consumer:
    /// per-channel ordering follows the source connection's receive order.
    async fn process_events(
        self: Arc<Self>,
        mut push_rx: mpsc::UnboundedReceiver<PushEvent>,
        shutdown: CancellationToken,
    ) {
        loop {
            let event = tokio::select! {
                biased;
                _ = shutdown.cancelled() => return,
                event = push_rx.recv() => match event {
                    Some(event) => event,
                    None => return,
                },
            };
            match event {
                PushEvent::Push { source, frame } => self.handle_push(source, frame).await,
                PushEvent::Disconnected { source } => self.handle_disconnect(source).await,
            }
        }
    }

    async fn handle_push(&self, source: NodeAddress, frame: RespFrame) {
        let Some((kind, elements)) = push_kind(&frame, true) else {
            warn!("Discarding unclassifiable push from {}: {:?}", source, frame);
            return;
        };
        match kind {
            PushKind::Message | PushKind::SMessage => {
                let mode = if kind == PushKind::Message {
                    ChannelMode::Exact
                } else {
                    ChannelMode::Sharded
                };
                if let [channel, payload] = elements {
                    self.enqueue(PushMessage {
                        mode,
                        channel: frame_bytes(channel),
                        pattern: None,
                        payload: frame_bytes(payload),
                    })
                    .await;
                }
            }
            PushKind::PMessage => {
                if let [pattern, channel, payload] = elements {
                    self.enqueue(PushMessage {
                        mode: ChannelMode::Pattern,
                        channel: frame_bytes(channel),
                        pattern: Some(frame_bytes(pattern)),
                        payload: frame_bytes(payload),
                    })
                    .await;
                }
            }
            PushKind::Subscribe | PushKind::PSubscribe | PushKind::SSubscribe => {
                let mode = match kind {
                    PushKind::Subscribe => ChannelMode::Exact,
                    PushKind::PSubscribe => ChannelMode::Pattern,
                    _ => ChannelMode::Sharded,
                };
                if let Some(channel) = elements.first() {
                    let channel = frame_bytes(channel);
                    // The acknowledgement only counts while still desired;
                    // `actual` must stay a subset of `desired`.
                    let desired = self.desired.lock().set(mode).contains(&channel);
                    if desired {
                        self.actual.lock().set_mut(mode).insert(channel);
                    }
                }
            }
            PushKind::Unsubscribe | PushKind::PUnsubscribe | PushKind::SUnsubscribe => {
                let mode = match kind {
                    PushKind::Unsubscribe => ChannelMode::Exact,
                    PushKind::PUnsubscribe => ChannelMode::Pattern,
                    _ => ChannelMode::Sharded,
                };
                if let Some(channel) = elements.first() {
                    let channel = frame_bytes(channel);
                    self.actual.lock().set_mut(mode).remove(&channel);
                }
            }
            PushKind::Invalidate => {
                debug!("Ignoring invalidation push from {}.", source);
            }
        }
    }

    /// A connection dropped: its acknowledged subscriptions are gone until
    /// the reconnect handshake replays them. If the exact/pattern home node
    /// is lost terminally, a new home is designated and re-subscribed.
    async fn handle_disconnect(&self, source: NodeAddress) {
        let is_home = self.exact_home.lock().as_ref() == Some(&source);
        {
            let mut actual = self.actual.lock();
            if is_home {
                actual.exact.clear();
                actual.pattern.clear();
            }
            // Sharded confirmations on the lost node: recompute by slot owner.
            let topology = self.topology.load();
            actual.sharded.retain(|channel| {
                topology
                    .shard_for_slot(key_hash_slot(channel))
                    .map(|shard| shard.primary.addr != source)
                    .unwrap_or(false)
            });
        }

        // The reconnect handshake replays the desired set for the same
        // address; nothing else to do unless the home node left the topology.
        if is_home && !self.topology.load().contains_address(&source) {
            let desired = self.desired.lock().clone();
            *self.exact_home.lock() = None;
            if desired.exact.is_empty() && desired.pattern.is_empty() {
                return;
            }
            debug!("Pub/Sub home {} left the topology; re-homing.", source);
            let exact: Vec<Bytes> = desired.exact.into_iter().collect();
            let pattern: Vec<Bytes> = desired.pattern.into_iter().collect();
            if !exact.is_empty()
                && let Err(e) = self.issue_subscriptions(ChannelMode::Exact, exact, true).await
            {
                warn!("Re-homing exact subscriptions failed: {}", e);
            }
            if !pattern.is_empty()
                && let Err(e) = self
                    .issue_subscriptions(ChannelMode::Pattern, pattern, true)
                    .await
            {
                warn!("Re-homing pattern subscriptions failed: {}", e);
            }
        }
    }

    /// Queues a message for delivery, applying the overflow policy.
    async fn enqueue(&self, message: PushMessage) {
        loop {
            {
                let mut queue = self.queue.lock();
                if queue.len() < self.queue_capacity {
                    queue.push_back(message);
                    self.queue_ready.notify_one();
                    return;
                }
                match self.overflow_policy {
                    QueueOverflowPolicy::DropOldest => {
                        queue.pop_front();
                        self.dropped.fetch_add(1, Ordering::Relaxed);
                        queue.push_back(message);
                        self.queue_ready.notify_one();
                        return;
                    }
                    QueueOverflowPolicy::DropNewest => {
                        self.dropped.fetch_add(1, Ordering::Relaxed);
                        return;
                    }
                    QueueOverflowPolicy::Block => {}
                }
            }
            // Block policy: wait for the delivery task to free a slot. This
            // back-pressures the push-processing task, not the socket reads.
            self.queue_space.notified().await;
        }
    }

    /// Pops queued messages and invokes the user callback outside any lock.
    async fn deliver_messages(self: Arc<Self>, shutdown: CancellationToken) {
        loop {
            let message = {
                let mut queue = self.queue.lock();
                queue.pop_front()
            };
            match message {
                Some(message) => {
                    self.queue_space.notify_one();
                    let handler = self.handler.lock().clone();
                    if let Some(handler) = handler {
                        handler(message);
                    }
                }
                None => {
                    tokio::select! {
                        biased;
                        _ = shutdown.cancelled() => return,
                        _ = self.queue_ready.notified() => {}
                    }
                }
            }
        }
    }
}

impl ResubscribeHook for PubSubEngine {
    /// The subscription frames to replay on `addr` before it resumes
    /// application traffic.
    fn resubscribe_frames(&self, addr: &NodeAddress) -> Vec<RespFrame> {
        let desired = self.desired.lock().clone();
        if desired.is_empty() {
            return Vec::new();
        }
        let mut frames = Vec::new();

        if self.exact_home.lock().as_ref() == Some(addr) {
            if !desired.exact.is_empty() {
                frames.push(
                    pubsub_commands::subscribe(desired.exact.into_iter().collect()).to_frame(),
                );
            }
            if !desired.pattern.is_empty() {
                frames.push(
                    pubsub_commands::psubscribe(desired.pattern.into_iter().collect()).to_frame(),
                );
            }
        }

        let topology = self.topology.load();
        for channel in desired.sharded {
            let owned_here = topology
                .shard_for_slot(key_hash_slot(&channel))
                .map(|shard| &shard.primary.addr == addr)
                .unwrap_or(false);
            if owned_here {
                frames.push(pubsub_commands::ssubscribe(channel).to_frame());
            }
        }
        frames
    }
}

/// Extracts the byte payload of a push element.
fn frame_bytes(frame: &RespFrame) -> Bytes {
    match frame {
        RespFrame::BulkString(bytes) => bytes.clone(),
        RespFrame::SimpleString(s) => Bytes::from(s.clone()),
        other => Bytes::from(format!("{other:?}")),
    }
}
