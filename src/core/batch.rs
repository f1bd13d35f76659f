// src/core/batch.rs

//! Ordered execution of command batches: atomic transactions (MULTI/EXEC)
//! and non-atomic, cross-shard pipelines.

use crate::core::commands::Cmd;
use crate::core::errors::ClientError;
use crate::core::protocol::{RespFrame, Value, reply_to_value};
use crate::core::retry::{self, RetryPolicy};
use crate::core::routing::Router;
use crate::core::tasks::topology_refresh::RefreshSignal;
use bytes::Bytes;
use futures::future::join_all;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// An ordered sequence of commands executed as one unit.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    commands: Vec<Cmd>,
    atomic: bool,
    watch: Vec<Bytes>,
    raise_on_error: bool,
}

impl Batch {
    /// A non-atomic pipeline; commands may span shards.
    pub fn pipeline() -> Self {
        Self::default()
    }

    /// An atomic MULTI/EXEC transaction; all commands must share a slot.
    pub fn atomic() -> Self {
        Self {
            atomic: true,
            ..Self::default()
        }
    }

    /// Adds a `WATCH` key ahead of the transaction preamble.
    pub fn watch(mut self, key: impl Into<Bytes>) -> Self {
        self.watch.push(key.into());
        self
    }

    /// Promote the first per-command error to the batch's overall error.
    pub fn raise_on_error(mut self, raise: bool) -> Self {
        self.raise_on_error = raise;
        self
    }

    pub fn cmd(mut self, cmd: Cmd) -> Self {
        self.commands.push(cmd);
        self
    }

    pub fn push(&mut self, cmd: Cmd) {
        self.commands.push(cmd);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn is_atomic(&self) -> bool {
        self.atomic
    }
}

/// The outcome of a batch execution.
#[derive(Debug)]
pub enum BatchResponse {
    /// The transaction was discarded by the server (a watched key changed).
    Aborted,
    /// Per-command results in submission order. Failures of one command do
    /// not poison the rest.
    Completed(Vec<Result<Value, ClientError>>),
}

/// Executes a batch under the whole-batch deadline.
pub async fn execute(
    router: &Router,
    refresh: &RefreshSignal,
    batch: &Batch,
    timeout: Duration,
) -> Result<BatchResponse, ClientError> {
    if !batch.watch.is_empty() && !batch.atomic {
        return Err(ClientError::Configuration(
            "WATCH requires an atomic batch".to_string(),
        ));
    }
    // An empty batch is an empty response, not null.
    if batch.commands.is_empty() {
        return Ok(BatchResponse::Completed(Vec::new()));
    }
    let execution = async {
        if batch.atomic {
            execute_atomic(router, batch).await
        } else {
            execute_pipeline(router, refresh, batch).await
        }
    };
    match tokio::time::timeout(timeout, execution).await {
        Ok(result) => result,
        Err(_) => Err(ClientError::Timeout),
    }
}

/// Runs `WATCH? MULTI cmds EXEC` as one FIFO unit on the slot's primary.
///
/// The transaction is never replayed: once MULTI has been written the server
/// may have observed partial queuing, so any failure surfaces as-is.
async fn execute_atomic(router: &Router, batch: &Batch) -> Result<BatchResponse, ClientError> {
    let slot = shared_slot(batch)?;
    let connection = match slot {
        Some(slot) => router.target_for_slot(slot, true)?,
        // A keyless transaction may run anywhere.
        None => router.target_for(&crate::core::routing::Route::Random, true)?,
    };

    let mut frames = Vec::with_capacity(batch.commands.len() + 3);
    if !batch.watch.is_empty() {
        let mut watch = vec![Bytes::from_static(b"WATCH")];
        watch.extend(batch.watch.iter().cloned());
        frames.push(RespFrame::command(watch));
    }
    frames.push(RespFrame::command(vec![Bytes::from_static(b"MULTI")]));
    for cmd in &batch.commands {
        frames.push(cmd.to_frame());
    }
    frames.push(RespFrame::command(vec![Bytes::from_static(b"EXEC")]));

    let mut replies = connection.request_batch(frames).await?;
    let exec_reply = replies
        .pop()
        .ok_or_else(|| ClientError::Protocol("short transaction reply".to_string()))?;

    // Preamble and queuing replies: a transport failure or a queuing error
    // aborts the transaction.
    for reply in replies {
        match reply {
            Ok(RespFrame::Error(message)) => {
                debug!("Transaction preamble rejected: {message}");
                return match ClientError::from_server_message(&message) {
                    e @ (ClientError::Moved { .. } | ClientError::Ask { .. }) => Err(e),
                    _ => Err(ClientError::ExecAbort),
                };
            }
            Ok(_) => {}
            Err(e) => return Err(e),
        }
    }

    match exec_reply? {
        // Null EXEC: a watched key changed; the whole batch is the abort
        // sentinel.
        RespFrame::NullArray | RespFrame::Null => Ok(BatchResponse::Aborted),
        RespFrame::Error(message) => Err(ClientError::from_server_message(&message)),
        RespFrame::Array(results) => {
            let mut values = Vec::with_capacity(results.len());
            for result in results {
                values.push(reply_to_value(result));
            }
            if batch.raise_on_error
                && let Some(Err(e)) = values.iter().find(|value| value.is_err())
            {
                return Err(e.clone());
            }
            Ok(BatchResponse::Completed(values))
        }
        other => Err(ClientError::Protocol(format!(
            "unexpected EXEC reply: {other:?}"
        ))),
    }
}

/// All commands (and WATCH keys) of an atomic batch must hash to one slot.
fn shared_slot(batch: &Batch) -> Result<Option<u16>, ClientError> {
    let mut shared: Option<u16> = None;
    let watch_slots = batch
        .watch
        .iter()
        .map(|key| crate::core::cluster::key_hash_slot(key));
    let command_slots = batch.commands.iter().filter_map(|cmd| cmd.slot());
    for slot in watch_slots.chain(command_slots) {
        match shared {
            None => shared = Some(slot),
            Some(existing) if existing != slot => return Err(ClientError::CrossSlot),
            Some(_) => {}
        }
    }
    Ok(shared)
}

/// Groups commands per target node, streams each group back-to-back, and
/// reassembles results in submission order. Redirected or retryable members
/// are re-dispatched individually; completed members are never replayed.
async fn execute_pipeline(
    router: &Router,
    refresh: &RefreshSignal,
    batch: &Batch,
) -> Result<BatchResponse, ClientError> {
    // Group by resolved target, remembering each command's original index.
    // Multi-key commands spanning slots are peeled off and executed through
    // the per-slot splitter instead.
    let mut groups: HashMap<String, (crate::core::connection::NodeConnection, Vec<usize>)> =
        HashMap::new();
    let mut split_members: Vec<(usize, crate::core::dispatch::MultiKeyKind)> = Vec::new();
    for (index, cmd) in batch.commands.iter().enumerate() {
        if cmd.route.is_multi() {
            return Err(ClientError::Configuration(
                "fan-out commands cannot be pipelined".to_string(),
            ));
        }
        if let Some(kind) = crate::core::dispatch::multikey_kind(cmd).filter(|_| router.is_cluster())
        {
            split_members.push((index, kind));
            continue;
        }
        let connection = router.target_for(&cmd.route, cmd.is_write())?;
        let entry = groups
            .entry(connection.addr().to_string())
            .or_insert_with(|| (connection, Vec::new()));
        entry.1.push(index);
    }

    let mut slots: Vec<Option<Result<Value, ClientError>>> = Vec::new();
    slots.resize_with(batch.commands.len(), || None);

    let runs = groups.into_values().map(|(connection, indexes)| {
        let frames: Vec<RespFrame> = indexes
            .iter()
            .map(|&index| batch.commands[index].to_frame())
            .collect();
        async move { (indexes, connection.request_batch(frames).await) }
    });

    let splits = split_members.into_iter().map(|(index, kind)| async move {
        let cmd = &batch.commands[index];
        (
            index,
            crate::core::dispatch::execute_split(router, refresh, cmd, kind).await,
        )
    });
    for (index, value) in join_all(splits).await {
        slots[index] = Some(value);
    }

    for (indexes, outcome) in join_all(runs).await {
        match outcome {
            Ok(replies) => {
                for (&index, reply) in indexes.iter().zip(replies) {
                    let value = match reply {
                        Ok(frame) => reply_to_value(frame),
                        Err(e) => Err(e),
                    };
                    slots[index] = Some(value);
                }
            }
            Err(e) => {
                for &index in &indexes {
                    slots[index] = Some(Err(e.clone()));
                }
            }
        }
    }

    // Second pass: members that failed with a redirect or a safely retryable
    // transport error are re-dispatched one by one through the normal engine.
    for (index, slot) in slots.iter_mut().enumerate() {
        let retryable = matches!(
            slot,
            Some(Err(
                ClientError::Moved { .. } | ClientError::Ask { .. } | ClientError::TryAgain(_)
            ))
        ) || matches!(slot, Some(Err(ClientError::Connection(_))))
            || (matches!(slot, Some(Err(ClientError::Disconnect(_))))
                && !batch.commands[index].is_write());
        if !retryable {
            continue;
        }
        let cmd = &batch.commands[index];
        debug!("Re-dispatching pipelined command {} after {:?}.", cmd.name, slot);
        let policy = RetryPolicy::for_command(cmd);
        let value = match retry::execute_single(router, refresh, cmd, &policy).await {
            Ok(frame) => reply_to_value(frame),
            Err(e) => Err(e),
        };
        *slot = Some(value);
    }

    let mut values = Vec::with_capacity(slots.len());
    for slot in slots {
        values.push(slot.unwrap_or_else(|| {
            Err(ClientError::Protocol(
                "pipelined command produced no result".to_string(),
            ))
        }));
    }
    if batch.raise_on_error
        && let Some(Err(e)) = values.iter().find(|value| value.is_err())
    {
        return Err(e.clone());
    }
    Ok(BatchResponse::Completed(values))
}
