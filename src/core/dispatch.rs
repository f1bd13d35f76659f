// src/core/dispatch.rs

//! Per-call command execution: deadline application, single-target vs
//! fan-out, and reply decoding.

use crate::core::commands::{Aggregate, Cmd};
use crate::core::errors::ClientError;
use crate::core::protocol::{Value, reply_to_value};
use crate::core::retry::{self, RetryPolicy};
use crate::core::routing::Router;
use crate::core::tasks::topology_refresh::RefreshSignal;
use bytes::Bytes;
use futures::future::join_all;
use std::time::Duration;

/// Executes one command with the request deadline and decodes the reply into
/// a [`Value`]. This is the single entry point used by every public command
/// method.
pub async fn dispatch(
    router: &Router,
    refresh: &RefreshSignal,
    cmd: &Cmd,
    timeout: Duration,
) -> Result<Value, ClientError> {
    let execution = async {
        if cmd.route.is_multi() {
            execute_fanout(router, cmd).await
        } else if let Some(kind) = multikey_kind(cmd).filter(|_| router.is_cluster()) {
            execute_split(router, refresh, cmd, kind).await
        } else {
            let policy = RetryPolicy::for_command(cmd);
            let reply = retry::execute_single(router, refresh, cmd, &policy).await?;
            reply_to_value(reply)
        }
    };
    match tokio::time::timeout(timeout, execution).await {
        Ok(result) => result,
        // The waiter is dropped on timeout; a late reply is drained silently
        // by the connection actor.
        Err(_) => Err(ClientError::Timeout),
    }
}

/// How a multi-key command's per-slot sub-results recombine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MultiKeyKind {
    /// MGET: values merge back into key positions.
    Gather,
    /// DEL/UNLINK/EXISTS/TOUCH: integer replies sum.
    Count,
    /// MSET: every sub-command must reply OK.
    SetMany,
}

pub(crate) fn multikey_kind(cmd: &Cmd) -> Option<MultiKeyKind> {
    match cmd.name {
        "MGET" => Some(MultiKeyKind::Gather),
        "DEL" | "UNLINK" | "EXISTS" | "TOUCH" => Some(MultiKeyKind::Count),
        "MSET" => Some(MultiKeyKind::SetMany),
        _ => None,
    }
}

/// Splits a multi-key command into one sub-command per slot, runs them
/// concurrently through the normal retry engine, and recombines the results.
/// The cluster rejects cross-slot multi-key commands, so this is what makes
/// `MGET a b` work when `a` and `b` hash differently.
pub(crate) async fn execute_split(
    router: &Router,
    refresh: &RefreshSignal,
    cmd: &Cmd,
    kind: MultiKeyKind,
) -> Result<Value, ClientError> {
    use crate::core::cluster::key_hash_slot;
    use std::collections::HashMap;

    let stride = if kind == MultiKeyKind::SetMany { 2 } else { 1 };
    if cmd.args.len() <= stride {
        // A single key (or pair) needs no splitting.
        let policy = RetryPolicy::for_command(cmd);
        let reply = retry::execute_single(router, refresh, cmd, &policy).await?;
        return reply_to_value(reply);
    }

    // Group the argument positions by slot, preserving order within a group.
    let mut groups: HashMap<u16, Vec<usize>> = HashMap::new();
    let mut order: Vec<u16> = Vec::new();
    for position in (0..cmd.args.len()).step_by(stride) {
        let slot = key_hash_slot(&cmd.args[position]);
        let entry = groups.entry(slot).or_default();
        if entry.is_empty() {
            order.push(slot);
        }
        entry.push(position);
    }
    if groups.len() == 1 {
        let policy = RetryPolicy::for_command(cmd);
        let reply = retry::execute_single(router, refresh, cmd, &policy).await?;
        return reply_to_value(reply);
    }

    let runs = order.into_iter().map(|slot| {
        let positions = groups[&slot].clone();
        let mut sub = Cmd {
            name: cmd.name,
            args: Vec::with_capacity(positions.len() * stride),
            flags: cmd.flags,
            route: crate::core::routing::Route::Key(cmd.args[positions[0]].clone()),
            aggregate: cmd.aggregate,
        };
        for &position in &positions {
            for offset in 0..stride {
                sub.args.push(cmd.args[position + offset].clone());
            }
        }
        async move {
            let policy = RetryPolicy::for_command(&sub);
            let reply = retry::execute_single(router, refresh, &sub, &policy).await?;
            Ok::<_, ClientError>((positions, reply_to_value(reply)?))
        }
    });

    let mut sub_results = Vec::new();
    for result in join_all(runs).await {
        sub_results.push(result?);
    }

    match kind {
        MultiKeyKind::Gather => {
            let mut merged: Vec<Value> = vec![Value::Null; cmd.args.len()];
            for (positions, value) in sub_results {
                let values = crate::core::protocol::convert::into_array(value)?;
                if values.len() != positions.len() {
                    return Err(ClientError::Protocol(
                        "short sub-command reply while merging MGET".to_string(),
                    ));
                }
                for (&position, value) in positions.iter().zip(values) {
                    merged[position] = value;
                }
            }
            Ok(Value::Array(merged))
        }
        MultiKeyKind::Count => {
            let mut total = 0i64;
            for (_, value) in sub_results {
                total += crate::core::protocol::convert::into_int(value)?;
            }
            Ok(Value::Int(total))
        }
        MultiKeyKind::SetMany => {
            for (_, value) in sub_results {
                if !matches!(value, Value::Ok) {
                    return Err(ClientError::Protocol(
                        "unexpected sub-command reply while merging MSET".to_string(),
                    ));
                }
            }
            Ok(Value::Ok)
        }
    }
}

/// Sends the command to every target of a fan-out directive concurrently and
/// folds the replies per the command's aggregation mode.
async fn execute_fanout(router: &Router, cmd: &Cmd) -> Result<Value, ClientError> {
    let targets = router.fanout_targets(&cmd.route)?;
    if targets.is_empty() {
        return Err(ClientError::Connection(
            "no nodes available for fan-out".to_string(),
        ));
    }
    let frame = cmd.to_frame();
    let requests = targets.into_iter().map(|(node, connection)| {
        let frame = frame.clone();
        async move { (node, connection.request(frame).await) }
    });

    let mut replies = Vec::new();
    for (node, result) in join_all(requests).await {
        let value = reply_to_value(result?)?;
        replies.push((node, value));
    }
    fold_replies(cmd.aggregate, replies)
}

fn fold_replies(
    aggregate: Aggregate,
    replies: Vec<(std::sync::Arc<crate::core::cluster::ClusterNode>, Value)>,
) -> Result<Value, ClientError> {
    match aggregate {
        Aggregate::Single => {
            // A fan-out command without an explicit fold; hand back the first
            // reply, which is only meaningful for uniform replies like PING.
            replies
                .into_iter()
                .next()
                .map(|(_, value)| value)
                .ok_or_else(|| ClientError::Connection("no fan-out replies".to_string()))
        }
        Aggregate::Sum => {
            let mut total = 0i64;
            for (_, value) in replies {
                total += crate::core::protocol::convert::into_int(value)?;
            }
            Ok(Value::Int(total))
        }
        Aggregate::Union => {
            let mut merged = Vec::new();
            for (_, value) in replies {
                merged.extend(crate::core::protocol::convert::into_array(value)?);
            }
            Ok(Value::Array(merged))
        }
        Aggregate::MapByNode => Ok(Value::Map(
            replies
                .into_iter()
                .map(|(node, value)| {
                    (
                        Value::String(Bytes::from(node.addr.to_string())),
                        value,
                    )
                })
                .collect(),
        )),
        Aggregate::AllOk => {
            for (node, value) in replies {
                if !matches!(value, Value::Ok) {
                    return Err(ClientError::Protocol(format!(
                        "{} replied {:?} where OK was expected",
                        node.addr,
                        value.kind_name()
                    )));
                }
            }
            Ok(Value::Ok)
        }
    }
}
