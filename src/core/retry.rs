// src/core/retry.rs

//! The per-request retry and redirect engine.
//!
//! MOVED, ASK and TRYAGAIN never reach the caller: they are consumed here,
//! each with a bounded budget. Transport losses are retried only when the
//! command's policy allows it.

use crate::config::NodeAddress;
use crate::core::commands::Cmd;
use crate::core::errors::ClientError;
use crate::core::protocol::RespFrame;
use crate::core::routing::Router;
use crate::core::tasks::topology_refresh::RefreshSignal;
use bytes::Bytes;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Per-request retry policy, derived from the command's classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Whether a request lost in flight may be resubmitted. The server may
    /// have executed it, so this defaults to true for reads and false for
    /// writes; enabling it for writes accepts at-least-once semantics.
    pub retry_on_disconnect: bool,
    /// Bounded resubmissions on TRYAGAIN.
    pub tryagain_attempts: u32,
    /// Sleep between TRYAGAIN resubmissions.
    pub tryagain_delay: Duration,
}

impl RetryPolicy {
    pub fn for_command(cmd: &Cmd) -> Self {
        Self {
            retry_on_disconnect: !cmd.is_write(),
            tryagain_attempts: 3,
            tryagain_delay: Duration::from_millis(10),
        }
    }
}

/// Executes a single-target command, consuming redirects per policy, and
/// returns the raw reply frame.
pub async fn execute_single(
    router: &Router,
    refresh: &RefreshSignal,
    cmd: &Cmd,
    policy: &RetryPolicy,
) -> Result<RespFrame, ClientError> {
    let frame = cmd.to_frame();
    // At most one hop of each redirection kind per request.
    let mut moved_budget = 1u32;
    let mut ask_budget = 1u32;
    let mut tryagain_budget = policy.tryagain_attempts;
    // A request rejected before it was ever written is always safe to retry.
    let mut unsent_retry_budget = 1u32;
    let mut disconnect_budget = u32::from(policy.retry_on_disconnect);
    let mut ask_target: Option<NodeAddress> = None;

    loop {
        let result = match ask_target.take() {
            Some(addr) => send_with_asking(router, &addr, frame.clone()).await,
            None => {
                let connection = router.target_for(&cmd.route, cmd.is_write())?;
                connection.request(frame.clone()).await
            }
        };

        match result {
            Ok(RespFrame::Error(message)) => {
                match ClientError::from_server_message(&message) {
                    ClientError::Moved { slot, addr } => {
                        if moved_budget == 0 {
                            return Err(ClientError::Request(message));
                        }
                        moved_budget -= 1;
                        let target = NodeAddress::from_str(&addr)
                            .map_err(|_| ClientError::Request(message.clone()))?;
                        debug!("Slot {} moved to {}; following once.", slot, target);
                        router.learn_moved(slot, target);
                        refresh.request();
                    }
                    ClientError::Ask { slot, addr } => {
                        if ask_budget == 0 {
                            return Err(ClientError::Request(message));
                        }
                        ask_budget -= 1;
                        let target = NodeAddress::from_str(&addr)
                            .map_err(|_| ClientError::Request(message.clone()))?;
                        debug!("Slot {} is migrating; asking {} once.", slot, target);
                        ask_target = Some(target);
                    }
                    ClientError::TryAgain(reason) => {
                        if tryagain_budget == 0 {
                            return Err(ClientError::Request(message));
                        }
                        tryagain_budget -= 1;
                        debug!("Server asked to retry ({reason}); backing off.");
                        tokio::time::sleep(policy.tryagain_delay).await;
                    }
                    other => return Err(other),
                }
            }
            Ok(reply) => return Ok(reply),
            Err(ClientError::Disconnect(reason)) => {
                // The request was on the wire when the link died.
                if disconnect_budget == 0 {
                    return Err(ClientError::Disconnect(reason));
                }
                disconnect_budget -= 1;
                debug!("Retrying after in-flight disconnect: {reason}");
            }
            Err(e @ ClientError::Connection(_)) => {
                // The request never reached a socket; one fresh pick is safe
                // even for writes.
                if unsent_retry_budget == 0 {
                    return Err(e);
                }
                unsent_retry_budget -= 1;
                debug!("Retrying unsent request after connection error: {e}");
            }
            Err(e) => return Err(e),
        }
    }
}

/// Sends `ASKING` immediately followed by the command on the redirect target,
/// as one FIFO unit, and returns the command's reply.
async fn send_with_asking(
    router: &Router,
    addr: &NodeAddress,
    frame: RespFrame,
) -> Result<RespFrame, ClientError> {
    let connection = router.manager().get_or_connect(addr);
    let asking = RespFrame::command(vec![Bytes::from_static(b"ASKING")]);
    let mut replies = connection.request_batch(vec![asking, frame]).await?;
    let reply = replies
        .pop()
        .ok_or_else(|| ClientError::Protocol("short ASKING batch reply".to_string()))?;
    // The ASKING marker's own reply is uninteresting unless it failed at the
    // transport level, in which case the command reply carries the same error.
    reply
}
