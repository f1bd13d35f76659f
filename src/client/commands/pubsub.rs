// src/client/commands/pubsub.rs

use crate::client::Client;
use crate::core::commands::pubsub;
use crate::core::errors::ClientError;
use crate::core::protocol::{Value, convert};
use bytes::Bytes;

impl Client {
    /// Publishes to a channel; returns the number of receiving subscribers.
    pub async fn publish(
        &self,
        channel: impl Into<Bytes>,
        message: impl Into<Bytes>,
    ) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(pubsub::publish(channel, message)).await?)
    }

    /// Sharded publish, routed by the channel's slot.
    pub async fn spublish(
        &self,
        channel: impl Into<Bytes>,
        message: impl Into<Bytes>,
    ) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(pubsub::spublish(channel, message)).await?)
    }

    /// Active channels across the fleet, optionally filtered by pattern.
    pub async fn pubsub_channels(
        &self,
        pattern: Option<Bytes>,
    ) -> Result<Vec<Bytes>, ClientError> {
        convert::into_bytes_array(self.dispatch(pubsub::pubsub_channels(pattern)).await?)
    }

    /// Subscriber counts per requested channel.
    pub async fn pubsub_numsub(
        &self,
        channels: Vec<Bytes>,
    ) -> Result<Vec<(Bytes, i64)>, ClientError> {
        let reply = self.dispatch(pubsub::pubsub_numsub(channels)).await?;
        match reply {
            Value::Map(entries) => entries
                .into_iter()
                .map(|(channel, count)| {
                    Ok((convert::into_bytes(channel)?, convert::into_int(count)?))
                })
                .collect(),
            other => {
                // RESP2: a flat array of channel, count, channel, count...
                let flat = convert::into_array(other)?;
                if flat.len() % 2 != 0 {
                    return Err(ClientError::Protocol(
                        "odd-length PUBSUB NUMSUB reply".to_string(),
                    ));
                }
                let mut pairs = Vec::with_capacity(flat.len() / 2);
                let mut iter = flat.into_iter();
                while let (Some(channel), Some(count)) = (iter.next(), iter.next()) {
                    pairs.push((convert::into_bytes(channel)?, convert::into_int(count)?));
                }
                Ok(pairs)
            }
        }
    }

    /// The number of pattern subscriptions, summed across the fleet.
    pub async fn pubsub_numpat(&self) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(pubsub::pubsub_numpat()).await?)
    }
}
