// src/client/commands/streams.rs

use crate::client::Client;
use crate::core::commands::streams;
use crate::core::errors::ClientError;
use crate::core::protocol::{Value, convert};
use bytes::Bytes;

/// One stream entry: its id and its field/value pairs.
pub type StreamEntry = (Bytes, Vec<(Bytes, Bytes)>);

fn into_stream_entries(value: Value) -> Result<Vec<StreamEntry>, ClientError> {
    convert::into_array_of(value, |entry| {
        let mut parts = convert::into_array(entry)?.into_iter();
        match (parts.next(), parts.next()) {
            (Some(id), Some(fields)) => {
                Ok((convert::into_bytes(id)?, convert::into_pairs(fields)?))
            }
            _ => Err(ClientError::Protocol("short stream entry".to_string())),
        }
    })
}

impl Client {
    /// `XADD` with `"*"` as the id to let the server assign one. Returns the
    /// entry id.
    pub async fn xadd(
        &self,
        key: impl Into<Bytes>,
        id: impl Into<Bytes>,
        pairs: Vec<(Bytes, Bytes)>,
    ) -> Result<Bytes, ClientError> {
        convert::into_bytes(self.dispatch(streams::xadd(key, id, pairs)).await?)
    }

    pub async fn xlen(&self, key: impl Into<Bytes>) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(streams::xlen(key)).await?)
    }

    pub async fn xrange(
        &self,
        key: impl Into<Bytes>,
        start: impl Into<Bytes>,
        end: impl Into<Bytes>,
        count: Option<u64>,
    ) -> Result<Vec<StreamEntry>, ClientError> {
        into_stream_entries(self.dispatch(streams::xrange(key, start, end, count)).await?)
    }

    pub async fn xrevrange(
        &self,
        key: impl Into<Bytes>,
        end: impl Into<Bytes>,
        start: impl Into<Bytes>,
        count: Option<u64>,
    ) -> Result<Vec<StreamEntry>, ClientError> {
        into_stream_entries(
            self.dispatch(streams::xrevrange(key, end, start, count))
                .await?,
        )
    }

    pub async fn xdel(&self, key: impl Into<Bytes>, ids: Vec<Bytes>) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(streams::xdel(key, ids)).await?)
    }

    /// Returns the number of entries removed.
    pub async fn xtrim(
        &self,
        key: impl Into<Bytes>,
        max_len: u64,
        approximate: bool,
    ) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(streams::xtrim(key, max_len, approximate)).await?)
    }
}
