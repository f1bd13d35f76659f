// src/client/commands/hashes.rs

use crate::client::Client;
use crate::core::commands::generic::ScanArgs;
use crate::core::commands::hash;
use crate::core::errors::ClientError;
use crate::core::protocol::convert;
use bytes::Bytes;

impl Client {
    pub async fn hset(
        &self,
        key: impl Into<Bytes>,
        pairs: Vec<(Bytes, Bytes)>,
    ) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(hash::hset(key, pairs)).await?)
    }

    pub async fn hsetnx(
        &self,
        key: impl Into<Bytes>,
        field: impl Into<Bytes>,
        value: impl Into<Bytes>,
    ) -> Result<bool, ClientError> {
        convert::into_bool(self.dispatch(hash::hsetnx(key, field, value)).await?)
    }

    pub async fn hget(
        &self,
        key: impl Into<Bytes>,
        field: impl Into<Bytes>,
    ) -> Result<Option<Bytes>, ClientError> {
        convert::into_optional_bytes(self.dispatch(hash::hget(key, field)).await?)
    }

    pub async fn hgetall(
        &self,
        key: impl Into<Bytes>,
    ) -> Result<Vec<(Bytes, Bytes)>, ClientError> {
        convert::into_pairs(self.dispatch(hash::hgetall(key)).await?)
    }

    pub async fn hdel(
        &self,
        key: impl Into<Bytes>,
        fields: Vec<Bytes>,
    ) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(hash::hdel(key, fields)).await?)
    }

    pub async fn hexists(
        &self,
        key: impl Into<Bytes>,
        field: impl Into<Bytes>,
    ) -> Result<bool, ClientError> {
        convert::into_bool(self.dispatch(hash::hexists(key, field)).await?)
    }

    pub async fn hlen(&self, key: impl Into<Bytes>) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(hash::hlen(key)).await?)
    }

    pub async fn hkeys(&self, key: impl Into<Bytes>) -> Result<Vec<Bytes>, ClientError> {
        convert::into_bytes_array(self.dispatch(hash::hkeys(key)).await?)
    }

    pub async fn hvals(&self, key: impl Into<Bytes>) -> Result<Vec<Bytes>, ClientError> {
        convert::into_bytes_array(self.dispatch(hash::hvals(key)).await?)
    }

    pub async fn hmget(
        &self,
        key: impl Into<Bytes>,
        fields: Vec<Bytes>,
    ) -> Result<Vec<Option<Bytes>>, ClientError> {
        convert::into_optional_bytes_array(self.dispatch(hash::hmget(key, fields)).await?)
    }

    pub async fn hincrby(
        &self,
        key: impl Into<Bytes>,
        field: impl Into<Bytes>,
        delta: i64,
    ) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(hash::hincrby(key, field, delta)).await?)
    }

    pub async fn hincrbyfloat(
        &self,
        key: impl Into<Bytes>,
        field: impl Into<Bytes>,
        delta: f64,
    ) -> Result<f64, ClientError> {
        convert::into_float(self.dispatch(hash::hincrbyfloat(key, field, delta)).await?)
    }

    pub async fn hrandfield(&self, key: impl Into<Bytes>) -> Result<Option<Bytes>, ClientError> {
        convert::into_optional_bytes(self.dispatch(hash::hrandfield(key, None)).await?)
    }

    pub async fn hrandfield_count(
        &self,
        key: impl Into<Bytes>,
        count: i64,
    ) -> Result<Vec<Bytes>, ClientError> {
        convert::into_bytes_array(self.dispatch(hash::hrandfield(key, Some(count))).await?)
    }

    /// One `HSCAN` step; the page is field/value pairs.
    pub async fn hscan(
        &self,
        key: impl Into<Bytes>,
        cursor: u64,
        args: &ScanArgs,
    ) -> Result<(u64, Vec<(Bytes, Bytes)>), ClientError> {
        let (next, flat) =
            convert::into_scan_page(self.dispatch(hash::hscan(key, cursor, args)).await?)?;
        Ok((next, pair_up(flat)?))
    }
}

/// Splits a flat `[a, b, a, b]` page into pairs.
pub(crate) fn pair_up(flat: Vec<Bytes>) -> Result<Vec<(Bytes, Bytes)>, ClientError> {
    if flat.len() % 2 != 0 {
        return Err(ClientError::Protocol(
            "odd-length scan page where pairs were expected".to_string(),
        ));
    }
    let mut pairs = Vec::with_capacity(flat.len() / 2);
    let mut iter = flat.into_iter();
    while let (Some(a), Some(b)) = (iter.next(), iter.next()) {
        pairs.push((a, b));
    }
    Ok(pairs)
}
