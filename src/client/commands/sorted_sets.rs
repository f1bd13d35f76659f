// src/client/commands/sorted_sets.rs

use super::hashes::pair_up;
use crate::client::Client;
use crate::core::commands::generic::ScanArgs;
use crate::core::commands::zset::{self, ZAddOptions};
use crate::core::errors::ClientError;
use crate::core::protocol::convert;
use bytes::Bytes;

impl Client {
    pub async fn zadd(
        &self,
        key: impl Into<Bytes>,
        members: Vec<(f64, Bytes)>,
        options: ZAddOptions,
    ) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(zset::zadd(key, members, options)).await?)
    }

    pub async fn zscore(
        &self,
        key: impl Into<Bytes>,
        member: impl Into<Bytes>,
    ) -> Result<Option<f64>, ClientError> {
        convert::into_optional_float(self.dispatch(zset::zscore(key, member)).await?)
    }

    pub async fn zmscore(
        &self,
        key: impl Into<Bytes>,
        members: Vec<Bytes>,
    ) -> Result<Vec<Option<f64>>, ClientError> {
        convert::into_array_of(
            self.dispatch(zset::zmscore(key, members)).await?,
            convert::into_optional_float,
        )
    }

    pub async fn zincrby(
        &self,
        key: impl Into<Bytes>,
        delta: f64,
        member: impl Into<Bytes>,
    ) -> Result<f64, ClientError> {
        convert::into_float(self.dispatch(zset::zincrby(key, delta, member)).await?)
    }

    pub async fn zcard(&self, key: impl Into<Bytes>) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(zset::zcard(key)).await?)
    }

    /// Bounds use the protocol spelling, e.g. `"1"`, `"(1"`, `"-inf"`.
    pub async fn zcount(
        &self,
        key: impl Into<Bytes>,
        min: impl Into<Bytes>,
        max: impl Into<Bytes>,
    ) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(zset::zcount(key, min, max)).await?)
    }

    pub async fn zrange(
        &self,
        key: impl Into<Bytes>,
        start: i64,
        stop: i64,
    ) -> Result<Vec<Bytes>, ClientError> {
        convert::into_bytes_array(self.dispatch(zset::zrange(key, start, stop, false)).await?)
    }

    pub async fn zrange_withscores(
        &self,
        key: impl Into<Bytes>,
        start: i64,
        stop: i64,
    ) -> Result<Vec<(Bytes, f64)>, ClientError> {
        convert::into_scored_members(self.dispatch(zset::zrange(key, start, stop, true)).await?)
    }

    pub async fn zrevrange(
        &self,
        key: impl Into<Bytes>,
        start: i64,
        stop: i64,
    ) -> Result<Vec<Bytes>, ClientError> {
        convert::into_bytes_array(self.dispatch(zset::zrevrange(key, start, stop, false)).await?)
    }

    pub async fn zrevrange_withscores(
        &self,
        key: impl Into<Bytes>,
        start: i64,
        stop: i64,
    ) -> Result<Vec<(Bytes, f64)>, ClientError> {
        convert::into_scored_members(self.dispatch(zset::zrevrange(key, start, stop, true)).await?)
    }

    pub async fn zrangebyscore(
        &self,
        key: impl Into<Bytes>,
        min: impl Into<Bytes>,
        max: impl Into<Bytes>,
        limit: Option<(i64, i64)>,
    ) -> Result<Vec<Bytes>, ClientError> {
        convert::into_bytes_array(
            self.dispatch(zset::zrangebyscore(key, min, max, limit))
                .await?,
        )
    }

    pub async fn zrangebylex(
        &self,
        key: impl Into<Bytes>,
        min: impl Into<Bytes>,
        max: impl Into<Bytes>,
        limit: Option<(i64, i64)>,
    ) -> Result<Vec<Bytes>, ClientError> {
        convert::into_bytes_array(
            self.dispatch(zset::zrangebylex(key, min, max, limit))
                .await?,
        )
    }

    pub async fn zrank(
        &self,
        key: impl Into<Bytes>,
        member: impl Into<Bytes>,
    ) -> Result<Option<i64>, ClientError> {
        convert::into_optional_int(self.dispatch(zset::zrank(key, member)).await?)
    }

    pub async fn zrevrank(
        &self,
        key: impl Into<Bytes>,
        member: impl Into<Bytes>,
    ) -> Result<Option<i64>, ClientError> {
        convert::into_optional_int(self.dispatch(zset::zrevrank(key, member)).await?)
    }

    pub async fn zrem(
        &self,
        key: impl Into<Bytes>,
        members: Vec<Bytes>,
    ) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(zset::zrem(key, members)).await?)
    }

    pub async fn zremrangebyrank(
        &self,
        key: impl Into<Bytes>,
        start: i64,
        stop: i64,
    ) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(zset::zremrangebyrank(key, start, stop)).await?)
    }

    pub async fn zremrangebyscore(
        &self,
        key: impl Into<Bytes>,
        min: impl Into<Bytes>,
        max: impl Into<Bytes>,
    ) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(zset::zremrangebyscore(key, min, max)).await?)
    }

    pub async fn zpopmin(
        &self,
        key: impl Into<Bytes>,
    ) -> Result<Option<(Bytes, f64)>, ClientError> {
        convert::into_popped_member(self.dispatch(zset::zpopmin(key, None)).await?)
    }

    pub async fn zpopmin_count(
        &self,
        key: impl Into<Bytes>,
        count: u64,
    ) -> Result<Vec<(Bytes, f64)>, ClientError> {
        convert::into_scored_members(self.dispatch(zset::zpopmin(key, Some(count))).await?)
    }

    pub async fn zpopmax(
        &self,
        key: impl Into<Bytes>,
    ) -> Result<Option<(Bytes, f64)>, ClientError> {
        convert::into_popped_member(self.dispatch(zset::zpopmax(key, None)).await?)
    }

    pub async fn zpopmax_count(
        &self,
        key: impl Into<Bytes>,
        count: u64,
    ) -> Result<Vec<(Bytes, f64)>, ClientError> {
        convert::into_scored_members(self.dispatch(zset::zpopmax(key, Some(count))).await?)
    }

    pub async fn zrandmember(&self, key: impl Into<Bytes>) -> Result<Option<Bytes>, ClientError> {
        convert::into_optional_bytes(self.dispatch(zset::zrandmember(key, None)).await?)
    }

    pub async fn zunionstore(
        &self,
        destination: impl Into<Bytes>,
        keys: Vec<Bytes>,
    ) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(zset::zunionstore(destination, keys)).await?)
    }

    pub async fn zinterstore(
        &self,
        destination: impl Into<Bytes>,
        keys: Vec<Bytes>,
    ) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(zset::zinterstore(destination, keys)).await?)
    }

    /// One `ZSCAN` step; the page is member/score pairs.
    pub async fn zscan(
        &self,
        key: impl Into<Bytes>,
        cursor: u64,
        args: &ScanArgs,
    ) -> Result<(u64, Vec<(Bytes, f64)>), ClientError> {
        let (next, flat) =
            convert::into_scan_page(self.dispatch(zset::zscan(key, cursor, args)).await?)?;
        let pairs = pair_up(flat)?
            .into_iter()
            .map(|(member, score)| {
                let score = std::str::from_utf8(&score)
                    .ok()
                    .and_then(|s| s.parse::<f64>().ok())
                    .ok_or_else(|| {
                        ClientError::Protocol("non-numeric score in ZSCAN page".to_string())
                    })?;
                Ok((member, score))
            })
            .collect::<Result<Vec<_>, ClientError>>()?;
        Ok((next, pairs))
    }
}
