// src/client/commands/lists.rs

use crate::client::Client;
use crate::core::commands::list::{self, InsertPosition, ListEnd};
use crate::core::errors::ClientError;
use crate::core::protocol::convert;
use bytes::Bytes;

impl Client {
    pub async fn lpush(
        &self,
        key: impl Into<Bytes>,
        values: Vec<Bytes>,
    ) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(list::lpush(key, values)).await?)
    }

    pub async fn rpush(
        &self,
        key: impl Into<Bytes>,
        values: Vec<Bytes>,
    ) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(list::rpush(key, values)).await?)
    }

    pub async fn lpushx(
        &self,
        key: impl Into<Bytes>,
        values: Vec<Bytes>,
    ) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(list::lpushx(key, values)).await?)
    }

    pub async fn rpushx(
        &self,
        key: impl Into<Bytes>,
        values: Vec<Bytes>,
    ) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(list::rpushx(key, values)).await?)
    }

    pub async fn lpop(&self, key: impl Into<Bytes>) -> Result<Option<Bytes>, ClientError> {
        convert::into_optional_bytes(self.dispatch(list::lpop(key, None)).await?)
    }

    pub async fn lpop_count(
        &self,
        key: impl Into<Bytes>,
        count: u64,
    ) -> Result<Vec<Bytes>, ClientError> {
        convert::into_bytes_array(self.dispatch(list::lpop(key, Some(count))).await?)
    }

    pub async fn rpop(&self, key: impl Into<Bytes>) -> Result<Option<Bytes>, ClientError> {
        convert::into_optional_bytes(self.dispatch(list::rpop(key, None)).await?)
    }

    pub async fn rpop_count(
        &self,
        key: impl Into<Bytes>,
        count: u64,
    ) -> Result<Vec<Bytes>, ClientError> {
        convert::into_bytes_array(self.dispatch(list::rpop(key, Some(count))).await?)
    }

    pub async fn llen(&self, key: impl Into<Bytes>) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(list::llen(key)).await?)
    }

    pub async fn lrange(
        &self,
        key: impl Into<Bytes>,
        start: i64,
        stop: i64,
    ) -> Result<Vec<Bytes>, ClientError> {
        convert::into_bytes_array(self.dispatch(list::lrange(key, start, stop)).await?)
    }

    pub async fn lindex(
        &self,
        key: impl Into<Bytes>,
        index: i64,
    ) -> Result<Option<Bytes>, ClientError> {
        convert::into_optional_bytes(self.dispatch(list::lindex(key, index)).await?)
    }

    /// Returns the new list length, or -1 when the pivot was not found.
    pub async fn linsert(
        &self,
        key: impl Into<Bytes>,
        position: InsertPosition,
        pivot: impl Into<Bytes>,
        value: impl Into<Bytes>,
    ) -> Result<i64, ClientError> {
        convert::into_int(
            self.dispatch(list::linsert(key, position, pivot, value))
                .await?,
        )
    }

    pub async fn lset(
        &self,
        key: impl Into<Bytes>,
        index: i64,
        value: impl Into<Bytes>,
    ) -> Result<(), ClientError> {
        convert::into_unit(self.dispatch(list::lset(key, index, value)).await?)
    }

    pub async fn lrem(
        &self,
        key: impl Into<Bytes>,
        count: i64,
        value: impl Into<Bytes>,
    ) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(list::lrem(key, count, value)).await?)
    }

    pub async fn ltrim(
        &self,
        key: impl Into<Bytes>,
        start: i64,
        stop: i64,
    ) -> Result<(), ClientError> {
        convert::into_unit(self.dispatch(list::ltrim(key, start, stop)).await?)
    }

    pub async fn lmove(
        &self,
        source: impl Into<Bytes>,
        destination: impl Into<Bytes>,
        from: ListEnd,
        to: ListEnd,
    ) -> Result<Option<Bytes>, ClientError> {
        convert::into_optional_bytes(
            self.dispatch(list::lmove(source, destination, from, to))
                .await?,
        )
    }
}
