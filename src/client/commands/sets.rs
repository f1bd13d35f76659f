// src/client/commands/sets.rs

use crate::client::Client;
use crate::core::commands::generic::ScanArgs;
use crate::core::commands::set;
use crate::core::errors::ClientError;
use crate::core::protocol::convert;
use bytes::Bytes;

impl Client {
    pub async fn sadd(
        &self,
        key: impl Into<Bytes>,
        members: Vec<Bytes>,
    ) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(set::sadd(key, members)).await?)
    }

    pub async fn srem(
        &self,
        key: impl Into<Bytes>,
        members: Vec<Bytes>,
    ) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(set::srem(key, members)).await?)
    }

    pub async fn smembers(&self, key: impl Into<Bytes>) -> Result<Vec<Bytes>, ClientError> {
        convert::into_bytes_array(self.dispatch(set::smembers(key)).await?)
    }

    pub async fn sismember(
        &self,
        key: impl Into<Bytes>,
        member: impl Into<Bytes>,
    ) -> Result<bool, ClientError> {
        convert::into_bool(self.dispatch(set::sismember(key, member)).await?)
    }

    pub async fn smismember(
        &self,
        key: impl Into<Bytes>,
        members: Vec<Bytes>,
    ) -> Result<Vec<bool>, ClientError> {
        convert::into_bool_array(self.dispatch(set::smismember(key, members)).await?)
    }

    pub async fn scard(&self, key: impl Into<Bytes>) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(set::scard(key)).await?)
    }

    pub async fn spop(&self, key: impl Into<Bytes>) -> Result<Option<Bytes>, ClientError> {
        convert::into_optional_bytes(self.dispatch(set::spop(key, None)).await?)
    }

    pub async fn spop_count(
        &self,
        key: impl Into<Bytes>,
        count: u64,
    ) -> Result<Vec<Bytes>, ClientError> {
        convert::into_bytes_array(self.dispatch(set::spop(key, Some(count))).await?)
    }

    pub async fn srandmember(&self, key: impl Into<Bytes>) -> Result<Option<Bytes>, ClientError> {
        convert::into_optional_bytes(self.dispatch(set::srandmember(key, None)).await?)
    }

    pub async fn srandmember_count(
        &self,
        key: impl Into<Bytes>,
        count: i64,
    ) -> Result<Vec<Bytes>, ClientError> {
        convert::into_bytes_array(self.dispatch(set::srandmember(key, Some(count))).await?)
    }

    pub async fn smove(
        &self,
        source: impl Into<Bytes>,
        destination: impl Into<Bytes>,
        member: impl Into<Bytes>,
    ) -> Result<bool, ClientError> {
        convert::into_bool(self.dispatch(set::smove(source, destination, member)).await?)
    }

    pub async fn sunion(&self, keys: Vec<Bytes>) -> Result<Vec<Bytes>, ClientError> {
        convert::into_bytes_array(self.dispatch(set::sunion(keys)).await?)
    }

    pub async fn sinter(&self, keys: Vec<Bytes>) -> Result<Vec<Bytes>, ClientError> {
        convert::into_bytes_array(self.dispatch(set::sinter(keys)).await?)
    }

    pub async fn sdiff(&self, keys: Vec<Bytes>) -> Result<Vec<Bytes>, ClientError> {
        convert::into_bytes_array(self.dispatch(set::sdiff(keys)).await?)
    }

    pub async fn sunionstore(
        &self,
        destination: impl Into<Bytes>,
        keys: Vec<Bytes>,
    ) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(set::sunionstore(destination, keys)).await?)
    }

    pub async fn sinterstore(
        &self,
        destination: impl Into<Bytes>,
        keys: Vec<Bytes>,
    ) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(set::sinterstore(destination, keys)).await?)
    }

    pub async fn sdiffstore(
        &self,
        destination: impl Into<Bytes>,
        keys: Vec<Bytes>,
    ) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(set::sdiffstore(destination, keys)).await?)
    }

    pub async fn sscan(
        &self,
        key: impl Into<Bytes>,
        cursor: u64,
        args: &ScanArgs,
    ) -> Result<(u64, Vec<Bytes>), ClientError> {
        convert::into_scan_page(self.dispatch(set::sscan(key, cursor, args)).await?)
    }
}
