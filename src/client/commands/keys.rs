// src/client/commands/keys.rs

use crate::client::Client;
use crate::core::commands::generic::{self, ExpireCondition, ScanArgs};
use crate::core::errors::ClientError;
use crate::core::protocol::convert;
use bytes::Bytes;

impl Client {
    pub async fn del(&self, keys: Vec<Bytes>) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(generic::del(keys)).await?)
    }

    pub async fn unlink(&self, keys: Vec<Bytes>) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(generic::unlink(keys)).await?)
    }

    pub async fn exists(&self, keys: Vec<Bytes>) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(generic::exists(keys)).await?)
    }

    pub async fn expire(
        &self,
        key: impl Into<Bytes>,
        seconds: i64,
        condition: Option<ExpireCondition>,
    ) -> Result<bool, ClientError> {
        convert::into_bool(self.dispatch(generic::expire(key, seconds, condition)).await?)
    }

    pub async fn pexpire(
        &self,
        key: impl Into<Bytes>,
        milliseconds: i64,
        condition: Option<ExpireCondition>,
    ) -> Result<bool, ClientError> {
        convert::into_bool(
            self.dispatch(generic::pexpire(key, milliseconds, condition))
                .await?,
        )
    }

    pub async fn expireat(
        &self,
        key: impl Into<Bytes>,
        unix_seconds: u64,
        condition: Option<ExpireCondition>,
    ) -> Result<bool, ClientError> {
        convert::into_bool(
            self.dispatch(generic::expireat(key, unix_seconds, condition))
                .await?,
        )
    }

    pub async fn pexpireat(
        &self,
        key: impl Into<Bytes>,
        unix_milliseconds: u64,
        condition: Option<ExpireCondition>,
    ) -> Result<bool, ClientError> {
        convert::into_bool(
            self.dispatch(generic::pexpireat(key, unix_milliseconds, condition))
                .await?,
        )
    }

    pub async fn ttl(&self, key: impl Into<Bytes>) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(generic::ttl(key)).await?)
    }

    pub async fn pttl(&self, key: impl Into<Bytes>) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(generic::pttl(key)).await?)
    }

    pub async fn persist(&self, key: impl Into<Bytes>) -> Result<bool, ClientError> {
        convert::into_bool(self.dispatch(generic::persist(key)).await?)
    }

    pub async fn key_type(&self, key: impl Into<Bytes>) -> Result<String, ClientError> {
        convert::into_string(self.dispatch(generic::key_type(key)).await?)
    }

    pub async fn rename(
        &self,
        key: impl Into<Bytes>,
        new_key: impl Into<Bytes>,
    ) -> Result<(), ClientError> {
        convert::into_unit(self.dispatch(generic::rename(key, new_key)).await?)
    }

    pub async fn renamenx(
        &self,
        key: impl Into<Bytes>,
        new_key: impl Into<Bytes>,
    ) -> Result<bool, ClientError> {
        convert::into_bool(self.dispatch(generic::renamenx(key, new_key)).await?)
    }

    pub async fn touch(&self, keys: Vec<Bytes>) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(generic::touch(keys)).await?)
    }

    pub async fn copy(
        &self,
        source: impl Into<Bytes>,
        destination: impl Into<Bytes>,
        replace: bool,
    ) -> Result<bool, ClientError> {
        convert::into_bool(self.dispatch(generic::copy(source, destination, replace)).await?)
    }

    /// `KEYS`: unions matches from every primary. Prefer [`Client::scan`] or
    /// the cluster scan for large keyspaces.
    pub async fn keys(&self, pattern: impl Into<Bytes>) -> Result<Vec<Bytes>, ClientError> {
        convert::into_bytes_array(self.dispatch(generic::keys(pattern)).await?)
    }

    pub async fn randomkey(&self) -> Result<Option<Bytes>, ClientError> {
        convert::into_optional_bytes(self.dispatch(generic::randomkey()).await?)
    }

    /// One `SCAN` step against a single node. For a cluster-wide scan use
    /// `ClusterClient::cluster_scan`.
    pub async fn scan(
        &self,
        cursor: u64,
        args: &ScanArgs,
    ) -> Result<(u64, Vec<Bytes>), ClientError> {
        convert::into_scan_page(self.dispatch(generic::scan(cursor, args)).await?)
    }

    pub async fn unwatch(&self) -> Result<(), ClientError> {
        convert::into_unit(self.dispatch(generic::unwatch()).await?)
    }
}
