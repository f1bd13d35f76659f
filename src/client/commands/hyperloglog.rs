// src/client/commands/hyperloglog.rs

use crate::client::Client;
use crate::core::commands::hyperloglog;
use crate::core::errors::ClientError;
use crate::core::protocol::convert;
use bytes::Bytes;

impl Client {
    pub async fn pfadd(
        &self,
        key: impl Into<Bytes>,
        elements: Vec<Bytes>,
    ) -> Result<bool, ClientError> {
        convert::into_bool(self.dispatch(hyperloglog::pfadd(key, elements)).await?)
    }

    pub async fn pfcount(&self, keys: Vec<Bytes>) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(hyperloglog::pfcount(keys)).await?)
    }

    pub async fn pfmerge(
        &self,
        destination: impl Into<Bytes>,
        sources: Vec<Bytes>,
    ) -> Result<(), ClientError> {
        convert::into_unit(self.dispatch(hyperloglog::pfmerge(destination, sources)).await?)
    }
}
