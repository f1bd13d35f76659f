// src/client/commands/bitmaps.rs

use crate::client::Client;
use crate::core::commands::bitmap::{self, BitwiseOp};
use crate::core::errors::ClientError;
use crate::core::protocol::convert;
use bytes::Bytes;

impl Client {
    /// Returns the previous bit value.
    pub async fn setbit(
        &self,
        key: impl Into<Bytes>,
        offset: u64,
        value: bool,
    ) -> Result<bool, ClientError> {
        convert::into_bool(self.dispatch(bitmap::setbit(key, offset, value)).await?)
    }

    pub async fn getbit(&self, key: impl Into<Bytes>, offset: u64) -> Result<bool, ClientError> {
        convert::into_bool(self.dispatch(bitmap::getbit(key, offset)).await?)
    }

    pub async fn bitcount(
        &self,
        key: impl Into<Bytes>,
        range: Option<(i64, i64)>,
    ) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(bitmap::bitcount(key, range)).await?)
    }

    /// Returns the position of the first matching bit, or -1.
    pub async fn bitpos(
        &self,
        key: impl Into<Bytes>,
        bit: bool,
        range: Option<(i64, i64)>,
    ) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(bitmap::bitpos(key, bit, range)).await?)
    }

    /// Returns the length of the destination string.
    pub async fn bitop(
        &self,
        op: BitwiseOp,
        destination: impl Into<Bytes>,
        keys: Vec<Bytes>,
    ) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(bitmap::bitop(op, destination, keys)).await?)
    }
}
