// src/client/commands/strings.rs

use crate::client::Client;
use crate::core::commands::string::{self, SetOptions};
use crate::core::errors::ClientError;
use crate::core::protocol::convert;
use bytes::Bytes;

impl Client {
    pub async fn get(&self, key: impl Into<Bytes>) -> Result<Option<Bytes>, ClientError> {
        convert::into_optional_bytes(self.dispatch(string::get(key)).await?)
    }

    pub async fn set(
        &self,
        key: impl Into<Bytes>,
        value: impl Into<Bytes>,
    ) -> Result<(), ClientError> {
        convert::into_unit(self.dispatch(string::set(key, value)).await?)
    }

    /// `SET` with options. Returns the previous value when
    /// [`SetOptions::return_old`] is requested, and `None` when the
    /// condition was not met or no old value was asked for.
    pub async fn set_with_options(
        &self,
        key: impl Into<Bytes>,
        value: impl Into<Bytes>,
        options: SetOptions,
    ) -> Result<Option<Bytes>, ClientError> {
        let reply = self
            .dispatch(string::set_with_options(key, value, options))
            .await?;
        match reply {
            crate::core::protocol::Value::Ok => Ok(None),
            other => convert::into_optional_bytes(other),
        }
    }

    pub async fn setnx(
        &self,
        key: impl Into<Bytes>,
        value: impl Into<Bytes>,
    ) -> Result<bool, ClientError> {
        convert::into_bool(self.dispatch(string::setnx(key, value)).await?)
    }

    pub async fn setex(
        &self,
        key: impl Into<Bytes>,
        seconds: u64,
        value: impl Into<Bytes>,
    ) -> Result<(), ClientError> {
        convert::into_unit(self.dispatch(string::setex(key, seconds, value)).await?)
    }

    pub async fn psetex(
        &self,
        key: impl Into<Bytes>,
        milliseconds: u64,
        value: impl Into<Bytes>,
    ) -> Result<(), ClientError> {
        convert::into_unit(self.dispatch(string::psetex(key, milliseconds, value)).await?)
    }

    pub async fn getdel(&self, key: impl Into<Bytes>) -> Result<Option<Bytes>, ClientError> {
        convert::into_optional_bytes(self.dispatch(string::getdel(key)).await?)
    }

    pub async fn getrange(
        &self,
        key: impl Into<Bytes>,
        start: i64,
        end: i64,
    ) -> Result<Bytes, ClientError> {
        convert::into_bytes(self.dispatch(string::getrange(key, start, end)).await?)
    }

    pub async fn setrange(
        &self,
        key: impl Into<Bytes>,
        offset: u64,
        value: impl Into<Bytes>,
    ) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(string::setrange(key, offset, value)).await?)
    }

    pub async fn append(
        &self,
        key: impl Into<Bytes>,
        value: impl Into<Bytes>,
    ) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(string::append(key, value)).await?)
    }

    pub async fn strlen(&self, key: impl Into<Bytes>) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(string::strlen(key)).await?)
    }

    pub async fn incr(&self, key: impl Into<Bytes>) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(string::incr(key)).await?)
    }

    pub async fn decr(&self, key: impl Into<Bytes>) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(string::decr(key)).await?)
    }

    pub async fn incrby(&self, key: impl Into<Bytes>, delta: i64) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(string::incrby(key, delta)).await?)
    }

    pub async fn decrby(&self, key: impl Into<Bytes>, delta: i64) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(string::decrby(key, delta)).await?)
    }

    pub async fn incrbyfloat(
        &self,
        key: impl Into<Bytes>,
        delta: f64,
    ) -> Result<f64, ClientError> {
        convert::into_float(self.dispatch(string::incrbyfloat(key, delta)).await?)
    }

    pub async fn mget(&self, keys: Vec<Bytes>) -> Result<Vec<Option<Bytes>>, ClientError> {
        convert::into_optional_bytes_array(self.dispatch(string::mget(keys)).await?)
    }

    pub async fn mset(&self, pairs: Vec<(Bytes, Bytes)>) -> Result<(), ClientError> {
        convert::into_unit(self.dispatch(string::mset(pairs)).await?)
    }

    pub async fn msetnx(&self, pairs: Vec<(Bytes, Bytes)>) -> Result<bool, ClientError> {
        convert::into_bool(self.dispatch(string::msetnx(pairs)).await?)
    }
}
