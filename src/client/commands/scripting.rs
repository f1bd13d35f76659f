// src/client/commands/scripting.rs

use crate::client::Client;
use crate::core::commands::scripting;
use crate::core::errors::ClientError;
use crate::core::protocol::{Value, convert};
use bytes::Bytes;

impl Client {
    /// Evaluates a script source directly, without the SHA1 cache.
    pub async fn eval(
        &self,
        source: impl Into<Bytes>,
        keys: Vec<Bytes>,
        args: Vec<Bytes>,
    ) -> Result<Value, ClientError> {
        self.dispatch(scripting::eval(source, keys, args)).await
    }

    /// Evaluates by SHA1 without the NOSCRIPT fallback; prefer
    /// [`Client::invoke_script`].
    pub async fn evalsha(
        &self,
        sha1: impl Into<Bytes>,
        keys: Vec<Bytes>,
        args: Vec<Bytes>,
    ) -> Result<Value, ClientError> {
        self.dispatch(scripting::evalsha(sha1, keys, args)).await
    }

    /// Ships a script source to every primary; returns its SHA1 digest.
    pub async fn script_load(&self, source: impl Into<Bytes>) -> Result<String, ClientError> {
        convert::into_string(self.dispatch(scripting::script_load(source)).await?)
    }

    pub async fn script_exists(&self, sha1s: Vec<Bytes>) -> Result<Vec<bool>, ClientError> {
        convert::into_bool_array(self.dispatch(scripting::script_exists(sha1s)).await?)
    }

    pub async fn script_flush(&self) -> Result<(), ClientError> {
        convert::into_unit(self.dispatch(scripting::script_flush()).await?)
    }
}
