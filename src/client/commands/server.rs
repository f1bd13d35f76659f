// src/client/commands/server.rs

use crate::client::Client;
use crate::core::commands::server;
use crate::core::errors::ClientError;
use crate::core::protocol::{Value, convert};
use bytes::Bytes;

impl Client {
    pub async fn ping(&self) -> Result<String, ClientError> {
        convert::into_string(self.dispatch(server::ping()).await?)
    }

    pub async fn echo(&self, message: impl Into<Bytes>) -> Result<Bytes, ClientError> {
        convert::into_bytes(self.dispatch(server::echo(message)).await?)
    }

    /// `INFO` per primary, keyed by `host:port`.
    pub async fn info(
        &self,
        section: Option<&str>,
    ) -> Result<Vec<(String, String)>, ClientError> {
        match self.dispatch(server::info(section)).await? {
            Value::Map(entries) => entries
                .into_iter()
                .map(|(node, body)| Ok((convert::into_string(node)?, convert::into_string(body)?)))
                .collect(),
            // Standalone replies with the single node's body directly.
            other => Ok(vec![(
                self.seed_address().to_string(),
                convert::into_string(other)?,
            )]),
        }
    }

    /// `(unix_seconds, microseconds)` from the server clock.
    pub async fn time(&self) -> Result<(u64, u64), ClientError> {
        let reply = convert::into_array(self.dispatch(server::time()).await?)?;
        let mut parts = reply.into_iter();
        match (parts.next(), parts.next()) {
            (Some(seconds), Some(micros)) => Ok((
                convert::into_int(seconds)? as u64,
                convert::into_int(micros)? as u64,
            )),
            _ => Err(ClientError::Protocol("short TIME reply".to_string())),
        }
    }

    pub async fn dbsize(&self) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(server::dbsize()).await?)
    }

    pub async fn flushall(&self) -> Result<(), ClientError> {
        convert::into_unit(self.dispatch(server::flushall()).await?)
    }

    pub async fn flushdb(&self) -> Result<(), ClientError> {
        convert::into_unit(self.dispatch(server::flushdb()).await?)
    }

    pub async fn config_get(
        &self,
        parameter: impl Into<Bytes>,
    ) -> Result<Vec<(Bytes, Bytes)>, ClientError> {
        convert::into_pairs(self.dispatch(server::config_get(parameter)).await?)
    }

    pub async fn config_set(
        &self,
        parameter: impl Into<Bytes>,
        value: impl Into<Bytes>,
    ) -> Result<(), ClientError> {
        convert::into_unit(self.dispatch(server::config_set(parameter, value)).await?)
    }

    /// Renames the current connection. For a name applied to every
    /// connection (including reconnects), set `client_name` in the
    /// configuration instead.
    pub async fn client_setname(&self, name: impl Into<Bytes>) -> Result<(), ClientError> {
        convert::into_unit(self.dispatch(server::client_setname(name)).await?)
    }

    pub async fn client_getname(&self) -> Result<Option<String>, ClientError> {
        convert::into_optional_string(self.dispatch(server::client_getname()).await?)
    }

    pub async fn client_id(&self) -> Result<i64, ClientError> {
        convert::into_int(self.dispatch(server::client_id()).await?)
    }
}
