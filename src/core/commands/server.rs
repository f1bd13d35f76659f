// src/core/commands/server.rs

//! Constructors for server- and connection-management commands.

use super::{Aggregate, Cmd};
use crate::core::routing::Route;
use bytes::Bytes;

pub fn ping() -> Cmd {
    Cmd::read("PING")
}

pub fn echo(message: impl Into<Bytes>) -> Cmd {
    Cmd::read("ECHO").arg(message.into())
}

/// `INFO` fans out and is reported per node.
pub fn info(section: Option<&str>) -> Cmd {
    let cmd = Cmd::read("INFO")
        .route(Route::AllPrimaries)
        .aggregate(Aggregate::MapByNode);
    match section {
        Some(section) => cmd.arg(section.to_string()),
        None => cmd,
    }
}

pub fn time() -> Cmd {
    Cmd::read("TIME")
}

/// Key count summed across primaries.
pub fn dbsize() -> Cmd {
    Cmd::read("DBSIZE")
        .route(Route::AllPrimaries)
        .aggregate(Aggregate::Sum)
}

pub fn flushall() -> Cmd {
    Cmd::write("FLUSHALL")
        .route(Route::AllPrimaries)
        .aggregate(Aggregate::AllOk)
}

pub fn flushdb() -> Cmd {
    Cmd::write("FLUSHDB")
        .route(Route::AllPrimaries)
        .aggregate(Aggregate::AllOk)
}

pub fn config_get(parameter: impl Into<Bytes>) -> Cmd {
    Cmd::read("CONFIG GET").arg(parameter.into())
}

pub fn config_set(parameter: impl Into<Bytes>, value: impl Into<Bytes>) -> Cmd {
    Cmd::write("CONFIG SET")
        .route(Route::AllPrimaries)
        .aggregate(Aggregate::AllOk)
        .arg(parameter.into())
        .arg(value.into())
}

pub fn client_setname(name: impl Into<Bytes>) -> Cmd {
    Cmd::write("CLIENT SETNAME").arg(name.into())
}

pub fn client_getname() -> Cmd {
    Cmd::read("CLIENT GETNAME")
}

pub fn client_id() -> Cmd {
    Cmd::read("CLIENT ID")
}

pub fn select(database_id: u32) -> Cmd {
    Cmd::write("SELECT").arg_uint(database_id as u64)
}

pub fn auth(username: Option<&str>, password: &str) -> Cmd {
    let cmd = Cmd::write("AUTH");
    match username {
        Some(username) => cmd.arg(username.to_string()).arg(password.to_string()),
        None => cmd.arg(password.to_string()),
    }
}
