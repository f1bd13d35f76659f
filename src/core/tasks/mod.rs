// src/core/tasks/mod.rs

//! Long-running background tasks owned by the client: topology refresh and
//! credential refresh. Each is an explicit task with a cancellation link to
//! the client's shutdown; `Client::close` joins them before returning.

pub mod credential_refresh;
pub mod topology_refresh;
