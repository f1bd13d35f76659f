// src/core/connection/backoff.rs

//! Reconnection backoff schedule.

use crate::config::BackoffConfig;
use rand::Rng;
use std::time::Duration;

/// Exponential backoff with jitter, driven by the connection actor between
/// reconnection attempts.
///
/// The delay for attempt `n` (zero-based) is
/// `min(base * factor^n, max) + rand(0, base)`.
#[derive(Debug)]
pub struct Backoff {
    config: BackoffConfig,
    attempt: u32,
}

impl Backoff {
    pub fn new(config: BackoffConfig) -> Self {
        Self { config, attempt: 0 }
    }

    /// The delay before the next attempt, or `None` once `max_attempts` is
    /// exhausted.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if let Some(max_attempts) = self.config.max_attempts
            && self.attempt >= max_attempts
        {
            return None;
        }
        let exp = (self.config.factor as u64)
            .checked_pow(self.attempt.min(32))
            .unwrap_or(u64::MAX);
        let delay_ms = self
            .config
            .base_ms
            .saturating_mul(exp)
            .min(self.config.max_ms);
        let jitter_ms = rand::thread_rng().gen_range(0..self.config.base_ms.max(1));
        self.attempt = self.attempt.saturating_add(1);
        Some(Duration::from_millis(delay_ms + jitter_ms))
    }

    /// Called after a successful handshake so the next outage starts from the
    /// base delay again.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    pub fn attempts_made(&self) -> u32 {
        self.attempt
    }
}
