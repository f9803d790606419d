// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Reconnection Policy
//!
//! Nothing in the transport layer redials on its own. A caller that wants a
//! dropped socket back asks for it explicitly, and this policy bounds how hard
//! that request tries. The default makes exactly one attempt.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use super::error::TransportError;
use super::transport::TransportResult;

/// Bounded exponential backoff for socket redials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Retries after the first failed attempt. `0` disables retrying.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Add up to 25% random jitter to each delay.
    pub jitter: bool,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy {
            max_retries: 0,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            jitter: true,
        }
    }
}

impl ReconnectPolicy {
    /// A single attempt, no retries.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Up to `max_retries` retries with default delays.
    pub fn bounded(max_retries: u32) -> Self {
        ReconnectPolicy {
            max_retries,
            ..Default::default()
        }
    }

    pub fn with_delays(mut self, base_delay: Duration, max_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self.max_delay = max_delay;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.max_retries > 0
    }

    /// Delay before retry number `attempt` (0-based), without jitter.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.min(16);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Delay before retry number `attempt`, with jitter if enabled.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let delay = self.backoff_delay(attempt);
        if !self.jitter || delay.is_zero() {
            return delay;
        }
        let spread = delay / 4;
        let extra = rand::thread_rng().gen_range(Duration::ZERO..=spread);
        (delay + extra).min(self.max_delay)
    }
}

/// Runs `dial` until it succeeds or the policy is exhausted.
///
/// `dial` receives the 0-based attempt number. Invalid URLs are never retried.
pub async fn redial<T, F, Fut>(policy: &ReconnectPolicy, mut dial: F) -> TransportResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = TransportResult<T>>,
{
    let mut attempt = 0;
    loop {
        match dial(attempt).await {
            Ok(value) => return Ok(value),
            Err(e @ TransportError::InvalidUrl(_)) => return Err(e),
            Err(e) if attempt >= policy.max_retries => return Err(e),
            Err(e) => {
                let delay = policy.delay_for(attempt);
                warn!(attempt, ?delay, error = %e, "dial failed, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
