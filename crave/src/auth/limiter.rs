// This file is part of the product Crave.
// SPDX-FileCopyrightText: 2025-2026 Crave Foods Ltd
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::LoginLimiterConfig;
use std::collections::HashMap;
use std::net::IpAddr;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};

const LIMITER_CHANNEL_DEPTH: usize = 64;

#[derive(Debug)]
pub enum LimiterError {
    Locked,
}

/// Per-IP failed-login limiter. Counters live in a background task; the
/// handle is cheap to clone. When the channel is gone the limiter answers
/// locked rather than open.
#[derive(Clone)]
pub struct LoginLimiter {
    sender: mpsc::Sender<LimiterCommand>,
}

impl LoginLimiter {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel(LIMITER_CHANNEL_DEPTH);
        tokio::spawn(async move {
            let mut state = LimiterState::new();
            state.run(receiver).await;
        });
        Self { sender }
    }

    /// Gate a login attempt. Called before any credential work.
    pub async fn check(
        &self,
        ip: IpAddr,
        limits: &LoginLimiterConfig,
    ) -> Result<(), LimiterError> {
        let (reply, receive) = oneshot::channel();
        let command = LimiterCommand::Check {
            ip,
            limits: limits.clone(),
            reply,
        };
        if self.sender.send(command).await.is_err() {
            return Err(LimiterError::Locked);
        }
        receive.await.unwrap_or(Err(LimiterError::Locked))
    }

    /// Count a credential failure against an IP.
    pub fn record_failure(&self, ip: IpAddr, limits: &LoginLimiterConfig) {
        let _ = self.sender.try_send(LimiterCommand::RecordFailure {
            ip,
            limits: limits.clone(),
        });
    }

    /// Forget an IP after a successful login.
    pub fn clear(&self, ip: IpAddr) {
        let _ = self.sender.try_send(LimiterCommand::Clear { ip });
    }
}

impl Default for LoginLimiter {
    fn default() -> Self {
        Self::new()
    }
}

enum LimiterCommand {
    Check {
        ip: IpAddr,
        limits: LoginLimiterConfig,
        reply: oneshot::Sender<Result<(), LimiterError>>,
    },
    RecordFailure {
        ip: IpAddr,
        limits: LoginLimiterConfig,
    },
    Clear {
        ip: IpAddr,
    },
}

struct FailureState {
    window_start: Instant,
    failures: u32,
    blocked_until: Option<Instant>,
}

impl FailureState {
    fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            failures: 0,
            blocked_until: None,
        }
    }

    fn refresh_window(&mut self, now: Instant, period: Duration) {
        if now.duration_since(self.window_start) >= period {
            self.window_start = now;
            self.failures = 0;
        }
    }

    fn is_blocked(&mut self, now: Instant) -> bool {
        if let Some(blocked_until) = self.blocked_until {
            if now < blocked_until {
                return true;
            }
            self.blocked_until = None;
            self.failures = 0;
        }
        false
    }
}

struct LimiterState {
    failures: HashMap<IpAddr, FailureState>,
}

impl LimiterState {
    fn new() -> Self {
        Self {
            failures: HashMap::new(),
        }
    }

    async fn run(&mut self, mut receiver: mpsc::Receiver<LimiterCommand>) {
        while let Some(command) = receiver.recv().await {
            match command {
                LimiterCommand::Check { ip, limits, reply } => {
                    let _ = reply.send(self.check(ip, &limits));
                }
                LimiterCommand::RecordFailure { ip, limits } => {
                    self.record_failure(ip, &limits);
                }
                LimiterCommand::Clear { ip } => {
                    self.failures.remove(&ip);
                }
            }
        }
    }

    fn check(&mut self, ip: IpAddr, limits: &LoginLimiterConfig) -> Result<(), LimiterError> {
        let now = Instant::now();
        self.cleanup(now, limits);

        let state = match self.failures.get_mut(&ip) {
            Some(state) => state,
            None => return Ok(()),
        };
        state.refresh_window(now, Duration::from_secs(limits.window_seconds));
        if state.is_blocked(now) {
            return Err(LimiterError::Locked);
        }
        if state.failures >= limits.max_failures {
            state.blocked_until = Some(now + Duration::from_secs(limits.lockout_seconds));
            return Err(LimiterError::Locked);
        }
        Ok(())
    }

    fn record_failure(&mut self, ip: IpAddr, limits: &LoginLimiterConfig) {
        let now = Instant::now();
        let state = self
            .failures
            .entry(ip)
            .or_insert_with(|| FailureState::new(now));
        state.refresh_window(now, Duration::from_secs(limits.window_seconds));
        state.failures = state.failures.saturating_add(1);
    }

    fn cleanup(&mut self, now: Instant, limits: &LoginLimiterConfig) {
        let window = Duration::from_secs(limits.window_seconds);
        self.failures.retain(|_, state| {
            state.blocked_until.is_some_and(|until| until > now)
                || now.duration_since(state.window_start) < window
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(max_failures: u32, window_seconds: u64, lockout_seconds: u64) -> LoginLimiterConfig {
        LoginLimiterConfig {
            max_failures,
            window_seconds,
            lockout_seconds,
        }
    }

    fn test_ip() -> IpAddr {
        "127.0.0.1".parse().expect("ip")
    }

    #[test]
    fn below_threshold_passes() {
        let mut state = LimiterState::new();
        let limits = limits(3, 600, 600);
        let ip = test_ip();

        state.record_failure(ip, &limits);
        state.record_failure(ip, &limits);
        assert!(state.check(ip, &limits).is_ok());
    }

    #[test]
    fn at_threshold_locks_out() {
        let mut state = LimiterState::new();
        let limits = limits(3, 600, 600);
        let ip = test_ip();

        for _ in 0..3 {
            state.record_failure(ip, &limits);
        }
        assert!(state.check(ip, &limits).is_err());
        // Still locked on the next check
        assert!(state.check(ip, &limits).is_err());
    }

    #[test]
    fn clear_resets_the_counter() {
        let mut state = LimiterState::new();
        let limits = limits(2, 600, 600);
        let ip = test_ip();

        state.record_failure(ip, &limits);
        state.record_failure(ip, &limits);
        assert!(state.check(ip, &limits).is_err());

        state.failures.remove(&ip);
        assert!(state.check(ip, &limits).is_ok());
    }

    #[test]
    fn zero_window_forgets_failures_immediately() {
        let mut state = LimiterState::new();
        let limits = limits(2, 0, 600);
        let ip = test_ip();

        for _ in 0..10 {
            state.record_failure(ip, &limits);
        }
        assert!(state.check(ip, &limits).is_ok());
    }

    #[test]
    fn other_ips_are_unaffected() {
        let mut state = LimiterState::new();
        let limits = limits(1, 600, 600);
        let blocked: IpAddr = "10.0.0.1".parse().expect("ip");
        let other: IpAddr = "10.0.0.2".parse().expect("ip");

        state.record_failure(blocked, &limits);
        assert!(state.check(blocked, &limits).is_err());
        assert!(state.check(other, &limits).is_ok());
    }

    #[tokio::test]
    async fn handle_round_trip() {
        let limiter = LoginLimiter::new();
        let limits = limits(1, 600, 600);
        let ip = test_ip();

        assert!(limiter.check(ip, &limits).await.is_ok());
        limiter.record_failure(ip, &limits);
        // Commands are processed in order on the actor task
        let result = limiter.check(ip, &limits).await;
        assert!(result.is_err());
        limiter.clear(ip);
        assert!(limiter.check(ip, &limits).await.is_ok());
    }
}
