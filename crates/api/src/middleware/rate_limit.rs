//! Brute-force protection for the login endpoints.
//!
//! Each client address gets a budget of `LOGIN_RATE_LIMIT` attempts that
//! refills evenly over a minute. Every attempt counts, successful or not.
//! State lives in memory, so each server process keeps its own counters and
//! a restart clears them.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::time::Duration;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use governor::clock::{Clock, DefaultClock};
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};

use crate::error::AppError;
use crate::state::AppState;

/// Tracked clients above which idle entries are dropped.
const SWEEP_THRESHOLD: usize = 1024;

type KeyedLimiter = RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

/// Per-client login budgets. No limiter when throttling is disabled.
pub struct LoginRateLimiter {
    limiter: Option<KeyedLimiter>,
    clock: DefaultClock,
}

impl LoginRateLimiter {
    /// `max_per_minute` attempts per client; zero disables throttling.
    pub fn new(max_per_minute: u32) -> Self {
        match NonZeroU32::new(max_per_minute) {
            Some(n) => Self::with_quota(Quota::per_minute(n)),
            None => Self {
                limiter: None,
                clock: DefaultClock::default(),
            },
        }
    }

    pub fn with_quota(quota: Quota) -> Self {
        Self {
            limiter: Some(RateLimiter::keyed(quota)),
            clock: DefaultClock::default(),
        }
    }

    /// Record one attempt by `client`.
    ///
    /// Returns how long the client must wait when it is over budget.
    pub fn check(&self, client: IpAddr) -> Result<(), Duration> {
        let Some(limiter) = &self.limiter else {
            return Ok(());
        };

        if limiter.len() > SWEEP_THRESHOLD {
            limiter.retain_recent();
        }

        limiter
            .check_key(&client)
            .map_err(|not_until| not_until.wait_time_from(self.clock.now()))
    }
}

/// The address a login attempt is charged to.
///
/// The TCP peer by default. With `trust_proxy_headers` the first valid
/// `X-Forwarded-For` hop wins, since the peer is then the proxy itself.
fn client_key(parts: &Parts, trust_proxy_headers: bool) -> IpAddr {
    if trust_proxy_headers {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse::<IpAddr>().ok());
        if let Some(ip) = forwarded {
            return ip;
        }
    }
    parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Counts the request against the caller's login budget, answering 429
/// when it is spent.
///
/// ```ignore
/// async fn login(_: LoginThrottle, ValidJson(input): ValidJson<LoginRequest>) { .. }
/// ```
pub struct LoginThrottle;

impl FromRequestParts<AppState> for LoginThrottle {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let client = client_key(parts, state.config.trust_proxy_headers);
        state.login_limiter.check(client).map_err(|retry_after| {
            tracing::warn!(%client, path = %parts.uri.path(), "Login rate limit exceeded");
            AppError::TooManyRequests {
                retry_after_secs: retry_after.as_secs().max(1),
            }
        })?;
        Ok(LoginThrottle)
    }
}
