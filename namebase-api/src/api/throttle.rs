//! Per-client request throttling
//!
//! Each client IP gets its own quota of requests per minute. Requests over
//! the quota are answered with 429 before reaching a handler. Connections
//! without peer information (in-process callers) share one bucket.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use governor::{
    clock::{Clock, DefaultClock},
    state::keyed::DefaultKeyedStateStore,
    Quota, RateLimiter,
};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use tracing::warn;

use crate::error::ApiError;
use crate::AppState;

/// Rate limiter keyed by client IP
pub type ClientRateLimiter = RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

/// Limiter allowing `per_minute` requests per client, or `None` when 0
pub fn client_rate_limiter(per_minute: u32) -> Option<ClientRateLimiter> {
    NonZeroU32::new(per_minute).map(|quota| RateLimiter::keyed(Quota::per_minute(quota)))
}

fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Middleware rejecting requests over the client's quota
pub async fn throttle(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(limiter) = state.rate_limiter.as_deref() else {
        return Ok(next.run(request).await);
    };

    let client = client_ip(&request);
    if let Err(not_until) = limiter.check_key(&client) {
        let wait = not_until.wait_time_from(DefaultClock::default().now());
        warn!(
            client = %client,
            path = %request.uri().path(),
            retry_after_secs = wait.as_secs(),
            "Request rate limit exceeded"
        );
        return Err(ApiError::TooManyRequests(format!(
            "Request limit exceeded, retry in {} s",
            wait.as_secs().max(1)
        )));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_disables_limiter() {
        assert!(client_rate_limiter(0).is_none());
    }

    #[test]
    fn test_quota_is_per_client() {
        let limiter = client_rate_limiter(2).unwrap();
        let first: IpAddr = "10.0.0.1".parse().unwrap();
        let second: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(limiter.check_key(&first).is_ok());
        assert!(limiter.check_key(&first).is_ok());
        assert!(limiter.check_key(&first).is_err());
        assert!(limiter.check_key(&second).is_ok());
    }
}
