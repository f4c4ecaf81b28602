//! HTTP API handlers for namebase-api

pub mod health;
pub mod names;
pub mod popular;
pub mod throttle;

pub use health::health_routes;
pub use names::name_routes;
pub use popular::popular_routes;
pub use throttle::{client_rate_limiter, throttle, ClientRateLimiter};
