//! Per-IP rate limits built on `tower_governor`.
//!
//! `per_second(n)` in governor terms means one request is replenished every
//! `n` seconds; the burst is what a client may send before it has to wait.

/// Login, signup and password endpoints: a burst of 10, then one every 2 seconds.
pub const AUTH_REPLENISH_SECONDS: u64 = 2;
pub const AUTH_BURST_SIZE: u32 = 10;

/// Password reset mails: a burst of 3, then one every 20 seconds.
pub const RESET_REPLENISH_SECONDS: u64 = 20;
pub const RESET_BURST_SIZE: u32 = 3;

/// Build a `GovernorLayer` keyed on the client IP (`X-Forwarded-For`,
/// `X-Real-IP`, `Forwarded`, then the peer address).
///
/// The server must be started with
/// `into_make_service_with_connect_info::<SocketAddr>()` so the peer address
/// fallback is available.
#[macro_export]
macro_rules! make_rate_limit_layer {
    ($replenish_seconds:expr, $burst:expr) => {{
        let config = ::tower_governor::governor::GovernorConfigBuilder::default()
            .per_second($replenish_seconds)
            .burst_size($burst)
            .key_extractor(::tower_governor::key_extractor::SmartIpKeyExtractor)
            .use_headers()
            .finish()
            .expect("rate limit constants are non-zero");
        ::tower_governor::GovernorLayer::new(config)
    }};
}
