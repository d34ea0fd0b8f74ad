use crate::config::LoginRateConfig;
use crate::error::ApiError;
use axum::{
    extract::ConnectInfo,
    http::Request,
    response::{IntoResponse, Response},
};
use governor::{clock::QuantaInstant, middleware::NoOpMiddleware};
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
};
use tower_governor::{
    errors::GovernorError,
    governor::{GovernorConfig, GovernorConfigBuilder},
    key_extractor::KeyExtractor,
};

/// Keys login attempts by client IP, looking at proxy headers first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IpKeyExtractor;

impl KeyExtractor for IpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();

        // 1. Cloudflare puts the real client address here.
        if let Some(ip) = headers
            .get("cf-connecting-ip")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        // 2. Generic proxies. First entry is the client.
        if let Some(ip) = headers
            .get("x-forwarded-for")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        // 3. No proxy: the peer address of the TCP connection.
        if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
            return Ok(addr.ip());
        }

        // 4. Served without connect info (tests, embedding): one shared bucket.
        Ok(IpAddr::V4(Ipv4Addr::LOCALHOST))
    }
}

pub type LoginConfig = GovernorConfig<IpKeyExtractor, NoOpMiddleware<QuantaInstant>>;

/// Brute-force protection for `POST /login`: `burst` attempts per IP, one more
/// allowed every `period`.
pub fn create_login_config(rate: LoginRateConfig) -> Arc<LoginConfig> {
    Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(IpKeyExtractor)
            .period(rate.period)
            .burst_size(rate.burst)
            .finish()
            .expect("login rate limit burst and period are validated as non-zero"),
    )
}

/// Renders limiter rejections as the usual JSON error body.
pub fn rate_limited_response(err: GovernorError) -> Response {
    match err {
        GovernorError::TooManyRequests { wait_time, .. } => {
            tracing::warn!(retry_after = wait_time, "login rate limit hit");
            ApiError::RateLimited { retry_after: wait_time }.into_response()
        }
        other => ApiError::Internal(format!("rate limiter: {}", other)).into_response(),
    }
}
