use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::Response,
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::app_conf::AppConfig;
use crate::util::error::{HandlerError, HandlerErrorKind};

pub const TOO_MANY_REQUESTS: &str = "Too many requests from this IP, please try again later.";

/// Per-client budget of `max_requests` per window, keyed by client IP.
pub struct ClientRateLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
    /// Take the client from `X-Forwarded-For`/`X-Real-IP` instead of the socket peer
    trust_proxy: bool,
}

impl ClientRateLimiter {
    pub fn new(max_requests: u32, window: Duration, trust_proxy: bool) -> Self {
        let burst = NonZeroU32::new(max_requests).unwrap_or(NonZeroU32::MIN);
        // The whole budget is available at once and refills over the window.
        let quota = Quota::with_period(window / burst.get())
            .map(|q| q.allow_burst(burst))
            .unwrap_or_else(|| Quota::per_second(burst));
        ClientRateLimiter { limiter: RateLimiter::keyed(quota), trust_proxy }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.rate_limit_max_requests,
            Duration::from_secs(config.rate_limit_window_secs),
            config.trust_proxy,
        )
    }

    pub fn check(&self, client: &str) -> bool {
        self.limiter.check_key(&client.to_string()).is_ok()
    }

    /// Number of clients currently tracked.
    pub fn tracked(&self) -> usize {
        self.limiter.len()
    }

    /// Forget clients whose budget has fully refilled.
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        debug!(clients = self.limiter.len(), "Rate limiter pruned");
    }

    /// Prune every `every` for as long as the limiter is alive. Needs a tokio runtime.
    pub fn spawn_pruning(limiter: &Arc<Self>, every: Duration) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("No tokio runtime, rate limiter state will not be pruned");
            return;
        };
        let limiter = Arc::downgrade(limiter);
        handle.spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(limiter) = limiter.upgrade() else { break };
                limiter.prune();
            }
        });
    }

    /// Forwarding headers only when the proxy is trusted, otherwise the socket peer.
    fn client_key(&self, req: &Request<Body>) -> String {
        if self.trust_proxy {
            let forwarded = req
                .headers()
                .get("x-forwarded-for")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty());
            if let Some(ip) = forwarded {
                return ip.to_string();
            }
            if let Some(ip) = req.headers().get("x-real-ip").and_then(|v| v.to_str().ok()) {
                return ip.trim().to_string();
            }
        }
        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ci| ci.0.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

pub async fn rate_limit(
    State(limiter): State<Arc<ClientRateLimiter>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let client = limiter.client_key(&req);
    if !limiter.check(&client) {
        warn!(client = %client, path = %req.uri().path(), "Rate limit exceeded");
        return Err(HandlerError::new(HandlerErrorKind::TooManyRequests, TOO_MANY_REQUESTS));
    }
    Ok(next.run(req).await)
}
