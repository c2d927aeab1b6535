use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json,
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderValue, Request, StatusCode, header::RETRY_AFTER},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    cache::{CacheStore, RateLimitCacheOperations},
    config::Config,
};

/// 固定窗口限流：每个客户端在一个窗口内最多 limit 次请求
#[derive(Clone)]
pub struct RateLimiter {
    cache: Arc<dyn CacheStore>,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(cache: Arc<dyn CacheStore>, limit: u32, window: Duration) -> Self {
        Self {
            cache,
            limit,
            window,
        }
    }

    pub fn from_config(cache: Arc<dyn CacheStore>, config: &Config) -> Self {
        Self::new(cache, config.rate_limit_requests, config.rate_limit_window())
    }

    pub async fn check_rate_limit(self: Arc<Self>, req: Request<Body>, next: Next) -> Response {
        let ip = client_ip(&req);

        // 缓存不可用时放行
        let usage =
            match RateLimitCacheOperations::increment(self.cache.as_ref(), &ip, self.window).await
            {
                Ok(usage) => usage,
                Err(e) => {
                    tracing::warn!("Rate limiter unavailable, letting {} through: {}", ip, e);
                    return next.run(req).await;
                }
            };

        if usage.count > i64::from(self.limit) {
            tracing::warn!("Rate limit exceeded for {} ({} requests)", ip, usage.count);
            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "error": "too many requests" })),
            )
                .into_response();
            let retry_after = retry_after_secs(usage.resets_in);
            if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert(RETRY_AFTER, value);
            }
            return response;
        }

        next.run(req).await
    }
}

/// 窗口剩余时间向上取整到秒，至少 1 秒
fn retry_after_secs(resets_in: Duration) -> u64 {
    let secs = resets_in.as_secs() + u64::from(resets_in.subsec_nanos() > 0);
    secs.max(1)
}

/// 客户端标识：优先取代理头，其次取连接地址
fn client_ip(req: &Request<Body>) -> String {
    let remote_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string());

    req.headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .filter(|s| !s.trim().is_empty())
        .or_else(|| {
            req.headers()
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.split(',').find(|ip| !ip.trim().is_empty()))
        })
        .or(remote_ip.as_deref())
        .unwrap_or("unknown")
        .trim()
        .to_string()
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    limiter.check_rate_limit(req, next).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(headers: &[(&str, &str)]) -> Request<Body> {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn retry_after_rounds_up_remaining_time() {
        assert_eq!(retry_after_secs(Duration::from_secs(15)), 15);
        assert_eq!(retry_after_secs(Duration::from_millis(14_200)), 15);
        assert_eq!(retry_after_secs(Duration::ZERO), 1);
    }

    #[test]
    fn real_ip_header_wins() {
        let req = request(&[("x-real-ip", "1.1.1.1"), ("x-forwarded-for", "2.2.2.2")]);
        assert_eq!(client_ip(&req), "1.1.1.1");
    }

    #[test]
    fn first_forwarded_entry_is_used() {
        let req = request(&[("x-forwarded-for", " 3.3.3.3, 4.4.4.4")]);
        assert_eq!(client_ip(&req), "3.3.3.3");
    }

    #[test]
    fn falls_back_to_connection_address() {
        let mut req = request(&[]);
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 9], 5000))));
        assert_eq!(client_ip(&req), "10.0.0.9");
    }

    #[test]
    fn unknown_without_any_source() {
        assert_eq!(client_ip(&request(&[])), "unknown");
    }
}
