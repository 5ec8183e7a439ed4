/// Per-IP rate limiting for the credential endpoints (signup/login).
///
/// Token-bucket per client address. One `RateLimiter` is built from
/// `RateLimitSettings` at startup and cloned into each worker, so the
/// bucket map is shared across the whole server.
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::future::LocalBoxFuture;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use crate::configuration::RateLimitSettings;
use crate::error::{AppError, AuthError};

struct TokenBucket {
    tokens: f64,
    last_refill: SystemTime,
    capacity: u32,
    refill_rate: f64, // tokens per second
}

impl TokenBucket {
    fn new(capacity: u32, requests_per_minute: u32) -> Self {
        Self {
            tokens: capacity as f64,
            last_refill: SystemTime::now(),
            capacity,
            refill_rate: requests_per_minute as f64 / 60.0,
        }
    }

    fn try_take_token(&mut self) -> bool {
        if let Ok(elapsed) = self.last_refill.elapsed() {
            let elapsed_secs = elapsed.as_secs_f64();
            self.tokens = (self.tokens + elapsed_secs * self.refill_rate).min(self.capacity as f64);
            self.last_refill = SystemTime::now();
        }

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

#[derive(Clone)]
pub struct RateLimiter {
    settings: RateLimitSettings,
    buckets: Arc<Mutex<HashMap<String, TokenBucket>>>,
}

impl RateLimiter {
    pub fn new(settings: RateLimitSettings) -> Self {
        Self {
            settings,
            buckets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn allow(&self, ip: &str) -> bool {
        let mut buckets = self.buckets.lock().unwrap();

        let bucket = buckets.entry(ip.to_string()).or_insert_with(|| {
            TokenBucket::new(self.settings.burst_size, self.settings.requests_per_minute)
        });

        bucket.try_take_token()
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimiter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimiterService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(RateLimiterService {
            service: Rc::new(service),
            limiter: self.clone(),
        }))
    }
}

pub struct RateLimiterService<S> {
    service: Rc<S>,
    limiter: RateLimiter,
}

/// First X-Forwarded-For entry when present (deployments behind a proxy),
/// otherwise the connection peer address.
fn client_ip(req: &ServiceRequest) -> String {
    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| req.peer_addr().map(|a| a.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

impl<S, B> Service<ServiceRequest> for RateLimiterService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let ip = client_ip(&req);

        if self.limiter.allow(&ip) {
            let service = self.service.clone();
            Box::pin(async move { service.call(req).await })
        } else {
            tracing::warn!(ip = %ip, path = %req.path(), "Rate limit exceeded");
            Box::pin(async move { Err(AppError::Auth(AuthError::RateLimited).into()) })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(burst: u32, per_minute: u32) -> RateLimiter {
        RateLimiter::new(RateLimitSettings {
            requests_per_minute: per_minute,
            burst_size: burst,
        })
    }

    #[test]
    fn allows_up_to_burst_then_refuses() {
        let limiter = limiter(3, 1);

        assert!(limiter.allow("10.0.0.1"));
        assert!(limiter.allow("10.0.0.1"));
        assert!(limiter.allow("10.0.0.1"));
        assert!(!limiter.allow("10.0.0.1"));
    }

    #[test]
    fn addresses_are_limited_independently() {
        let limiter = limiter(1, 1);

        assert!(limiter.allow("10.0.0.1"));
        assert!(!limiter.allow("10.0.0.1"));
        assert!(limiter.allow("10.0.0.2"));
    }

    #[test]
    fn clones_share_one_bucket_map() {
        let limiter = limiter(1, 1);
        let clone = limiter.clone();

        assert!(limiter.allow("10.0.0.1"));
        assert!(!clone.allow("10.0.0.1"));
    }
}
