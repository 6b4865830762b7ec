//! Rate limiting middleware.
//!
//! In-memory sliding-window limiter keyed by client IP. Each policy keeps
//! the timestamps of the requests it admitted inside its window; a request
//! is rejected once the window already holds `max_requests` of them.

use crate::error::ApiError;
use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{HeaderName, HeaderValue, Request, Response},
    response::IntoResponse,
};
use parking_lot::Mutex;
use std::{
    collections::{HashMap, VecDeque},
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};
use studyhub_common::RateLimitPolicy;
use tower::{Layer, Service};
use tracing::debug;

const LIMIT_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const REMAINING_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
const FORWARDED_FOR: &str = "x-forwarded-for";

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request may proceed
    pub allowed: bool,
    /// Requests allowed per window
    pub limit: u32,
    /// Requests left in the current window after this one
    pub remaining: u32,
    /// Time until a slot frees up; zero when allowed
    pub retry_after: Duration,
}

/// Sliding-window rate limiter
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    max_requests: u32,
    window: Duration,
    buckets: Mutex<HashMap<IpAddr, VecDeque<Instant>>>,
}

impl SlidingWindowLimiter {
    /// Create a limiter for `policy`
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            max_requests: policy.max_requests,
            window: policy.window(),
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Check and record a request from `ip`
    pub fn check(&self, ip: IpAddr) -> RateLimitDecision {
        self.check_at(ip, Instant::now())
    }

    fn check_at(&self, ip: IpAddr, now: Instant) -> RateLimitDecision {
        let mut buckets = self.buckets.lock();
        let requests = buckets.entry(ip).or_default();

        while requests
            .front()
            .is_some_and(|&at| now.saturating_duration_since(at) >= self.window)
        {
            requests.pop_front();
        }

        let limit = self.max_requests;
        if requests.len() >= limit as usize {
            let retry_after = requests
                .front()
                .map(|&oldest| self.window.saturating_sub(now.saturating_duration_since(oldest)))
                .unwrap_or(self.window);
            return RateLimitDecision {
                allowed: false,
                limit,
                remaining: 0,
                retry_after,
            };
        }

        requests.push_back(now);
        RateLimitDecision {
            allowed: true,
            limit,
            remaining: limit.saturating_sub(requests.len() as u32),
            retry_after: Duration::ZERO,
        }
    }

    /// Drop clients with no requests left in the window
    pub fn prune(&self) {
        self.prune_at(Instant::now());
    }

    fn prune_at(&self, now: Instant) {
        let mut buckets = self.buckets.lock();
        buckets.retain(|_, requests| {
            requests.retain(|&at| now.saturating_duration_since(at) < self.window);
            !requests.is_empty()
        });
    }

    /// Number of clients currently tracked
    pub fn tracked_clients(&self) -> usize {
        self.buckets.lock().len()
    }
}

/// Client IP: connection address, then the first `X-Forwarded-For` hop,
/// then loopback.
pub fn client_ip<B>(req: &Request<B>) -> IpAddr {
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip();
    }

    req.headers()
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|hop| hop.trim().parse::<IpAddr>().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

/// Layer for rate limiting
#[derive(Clone)]
pub struct RateLimitLayer {
    limiter: Option<Arc<SlidingWindowLimiter>>,
}

impl RateLimitLayer {
    /// Create a rate limit layer enforcing `policy`
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            limiter: Some(Arc::new(SlidingWindowLimiter::new(policy))),
        }
    }

    /// A layer that lets every request through
    pub fn disabled() -> Self {
        Self { limiter: None }
    }

    /// Build from config; disabled when rate limiting is switched off
    pub fn from_policy(enabled: bool, policy: RateLimitPolicy) -> Self {
        if enabled {
            Self::new(policy)
        } else {
            Self::disabled()
        }
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitService {
            inner,
            limiter: self.limiter.clone(),
        }
    }
}

/// Service that performs rate limiting
#[derive(Clone)]
pub struct RateLimitService<S> {
    inner: S,
    limiter: Option<Arc<SlidingWindowLimiter>>,
}

fn set_header_if_absent(response: &mut Response<Body>, name: HeaderName, value: u32) {
    if !response.headers().contains_key(&name) {
        response.headers_mut().insert(name, HeaderValue::from(value));
    }
}

impl<S> Service<Request<Body>> for RateLimitService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let limiter = self.limiter.clone();
        let clone = self.inner.clone();
        // Take the service that was driven to readiness
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let Some(limiter) = limiter else {
                return inner.call(req).await;
            };

            let ip = client_ip(&req);
            let decision = limiter.check(ip);

            if rand::random::<f32>() < 0.01 {
                limiter.prune();
            }

            let mut response = if decision.allowed {
                inner.call(req).await?
            } else {
                debug!(client_ip = %ip, "Rate limit exceeded");
                let retry_after_seconds = decision.retry_after.as_secs_f64().ceil().max(1.0) as u64;
                ApiError::RateLimitExceeded {
                    retry_after_seconds,
                }
                .into_response()
            };

            // Inner (stricter) policies have already written their headers
            set_header_if_absent(&mut response, LIMIT_HEADER, decision.limit);
            set_header_if_absent(&mut response, REMAINING_HEADER, decision.remaining);

            Ok(response)
        })
    }
}
