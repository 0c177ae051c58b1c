use poem::{Endpoint, IntoResponse, Middleware, Request, Response, Result};
use r2d2::Pool as r2d2Pool;
use redis::Client;

use crate::{schema::common::ErrorResponses, settings::Config};

/// Fixed window request limiter keyed by client ip, counted in redis.
pub struct RateLimit {
    redis_conn: r2d2Pool<Client>,
    max: u32,
    window: u64,
    trust_proxy: bool,
}

impl RateLimit {
    pub fn new(redis_conn: r2d2Pool<Client>, config: &Config) -> Self {
        Self {
            redis_conn,
            max: config.rate_limit_max,
            window: config.rate_limit_window,
            trust_proxy: config.trust_proxy,
        }
    }
}

impl<E: Endpoint> Middleware<E> for RateLimit {
    type Output = RateLimitEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        RateLimitEndpoint {
            inner: ep,
            redis_conn: self.redis_conn.clone(),
            max: self.max,
            window: self.window,
            trust_proxy: self.trust_proxy,
        }
    }
}

pub struct RateLimitEndpoint<E> {
    inner: E,
    redis_conn: r2d2Pool<Client>,
    max: u32,
    window: u64,
    trust_proxy: bool,
}

pub fn rate_limit_key(ip: &str) -> String {
    format!("rate_limit:{}", ip)
}

/// Peer address of the request. The first `X-Forwarded-For` entry is only
/// used when `trust_proxy` is set.
pub fn client_ip(req: &Request, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(forwarded) = req
            .headers()
            .get("x-forwarded-for")
            .and_then(|x| x.to_str().ok())
            .and_then(|x| x.split(',').next())
            .map(|x| x.trim())
            .filter(|x| !x.is_empty())
        {
            return forwarded.to_string();
        }
    }
    match req.remote_addr().as_socket_addr() {
        Some(addr) => addr.ip().to_string(),
        None => "unknown".to_string(),
    }
}

/// Count one request in the current window of `key`. Blocking.
fn hit(redis_conn: &r2d2Pool<Client>, key: &str, window: u64) -> anyhow::Result<u64> {
    let mut conn = redis_conn.get()?;
    let count: u64 = redis::cmd("INCR").arg(key).query(&mut *conn)?;
    if count == 1 {
        let _: i64 = redis::cmd("EXPIRE").arg(key).arg(window).query(&mut *conn)?;
    }
    Ok(count)
}

impl<E: Endpoint> Endpoint for RateLimitEndpoint<E> {
    type Output = Response;

    async fn call(&self, req: Request) -> Result<Self::Output> {
        if self.max > 0 {
            let ip = client_ip(&req, self.trust_proxy);
            let redis_conn = self.redis_conn.clone();
            let key = rate_limit_key(&ip);
            let window = self.window;
            let counted = tokio::task::spawn_blocking(move || hit(&redis_conn, &key, window))
                .await
                .map_err(anyhow::Error::from)
                .and_then(|res| res);
            match counted {
                Ok(count) if count > self.max as u64 => {
                    tracing::info!("rate limit exceeded for {}", ip);
                    return Ok(ErrorResponses::too_many_requests().into_response());
                }
                Ok(_) => {}
                // fail open
                Err(err) => tracing::warn!("rate limiter unavailable: {}", err),
            }
        }
        let resp = self.inner.call(req).await?;
        Ok(resp.into_response())
    }
}
