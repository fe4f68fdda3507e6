//! Global admission throttle for the message routes.
//!
//! A token bucket with a fixed mint period. `acquire` waits until a token is
//! available; tokens are only consumed at the moment a waiter is admitted, so
//! a caller that goes away mid-wait (request cancelled, connection dropped)
//! never burns one.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

struct Bucket {
    tokens: f64,
    updated: Instant,
}

/// Shared across all request tasks behind an `Arc`; every operation is safe
/// under concurrent access.
pub struct RateLimiter {
    bucket: Mutex<Bucket>,
    period: Duration,
    burst: f64,
}

impl RateLimiter {
    /// One token every `period`, holding at most `burst` unused tokens.
    /// The bucket starts full, so the first `burst` admissions are immediate.
    pub fn new(period: Duration, burst: u32) -> Self {
        let burst = burst.max(1);
        Self {
            bucket: Mutex::new(Bucket {
                tokens: f64::from(burst),
                updated: Instant::now(),
            }),
            period,
            burst: f64::from(burst),
        }
    }

    /// Wait until a token is available, then consume it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut bucket = self.bucket.lock().await;
                let now = Instant::now();
                let minted =
                    now.duration_since(bucket.updated).as_secs_f64() / self.period.as_secs_f64();
                bucket.tokens = (bucket.tokens + minted).min(self.burst);
                bucket.updated = now;

                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    return;
                }
                Duration::from_secs_f64((1.0 - bucket.tokens) * self.period.as_secs_f64())
            };
            // Lock released while sleeping; several waiters may race for the
            // next token and the losers loop around to wait again.
            tokio::time::sleep(wait).await;
        }
    }
}
