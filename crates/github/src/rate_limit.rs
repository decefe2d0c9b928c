//! Process-wide request throttling.
//!
//! A token bucket refilled continuously at a fixed rate. Every outbound call
//! takes one token first and waits for the refill when the bucket is empty.
//! This only prevents hitting the provider's limit; a limit signal from the
//! provider is never retried.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use reconciler::GatewayError;

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Shared token bucket. Clones draw from the same bucket.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    bucket: Arc<Mutex<Bucket>>,
    per_second: f64,
    capacity: f64,
}

impl RateLimiter {
    /// Creates a full bucket holding `burst` tokens, refilled at
    /// `requests_per_second`.
    pub fn new(requests_per_second: u32, burst: u32) -> Result<Self, GatewayError> {
        if requests_per_second == 0 || burst == 0 {
            return Err(GatewayError::Configuration {
                message: format!(
                    "rate limit needs a positive rate and burst, got {requests_per_second}/s with burst {burst}"
                ),
            });
        }

        Ok(Self {
            bucket: Arc::new(Mutex::new(Bucket {
                tokens: f64::from(burst),
                last_refill: Instant::now(),
            })),
            per_second: f64::from(requests_per_second),
            capacity: f64::from(burst),
        })
    }

    /// Waits for a token, or fails with [`GatewayError::Cancelled`] once
    /// `cancel` fires.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<(), GatewayError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(GatewayError::Cancelled),
            _ = self.take() => Ok(()),
        }
    }

    async fn take(&self) {
        loop {
            let wait = {
                let mut bucket = self.bucket.lock().await;
                let now = Instant::now();
                let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
                bucket.tokens = (bucket.tokens + elapsed * self.per_second).min(self.capacity);
                bucket.last_refill = now;

                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    return;
                }
                Duration::from_secs_f64((1.0 - bucket.tokens) / self.per_second)
            };
            tokio::time::sleep(wait).await;
        }
    }
}

#[path = "rate_limit_tests.rs"]
#[cfg(test)]
mod tests;
