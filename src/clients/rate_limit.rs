//! Token bucket rate limiting for outbound API requests.
//!
//! This module provides the [`RateLimiter`] type, which caps the aggregate
//! request rate issued through one client instance. Tokens refill
//! continuously based on elapsed time; there is no background refill task,
//! so dropping the limiter releases every resource it holds.

use tokio::sync::Mutex;
use tokio::time::{sleep, Duration, Instant};

/// Token bucket rate limiter.
///
/// Capacity and refill rate both equal the configured requests-per-second
/// (with a minimum burst of one token so fractional rates still make
/// progress). A rate of zero disables throttling entirely and
/// [`acquire`](Self::acquire) returns immediately.
///
/// # Cancellation
///
/// `acquire` consumes a token only at the instant it resolves. A caller that
/// drops the future while parked — because a deadline elapsed or the task
/// was aborted — consumes nothing.
///
/// # Thread Safety
///
/// Safe under concurrent invocation from any number of callers; the bucket
/// state lives behind a single async mutex held only long enough to refill
/// and take a token, never across a sleep.
#[derive(Debug)]
pub struct RateLimiter {
    bucket: Option<Mutex<Bucket>>,
    rate: f64,
    capacity: f64,
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    /// Creates a limiter allowing `requests_per_second` sustained throughput.
    ///
    /// Values that are zero, negative, or not finite disable throttling.
    #[must_use]
    pub fn new(requests_per_second: f64) -> Self {
        if requests_per_second > 0.0 && requests_per_second.is_finite() {
            let capacity = requests_per_second.max(1.0);
            Self {
                bucket: Some(Mutex::new(Bucket {
                    tokens: capacity,
                    last_refill: Instant::now(),
                })),
                rate: requests_per_second,
                capacity,
            }
        } else {
            Self {
                bucket: None,
                rate: 0.0,
                capacity: 0.0,
            }
        }
    }

    /// Returns `true` if this limiter performs no throttling.
    #[must_use]
    pub const fn is_unlimited(&self) -> bool {
        self.bucket.is_none()
    }

    /// Waits until a token is available, then consumes it.
    ///
    /// Returns immediately when the limiter is unlimited. Otherwise refills
    /// the bucket from elapsed time and either takes a token or sleeps until
    /// one will be available, re-checking after the sleep since other
    /// callers compete for the same bucket.
    pub async fn acquire(&self) {
        let Some(bucket) = &self.bucket else {
            return;
        };

        loop {
            let wait = {
                let mut state = bucket.lock().await;
                let now = Instant::now();
                let elapsed = now.duration_since(state.last_refill).as_secs_f64();
                state.tokens = (state.tokens + elapsed * self.rate).min(self.capacity);
                state.last_refill = now;

                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    return;
                }

                Duration::from_secs_f64((1.0 - state.tokens) / self.rate)
            };

            sleep(wait).await;
        }
    }
}
