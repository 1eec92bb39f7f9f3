//! Retry with exponential backoff and jitter.
//!
//! Every failure is retried identically regardless of error class; the
//! model endpoint does not distinguish throttling from transport faults
//! at this layer. Permanent rejections therefore burn the remaining
//! attempts before the last error propagates.

use rand::Rng;
use std::time::Duration;

/// Backoff parameters. Delay before attempt i+1 is
/// `min(cap, base * 2^i) * uniform(0.5, 1.0)`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base: Duration,
    pub cap: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base: Duration::from_millis(400),
            cap: Duration::from_secs(4),
        }
    }
}

impl RetryPolicy {
    /// Raw (pre-jitter) backoff for a zero-based attempt index.
    fn raw_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base.checked_mul(factor).map_or(self.cap, |d| d.min(self.cap))
    }

    /// Jittered backoff for a zero-based attempt index.
    pub fn delay(&self, attempt: u32) -> Duration {
        let jitter: f64 = rand::thread_rng().gen_range(0.5..1.0);
        self.raw_delay(attempt).mul_f64(jitter)
    }
}

/// Call `f` up to `policy.attempts` times, sleeping between failures.
/// Returns the first success, or the last error once attempts are
/// exhausted.
pub fn run<T, E>(policy: &RetryPolicy, mut f: impl FnMut() -> Result<T, E>) -> Result<T, E> {
    let attempts = policy.attempts.max(1);
    let mut last_err = None;
    for attempt in 0..attempts {
        match f() {
            Ok(v) => return Ok(v),
            Err(e) => {
                last_err = Some(e);
                if attempt + 1 < attempts {
                    std::thread::sleep(policy.delay(attempt));
                }
            }
        }
    }
    // attempts >= 1, so at least one call ran and set last_err.
    Err(last_err.unwrap())
}
