//! Inter-tick delay computation.
//!
//! Safe mode: `fixed_delay_ms / speed`. Otherwise:
//! `(base_rate_ms + uniform[0, variance_ms)) / speed`.

use rand::Rng;
use std::time::Duration;

use crate::types::RateConfig;

/// Computes the next delay in milliseconds.
pub fn next_delay_ms<R: Rng + ?Sized>(rate: &RateConfig, rng: &mut R) -> f64 {
    let speed = rate.speed_multiplier.max(1) as f64;
    let delay = if rate.safe_mode {
        rate.fixed_delay_ms
    } else {
        let jitter = if rate.variance_ms > 0.0 {
            rng.gen_range(0.0..rate.variance_ms)
        } else {
            0.0
        };
        rate.base_rate_ms + jitter
    };
    delay / speed
}

/// Computes the next delay as a [`Duration`].
///
/// Saturates at [`Duration::MAX`] for delays too large to represent.
pub fn next_delay<R: Rng + ?Sized>(rate: &RateConfig, rng: &mut R) -> Duration {
    Duration::try_from_secs_f64(next_delay_ms(rate, rng).max(0.0) / 1000.0)
        .unwrap_or(Duration::MAX)
}
