//! # Retry Schedule
//!
//! Exponential backoff between submission attempts: the initial delay,
//! doubling per consecutive failure, capped.

/// Delay before the next attempt after `consecutive_failures` failures.
///
/// The first retry waits `initial_ms`; each further failure doubles it, up
/// to `max_ms`.
#[must_use]
pub fn backoff_delay_ms(initial_ms: u64, max_ms: u64, consecutive_failures: u32) -> u64 {
    let bounded_max = max_ms.max(initial_ms);
    let shift = consecutive_failures.saturating_sub(1).min(32);
    let multiplier = 1u64.checked_shl(shift).unwrap_or(u64::MAX);
    initial_ms.saturating_mul(multiplier).min(bounded_max)
}
