use std::time::Duration;

use rand::Rng;

/// Stretches `base` by a random amount in `[0, base * jitter_fraction]`.
/// Never shortens it.
pub fn apply_jitter(base: Duration, jitter_fraction: f64) -> Duration {
    if jitter_fraction <= 0.0 {
        return base;
    }
    let jitter_max = base.as_secs_f64() * jitter_fraction.clamp(0.0, 1.0);
    let offset = rand::thread_rng().gen_range(0.0..=jitter_max);
    Duration::from_secs_f64(base.as_secs_f64() + offset)
}
