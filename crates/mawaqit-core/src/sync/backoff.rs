use std::time::Duration;

/// Largest exponent applied to the base delay; the cap wins long before.
const MAX_EXPONENT: u32 = 20;

/// Capped exponential retry delay: `base * 2^(n-1)`, at most `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    max: Duration,
}

impl Backoff {
    /// A `max` below `base` is raised to `base`.
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max: max.max(base),
        }
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    /// Delay after the `failures`-th consecutive failure (1-based).
    pub fn delay_for(&self, failures: u32) -> Duration {
        if failures == 0 {
            return Duration::ZERO;
        }
        let exponent = (failures - 1).min(MAX_EXPONENT);
        self.base
            .saturating_mul(2_u32.saturating_pow(exponent))
            .min(self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn doubles_then_caps() {
        let backoff = Backoff::new(MINUTE, 60 * MINUTE);
        let delays: Vec<_> = (1..=8).map(|n| backoff.delay_for(n).as_secs() / 60).collect();
        assert_eq!(delays, [1, 2, 4, 8, 16, 32, 60, 60]);
    }

    #[test]
    fn non_decreasing_for_large_counts() {
        let backoff = Backoff::new(Duration::from_secs(7), Duration::from_secs(10_000));
        let mut previous = Duration::ZERO;
        for n in 0..200 {
            let delay = backoff.delay_for(n);
            assert!(delay >= previous, "delay shrank at failure {n}");
            assert!(delay <= backoff.max());
            previous = delay;
        }
    }

    #[test]
    fn cap_never_below_base() {
        let backoff = Backoff::new(MINUTE, Duration::from_secs(1));
        assert_eq!(backoff.max(), MINUTE);
        assert_eq!(backoff.delay_for(5), MINUTE);
    }
}
