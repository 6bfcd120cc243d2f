//! Update rate control for snapshot streams

use serde::{Deserialize, Serialize};

/// Update rate for topology snapshot streams
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UpdateRate {
    /// Every snapshot the driver publishes (one per applied frame)
    Native,

    /// Throttled to maximum Hz
    /// If the requested rate exceeds the driver's poll rate, Native is used
    Max(u32),
}

impl UpdateRate {
    /// Normalize rate against the driver's poll frequency
    /// Returns effective rate to use
    pub fn normalize(self, source_hz: f64) -> Self {
        match self {
            UpdateRate::Native => UpdateRate::Native,
            UpdateRate::Max(hz) if hz as f64 >= source_hz => UpdateRate::Native,
            // Max(0) would mean "never"; round it up to one per second
            UpdateRate::Max(hz) => UpdateRate::Max(hz.max(1)),
        }
    }

    /// Get throttle interval if needed
    pub fn throttle_interval(self, source_hz: f64) -> Option<std::time::Duration> {
        match self.normalize(source_hz) {
            UpdateRate::Native => None,
            UpdateRate::Max(hz) => Some(std::time::Duration::from_secs_f64(1.0 / hz as f64)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_at_or_above_source_normalize_to_native() {
        assert_eq!(UpdateRate::Max(2).normalize(1.0), UpdateRate::Native);
        assert_eq!(UpdateRate::Max(1).normalize(1.0), UpdateRate::Native);
        assert_eq!(UpdateRate::Native.normalize(1.0), UpdateRate::Native);
    }

    #[test]
    fn slower_rates_keep_their_interval() {
        let rate = UpdateRate::Max(2).normalize(10.0);
        assert_eq!(rate, UpdateRate::Max(2));
        assert_eq!(
            rate.throttle_interval(10.0),
            Some(std::time::Duration::from_millis(500))
        );
        assert_eq!(UpdateRate::Native.throttle_interval(10.0), None);
    }

    #[test]
    fn max_zero_rounds_up_instead_of_never() {
        assert_eq!(UpdateRate::Max(0).normalize(10.0), UpdateRate::Max(1));
        assert_eq!(
            UpdateRate::Max(0).throttle_interval(10.0),
            Some(std::time::Duration::from_secs(1))
        );
    }
}
