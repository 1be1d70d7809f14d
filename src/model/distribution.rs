//! Fractional split of annual usage across rate periods.

use serde::{Deserialize, Serialize};

use super::rate_plan::RatePeriod;

/// Tolerance in percentage points for the soft sums-to-100 check.
const BALANCE_TOLERANCE_PP: f32 = 0.1;

/// Percentage split of annual kWh usage across rate periods.
///
/// The percentages are a soft constraint: the engine uses whatever values
/// are given, even when they do not sum to 100. Callers that want to warn
/// or repair use [`UsageDistribution::is_balanced`] and
/// [`UsageDistribution::normalized`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UsageDistribution {
    /// Share of annual usage drawn on-peak (percent).
    pub on_peak_percent: f32,
    /// Share of annual usage drawn mid-peak (percent).
    pub mid_peak_percent: f32,
    /// Share of annual usage drawn off-peak (percent).
    pub off_peak_percent: f32,
    /// Share of annual usage drawn in the ultra-low overnight window (percent).
    pub ultra_low_percent: f32,
}

impl Default for UsageDistribution {
    fn default() -> Self {
        Self {
            on_peak_percent: 20.0,
            mid_peak_percent: 30.0,
            off_peak_percent: 50.0,
            ultra_low_percent: 0.0,
        }
    }
}

impl UsageDistribution {
    /// Typical split for an ultra-low-overnight household that shifts
    /// load into the overnight window.
    pub fn ulo_shifted() -> Self {
        Self {
            on_peak_percent: 15.0,
            mid_peak_percent: 25.0,
            off_peak_percent: 35.0,
            ultra_low_percent: 25.0,
        }
    }

    /// Percentage assigned to `period`.
    pub fn percent(&self, period: RatePeriod) -> f32 {
        match period {
            RatePeriod::OnPeak => self.on_peak_percent,
            RatePeriod::MidPeak => self.mid_peak_percent,
            RatePeriod::OffPeak => self.off_peak_percent,
            RatePeriod::UltraLow => self.ultra_low_percent,
        }
    }

    /// Fractional share (percent / 100) assigned to `period`.
    pub fn share(&self, period: RatePeriod) -> f32 {
        self.percent(period) / 100.0
    }

    /// Sum of all period percentages.
    pub fn total_percent(&self) -> f32 {
        self.on_peak_percent + self.mid_peak_percent + self.off_peak_percent + self.ultra_low_percent
    }

    /// Whether the percentages sum to 100 within 0.1 pp.
    pub fn is_balanced(&self) -> bool {
        (self.total_percent() - 100.0).abs() <= BALANCE_TOLERANCE_PP
    }

    /// A copy rescaled so the percentages sum to exactly 100.
    ///
    /// Returns `self` unchanged when the total is zero (nothing to scale).
    pub fn normalized(&self) -> Self {
        let total = self.total_percent();
        if total <= 0.0 {
            return *self;
        }
        let k = 100.0 / total;
        Self {
            on_peak_percent: self.on_peak_percent * k,
            mid_peak_percent: self.mid_peak_percent * k,
            off_peak_percent: self.off_peak_percent * k,
            ultra_low_percent: self.ultra_low_percent * k,
        }
    }

    /// Periods with a nonzero share, in standard order.
    pub fn referenced_periods(&self) -> Vec<RatePeriod> {
        RatePeriod::ALL
            .iter()
            .copied()
            .filter(|&p| self.percent(p) > 0.0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_balanced() {
        let dist = UsageDistribution::default();
        assert!(dist.is_balanced());
        assert_eq!(dist.total_percent(), 100.0);
    }

    #[test]
    fn share_is_percent_over_hundred() {
        let dist = UsageDistribution::default();
        assert!((dist.share(RatePeriod::OffPeak) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn unbalanced_distribution_detected() {
        let dist = UsageDistribution {
            on_peak_percent: 20.0,
            mid_peak_percent: 30.0,
            off_peak_percent: 40.0,
            ultra_low_percent: 0.0,
        };
        assert!(!dist.is_balanced());
    }

    #[test]
    fn normalized_sums_to_hundred() {
        let dist = UsageDistribution {
            on_peak_percent: 10.0,
            mid_peak_percent: 10.0,
            off_peak_percent: 20.0,
            ultra_low_percent: 0.0,
        };
        let norm = dist.normalized();
        assert!((norm.total_percent() - 100.0).abs() < 1e-4);
        assert!((norm.on_peak_percent - 25.0).abs() < 1e-4);
    }

    #[test]
    fn normalized_zero_total_is_identity() {
        let dist = UsageDistribution {
            on_peak_percent: 0.0,
            mid_peak_percent: 0.0,
            off_peak_percent: 0.0,
            ultra_low_percent: 0.0,
        };
        assert_eq!(dist.normalized(), dist);
    }

    #[test]
    fn referenced_periods_skips_zero_shares() {
        let dist = UsageDistribution::default();
        let periods = dist.referenced_periods();
        assert_eq!(
            periods,
            vec![RatePeriod::OnPeak, RatePeriod::MidPeak, RatePeriod::OffPeak]
        );
    }
}
