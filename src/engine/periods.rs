//! Fixed per-period value maps used throughout the allocation engine.

use serde::{Deserialize, Serialize};

use crate::model::RatePeriod;

/// One `f32` per rate period.
///
/// Used for kWh buckets, dollar buckets, and fractional weights alike; the
/// meaning comes from the field it is stored in, not the type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PeriodValues {
    /// Value for the on-peak period.
    pub on_peak: f32,
    /// Value for the mid-peak period.
    pub mid_peak: f32,
    /// Value for the off-peak period.
    pub off_peak: f32,
    /// Value for the ultra-low period.
    pub ultra_low: f32,
}

impl PeriodValues {
    /// Value stored for `period`.
    pub fn get(&self, period: RatePeriod) -> f32 {
        match period {
            RatePeriod::OnPeak => self.on_peak,
            RatePeriod::MidPeak => self.mid_peak,
            RatePeriod::OffPeak => self.off_peak,
            RatePeriod::UltraLow => self.ultra_low,
        }
    }

    /// Replaces the value stored for `period`.
    pub fn set(&mut self, period: RatePeriod, value: f32) {
        match period {
            RatePeriod::OnPeak => self.on_peak = value,
            RatePeriod::MidPeak => self.mid_peak = value,
            RatePeriod::OffPeak => self.off_peak = value,
            RatePeriod::UltraLow => self.ultra_low = value,
        }
    }

    /// Adds `delta` to the value stored for `period`.
    pub fn add(&mut self, period: RatePeriod, delta: f32) {
        self.set(period, self.get(period) + delta);
    }

    /// Sum over all periods.
    pub fn total(&self) -> f32 {
        self.on_peak + self.mid_peak + self.off_peak + self.ultra_low
    }

    /// Per-period difference `self - other`.
    pub fn minus(&self, other: &PeriodValues) -> PeriodValues {
        let mut out = PeriodValues::default();
        for &period in RatePeriod::ALL.iter() {
            out.set(period, self.get(period) - other.get(period));
        }
        out
    }
}

/// Per-period dollar costs plus their total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PeriodCosts {
    /// Cost per period in dollars.
    pub by_period: PeriodValues,
    /// Total cost in dollars.
    pub total: f32,
}

impl PeriodCosts {
    /// Prices per-period kWh at the given dollars-per-kWh rates.
    pub fn price(kwh: &PeriodValues, rate_dollars: impl Fn(RatePeriod) -> f32) -> Self {
        let mut by_period = PeriodValues::default();
        for &period in RatePeriod::ALL.iter() {
            by_period.set(period, kwh.get(period) * rate_dollars(period));
        }
        Self {
            total: by_period.total(),
            by_period,
        }
    }
}
