//! Dispatch assumptions shared by the allocation calculators.

use serde::{Deserialize, Serialize};

use super::periods::PeriodValues;

/// Tunable assumptions about how a solar + battery system is operated.
///
/// These are annual-model policy knobs, not a physical simulation: the
/// calculators work on yearly energy volumes, so windows and overlaps are
/// expressed as fractions and hours rather than timestamped schedules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchPolicy {
    /// Hours per day the battery discharges at inverter power. Bounds
    /// daily dispatch to `min(usable_kwh, inverter_kw * window)`.
    pub discharge_window_hours: f32,
    /// Maximum fraction of annual usage solar can serve directly
    /// (daytime-only generation assumption).
    pub solar_direct_cap_fraction: f32,
    /// Extra load-shift headroom into the cheapest period, as a fraction
    /// of annual usage.
    pub cheap_shift_buffer_fraction: f32,
    /// Fraction of each period's usage that overlaps solar production
    /// hours; weights the solar-direct allocation.
    pub daytime_overlap: PeriodValues,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            discharge_window_hours: 4.0,
            solar_direct_cap_fraction: 0.5,
            cheap_shift_buffer_fraction: 0.05,
            daytime_overlap: PeriodValues {
                on_peak: 1.0,
                mid_peak: 1.0,
                off_peak: 0.35,
                ultra_low: 0.0,
            },
        }
    }
}

impl DispatchPolicy {
    /// Annual battery dispatch volume in kWh: daily usable energy bounded
    /// by inverter power over the discharge window, times 365.
    pub fn annual_dispatch_kwh(&self, usable_kwh: f32, inverter_kw: f32) -> f32 {
        let daily = usable_kwh.min(inverter_kw * self.discharge_window_hours);
        daily.max(0.0) * 365.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annual_dispatch_is_capacity_limited_for_big_inverters() {
        let policy = DispatchPolicy::default();
        // 10 kWh usable, 11.5 kW inverter: capacity binds
        let annual = policy.annual_dispatch_kwh(10.0, 11.5);
        assert!((annual - 3650.0).abs() < 1e-2);
    }

    #[test]
    fn annual_dispatch_is_inverter_limited_for_small_inverters() {
        let policy = DispatchPolicy::default();
        // 13.5 kWh usable, 2 kW inverter over a 4 h window: 8 kWh/day binds
        let annual = policy.annual_dispatch_kwh(13.5, 2.0);
        assert!((annual - 8.0 * 365.0).abs() < 1e-2);
    }

    #[test]
    fn annual_dispatch_of_zero_battery_is_zero() {
        let policy = DispatchPolicy::default();
        assert_eq!(policy.annual_dispatch_kwh(0.0, 0.0), 0.0);
    }
}
