//! Shared test fixtures for integration tests.

use peakshave::engine::DispatchPolicy;
use peakshave::model::{BatterySpec, RatePlan, UsageDistribution, Warranty};

/// Default TOU plan (on-peak 20.3¢, mid-peak 15.7¢, off-peak 9.8¢).
pub fn tou_plan() -> RatePlan {
    RatePlan::time_of_use()
}

/// Default ULO plan (on-peak 39.1¢, ultra-low 3.9¢).
pub fn ulo_plan() -> RatePlan {
    RatePlan::ultra_low_overnight()
}

/// Default usage distribution (20% on-peak, 30% mid-peak, 50% off-peak).
pub fn default_distribution() -> UsageDistribution {
    UsageDistribution::default()
}

/// Default dispatch assumptions.
pub fn default_policy() -> DispatchPolicy {
    DispatchPolicy::default()
}

/// A 10 kWh usable / 13.5 kWh nominal test battery with a 5 kW inverter.
pub fn test_battery() -> BatterySpec {
    BatterySpec {
        id: "test".to_string(),
        brand: "Test".to_string(),
        model: "10 kWh".to_string(),
        nominal_kwh: 13.5,
        usable_kwh: 10.0,
        usable_percent: 74.1,
        round_trip_efficiency: 0.90,
        inverter_kw: 5.0,
        price: 9_000.0,
        warranty: Warranty {
            years: 10,
            cycles: 4000,
        },
    }
}
