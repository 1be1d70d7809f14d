//! Battery storage specifications and the selection-combining rule.

use serde::{Deserialize, Serialize};

/// Manufacturer warranty terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warranty {
    /// Warranty duration in years.
    pub years: u32,
    /// Warranted cycle count.
    pub cycles: u32,
}

/// A battery energy storage system specification.
///
/// Catalog entries are static data; a multi-battery selection combines
/// into a single derived spec via [`combine_batteries`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatterySpec {
    /// Catalog identifier (e.g. `"powerwall3"`).
    pub id: String,
    /// Manufacturer name.
    pub brand: String,
    /// Model name.
    pub model: String,
    /// Nameplate capacity in kWh.
    pub nominal_kwh: f32,
    /// Dischargeable capacity in kWh.
    pub usable_kwh: f32,
    /// Usable share of nameplate capacity (percent).
    pub usable_percent: f32,
    /// Round-trip efficiency (0.0–1.0).
    pub round_trip_efficiency: f32,
    /// Continuous inverter power in kW.
    pub inverter_kw: f32,
    /// Installed price in dollars.
    pub price: f32,
    /// Manufacturer warranty.
    pub warranty: Warranty,
}

impl BatterySpec {
    /// Zero-capacity sentinel for solar-only estimates.
    pub fn none() -> Self {
        Self {
            id: "none".to_string(),
            brand: String::new(),
            model: String::new(),
            nominal_kwh: 0.0,
            usable_kwh: 0.0,
            usable_percent: 0.0,
            round_trip_efficiency: 0.0,
            inverter_kw: 0.0,
            price: 0.0,
            warranty: Warranty { years: 0, cycles: 0 },
        }
    }

    /// Whether this spec stores no usable energy.
    pub fn is_zero(&self) -> bool {
        self.usable_kwh <= 0.0
    }
}

/// Combines a battery selection into one derived spec.
///
/// Capacities, inverter power, and price sum; round-trip efficiency is a
/// capacity-weighted average; warranty takes the minimum years and cycles
/// across the selection (most conservative). An empty selection yields the
/// zero sentinel.
pub fn combine_batteries(specs: &[BatterySpec]) -> BatterySpec {
    if specs.is_empty() {
        return BatterySpec::none();
    }
    if specs.len() == 1 {
        return specs[0].clone();
    }

    let mut nominal = 0.0_f32;
    let mut usable = 0.0_f32;
    let mut inverter = 0.0_f32;
    let mut price = 0.0_f32;
    let mut weighted_eta = 0.0_f32;
    let mut min_years = u32::MAX;
    let mut min_cycles = u32::MAX;

    for spec in specs {
        nominal += spec.nominal_kwh;
        usable += spec.usable_kwh;
        inverter += spec.inverter_kw;
        price += spec.price;
        weighted_eta += spec.round_trip_efficiency * spec.usable_kwh;
        min_years = min_years.min(spec.warranty.years);
        min_cycles = min_cycles.min(spec.warranty.cycles);
    }

    let round_trip_efficiency = if usable > 0.0 { weighted_eta / usable } else { 0.0 };
    let usable_percent = if nominal > 0.0 { usable / nominal * 100.0 } else { 0.0 };

    BatterySpec {
        id: "combined".to_string(),
        brand: "Combined".to_string(),
        model: format!("{} units", specs.len()),
        nominal_kwh: nominal,
        usable_kwh: usable,
        usable_percent,
        round_trip_efficiency,
        inverter_kw: inverter,
        price,
        warranty: Warranty {
            years: min_years,
            cycles: min_cycles,
        },
    }
}

/// Built-in catalog of residential batteries.
pub fn catalog() -> Vec<BatterySpec> {
    vec![
        BatterySpec {
            id: "powerwall3".to_string(),
            brand: "Tesla".to_string(),
            model: "Powerwall 3".to_string(),
            nominal_kwh: 13.5,
            usable_kwh: 13.5,
            usable_percent: 100.0,
            round_trip_efficiency: 0.89,
            inverter_kw: 11.5,
            price: 11_500.0,
            warranty: Warranty {
                years: 10,
                cycles: 4000,
            },
        },
        BatterySpec {
            id: "enphase-5p".to_string(),
            brand: "Enphase".to_string(),
            model: "IQ Battery 5P".to_string(),
            nominal_kwh: 5.0,
            usable_kwh: 5.0,
            usable_percent: 100.0,
            round_trip_efficiency: 0.90,
            inverter_kw: 3.84,
            price: 6_500.0,
            warranty: Warranty {
                years: 15,
                cycles: 6000,
            },
        },
        BatterySpec {
            id: "resu10h".to_string(),
            brand: "LG".to_string(),
            model: "RESU10H Prime".to_string(),
            nominal_kwh: 9.6,
            usable_kwh: 9.0,
            usable_percent: 93.8,
            round_trip_efficiency: 0.90,
            inverter_kw: 5.0,
            price: 8_200.0,
            warranty: Warranty {
                years: 10,
                cycles: 4000,
            },
        },
        BatterySpec {
            id: "apower2".to_string(),
            brand: "FranklinWH".to_string(),
            model: "aPower 2".to_string(),
            nominal_kwh: 15.0,
            usable_kwh: 13.6,
            usable_percent: 90.7,
            round_trip_efficiency: 0.89,
            inverter_kw: 10.0,
            price: 13_000.0,
            warranty: Warranty {
                years: 12,
                cycles: 4500,
            },
        },
    ]
}

/// Looks up a catalog battery by id.
pub fn find(id: &str) -> Option<BatterySpec> {
    catalog().into_iter().find(|b| b.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selection_combines_to_zero_sentinel() {
        let combined = combine_batteries(&[]);
        assert!(combined.is_zero());
        assert_eq!(combined.price, 0.0);
    }

    #[test]
    fn single_selection_is_passed_through() {
        let spec = find("powerwall3").unwrap();
        let combined = combine_batteries(std::slice::from_ref(&spec));
        assert_eq!(combined, spec);
    }

    #[test]
    fn combine_sums_capacity_power_and_price() {
        let a = find("powerwall3").unwrap();
        let b = find("enphase-5p").unwrap();
        let combined = combine_batteries(&[a.clone(), b.clone()]);

        assert!((combined.usable_kwh - (a.usable_kwh + b.usable_kwh)).abs() < 1e-4);
        assert!((combined.inverter_kw - (a.inverter_kw + b.inverter_kw)).abs() < 1e-4);
        assert!((combined.price - (a.price + b.price)).abs() < 1e-2);
    }

    #[test]
    fn combine_weights_efficiency_by_usable_capacity() {
        let a = find("powerwall3").unwrap(); // 13.5 kWh @ 0.89
        let b = find("enphase-5p").unwrap(); // 5.0 kWh @ 0.90
        let combined = combine_batteries(&[a.clone(), b.clone()]);

        let expected = (0.89 * 13.5 + 0.90 * 5.0) / 18.5;
        assert!((combined.round_trip_efficiency - expected).abs() < 1e-5);
    }

    #[test]
    fn combine_takes_most_conservative_warranty() {
        let a = find("powerwall3").unwrap(); // 10 yr / 4000
        let b = find("enphase-5p").unwrap(); // 15 yr / 6000
        let combined = combine_batteries(&[a, b]);

        assert_eq!(combined.warranty.years, 10);
        assert_eq!(combined.warranty.cycles, 4000);
    }

    #[test]
    fn catalog_entries_have_consistent_usable_capacity() {
        for spec in catalog() {
            assert!(spec.usable_kwh <= spec.nominal_kwh);
            assert!(spec.round_trip_efficiency > 0.0 && spec.round_trip_efficiency <= 1.0);
            assert!(spec.inverter_kw > 0.0);
        }
    }
}
