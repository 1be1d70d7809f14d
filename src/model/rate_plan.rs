//! Utility rate plans: named pricing schemes over time-of-day rate periods.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A time-of-day pricing period on a utility rate plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RatePeriod {
    /// Most expensive weekday window.
    OnPeak,
    /// Shoulder window between peak and off-peak.
    MidPeak,
    /// Evening/weekend window.
    OffPeak,
    /// Overnight window on ultra-low-overnight plans.
    UltraLow,
}

impl RatePeriod {
    /// All periods, ordered from most to least expensive under typical plans.
    pub const ALL: [RatePeriod; 4] = [
        RatePeriod::OnPeak,
        RatePeriod::MidPeak,
        RatePeriod::OffPeak,
        RatePeriod::UltraLow,
    ];

    /// Human-readable label for reports and CSV headers.
    pub fn label(self) -> &'static str {
        match self {
            RatePeriod::OnPeak => "on-peak",
            RatePeriod::MidPeak => "mid-peak",
            RatePeriod::OffPeak => "off-peak",
            RatePeriod::UltraLow => "ultra-low",
        }
    }

    /// Fallback rate in cents/kWh used when a plan carries no entry for
    /// this period but a distribution references it.
    pub fn default_rate_cents(self) -> f32 {
        match self {
            RatePeriod::OnPeak => 20.3,
            RatePeriod::MidPeak => 15.7,
            RatePeriod::OffPeak => 9.8,
            RatePeriod::UltraLow => 3.9,
        }
    }
}

impl fmt::Display for RatePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One priced period entry on a rate plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodRate {
    /// Period this rate applies to.
    pub period: RatePeriod,
    /// Energy charge in cents per kWh.
    pub rate_cents: f32,
}

/// A named electricity pricing scheme.
///
/// Holds an ordered list of period rates plus a weekend override rate.
/// Periods referenced by a usage distribution but absent from the list
/// fall back to [`RatePeriod::default_rate_cents`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatePlan {
    /// Plan name shown in reports (e.g. `"tou"`, `"ulo"`).
    pub name: String,
    /// Ordered period/rate entries.
    pub rates: Vec<PeriodRate>,
    /// Rate applied on weekends, in cents per kWh.
    pub weekend_rate_cents: f32,
}

impl RatePlan {
    /// Standard Time-of-Use plan with the default residential rates.
    pub fn time_of_use() -> Self {
        Self {
            name: "tou".to_string(),
            rates: vec![
                PeriodRate {
                    period: RatePeriod::OnPeak,
                    rate_cents: 20.3,
                },
                PeriodRate {
                    period: RatePeriod::MidPeak,
                    rate_cents: 15.7,
                },
                PeriodRate {
                    period: RatePeriod::OffPeak,
                    rate_cents: 9.8,
                },
            ],
            weekend_rate_cents: 9.8,
        }
    }

    /// Ultra-Low-Overnight plan: cheap overnight window, steep on-peak.
    ///
    /// Mid-peak and off-peak fall back to the default rates when a
    /// distribution references them.
    pub fn ultra_low_overnight() -> Self {
        Self {
            name: "ulo".to_string(),
            rates: vec![
                PeriodRate {
                    period: RatePeriod::OnPeak,
                    rate_cents: 39.1,
                },
                PeriodRate {
                    period: RatePeriod::UltraLow,
                    rate_cents: 3.9,
                },
            ],
            weekend_rate_cents: 9.8,
        }
    }

    /// Flat-rate plan: every period priced identically (no TOU billing).
    pub fn flat(rate_cents: f32) -> Self {
        Self {
            name: "flat".to_string(),
            rates: RatePeriod::ALL
                .iter()
                .map(|&period| PeriodRate { period, rate_cents })
                .collect(),
            weekend_rate_cents: rate_cents,
        }
    }

    /// Looks up a named built-in plan.
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "tou" => Some(Self::time_of_use()),
            "ulo" => Some(Self::ultra_low_overnight()),
            "flat" => Some(Self::flat(RatePeriod::OffPeak.default_rate_cents())),
            _ => None,
        }
    }

    /// Names of the built-in plans.
    pub const BUILTIN: &[&str] = &["tou", "ulo", "flat"];

    /// Energy charge for `period` in cents/kWh, falling back to the
    /// period default when the plan has no entry.
    pub fn rate_cents(&self, period: RatePeriod) -> f32 {
        self.rates
            .iter()
            .find(|r| r.period == period)
            .map_or_else(|| period.default_rate_cents(), |r| r.rate_cents)
    }

    /// Energy charge for `period` in dollars/kWh.
    pub fn rate_dollars(&self, period: RatePeriod) -> f32 {
        self.rate_cents(period) / 100.0
    }

    /// Cheapest period among those the plan prices or `referenced` names.
    ///
    /// The union matters: an ULO household may put 0% of native load in the
    /// overnight window yet still charge a battery there.
    pub fn cheapest_period(&self, referenced: &[RatePeriod]) -> RatePeriod {
        let mut best = None::<(RatePeriod, f32)>;
        for &period in RatePeriod::ALL.iter() {
            let priced = self.rates.iter().any(|r| r.period == period);
            if !priced && !referenced.contains(&period) {
                continue;
            }
            let rate = self.rate_cents(period);
            match best {
                Some((_, best_rate)) if best_rate <= rate => {}
                _ => best = Some((period, rate)),
            }
        }
        best.map_or(RatePeriod::OffPeak, |(period, _)| period)
    }
}
