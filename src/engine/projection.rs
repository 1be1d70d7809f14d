//! Multi-year savings projection: escalation, degradation, payback, ROI.

use serde::{Deserialize, Serialize};

/// Projection horizon and compounding assumptions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectionParams {
    /// Annual utility rate escalation (fraction, e.g. 0.05).
    pub escalation_rate: f32,
    /// Annual equipment output degradation (fraction, e.g. 0.005).
    pub degradation_rate: f32,
    /// Projection horizon in years.
    pub horizon_years: u32,
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self {
            escalation_rate: 0.05,
            degradation_rate: 0.005,
            horizon_years: 25,
        }
    }
}

/// Yearly ceiling inputs for the combined projection.
///
/// Escalation compounding alone would eventually imply savings larger than
/// the physically-capped offset allows; each year's savings are re-clamped
/// to the escalated bill times the cap fraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectionClamp {
    /// First-year annual bill before solar and battery, in dollars.
    pub baseline_annual_bill: f32,
    /// Offset cap fraction applied to the estimate (0..1).
    pub offset_cap_fraction: f32,
}

/// One projected year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearProjection {
    /// Year number, 1-based.
    pub year: u32,
    /// Savings earned in this year, in dollars.
    pub annual_savings: f32,
    /// Savings accumulated through this year, in dollars.
    pub cumulative_savings: f32,
}

/// Full projection with summary scalars.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiYearProjection {
    /// Year-by-year savings rows.
    pub years: Vec<YearProjection>,
    /// Years until cumulative savings reach the net cost, interpolated
    /// between years; `f32::INFINITY` when never reached in the horizon.
    pub payback_years: f32,
    /// Total savings over the horizon, in dollars.
    pub total_savings: f32,
    /// `total_savings - net_cost`, in dollars.
    pub net_profit: f32,
    /// Simple annualized return on the net cost, in percent; `None` when
    /// the net cost is not positive.
    pub annual_roi_percent: Option<f32>,
}

fn project(
    first_year_savings: f32,
    net_cost: f32,
    params: &ProjectionParams,
    clamp: Option<&ProjectionClamp>,
) -> MultiYearProjection {
    let mut years = Vec::with_capacity(params.horizon_years as usize);
    let mut cumulative = 0.0_f32;
    let mut payback = if net_cost <= 0.0 { 0.0 } else { f32::INFINITY };

    for n in 1..=params.horizon_years {
        let factor = (1.0 + params.escalation_rate).powi(n as i32 - 1)
            * (1.0 - params.degradation_rate).powi(n as i32 - 1);
        let mut savings = first_year_savings * factor;
        if let Some(c) = clamp {
            let year_bill =
                c.baseline_annual_bill * (1.0 + params.escalation_rate).powi(n as i32 - 1);
            let ceiling = year_bill * c.offset_cap_fraction.max(0.0);
            savings = savings.min(ceiling);
        }

        let previous = cumulative;
        cumulative += savings;
        if payback.is_infinite() && cumulative >= net_cost && savings > 0.0 {
            payback = (n - 1) as f32 + (net_cost - previous) / savings;
        }

        years.push(YearProjection {
            year: n,
            annual_savings: savings,
            cumulative_savings: cumulative,
        });
    }

    let total_savings = cumulative;
    let net_profit = total_savings - net_cost;
    let annual_roi_percent = if net_cost > 0.0 && params.horizon_years > 0 {
        Some(net_profit / net_cost / params.horizon_years as f32 * 100.0)
    } else {
        None
    };

    MultiYearProjection {
        years,
        payback_years: payback,
        total_savings,
        net_profit,
        annual_roi_percent,
    }
}

/// Projects battery-only savings over the horizon.
pub fn calculate_simple_multi_year(
    first_year_savings: f32,
    net_cost: f32,
    params: &ProjectionParams,
) -> MultiYearProjection {
    project(first_year_savings, net_cost, params, None)
}

/// Projects combined solar + battery savings over the horizon, with each
/// year's savings clamped to the escalated bill times the offset cap.
pub fn calculate_combined_multi_year(
    first_year_savings: f32,
    net_cost: f32,
    params: &ProjectionParams,
    clamp: &ProjectionClamp,
) -> MultiYearProjection {
    project(first_year_savings, net_cost, params, Some(clamp))
}
