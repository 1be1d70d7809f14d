//! API response types.
//!
//! The estimate response is the stable JSON contract consumed by display
//! layers; internal result structs map into it rather than serializing
//! directly, so engine refactors cannot silently change the wire shape.

use serde::Serialize;

use crate::engine::combined::{CombinedBreakdown, OffsetPercentages};
use crate::engine::{OffsetCap, PeriodValues};
use crate::report::EstimateReport;

/// Estimate response: dollar figures, percentage breakdown, projection
/// summary, and the allocation maps.
#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    /// Original annual bill in dollars.
    pub baseline_annual_bill: f32,
    /// Annual bill after solar, battery, and the reporting cap.
    pub post_solar_battery_annual_bill: f32,
    /// Savings after the offset cap, in dollars per year.
    pub annual_savings: f32,
    /// `annual_savings / 12`.
    pub monthly_savings: f32,
    /// Savings before the offset cap.
    pub uncapped_annual_savings: f32,
    /// Display-capped supply-bucket percentages.
    pub offset_percentages: OffsetPercentages,
    /// Uncapped supply-bucket percentages.
    pub offset_percentages_uncapped: OffsetPercentages,
    /// Derived offset cap and its flags.
    pub offset_cap: OffsetCap,
    /// Per-period allocation maps.
    pub breakdown: CombinedBreakdown,
    /// Grid purchases per period, including battery charging energy.
    pub grid_kwh_by_bucket: PeriodValues,
    /// Battery charge energy bought from the grid, in kWh delivered.
    pub batt_grid_charged_kwh: f32,
    /// Battery cycles per year implied by the dispatched volume.
    pub effective_cycles: f32,
    /// Years until cumulative savings reach the net cost; `null` when not
    /// reached within the horizon.
    pub payback_years: Option<f32>,
    /// Total savings over the horizon, in dollars.
    pub total_savings: f32,
    /// Total savings minus net cost, in dollars.
    pub net_profit: f32,
    /// Simple annualized return in percent; `null` when net cost is zero.
    pub annual_roi_percent: Option<f32>,
}

impl From<&EstimateReport> for EstimateResponse {
    fn from(report: &EstimateReport) -> Self {
        Self {
            baseline_annual_bill: report.combined.baseline_annual_bill,
            post_solar_battery_annual_bill: report.combined.post_solar_battery_annual_bill,
            annual_savings: report.combined.combined_annual_savings,
            monthly_savings: report.combined.monthly_savings,
            uncapped_annual_savings: report.combined.uncapped_annual_savings,
            offset_percentages: report.capped_offsets,
            offset_percentages_uncapped: report.frd.offset_percentages,
            offset_cap: report.offset_cap,
            breakdown: report.combined.breakdown,
            grid_kwh_by_bucket: report.combined.grid_kwh_by_bucket,
            batt_grid_charged_kwh: report.combined.batt_grid_charged_kwh,
            effective_cycles: report.combined.effective_cycles,
            payback_years: if report.projection.payback_years.is_finite() {
                Some(report.projection.payback_years)
            } else {
                None
            },
            total_savings: report.projection.total_savings,
            net_profit: report.projection.net_profit,
            annual_roi_percent: report.projection.annual_roi_percent,
        }
    }
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error messages, one per failed constraint.
    pub errors: Vec<String>,
}
