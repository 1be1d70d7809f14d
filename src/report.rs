//! Estimate assembly and the text report rendered by the CLI.

use std::fmt;

use serde::Serialize;

use crate::config::{ConfigError, ScenarioConfig};
use crate::engine::combined::OffsetPercentages;
use crate::engine::{
    CombinedInputs, CombinedSavingsResult, FrdPeakShavingResult, MultiYearProjection, OffsetCap,
    ProjectionClamp, SimplePeakShavingResult, calculate_combined_multi_year,
    calculate_frd_peak_shaving, calculate_simple_peak_shaving, calculate_solar_battery_combined,
    compute_solar_battery_offset_cap, scale_to_cap,
};
use crate::model::{BatterySpec, RatePeriod};

/// Complete estimate for one scenario: engine results plus the inputs a
/// display layer needs to label them.
#[derive(Debug, Clone, Serialize)]
pub struct EstimateReport {
    /// Scenario the estimate was computed from.
    pub scenario: ScenarioConfig,
    /// Combined battery selection.
    pub battery: BatterySpec,
    /// Derived offset cap.
    pub offset_cap: OffsetCap,
    /// Dollar-denominated combined result.
    pub combined: CombinedSavingsResult,
    /// Uncapped percentage breakdown.
    pub frd: FrdPeakShavingResult,
    /// Display-capped percentage breakdown.
    pub capped_offsets: OffsetPercentages,
    /// Battery-only comparison estimate.
    pub battery_only: SimplePeakShavingResult,
    /// Multi-year projection of the combined savings.
    pub projection: MultiYearProjection,
}

/// Applies the offset cap to an uncapped percentage breakdown.
///
/// The solar-direct and solar-battery shares scale down ratio-preserved so
/// their sum stays at the cap; the reduction moves into `grid_remaining`,
/// keeping the four shares closed at 100%. This is the only place the cap
/// touches percentages, so it is never applied twice.
pub fn cap_offset_percentages(
    uncapped: &OffsetPercentages,
    cap_fraction: f32,
) -> OffsetPercentages {
    let cap_pct = cap_fraction.max(0.0) * 100.0;
    let free = uncapped.solar_direct + uncapped.solar_charged_battery;
    if free <= cap_pct {
        return *uncapped;
    }
    let scaled = scale_to_cap(
        &[uncapped.solar_direct, uncapped.solar_charged_battery],
        cap_pct,
    );
    OffsetPercentages {
        solar_direct: scaled[0],
        solar_charged_battery: scaled[1],
        grid_charged_battery: uncapped.grid_charged_battery,
        grid_remaining: 100.0 - scaled[0] - scaled[1] - uncapped.grid_charged_battery,
    }
}

impl EstimateReport {
    /// Runs the full estimate for a scenario.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` when the plan name or a battery id cannot
    /// be resolved. Numeric degeneracy is not an error: the engine returns
    /// zeroed results for it.
    pub fn from_scenario(cfg: &ScenarioConfig) -> Result<Self, ConfigError> {
        let plan = cfg.plan.to_plan().ok_or_else(|| ConfigError {
            field: "plan.name".to_string(),
            message: format!("unknown plan \"{}\"", cfg.plan.name),
        })?;
        let battery = cfg.batteries.to_battery()?;

        let offset_cap = compute_solar_battery_offset_cap(
            cfg.site.annual_usage_kwh,
            cfg.site.solar_production_kwh,
            cfg.site.pitch_deg,
            cfg.site.azimuth_deg,
            &cfg.site.sections,
            &cfg.cap,
        );

        let inputs = CombinedInputs {
            annual_usage_kwh: cfg.site.annual_usage_kwh,
            solar_production_kwh: cfg.site.solar_production_kwh,
            battery: &battery,
            plan: &plan,
            distribution: &cfg.distribution,
            offset_cap_fraction: offset_cap.cap_fraction,
            ai_mode: cfg.control.ai_mode,
        };

        let combined = calculate_solar_battery_combined(&inputs, &cfg.dispatch);
        let frd = calculate_frd_peak_shaving(&inputs, &cfg.dispatch);
        let capped_offsets = cap_offset_percentages(&frd.offset_percentages, offset_cap.cap_fraction);
        let battery_only = calculate_simple_peak_shaving(
            cfg.site.annual_usage_kwh,
            &battery,
            &plan,
            &cfg.distribution,
            &cfg.dispatch,
        );
        let projection = calculate_combined_multi_year(
            combined.combined_annual_savings,
            cfg.financial.net_cost_dollars,
            &cfg.projection,
            &ProjectionClamp {
                baseline_annual_bill: combined.baseline_annual_bill,
                offset_cap_fraction: offset_cap.cap_fraction,
            },
        );

        Ok(Self {
            scenario: cfg.clone(),
            battery,
            offset_cap,
            combined,
            frd,
            capped_offsets,
            battery_only,
            projection,
        })
    }
}

impl fmt::Display for EstimateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.combined.breakdown;
        writeln!(f, "--- Peak-Shaving Estimate ---")?;
        writeln!(
            f,
            "Plan: {}   Battery: {} {} ({:.1} kWh usable, {:.1} kW)",
            self.scenario.plan.name,
            self.battery.brand,
            self.battery.model,
            self.battery.usable_kwh,
            self.battery.inverter_kw
        )?;
        writeln!(
            f,
            "Annual usage: {:.0} kWh   Solar production: {:.0} kWh   Offset cap: {:.1}%",
            self.scenario.site.annual_usage_kwh,
            self.scenario.site.solar_production_kwh,
            self.offset_cap.cap_fraction * 100.0
        )?;
        writeln!(f)?;
        writeln!(
            f,
            "{:<10} {:>11} {:>11} {:>12} {:>10}",
            "period", "usage kWh", "solar kWh", "battery kWh", "grid kWh"
        )?;
        for &period in RatePeriod::ALL.iter() {
            if b.original_usage.get(period) <= 0.0 {
                continue;
            }
            writeln!(
                f,
                "{:<10} {:>11.0} {:>11.0} {:>12.0} {:>10.0}",
                period.label(),
                b.original_usage.get(period),
                b.solar_allocation.get(period),
                b.battery_offsets.get(period),
                b.usage_after_battery.get(period)
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "Baseline annual bill:     ${:.2}",
            self.combined.baseline_annual_bill
        )?;
        writeln!(
            f,
            "Post solar+battery bill:  ${:.2}",
            self.combined.post_solar_battery_annual_bill
        )?;
        write!(
            f,
            "Annual savings:           ${:.2}",
            self.combined.combined_annual_savings
        )?;
        if self.combined.offset_capped {
            write!(f, " (capped from ${:.2})", self.combined.uncapped_annual_savings)?;
        }
        writeln!(f)?;
        let p = &self.capped_offsets;
        writeln!(
            f,
            "Offset: solar {:.1}% + solar-battery {:.1}% + grid-battery {:.1}% + grid {:.1}%",
            p.solar_direct, p.solar_charged_battery, p.grid_charged_battery, p.grid_remaining
        )?;
        writeln!(
            f,
            "Battery-only savings:     ${:.2} ({:.0} cycles/yr)",
            self.battery_only.annual_savings, self.battery_only.effective_cycles
        )?;

        let payback = if self.projection.payback_years.is_finite() {
            format!("{:.1} years", self.projection.payback_years)
        } else {
            "not reached".to_string()
        };
        let roi = self
            .projection
            .annual_roi_percent
            .map_or_else(|| "N/A".to_string(), |r| format!("{r:.1}%/yr"));
        write!(
            f,
            "Payback: {payback}   {}-yr profit: ${:.2}   ROI: {roi}",
            self.scenario.projection.horizon_years, self.projection.net_profit
        )
    }
}
