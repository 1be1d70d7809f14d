//! Combined solar + battery allocation: solar-direct, solar-charged battery,
//! grid-charged battery (arbitrage), and remaining grid purchase.

use serde::Serialize;

use crate::model::{BatterySpec, RatePeriod, RatePlan, UsageDistribution};

use super::battery_only::dispatch_battery;
use super::dispatch::DispatchPolicy;
use super::periods::{PeriodCosts, PeriodValues};
use super::scale::scale_to_cap;

/// Convergence threshold for the solar allocation waterfall, in kWh.
const ALLOC_EPSILON: f32 = 1e-4;

/// Inputs to the combined calculators.
#[derive(Debug, Clone, Copy)]
pub struct CombinedInputs<'a> {
    /// Annual household usage in kWh.
    pub annual_usage_kwh: f32,
    /// Annual solar production in kWh.
    pub solar_production_kwh: f32,
    /// Combined battery selection.
    pub battery: &'a BatterySpec,
    /// Utility rate plan.
    pub plan: &'a RatePlan,
    /// Usage split across rate periods.
    pub distribution: &'a UsageDistribution,
    /// Reporting ceiling on the claimed free-energy fraction (0..1).
    pub offset_cap_fraction: f32,
    /// Whether the battery may top up from the grid at the cheapest rate.
    pub ai_mode: bool,
}

/// Per-period allocation maps of the combined model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CombinedBreakdown {
    /// Annual usage split by the distribution.
    pub original_usage: PeriodValues,
    /// Solar served directly into each period.
    pub solar_allocation: PeriodValues,
    /// Usage remaining after solar-direct.
    pub usage_after_solar: PeriodValues,
    /// kWh displaced by battery discharge per period.
    pub battery_offsets: PeriodValues,
    /// Usage remaining after solar and battery.
    pub usage_after_battery: PeriodValues,
    /// Ceiling on solar-direct energy: `min(usage * cap_fraction, production)`.
    pub solar_cap_kwh: f32,
}

/// Dollar-denominated result of the combined calculator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedSavingsResult {
    /// Per-period allocation maps.
    pub breakdown: CombinedBreakdown,
    /// Bill at plan rates before solar and battery.
    pub original_cost: PeriodCosts,
    /// Bill per period after solar and battery, including charging energy
    /// bought from the grid (attributed to the cheapest period).
    pub new_cost: PeriodCosts,
    /// Original annual bill in dollars.
    pub baseline_annual_bill: f32,
    /// Annual bill after solar, battery, and the reporting cap.
    pub post_solar_battery_annual_bill: f32,
    /// Savings before the offset cap is applied.
    pub uncapped_annual_savings: f32,
    /// Savings after the offset cap, in dollars per year.
    pub combined_annual_savings: f32,
    /// `combined_annual_savings / 12`.
    pub monthly_savings: f32,
    /// Capped savings as a percentage of the original bill.
    pub savings_percent: f32,
    /// Savings from solar alone (no battery).
    pub solar_only_savings: f32,
    /// Battery's incremental contribution on top of solar, before capping.
    pub battery_on_top_savings: f32,
    /// Battery charge energy bought from the grid, in kWh delivered.
    pub batt_grid_charged_kwh: f32,
    /// Grid purchases per period, including battery charging energy.
    pub grid_kwh_by_bucket: PeriodValues,
    /// Whether the offset cap reduced the claimed savings.
    pub offset_capped: bool,
    /// Cap fraction that was applied.
    pub offset_cap_fraction: f32,
    /// Battery cycles per year implied by the dispatched volume.
    pub effective_cycles: f32,
    /// Effective rate before, in cents/kWh (bill over usage).
    pub blended_rate_before_cents: f32,
    /// Effective rate after, in cents/kWh.
    pub blended_rate_after_cents: f32,
}

/// Uncapped percentage split of annual usage across supply buckets.
///
/// The four fields close to 100% for any nonzero usage; drift is absorbed
/// into `grid_remaining`, which is computed as the remainder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OffsetPercentages {
    /// Share served directly by solar.
    pub solar_direct: f32,
    /// Share served by battery energy charged from solar excess.
    pub solar_charged_battery: f32,
    /// Share served by battery energy bought from the grid.
    pub grid_charged_battery: f32,
    /// Share still purchased from the grid at native period rates.
    pub grid_remaining: f32,
}

/// Percentage-view result used by display layers.
///
/// Percentages are uncapped at the source: display-time capping is applied
/// by callers so it is never applied twice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrdPeakShavingResult {
    /// Uncapped supply-bucket percentages.
    pub offset_percentages: OffsetPercentages,
    /// Grid purchases per period, including battery charging energy.
    pub grid_kwh_by_bucket: PeriodValues,
    /// Battery charge energy bought from the grid, in kWh delivered.
    pub batt_grid_charged_kwh: f32,
    /// Battery cycles per year implied by the dispatched volume.
    pub effective_cycles: f32,
}

/// Shared allocation pass behind both combined calculators.
struct Allocation {
    usage_by_period: PeriodValues,
    original_cost: PeriodCosts,
    cheapest: RatePeriod,
    solar_cap_kwh: f32,
    solar_allocation: PeriodValues,
    usage_after_solar: PeriodValues,
    battery_offsets: PeriodValues,
    usage_after_battery: PeriodValues,
    solar_direct_kwh: f32,
    solar_charged_kwh: f32,
    grid_charged_kwh: f32,
    grid_charge_purchase_kwh: f32,
    effective_cycles: f32,
}

/// Distributes `solar_cap_kwh` across periods proportionally to each
/// period's daytime-overlapping usage, never exceeding a period's usage.
/// Spill from saturated periods redistributes over the remaining room.
fn allocate_solar(
    solar_cap_kwh: f32,
    usage: &PeriodValues,
    policy: &DispatchPolicy,
) -> PeriodValues {
    let mut alloc = PeriodValues::default();
    let mut remaining = solar_cap_kwh.max(0.0);

    for _ in 0..RatePeriod::ALL.len() {
        if remaining <= ALLOC_EPSILON {
            break;
        }
        let weights: Vec<f32> = RatePeriod::ALL
            .iter()
            .map(|&p| {
                let room = usage.get(p) - alloc.get(p);
                if room > 0.0 {
                    usage.get(p) * policy.daytime_overlap.get(p).max(0.0)
                } else {
                    0.0
                }
            })
            .collect();
        let wsum: f32 = weights.iter().sum();
        if wsum <= 0.0 {
            break;
        }

        let mut placed = 0.0_f32;
        for (i, &period) in RatePeriod::ALL.iter().enumerate() {
            let room = (usage.get(period) - alloc.get(period)).max(0.0);
            if room <= 0.0 {
                continue;
            }
            let take = (remaining * weights[i] / wsum).min(room);
            alloc.add(period, take);
            placed += take;
        }
        remaining -= placed;
        if placed <= ALLOC_EPSILON {
            break;
        }
    }
    alloc
}

fn allocate(inputs: &CombinedInputs<'_>, policy: &DispatchPolicy) -> Allocation {
    let usage = inputs.annual_usage_kwh.max(0.0);
    let production = inputs.solar_production_kwh.max(0.0);
    let battery = inputs.battery;
    let plan = inputs.plan;

    let mut usage_by_period = PeriodValues::default();
    for &period in RatePeriod::ALL.iter() {
        usage_by_period.set(period, usage * inputs.distribution.share(period).max(0.0));
    }
    let original_cost = PeriodCosts::price(&usage_by_period, |p| plan.rate_dollars(p));
    let cheapest = plan.cheapest_period(&inputs.distribution.referenced_periods());
    let cheap_rate = plan.rate_cents(cheapest);

    // Solar serves daytime load first, up to the direct cap
    let solar_cap_kwh = (usage * policy.solar_direct_cap_fraction).min(production);
    let solar_allocation = allocate_solar(solar_cap_kwh, &usage_by_period, policy);
    let solar_direct_kwh = solar_allocation.total();
    let usage_after_solar = usage_by_period.minus(&solar_allocation);

    // Battery charges from solar excess, then (ai mode) from cheap grid.
    // Deliverable energy is bounded by the dispatch volume and by the load
    // actually sitting in periods priced above the charge rate.
    let annual_dispatch = policy.annual_dispatch_kwh(battery.usable_kwh, battery.inverter_kw);
    let expensive_room: f32 = RatePeriod::ALL
        .iter()
        .filter(|&&p| plan.rate_cents(p) > cheap_rate)
        .map(|&p| usage_after_solar.get(p))
        .sum();
    let rte = battery.round_trip_efficiency.max(0.0);
    let solar_excess = (production - solar_direct_kwh).max(0.0);
    let solar_charged_kwh = annual_dispatch
        .min(solar_excess * rte)
        .min(expensive_room)
        .max(0.0);
    let grid_charged_kwh = if inputs.ai_mode {
        (annual_dispatch - solar_charged_kwh)
            .min(expensive_room - solar_charged_kwh)
            .max(0.0)
    } else {
        0.0
    };
    let grid_charge_purchase_kwh = if rte > 0.0 {
        grid_charged_kwh / rte
    } else {
        grid_charged_kwh
    };

    let battery_offsets = dispatch_battery(
        solar_charged_kwh + grid_charged_kwh,
        &usage_after_solar,
        plan,
        cheapest,
    );
    let usage_after_battery = usage_after_solar.minus(&battery_offsets);

    let effective_cycles = if battery.usable_kwh > 0.0 {
        (solar_charged_kwh + grid_charged_kwh) / battery.usable_kwh
    } else {
        0.0
    };

    Allocation {
        usage_by_period,
        original_cost,
        cheapest,
        solar_cap_kwh,
        solar_allocation,
        usage_after_solar,
        battery_offsets,
        usage_after_battery,
        solar_direct_kwh,
        solar_charged_kwh,
        grid_charged_kwh,
        grid_charge_purchase_kwh,
        effective_cycles,
    }
}

/// Estimates annual savings from solar and battery together.
///
/// Solar direct consumption is capped at a daytime fraction of usage;
/// excess production charges the battery; with `ai_mode` the battery also
/// buys cheap grid energy to displace expensive-period draw. The claimed
/// free-energy fraction is then limited by `offset_cap_fraction`: the
/// solar-direct and solar-battery shares scale down ratio-preserved, and
/// the reduction is priced back in as cheap grid purchase, since capping
/// adjusts the claim rather than the physics.
pub fn calculate_solar_battery_combined(
    inputs: &CombinedInputs<'_>,
    policy: &DispatchPolicy,
) -> CombinedSavingsResult {
    let alloc = allocate(inputs, policy);
    let plan = inputs.plan;
    let cheap_dollars = plan.rate_dollars(alloc.cheapest);

    let baseline = alloc.original_cost.total;
    let remaining_cost = PeriodCosts::price(&alloc.usage_after_battery, |p| plan.rate_dollars(p));
    let post_uncapped = remaining_cost.total + alloc.grid_charge_purchase_kwh * cheap_dollars;
    let uncapped_savings = baseline - post_uncapped;

    let solar_only_cost = PeriodCosts::price(&alloc.usage_after_solar, |p| plan.rate_dollars(p));
    let solar_only_savings = baseline - solar_only_cost.total;
    let battery_on_top_savings = uncapped_savings - solar_only_savings;

    // Reporting cap on the free-energy claim
    let bucket_total = alloc.usage_by_period.total();
    let free_kwh = alloc.solar_direct_kwh + alloc.solar_charged_kwh;
    let cap_kwh = inputs.offset_cap_fraction.max(0.0) * bucket_total;
    let (combined_savings, capped) = if bucket_total > 0.0 && free_kwh > cap_kwh {
        let scaled = scale_to_cap(&[alloc.solar_direct_kwh, alloc.solar_charged_kwh], cap_kwh);
        let reduction = free_kwh - (scaled[0] + scaled[1]);
        (uncapped_savings - reduction * cheap_dollars, true)
    } else {
        (uncapped_savings, false)
    };
    let post_bill = baseline - combined_savings;
    let savings_percent = if baseline > 0.0 {
        combined_savings / baseline * 100.0
    } else {
        0.0
    };

    let mut new_cost = remaining_cost;
    new_cost
        .by_period
        .add(alloc.cheapest, alloc.grid_charge_purchase_kwh * cheap_dollars);
    new_cost.total += alloc.grid_charge_purchase_kwh * cheap_dollars;

    let mut grid_kwh_by_bucket = alloc.usage_after_battery;
    grid_kwh_by_bucket.add(alloc.cheapest, alloc.grid_charge_purchase_kwh);

    let blended_before = if bucket_total > 0.0 {
        baseline / bucket_total * 100.0
    } else {
        0.0
    };
    let blended_after = if bucket_total > 0.0 {
        post_bill / bucket_total * 100.0
    } else {
        0.0
    };

    CombinedSavingsResult {
        breakdown: CombinedBreakdown {
            original_usage: alloc.usage_by_period,
            solar_allocation: alloc.solar_allocation,
            usage_after_solar: alloc.usage_after_solar,
            battery_offsets: alloc.battery_offsets,
            usage_after_battery: alloc.usage_after_battery,
            solar_cap_kwh: alloc.solar_cap_kwh,
        },
        original_cost: alloc.original_cost,
        new_cost,
        baseline_annual_bill: baseline,
        post_solar_battery_annual_bill: post_bill,
        uncapped_annual_savings: uncapped_savings,
        combined_annual_savings: combined_savings,
        monthly_savings: combined_savings / 12.0,
        savings_percent,
        solar_only_savings,
        battery_on_top_savings,
        batt_grid_charged_kwh: alloc.grid_charged_kwh,
        grid_kwh_by_bucket,
        offset_capped: capped,
        offset_cap_fraction: inputs.offset_cap_fraction,
        effective_cycles: alloc.effective_cycles,
        blended_rate_before_cents: blended_before,
        blended_rate_after_cents: blended_after,
    }
}

/// Computes the uncapped supply-bucket percentages of the combined model.
///
/// Kept separate from [`calculate_solar_battery_combined`] because display
/// layers need both dollar figures and raw percentages at once, and the
/// cap must stay un-applied here so callers apply it exactly once.
pub fn calculate_frd_peak_shaving(
    inputs: &CombinedInputs<'_>,
    policy: &DispatchPolicy,
) -> FrdPeakShavingResult {
    let alloc = allocate(inputs, policy);
    let bucket_total = alloc.usage_by_period.total();

    let offset_percentages = if bucket_total > 0.0 {
        let solar_direct = alloc.solar_direct_kwh / bucket_total * 100.0;
        let solar_charged = alloc.solar_charged_kwh / bucket_total * 100.0;
        let grid_charged = alloc.grid_charged_kwh / bucket_total * 100.0;
        OffsetPercentages {
            solar_direct,
            solar_charged_battery: solar_charged,
            grid_charged_battery: grid_charged,
            // Remainder form absorbs float drift, keeping closure exact
            grid_remaining: 100.0 - solar_direct - solar_charged - grid_charged,
        }
    } else {
        OffsetPercentages {
            solar_direct: 0.0,
            solar_charged_battery: 0.0,
            grid_charged_battery: 0.0,
            grid_remaining: 0.0,
        }
    };

    let mut grid_kwh_by_bucket = alloc.usage_after_battery;
    grid_kwh_by_bucket.add(alloc.cheapest, alloc.grid_charge_purchase_kwh);

    FrdPeakShavingResult {
        offset_percentages,
        grid_kwh_by_bucket,
        batt_grid_charged_kwh: alloc.grid_charged_kwh,
        effective_cycles: alloc.effective_cycles,
    }
}
