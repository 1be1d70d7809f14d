//! Battery-only peak shaving: discharge into expensive periods, charge cheap.

use serde::Serialize;

use crate::model::{BatterySpec, RatePeriod, RatePlan, UsageDistribution};

use super::dispatch::DispatchPolicy;
use super::periods::{PeriodCosts, PeriodValues};

/// Grid energy still purchased after the battery is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LeftoverEnergy {
    /// Total remaining grid purchase in kWh.
    pub total_kwh: f32,
    /// Cheapest available rate in cents/kWh.
    pub rate_cents_per_kwh: f32,
    /// What the leftover would cost if all of it landed at the cheapest
    /// rate, in dollars.
    pub cost_at_cheap_rate: f32,
    /// Billed leftover cost as a percentage of the original bill.
    pub cost_percent: f32,
    /// Billed allocation per period after the cheap-hour shift.
    pub breakdown: PeriodValues,
}

/// Result of the battery-only calculator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimplePeakShavingResult {
    /// Annual usage split by the distribution, in kWh per period.
    pub usage_by_period: PeriodValues,
    /// Bill at plan rates before the battery.
    pub original_cost: PeriodCosts,
    /// kWh shifted out of each period by battery discharge.
    pub battery_offsets: PeriodValues,
    /// Usage remaining per period after battery discharge.
    pub usage_after_battery: PeriodValues,
    /// Bill after the battery, including its charging energy.
    pub new_cost: PeriodCosts,
    /// Remaining grid purchase detail.
    pub leftover_energy: LeftoverEnergy,
    /// `original_cost.total - new_cost.total`, in dollars.
    pub annual_savings: f32,
    /// Savings as a percentage of the original bill.
    pub savings_percent: f32,
    /// Battery cycles per year implied by the dispatched volume.
    pub effective_cycles: f32,
}

/// Periods ordered by descending plan rate.
pub(super) fn periods_by_rate_desc(plan: &RatePlan) -> [RatePeriod; 4] {
    let mut order = RatePeriod::ALL;
    order.sort_by(|&a, &b| {
        plan.rate_cents(b)
            .partial_cmp(&plan.rate_cents(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order
}

/// Greedy battery dispatch: fills the most expensive periods first, never
/// discharging into the charge-source period. Returns per-period offsets.
pub(super) fn dispatch_battery(
    deliverable_kwh: f32,
    load: &PeriodValues,
    plan: &RatePlan,
    cheapest: RatePeriod,
) -> PeriodValues {
    let cheap_rate = plan.rate_cents(cheapest);
    let mut offsets = PeriodValues::default();
    let mut remaining = deliverable_kwh.max(0.0);
    for period in periods_by_rate_desc(plan) {
        if remaining <= 0.0 {
            break;
        }
        if plan.rate_cents(period) <= cheap_rate {
            continue;
        }
        let take = remaining.min(load.get(period).max(0.0));
        offsets.set(period, take);
        remaining -= take;
    }
    offsets
}

/// Shifts leftover grid draw into the cheapest period where load-timing is
/// feasible: room is the period's original usage plus a buffer fraction of
/// annual usage. Moves energy out of the most expensive periods first.
pub(super) fn cheap_shift(
    leftover: &PeriodValues,
    usage_by_period: &PeriodValues,
    annual_usage_kwh: f32,
    plan: &RatePlan,
    cheapest: RatePeriod,
    policy: &DispatchPolicy,
) -> PeriodValues {
    let mut shifted = *leftover;
    let cap = usage_by_period.get(cheapest) + policy.cheap_shift_buffer_fraction * annual_usage_kwh;
    let mut room = (cap - shifted.get(cheapest)).max(0.0);
    for period in periods_by_rate_desc(plan) {
        if room <= 0.0 {
            break;
        }
        if period == cheapest {
            continue;
        }
        let movable = shifted.get(period).min(room);
        if movable <= 0.0 {
            continue;
        }
        shifted.add(period, -movable);
        shifted.add(cheapest, movable);
        room -= movable;
    }
    shifted
}

/// Estimates annual savings from a battery alone under a rate plan.
///
/// Usage is split into period buckets by the distribution; the battery's
/// annual dispatch volume discharges into the most expensive periods first
/// and is recharged at the cheapest available rate (adjusted for round-trip
/// losses). Remaining draw is billed after a bounded shift into cheap hours.
///
/// Degenerate inputs (zero usage, zero-capacity battery) return zeroed
/// results rather than failing.
pub fn calculate_simple_peak_shaving(
    annual_usage_kwh: f32,
    battery: &BatterySpec,
    plan: &RatePlan,
    distribution: &UsageDistribution,
    policy: &DispatchPolicy,
) -> SimplePeakShavingResult {
    let usage = annual_usage_kwh.max(0.0);

    let mut usage_by_period = PeriodValues::default();
    for &period in RatePeriod::ALL.iter() {
        usage_by_period.set(period, usage * distribution.share(period).max(0.0));
    }
    let original_cost = PeriodCosts::price(&usage_by_period, |p| plan.rate_dollars(p));

    let cheapest = plan.cheapest_period(&distribution.referenced_periods());
    let cheap_rate_dollars = plan.rate_dollars(cheapest);

    let annual_dispatch = policy.annual_dispatch_kwh(battery.usable_kwh, battery.inverter_kw);
    let battery_offsets = dispatch_battery(annual_dispatch, &usage_by_period, plan, cheapest);
    let discharged = battery_offsets.total();
    let usage_after_battery = usage_by_period.minus(&battery_offsets);

    // Recharge energy bought at the cheapest rate, grossed up for losses
    let charge_kwh = if battery.round_trip_efficiency > 0.0 {
        discharged / battery.round_trip_efficiency
    } else {
        discharged
    };
    let charge_cost = charge_kwh * cheap_rate_dollars;

    let breakdown = cheap_shift(
        &usage_after_battery,
        &usage_by_period,
        usage,
        plan,
        cheapest,
        policy,
    );
    let leftover_cost = PeriodCosts::price(&breakdown, |p| plan.rate_dollars(p));

    let mut new_cost = leftover_cost;
    new_cost.by_period.add(cheapest, charge_cost);
    new_cost.total += charge_cost;

    let annual_savings = original_cost.total - new_cost.total;
    let savings_percent = if original_cost.total > 0.0 {
        annual_savings / original_cost.total * 100.0
    } else {
        0.0
    };
    let effective_cycles = if battery.usable_kwh > 0.0 {
        discharged / battery.usable_kwh
    } else {
        0.0
    };

    let leftover_total = usage_after_battery.total();
    let leftover_energy = LeftoverEnergy {
        total_kwh: leftover_total,
        rate_cents_per_kwh: plan.rate_cents(cheapest),
        cost_at_cheap_rate: leftover_total * cheap_rate_dollars,
        cost_percent: if original_cost.total > 0.0 {
            leftover_cost.total / original_cost.total * 100.0
        } else {
            0.0
        },
        breakdown,
    };

    SimplePeakShavingResult {
        usage_by_period,
        original_cost,
        battery_offsets,
        usage_after_battery,
        new_cost,
        leftover_energy,
        annual_savings,
        savings_percent,
        effective_cycles,
    }
}
