//! Property sweeps over the allocation and projection engine.

mod common;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use peakshave::engine::{
    CombinedInputs, OffsetCapPolicy, ProjectionParams, calculate_frd_peak_shaving,
    calculate_simple_multi_year, calculate_solar_battery_combined,
    compute_solar_battery_offset_cap,
};
use peakshave::model::{BatterySpec, RatePeriod, UsageDistribution};

/// Seeded grid of (usage, production, ai_mode) samples.
fn sample_grid(seed: u64, count: usize) -> Vec<(f32, f32, bool)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            (
                rng.random_range(0.0..40_000.0_f32),
                rng.random_range(0.0..30_000.0_f32),
                rng.random_range(0..2) == 1,
            )
        })
        .collect()
}

#[test]
fn energy_is_conserved_per_period_across_inputs() {
    let battery = common::test_battery();
    let plans = [common::tou_plan(), common::ulo_plan()];
    let dist = common::default_distribution();
    let policy = common::default_policy();

    for plan in &plans {
        for &(usage, production, ai_mode) in &sample_grid(7, 50) {
            let inputs = CombinedInputs {
                annual_usage_kwh: usage,
                solar_production_kwh: production,
                battery: &battery,
                plan,
                distribution: &dist,
                offset_cap_fraction: 0.9,
                ai_mode,
            };
            let result = calculate_solar_battery_combined(&inputs, &policy);
            let b = &result.breakdown;
            for &period in RatePeriod::ALL.iter() {
                let original = b.original_usage.get(period);
                let sum = b.solar_allocation.get(period)
                    + b.battery_offsets.get(period)
                    + b.usage_after_battery.get(period);
                assert!(
                    (original - sum).abs() < original.max(1.0) * 1e-4,
                    "plan {} usage {usage} production {production} period {period}: \
                     {original} != {sum}",
                    plan.name
                );
            }
        }
    }
}

#[test]
fn percentages_close_to_one_hundred_across_inputs() {
    let battery = common::test_battery();
    let plan = common::ulo_plan();
    let dist = UsageDistribution::ulo_shifted();
    let policy = common::default_policy();

    for &(usage, production, ai_mode) in &sample_grid(11, 50) {
        if usage <= 0.0 {
            continue;
        }
        let inputs = CombinedInputs {
            annual_usage_kwh: usage,
            solar_production_kwh: production,
            battery: &battery,
            plan: &plan,
            distribution: &dist,
            offset_cap_fraction: 0.9,
            ai_mode,
        };
        let p = calculate_frd_peak_shaving(&inputs, &policy).offset_percentages;
        let sum =
            p.solar_direct + p.solar_charged_battery + p.grid_charged_battery + p.grid_remaining;
        assert!(
            (sum - 100.0).abs() < 0.1,
            "usage {usage} production {production}: sum {sum}"
        );
        for (name, value) in [
            ("solar_direct", p.solar_direct),
            ("solar_charged_battery", p.solar_charged_battery),
            ("grid_charged_battery", p.grid_charged_battery),
        ] {
            assert!(value >= 0.0, "{name} went negative: {value}");
        }
    }
}

#[test]
fn offset_cap_is_monotone_in_production() {
    let policy = OffsetCapPolicy::default();
    let mut rng = StdRng::seed_from_u64(23);

    for _ in 0..20 {
        let usage = rng.random_range(1_000.0..40_000.0_f32);
        let mut last = 0.0_f32;
        for step in 0..80 {
            let production = step as f32 * usage / 40.0;
            let cap = compute_solar_battery_offset_cap(usage, production, 30.0, 180.0, &[], &policy)
                .cap_fraction;
            assert!(
                cap >= last - 1e-6,
                "cap decreased at usage {usage} production {production}: {cap} < {last}"
            );
            last = cap;
        }
    }
}

#[test]
fn zero_battery_degenerates_to_solar_only() {
    let zero = BatterySpec::none();
    let plan = common::tou_plan();
    let dist = common::default_distribution();
    let policy = common::default_policy();

    for &(usage, production, ai_mode) in &sample_grid(31, 30) {
        let inputs = CombinedInputs {
            annual_usage_kwh: usage,
            solar_production_kwh: production,
            battery: &zero,
            plan: &plan,
            distribution: &dist,
            offset_cap_fraction: 0.9,
            ai_mode,
        };
        let result = calculate_solar_battery_combined(&inputs, &policy);

        assert_eq!(result.breakdown.battery_offsets.total(), 0.0);
        assert_eq!(result.batt_grid_charged_kwh, 0.0);
        assert_eq!(result.effective_cycles, 0.0);
        assert!(
            (result.uncapped_annual_savings - result.solar_only_savings).abs() < 1e-3,
            "usage {usage} production {production}"
        );
    }
}

#[test]
fn payback_is_monotone_in_cost_and_savings() {
    let params = ProjectionParams::default();
    let mut rng = StdRng::seed_from_u64(43);

    for _ in 0..30 {
        let savings = rng.random_range(100.0..3_000.0_f32);
        let cost = rng.random_range(1_000.0..60_000.0_f32);

        let base = calculate_simple_multi_year(savings, cost, &params);
        let pricier = calculate_simple_multi_year(savings, cost * 1.5, &params);
        let better = calculate_simple_multi_year(savings * 1.5, cost, &params);

        assert!(
            pricier.payback_years >= base.payback_years,
            "cost {cost} savings {savings}"
        );
        assert!(
            better.payback_years <= base.payback_years,
            "cost {cost} savings {savings}"
        );
    }
}

#[test]
fn identical_inputs_yield_bit_identical_outputs() {
    let battery = common::test_battery();
    let plan = common::tou_plan();
    let dist = common::default_distribution();
    let policy = common::default_policy();
    let inputs = CombinedInputs {
        annual_usage_kwh: 14_000.0,
        solar_production_kwh: 8_000.0,
        battery: &battery,
        plan: &plan,
        distribution: &dist,
        offset_cap_fraction: 0.9,
        ai_mode: true,
    };

    let a = calculate_solar_battery_combined(&inputs, &policy);
    let b = calculate_solar_battery_combined(&inputs, &policy);
    assert_eq!(a, b);

    let fa = calculate_frd_peak_shaving(&inputs, &policy);
    let fb = calculate_frd_peak_shaving(&inputs, &policy);
    assert_eq!(fa, fb);

    let pa = calculate_simple_multi_year(a.combined_annual_savings, 28_000.0, &ProjectionParams::default());
    let pb = calculate_simple_multi_year(b.combined_annual_savings, 28_000.0, &ProjectionParams::default());
    assert_eq!(pa, pb);
}

#[test]
fn no_result_field_is_nan_or_infinite_for_finite_inputs() {
    let battery = common::test_battery();
    let plan = common::tou_plan();
    let dist = common::default_distribution();
    let policy = common::default_policy();

    for &(usage, production, ai_mode) in &sample_grid(59, 40) {
        let inputs = CombinedInputs {
            annual_usage_kwh: usage,
            solar_production_kwh: production,
            battery: &battery,
            plan: &plan,
            distribution: &dist,
            offset_cap_fraction: 0.9,
            ai_mode,
        };
        let result = calculate_solar_battery_combined(&inputs, &policy);
        for value in [
            result.baseline_annual_bill,
            result.post_solar_battery_annual_bill,
            result.combined_annual_savings,
            result.uncapped_annual_savings,
            result.solar_only_savings,
            result.battery_on_top_savings,
            result.batt_grid_charged_kwh,
            result.effective_cycles,
            result.blended_rate_before_cents,
            result.blended_rate_after_cents,
        ] {
            assert!(
                value.is_finite(),
                "non-finite output for usage {usage} production {production}"
            );
        }
    }
}
