//! Offset-cap policy: how much of annual usage may be claimed as "free".
//!
//! An annual energy balance alone can show a 100%+ offset whenever
//! production exceeds usage, which is misleading: production is concentrated
//! in summer while usage is flatter, so winter months always draw real grid
//! power. The cap is a conservative reporting ceiling, not a simulation.

use serde::{Deserialize, Serialize};

/// One roof plane, for sites with several differently-oriented sections.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoofSection {
    /// Roof pitch in degrees from horizontal.
    pub pitch_deg: f32,
    /// Azimuth in degrees (180 = due south).
    pub azimuth_deg: f32,
}

/// Coefficients of the offset-cap derivation.
///
/// Every knob is policy, calibrated rather than derived; the defaults are
/// deliberately conservative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OffsetCapPolicy {
    /// Cap when production exactly matches usage. The base cap scales
    /// linearly with the production:usage ratio through this point.
    pub match_cap: f32,
    /// Lowest cap ever applied.
    pub floor: f32,
    /// Highest cap ever applied.
    pub ceiling: f32,
    /// Half-width of the ratio band treated as "production matches usage".
    pub match_band: f32,
    /// Cap relaxation for a steep, south-facing roof.
    pub orientation_bonus: f32,
    /// Cap relaxation when production clears usage by the bonus ratio.
    pub production_bonus: f32,
    /// Minimum pitch for the orientation bonus, in degrees.
    pub min_pitch_deg: f32,
    /// Azimuth of due south, in degrees.
    pub south_azimuth_deg: f32,
    /// Allowed deviation from due south for the orientation bonus.
    pub azimuth_tolerance_deg: f32,
    /// Production:usage ratio at which the production bonus applies.
    pub production_bonus_ratio: f32,
}

impl Default for OffsetCapPolicy {
    fn default() -> Self {
        Self {
            match_cap: 0.88,
            floor: 0.50,
            ceiling: 0.95,
            match_band: 0.10,
            orientation_bonus: 0.03,
            production_bonus: 0.02,
            min_pitch_deg: 25.0,
            south_azimuth_deg: 180.0,
            azimuth_tolerance_deg: 45.0,
            production_bonus_ratio: 1.10,
        }
    }
}

/// Derived cap and the flags explaining it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OffsetCap {
    /// Maximum fraction of annual usage claimable as free energy (0..1).
    pub cap_fraction: f32,
    /// Production is within the match band of usage.
    pub matches_usage: bool,
    /// The steep south-facing roof bonus applied.
    pub orientation_bonus: bool,
    /// The production-margin bonus applied.
    pub production_bonus: bool,
}

impl OffsetCap {
    /// Floor-valued cap with no bonuses, for degenerate inputs.
    fn neutral(policy: &OffsetCapPolicy) -> Self {
        Self {
            cap_fraction: policy.floor,
            matches_usage: false,
            orientation_bonus: false,
            production_bonus: false,
        }
    }
}

/// Derives the offset cap for a site.
///
/// The base cap is `match_cap` scaled by the production:usage ratio and
/// clamped to `[floor, ceiling]`; the linear base keeps the cap
/// non-decreasing in production. Orientation and production-margin bonuses
/// relax it further, still under the ceiling. `roof_sections` may qualify
/// the orientation bonus when the primary pitch/azimuth does not.
pub fn compute_solar_battery_offset_cap(
    usage_kwh: f32,
    production_kwh: f32,
    pitch_deg: f32,
    azimuth_deg: f32,
    roof_sections: &[RoofSection],
    policy: &OffsetCapPolicy,
) -> OffsetCap {
    if usage_kwh <= 0.0 || production_kwh <= 0.0 {
        return OffsetCap::neutral(policy);
    }

    let ratio = production_kwh / usage_kwh;
    let matches_usage = (ratio - 1.0).abs() <= policy.match_band;
    let base = (policy.match_cap * ratio).clamp(policy.floor, policy.ceiling);

    let south_facing = |p: f32, a: f32| {
        p >= policy.min_pitch_deg
            && (a - policy.south_azimuth_deg).abs() <= policy.azimuth_tolerance_deg
    };
    let orientation = south_facing(pitch_deg, azimuth_deg)
        || roof_sections
            .iter()
            .any(|s| south_facing(s.pitch_deg, s.azimuth_deg));
    let production = ratio >= policy.production_bonus_ratio;

    let mut cap = base;
    if orientation {
        cap += policy.orientation_bonus;
    }
    if production {
        cap += policy.production_bonus;
    }

    OffsetCap {
        cap_fraction: cap.clamp(policy.floor, policy.ceiling),
        matches_usage,
        orientation_bonus: orientation,
        production_bonus: production,
    }
}
