//! Allocation, offset-cap, and projection engine.
//!
//! Every function in this module is pure and synchronous: a deterministic
//! mapping from inputs to outputs with no I/O and no shared state. Degenerate
//! numeric input (zero usage, zero production, empty battery) produces
//! well-formed zeroed results, never a panic or a NaN.

pub mod battery_only;
pub mod combined;
pub mod dispatch;
pub mod offset_cap;
pub mod periods;
pub mod projection;
pub mod scale;

pub use battery_only::{SimplePeakShavingResult, calculate_simple_peak_shaving};
pub use combined::{
    CombinedInputs, CombinedSavingsResult, FrdPeakShavingResult, calculate_frd_peak_shaving,
    calculate_solar_battery_combined,
};
pub use dispatch::DispatchPolicy;
pub use offset_cap::{OffsetCap, OffsetCapPolicy, RoofSection, compute_solar_battery_offset_cap};
pub use periods::{PeriodCosts, PeriodValues};
pub use projection::{
    MultiYearProjection, ProjectionClamp, ProjectionParams, calculate_combined_multi_year,
    calculate_simple_multi_year,
};
pub use scale::scale_to_cap;
