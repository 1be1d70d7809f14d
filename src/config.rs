//! TOML-based estimate scenario configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::{DispatchPolicy, OffsetCapPolicy, ProjectionParams};
use crate::engine::offset_cap::RoofSection;
use crate::model::{BatterySpec, RatePlan, UsageDistribution, battery, combine_batteries};

/// Top-level estimate scenario parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Site usage, production, and roof geometry.
    pub site: SiteConfig,
    /// Usage split across rate periods.
    pub distribution: UsageDistribution,
    /// Rate plan selection.
    pub plan: PlanConfig,
    /// Battery selection from the catalog.
    pub batteries: BatteriesConfig,
    /// Controller behavior flags.
    pub control: ControlConfig,
    /// System cost after rebates.
    pub financial: FinancialConfig,
    /// Projection horizon and compounding assumptions.
    pub projection: ProjectionParams,
    /// Offset-cap policy coefficients.
    pub cap: OffsetCapPolicy,
    /// Dispatch assumptions.
    pub dispatch: DispatchPolicy,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self::baseline()
    }
}

/// Site usage, production, and roof geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Annual household usage in kWh.
    pub annual_usage_kwh: f32,
    /// Estimated annual solar production in kWh.
    pub solar_production_kwh: f32,
    /// Primary roof pitch in degrees.
    pub pitch_deg: f32,
    /// Primary roof azimuth in degrees (180 = due south).
    pub azimuth_deg: f32,
    /// Additional roof planes, if any.
    pub sections: Vec<RoofSection>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            annual_usage_kwh: 14_000.0,
            solar_production_kwh: 8_000.0,
            pitch_deg: 30.0,
            azimuth_deg: 180.0,
            sections: Vec::new(),
        }
    }
}

/// Rate plan selection: a built-in name, with the flat rate configurable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlanConfig {
    /// Built-in plan name: `"tou"`, `"ulo"`, or `"flat"`.
    pub name: String,
    /// Rate used when `name` is `"flat"`, in cents/kWh.
    pub flat_rate_cents: f32,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            name: "tou".to_string(),
            flat_rate_cents: 9.8,
        }
    }
}

impl PlanConfig {
    /// Resolves the configured plan, if the name is known.
    pub fn to_plan(&self) -> Option<RatePlan> {
        if self.name == "flat" {
            Some(RatePlan::flat(self.flat_rate_cents))
        } else {
            RatePlan::builtin(&self.name)
        }
    }
}

/// Battery selection from the built-in catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteriesConfig {
    /// Catalog ids; an empty list means solar-only.
    pub ids: Vec<String>,
}

impl Default for BatteriesConfig {
    fn default() -> Self {
        Self {
            ids: vec!["powerwall3".to_string()],
        }
    }
}

impl BatteriesConfig {
    /// Resolves and combines the selection.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming the first unknown id.
    pub fn to_battery(&self) -> Result<BatterySpec, ConfigError> {
        let mut specs = Vec::with_capacity(self.ids.len());
        for id in &self.ids {
            let spec = battery::find(id).ok_or_else(|| ConfigError {
                field: "batteries.ids".to_string(),
                message: format!(
                    "unknown battery \"{id}\", available: {}",
                    battery::catalog()
                        .iter()
                        .map(|b| b.id.clone())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })?;
            specs.push(spec);
        }
        Ok(combine_batteries(&specs))
    }
}

/// Controller behavior flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlConfig {
    /// Allow the battery to top up from the grid at the cheapest rate.
    pub ai_mode: bool,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self { ai_mode: true }
    }
}

/// System cost after rebates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FinancialConfig {
    /// Net installed cost in dollars.
    pub net_cost_dollars: f32,
}

impl Default for FinancialConfig {
    fn default() -> Self {
        Self {
            net_cost_dollars: 28_000.0,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"site.annual_usage_kwh"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: TOU plan, one Powerwall 3, grid
    /// charging enabled.
    pub fn baseline() -> Self {
        Self {
            site: SiteConfig::default(),
            distribution: UsageDistribution::default(),
            plan: PlanConfig::default(),
            batteries: BatteriesConfig::default(),
            control: ControlConfig::default(),
            financial: FinancialConfig::default(),
            projection: ProjectionParams::default(),
            cap: OffsetCapPolicy::default(),
            dispatch: DispatchPolicy::default(),
        }
    }

    /// Returns the ULO-arbitrage preset: overnight-shifted household on the
    /// ultra-low-overnight plan with a larger battery bank.
    pub fn ulo_arbitrage() -> Self {
        Self {
            site: SiteConfig {
                annual_usage_kwh: 20_000.0,
                solar_production_kwh: 9_000.0,
                ..SiteConfig::default()
            },
            distribution: UsageDistribution::ulo_shifted(),
            plan: PlanConfig {
                name: "ulo".to_string(),
                ..PlanConfig::default()
            },
            batteries: BatteriesConfig {
                ids: vec!["powerwall3".to_string(), "powerwall3".to_string()],
            },
            financial: FinancialConfig {
                net_cost_dollars: 42_000.0,
            },
            ..Self::baseline()
        }
    }

    /// Returns the Alberta preset: flat energy rate, no grid-charge
    /// arbitrage.
    pub fn alberta() -> Self {
        Self {
            plan: PlanConfig {
                name: "flat".to_string(),
                flat_rate_cents: 12.0,
            },
            control: ControlConfig { ai_mode: false },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "ulo_arbitrage", "alberta"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "ulo_arbitrage" => Ok(Self::ulo_arbitrage()),
            "alberta" => Ok(Self::alberta()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is
    /// invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown
    /// fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid. Soft issues
    /// (a distribution that does not sum to 100%) are reported by
    /// [`ScenarioConfig::warnings`] instead.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.site.annual_usage_kwh <= 0.0 {
            errors.push(ConfigError {
                field: "site.annual_usage_kwh".into(),
                message: "must be > 0".into(),
            });
        }
        if self.site.solar_production_kwh < 0.0 {
            errors.push(ConfigError {
                field: "site.solar_production_kwh".into(),
                message: "must be >= 0".into(),
            });
        }
        if self.plan.to_plan().is_none() {
            errors.push(ConfigError {
                field: "plan.name".into(),
                message: format!(
                    "unknown plan \"{}\", available: {}",
                    self.plan.name,
                    RatePlan::BUILTIN.join(", ")
                ),
            });
        }
        if self.plan.flat_rate_cents < 0.0 {
            errors.push(ConfigError {
                field: "plan.flat_rate_cents".into(),
                message: "must be >= 0".into(),
            });
        }
        if let Err(e) = self.batteries.to_battery() {
            errors.push(e);
        }
        if self.financial.net_cost_dollars < 0.0 {
            errors.push(ConfigError {
                field: "financial.net_cost_dollars".into(),
                message: "must be >= 0".into(),
            });
        }
        if self.projection.horizon_years == 0 {
            errors.push(ConfigError {
                field: "projection.horizon_years".into(),
                message: "must be > 0".into(),
            });
        }
        if self.projection.escalation_rate < 0.0 {
            errors.push(ConfigError {
                field: "projection.escalation_rate".into(),
                message: "must be >= 0".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.projection.degradation_rate) {
            errors.push(ConfigError {
                field: "projection.degradation_rate".into(),
                message: "must be within 0.0–1.0".into(),
            });
        }
        if self.cap.floor > self.cap.ceiling {
            errors.push(ConfigError {
                field: "cap.floor".into(),
                message: "must not exceed cap.ceiling".into(),
            });
        }
        for (field, value) in [
            ("cap.floor", self.cap.floor),
            ("cap.ceiling", self.cap.ceiling),
            ("cap.match_cap", self.cap.match_cap),
        ] {
            if !(0.0..=1.0).contains(&value) {
                errors.push(ConfigError {
                    field: field.into(),
                    message: "must be within 0.0–1.0".into(),
                });
            }
        }
        if self.dispatch.discharge_window_hours <= 0.0 {
            errors.push(ConfigError {
                field: "dispatch.discharge_window_hours".into(),
                message: "must be > 0".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.dispatch.solar_direct_cap_fraction) {
            errors.push(ConfigError {
                field: "dispatch.solar_direct_cap_fraction".into(),
                message: "must be within 0.0–1.0".into(),
            });
        }

        errors
    }

    /// Soft issues worth surfacing without rejecting the scenario.
    pub fn warnings(&self) -> Vec<ConfigError> {
        let mut warnings = Vec::new();
        if !self.distribution.is_balanced() {
            warnings.push(ConfigError {
                field: "distribution".into(),
                message: format!(
                    "period percentages sum to {:.1}%, not 100%; results use the values as given",
                    self.distribution.total_percent()
                ),
            });
        }
        warnings
    }
}
