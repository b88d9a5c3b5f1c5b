//! TOML-based case configuration and preset definitions.
//!
//! A case bundles a plant roster, the scenarios to clear against it and the
//! switching-price constants. Availabilities are written as percentages in
//! case files and converted to fractions by [`CaseConfig::build`].

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::error::ValidationError;
use crate::market::switching::SwitchingConfig;
use crate::market::types::{Plant, PlantRoster, Scenario, Technology, TechnologyDefaults};

/// Top-level case configuration parsed from TOML.
///
/// Load from TOML with [`CaseConfig::from_toml_file`] or use a built-in
/// preset via [`CaseConfig::from_preset`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaseConfig {
    /// Reference constants for the switching-price calculation.
    #[serde(default)]
    pub switching: SwitchingConfig,
    /// Plant roster in merit-order tie-break order.
    #[serde(default)]
    pub plants: Vec<PlantConfig>,
    /// Scenarios to clear.
    #[serde(default)]
    pub scenarios: Vec<ScenarioConfig>,
}

/// One `[[plants]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlantConfig {
    /// Unique plant identifier.
    pub name: String,
    /// Technology label, e.g. `"Gas Peaker"`.
    pub technology: Technology,
    /// Nameplate capacity (MW).
    pub capacity_mw: f64,
    /// Fuel cost (€/MWh_thermal).
    pub fuel_cost_eur_mwh: f64,
    /// Thermal efficiency; technology default when omitted.
    #[serde(default)]
    pub efficiency: Option<f64>,
    /// Emission factor (t/MWh_thermal); technology default when omitted.
    #[serde(default)]
    pub emission_factor_t_mwh: Option<f64>,
    /// Variable O&M (€/MWh); technology default when omitted.
    #[serde(default)]
    pub vom_eur_mwh: Option<f64>,
}

/// One `[[scenarios]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Unique scenario identifier.
    pub name: String,
    /// Demand to serve (MW).
    pub demand_mw: f64,
    /// Carbon price (€/t CO₂).
    pub carbon_price_eur_ton: f64,
    /// Wind availability (0 to 100 %).
    pub wind_availability_pct: f64,
    /// Solar availability (0 to 100 %).
    pub solar_availability_pct: f64,
    /// Optional load-period label carried into the BI export.
    #[serde(default)]
    pub period_type: Option<String>,
    /// Optional season label carried into the BI export.
    #[serde(default)]
    pub season: Option<String>,
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"plants[2].efficiency"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A validated case ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    /// Validated plant roster.
    pub roster: PlantRoster,
    /// Scenarios in case-file order, availabilities as fractions.
    pub scenarios: Vec<Scenario>,
    /// Switching-price constants.
    pub switching: SwitchingConfig,
}

impl PlantConfig {
    fn new(name: &str, technology: Technology, capacity_mw: f64, fuel_cost_eur_mwh: f64) -> Self {
        Self {
            name: name.to_string(),
            technology,
            capacity_mw,
            fuel_cost_eur_mwh,
            efficiency: None,
            emission_factor_t_mwh: None,
            vom_eur_mwh: None,
        }
    }

    /// Plant with technology defaults filled in.
    pub fn to_plant(&self) -> Plant {
        let TechnologyDefaults {
            efficiency,
            emission_factor_t_mwh,
            vom_eur_mwh,
        } = self.technology.defaults();
        Plant::new(
            self.name.clone(),
            self.technology,
            self.capacity_mw,
            self.fuel_cost_eur_mwh,
        )
        .with_efficiency(self.efficiency.unwrap_or(efficiency))
        .with_emission_factor(self.emission_factor_t_mwh.unwrap_or(emission_factor_t_mwh))
        .with_vom(self.vom_eur_mwh.unwrap_or(vom_eur_mwh))
    }
}

impl ScenarioConfig {
    fn new(
        name: &str,
        demand_mw: f64,
        carbon_price_eur_ton: f64,
        wind_availability_pct: f64,
        solar_availability_pct: f64,
        period_type: &str,
        season: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            demand_mw,
            carbon_price_eur_ton,
            wind_availability_pct,
            solar_availability_pct,
            period_type: Some(period_type.to_string()),
            season: Some(season.to_string()),
        }
    }

    /// Scenario with availabilities converted to fractions.
    pub fn to_scenario(&self) -> Scenario {
        Scenario::new(
            self.name.clone(),
            self.demand_mw,
            self.carbon_price_eur_ton,
            self.wind_availability_pct / 100.0,
            self.solar_availability_pct / 100.0,
        )
        .with_context(self.period_type.clone(), self.season.clone())
    }
}

impl CaseConfig {
    /// Available preset names.
    pub const PRESETS: &[&str] = &["german_2024", "coal_gas_pair"];

    /// Returns the German 2024 preset: a national fleet across all
    /// technologies and six representative scenarios.
    pub fn german_2024() -> Self {
        use Technology::*;

        let plants = vec![
            PlantConfig::new("Wind_Onshore_North", Wind, 25_000.0, 0.0),
            PlantConfig::new("Wind_Offshore_NorthSea", Wind, 8_000.0, 0.0),
            PlantConfig::new("Solar_Bavaria", Solar, 30_000.0, 0.0),
            PlantConfig::new("Solar_BadenWuerttemberg", Solar, 20_000.0, 0.0),
            PlantConfig::new("Hydro_Alpine", Hydro, 4_000.0, 0.0),
            PlantConfig::new("Biomass_Fleet", Biomass, 8_000.0, 12.0),
            PlantConfig::new("Lignite_Rhineland", Lignite, 9_000.0, 5.0),
            PlantConfig::new("Lignite_Lusatia", Lignite, 6_000.0, 5.5),
            PlantConfig::new("Coal_Ruhr", Coal, 7_000.0, 12.0),
            PlantConfig {
                efficiency: Some(0.42),
                ..PlantConfig::new("Coal_Hamburg_Moorburg", Coal, 4_000.0, 13.0)
            },
            PlantConfig {
                efficiency: Some(0.60),
                ..PlantConfig::new("Gas_CCGT_Irsching", Gas, 5_000.0, 35.0)
            },
            PlantConfig::new("Gas_CCGT_Lingen", Gas, 6_000.0, 36.0),
            PlantConfig::new("Gas_CCGT_Fleet", Gas, 12_000.0, 37.0),
            PlantConfig::new("Gas_Peaker_South", GasPeaker, 3_000.0, 38.0),
            PlantConfig::new("Gas_Peaker_North", GasPeaker, 2_000.0, 40.0),
        ];

        let scenarios = vec![
            ScenarioConfig::new(
                "Base_Load_Summer",
                45_000.0,
                65.0,
                30.0,
                60.0,
                "Base_Load",
                "Summer",
            ),
            ScenarioConfig::new(
                "Peak_Load_Winter",
                65_000.0,
                65.0,
                40.0,
                10.0,
                "Peak_Load",
                "Winter",
            ),
            ScenarioConfig::new(
                "Extreme_Peak",
                66_000.0,
                80.0,
                10.0,
                0.0,
                "Peak_Load",
                "Winter",
            ),
            ScenarioConfig::new(
                "High_Wind_Day",
                50_000.0,
                65.0,
                85.0,
                20.0,
                "Base_Load",
                "Autumn",
            ),
            ScenarioConfig::new(
                "Solar_Noon_Spring",
                55_000.0,
                60.0,
                25.0,
                80.0,
                "Mid_Load",
                "Spring",
            ),
            ScenarioConfig::new(
                "Low_Carbon_Price",
                55_000.0,
                25.0,
                30.0,
                30.0,
                "Mid_Load",
                "Autumn",
            ),
        ];

        Self {
            switching: SwitchingConfig::default(),
            plants,
            scenarios,
        }
    }

    /// Returns the two-plant coal/gas validation case.
    pub fn coal_gas_pair() -> Self {
        Self {
            switching: SwitchingConfig::default(),
            plants: vec![
                PlantConfig::new("Coal_Test", Technology::Coal, 500.0, 25.0),
                PlantConfig::new("Gas_Test", Technology::Gas, 500.0, 45.0),
            ],
            scenarios: vec![
                ScenarioConfig::new("Low_Carbon", 750.0, 10.0, 0.0, 0.0, "Base_Load", "Summer"),
                ScenarioConfig::new(
                    "Near_Switching",
                    750.0,
                    30.0,
                    0.0,
                    0.0,
                    "Base_Load",
                    "Summer",
                ),
                ScenarioConfig::new("High_Carbon", 750.0, 90.0, 0.0, 0.0, "Base_Load", "Summer"),
            ],
        }
    }

    /// Loads a case from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "german_2024" => Ok(Self::german_2024()),
            "coal_gas_pair" => Ok(Self::coal_gas_pair()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a case from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("case", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a case from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let sw = &self.switching;
        for (field, value) in [
            ("switching.coal_efficiency", sw.coal_efficiency),
            ("switching.gas_efficiency", sw.gas_efficiency),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                errors.push(ConfigError::new(field, "must be in (0.0, 1.0]"));
            }
        }
        for (field, value) in [
            ("switching.coal_emission_factor", sw.coal_emission_factor),
            ("switching.gas_emission_factor", sw.gas_emission_factor),
        ] {
            if !value.is_finite() || value < 0.0 {
                errors.push(ConfigError::new(field, "must be >= 0"));
            }
        }

        if self.plants.is_empty() {
            errors.push(ConfigError::new("plants", "at least one plant is required"));
        }
        for (i, p) in self.plants.iter().enumerate() {
            let field = |name: &str| format!("plants[{i}].{name}");
            if p.name.trim().is_empty() {
                errors.push(ConfigError::new(field("name"), "must not be empty"));
            } else if self.plants[..i].iter().any(|q| q.name == p.name) {
                errors.push(ConfigError::new(
                    field("name"),
                    format!("duplicate plant name \"{}\"", p.name),
                ));
            }
            if !p.capacity_mw.is_finite() || p.capacity_mw < 0.0 {
                errors.push(ConfigError::new(field("capacity_mw"), "must be >= 0"));
            }
            if !p.fuel_cost_eur_mwh.is_finite() {
                errors.push(ConfigError::new(field("fuel_cost_eur_mwh"), "must be finite"));
            }
            if let Some(eff) = p.efficiency {
                if !(eff > 0.0 && eff <= 1.0) {
                    errors.push(ConfigError::new(field("efficiency"), "must be in (0.0, 1.0]"));
                }
            }
            if let Some(ef) = p.emission_factor_t_mwh {
                if !ef.is_finite() || ef < 0.0 {
                    errors.push(ConfigError::new(field("emission_factor_t_mwh"), "must be >= 0"));
                }
            }
            if let Some(vom) = p.vom_eur_mwh {
                if !vom.is_finite() || vom < 0.0 {
                    errors.push(ConfigError::new(field("vom_eur_mwh"), "must be >= 0"));
                }
            }
        }

        if self.scenarios.is_empty() {
            errors.push(ConfigError::new("scenarios", "at least one scenario is required"));
        }
        for (i, s) in self.scenarios.iter().enumerate() {
            let field = |name: &str| format!("scenarios[{i}].{name}");
            if s.name.trim().is_empty() {
                errors.push(ConfigError::new(field("name"), "must not be empty"));
            } else if self.scenarios[..i].iter().any(|q| q.name == s.name) {
                errors.push(ConfigError::new(
                    field("name"),
                    format!("duplicate scenario name \"{}\"", s.name),
                ));
            }
            if !s.demand_mw.is_finite() || s.demand_mw < 0.0 {
                errors.push(ConfigError::new(field("demand_mw"), "must be >= 0"));
            }
            if !s.carbon_price_eur_ton.is_finite() {
                errors.push(ConfigError::new(field("carbon_price_eur_ton"), "must be finite"));
            }
            if !(0.0..=100.0).contains(&s.wind_availability_pct) {
                errors.push(ConfigError::new(
                    field("wind_availability_pct"),
                    "must be in [0.0, 100.0]",
                ));
            }
            if !(0.0..=100.0).contains(&s.solar_availability_pct) {
                errors.push(ConfigError::new(
                    field("solar_availability_pct"),
                    "must be in [0.0, 100.0]",
                ));
            }
        }

        errors
    }

    /// Converts the configuration into a roster and scenarios.
    ///
    /// Call [`CaseConfig::validate`] first for field-level diagnostics; this
    /// only reports the first physical-range violation.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if a plant or scenario is out of range.
    pub fn build(&self) -> Result<Case, ValidationError> {
        let roster = PlantRoster::new(self.plants.iter().map(PlantConfig::to_plant).collect())?;
        let scenarios: Vec<Scenario> = self
            .scenarios
            .iter()
            .map(ScenarioConfig::to_scenario)
            .collect();
        for s in &scenarios {
            s.validate()?;
        }
        Ok(Case {
            roster,
            scenarios,
            switching: self.switching,
        })
    }
}
