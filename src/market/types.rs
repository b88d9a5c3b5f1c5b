//! Core market types: technologies, plants, scenarios, and dispatch records.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Generation technology of a plant.
///
/// Serialized with the labels used by the plant roster tables
/// (`"Gas Peaker"` rather than `GasPeaker`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Technology {
    Coal,
    Lignite,
    Gas,
    #[serde(rename = "Gas Peaker")]
    GasPeaker,
    Wind,
    Solar,
    Hydro,
    Biomass,
    Nuclear,
}

/// Fallback engineering parameters for a technology.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TechnologyDefaults {
    /// Thermal efficiency (0, 1].
    pub efficiency: f64,
    /// CO₂ emission factor (t/MWh_thermal).
    pub emission_factor_t_mwh: f64,
    /// Variable operating and maintenance cost (€/MWh).
    pub vom_eur_mwh: f64,
}

impl Technology {
    /// Every technology, in declaration order.
    pub const ALL: [Technology; 9] = [
        Technology::Coal,
        Technology::Lignite,
        Technology::Gas,
        Technology::GasPeaker,
        Technology::Wind,
        Technology::Solar,
        Technology::Hydro,
        Technology::Biomass,
        Technology::Nuclear,
    ];

    /// Roster label of the technology.
    pub fn label(self) -> &'static str {
        match self {
            Technology::Coal => "Coal",
            Technology::Lignite => "Lignite",
            Technology::Gas => "Gas",
            Technology::GasPeaker => "Gas Peaker",
            Technology::Wind => "Wind",
            Technology::Solar => "Solar",
            Technology::Hydro => "Hydro",
            Technology::Biomass => "Biomass",
            Technology::Nuclear => "Nuclear",
        }
    }

    /// Returns `true` for weather-dependent plants whose capacity is scaled
    /// by the scenario availability fraction.
    pub fn is_variable_renewable(self) -> bool {
        matches!(self, Technology::Wind | Technology::Solar)
    }

    /// Returns `true` for technologies counted in the renewable share.
    pub fn is_renewable(self) -> bool {
        matches!(
            self,
            Technology::Wind | Technology::Solar | Technology::Hydro | Technology::Biomass
        )
    }

    /// Returns `true` for the gas partition of the switching-price calculation.
    pub fn is_gas_family(self) -> bool {
        matches!(self, Technology::Gas | Technology::GasPeaker)
    }

    /// Default efficiency, emission factor, and VOM for roster entries that
    /// omit them.
    pub fn defaults(self) -> TechnologyDefaults {
        let (efficiency, emission_factor_t_mwh, vom_eur_mwh) = match self {
            Technology::Coal => (0.38, 0.34, 4.0),
            Technology::Lignite => (0.35, 0.40, 5.0),
            Technology::Gas => (0.55, 0.20, 2.0),
            Technology::GasPeaker => (0.38, 0.20, 3.0),
            Technology::Wind => (1.0, 0.0, 1.0),
            Technology::Solar => (1.0, 0.0, 0.5),
            Technology::Hydro => (1.0, 0.0, 1.5),
            Technology::Biomass => (0.35, 0.0, 6.0),
            Technology::Nuclear => (0.33, 0.0, 2.5),
        };
        TechnologyDefaults {
            efficiency,
            emission_factor_t_mwh,
            vom_eur_mwh,
        }
    }
}

impl fmt::Display for Technology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Technology {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Technology::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown technology \"{s}\""))
    }
}

/// A generating unit of the roster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plant {
    /// Unique plant identifier.
    pub name: String,
    /// Technology category.
    pub technology: Technology,
    /// Nameplate capacity (MW).
    pub capacity_mw: f64,
    /// Fuel cost (€/MWh_thermal).
    pub fuel_cost_eur_mwh: f64,
    /// Thermal efficiency (0, 1].
    pub efficiency: f64,
    /// CO₂ emission factor (t/MWh_thermal).
    pub emission_factor_t_mwh: f64,
    /// Variable operating cost (€/MWh).
    pub vom_eur_mwh: f64,
}

impl Plant {
    /// Creates a plant using the technology defaults for efficiency,
    /// emission factor, and VOM.
    ///
    /// # Examples
    ///
    /// ```
    /// use merit_sim::market::types::{Plant, Technology};
    ///
    /// let coal = Plant::new("Coal_Test", Technology::Coal, 500.0, 25.0);
    /// assert_eq!(coal.efficiency, 0.38);
    /// ```
    pub fn new(
        name: impl Into<String>,
        technology: Technology,
        capacity_mw: f64,
        fuel_cost_eur_mwh: f64,
    ) -> Self {
        let d = technology.defaults();
        Self {
            name: name.into(),
            technology,
            capacity_mw,
            fuel_cost_eur_mwh,
            efficiency: d.efficiency,
            emission_factor_t_mwh: d.emission_factor_t_mwh,
            vom_eur_mwh: d.vom_eur_mwh,
        }
    }

    /// Overrides the thermal efficiency.
    pub fn with_efficiency(mut self, efficiency: f64) -> Self {
        self.efficiency = efficiency;
        self
    }

    /// Overrides the emission factor (t/MWh_thermal).
    pub fn with_emission_factor(mut self, emission_factor_t_mwh: f64) -> Self {
        self.emission_factor_t_mwh = emission_factor_t_mwh;
        self
    }

    /// Overrides the variable operating cost (€/MWh).
    pub fn with_vom(mut self, vom_eur_mwh: f64) -> Self {
        self.vom_eur_mwh = vom_eur_mwh;
        self
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidPlant {
            name: self.name.clone(),
            reason: reason.to_string(),
        };
        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if !self.capacity_mw.is_finite() || self.capacity_mw < 0.0 {
            return Err(invalid("capacity_mw must be finite and >= 0"));
        }
        if !self.fuel_cost_eur_mwh.is_finite() {
            return Err(invalid("fuel_cost_eur_mwh must be finite"));
        }
        if !(self.efficiency > 0.0 && self.efficiency <= 1.0) {
            return Err(invalid("efficiency must be in (0, 1]"));
        }
        if !self.emission_factor_t_mwh.is_finite() || self.emission_factor_t_mwh < 0.0 {
            return Err(invalid("emission_factor_t_mwh must be finite and >= 0"));
        }
        if !self.vom_eur_mwh.is_finite() || self.vom_eur_mwh < 0.0 {
            return Err(invalid("vom_eur_mwh must be finite and >= 0"));
        }
        Ok(())
    }
}

/// Validated, ordered collection of plants.
///
/// Roster position is the primary tie-break of the merit order, so the
/// input order is preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlantRoster {
    plants: Vec<Plant>,
}

impl PlantRoster {
    /// Validates every plant and builds the roster.
    ///
    /// An empty roster is accepted here; dispatching it is rejected by the
    /// clearing engine.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPlant`] for the first plant outside
    /// its physical range or with a duplicated name.
    pub fn new(plants: Vec<Plant>) -> Result<Self, ValidationError> {
        for (i, plant) in plants.iter().enumerate() {
            plant.validate()?;
            if plants[..i].iter().any(|p| p.name == plant.name) {
                return Err(ValidationError::InvalidPlant {
                    name: plant.name.clone(),
                    reason: "duplicate plant name".to_string(),
                });
            }
        }
        Ok(Self { plants })
    }

    /// Plants in roster order.
    pub fn plants(&self) -> &[Plant] {
        &self.plants
    }

    /// Number of plants.
    pub fn len(&self) -> usize {
        self.plants.len()
    }

    /// Returns `true` when the roster has no plants.
    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }

    /// Total nameplate capacity (MW).
    pub fn nameplate_mw(&self) -> f64 {
        self.plants.iter().map(|p| p.capacity_mw).sum()
    }
}

/// One demand / carbon-price snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    /// Scenario identifier.
    pub name: String,
    /// Demand to be served (MW).
    pub demand_mw: f64,
    /// Carbon price (€/t CO₂).
    pub carbon_price_eur_ton: f64,
    /// Wind availability fraction (0.0 to 1.0).
    pub wind_availability: f64,
    /// Solar availability fraction (0.0 to 1.0).
    pub solar_availability: f64,
    /// Optional period label (e.g. `Base_Load`).
    pub period_type: Option<String>,
    /// Optional season label (e.g. `Summer`).
    pub season: Option<String>,
}

impl Scenario {
    /// Creates a scenario without context labels.
    ///
    /// Availabilities are fractions, not percentages.
    pub fn new(
        name: impl Into<String>,
        demand_mw: f64,
        carbon_price_eur_ton: f64,
        wind_availability: f64,
        solar_availability: f64,
    ) -> Self {
        Self {
            name: name.into(),
            demand_mw,
            carbon_price_eur_ton,
            wind_availability,
            solar_availability,
            period_type: None,
            season: None,
        }
    }

    /// Attaches period and season labels carried through to the BI export.
    pub fn with_context(mut self, period_type: Option<String>, season: Option<String>) -> Self {
        self.period_type = period_type;
        self.season = season;
        self
    }

    /// Returns the same scenario at a different carbon price.
    pub fn with_carbon_price(&self, carbon_price_eur_ton: f64) -> Self {
        Self {
            carbon_price_eur_ton,
            ..self.clone()
        }
    }

    /// Availability fraction applying to `technology` (1.0 for dispatchable plants).
    pub fn availability_for(&self, technology: Technology) -> f64 {
        match technology {
            Technology::Wind => self.wind_availability,
            Technology::Solar => self.solar_availability,
            _ => 1.0,
        }
    }

    /// Checks ranges of demand, carbon price, and availabilities.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidScenario`] naming the offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidScenario {
            name: self.name.clone(),
            reason: reason.to_string(),
        };
        if !self.demand_mw.is_finite() || self.demand_mw < 0.0 {
            return Err(invalid("demand_mw must be finite and >= 0"));
        }
        if !self.carbon_price_eur_ton.is_finite() {
            return Err(invalid("carbon_price_eur_ton must be finite"));
        }
        if !(0.0..=1.0).contains(&self.wind_availability) {
            return Err(invalid("wind availability must be in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.solar_availability) {
            return Err(invalid("solar availability must be in [0, 1]"));
        }
        Ok(())
    }
}

/// Merit-order position of one plant within a cleared scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchLine {
    /// Position of the plant in the roster.
    pub roster_index: usize,
    /// Plant name.
    pub plant_name: String,
    /// Plant technology.
    pub technology: Technology,
    /// Short-run marginal cost (€/MWh).
    pub srmc_eur_mwh: f64,
    /// Capacity available in this scenario (MW).
    pub available_capacity_mw: f64,
    /// Whether the plant produces in this scenario.
    pub is_dispatched: bool,
    /// Dispatched output (MW).
    pub dispatched_capacity_mw: f64,
}

/// Complete outcome of clearing one scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchResult {
    /// Scenario identifier.
    pub scenario_name: String,
    /// Demand (MW).
    pub demand_mw: f64,
    /// Carbon price the scenario was cleared at (€/t).
    pub carbon_price_eur_ton: f64,
    /// Clearing price (€/MWh).
    pub market_price_eur_mwh: f64,
    /// Index into `dispatch` of the price-setting plant.
    pub marginal_rank: usize,
    /// Name of the price-setting plant.
    pub marginal_plant_name: String,
    /// Technology of the price-setting plant.
    pub marginal_technology: Technology,
    /// Dispatch lines in merit order.
    pub dispatch: Vec<DispatchLine>,
    /// `false` when available capacity fell short of demand.
    pub demand_met: bool,
    /// Total CO₂ emissions over the settlement hour (t).
    pub total_emissions_tons: f64,
    /// Total dispatched generation (MW).
    pub total_generation_mw: f64,
    /// Emissions per unit of generation (g/kWh).
    pub carbon_intensity_g_kwh: f64,
    /// Renewable generation as a share of demand (%).
    pub renewable_share_pct: f64,
    /// Producer surplus across dispatched plants (€).
    pub total_profit_eur: f64,
    /// Dispatched generation per technology (MW).
    pub generation_by_technology: BTreeMap<Technology, f64>,
}

impl DispatchResult {
    /// The price-setting dispatch line.
    pub fn marginal_line(&self) -> &DispatchLine {
        &self.dispatch[self.marginal_rank]
    }

    /// Total available capacity in this scenario (MW).
    pub fn available_capacity_mw(&self) -> f64 {
        self.dispatch.iter().map(|l| l.available_capacity_mw).sum()
    }
}

impl fmt::Display for DispatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<20} | demand={:>9.0} MW  CO2={:>6.2} EUR/t | price={:>7.2} EUR/MWh \
             marginal={} ({}) | emissions={:.0} t  RE={:.1}%  surplus={:.0} EUR | met={}",
            self.scenario_name,
            self.demand_mw,
            self.carbon_price_eur_ton,
            self.market_price_eur_mwh,
            self.marginal_plant_name,
            self.marginal_technology,
            self.total_emissions_tons,
            self.renewable_share_pct,
            self.total_profit_eur,
            self.demand_met,
        )
    }
}
