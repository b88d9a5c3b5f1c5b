//! Post-clearing aggregation of emissions, renewable share, and surplus.

use std::collections::BTreeMap;

use super::clearing::ClearedMarket;
use super::types::{PlantRoster, Technology};

/// Aggregate indicators derived from a cleared scenario.
///
/// Each dispatched MW counts as one MWh over the implicit one-hour
/// settlement period.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketKpis {
    /// Total CO₂ emissions (t).
    pub total_emissions_tons: f64,
    /// Total dispatched generation (MW).
    pub total_generation_mw: f64,
    /// Emissions per unit of generation (g/kWh).
    pub carbon_intensity_g_kwh: f64,
    /// Renewable generation relative to demand (%).
    pub renewable_share_pct: f64,
    /// Producer surplus `Σ (price − SRMC) × dispatched` (€).
    pub producer_surplus_eur: f64,
    /// Dispatched generation per technology (MW).
    pub generation_by_technology: BTreeMap<Technology, f64>,
}

impl MarketKpis {
    /// Computes all indicators from the cleared merit order.
    ///
    /// # Arguments
    ///
    /// * `cleared` - Clearing outcome whose lines index into `roster`
    /// * `roster` - Roster the scenario was cleared against
    /// * `demand_mw` - Scenario demand, denominator of the renewable share
    pub fn from_cleared(cleared: &ClearedMarket, roster: &PlantRoster, demand_mw: f64) -> Self {
        let plants = roster.plants();
        let price = cleared.market_price_eur_mwh;

        let mut emissions = 0.0_f64;
        let mut generation = 0.0_f64;
        let mut renewable = 0.0_f64;
        let mut surplus = 0.0_f64;
        let mut by_tech: BTreeMap<Technology, f64> = BTreeMap::new();

        for line in &cleared.lines {
            let mw = line.dispatched_capacity_mw;
            if mw <= 0.0 {
                continue;
            }
            let plant = &plants[line.roster_index];

            emissions += mw * plant.emission_factor_t_mwh;
            generation += mw;
            if line.technology.is_renewable() {
                renewable += mw;
            }
            surplus += plant_surplus_eur(price, line.srmc_eur_mwh, mw);
            *by_tech.entry(line.technology).or_insert(0.0) += mw;
        }

        let renewable_share_pct = if demand_mw > 0.0 {
            renewable / demand_mw * 100.0
        } else {
            0.0
        };

        // t/MWh -> g/kWh
        let carbon_intensity_g_kwh = if generation > 0.0 {
            emissions / generation * 1000.0
        } else {
            0.0
        };

        Self {
            total_emissions_tons: emissions,
            total_generation_mw: generation,
            carbon_intensity_g_kwh,
            renewable_share_pct,
            producer_surplus_eur: surplus,
            generation_by_technology: by_tech,
        }
    }
}

/// Surplus earned by one plant: `(price − SRMC) × dispatched`.
pub fn plant_surplus_eur(market_price_eur_mwh: f64, srmc_eur_mwh: f64, dispatched_mw: f64) -> f64 {
    (market_price_eur_mwh - srmc_eur_mwh) * dispatched_mw
}
