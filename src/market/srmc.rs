//! Short-run marginal cost and scenario availability of a plant.

use super::types::{Plant, Scenario};

/// Computes a plant's short-run marginal cost at the given carbon price.
///
/// `SRMC = fuel / η + carbon_price × (emission_factor / η) + VOM`
///
/// The formula is uniform across technologies; renewables simply carry a
/// zero fuel cost and emission factor.
///
/// # Arguments
///
/// * `plant` - Plant parameters
/// * `carbon_price_eur_ton` - Carbon price (€/t CO₂)
///
/// # Returns
///
/// SRMC in €/MWh_electric.
///
/// # Examples
///
/// ```
/// use merit_sim::market::srmc::srmc_eur_mwh;
/// use merit_sim::market::types::{Plant, Technology};
///
/// let gas = Plant::new("CCGT", Technology::Gas, 800.0, 44.0)
///     .with_efficiency(0.55)
///     .with_emission_factor(0.20)
///     .with_vom(2.0);
/// let srmc = srmc_eur_mwh(&gas, 0.0);
/// assert!((srmc - 82.0).abs() < 1e-9);
/// ```
pub fn srmc_eur_mwh(plant: &Plant, carbon_price_eur_ton: f64) -> f64 {
    plant.fuel_cost_eur_mwh / plant.efficiency
        + carbon_price_eur_ton * (plant.emission_factor_t_mwh / plant.efficiency)
        + plant.vom_eur_mwh
}

/// Capacity a plant offers in a scenario (MW).
///
/// Variable renewables are derated by the scenario's availability fraction;
/// every other technology offers its full nameplate.
pub fn available_capacity_mw(plant: &Plant, scenario: &Scenario) -> f64 {
    if plant.technology.is_variable_renewable() {
        (plant.capacity_mw * scenario.availability_for(plant.technology)).max(0.0)
    } else {
        plant.capacity_mw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::types::Technology;

    #[test]
    fn coal_srmc_includes_carbon_cost() {
        let coal = Plant::new("Coal", Technology::Coal, 500.0, 25.0)
            .with_efficiency(0.38)
            .with_emission_factor(0.34)
            .with_vom(0.0);
        let expected = 25.0 / 0.38 + 80.0 * 0.34 / 0.38;
        assert!((srmc_eur_mwh(&coal, 80.0) - expected).abs() < 1e-9);
    }

    #[test]
    fn zero_emission_plant_is_carbon_insensitive() {
        let wind = Plant::new("Wind", Technology::Wind, 1000.0, 0.0);
        assert_eq!(srmc_eur_mwh(&wind, 0.0), srmc_eur_mwh(&wind, 200.0));
    }

    #[test]
    fn wind_capacity_scales_with_availability() {
        let wind = Plant::new("Wind", Technology::Wind, 1000.0, 0.0);
        let scenario = Scenario::new("S", 500.0, 50.0, 0.25, 0.9);
        assert_eq!(available_capacity_mw(&wind, &scenario), 250.0);
    }

    #[test]
    fn thermal_capacity_ignores_availability() {
        let coal = Plant::new("Coal", Technology::Coal, 700.0, 20.0);
        let scenario = Scenario::new("S", 500.0, 50.0, 0.0, 0.0);
        assert_eq!(available_capacity_mw(&coal, &scenario), 700.0);
    }
}
