//! End-to-end dispatch of one scenario: clearing plus aggregation.

use crate::error::ValidationError;

use super::aggregate::MarketKpis;
use super::clearing::clear;
use super::types::{DispatchResult, PlantRoster, Scenario};

/// Clears `scenario` against `roster` and derives its indicators.
///
/// The result is freshly allocated and independent of any other scenario,
/// so calls across scenarios may run concurrently over a shared roster.
///
/// # Errors
///
/// Propagates [`ValidationError`] from the clearing engine.
pub fn dispatch_scenario(
    roster: &PlantRoster,
    scenario: &Scenario,
) -> Result<DispatchResult, ValidationError> {
    let cleared = clear(roster, scenario)?;
    let kpis = MarketKpis::from_cleared(&cleared, roster, scenario.demand_mw);
    let marginal = &cleared.lines[cleared.marginal_rank];

    Ok(DispatchResult {
        scenario_name: scenario.name.clone(),
        demand_mw: scenario.demand_mw,
        carbon_price_eur_ton: scenario.carbon_price_eur_ton,
        market_price_eur_mwh: cleared.market_price_eur_mwh,
        marginal_rank: cleared.marginal_rank,
        marginal_plant_name: marginal.plant_name.clone(),
        marginal_technology: marginal.technology,
        demand_met: cleared.demand_met,
        total_emissions_tons: kpis.total_emissions_tons,
        total_generation_mw: kpis.total_generation_mw,
        carbon_intensity_g_kwh: kpis.carbon_intensity_g_kwh,
        renewable_share_pct: kpis.renewable_share_pct,
        total_profit_eur: kpis.producer_surplus_eur,
        generation_by_technology: kpis.generation_by_technology,
        dispatch: cleared.lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::types::{Plant, Technology};

    #[test]
    fn result_reports_marginal_plant_and_kpis() {
        let roster = PlantRoster::new(vec![
            Plant::new("Solar", Technology::Solar, 200.0, 0.0),
            Plant::new("Peaker", Technology::GasPeaker, 300.0, 50.0),
        ])
        .unwrap();
        let scenario = Scenario::new("Noon", 250.0, 80.0, 0.0, 1.0);
        let result = dispatch_scenario(&roster, &scenario).unwrap();

        assert_eq!(result.scenario_name, "Noon");
        assert_eq!(result.marginal_plant_name, "Peaker");
        assert_eq!(result.marginal_technology, Technology::GasPeaker);
        assert_eq!(result.marginal_line().dispatched_capacity_mw, 50.0);
        assert!(result.demand_met);
        assert!((result.renewable_share_pct - 80.0).abs() < 1e-9);
        assert!(format!("{result}").contains("Peaker"));
    }
}
