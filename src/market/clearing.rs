//! Merit-order clearing: ranking, capacity allocation, and price formation.

use std::cmp::Ordering;

use tracing::{debug, warn};

use crate::error::ValidationError;

use super::srmc::{available_capacity_mw, srmc_eur_mwh};
use super::types::{DispatchLine, PlantRoster, Scenario};

/// Allocation of demand across the merit order for one scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct ClearedMarket {
    /// Dispatch lines sorted by ascending SRMC.
    pub lines: Vec<DispatchLine>,
    /// Clearing price (€/MWh).
    pub market_price_eur_mwh: f64,
    /// Index into `lines` of the price-setting plant.
    pub marginal_rank: usize,
    /// `false` when total available capacity is below demand.
    pub demand_met: bool,
}

/// Builds one undispatched line per plant, in roster order.
pub fn dispatch_lines(roster: &PlantRoster, scenario: &Scenario) -> Vec<DispatchLine> {
    roster
        .plants()
        .iter()
        .enumerate()
        .map(|(roster_index, plant)| DispatchLine {
            roster_index,
            plant_name: plant.name.clone(),
            technology: plant.technology,
            srmc_eur_mwh: srmc_eur_mwh(plant, scenario.carbon_price_eur_ton),
            available_capacity_mw: available_capacity_mw(plant, scenario),
            is_dispatched: false,
            dispatched_capacity_mw: 0.0,
        })
        .collect()
}

/// Total order of the merit order: SRMC, then roster position, then name.
fn merit_cmp(a: &DispatchLine, b: &DispatchLine) -> Ordering {
    a.srmc_eur_mwh
        .total_cmp(&b.srmc_eur_mwh)
        .then(a.roster_index.cmp(&b.roster_index))
        .then_with(|| a.plant_name.cmp(&b.plant_name))
}

/// Sorts lines into merit order in place.
pub fn sort_merit_order(lines: &mut [DispatchLine]) {
    lines.sort_by(merit_cmp);
}

/// Clears one scenario against the roster.
///
/// Plants are dispatched cheapest first. The first plant whose cumulative
/// available capacity reaches demand is marginal and receives only the
/// residual; its SRMC is the market price. When the whole fleet cannot
/// cover demand, every plant runs flat out and the most expensive producing
/// plant sets the price (`demand_met == false`).
///
/// # Errors
///
/// Returns [`ValidationError::EmptyRoster`] when there is nothing to
/// dispatch, or [`ValidationError::InvalidScenario`] for out-of-range
/// scenario inputs.
///
/// # Examples
///
/// ```
/// use merit_sim::market::clearing::clear;
/// use merit_sim::market::types::{Plant, PlantRoster, Scenario, Technology};
///
/// let roster = PlantRoster::new(vec![
///     Plant::new("Wind", Technology::Wind, 300.0, 0.0),
///     Plant::new("CCGT", Technology::Gas, 500.0, 40.0),
/// ])
/// .unwrap();
/// let cleared = clear(&roster, &Scenario::new("S", 400.0, 50.0, 1.0, 1.0)).unwrap();
/// assert!(cleared.demand_met);
/// assert_eq!(cleared.lines[cleared.marginal_rank].plant_name, "CCGT");
/// ```
pub fn clear(roster: &PlantRoster, scenario: &Scenario) -> Result<ClearedMarket, ValidationError> {
    if roster.is_empty() {
        return Err(ValidationError::EmptyRoster);
    }
    scenario.validate()?;

    let mut lines = dispatch_lines(roster, scenario);
    sort_merit_order(&mut lines);

    let demand = scenario.demand_mw;
    let mut cumulative_before = 0.0_f64;
    let mut marginal = None;

    for (rank, line) in lines.iter_mut().enumerate() {
        if marginal.is_some() {
            break;
        }
        let cumulative = cumulative_before + line.available_capacity_mw;
        if cumulative >= demand {
            let residual = (demand - cumulative_before).clamp(0.0, line.available_capacity_mw);
            line.dispatched_capacity_mw = residual;
            line.is_dispatched = residual > 0.0;
            marginal = Some(rank);
        } else {
            line.dispatched_capacity_mw = line.available_capacity_mw;
            line.is_dispatched = line.available_capacity_mw > 0.0;
        }
        cumulative_before = cumulative;
    }

    let (marginal_rank, demand_met) = match marginal {
        Some(rank) => (rank, true),
        None => {
            // Every line was dispatched at full availability in the loop above.
            let rank = lines
                .iter()
                .rposition(|l| l.is_dispatched)
                .unwrap_or(lines.len() - 1);
            warn!(
                scenario = %scenario.name,
                demand_mw = demand,
                available_mw = cumulative_before,
                "demand exceeds available capacity, pricing at most expensive dispatched plant"
            );
            (rank, false)
        }
    };

    let market_price_eur_mwh = lines[marginal_rank].srmc_eur_mwh;
    debug!(
        scenario = %scenario.name,
        price = market_price_eur_mwh,
        marginal = %lines[marginal_rank].plant_name,
        "scenario cleared"
    );

    Ok(ClearedMarket {
        lines,
        market_price_eur_mwh,
        marginal_rank,
        demand_met,
    })
}
