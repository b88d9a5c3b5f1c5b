//! Per-scenario summary rows and the batch runner.

use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::bi::{self, ContextColumn, LongTable, Value, WideRow};
use crate::error::ValidationError;

use super::dispatch::dispatch_scenario;
use super::regime::{MarketRegime, RegimeInterpretation};
use super::switching::{SwitchingConfig, SwitchingPriceResult};
use super::types::{DispatchResult, PlantRoster, Scenario, Technology};

pub const MARKET_PRICE: &str = "Market_Price_EUR_MWh";
pub const TOTAL_EMISSIONS: &str = "Total_Emissions_tons";
pub const CARBON_INTENSITY: &str = "Carbon_Intensity_g_kWh";
pub const RENEWABLE_SHARE: &str = "Renewable_Share_%";
pub const PRODUCER_SURPLUS: &str = "Producer_Surplus_EUR";
pub const TOTAL_GENERATION: &str = "Total_Generation_MW";
pub const DEMAND_MET: &str = "Demand_Met";
pub const MARGINAL_PLANT: &str = "Marginal_Plant";
pub const MARGINAL_TECHNOLOGY: &str = "Marginal_Technology";
pub const SWITCHING_PRICE: &str = "Switching_Price_EUR_ton";
pub const MARKET_REGIME: &str = "Market_Regime";
pub const VS_SWITCHING_EUR: &str = "Carbon_Price_vs_Switching_EUR";
pub const VS_SWITCHING_PCT: &str = "Carbon_Price_vs_Switching_%";

/// Switching-price columns attached to a summary row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchingColumns {
    /// Roster switching price (€/t).
    pub switching_price_eur_ton: f64,
    /// Regime of this row's carbon price.
    pub market_regime: MarketRegime,
    /// Carbon price minus switching price (€/t).
    pub carbon_price_vs_switching_eur: f64,
    /// Deviation relative to the switching price (%), `None` at a zero switching price.
    pub carbon_price_vs_switching_pct: Option<f64>,
}

impl From<&RegimeInterpretation> for SwitchingColumns {
    fn from(i: &RegimeInterpretation) -> Self {
        Self {
            switching_price_eur_ton: i.switching_price_eur_ton,
            market_regime: i.regime,
            carbon_price_vs_switching_eur: i.carbon_price_vs_switching_eur,
            carbon_price_vs_switching_pct: i.carbon_price_vs_switching_pct,
        }
    }
}

/// One scenario's headline results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    /// Scenario identifier.
    pub scenario_name: String,
    /// Optional load-period label.
    pub period_type: Option<String>,
    /// Optional season label.
    pub season: Option<String>,
    /// Demand (MW).
    pub demand_mw: f64,
    /// Carbon price (€/t).
    pub carbon_price_eur_ton: f64,
    /// Wind availability (%).
    pub wind_availability_pct: f64,
    /// Solar availability (%).
    pub solar_availability_pct: f64,
    /// Clearing price (€/MWh).
    pub market_price_eur_mwh: f64,
    /// CO₂ emissions over the settlement hour (t).
    pub total_emissions_tons: f64,
    /// Emissions per unit of generation (g/kWh).
    pub carbon_intensity_g_kwh: f64,
    /// Renewable generation as a share of demand (%).
    pub renewable_share_pct: f64,
    /// Producer surplus across dispatched plants (€).
    pub producer_surplus_eur: f64,
    /// Total dispatched generation (MW).
    pub total_generation_mw: f64,
    /// `false` when available capacity fell short of demand.
    pub demand_met: bool,
    /// Name of the price-setting plant.
    pub marginal_plant: String,
    /// Technology of the price-setting plant.
    pub marginal_technology: Technology,
    /// Present once switching analysis has been added.
    pub switching: Option<SwitchingColumns>,
}

impl SummaryRow {
    pub fn from_result(scenario: &Scenario, result: &DispatchResult) -> Self {
        Self {
            scenario_name: result.scenario_name.clone(),
            period_type: scenario.period_type.clone(),
            season: scenario.season.clone(),
            demand_mw: result.demand_mw,
            carbon_price_eur_ton: result.carbon_price_eur_ton,
            wind_availability_pct: scenario.wind_availability * 100.0,
            solar_availability_pct: scenario.solar_availability * 100.0,
            market_price_eur_mwh: result.market_price_eur_mwh,
            total_emissions_tons: result.total_emissions_tons,
            carbon_intensity_g_kwh: result.carbon_intensity_g_kwh,
            renewable_share_pct: result.renewable_share_pct,
            producer_surplus_eur: result.total_profit_eur,
            total_generation_mw: result.total_generation_mw,
            demand_met: result.demand_met,
            marginal_plant: result.marginal_plant_name.clone(),
            marginal_technology: result.marginal_technology,
            switching: None,
        }
    }

    /// Wide form: context columns plus metric columns in summary order.
    pub fn to_wide(&self) -> WideRow {
        let mut context = BTreeMap::new();
        if let Some(p) = &self.period_type {
            context.insert(ContextColumn::PeriodType, Value::from(p.as_str()));
        }
        if let Some(s) = &self.season {
            context.insert(ContextColumn::Season, Value::from(s.as_str()));
        }
        context.insert(ContextColumn::DemandMw, Value::from(self.demand_mw));
        context.insert(
            ContextColumn::CarbonPriceEurTon,
            Value::from(self.carbon_price_eur_ton),
        );
        context.insert(
            ContextColumn::WindAvailPct,
            Value::from(self.wind_availability_pct),
        );
        context.insert(
            ContextColumn::SolarAvailPct,
            Value::from(self.solar_availability_pct),
        );

        let mut metrics: Vec<(String, Value)> = vec![
            (MARKET_PRICE.into(), self.market_price_eur_mwh.into()),
            (TOTAL_EMISSIONS.into(), self.total_emissions_tons.into()),
            (CARBON_INTENSITY.into(), self.carbon_intensity_g_kwh.into()),
            (RENEWABLE_SHARE.into(), self.renewable_share_pct.into()),
            (PRODUCER_SURPLUS.into(), self.producer_surplus_eur.into()),
            (TOTAL_GENERATION.into(), self.total_generation_mw.into()),
            (DEMAND_MET.into(), self.demand_met.into()),
            (MARGINAL_PLANT.into(), self.marginal_plant.as_str().into()),
            (MARGINAL_TECHNOLOGY.into(), self.marginal_technology.label().into()),
        ];
        if let Some(sw) = &self.switching {
            metrics.extend([
                (SWITCHING_PRICE.into(), sw.switching_price_eur_ton.into()),
                (MARKET_REGIME.into(), sw.market_regime.label().into()),
                (VS_SWITCHING_EUR.into(), sw.carbon_price_vs_switching_eur.into()),
                (VS_SWITCHING_PCT.into(), sw.carbon_price_vs_switching_pct.into()),
            ]);
        }

        WideRow {
            scenario_name: self.scenario_name.clone(),
            context,
            metrics,
        }
    }
}

/// Attaches switching columns to every row, interpreting each row's own
/// carbon price against the shared switching price.
pub fn add_switching_analysis(rows: &mut [SummaryRow], switching: &SwitchingPriceResult) {
    for row in rows {
        let interpretation = RegimeInterpretation::new(row.carbon_price_eur_ton, switching);
        row.switching = Some(SwitchingColumns::from(&interpretation));
    }
}

/// Everything produced by one batch over a roster.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// Dispatch results in scenario input order.
    pub results: Vec<DispatchResult>,
    /// One summary row per result, same order.
    pub summary: Vec<SummaryRow>,
    /// Switching price for the roster, or why it is unavailable.
    pub switching: Result<SwitchingPriceResult, ValidationError>,
}

impl BatchOutcome {
    pub fn result(&self, scenario_name: &str) -> Option<&DispatchResult> {
        self.results
            .iter()
            .find(|r| r.scenario_name == scenario_name)
    }

    pub fn summary_row(&self, scenario_name: &str) -> Option<&SummaryRow> {
        self.summary
            .iter()
            .find(|r| r.scenario_name == scenario_name)
    }

    pub fn wide_rows(&self) -> Vec<WideRow> {
        self.summary.iter().map(SummaryRow::to_wide).collect()
    }

    pub fn bi_export(&self) -> LongTable {
        bi::melt(&self.wide_rows())
    }
}

fn ensure_unique_names(scenarios: &[Scenario]) -> Result<(), ValidationError> {
    for (i, scenario) in scenarios.iter().enumerate() {
        if scenarios[..i].iter().any(|s| s.name == scenario.name) {
            return Err(ValidationError::InvalidScenario {
                name: scenario.name.clone(),
                reason: "duplicate scenario name".to_string(),
            });
        }
    }
    Ok(())
}

/// Dispatches every scenario, builds summaries and attaches the switching
/// analysis when the roster supports it.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidScenario`] when two scenarios share a
/// name, otherwise the first [`ValidationError`] raised while dispatching. A
/// switching-price failure is not an error here; it is kept in
/// [`BatchOutcome::switching`] and the summary carries no switching columns.
pub fn run_batch(
    roster: &PlantRoster,
    scenarios: &[Scenario],
    switching_config: &SwitchingConfig,
) -> Result<BatchOutcome, ValidationError> {
    ensure_unique_names(scenarios)?;

    #[cfg(feature = "parallel")]
    let results: Result<Vec<DispatchResult>, ValidationError> = scenarios
        .par_iter()
        .map(|s| dispatch_scenario(roster, s))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let results: Result<Vec<DispatchResult>, ValidationError> = scenarios
        .iter()
        .map(|s| dispatch_scenario(roster, s))
        .collect();
    let results = results?;

    let mut summary: Vec<SummaryRow> = scenarios
        .iter()
        .zip(&results)
        .map(|(s, r)| SummaryRow::from_result(s, r))
        .collect();

    let switching = SwitchingPriceResult::compute(roster, switching_config);
    match &switching {
        Ok(sp) => add_switching_analysis(&mut summary, sp),
        Err(e) => warn!(error = %e, "switching analysis unavailable"),
    }

    info!(
        scenarios = results.len(),
        plants = roster.len(),
        "batch complete"
    );

    Ok(BatchOutcome {
        results,
        summary,
        switching,
    })
}
