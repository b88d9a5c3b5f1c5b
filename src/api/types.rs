//! API response and query types.
//!
//! BI field names follow the CSV export headers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::bi::{LongRow, LongTable, MetricCategory, Value};
use crate::market::regime::{MarketRegime, RegimeInterpretation};
use crate::market::summary::SummaryRow;
use crate::market::switching::SwitchingPriceResult;

/// Switching price with the regime of every scenario.
#[derive(Debug, Serialize)]
pub struct SwitchingResponse {
    pub switching: SwitchingPriceResult,
    pub regimes: Vec<RegimeEntry>,
}

/// Regime of one scenario at its own carbon price.
#[derive(Debug, Serialize)]
pub struct RegimeEntry {
    pub scenario_name: String,
    pub carbon_price_eur_ton: f64,
    pub regime: MarketRegime,
    pub cheaper_fuel: &'static str,
    pub explanation: &'static str,
    pub carbon_price_vs_switching_eur: f64,
    pub carbon_price_vs_switching_pct: Option<f64>,
}

impl RegimeEntry {
    pub fn new(row: &SummaryRow, switching: &SwitchingPriceResult) -> Self {
        let i = RegimeInterpretation::new(row.carbon_price_eur_ton, switching);
        Self {
            scenario_name: row.scenario_name.clone(),
            carbon_price_eur_ton: i.carbon_price_eur_ton,
            regime: i.regime,
            cheaper_fuel: i.regime.cheaper_fuel(),
            explanation: i.regime.explanation(),
            carbon_price_vs_switching_eur: i.carbon_price_vs_switching_eur,
            carbon_price_vs_switching_pct: i.carbon_price_vs_switching_pct,
        }
    }
}

/// One long-format BI row.
#[derive(Debug, Serialize)]
pub struct BiRecord {
    #[serde(rename = "Scenario_Name")]
    pub scenario_name: String,
    /// Context columns keyed by header, missing cells omitted.
    #[serde(rename = "Context")]
    pub context: BTreeMap<&'static str, Value>,
    #[serde(rename = "KPI_Metric")]
    pub kpi_metric: String,
    #[serde(rename = "Value")]
    pub value: Value,
    #[serde(rename = "Data_Type")]
    pub data_type: MetricCategory,
    #[serde(rename = "Unit")]
    pub unit: &'static str,
}

impl BiRecord {
    pub fn new(table: &LongTable, row: &LongRow) -> Self {
        let context = table
            .context_columns
            .iter()
            .zip(&row.context)
            .filter(|(_, v)| **v != Value::Missing)
            .map(|(c, v)| (c.header(), v.clone()))
            .collect();
        Self {
            scenario_name: row.scenario_name.clone(),
            context,
            kpi_metric: row.kpi_metric.clone(),
            value: row.value.clone(),
            data_type: row.data_type,
            unit: row.unit,
        }
    }
}

/// Optional category filter for the BI endpoint.
#[derive(Debug, Deserialize)]
pub struct BiQuery {
    /// `Economic`, `Environmental`, `Technical` or `Other` (case-insensitive).
    pub data_type: Option<String>,
}

/// Error response body for 4xx errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
