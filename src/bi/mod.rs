//! BI-ready long-format export of scenario summaries.
//!
//! Wide summaries (one row per scenario, one column per metric) are melted
//! into one row per (scenario, metric), each tagged with an inferred
//! category and unit.

pub mod melt;
pub mod rules;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

pub use melt::{melt, pivot};
pub use rules::{MetricCategory, classify_metric, metric_unit};

/// Header of the scenario identity column.
pub const SCENARIO_COLUMN: &str = "Scenario_Name";
/// Header of the metric name column.
pub const METRIC_COLUMN: &str = "KPI_Metric";
/// Header of the value column.
pub const VALUE_COLUMN: &str = "Value";
/// Header of the category column.
pub const CATEGORY_COLUMN: &str = "Data_Type";
/// Header of the unit column.
pub const UNIT_COLUMN: &str = "Unit";

/// A single table cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    Flag(bool),
    /// Empty cell, e.g. a context column absent for this scenario.
    Missing,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{v}"),
            Value::Text(s) => f.write_str(s),
            Value::Flag(b) => write!(f, "{b}"),
            Value::Missing => Ok(()),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Flag(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Option<f64>> for Value {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Value::Missing, Value::Number)
    }
}

/// Recognized optional identifier columns, kept alongside every melted row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ContextColumn {
    PeriodType,
    Season,
    DemandMw,
    CarbonPriceEurTon,
    WindAvailPct,
    SolarAvailPct,
}

impl ContextColumn {
    /// All recognized columns in output order.
    pub const ALL: [ContextColumn; 6] = [
        ContextColumn::PeriodType,
        ContextColumn::Season,
        ContextColumn::DemandMw,
        ContextColumn::CarbonPriceEurTon,
        ContextColumn::WindAvailPct,
        ContextColumn::SolarAvailPct,
    ];

    /// Column header.
    pub fn header(self) -> &'static str {
        match self {
            ContextColumn::PeriodType => "Period_Type",
            ContextColumn::Season => "Season",
            ContextColumn::DemandMw => "Demand_MW",
            ContextColumn::CarbonPriceEurTon => "Carbon_Price_EUR_ton",
            ContextColumn::WindAvailPct => "Wind_Avail_%",
            ContextColumn::SolarAvailPct => "Solar_Avail_%",
        }
    }
}

/// One scenario in wide form.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WideRow {
    /// Scenario identifier.
    pub scenario_name: String,
    /// Identifier columns present for this scenario.
    pub context: BTreeMap<ContextColumn, Value>,
    /// Metric columns in table order.
    pub metrics: Vec<(String, Value)>,
}

/// One (scenario, metric) observation.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRow {
    /// Scenario identifier.
    pub scenario_name: String,
    /// Cells aligned with [`LongTable::context_columns`].
    pub context: Vec<Value>,
    /// Metric column name from the wide table.
    pub kpi_metric: String,
    /// Metric value.
    pub value: Value,
    /// Category inferred from the metric name.
    pub data_type: MetricCategory,
    /// Unit inferred from the metric name, [`rules::UNKNOWN_UNIT`] if none.
    pub unit: &'static str,
}

/// Long-format BI table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LongTable {
    /// Identifier columns present in the input, in [`ContextColumn::ALL`] order.
    pub context_columns: Vec<ContextColumn>,
    /// Rows sorted by scenario name, then metric name.
    pub rows: Vec<LongRow>,
}

impl LongTable {
    /// Column headers in output order.
    pub fn headers(&self) -> Vec<&'static str> {
        let mut headers = vec![SCENARIO_COLUMN];
        headers.extend(self.context_columns.iter().map(|c| c.header()));
        headers.extend([METRIC_COLUMN, VALUE_COLUMN, CATEGORY_COLUMN, UNIT_COLUMN]);
        headers
    }

    /// Rows tagged with the given category.
    pub fn filter_category(&self, category: MetricCategory) -> impl Iterator<Item = &LongRow> {
        self.rows.iter().filter(move |r| r.data_type == category)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl LongRow {
    /// Cells rendered as strings, aligned with [`LongTable::headers`].
    pub fn record(&self) -> Vec<String> {
        let mut record = Vec::with_capacity(self.context.len() + 5);
        record.push(self.scenario_name.clone());
        record.extend(self.context.iter().map(ToString::to_string));
        record.push(self.kpi_metric.clone());
        record.push(self.value.to_string());
        record.push(self.data_type.to_string());
        record.push(self.unit.to_string());
        record
    }
}
