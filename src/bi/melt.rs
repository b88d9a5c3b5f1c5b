//! Wide-to-long melt and its inverse.

use std::collections::BTreeMap;

use super::rules::{classify_metric, metric_unit};
use super::{ContextColumn, LongRow, LongTable, Value, WideRow};

/// Melts wide scenario rows into the long BI table.
///
/// Context columns present in any input row are carried on every output
/// row (as [`Value::Missing`] where a scenario lacks them). Output is
/// sorted by scenario name, then metric name; the sort is stable, so the
/// transformation is deterministic and idempotent.
pub fn melt(rows: &[WideRow]) -> LongTable {
    let context_columns: Vec<ContextColumn> = ContextColumn::ALL
        .into_iter()
        .filter(|c| rows.iter().any(|r| r.context.contains_key(c)))
        .collect();

    let mut long: Vec<LongRow> = rows
        .iter()
        .flat_map(|row| {
            let context: Vec<Value> = context_columns
                .iter()
                .map(|c| row.context.get(c).cloned().unwrap_or(Value::Missing))
                .collect();
            row.metrics.iter().map(move |(metric, value)| LongRow {
                scenario_name: row.scenario_name.clone(),
                context: context.clone(),
                kpi_metric: metric.clone(),
                value: value.clone(),
                data_type: classify_metric(metric),
                unit: metric_unit(metric),
            })
        })
        .collect();

    long.sort_by(|a, b| {
        a.scenario_name
            .cmp(&b.scenario_name)
            .then_with(|| a.kpi_metric.cmp(&b.kpi_metric))
    });

    LongTable {
        context_columns,
        rows: long,
    }
}

/// Reconstructs wide rows from a long table, one per scenario in order of
/// first appearance.
pub fn pivot(table: &LongTable) -> Vec<WideRow> {
    let mut wide: Vec<WideRow> = Vec::new();
    let mut index: BTreeMap<&str, usize> = BTreeMap::new();

    for row in &table.rows {
        let i = *index.entry(row.scenario_name.as_str()).or_insert_with(|| {
            let context = table
                .context_columns
                .iter()
                .zip(&row.context)
                .filter(|(_, v)| **v != Value::Missing)
                .map(|(c, v)| (*c, v.clone()))
                .collect();
            wide.push(WideRow {
                scenario_name: row.scenario_name.clone(),
                context,
                metrics: Vec::new(),
            });
            wide.len() - 1
        });
        let metric = (row.kpi_metric.clone(), row.value.clone());
        wide[i].metrics.push(metric);
    }

    wide
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bi::MetricCategory;

    fn wide(name: &str, season: Option<&str>) -> WideRow {
        let mut context = BTreeMap::new();
        context.insert(ContextColumn::DemandMw, Value::Number(500.0));
        if let Some(s) = season {
            context.insert(ContextColumn::Season, Value::from(s));
        }
        WideRow {
            scenario_name: name.to_string(),
            context,
            metrics: vec![
                ("Market_Price_EUR_MWh".to_string(), Value::Number(80.0)),
                ("Demand_Met".to_string(), Value::Flag(true)),
                ("Market_Regime".to_string(), Value::from("GAS-DOMINATED")),
            ],
        }
    }

    #[test]
    fn one_row_per_scenario_metric_pair() {
        let table = melt(&[wide("B", None), wide("A", Some("Winter"))]);
        assert_eq!(table.len(), 6);
        assert_eq!(
            table.context_columns,
            vec![ContextColumn::Season, ContextColumn::DemandMw]
        );
    }

    #[test]
    fn rows_sorted_by_scenario_then_metric() {
        let table = melt(&[wide("B", None), wide("A", None)]);
        let keys: Vec<(&str, &str)> = table
            .rows
            .iter()
            .map(|r| (r.scenario_name.as_str(), r.kpi_metric.as_str()))
            .collect();
        assert_eq!(
            keys,
            [
                ("A", "Demand_Met"),
                ("A", "Market_Price_EUR_MWh"),
                ("A", "Market_Regime"),
                ("B", "Demand_Met"),
                ("B", "Market_Price_EUR_MWh"),
                ("B", "Market_Regime"),
            ]
        );
    }

    #[test]
    fn missing_context_is_filled_with_missing() {
        let table = melt(&[wide("B", None), wide("A", Some("Winter"))]);
        let b = table.rows.iter().find(|r| r.scenario_name == "B").unwrap();
        assert_eq!(b.context[0], Value::Missing);
        let a = table.rows.iter().find(|r| r.scenario_name == "A").unwrap();
        assert_eq!(a.context[0], Value::from("Winter"));
    }

    #[test]
    fn rows_carry_category_and_unit() {
        let table = melt(&[wide("A", None)]);
        let price = table
            .rows
            .iter()
            .find(|r| r.kpi_metric == "Market_Price_EUR_MWh")
            .unwrap();
        assert_eq!(price.data_type, MetricCategory::Economic);
        assert_eq!(price.unit, "€");
        let regime = table
            .rows
            .iter()
            .find(|r| r.kpi_metric == "Market_Regime")
            .unwrap();
        assert_eq!(regime.data_type, MetricCategory::Other);
        assert_eq!(regime.unit, "-");
    }

    #[test]
    fn pivot_then_melt_reproduces_table() {
        let table = melt(&[wide("B", None), wide("A", Some("Winter"))]);
        assert_eq!(melt(&pivot(&table)), table);
    }

    #[test]
    fn empty_input_gives_empty_table() {
        let table = melt(&[]);
        assert!(table.is_empty());
        assert!(table.context_columns.is_empty());
        assert_eq!(
            table.headers(),
            ["Scenario_Name", "KPI_Metric", "Value", "Data_Type", "Unit"]
        );
    }
}
