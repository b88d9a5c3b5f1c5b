//! CSV export for scenario summaries, the BI long table and dispatch lines.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::bi::{ContextColumn, LongTable, SCENARIO_COLUMN, Value, WideRow};
use crate::market::types::DispatchResult;

/// Column header for dispatch line export.
const DISPATCH_HEADER: &str = "Scenario_Name,Merit_Rank,Plant_Name,Technology,SRMC_EUR_MWh,\
                               Available_Capacity_MW,Dispatched_Capacity_MW,Is_Dispatched";

fn create(path: &Path) -> io::Result<io::BufWriter<File>> {
    Ok(io::BufWriter::new(File::create(path)?))
}

/// Exports wide summary rows to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_summary_csv(rows: &[WideRow], path: &Path) -> io::Result<()> {
    write_summary_csv(rows, create(path)?)
}

/// Writes wide summary rows as CSV to any writer.
///
/// Columns are `Scenario_Name`, the context columns present in any row,
/// then every metric in order of first appearance. Cells a row lacks are
/// left empty.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_summary_csv(rows: &[WideRow], writer: impl Write) -> io::Result<()> {
    let context: Vec<ContextColumn> = ContextColumn::ALL
        .into_iter()
        .filter(|c| rows.iter().any(|r| r.context.contains_key(c)))
        .collect();
    let mut metrics: Vec<&str> = Vec::new();
    for (name, _) in rows.iter().flat_map(|r| &r.metrics) {
        if !metrics.contains(&name.as_str()) {
            metrics.push(name);
        }
    }

    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    let mut header = vec![SCENARIO_COLUMN];
    header.extend(context.iter().map(|c| c.header()));
    header.extend(metrics.iter().copied());
    wtr.write_record(&header)?;

    for row in rows {
        let mut record = Vec::with_capacity(header.len());
        record.push(row.scenario_name.clone());
        for column in &context {
            let cell = row.context.get(column).map(ToString::to_string);
            record.push(cell.unwrap_or_default());
        }
        record.extend(metrics.iter().map(|m| {
            row.metrics
                .iter()
                .find(|(name, _)| name == m)
                .map_or(Value::Missing, |(_, v)| v.clone())
                .to_string()
        }));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports the BI long table to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_bi_csv(table: &LongTable, path: &Path) -> io::Result<()> {
    write_bi_csv(table, create(path)?)
}

/// Writes the BI long table as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_bi_csv(table: &LongTable, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(table.headers())?;
    for row in &table.rows {
        wtr.write_record(row.record())?;
    }
    wtr.flush()?;
    Ok(())
}

/// Exports the dispatch lines of every result to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_dispatch_csv(results: &[DispatchResult], path: &Path) -> io::Result<()> {
    write_dispatch_csv(results, create(path)?)
}

/// Writes one row per (scenario, plant) in merit order, ranks starting at 1.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_dispatch_csv(results: &[DispatchResult], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(DISPATCH_HEADER.split(',').map(str::trim))?;

    for result in results {
        for (rank, line) in result.dispatch.iter().enumerate() {
            wtr.write_record(&[
                result.scenario_name.clone(),
                (rank + 1).to_string(),
                line.plant_name.clone(),
                line.technology.to_string(),
                format!("{:.4}", line.srmc_eur_mwh),
                format!("{:.4}", line.available_capacity_mw),
                format!("{:.4}", line.dispatched_capacity_mw),
                line.is_dispatched.to_string(),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::bi::melt;
    use crate::market::dispatch_scenario;
    use crate::market::types::{Plant, PlantRoster, Scenario, Technology};

    fn wide(name: &str, with_regime: bool) -> WideRow {
        let mut context = BTreeMap::new();
        context.insert(ContextColumn::DemandMw, Value::Number(750.0));
        let mut metrics = vec![
            ("Market_Price_EUR_MWh".to_string(), Value::Number(81.5)),
            ("Marginal_Plant".to_string(), Value::from("Gas, CCGT")),
        ];
        if with_regime {
            metrics.push(("Market_Regime".to_string(), Value::from("GAS-DOMINATED")));
        }
        WideRow {
            scenario_name: name.to_string(),
            context,
            metrics,
        }
    }

    fn lines(buf: Vec<u8>) -> Vec<String> {
        String::from_utf8(buf)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn summary_header_is_union_of_columns() {
        let mut buf = Vec::new();
        write_summary_csv(&[wide("A", false), wide("B", true)], &mut buf).ok();
        let out = lines(buf);
        assert_eq!(
            out[0],
            "Scenario_Name,Demand_MW,Market_Price_EUR_MWh,Marginal_Plant,Market_Regime"
        );
        // Missing cell stays empty; commas in values are quoted.
        assert_eq!(out[1], "A,750,81.5,\"Gas, CCGT\",");
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn bi_export_is_byte_identical_across_runs() {
        let rows = [wide("B", true), wide("A", false)];
        let mut buf1 = Vec::new();
        let mut buf2 = Vec::new();
        write_bi_csv(&melt(&rows), &mut buf1).ok();
        write_bi_csv(&melt(&rows), &mut buf2).ok();
        assert_eq!(buf1, buf2);
        let out = lines(buf1);
        assert_eq!(
            out[0],
            "Scenario_Name,Demand_MW,KPI_Metric,Value,Data_Type,Unit"
        );
        assert_eq!(out[1], "A,750,Marginal_Plant,\"Gas, CCGT\",Other,-");
        assert_eq!(out.len(), 1 + 5);
    }

    #[test]
    fn dispatch_rows_follow_merit_order() {
        let roster = PlantRoster::new(vec![
            Plant::new("Gas_1", Technology::Gas, 500.0, 45.0),
            Plant::new("Wind_1", Technology::Wind, 300.0, 0.0),
        ])
        .unwrap();
        let scenario = Scenario::new("S", 400.0, 60.0, 0.5, 0.0);
        let result = dispatch_scenario(&roster, &scenario).unwrap();
        let mut buf = Vec::new();
        write_dispatch_csv(&[result], &mut buf).ok();

        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        assert_eq!(rdr.headers().map(csv::StringRecord::len).ok(), Some(8));
        let records: Vec<csv::StringRecord> = rdr.records().filter_map(Result::ok).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][1], "1");
        assert_eq!(&records[0][2], "Wind_1");
        assert_eq!(&records[0][6], "150.0000");
        assert_eq!(&records[1][2], "Gas_1");
        assert_eq!(&records[1][6], "250.0000");
        assert_eq!(&records[1][7], "true");
    }

    #[test]
    fn empty_inputs_write_header_only() {
        let mut buf = Vec::new();
        write_dispatch_csv(&[], &mut buf).ok();
        assert_eq!(lines(buf).len(), 1);
    }
}
