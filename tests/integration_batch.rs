//! Integration tests for batch runs over the built-in cases.

mod common;

use merit_sim::ValidationError;
use merit_sim::bi::{self, MetricCategory};
use merit_sim::io::export::{write_bi_csv, write_summary_csv};
use merit_sim::market::regime::MarketRegime;
use merit_sim::market::summary::run_batch;
use merit_sim::market::switching::{SwitchingConfig, SwitchingPriceResult};
use merit_sim::market::types::{Plant, PlantRoster, Scenario, Technology};

#[test]
fn reference_pair_switching_price() {
    let sp = SwitchingPriceResult::compute(&common::reference_pair(), &SwitchingConfig::default())
        .unwrap();
    let expected = ((45.0 / 0.55) - (25.0 / 0.38)) / ((0.34 / 0.38) - (0.20 / 0.55));
    assert!((sp.switching_price_eur_ton - expected).abs() < 1e-9);
    assert!(sp.formula_validated);

    let (coal, gas) = sp.costs_at(sp.switching_price_eur_ton);
    assert!((coal - gas).abs() < 0.01);
}

#[test]
fn german_preset_clears_every_scenario() {
    let case = common::german_case();
    let outcome = run_batch(&case.roster, &case.scenarios, &case.switching).unwrap();

    assert_eq!(outcome.results.len(), 6);
    assert!(outcome.results.iter().all(|r| r.demand_met));

    let extreme = outcome.result("Extreme_Peak").unwrap();
    assert_eq!(extreme.marginal_technology, Technology::GasPeaker);
    let max_price = outcome
        .results
        .iter()
        .map(|r| r.market_price_eur_mwh)
        .fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(extreme.market_price_eur_mwh, max_price);

    let windy = outcome.result("High_Wind_Day").unwrap();
    let winter = outcome.result("Peak_Load_Winter").unwrap();
    assert!(windy.market_price_eur_mwh < winter.market_price_eur_mwh);
    assert!(windy.renewable_share_pct > winter.renewable_share_pct);
}

#[test]
fn german_preset_regimes_straddle_switching_price() {
    let case = common::german_case();
    let outcome = run_batch(&case.roster, &case.scenarios, &case.switching).unwrap();
    let sp = outcome.switching.as_ref().unwrap();
    assert!((sp.switching_price_eur_ton - 65.414).abs() < 0.01);

    let regime = |name: &str| {
        outcome
            .summary_row(name)
            .and_then(|r| r.switching.as_ref())
            .map(|s| s.market_regime)
    };
    assert_eq!(
        regime("Low_Carbon_Price"),
        Some(MarketRegime::CoalDominated)
    );
    assert_eq!(
        regime("Base_Load_Summer"),
        Some(MarketRegime::CoalDominated)
    );
    assert_eq!(regime("Extreme_Peak"), Some(MarketRegime::GasDominated));

    for row in &outcome.summary {
        let sw = row.switching.as_ref().unwrap();
        let below = row.carbon_price_eur_ton < sw.switching_price_eur_ton;
        assert_eq!(below, sw.market_regime == MarketRegime::CoalDominated);
        assert!(sw.carbon_price_vs_switching_pct.is_some());
    }
}

#[test]
fn renewables_only_roster_still_clears() {
    let roster = PlantRoster::new(vec![
        Plant::new("Wind_1", Technology::Wind, 1_000.0, 0.0),
        Plant::new("Hydro_1", Technology::Hydro, 300.0, 0.0),
    ])
    .unwrap();
    let scenarios = [Scenario::new("Calm", 900.0, 80.0, 0.2, 0.0)];
    let outcome = run_batch(&roster, &scenarios, &SwitchingConfig::default()).unwrap();

    assert_eq!(outcome.switching, Err(ValidationError::NoCoalPlants));
    let r = &outcome.results[0];
    assert!(!r.demand_met);
    assert_eq!(r.total_generation_mw, 500.0);
    assert_eq!(r.total_emissions_tons, 0.0);
    assert_eq!(r.marginal_plant_name, "Hydro_1");
    assert!(outcome.summary[0].switching.is_none());
}

#[test]
fn batch_rejects_repeated_scenario_names() {
    let case = common::german_case();
    let mut scenarios = case.scenarios.clone();
    scenarios.push(case.scenarios[0].clone());

    let err = run_batch(&case.roster, &scenarios, &case.switching).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidScenario { .. }), "{err}");
}

#[test]
fn zero_gas_efficiency_disables_switching_analysis() {
    let case = common::german_case();
    let config = SwitchingConfig {
        gas_efficiency: 0.0,
        ..case.switching
    };
    let outcome = run_batch(&case.roster, &case.scenarios, &config).unwrap();

    assert!(matches!(
        outcome.switching,
        Err(ValidationError::InvalidSwitchingConfig {
            field: "gas_efficiency",
            ..
        })
    ));
    assert!(outcome.summary.iter().all(|row| row.switching.is_none()));
}

#[test]
fn bi_export_is_idempotent_under_pivot() {
    let case = common::german_case();
    let outcome = run_batch(&case.roster, &case.scenarios, &case.switching).unwrap();
    let table = outcome.bi_export();

    assert_eq!(table.len(), 6 * 13);
    assert_eq!(bi::melt(&bi::pivot(&table)), table);

    let sorted = table.rows.windows(2).all(|w| {
        (&w[0].scenario_name, &w[0].kpi_metric) <= (&w[1].scenario_name, &w[1].kpi_metric)
    });
    assert!(sorted);
}

#[test]
fn bi_categories_cover_summary_metrics() {
    let case = common::german_case();
    let outcome = run_batch(&case.roster, &case.scenarios, &case.switching).unwrap();
    let table = outcome.bi_export();

    let category = |metric: &str| {
        table
            .rows
            .iter()
            .find(|r| r.kpi_metric == metric)
            .map(|r| (r.data_type, r.unit))
    };
    assert_eq!(
        category("Market_Price_EUR_MWh"),
        Some((MetricCategory::Economic, "€"))
    );
    assert_eq!(
        category("Total_Emissions_tons"),
        Some((MetricCategory::Environmental, "tons CO₂"))
    );
    assert_eq!(
        category("Total_Generation_MW"),
        Some((MetricCategory::Technical, "MW"))
    );
    assert_eq!(
        category("Market_Regime"),
        Some((MetricCategory::Other, "-"))
    );
    // Marginal_Plant, Marginal_Technology and Market_Regime
    assert_eq!(table.filter_category(MetricCategory::Other).count(), 6 * 3);
}

#[test]
fn csv_exports_are_byte_identical_across_runs() {
    let case = common::german_case();
    let run = || {
        let outcome = run_batch(&case.roster, &case.scenarios, &case.switching).unwrap();
        let mut summary = Vec::new();
        let mut bi = Vec::new();
        write_summary_csv(&outcome.wide_rows(), &mut summary).unwrap();
        write_bi_csv(&outcome.bi_export(), &mut bi).unwrap();
        (summary, bi)
    };
    assert_eq!(run(), run());
}
