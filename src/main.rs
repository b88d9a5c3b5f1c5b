//! merit-sim entry point: CLI wiring, case loading and batch output.

use std::io;
use std::path::Path;
use std::process;

use tracing::info;
use tracing_subscriber::EnvFilter;

use merit_sim::config::CaseConfig;
use merit_sim::io::export::{export_bi_csv, export_dispatch_csv, export_summary_csv};
use merit_sim::market::summary::{BatchOutcome, SummaryRow, run_batch};

/// Preset used when neither `--case` nor `--preset` is given.
const DEFAULT_PRESET: &str = "german_2024";

/// Parsed CLI arguments.
struct CliArgs {
    case_path: Option<String>,
    preset: Option<String>,
    scenario: Option<String>,
    summary_out: Option<String>,
    bi_out: Option<String>,
    dispatch_out: Option<String>,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: u16,
}

fn print_help() {
    eprintln!("merit-sim: merit-order dispatch and coal-to-gas switching analysis");
    eprintln!();
    eprintln!("Usage: merit-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --case <path>            Load plants and scenarios from a TOML case file");
    eprintln!(
        "  --preset <name>          Use a built-in case ({})",
        CaseConfig::PRESETS.join(", ")
    );
    eprintln!("  --scenario <name>        Print dispatch detail for one scenario only");
    eprintln!("  --summary-out <path>     Export the scenario summary to CSV");
    eprintln!("  --bi-out <path>          Export the long-format BI table to CSV");
    eprintln!("  --dispatch-out <path>    Export per-plant dispatch lines to CSV");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Start REST API server after the batch");
        eprintln!("  --port <u16>             API server port (default: 3000)");
    }
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --case or --preset is given, the {DEFAULT_PRESET} preset is used.");
    eprintln!("Logs go to stderr; set RUST_LOG (e.g. RUST_LOG=debug) to adjust verbosity.");
}

fn next_value(args: &[String], i: usize, flag: &str, what: &str) -> String {
    match args.get(i) {
        Some(v) => v.clone(),
        None => {
            eprintln!("error: {flag} requires {what}");
            process::exit(1);
        }
    }
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        case_path: None,
        preset: None,
        scenario: None,
        summary_out: None,
        bi_out: None,
        dispatch_out: None,
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: 3000,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--case" => {
                i += 1;
                cli.case_path = Some(next_value(&args, i, "--case", "a path argument"));
            }
            "--preset" => {
                i += 1;
                cli.preset = Some(next_value(&args, i, "--preset", "a name argument"));
            }
            "--scenario" => {
                i += 1;
                cli.scenario = Some(next_value(&args, i, "--scenario", "a name argument"));
            }
            "--summary-out" => {
                i += 1;
                cli.summary_out = Some(next_value(&args, i, "--summary-out", "a path argument"));
            }
            "--bi-out" => {
                i += 1;
                cli.bi_out = Some(next_value(&args, i, "--bi-out", "a path argument"));
            }
            "--dispatch-out" => {
                i += 1;
                cli.dispatch_out = Some(next_value(&args, i, "--dispatch-out", "a path argument"));
            }
            #[cfg(feature = "api")]
            "--serve" => {
                cli.serve = true;
            }
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                let value = next_value(&args, i, "--port", "a u16 argument");
                if let Ok(p) = value.parse::<u16>() {
                    cli.port = p;
                } else {
                    eprintln!("error: --port value \"{value}\" is not a valid u16");
                    process::exit(1);
                }
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    process::exit(1);
}

fn print_summary(rows: &[SummaryRow]) {
    println!("--- Scenario Summary ---");
    println!(
        "{:<20} {:>10} {:>10} {:>12} {:>9} {:>8} {:<16}",
        "Scenario", "Price", "CO2", "Emissions", "Intensity", "RE %", "Regime"
    );
    for r in rows {
        let regime = r.switching.as_ref().map(|s| s.market_regime.label());
        println!(
            "{:<20} {:>10.2} {:>10.2} {:>12.0} {:>9.1} {:>8.1} {:<16}",
            r.scenario_name,
            r.market_price_eur_mwh,
            r.carbon_price_eur_ton,
            r.total_emissions_tons,
            r.carbon_intensity_g_kwh,
            r.renewable_share_pct,
            regime.unwrap_or("-")
        );
    }
}

fn print_dispatch(outcome: &BatchOutcome, name: &str) {
    let Some(result) = outcome.result(name) else {
        fail(format_args!("unknown scenario \"{name}\""));
    };
    println!("{result}");
    for (rank, line) in result.dispatch.iter().enumerate() {
        let marker = if rank == result.marginal_rank {
            "  <- marginal"
        } else {
            ""
        };
        println!(
            "  {:>3}. {:<28} {:<11} SRMC={:>8.2}  avail={:>9.1}  dispatched={:>9.1}{}",
            rank + 1,
            line.plant_name,
            line.technology,
            line.srmc_eur_mwh,
            line.available_capacity_mw,
            line.dispatched_capacity_mw,
            marker
        );
    }
}

fn export(label: &str, path: Option<&str>, write: impl FnOnce(&Path) -> io::Result<()>) {
    if let Some(path) = path {
        if let Err(e) = write(Path::new(path)) {
            fail(format_args!("failed to write {label} CSV: {e}"));
        }
        info!(%path, "{label} written");
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = parse_args();

    // --case takes priority, then --preset, then the default preset
    let (case_name, config) = if let Some(ref path) = cli.case_path {
        match CaseConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => (path.clone(), cfg),
            Err(e) => fail(e),
        }
    } else {
        let name = cli.preset.as_deref().unwrap_or(DEFAULT_PRESET).to_string();
        match CaseConfig::from_preset(&name) {
            Ok(cfg) => (name, cfg),
            Err(e) => fail(e),
        }
    };

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let case = config.build().unwrap_or_else(|e| fail(e));
    info!(
        case = %case_name,
        plants = case.roster.len(),
        scenarios = case.scenarios.len(),
        "case loaded"
    );

    let outcome =
        run_batch(&case.roster, &case.scenarios, &case.switching).unwrap_or_else(|e| fail(e));

    match cli.scenario {
        Some(ref name) => print_dispatch(&outcome, name),
        None => {
            for r in &outcome.results {
                println!("{r}");
            }
        }
    }

    match &outcome.switching {
        Ok(sp) => println!("\n{sp}"),
        Err(e) => println!("\n--- Coal-to-Gas Switching Analysis ---\nunavailable: {e}"),
    }

    println!();
    print_summary(&outcome.summary);

    export("summary", cli.summary_out.as_deref(), |p| {
        export_summary_csv(&outcome.wide_rows(), p)
    });
    export("BI", cli.bi_out.as_deref(), |p| {
        export_bi_csv(&outcome.bi_export(), p)
    });
    export("dispatch", cli.dispatch_out.as_deref(), |p| {
        export_dispatch_csv(&outcome.results, p)
    });

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(merit_sim::api::AppState { case_name, outcome });
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new()
            .unwrap_or_else(|e| fail(format_args!("failed to create tokio runtime: {e}")));
        if let Err(e) = rt.block_on(merit_sim::api::serve(state, addr)) {
            fail(format_args!("server error: {e}"));
        }
    }
}
