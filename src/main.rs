//! Wind farm simulator entry point: CLI wiring and scenario execution.

use std::path::Path;
use std::process;

use anyhow::{Context, bail};
use tracing::info;

use windfarm_sim::config::ScenarioConfig;
use windfarm_sim::io::export::export_csv;
use windfarm_sim::io::report::export_json;
use windfarm_sim::logging;
use windfarm_sim::runner::{RunReport, run_scenario};

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    weather_csv: Option<String>,
    telemetry_out: Option<String>,
    report_out: Option<String>,
}

fn print_help() {
    eprintln!("windfarm-sim: 24-hour wind farm, battery and community load simulator");
    eprintln!();
    eprintln!("Usage: windfarm-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!(
        "  --preset <name>          Use a built-in preset ({})",
        ScenarioConfig::PRESETS.join(", ")
    );
    eprintln!("  --seed <u64>             Override random seed");
    eprintln!("  --weather-csv <path>     Read hourly wind from a CSV file");
    eprintln!("  --telemetry-out <path>   Export hourly results to CSV");
    eprintln!("  --report-out <path>      Export the full run report to JSON");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
    eprintln!("Set RUST_LOG (e.g. RUST_LOG=debug) to control log verbosity.");
}

/// Returns the value following a flag, or exits with a usage error.
fn flag_value(args: &[String], i: usize, flag: &str, what: &str) -> String {
    match args.get(i) {
        Some(v) => v.clone(),
        None => {
            eprintln!("error: {flag} requires a {what} argument");
            process::exit(1);
        }
    }
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        weather_csv: None,
        telemetry_out: None,
        report_out: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                cli.scenario_path = Some(flag_value(&args, i, "--scenario", "path"));
            }
            "--preset" => {
                i += 1;
                cli.preset = Some(flag_value(&args, i, "--preset", "name"));
            }
            "--seed" => {
                i += 1;
                let raw = flag_value(&args, i, "--seed", "u64");
                if let Ok(s) = raw.parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{raw}\" is not a valid u64");
                    process::exit(1);
                }
            }
            "--weather-csv" => {
                i += 1;
                cli.weather_csv = Some(flag_value(&args, i, "--weather-csv", "path"));
            }
            "--telemetry-out" => {
                i += 1;
                cli.telemetry_out = Some(flag_value(&args, i, "--telemetry-out", "path"));
            }
            "--report-out" => {
                i += 1;
                cli.report_out = Some(flag_value(&args, i, "--report-out", "path"));
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

/// Resolves the scenario: `--scenario` wins over `--preset`, then baseline.
fn load_scenario(cli: &CliArgs) -> anyhow::Result<ScenarioConfig> {
    let mut scenario = if let Some(ref path) = cli.scenario_path {
        ScenarioConfig::from_toml_file(Path::new(path))?
    } else if let Some(ref name) = cli.preset {
        ScenarioConfig::from_preset(name)?
    } else {
        ScenarioConfig::baseline()
    };

    if let Some(seed) = cli.seed_override {
        scenario.simulation.seed = seed;
    }
    if let Some(ref path) = cli.weather_csv {
        scenario.weather.source = "csv".to_string();
        scenario.weather.csv_path = Some(path.clone());
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        bail!("scenario has {} invalid field(s)", errors.len());
    }
    Ok(scenario)
}

fn print_report(report: &RunReport) {
    for r in &report.results {
        println!("{r}");
    }

    println!("\n{}", report.summary);

    println!("\n--- Maintenance Windows ---");
    if report.maintenance_windows.is_empty() {
        println!("(none)");
    }
    for (rank, w) in report.maintenance_windows.iter().enumerate() {
        println!(
            "#{} {:02}:00-{:02}:00  score={:.3}  lost={:.1} MWh  wind={:.1} m/s  demand={:.1} MW",
            rank + 1,
            w.start_hour,
            w.end_hour,
            w.score,
            w.lost_generation_mwh,
            w.avg_wind_speed_mps,
            w.avg_demand_mw
        );
    }

    if !report.alerts.is_empty() {
        println!("\n--- Alerts ---");
        for a in &report.alerts {
            println!("{a}");
        }
    }
}

fn run(cli: &CliArgs) -> anyhow::Result<()> {
    let scenario = load_scenario(cli)?;
    let report = run_scenario(&scenario).context("simulation failed")?;

    print_report(&report);

    if let Some(ref path) = cli.telemetry_out {
        export_csv(&report.results, Path::new(path))
            .with_context(|| format!("failed to write CSV to {path}"))?;
        info!(path = %path, "telemetry written");
    }
    if let Some(ref path) = cli.report_out {
        export_json(&report, Path::new(path))
            .with_context(|| format!("failed to write report to {path}"))?;
        info!(path = %path, "report written");
    }
    Ok(())
}

fn main() {
    let cli = parse_args();
    logging::init();

    if let Err(e) = run(&cli) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
