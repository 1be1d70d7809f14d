//! Estimator entry point — CLI wiring and scenario-driven estimate runs.

use std::path::Path;
use std::process;

use peakshave::config::ScenarioConfig;
use peakshave::io::export::export_projection_csv;
use peakshave::report::EstimateReport;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    usage_override: Option<f32>,
    production_override: Option<f32>,
    plan_override: Option<String>,
    battery_override: Vec<String>,
    ai_mode_override: Option<bool>,
    net_cost_override: Option<f32>,
    csv_out: Option<String>,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: u16,
}

fn print_help() {
    eprintln!("peakshave — solar + battery peak-shaving savings estimator");
    eprintln!();
    eprintln!("Usage: peakshave [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>     Load scenario from TOML config file");
    eprintln!("  --preset <name>       Use a built-in preset (baseline, ulo_arbitrage, alberta)");
    eprintln!("  --usage <kwh>         Override annual usage");
    eprintln!("  --production <kwh>    Override annual solar production");
    eprintln!("  --plan <name>         Override rate plan (tou, ulo, flat)");
    eprintln!("  --battery <id>        Add a catalog battery (repeatable, replaces selection)");
    eprintln!("  --ai-mode <on|off>    Override grid-charge arbitrage");
    eprintln!("  --net-cost <dollars>  Override net system cost");
    eprintln!("  --csv-out <path>      Export the projection table to CSV");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve               Start REST API server instead of printing");
        eprintln!("  --port <u16>          API server port (default: 3000)");
    }
    eprintln!("  --help                Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
}

fn parse_f32(args: &[String], i: usize, flag: &str) -> f32 {
    let Some(raw) = args.get(i) else {
        eprintln!("error: {flag} requires a numeric argument");
        process::exit(1);
    };
    match raw.parse::<f32>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            eprintln!("error: {flag} value \"{raw}\" is not a valid number");
            process::exit(1);
        }
    }
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        usage_override: None,
        production_override: None,
        plan_override: None,
        battery_override: Vec::new(),
        ai_mode_override: None,
        net_cost_override: None,
        csv_out: None,
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
            "--scenario" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --scenario requires a path argument");
                    process::exit(1);
                }
                cli.scenario_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--usage" => {
                i += 1;
                cli.usage_override = Some(parse_f32(&args, i, "--usage"));
            }
            "--production" => {
                i += 1;
                cli.production_override = Some(parse_f32(&args, i, "--production"));
            }
            "--plan" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --plan requires a name argument");
                    process::exit(1);
                }
                cli.plan_override = Some(args[i].clone());
            }
            "--battery" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --battery requires a catalog id argument");
                    process::exit(1);
                }
                cli.battery_override.push(args[i].clone());
            }
            "--ai-mode" => {
                i += 1;
                match args.get(i).map(String::as_str) {
                    Some("on") => cli.ai_mode_override = Some(true),
                    Some("off") => cli.ai_mode_override = Some(false),
                    _ => {
                        eprintln!("error: --ai-mode requires `on` or `off`");
                        process::exit(1);
                    }
                }
            }
            "--net-cost" => {
                i += 1;
                cli.net_cost_override = Some(parse_f32(&args, i, "--net-cost"));
            }
            "--csv-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --csv-out requires a path argument");
                    process::exit(1);
                }
                cli.csv_out = Some(args[i].clone());
            }
            #[cfg(feature = "api")]
            "--serve" => {
                cli.serve = true;
            }
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --port requires a u16 argument");
                    process::exit(1);
                }
                if let Ok(p) = args[i].parse::<u16>() {
                    cli.port = p;
                } else {
                    eprintln!("error: --port value \"{}\" is not a valid u16", args[i]);
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

fn main() {
    let cli = parse_args();

    // Load config: --scenario takes priority, then --preset, then baseline
    let mut scenario = if let Some(ref path) = cli.scenario_path {
        match ScenarioConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match ScenarioConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        ScenarioConfig::baseline()
    };

    // Apply CLI overrides
    if let Some(usage) = cli.usage_override {
        scenario.site.annual_usage_kwh = usage;
    }
    if let Some(production) = cli.production_override {
        scenario.site.solar_production_kwh = production;
    }
    if let Some(ref plan) = cli.plan_override {
        scenario.plan.name = plan.clone();
    }
    if !cli.battery_override.is_empty() {
        scenario.batteries.ids = cli.battery_override.clone();
    }
    if let Some(ai_mode) = cli.ai_mode_override {
        scenario.control.ai_mode = ai_mode;
    }
    if let Some(net_cost) = cli.net_cost_override {
        scenario.financial.net_cost_dollars = net_cost;
    }

    // Validate; soft issues print but do not block
    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    for w in scenario.warnings() {
        eprintln!("warning: {w}");
    }

    // Run the estimate
    let report = match EstimateReport::from_scenario(&scenario) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    // Start API server if requested
    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(peakshave::api::AppState { scenario });
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        rt.block_on(peakshave::api::serve(state, addr));
        return;
    }

    println!("{report}");

    // Export CSV if requested
    if let Some(ref path) = cli.csv_out {
        if let Err(e) = export_projection_csv(&report.projection, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Projection written to {path}");
    }
}
