//! Autarky wizard entry point: CLI wiring and session construction.

use std::path::Path;
use std::process;
use std::time::Duration;

use autarky_wizard::backend::LocalBackend;
use autarky_wizard::config::SessionConfig;
use autarky_wizard::io::export_profile;
use autarky_wizard::telemetry::init_tracing;
use autarky_wizard::wizard::{Navigation, Wizard, WizardState};

/// Parsed CLI arguments.
struct CliArgs {
    session_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    latency_override: Option<u64>,
    export_load: Option<String>,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: Option<u16>,
    #[cfg(feature = "tui")]
    tui: bool,
}

fn print_help() {
    eprintln!("autarky-wizard: energy system design input wizard");
    eprintln!();
    eprintln!("Usage: autarky-wizard [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --session <path>         Load session from TOML config file");
    eprintln!(
        "  --preset <name>          Use a built-in preset ({})",
        SessionConfig::PRESETS.join(", ")
    );
    eprintln!("  --seed <u64>             Override the fallback load profile seed");
    eprintln!("  --latency-ms <u64>       Override simulated handler latency");
    eprintln!("  --export-load <path>     Write the load profile that will be submitted to CSV");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Serve the REST API instead of walking the wizard");
        eprintln!("  --port <u16>             API server port (default from session: 3000)");
    }
    #[cfg(feature = "tui")]
    eprintln!("  --tui                    Run the interactive terminal wizard");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --session or --preset is given, the offgrid_solar preset is used.");
    eprintln!("Without --serve or --tui every step is submitted in order and each");
    eprintln!("acknowledgement is printed as one JSON line.");
}

/// Returns the value following a flag or exits with a message.
fn value<'a>(args: &'a [String], i: usize, flag: &str, what: &str) -> &'a str {
    match args.get(i) {
        Some(v) => v,
        None => {
            eprintln!("error: {flag} requires a {what} argument");
            process::exit(1);
        }
    }
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        session_path: None,
        preset: None,
        seed_override: None,
        latency_override: None,
        export_load: None,
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: None,
        #[cfg(feature = "tui")]
        tui: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--session" => {
                i += 1;
                cli.session_path = Some(value(&args, i, "--session", "path").to_string());
            }
            "--preset" => {
                i += 1;
                cli.preset = Some(value(&args, i, "--preset", "name").to_string());
            }
            "--seed" => {
                i += 1;
                let v = value(&args, i, "--seed", "u64");
                if let Ok(s) = v.parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{v}\" is not a valid u64");
                    process::exit(1);
                }
            }
            "--latency-ms" => {
                i += 1;
                let v = value(&args, i, "--latency-ms", "u64");
                if let Ok(ms) = v.parse::<u64>() {
                    cli.latency_override = Some(ms);
                } else {
                    eprintln!("error: --latency-ms value \"{v}\" is not a valid u64");
                    process::exit(1);
                }
            }
            "--export-load" => {
                i += 1;
                cli.export_load = Some(value(&args, i, "--export-load", "path").to_string());
            }
            #[cfg(feature = "api")]
            "--serve" => {
                cli.serve = true;
            }
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                let v = value(&args, i, "--port", "u16");
                if let Ok(p) = v.parse::<u16>() {
                    cli.port = Some(p);
                } else {
                    eprintln!("error: --port value \"{v}\" is not a valid u16");
                    process::exit(1);
                }
            }
            #[cfg(feature = "tui")]
            "--tui" => {
                cli.tui = true;
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    if cli.session_path.is_some() && cli.preset.is_some() {
        eprintln!("error: --session and --preset are mutually exclusive");
        process::exit(1);
    }

    cli
}

/// Submits every step in order, printing each acknowledgement.
async fn walk(state: WizardState, latency: Duration) -> Result<(), String> {
    let mut wizard = Wizard::new(state, LocalBackend::new(latency));
    loop {
        let step = wizard.step();
        let nav = wizard
            .next()
            .await
            .map_err(|e| format!("step {} rejected: {e}", step.number()))?;
        if let Some(ack) = wizard.last_acknowledgement() {
            println!("{ack}");
        }
        if nav == Navigation::Completed {
            return Ok(());
        }
    }
}

fn main() {
    let cli = parse_args();

    // Load config: --session takes priority, then --preset, then offgrid_solar
    let loaded = if let Some(ref path) = cli.session_path {
        SessionConfig::from_toml_file(Path::new(path))
    } else if let Some(ref name) = cli.preset {
        SessionConfig::from_preset(name)
    } else {
        Ok(SessionConfig::offgrid_solar())
    };
    let mut cfg = loaded.unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    if let Some(seed) = cli.seed_override {
        cfg.session.seed = seed;
    }
    if let Some(ms) = cli.latency_override {
        cfg.session.latency_ms = ms;
    }
    #[cfg(feature = "api")]
    if let Some(port) = cli.port {
        cfg.server.port = port;
    }

    let errors = cfg.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let state = cfg.build_state().unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });
    let latency = Duration::from_millis(cfg.session.latency_ms);

    if let Some(ref path) = cli.export_load {
        let profile = state.load.payload().load_profile;
        if let Err(e) = export_profile(&profile, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Load profile written to {path}");
    }

    // The terminal UI owns the screen, so no subscriber is installed for it.
    #[cfg(feature = "tui")]
    if cli.tui {
        if let Err(e) = autarky_wizard::tui::run(state, latency) {
            eprintln!("error: TUI crashed: {e}");
            process::exit(1);
        }
        return;
    }

    if let Err(e) = init_tracing(&cfg.logging) {
        eprintln!("warning: logging not initialised: {e}");
    }

    let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("error: failed to create tokio runtime: {e}");
        process::exit(1);
    });

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let host = &cfg.server.host;
        let addr: SocketAddr = match format!("{host}:{}", cfg.server.port).parse() {
            Ok(addr) => addr,
            Err(e) => {
                eprintln!("error: invalid server address {host}: {e}");
                process::exit(1);
            }
        };
        let state = Arc::new(autarky_wizard::api::AppState { latency });
        if let Err(e) = rt.block_on(autarky_wizard::api::serve(state, addr)) {
            eprintln!("error: server failed: {e}");
            process::exit(1);
        }
        return;
    }

    if let Err(e) = rt.block_on(walk(state, latency)) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
