use anyhow::{bail, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use gt_cli::{
    detect_orphans, discover_services, render_orphans, render_service, validate_service, write_json, Config,
    JsonReport, CONFIG_FILENAME, ORPHANS_FILENAME, REPORT_FILENAME,
};
use gt_registry::{Registry, RegistryClient};
use gt_validate::ServiceReport;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn output_arg() -> Arg {
    Arg::new("output")
        .long("output")
        .value_parser(["console", "json"])
        .default_value("console")
        .help("Output format")
}

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .value_parser(clap::value_parser!(PathBuf))
        .default_value(CONFIG_FILENAME)
        .help("Config file path")
}

fn cli() -> Command {
    Command::new("golden-thread")
        .version(gt_cli::VERSION)
        .about("Golden Thread - code traceability validation")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("validate")
                .about("Validate traceability coverage for services")
                .arg(
                    Arg::new("service")
                        .long("service")
                        .value_parser(clap::value_parser!(PathBuf))
                        .conflicts_with("all")
                        .help("Path to the service directory"),
                )
                .arg(
                    Arg::new("all")
                        .long("all")
                        .action(ArgAction::SetTrue)
                        .help("Validate every service under the configured roots"),
                )
                .arg(output_arg())
                .arg(
                    Arg::new("strict")
                        .long("strict")
                        .action(ArgAction::SetTrue)
                        .help("Fail on warnings"),
                )
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("orphans")
                .about("Detect orphaned code and manifest entries")
                .arg(
                    Arg::new("service")
                        .long("service")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Service path to check (defaults to the current directory)"),
                )
                .arg(output_arg())
                .arg(config_arg()),
        )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &ArgMatches) -> Result<Config> {
    let path = args
        .get_one::<PathBuf>("config")
        .map_or_else(|| PathBuf::from(CONFIG_FILENAME), Clone::clone);
    Config::load(&path).with_context(|| format!("failed to load configuration from {}", path.display()))
}

fn json_output(args: &ArgMatches) -> bool {
    args.get_one::<String>("output").is_some_and(|o| o == "json")
}

/// Returns whether every service passed
fn run_validate(args: &ArgMatches) -> Result<bool> {
    let config = load_config(args)?;
    let strict = args.get_flag("strict") || config.validation.strict_mode;

    let services = if args.get_flag("all") {
        println!("Validating all services...");
        let found = discover_services(
            &config.services.discovery.root_directories,
            &config.services.discovery.manifest_filename,
        );
        if found.is_empty() {
            bail!("no services found with {}", config.services.discovery.manifest_filename);
        }
        found
    } else if let Some(service) = args.get_one::<PathBuf>("service") {
        vec![service.clone()]
    } else {
        bail!("specify --service or --all");
    };

    let client = RegistryClient::new(config.registry.client_config()).context("failed to build registry client")?;
    let registry = Registry::new(client, &config.registry.databases);

    let mut reports = Vec::with_capacity(services.len());
    for service in &services {
        if !json_output(args) {
            println!("Validating {}...", service.display());
        }
        let report = validate_service(service, &config, &registry)
            .with_context(|| format!("failed to validate {}", service.display()))?;
        reports.push(report);
    }

    if json_output(args) {
        let combined = ServiceReport::combine(&reports);
        let path = write_json(
            &config.reports.output_directory,
            REPORT_FILENAME,
            &JsonReport::new(&combined, chrono::Utc::now()),
        )?;
        println!("Report saved to {}", path.display());
    } else {
        for report in &reports {
            print!("{}", render_service(report, strict));
        }
    }

    Ok(reports.iter().all(|r| r.passes(strict)))
}

fn run_orphans(args: &ArgMatches) -> Result<()> {
    let config = load_config(args)?;
    let service = match args.get_one::<PathBuf>("service") {
        Some(path) => path.clone(),
        None => std::env::current_dir().context("failed to read the current directory")?,
    };

    let manifest_path = service.join(&config.services.discovery.manifest_filename);
    if !manifest_path.is_file() {
        bail!("no manifest found at {}", manifest_path.display());
    }

    println!("Parsing codebase...");
    let result = detect_orphans(&service, &config)?;

    if json_output(args) {
        let path = write_json(&config.reports.output_directory, ORPHANS_FILENAME, &result)?;
        println!("Report saved to {}", path.display());
    } else {
        print!("{}", render_orphans(&result));
    }
    Ok(())
}

fn main() {
    init_tracing();
    let matches = cli().get_matches();

    let outcome = match matches.subcommand() {
        Some(("validate", args)) => run_validate(args),
        Some(("orphans", args)) => run_orphans(args).map(|()| true),
        _ => unreachable!("a subcommand is required"),
    };

    match outcome {
        Ok(passed) => std::process::exit(if passed { 0 } else { 1 }),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}
