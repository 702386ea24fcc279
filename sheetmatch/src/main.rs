use anyhow::{Context, Result};
use clap::Parser;
use sheetmatch_core::{Config, Location, Reconciler, rules, writer};
use std::path::PathBuf;

mod formatter;

#[derive(Parser)]
#[command(name = "sheetmatch")]
#[command(about = "Match identifiers against device inventory spreadsheets", long_about = None)]
#[command(version)]
struct Cli {
    /// User running the reconciliation
    #[arg(short, long)]
    user: String,

    /// Index of the configured input location (e.g. 0 for work, 1 for home)
    #[arg(
        short,
        long,
        required_unless_present_all = ["identifiers", "primary", "secondary"]
    )]
    location: Option<usize>,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Output CSV file
    #[arg(short, long, value_name = "FILE", default_value = "output.csv")]
    output: PathBuf,

    /// Identifier workbook (overrides the location)
    #[arg(long, value_name = "FILE")]
    identifiers: Option<PathBuf>,

    /// Device workbook (overrides the location)
    #[arg(long, value_name = "FILE")]
    primary: Option<PathBuf>,

    /// Model lookup workbook (overrides the location)
    #[arg(long, value_name = "FILE")]
    secondary: Option<PathBuf>,

    /// Show per-row matching details
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = load_config(cli.config.as_ref())?;
    config.validate().context("Invalid configuration")?;

    if !config.is_authorized(&cli.user) {
        println!("Invalid user");
        return Ok(());
    }

    let Some(location) = resolve_location(&config, &cli) else {
        println!("Invalid location");
        return Ok(());
    };

    let reconciler = Reconciler::with_config(config);
    let sheets = &reconciler.config().sources;
    log::debug!(
        "Sheets: identifiers '{}' (column '{}'), devices '{}', models '{}'",
        sheets.identifier_sheet,
        sheets.identifier_column,
        sheets.primary_sheet,
        sheets.secondary_sheet
    );
    log::debug!("Rules: {}", rules::registry::rule_ids().join(", "));

    let started = chrono::Local::now();
    formatter::print_start(&location, started);

    formatter::print_step("Extracting data from Excel files...");
    let sources = reconciler.load_sources(&location)?;
    log::info!(
        "Loaded {} identifiers, {} device rows, {} model rows",
        sources.identifiers.len(),
        sources.primary.rows.len(),
        sources.secondary.rows.len()
    );

    formatter::print_step("Finding matching values and models...");
    let matches = reconciler.find_matches(&sources);

    formatter::print_step("Formatting data...");
    let report = reconciler.categorize(&matches);

    formatter::print_step("Writing data to CSV file...\n");
    writer::write_report_to_path(&cli.output, &report)?;

    let output = cli.output.canonicalize().unwrap_or_else(|_| cli.output.clone());
    formatter::print_finish(&output, &report.summary(), chrono::Local::now());

    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    if let Some(config_path) = path {
        return Config::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()));
    }

    // Try to load default config from current directory if it exists
    let default_config_path = PathBuf::from("sheetmatch.toml");
    if default_config_path.exists() {
        Config::from_file(&default_config_path).with_context(|| {
            format!(
                "Failed to load config from {}",
                default_config_path.display()
            )
        })
    } else {
        Ok(Config::default())
    }
}

/// Pick the configured location and apply path overrides
fn resolve_location(config: &Config, cli: &Cli) -> Option<Location> {
    let base = match cli.location {
        Some(index) => config.location(index)?.clone(),
        None => Location {
            name: "command line".to_string(),
            identifiers: PathBuf::new(),
            primary: PathBuf::new(),
            secondary: PathBuf::new(),
        },
    };

    Some(Location {
        identifiers: cli.identifiers.clone().unwrap_or(base.identifiers),
        primary: cli.primary.clone().unwrap_or(base.primary),
        secondary: cli.secondary.clone().unwrap_or(base.secondary),
        name: base.name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_locations() -> Config {
        let mut config = Config::default();
        for name in ["work", "home"] {
            config.locations.push(Location {
                name: name.to_string(),
                identifiers: PathBuf::from(format!("{}/ids.xlsx", name)),
                primary: PathBuf::from(format!("{}/devices.xlsx", name)),
                secondary: PathBuf::from(format!("{}/models.xlsx", name)),
            });
        }
        config
    }

    #[test]
    fn test_cli_requires_location_or_paths() {
        assert!(Cli::try_parse_from(["sheetmatch", "--user", "a"]).is_err());
        assert!(Cli::try_parse_from(["sheetmatch", "--user", "a", "--location", "1"]).is_ok());
        assert!(
            Cli::try_parse_from([
                "sheetmatch",
                "--user",
                "a",
                "--identifiers",
                "i.xlsx",
                "--primary",
                "p.xlsx",
                "--secondary",
                "s.xlsx",
            ])
            .is_ok()
        );
        assert!(Cli::try_parse_from(["sheetmatch", "--user", "a", "--location", "x"]).is_err());
    }

    #[test]
    fn test_resolve_location() {
        let config = config_with_locations();
        let cli = Cli::try_parse_from(["sheetmatch", "-u", "a", "-l", "1"]).unwrap();
        let location = resolve_location(&config, &cli).unwrap();
        assert_eq!(location.name, "home");
        assert_eq!(location.primary, PathBuf::from("home/devices.xlsx"));

        let cli = Cli::try_parse_from(["sheetmatch", "-u", "a", "-l", "2"]).unwrap();
        assert!(resolve_location(&config, &cli).is_none());
    }

    #[test]
    fn test_path_overrides() {
        let config = config_with_locations();
        let cli = Cli::try_parse_from([
            "sheetmatch",
            "-u",
            "a",
            "-l",
            "0",
            "--primary",
            "other.xlsx",
        ])
        .unwrap();
        let location = resolve_location(&config, &cli).unwrap();
        assert_eq!(location.primary, PathBuf::from("other.xlsx"));
        assert_eq!(location.identifiers, PathBuf::from("work/ids.xlsx"));
    }
}
