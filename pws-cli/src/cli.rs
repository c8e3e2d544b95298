use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use inquire::Select;
use pws_core::{
    Dialect, Quantity, RawPayload, SourceDescriptor, Unit, UnitPreferences, WeatherReading,
    dispatch,
};
use serde::Serialize;
use std::{fs, path::PathBuf, sync::Arc};
use tracing::Level;

use crate::{
    config::Config,
    fetch::{HttpFetcher, PayloadFetcher, fetch_all},
    render::DisplayReading,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "pws", version, about = "Personal weather station CLI")]
pub struct Cli {
    /// Logging verbosity. Allowed values are 'trace', 'debug', 'info', 'warn', and 'error'
    /// (case insensitive)
    #[arg(long, global = true, default_value_t = Level::WARN)]
    pub log_level: Level,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage the configured stations.
    Station {
        #[command(subcommand)]
        command: StationCommand,
    },

    /// Choose the preferred display unit for each quantity.
    Units,

    /// Fetch and show the current reading of configured stations.
    Show {
        /// Only show this station.
        #[arg(long)]
        station: Option<String>,

        /// Print readings as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Parse a payload saved to a local file.
    Parse {
        file: PathBuf,

        /// URL or file name used to pick the dialect; defaults to FILE's name.
        #[arg(long)]
        url: Option<String>,

        /// Force a dialect: clientraw, realtime-txt or realtime-xml.
        #[arg(long, conflicts_with = "url")]
        dialect: Option<String>,

        /// Print the reading as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum StationCommand {
    /// Add a station, or change the URL of an existing one.
    Add {
        name: String,

        /// clientraw.txt, realtime.txt or realtime.xml URL, or the directory holding them.
        url: String,
    },

    /// Remove a station.
    Remove { name: String },

    /// List configured stations.
    List,
}

#[derive(Debug, Serialize)]
struct StationOutput<'a> {
    station: &'a str,
    reading: &'a WeatherReading,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Station { command } => run_station(command),
            Command::Units => run_units(),
            Command::Show { station, json } => run_show(station.as_deref(), json).await,
            Command::Parse {
                file,
                url,
                dialect,
                json,
            } => run_parse(file, url, dialect, json),
        }
    }
}

fn run_station(command: StationCommand) -> Result<()> {
    let mut config = Config::load()?;

    match command {
        StationCommand::Add { name, url } => {
            if Dialect::from_url(&url).is_none() {
                println!("No file suffix in {url}; realtime.txt and realtime.xml will be tried.");
            }
            config.upsert_station(name.clone(), url);
            config.save()?;
            println!("Saved station '{name}'.");
        }
        StationCommand::Remove { name } => {
            if !config.remove_station(&name) {
                return Err(anyhow!("Unknown station '{name}'."));
            }
            config.save()?;
            println!("Removed station '{name}'.");
        }
        StationCommand::List => {
            if config.stations.is_empty() {
                println!("No stations configured.");
            }
            for station in &config.stations {
                println!("{}\t{}", station.name, station.url);
            }
        }
    }

    Ok(())
}

fn run_units() -> Result<()> {
    let mut config = Config::load()?;
    config.units = prompt_units(config.units)?;
    config.save()?;

    println!(
        "Saved units: {}, {}, {}, {}.",
        config.units.temperature, config.units.pressure, config.units.rain, config.units.wind_speed
    );
    Ok(())
}

fn prompt_units(current: UnitPreferences) -> Result<UnitPreferences> {
    let mut prefs = current;

    for quantity in Quantity::all() {
        let options: Vec<Unit> = quantity.units().to_vec();
        let cursor = options
            .iter()
            .position(|unit| *unit == current.target(*quantity))
            .unwrap_or_default();

        let unit = Select::new(&format!("Preferred {quantity} unit:"), options)
            .with_starting_cursor(cursor)
            .prompt()
            .with_context(|| format!("Failed to read {quantity} unit choice"))?;
        prefs.set(unit);
    }

    Ok(prefs)
}

async fn run_show(station: Option<&str>, json: bool) -> Result<()> {
    let config = Config::load()?;
    let sources = config.selected_sources(station)?;
    let total = sources.len();

    let fetcher: Arc<dyn PayloadFetcher> = Arc::new(HttpFetcher::new()?);
    let results = fetch_all(fetcher, sources).await;

    let mut failures = 0;
    for (source, result) in &results {
        match result {
            Ok(reading) => print_reading(reading, source, &config.units, json)?,
            Err(err) => {
                failures += 1;
                eprintln!("{}: {err:#}", source.name);
            }
        }
    }

    if failures == total {
        return Err(anyhow!("No station could be read."));
    }
    Ok(())
}

fn run_parse(
    file: PathBuf,
    url: Option<String>,
    dialect: Option<String>,
    json: bool,
) -> Result<()> {
    let body = fs::read(&file)
        .with_context(|| format!("Failed to read payload file: {}", file.display()))?;

    let name = file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());
    let url = url.unwrap_or_else(|| {
        file.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    });
    let payload = RawPayload::new(SourceDescriptor::new(name, url), body);

    let reading = match dialect {
        Some(dialect) => Dialect::try_from(dialect.as_str())?
            .parser()
            .parse(&payload.text())?,
        None => dispatch(payload.clone())?,
    };

    let config = Config::load()?;
    print_reading(&reading, &payload.source, &config.units, json)
}

fn print_reading(
    reading: &WeatherReading,
    source: &SourceDescriptor,
    prefs: &UnitPreferences,
    json: bool,
) -> Result<()> {
    if json {
        let output = StationOutput {
            station: &source.name,
            reading,
        };
        let line = serde_json::to_string(&output).context("Failed to serialize reading to JSON")?;
        println!("{line}");
    } else {
        println!("{}", DisplayReading::new(reading, source, prefs));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_show_with_global_log_level() {
        let cli = Cli::try_parse_from(["pws", "show", "--station", "Home", "--log-level", "debug"])
            .unwrap();

        assert_eq!(cli.log_level, Level::DEBUG);
        assert!(matches!(
            cli.command,
            Command::Show { station: Some(ref s), json: false } if s == "Home"
        ));
    }

    #[test]
    fn parse_rejects_url_and_dialect_together() {
        let res = Cli::try_parse_from([
            "pws",
            "parse",
            "wx.txt",
            "--url",
            "x.xml",
            "--dialect",
            "clientraw",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn station_add_takes_name_and_url() {
        let cli = Cli::try_parse_from(["pws", "station", "add", "Home", "http://wx/realtime.txt"])
            .unwrap();

        match cli.command {
            Command::Station {
                command: StationCommand::Add { name, url },
            } => {
                assert_eq!(name, "Home");
                assert_eq!(url, "http://wx/realtime.txt");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
