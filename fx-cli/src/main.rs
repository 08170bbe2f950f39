//! FX Convert CLI
//!
//! Applies field-level currency conversions to JSON records.

mod config;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use currency_codes::CurrencyCode;
use fx_client::HttpRateResolver;
use fx_engine::{CurrencyConverter, StaticRates};
use fx_types::{ConversionReport, RateResolver};

use config::{Config, ConversionFile};

#[derive(Parser)]
#[command(name = "fx-convert")]
#[command(author, version, about = "Field-level currency conversion for JSON records", long_about = None)]
struct Cli {
    /// JSON file of fixed rates keyed by pair, e.g. {"USD_EUR": 0.85}
    #[arg(long, env = "FX_RATES_FILE", conflicts_with = "rates_url")]
    rates: Option<PathBuf>,

    /// Base URL of a rates API
    #[arg(long, env = "FX_RATES_URL")]
    rates_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a JSON record (or array of records)
    Convert {
        /// Mapping file with `mappings` and optional `options`
        #[arg(long)]
        config: PathBuf,
        /// Input file; stdin when omitted
        input: Option<PathBuf>,
        /// Print the per-field outcome to stderr
        #[arg(long)]
        report: bool,
    },
    /// Look up a single rate
    Rate {
        from: String,
        to: String,
        /// Day of the rate (YYYY-MM-DD); today when omitted
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List the built-in currency codes
    Currencies,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,fx_engine=debug".into());

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

fn build_resolver(cli: &Cli, config: &Config) -> Result<Arc<dyn RateResolver>> {
    if let Some(path) = &cli.rates {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading rates file {}", path.display()))?;
        let pairs: Vec<(String, f64)> = serde_json::from_str::<serde_json::Map<String, Value>>(&raw)
            .with_context(|| format!("parsing rates file {}", path.display()))?
            .into_iter()
            .map(|(pair, rate)| {
                rate.as_f64()
                    .map(|rate| (pair.clone(), rate))
                    .with_context(|| format!("rate for {pair} is not a number"))
            })
            .collect::<Result<_>>()?;
        let rates = StaticRates::from_pairs(pairs)?;
        tracing::info!("Loaded {} fixed rates from {}", rates.len(), path.display());
        return Ok(Arc::new(rates));
    }

    if let Some(url) = &cli.rates_url {
        let timeout = Duration::from_secs(config.rates_timeout_secs);
        tracing::info!("Using rates API at {}", url);
        return Ok(Arc::new(HttpRateResolver::with_timeout(url.as_str(), timeout)?));
    }

    anyhow::bail!("No rate source: pass --rates <file> or --rates-url <url>")
}

fn read_input(input: Option<&Path>) -> Result<Value> {
    let raw = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading input {}", path.display()))?,
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("reading stdin")?;
            raw
        }
    };
    serde_json::from_str(&raw).context("input is not valid JSON")
}

fn print_report(index: usize, report: &ConversionReport) {
    for field in &report.fields {
        eprintln!("[{}] {}: {}", index, field.target_path, field.outcome);
    }
}

async fn convert(
    resolver: Arc<dyn RateResolver>,
    config: &Config,
    mapping_file: &Path,
    input: Option<&Path>,
    report: bool,
) -> Result<()> {
    let ConversionFile {
        mappings,
        mut options,
    } = ConversionFile::load(mapping_file)?;
    options.cache_ttl_minutes.get_or_insert(config.cache_ttl_minutes);

    let converter = CurrencyConverter::builder()
        .mappings(mappings)
        .shared_resolver(resolver)
        .options(options)
        .build()?;

    let mut document = read_input(input)?;
    let records: Vec<&mut Value> = match &mut document {
        Value::Array(records) => records.iter_mut().collect(),
        record @ Value::Object(_) => vec![record],
        _ => anyhow::bail!("input must be a JSON object or an array of objects"),
    };

    for (index, record) in records.into_iter().enumerate() {
        let outcome = converter.apply_conversions(record).await;
        if report {
            print_report(index, &outcome);
        }
    }

    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(config.log_json);

    let cli = Cli::parse();

    match &cli.command {
        Commands::Convert {
            config: mapping_file,
            input,
            report,
        } => {
            let resolver = build_resolver(&cli, &config)?;
            convert(resolver, &config, mapping_file, input.as_deref(), *report).await?;
        }

        Commands::Rate { from, to, date } => {
            let resolver = build_resolver(&cli, &config)?;
            let date: DateTime<Utc> = match date {
                Some(day) => day
                    .and_hms_opt(0, 0, 0)
                    .map(|naive| naive.and_utc())
                    .context("invalid date")?,
                None => Utc::now(),
            };
            let rate = resolver
                .resolve_rate(&from.to_uppercase(), &to.to_uppercase(), date)
                .await?;
            println!("{}", rate);
        }

        Commands::Currencies => {
            for code in CurrencyCode::all() {
                match code.minor_units() {
                    Some(units) => println!("{}  {} ({} decimals)", code, code.name(), units),
                    None => println!("{}  {}", code, code.name()),
                }
            }
        }
    }

    Ok(())
}
