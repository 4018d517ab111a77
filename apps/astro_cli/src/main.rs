use anyhow::Context;
use astro_config::{
    apply_overrides, parse_birth_input, parse_engine_settings, read_astro_toml_text,
    validate_engine_settings,
};
use astro_engine::chart::BirthInput;
use astro_engine::{Astrologer, BackendChoice, EngineSettings, TransitFeed};
use chrono::{DateTime, NaiveDateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "astro", about = "Natal charts and current transits as JSON", version)]
struct Cli {
    /// Ephemeris backend, overriding configs/astro.toml
    #[arg(long, global = true, env = "ASTRO_BACKEND")]
    backend: Option<BackendChoice>,

    #[command(flatten)]
    birth: BirthArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Birth data; falls back to the `[birth]` table in configs/astro.toml.
#[derive(Args)]
struct BirthArgs {
    /// Local civil time of birth, e.g. 1990-07-14T06:30:00
    #[arg(long, global = true, requires_all = ["lat", "lon"])]
    born: Option<NaiveDateTime>,

    /// Hours east of UTC at the birth place
    #[arg(long, global = true, default_value_t = 0.0, allow_hyphen_values = true)]
    offset: f64,

    #[arg(long, global = true, allow_hyphen_values = true)]
    lat: Option<f64>,

    #[arg(long, global = true, allow_hyphen_values = true)]
    lon: Option<f64>,
}

impl BirthArgs {
    fn to_input(&self) -> Option<BirthInput> {
        let born = self.born?;
        Some(BirthInput::from_naive(born, self.offset, self.lat?, self.lon?))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the natal chart
    Chart,

    /// Print transits to the natal chart
    Transits {
        /// Evaluation instant (RFC 3339); defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },

    /// Print the daily insight for the natal chart
    Insight {
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },

    /// Re-evaluate transits periodically until interrupted
    Watch {
        /// Seconds between evaluations
        #[arg(long, default_value_t = 3600)]
        interval_secs: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config_text = match read_astro_toml_text() {
        Ok(text) => Some(text),
        Err(e) => {
            log::warn!("{}; using default engine settings", e);
            None
        }
    };
    let settings = match &config_text {
        Some(text) => parse_engine_settings(text)?,
        None => EngineSettings::default(),
    };
    let mut settings = apply_overrides(settings, |key| std::env::var(key).ok())?;
    if let Some(backend) = cli.backend {
        settings.backend = backend;
    }
    validate_engine_settings(&settings)?;

    let birth = match cli.birth.to_input() {
        Some(input) => input,
        None => config_text
            .as_deref()
            .map(parse_birth_input)
            .transpose()?
            .flatten()
            .context("No birth data: pass --born/--lat/--lon or add a [birth] table to configs/astro.toml")?,
    };

    let astrologer = Arc::new(
        Astrologer::from_settings(settings).context("Failed to start the ephemeris backend")?,
    );
    let result = run(&astrologer, cli.command, &birth).await;
    astrologer.shutdown();
    result
}

async fn run(
    astrologer: &Arc<Astrologer>,
    command: Commands,
    birth: &BirthInput,
) -> anyhow::Result<()> {
    let natal = astrologer
        .natal_chart(birth)
        .await
        .context("Failed to build natal chart")?;

    match command {
        Commands::Chart => {
            println!("{}", serde_json::to_string_pretty(natal.as_ref())?);
        }
        Commands::Transits { at } => {
            let now = at.unwrap_or_else(Utc::now);
            let transits = astrologer.transits(now, &natal.chart).await?;
            println!("{}", serde_json::to_string_pretty(transits.as_ref())?);
        }
        Commands::Insight { at } => {
            let now = at.unwrap_or_else(Utc::now);
            let insight = astrologer.daily_insight(now, &natal.chart).await?;
            println!("{}", serde_json::to_string_pretty(&insight)?);
        }
        Commands::Watch { interval_secs } => {
            let mut feed = TransitFeed::new(
                astrologer.clone(),
                Arc::new(natal.chart.clone()),
                Duration::from_secs(interval_secs.max(1)),
            );
            log::info!("Watching transits every {} s", interval_secs);
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        log::info!("Interrupted");
                        break;
                    }
                    update = feed.poll() => match update {
                        Ok(update) if update.fresh => {
                            println!("{}", serde_json::to_string(update.transits.as_ref())?);
                        }
                        Ok(update) => log::debug!("No change at {}", update.at),
                        Err(e) => log::error!("Transit evaluation failed: {}", e),
                    }
                }
            }
        }
    }
    Ok(())
}
