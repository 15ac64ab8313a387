mod alert;
mod context;
mod location;

use clap::{Parser, Subcommand};
use shecurity_core::Position;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "shecurity")]
#[command(about = "Emergency alert dispatch and nearest police station lookup")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Explicit coordinates that replace the configured device fix.
#[derive(Debug, Clone, Copy, PartialEq, clap::Args)]
struct PositionArgs {
    /// Latitude in decimal degrees
    #[arg(
        long,
        requires = "longitude",
        allow_negative_numbers = true,
        value_parser = parse_latitude
    )]
    latitude: Option<f64>,
    /// Longitude in decimal degrees
    #[arg(
        long,
        requires = "latitude",
        allow_negative_numbers = true,
        value_parser = parse_longitude
    )]
    longitude: Option<f64>,
}

fn parse_degrees(raw: &str, limit: f64) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("not a number: {e}"))?;
    if value.is_finite() && (-limit..=limit).contains(&value) {
        Ok(value)
    } else {
        Err(format!("must be between -{limit} and {limit}"))
    }
}

fn parse_latitude(raw: &str) -> Result<f64, String> {
    parse_degrees(raw, 90.0)
}

fn parse_longitude(raw: &str) -> Result<f64, String> {
    parse_degrees(raw, 180.0)
}

impl PositionArgs {
    fn position(self) -> Option<Position> {
        Some(Position::new(self.latitude?, self.longitude?))
    }
}

/// Contact fields that override whatever is cached.
#[derive(Debug, Clone, PartialEq, clap::Args)]
struct ContactArgs {
    /// Emergency contact phone number
    #[arg(long)]
    phone: Option<String>,
    /// Emergency contact email
    #[arg(long)]
    email: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Send an emergency alert with the current position
    Alert {
        #[command(flatten)]
        contact: ContactArgs,
        #[command(flatten)]
        position: PositionArgs,
    },
    /// Resolve and print the current position
    Locate,
    /// List the police stations closest to the current position
    Nearest {
        /// Maximum number of stations to show
        #[arg(long)]
        limit: Option<usize>,
        #[command(flatten)]
        position: PositionArgs,
    },
    /// Read transcripts from stdin and alert when a keyword is heard
    Listen {
        #[command(flatten)]
        contact: ContactArgs,
        #[command(flatten)]
        position: PositionArgs,
    },
    /// Show the cached contact and active configuration
    Status,
    /// Forget the cached emergency contact
    Reset,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = shecurity_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Alert { contact, position } => {
            alert::run_alert(&config, contact, position.position()).await
        }
        Commands::Locate => location::run_locate(&config).await,
        Commands::Nearest { limit, position } => {
            location::run_nearest(&config, limit, position.position()).await
        }
        Commands::Listen { contact, position } => {
            alert::run_listen(&config, contact, position.position()).await
        }
        Commands::Status => alert::run_status(&config),
        Commands::Reset => alert::run_reset(&config),
    }
}
