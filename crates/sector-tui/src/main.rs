//! Sector chat TUI entry point.
//!
//! # Usage
//!
//! ```bash
//! # Restricted room with the built-in allow-list
//! sector-tui
//!
//! # Open sectors, clocks in UTC, verbose log
//! sector-tui --profile sector --clock utc --log-level debug
//!
//! # Custom allow-list
//! sector-tui --config sector.toml
//!
//! # Chat with other machines through a relay (see sector-relay)
//! sector-tui --profile sector --relay relay.lan:8765
//! ```
//!
//! Without any relay, namespaces live in this process only.

use std::{fs::File, path::PathBuf, sync::Mutex};

use clap::{Parser, ValueEnum};
use sector_app::{AppConfig, ClockZone, ConfigError, Runtime};
use sector_core::ChatProfile;
use sector_tui::{SystemEnv, TerminalDriver};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Room flavour on the command line.
#[derive(ValueEnum, Clone, Copy, Debug)]
enum ProfileArg {
    /// Fixed room and allow-list, sealed payloads.
    Restricted,
    /// Any sector and key, timestamp-sorted transcript.
    Sector,
}

impl From<ProfileArg> for ChatProfile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Restricted => Self::Restricted,
            ProfileArg::Sector => Self::Sector,
        }
    }
}

/// Sector chat terminal client
#[derive(Parser, Debug)]
#[command(name = "sector-tui")]
#[command(about = "Terminal front-end for peer-synchronized sector chat")]
#[command(version)]
struct Args {
    /// Room flavour. Overrides the configuration file.
    #[arg(short, long, value_enum)]
    profile: Option<ProfileArg>,

    /// TOML configuration file (profile, clock, allow-list)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Zone for transcript clocks (utc or local). Overrides the configuration file.
    #[arg(long)]
    clock: Option<ClockZone>,

    /// Relay to replicate through, `host:port`. Repeatable. Replaces the
    /// relays of the configuration file.
    #[arg(short, long = "relay", value_name = "HOST:PORT")]
    relays: Vec<String>,

    /// Log file. The terminal itself is taken by the UI.
    #[arg(long, default_value = "sector-tui.log")]
    log_file: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_file = File::create(&args.log_file)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(log_file)).with_ansi(false))
        .with(filter)
        .init();

    let file = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let config = apply_overrides(&args, file)?;
    let engine = sector_sync::connect(&config.relays)?;

    tracing::info!(
        profile = %config.profile,
        clock = ?config.clock,
        relays = ?config.relays,
        "sector-tui starting"
    );

    let driver = TerminalDriver::new(engine)?;
    Runtime::new(driver, SystemEnv::new(), config.build_app()).run().await?;

    tracing::info!("session terminated");
    Ok(())
}

/// Command-line flags win over the configuration file.
fn apply_overrides(args: &Args, mut config: AppConfig) -> Result<AppConfig, ConfigError> {
    if let Some(profile) = args.profile {
        config.profile = profile.into();
    }
    if let Some(clock) = args.clock {
        config.clock = clock;
    }
    if !args.relays.is_empty() {
        config.relays.clone_from(&args.relays);
    }
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(flags: &[&str]) -> Args {
        Args::parse_from(std::iter::once("sector-tui").chain(flags.iter().copied()))
    }

    #[test]
    fn file_relays_apply_without_flags() {
        let file = AppConfig::from_toml(r#"relays = ["relay.lan:8765"]"#).unwrap();
        let config = apply_overrides(&args(&[]), file).unwrap();
        assert_eq!(config.relays, ["relay.lan:8765"]);
    }

    #[test]
    fn relay_flags_replace_file_relays() {
        let file = AppConfig::from_toml(r#"relays = ["relay.lan:8765"]"#).unwrap();
        let config =
            apply_overrides(&args(&["--relay", "10.0.0.2:8765", "-r", "10.0.0.3:8765"]), file)
                .unwrap();
        assert_eq!(config.relays, ["10.0.0.2:8765", "10.0.0.3:8765"]);
    }

    #[test]
    fn bad_relay_flag_is_a_config_error() {
        let result = apply_overrides(&args(&["--relay", "nowhere"]), AppConfig::default());
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn profile_flag_overrides_file() {
        let flags = args(&["--profile", "sector"]);
        let config = apply_overrides(&flags, AppConfig::default()).unwrap();
        assert_eq!(config.profile, ChatProfile::Sector);
    }

    #[tokio::test]
    async fn engine_follows_configured_relays() {
        let local = apply_overrides(&args(&[]), AppConfig::default()).unwrap();
        assert!(!sector_sync::connect(&local.relays).unwrap().is_networked());

        let relayed = apply_overrides(&args(&["--relay", "127.0.0.1:9"]), AppConfig::default())
            .unwrap();
        assert!(sector_sync::connect(&relayed.relays).unwrap().is_networked());
    }
}
