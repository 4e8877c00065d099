use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use mcp360_config::{
    ConfigLoad, ConfigLoader, ConfigLoaderOptions, ConfigWarnings,
};
use mcp360_core::SlateDeck;
use mcp360_player::{DeckRuntime, tour};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "mcp360")]
#[command(about = "Play the MCP360 landing deck headlessly")]
struct Cli {
    /// Deck config file (TOML or JSON). Overrides MCP360_DECK_CONFIG_PATH.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Environment file to load before resolving the config.
    #[arg(long, global = true, value_name = "PATH")]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk through every slate in order
    Tour(TourArgs),
    /// Print the resolved deck config as JSON
    Inspect,
    /// Validate the deck config and exit
    Check,
}

#[derive(ClapArgs, Debug, Clone)]
struct TourArgs {
    /// Time spent on each slate, e.g. `15s` or `1m 30s`
    #[arg(
        long,
        default_value = "15s",
        value_parser = humantime::parse_duration
    )]
    dwell: Duration,

    /// Override the viewport height from the config
    #[arg(long)]
    viewport_height: Option<f64>,

    /// Print the tour summary as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let load = ConfigLoader::with_options(ConfigLoaderOptions {
        config_path: cli.config.clone(),
        env_file: cli.env_file.clone(),
    })
    .load()
    .context("failed to load deck configuration")?;

    log_warnings(&load.warnings);
    info!(
        source = %load.source,
        slates = load.layout.slates.len(),
        "deck configuration loaded"
    );

    match cli.command {
        Command::Tour(args) => run_tour(load, args).await,
        Command::Inspect => inspect(&load),
        Command::Check => {
            info!("deck configuration is valid");
            Ok(())
        }
    }
}

async fn run_tour(load: ConfigLoad, args: TourArgs) -> anyhow::Result<()> {
    let ConfigLoad {
        config, mut layout, ..
    } = load;
    if let Some(viewport_height) = args.viewport_height {
        layout.viewport_height = viewport_height;
    }

    let deck = SlateDeck::new(layout).context("failed to build slate deck")?;
    let (runtime, handle) = DeckRuntime::headless(deck, &config.scroll);
    let runtime_task = tokio::spawn(runtime.run());

    let settle = tour::settle_timeout(config.scroll.duration());
    let stops = tokio::select! {
        result = tour::tour(&handle, args.dwell, settle) => Some(result),
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for ctrl-c")?;
            warn!("tour interrupted");
            None
        }
    };

    handle.shutdown();
    let final_snapshot = runtime_task
        .await
        .context("deck runtime task panicked")?;

    let Some(stops) = stops else {
        return Ok(());
    };
    let stops = stops.context("tour failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stops)?);
    } else {
        for stop in &stops {
            println!(
                "{:>2}  {:<24} step {}",
                stop.index.value(),
                stop.label,
                stop.reached_step
            );
        }
    }
    info!(
        slates = stops.len(),
        attached = final_snapshot.attached,
        "tour finished"
    );
    Ok(())
}

fn inspect(load: &ConfigLoad) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(&load.config)
        .context("failed to render deck configuration")?;
    println!("{rendered}");

    if load.warnings.is_empty() {
        println!("no warnings");
    } else {
        for warning in &load.warnings.items {
            match &warning.hint {
                Some(hint) => println!("warning: {} ({hint})", warning.message),
                None => println!("warning: {}", warning.message),
            }
        }
    }
    Ok(())
}

fn log_warnings(warnings: &ConfigWarnings) {
    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => warn!(
                message = %warning.message,
                hint = %hint,
                "configuration warning"
            ),
            None => {
                warn!(message = %warning.message, "configuration warning")
            }
        }
    }
}
