use clap::{command, Parser};
use encore::{config::EncoreConfig, skill::Skill, Error};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Enable debug mode
    #[arg(short, long)]
    verbose: bool,
}

async fn run(cli: &Cli) -> Result<(), Error> {
    let config = if cli.config.exists() {
        EncoreConfig::from_file(&cli.config)?
    } else {
        EncoreConfig::default()
    };

    info!("config loaded.");
    debug!("config: {:?}", config);

    let skill = Skill::new(&config);
    skill.start()?;

    // The transport bridge attaches to skill.event_bus() here; without one
    // the skill only serves in-process traffic.
    println!(
        "Encore started for locale {}. Press Ctrl+C to shutdown.",
        config.locale
    );

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| Error::internal(format!("Failed to wait for Ctrl+C: {}", e)))?;

    println!("Shutdown signal received, performing clean shutdown...");
    skill.shutdown();

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if cli.verbose {
        debug!("Verbose mode enabled");
    }

    if let Err(e) = run(&cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
