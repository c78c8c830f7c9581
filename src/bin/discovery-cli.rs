use std::path::PathBuf;

use clap::{Parser, Subcommand};

use haproxy_discovery::config::{self, exit_on_fatal, Settings};
use haproxy_discovery::lifecycle::startup;
use haproxy_discovery::observability::logging;

#[derive(Parser)]
#[command(name = "discovery-cli")]
#[command(about = "Inspection CLI for the haproxy-discovery daemon", long_about = None)]
struct Cli {
    /// TOML configuration file; environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the registry currently stored in etcd as JSON
    Registry,
    /// Render the configuration to stdout without writing or reloading
    Render,
    /// Validate the configuration and print the effective settings
    Check,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging("warn");
    let settings = Settings::from_env();
    let config = config::resolve_config(cli.config.as_deref(), &settings)
        .unwrap_or_else(|e| exit_on_fatal(e));

    match cli.command {
        Commands::Registry => {
            let reader = startup::build_reader(&config, &settings)?;
            let registry = reader.read_registry().await?;
            println!("{}", serde_json::to_string_pretty(&registry)?);
        }
        Commands::Render => {
            let reader = startup::build_reader(&config, &settings)?;
            let renderer = startup::build_renderer(&config)?;
            let registry = reader.read_registry().await?;
            print!("{}", renderer.render(&registry)?);
        }
        Commands::Check => {
            startup::build_renderer(&config)?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
