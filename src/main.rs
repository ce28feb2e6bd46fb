use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use trafficpulse::suggest::suggest_once;
use trafficpulse::{AppState, RouteRequester, TomTomClient, TrafficPulseConfig, telemetry, web};

/// Real-time traffic dashboard.
///
/// The TomTom API key is read from TOMTOM_API_KEY or the config file.
#[derive(Debug, Parser)]
#[command(name = "trafficpulse", version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long = "config", short = 'c', value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Defaults to `serve`
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Command {
    /// Run the dashboard web server
    Serve {
        /// Listen port, overriding `server.port`
        #[arg(long = "port", short = 'p', value_name = "PORT")]
        port: Option<u16>,
    },
    /// Plan a route with live traffic
    Route {
        #[arg(value_name = "ORIGIN")]
        origin: String,
        #[arg(value_name = "DESTINATION")]
        destination: String,
    },
    /// Look up matching locations
    Suggest {
        #[arg(value_name = "QUERY", required = true, num_args = 1..)]
        query: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = TrafficPulseConfig::load_from_path(cli.config)?;
    telemetry::init(&config.logging)?;

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => {
            let port = port.unwrap_or(config.server.port);
            let state = AppState::from_config(config)?;
            web::run(state, port).await
        }
        Command::Route {
            origin,
            destination,
        } => {
            let client = Arc::new(TomTomClient::new(&config.tomtom)?);
            let requester = RouteRequester::new(Arc::clone(&client), client);
            let route = requester.calculate(&origin, &destination).await?;
            info!("Route has {} points", route.points.len());
            println!("{origin} -> {destination}");
            println!("  Distance:      {}", route.display.distance);
            println!("  Duration:      {}", route.display.duration);
            println!("  Traffic delay: {}", route.display.traffic_delay);
            println!("  Arrival:       {}", route.display.arrival_time);
            Ok(())
        }
        Command::Suggest { query } => {
            let query = query.join(" ");
            let client = TomTomClient::new(&config.tomtom)?;
            let candidates = suggest_once(&client, &config.suggestions, &query).await;
            if candidates.is_empty() {
                println!("No suggestions for '{query}'");
            }
            for candidate in candidates {
                println!(
                    "{}  {} ({})",
                    candidate.name,
                    candidate.address,
                    candidate.coordinates.format_coordinates()
                );
            }
            Ok(())
        }
    }
}
