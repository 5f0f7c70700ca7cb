//! Command-line interface for edge-control.
//!
//! Talks to a running `edge-controld` over its HTTP API and prints the JSON
//! answer.
//!
//! ```text
//! edge-cli [--url URL] temperature
//! edge-cli [--url URL] health
//! edge-cli [--url URL] power on|off
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use edge_control::api_client::{Client, DEFAULT_URL};
use edge_control::tracing;

#[derive(Debug, Parser)]
#[command(name = "edge-cli", version, about = "Control an edge-control server")]
struct Cli {
    /// Server base URL
    #[arg(long, env = "EDGE_URL", default_value = DEFAULT_URL)]
    url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Command {
    /// Read the current temperature
    Temperature,
    /// Check that the server is up
    Health,
    /// Switch camera power
    Power {
        #[arg(value_enum)]
        state: PowerSwitch,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PowerSwitch {
    #[value(alias = "true")]
    On,
    #[value(alias = "false")]
    Off,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing::init_cli();

    let cli = Cli::parse();
    let client = Client::new(&cli.url)?;

    match cli.command {
        Command::Temperature => print(&client.temperature().await?),
        Command::Health => print(&client.health().await?),
        Command::Power { state } => print(&client.set_power(state == PowerSwitch::On).await?),
    }
}

fn print<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
