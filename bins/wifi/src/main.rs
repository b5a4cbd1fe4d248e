//! wifi - wireless interface, BSS and station inspection
//!
//! Reads nl80211 state, printing it in `iw`-like text or JSON.

mod show;

use clap::{Parser, Subcommand};
use wlink::output::{OutputFormat, OutputOptions};

#[derive(Parser)]
#[command(name = "wifi", version, about = "Wireless interface inspection tool")]
struct Cli {
    /// Output JSON.
    #[arg(short = 'j', long, global = true)]
    json: bool,

    /// Pretty print JSON.
    #[arg(short = 'p', long, global = true)]
    pretty: bool,

    /// Show details.
    #[arg(short = 'd', long, global = true)]
    details: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List wireless interfaces.
    #[command(visible_alias = "dev")]
    Interfaces,

    /// Show the BSS an interface is joined to.
    #[command(visible_alias = "link")]
    Bss {
        /// Interface name.
        interface: String,
    },

    /// Show statistics of a station interface's peer.
    #[command(visible_alias = "sta")]
    Station {
        /// Interface name.
        interface: String,
    },
}

#[tokio::main]
async fn main() -> wlink::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let opts = OutputOptions {
        pretty: cli.pretty,
        details: cli.details,
    };

    let mut client = wlink::Client::new().await?;

    let result = match cli.command.unwrap_or(Command::Interfaces) {
        Command::Interfaces => show::interfaces(&client, format, &opts).await,
        Command::Bss { interface } => show::bss(&client, &interface, format, &opts).await,
        Command::Station { interface } => show::station(&client, &interface, format, &opts).await,
    };

    client.close()?;
    result
}
