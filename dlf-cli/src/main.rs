//! DLF CLI - Command line tool for Delhi grid load series and forecasts.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "dlf-cli",
    version,
    about = "Delhi load forecast data toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: dlf_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    dlf_cmd::run(cli.command).await
}
