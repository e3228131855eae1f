use clap::Parser;
use travel_weather::cli::{run, Cli};
use travel_weather::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
