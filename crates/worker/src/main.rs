#![forbid(unsafe_code)]

mod cli;
mod feed;
mod shutdown;
mod startup;

use std::path::Path;

use anyhow::Result;
use cli::Command;
use infrastructure::config::WorkerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::parse();

    match cli.command {
        Some(Command::Version) => {
            println!("findings-worker {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }

        Some(Command::CheckConfig) => {
            let config = WorkerConfig::load(Path::new(&cli.config))?;
            print!("{}", serde_yaml_ng::to_string(&config.sanitized())?);
            Ok(())
        }

        // No subcommand = run the worker
        None => startup::run(&cli).await,
    }
}
