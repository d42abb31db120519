use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use log::debug;

use tunestatus::app::App;
use tunestatus::config::{Config, EnvOverrides, CONFIG_FILES};
use tunestatus::{logging, Error};

/// Mirror what is playing on spotify into a slack status
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Settings file, defaults to ./tunestatus.yml or ./tunestatus.yaml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Credential file to read, created by setup when missing
    #[arg(long, global = true)]
    credentials: Option<PathBuf>,

    /// Seconds between updates
    #[arg(long, global = true)]
    interval: Option<u64>,

    /// More logging, repeat for trace output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Don't listen for single key commands
    #[arg(long)]
    no_keys: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Default, Clone, Copy, Subcommand)]
enum Command {
    /// Keep the status in sync until interrupted
    #[default]
    Run,
    /// Publish the current track once and exit
    Once,
    /// Clear the status and exit
    Clear,
}

impl Cli {
    fn settings(&self) -> tunestatus::Result<Config> {
        let config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::load_with_fallback(CONFIG_FILES)?,
        };

        let mut config = config.with_env(EnvOverrides::from_env()?);
        if let Some(path) = &self.credentials {
            config.credentials_path = path.clone();
        }
        if let Some(interval) = self.interval {
            config.interval = interval;
        }
        config.validate()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = cli.settings().map_err(Error::into_report)?;
    debug!("{config:?}");
    let app = App::new(config).map_err(Error::into_report)?;

    match cli.command.unwrap_or_default() {
        Command::Run => app.run(!cli.no_keys).await.map_err(Error::into_report)?,
        Command::Once => {
            let status = app.once().await.map_err(Error::into_report)?;
            println!("{status}");
        }
        Command::Clear => {
            app.clear().await.map_err(Error::into_report)?;
            println!("Status cleared");
        }
    }

    Ok(())
}
