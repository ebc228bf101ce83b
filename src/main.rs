mod cache;
mod commands;
mod config;
mod error;
mod ids;
mod logging;
mod query;
mod remote;
mod shelter;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;

use cache::{MemoryStorage, SharedStorage};
use commands::{Command, Printer};

#[derive(Parser, Debug)]
#[command(name = "pawhome")]
#[command(about = "Pet shelter records that keep working before the backend tables exist")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./pawhome.yaml or $XDG_CONFIG_HOME/pawhome/config.yaml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Print results as JSON
  #[arg(long, global = true)]
  json: bool,

  /// Write log lines as JSON
  #[arg(long, global = true)]
  log_json: bool,

  /// Keep local changes in memory only, for this run
  #[arg(long, global = true)]
  ephemeral: bool,

  #[command(subcommand)]
  command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _guard = logging::init(args.log_json);

  let config = config::Config::load(args.config.as_deref())?;

  let storage: SharedStorage = if args.ephemeral {
    Arc::new(MemoryStorage::new())
  } else {
    cache::open_storage(config.storage.path.as_deref())
  };

  let shelter = shelter::Shelter::connect(&config, storage)?;

  let mut printer = Printer::new(std::io::stdout().lock(), args.json);
  let result = commands::run(&shelter, args.command, &mut printer).await;

  if printer.served_local() {
    eprintln!("Local mode: the shelter tables are not set up on the backend yet. Changes are saved on this device.");
  }

  result
}
