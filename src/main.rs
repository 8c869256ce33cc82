use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;

use crate::{
  app::App,
  cli::Cli,
  config::Config,
  hero::{HeroService, InMemoryHeroService},
  utils::{initialize_logging, initialize_panic_handler},
};

pub mod action;
pub mod app;
pub mod cli;
pub mod components;
pub mod config;
pub mod error;
pub mod hero;
pub mod mode;
pub mod route;
pub mod tui;
pub mod utils;

fn hero_service(cli: &Cli, config: &Config) -> Result<Arc<dyn HeroService>> {
  let service = match &cli.seed {
    Some(path) => {
      info!("Seeding heroes from {}", path.display());
      InMemoryHeroService::from_json_file(path)?
    },
    None => InMemoryHeroService::new(config.heroes.clone()),
  };
  Ok(Arc::new(service))
}

async fn tokio_main() -> Result<()> {
  initialize_logging()?;
  initialize_panic_handler()?;

  let cli = Cli::parse();
  let config = Config::new()?;
  info!("Using config dir {} and data dir {}", config.config.config_dir.display(), config.config.data_dir.display());

  let service = hero_service(&cli, &config)?;
  let mut app = App::new(config, service, cli.tick_rate, cli.frame_rate);
  app.run().await
}

#[tokio::main]
async fn main() -> Result<()> {
  if let Err(e) = tokio_main().await {
    eprintln!("{} error: Something went wrong", env!("CARGO_PKG_NAME"));
    Err(e)
  } else {
    Ok(())
  }
}
