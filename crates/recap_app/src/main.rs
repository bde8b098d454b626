mod app;
mod cli;
mod config;
mod effects;
mod logging;
mod render;
mod session;

use std::io;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use recap_engine::EngineHandle;
use recap_logging::recap_info;

use crate::app::{App, Outcome};
use crate::cli::Cli;
use crate::effects::EffectRunner;
use crate::render::Renderer;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let cwd = std::env::current_dir().context("could not determine working directory")?;
    let loaded = config::load(cli.config.as_deref(), &cwd)?;
    let mut config = loaded.config;
    if let Some(server) = &cli.server {
        config.server_url = server.clone();
    }
    if let Some(log_file) = &cli.log_file {
        config.log_file = log_file.clone();
    }

    logging::initialize(
        cli.log,
        logging::level_for_verbosity(cli.verbose),
        &config.log_file,
    );
    match &loaded.source {
        Some(path) => recap_info!("loaded config from {:?}", path),
        None => recap_info!("no {} found, using defaults", config::DEFAULT_CONFIG_FILE),
    }

    let form = cli.job_form().context("could not read script file")?;
    let settings = config.client_settings()?;
    let renderer = Renderer::new(io::stdout(), settings.server_url.clone());
    let engine = EngineHandle::new(settings)?;

    let mut app = App::new(EffectRunner::new(engine), renderer);
    let outcome = app.run(form, cli.cleanup)?;
    Ok(match outcome {
        Outcome::Completed => ExitCode::SUCCESS,
        Outcome::Failed | Outcome::Rejected => ExitCode::FAILURE,
    })
}
