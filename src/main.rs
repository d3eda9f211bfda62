mod cli;
mod config;
mod controller;
mod editor;
mod llm;
mod models;
mod todo_list;
mod ui;

use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use config::Config;
use controller::{Controller, GENERATION_FAILED_MESSAGE};
use ui::run_tui;

fn init_logging(log_file: Option<&Path>) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(path) = log_file {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            // Anything on stderr would be drawn over the UI
            Err(_) => {
                builder.filter_level(log::LevelFilter::Off);
            }
        }
    }
    builder.init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Some(Commands::Generate { project, ratio }) => {
            init_logging(None);
            if project.trim().is_empty() {
                bail!("Project description must not be empty");
            }
            let generator = llm::create_generator(&config, cli.offline)?;
            let rt = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
            let mut controller = Controller::new();
            let generated = rt.block_on(controller.request_generation(generator.as_ref(), &project, ratio));
            if generated.is_err() {
                bail!(GENERATION_FAILED_MESSAGE);
            }
            for entry in controller.entries() {
                println!("{}", entry.text);
            }
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "aitodo", &mut std::io::stdout());
        }
        Some(Commands::Tui { project, ratio }) => {
            launch_tui(&config, cli.offline, project, ratio)?;
        }
        None => {
            launch_tui(&config, cli.offline, None, 0.5)?;
        }
    }

    Ok(())
}

fn launch_tui(config: &Config, offline: bool, project: Option<String>, ratio: f64) -> Result<()> {
    init_logging(Some(&config.log_file));
    let generator = llm::create_generator(config, offline)?;
    let rt = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    run_tui(rt.handle().clone(), generator, project.unwrap_or_default(), ratio)
}
