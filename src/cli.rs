use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(author, version, about = "AI-powered to-do list balanced between work and life", long_about = None)]
pub struct Cli {
    /// Use the built-in task templates instead of the remote model
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive to-do list (default)
    Tui {
        /// Pre-fill the project description
        #[arg(short, long)]
        project: Option<String>,
        /// Work share between 0.0 (all life) and 1.0 (all work)
        #[arg(short, long, default_value_t = 0.5)]
        ratio: f64,
    },
    /// Generate tasks for a project and print one per line
    Generate {
        #[arg(value_name = "PROJECT")]
        project: String,
        /// Work share between 0.0 (all life) and 1.0 (all work)
        #[arg(short, long, default_value_t = 0.5)]
        ratio: f64,
    },
    /// Print shell completions
    Completions {
        #[arg(value_name = "SHELL", value_enum, ignore_case = true)]
        shell: Shell,
    },
}
