use clap::{Parser, Subcommand};

use crate::themes::ColorMode;

#[derive(Parser)]
#[command(name = "pj")]
#[command(author = "Oliver Steele <steele@osteele.com>")]
#[command(version)]
#[command(about = "A tiny project & dependency manager to take with you", long_about = None)]
pub struct Cli {
    /// Show debug output
    #[arg(short, long)]
    pub verbose: bool,

    /// Color the WARNING/ERROR tags (always or never)
    #[arg(long, value_name = "WHEN")]
    pub color: Option<ColorMode>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run an executable inside the project environment
    Run {
        /// Program to run
        program: String,

        /// Arguments passed to the program
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Build distributable artifacts with `python -m build`
    Build {
        /// Arguments passed to the build front-end
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Add dependencies to the project
    Add {
        /// Dependency group to add to
        #[arg(short = 'D', long, value_name = "NAME")]
        group: Option<String>,

        /// Requirements to add
        packages: Vec<String>,
    },
    /// Spawn a shell inside the project environment
    Shell,
}
