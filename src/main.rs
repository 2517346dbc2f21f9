mod cache;
mod cli;
mod config;
mod context;
mod environment;
mod error;
mod execution;
mod observability;
mod output;
mod project;
mod relaunch;
mod themes;


use clap::Parser;

use crate::cli::Cli;
use crate::context::Context;
use crate::output::Reporter;
use crate::themes::ColorMode;

fn main() {
    let cli = Cli::parse();
    observability::init_tracing(cli.verbose);

    let ctx = match Context::gather(cli.color) {
        Ok(ctx) => ctx,
        Err(e) => {
            Reporter::new(cli.color.unwrap_or_else(|| ColorMode::from_env(None))).err(&e.to_string());
            std::process::exit(e.exit_code());
        }
    };

    let code = match cli.execute(&ctx) {
        Ok(code) => code,
        Err(e) => {
            ctx.reporter.err(&e.to_string());
            e.exit_code()
        }
    };

    std::process::exit(code);
}
