//! Tidemark CLI - apply and revert database migrations

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::{create, down, status, up};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.global.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match &cli.command {
        cli::Commands::Up => up::execute(&cli.global),
        cli::Commands::Down(args) => down::execute(args, &cli.global),
        cli::Commands::Create(args) => create::execute(args, &cli.global),
        cli::Commands::Status(args) => status::execute(args, &cli.global),
    }
}
