//! inkpost: command-line front end for the blogging client core.
#![deny(clippy::all, clippy::pedantic)]

mod args;
mod context;
mod handlers;
mod io;
mod print;

use std::process;
use std::sync::Arc;

use clap::Parser;
use inkpost::application::AppContext;
use inkpost::client::LoggingNavigator;
use inkpost::{config, infra::telemetry};

use args::{Cli, Commands};
use context::CliError;
use handlers::{auth, dashboard, feed, posts, search, uploads};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let settings = config::load(&cli.global)?;
    telemetry::init(&settings.logging)?;
    let ctx = AppContext::from_settings(&settings, Arc::new(LoggingNavigator))
        .map_err(CliError::Setup)?;
    dispatch(&ctx, cli.command).await
}

async fn dispatch(ctx: &AppContext, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Login(args) => auth::login(ctx, args).await,
        Commands::Logout => auth::logout(ctx),
        Commands::Whoami => auth::whoami(ctx),
        Commands::Posts(cmd) => posts::handle(ctx, cmd.action).await,
        Commands::Search { query, live } => search::handle(ctx, query, live).await,
        Commands::Dashboard => dashboard::handle(ctx).await,
        Commands::Home { category } => feed::home(ctx, category).await,
        Commands::Upload { path } => uploads::upload(ctx, &path).await,
    }
}
