mod config;
mod console;
mod error;
mod graphql;
mod http;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use platform_obs::{ObsConfig, init_tracing};
use products_hr::HrModule;
use tracing::info;

use crate::{
    config::AppConfig,
    console::{BrowseArgs, ListArgs, ShowArgs},
    http::{AppState, ServeConfig},
};

#[derive(Parser, Debug)]
#[command(name = "hr-server", version, about = "HR admin dashboard server")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP + GraphQL server.
    Serve(ServeCommand),
    /// Print one page of employees, departments or positions.
    List(ListArgs),
    /// Print a single record as JSON.
    Show(ShowArgs),
    /// Page, search and select records interactively.
    Browse(BrowseArgs),
    /// Print the GraphQL schema snapshot.
    #[command(name = "schema:print")]
    SchemaPrint {
        #[arg(long, value_name = "FILE", help = "Destination file path")]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, default_value = "0.0.0.0")]
    host: std::net::IpAddr,
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

impl From<ServeCommand> for ServeConfig {
    fn from(value: ServeCommand) -> Self {
        ServeConfig::new(value.host, value.port)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(ObsConfig::default())?;
    let cli = Cli::parse();
    let app_config = Arc::new(AppConfig::load()?);
    match cli.command {
        Command::Serve(cmd) => run_server(cmd, app_config).await,
        Command::List(args) => console::list(&hr_module(&app_config), args).await,
        Command::Show(args) => console::show(&hr_module(&app_config), args).await,
        Command::Browse(args) => console::browse(&hr_module(&app_config), args).await,
        Command::SchemaPrint { output } => schema_print(&app_config, output),
    }
}

fn hr_module(config: &AppConfig) -> HrModule {
    HrModule::new(config.hr.clone())
}

fn schema_print(config: &AppConfig, path: Option<PathBuf>) -> Result<()> {
    let sdl = graphql::build_schema(hr_module(config)).sdl();
    match path {
        Some(target) => {
            std::fs::write(&target, sdl)
                .with_context(|| format!("failed to write {}", target.display()))?;
            info!(path = %target.display(), "schema written");
        }
        None => print!("{sdl}"),
    }
    Ok(())
}

async fn run_server(cmd: ServeCommand, config: Arc<AppConfig>) -> Result<()> {
    info!(
        page_size = config.hr.page_size,
        latency = config.hr.simulate_latency,
        count_mode = ?config.hr.count_mode,
        "starting hr server"
    );
    let state = AppState::new(config);
    http::serve(cmd.into(), state).await
}
