//! Terminal commands over the HR services.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Args;
use products_hr::{
    ControllerOptions, EntityKind, EntityService, HrModule, ListController, ListEvent, ListQuery,
    ListState, Record, ViewMode,
    render::{self, Presentable},
};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "commands: n|next, p|prev, page N, search TEXT, clear, view [list|card], \
toggle ID, all, retry, help, q";

#[derive(Args, Debug)]
pub struct ListArgs {
    /// employees, departments or positions
    entity: EntityKind,
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long)]
    page_size: Option<u32>,
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    department: Option<String>,
    #[arg(long, default_value = "list")]
    view: ViewMode,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    entity: EntityKind,
    id: String,
}

#[derive(Args, Debug)]
pub struct BrowseArgs {
    entity: EntityKind,
    /// Initial search term
    #[arg(long)]
    search: Option<String>,
}

pub async fn list(hr: &HrModule, args: ListArgs) -> Result<()> {
    let page_size = args.page_size.unwrap_or(hr.config().page_size);
    let screen = match args.entity {
        EntityKind::Employee => render_list(hr.employees(), &args, page_size).await?,
        EntityKind::Department => render_list(hr.departments(), &args, page_size).await?,
        EntityKind::Position => render_list(hr.positions(), &args, page_size).await?,
    };
    print!("{screen}");
    Ok(())
}

async fn render_list<T: Presentable>(
    service: Arc<dyn EntityService<T>>,
    args: &ListArgs,
    page_size: u32,
) -> Result<String> {
    let query = ListQuery {
        page: args.page,
        page_size,
        search: args.search.clone(),
        status: args.status.clone(),
        department: args.department.clone(),
    };
    let mut state = ListState::new(page_size);
    state.current_page = args.page;
    state.search_term = args.search.clone().unwrap_or_default();
    state.view_mode = args.view;
    let (generation, _) = state.begin_fetch();
    state.finish_fetch(generation, service.list(&query).await);
    if let Some(err) = &state.last_error {
        bail!("could not list {}: {err}", T::KIND.as_str());
    }
    Ok(render::render_state(&state))
}

pub async fn show(hr: &HrModule, args: ShowArgs) -> Result<()> {
    let json = match args.entity {
        EntityKind::Employee => show_record(hr.employees(), &args.id).await?,
        EntityKind::Department => show_record(hr.departments(), &args.id).await?,
        EntityKind::Position => show_record(hr.positions(), &args.id).await?,
    };
    println!("{json}");
    Ok(())
}

async fn show_record<T: Record>(service: Arc<dyn EntityService<T>>, id: &str) -> Result<String> {
    let record = service
        .get_by_id(id)
        .await?
        .with_context(|| format!("{} {id} not found", T::KIND))?;
    Ok(serde_json::to_string_pretty(&record)?)
}

pub async fn browse(hr: &HrModule, args: BrowseArgs) -> Result<()> {
    let options = hr.controller_options();
    match args.entity {
        EntityKind::Employee => browse_kind(hr.employees(), options, args.search).await,
        EntityKind::Department => browse_kind(hr.departments(), options, args.search).await,
        EntityKind::Position => browse_kind(hr.positions(), options, args.search).await,
    }
}

async fn browse_kind<T: Presentable>(
    service: Arc<dyn EntityService<T>>,
    options: ControllerOptions,
    search: Option<String>,
) -> Result<()> {
    let controller = ListController::spawn(service, options);
    if let Some(term) = search {
        controller.send(ListEvent::Search(term)).await?;
    }
    println!("Loading {}...", T::KIND.as_str());
    print!("{}", render::render_state(&controller.settled().await?));
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        match parse_command(&line) {
            Ok(ConsoleCommand::Quit) => break,
            Ok(ConsoleCommand::Help) => println!("{HELP}"),
            Ok(ConsoleCommand::Redraw) => {
                print!("{}", render::render_state(&controller.snapshot()));
            }
            Ok(ConsoleCommand::Event(event)) => {
                controller.send(event).await?;
                print!("{}", render::render_state(&controller.settled().await?));
            }
            Err(err) => println!("{err}"),
        }
    }
    controller.shutdown().await;
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConsoleCommand {
    Event(ListEvent),
    Redraw,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command {0:?}; type `help`")]
    Unknown(String),
    #[error("`{command}` expects {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },
    #[error("{0}")]
    Invalid(String),
}

pub fn parse_command(line: &str) -> Result<ConsoleCommand, CommandError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let event = match word.to_ascii_lowercase().as_str() {
        "" => return Ok(ConsoleCommand::Redraw),
        "q" | "quit" | "exit" => return Ok(ConsoleCommand::Quit),
        "help" | "?" => return Ok(ConsoleCommand::Help),
        "n" | "next" => ListEvent::NextPage,
        "p" | "prev" | "previous" => ListEvent::PreviousPage,
        "page" => {
            let page = rest
                .parse::<u32>()
                .map_err(|_| CommandError::MissingArgument {
                    command: "page",
                    expected: "a page number",
                })?;
            ListEvent::ChangePage(page)
        }
        "search" | "s" => ListEvent::Search(rest.to_string()),
        "clear" => ListEvent::Search(String::new()),
        "view" if rest.is_empty() => ListEvent::ToggleViewMode,
        "view" => ListEvent::SetViewMode(
            rest.parse()
                .map_err(|err: products_hr::HrError| CommandError::Invalid(err.to_string()))?,
        ),
        "toggle" | "t" if rest.is_empty() => {
            return Err(CommandError::MissingArgument {
                command: "toggle",
                expected: "a record id",
            });
        }
        "toggle" | "t" => ListEvent::ToggleOne(rest.to_string()),
        "all" => ListEvent::ToggleAll,
        "retry" | "r" => ListEvent::Retry,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(ConsoleCommand::Event(event))
}
