mod commands;

use std::collections::HashMap;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use stacksboard::config::{Config, ConfigError};
use stacksboard::consts::LOAD_PAGE_SIZE;
use stacksboard::error::SessionError;
use stacksboard::geometry::Point;
use stacksboard::gesture::Region;
use stacksboard::hit::resize_handle;
use stacksboard::model::{Element, ElementRef};
use stacksboard::render::{RenderOp, Surface};
use stacksboard::session::Session;
use stacksboard::share::{board_code_from_url, share_link};
use stacksboard::store::{Collection, CollectionStore, ListQuery, PocketBaseStore, StoreError, list_all};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use crate::commands::{HELP, LineCommand, parse_line};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("store request failed: {0}")]
    Store(#[from] StoreError),
    #[error("{0}")]
    Session(#[from] SessionError),
    #[error("no board code in {0:?}")]
    MissingCode(String),
    #[error("stdin read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "stacksboard", about = "Shared sticky-note board client")]
struct Cli {
    /// Base URL of the record store.
    #[arg(long, env = "STACKSBOARD_URL")]
    url: Option<String>,

    /// Base URL used in share links.
    #[arg(long, env = "STACKSBOARD_PUBLIC_URL")]
    public_url: Option<String>,

    #[arg(long, env = "STACKSBOARD_CANVAS_WIDTH")]
    canvas_width: Option<String>,

    #[arg(long, env = "STACKSBOARD_CANVAS_HEIGHT")]
    canvas_height: Option<String>,

    /// Per-request timeout in seconds; 0 disables it.
    #[arg(long, env = "STACKSBOARD_REQUEST_TIMEOUT_SECS")]
    request_timeout_secs: Option<String>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn config(&self) -> Result<Config, ConfigError> {
        let values: HashMap<&str, &Option<String>> = HashMap::from([
            ("STACKSBOARD_URL", &self.url),
            ("STACKSBOARD_PUBLIC_URL", &self.public_url),
            ("STACKSBOARD_CANVAS_WIDTH", &self.canvas_width),
            ("STACKSBOARD_CANVAS_HEIGHT", &self.canvas_height),
            ("STACKSBOARD_REQUEST_TIMEOUT_SECS", &self.request_timeout_secs),
        ]);
        Config::from_lookup(|key| values.get(key).and_then(|v| (*v).clone()))
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a board and open it.
    Create {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long)]
        password: Option<String>,
        /// Print the code and link, then leave right away.
        #[arg(long, default_value_t = false)]
        detach: bool,
    },
    /// Join a board by code or share link.
    Join {
        code: String,
        #[arg(long, env = "STACKSBOARD_PASSWORD")]
        password: Option<String>,
    },
    /// Print a board's zones and notes as JSON.
    List { code: String },
    /// Print the share link for a board code.
    Link { code: String },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Load .env if present
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("ignoring .env: {e}");
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "stacksboard=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config()?;

    match cli.command {
        Command::Create { name, password, detach } => run_create(&config, &name, password.as_deref(), detach).await,
        Command::Join { code, password } => run_join(&config, &code, password.as_deref()).await,
        Command::List { code } => run_list(&config, &code).await,
        Command::Link { code } => {
            println!("{}", share_link(&config.public_url, &resolve_code(&code)?));
            Ok(())
        }
    }
}

type CliSession = Session<PocketBaseStore, Printer>;

fn open_session(config: &Config) -> Result<CliSession, CliError> {
    let store = PocketBaseStore::new(&config.store_url, config.request_timeout)?;
    Ok(Session::new(Arc::new(store), Printer, config))
}

fn resolve_code(input: &str) -> Result<String, CliError> {
    board_code_from_url(input).ok_or_else(|| CliError::MissingCode(input.to_owned()))
}

async fn run_create(config: &Config, name: &str, password: Option<&str>, detach: bool) -> Result<(), CliError> {
    let mut session = open_session(config)?;
    let board = session.create_board(name, password).await?;
    println!("code: {}", board.id);
    if detach {
        session.leave_board().await;
        return Ok(());
    }
    run_board(&mut session).await
}

async fn run_join(config: &Config, code: &str, password: Option<&str>) -> Result<(), CliError> {
    let code = resolve_code(code)?;
    let mut session = open_session(config)?;
    session.join_board(&code, password).await?;
    run_board(&mut session).await
}

async fn run_list(config: &Config, code: &str) -> Result<(), CliError> {
    let code = resolve_code(code)?;
    let store = PocketBaseStore::new(&config.store_url, config.request_timeout)?;
    let board = store.get_one(Collection::Boards, &code).await?;
    let query = ListQuery::new(LOAD_PAGE_SIZE).filter_eq("board_id", &code);
    let zones = list_all(&store, Collection::Zones, query.clone()).await?;
    let notes = list_all(&store, Collection::Notes, query).await?;
    print_json(&json!({
        "board": { "id": board["id"], "name": board["name"], "user_count": board["user_count"] },
        "zones": zones,
        "notes": notes,
    }))
}

fn print_json(value: &Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// =============================================================================
// INTERACTIVE BOARD
// =============================================================================

async fn run_board(session: &mut CliSession) -> Result<(), CliError> {
    println!("type `help` for commands");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut realtime_open = true;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    session.leave_board().await;
                    return Ok(());
                };
                match parse_line(&line) {
                    Ok(None) => {}
                    Ok(Some(LineCommand::Leave)) => {
                        session.leave_board().await;
                        return Ok(());
                    }
                    Ok(Some(command)) => run_command(session, command).await,
                    Err(e) => println!("! {e}"),
                }
            }
            event = session.next_event(), if realtime_open => match event {
                Some(event) => session.apply_event(event),
                None => {
                    warn!("realtime channel closed; remote changes will not appear");
                    realtime_open = false;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                if let Some(task) = session.unload() {
                    if let Err(e) = task.await {
                        warn!(error = %e, "unload task failed");
                    }
                }
                return Ok(());
            }
        }
    }
}

async fn run_command(session: &mut CliSession, command: LineCommand) {
    let outcome = match command {
        LineCommand::Note(color) => session.add_note(color).await.map(|_| ()),
        LineCommand::Zone(color) => session.add_zone(color).await.map(|_| ()),
        LineCommand::Move { id, x, y } => drag_to(session, &id, Point::new(x, y)).await,
        LineCommand::Resize { id, width, height } => resize_to(session, &id, width, height).await,
        LineCommand::Recolor { id, color } => match find(session, &id) {
            Ok(target) => session.set_color(&target, color).await,
            Err(e) => Err(e),
        },
        LineCommand::Text { id, text } => match find(session, &id) {
            Ok(target) => session.commit_text(&target, &text).await,
            Err(e) => Err(e),
        },
        LineCommand::Delete { id } => match find(session, &id) {
            Ok(target) => session.delete_element(&target).await,
            Err(e) => Err(e),
        },
        LineCommand::List => {
            for element in session.mirror().elements() {
                println!("  {}", describe(&element));
            }
            Ok(())
        }
        LineCommand::Share => {
            if let Some(link) = session.share_link() {
                println!("{link}");
            }
            Ok(())
        }
        LineCommand::Help => {
            println!("{HELP}");
            Ok(())
        }
        LineCommand::Leave => Ok(()),
    };
    if let Err(e) = outcome {
        debug!(code = e.code(), error = %e, "command failed");
        if matches!(e, SessionError::UnknownElement(_)) {
            println!("! {}", e.toast_message());
        }
    }
}

/// Element ids are unique per store, so a bare id resolves against either
/// collection.
fn find(session: &CliSession, id: &str) -> Result<ElementRef, SessionError> {
    [ElementRef::note(id), ElementRef::zone(id)]
        .into_iter()
        .find(|target| session.mirror().contains(target))
        .ok_or_else(|| SessionError::UnknownElement(ElementRef::note(id)))
}

/// Replays a drag from the element's top-left to `to`.
async fn drag_to(session: &mut CliSession, id: &str, to: Point) -> Result<(), SessionError> {
    let target = find(session, id)?;
    let Some(rect) = session.mirror().get(&target).map(|el| el.rect()) else {
        return Err(SessionError::UnknownElement(target));
    };
    session.pointer_down(target, Region::Body, rect.origin(), rect);
    session.pointer_move(to);
    session.pointer_up().await.map(|_| ())
}

/// Replays a drag of the zone's resize handle.
async fn resize_to(session: &mut CliSession, id: &str, width: f64, height: f64) -> Result<(), SessionError> {
    let target = find(session, id)?;
    let Some(rect) = session.mirror().get(&target).map(|el| el.rect()) else {
        return Err(SessionError::UnknownElement(target));
    };
    let handle = resize_handle(rect);
    let grab = Point::new(handle.x + handle.width, handle.y + handle.height);
    if !session.pointer_down(target.clone(), Region::ResizeHandle, grab, rect) {
        println!("! only zones can be resized");
        return Ok(());
    }
    session.pointer_move(Point::new(rect.x + width, rect.y + height));
    session.pointer_up().await.map(|_| ())
}

fn describe(element: &Element) -> String {
    let rect = element.rect();
    let size = match element {
        Element::Note(_) => String::new(),
        Element::Zone(_) => format!(" {}x{}", rect.width, rect.height),
    };
    format!("{} {} @{},{}{} {:?}", element.target(), element.color(), rect.x, rect.y, size, element.text())
}

// =============================================================================
// SURFACE
// =============================================================================

/// Prints render ops as one line each.
struct Printer;

impl Surface for Printer {
    fn apply(&mut self, op: RenderOp) {
        match op {
            RenderOp::ShowEntry => println!("[entry]"),
            RenderOp::ShowBoard { board_id, name, share_link, has_password } => {
                let lock = if has_password { " (password)" } else { "" };
                println!("[board] {name}{lock} code={board_id}");
                if let Some(link) = share_link {
                    println!("[share] {link}");
                }
            }
            RenderOp::ParticipantCount(n) => println!("[users] {n}"),
            RenderOp::Place(element) => println!("+ {}", describe(&element)),
            RenderOp::Move { target, x, y } => println!("~ {target} @{x},{y}"),
            RenderOp::Resize { target, width, height } => println!("~ {target} {width}x{height}"),
            RenderOp::Recolor { target, color } => println!("~ {target} {color}"),
            RenderOp::Retext { target, text } => println!("~ {target} {text:?}"),
            RenderOp::Remove(target) => println!("- {target}"),
            RenderOp::Toast(message) => println!("! {message}"),
            RenderOp::Lift(_) | RenderOp::Drop(_) | RenderOp::Focus(_) | RenderOp::ClearCanvas => {}
        }
    }
}
