use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use taskboard::api::{HttpTaskApi, SelectedFile, TaskApi, resolve_image_url};
use taskboard::board::{BoardState, Request, Transition};
use taskboard::{config, logging, tui};

#[derive(Parser)]
#[command(
    name = "taskboard",
    version = env!("TASKBOARD_VERSION"),
    about = "A task board over a remote task API"
)]
struct Cli {
    /// Base URL of the task API (overrides TASKBOARD_API_URL and config.toml)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the interactive board (default)
    Board,
    /// Create ~/.taskboard/ and a default config.toml
    Init,
    /// List tasks grouped by status
    List,
    /// Create a task
    Add {
        /// Task title
        title: String,
        /// Image URL to attach
        #[arg(long)]
        image_url: Option<String>,
        /// Local image to upload and attach; takes precedence over --image-url
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Move a task along the pipeline (start, done, back, trash, archive, restore)
    Move {
        /// Task ID
        id: i64,
        /// Transition name
        action: String,
    },
    /// Permanently delete a trashed or archived task
    Delete {
        /// Task ID
        id: i64,
    },
    /// Replace a task's image URL
    SetImage {
        /// Task ID
        id: i64,
        /// New image URL (absolute or server-relative)
        url: String,
    },
    /// Upload an image and print the URL the server stored it under
    Upload {
        /// Path to the image file
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let flag = cli.api_url.as_deref();

    match cli.command.unwrap_or(Commands::Board) {
        Commands::Board => {
            // The board owns the terminal, so logs go to a file.
            let _guard = logging::init_file()?;
            let (config, api) = connect(flag)?;
            tracing::info!(api = %api.base_url(), "starting board");
            tui::run(api, &config)
        }
        command => {
            logging::init_stderr()?;
            run_command(command, flag)
        }
    }
}

fn run_command(command: Commands, flag: Option<&str>) -> Result<()> {
    match command {
        Commands::Board => bail!("the board cannot run as a one-shot command"),
        Commands::Init => {
            if config::init()? {
                println!("taskboard initialized at {}", config::config_path()?.display());
            } else {
                println!(
                    "Config already exists at {}",
                    config::config_path()?.display()
                );
            }
            Ok(())
        }
        Commands::List => {
            let (_, api) = connect(flag)?;
            let state = load(&api)?;
            print_board(&state, api.base_url());
            Ok(())
        }
        Commands::Add {
            title,
            image_url,
            file,
        } => {
            let (_, api) = connect(flag)?;
            let mut state = BoardState::default();
            state.draft.title = title;
            state.draft.image_url = image_url.unwrap_or_default();
            if let Some(path) = file {
                state.select_file(SelectedFile::read(&path)?);
            }
            let request = state
                .begin_create()
                .context("task title must not be empty")?;
            let title = state.draft.title.clone();
            run(&api, &mut state, request)?;
            println!("Created task '{title}'");
            Ok(())
        }
        Commands::Move { id, action } => {
            let (_, api) = connect(flag)?;
            let transition: Transition = action.parse().map_err(anyhow::Error::msg)?;
            transition_task(&api, id, transition)
        }
        Commands::Delete { id } => {
            let (_, api) = connect(flag)?;
            transition_task(&api, id, Transition::Delete)
        }
        Commands::SetImage { id, url } => {
            let (_, api) = connect(flag)?;
            let mut state = load(&api)?;
            if state.task(id).is_none() {
                bail!("no task with id {id}");
            }
            state.begin_image_edit(id);
            if let Some(edit) = state.image_edit.as_mut() {
                edit.url = url;
            }
            let request = state
                .begin_save_image()
                .context("image URL must not be empty")?;
            run(&api, &mut state, request)?;
            println!("Updated image for #{id}");
            Ok(())
        }
        Commands::Upload { path } => {
            let (_, api) = connect(flag)?;
            let file = SelectedFile::read(&path)?;
            let url = api.upload_image(&file)?;
            println!("{url}");
            let resolved = resolve_image_url(api.base_url(), &url);
            if resolved != url {
                println!("  → {resolved}");
            }
            Ok(())
        }
    }
}

fn connect(flag: Option<&str>) -> Result<(config::Config, HttpTaskApi)> {
    let config = config::load()?;
    let env = std::env::var(config::API_URL_ENV).ok();
    let url = config.api_url(flag, env.as_deref());
    let api = HttpTaskApi::new(&url).with_context(|| format!("cannot use API URL {url}"))?;
    Ok((config, api))
}

/// Perform a request to completion, turning the banner into an error.
fn run(api: &HttpTaskApi, state: &mut BoardState, request: Request) -> Result<()> {
    state.perform(api, request);
    match state.error.take() {
        Some(message) => bail!(message),
        None => Ok(()),
    }
}

fn load(api: &HttpTaskApi) -> Result<BoardState> {
    let mut state = BoardState::default();
    let request = state.begin_load().context("load already in flight")?;
    run(api, &mut state, request)?;
    Ok(state)
}

fn transition_task(api: &HttpTaskApi, id: i64, transition: Transition) -> Result<()> {
    let mut state = load(api)?;
    let Some(task) = state.task(id) else {
        bail!("no task with id {id}");
    };
    let from = task.status;
    if transition.effect(from).is_none() {
        let valid: Vec<&str> = from.transitions().iter().map(|t| t.as_str()).collect();
        bail!(
            "cannot {transition} a task in {from}; valid actions: {}",
            valid.join(", ")
        );
    }

    let request = state
        .begin_transition(id, transition)
        .context("transition not allowed")?;
    run(api, &mut state, request)?;

    match state.task(id) {
        Some(task) => println!("#{id}: {from} → {}", task.status),
        None => println!("#{id}: deleted"),
    }
    Ok(())
}

fn print_board(state: &BoardState, api_base: &str) {
    if state.tasks.is_empty() {
        println!("No tasks. Use `taskboard add <title>` to create one.");
        return;
    }
    for column in state.columns() {
        println!("{} ({})", column.status.label(), column.len());
        for task in &column.tasks {
            let image = task
                .image_ref()
                .map(|r| format!("  🖼 {}", resolve_image_url(api_base, r)))
                .unwrap_or_default();
            println!("  {} #{} {}{image}", column.status.symbol(), task.id, task.title);
        }
    }
}
