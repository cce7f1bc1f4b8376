//! scriptprobe - command-line front end for the request harness
//!
//! Every invocation opens the harness for one (project, script), applies the
//! requested edit or send through the actors, prints the result and closes.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tokio::sync::mpsc;

use scriptprobe::config::data_dir;
use scriptprobe::constants::{APP_NAME, BASE_URL_ENV, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, LOG_FILE_NAME};
use scriptprobe::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
use scriptprobe::viewer::{format_response, status_badge};
use scriptprobe::{
    Field, FileStore, Harness, HarnessActor, HarnessConfig, HttpMethod, Identity, NetworkActor,
    RequestStore,
};

#[derive(Parser, Debug)]
#[command(name = APP_NAME)]
#[command(author, version, about = "Assemble, persist and send test requests to hosted scripts", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Project the script belongs to
    #[arg(short, long)]
    project: String,

    /// Script name
    #[arg(short, long)]
    script: String,

    /// Endpoint path below the project (default: the script name without `.lua`)
    #[arg(long, global = true)]
    path: Option<String>,

    /// Deployment base URL
    #[arg(long, global = true, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Directory holding saved requests (default: ~/.scriptprobe/requests)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Request timeout in seconds, 0 to wait indefinitely
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Refuse to send a malformed JSON body
    #[arg(long, global = true, default_value = "false")]
    validate_json: bool,

    /// Allow any characters in the endpoint path
    #[arg(long, global = true, default_value = "false")]
    no_path_check: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the saved request
    Show,
    /// Print the URL the request is sent to
    Url,
    /// Print the equivalent curl command
    Curl,
    /// Set the HTTP method
    Method {
        /// GET, POST, PUT, PATCH or DELETE
        method: String,
    },
    /// Set the content type (also sent as Accept)
    ContentType { value: String },
    /// Set the request body
    Body {
        /// Body text
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        text: Option<String>,

        /// Read the body from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Edit headers
    Header {
        #[command(subcommand)]
        action: RowAction,
    },
    /// Edit query parameters
    Param {
        #[command(subcommand)]
        action: RowAction,
    },
    /// Send the request and print the response
    Send,
}

#[derive(Subcommand, Debug)]
enum RowAction {
    /// Append a row
    Add { key: String, value: String },
    /// Remove the row at INDEX
    Remove { index: usize },
    /// Overwrite the key or value of the row at INDEX
    Set {
        index: usize,
        field: FieldArg,
        value: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FieldArg {
    Key,
    Value,
}

impl From<FieldArg> for Field {
    fn from(field: FieldArg) -> Self {
        match field {
            FieldArg::Key => Field::Key,
            FieldArg::Value => Field::Value,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging to file
    let log_dir = data_dir();
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::never(&log_dir, LOG_FILE_NAME);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    let events = events_for(&args.command)?;

    let config = HarnessConfig {
        base_url: args.base_url.clone(),
        timeout: (args.timeout > 0).then(|| Duration::from_secs(args.timeout)),
        validate_path: !args.no_path_check,
        validate_json_body: args.validate_json,
    };
    let store = match &args.store {
        Some(dir) => FileStore::new(dir),
        None => FileStore::default_location(),
    };
    let harness = Harness::open(
        Identity::new(args.project.clone(), args.script.clone()),
        args.path.clone(),
        config,
        RequestStore::new(store),
    );

    // Create channels
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (net_cmd_tx, net_cmd_rx) = mpsc::unbounded_channel::<NetworkCommand>();
    let (net_resp_tx, net_resp_rx) = mpsc::unbounded_channel::<NetworkResponse>();
    let (render_tx, mut render_rx) = mpsc::unbounded_channel::<RenderState>();

    tokio::spawn(NetworkActor::new(net_resp_tx).run(net_cmd_rx));
    let app = tokio::spawn(HarnessActor::new(harness, net_cmd_tx, render_tx).run(ui_rx, net_resp_rx));

    let mut state = next_render(&mut render_rx).await?;
    for event in events {
        ui_tx.send(event).map_err(|_| anyhow!("harness stopped"))?;
        state = next_render(&mut render_rx).await?;
    }

    while state.is_loading {
        tokio::select! {
            render = render_rx.recv() => {
                state = render.ok_or_else(|| anyhow!("harness stopped"))?;
            }
            _ = tokio::signal::ctrl_c() => {
                let _ = ui_tx.send(UiEvent::CancelRequest);
            }
        }
    }

    let _ = ui_tx.send(UiEvent::Close);
    app.await.context("harness actor failed")?;

    print_outcome(&args.command, &state)
}

/// Translate a command into the UI events that carry it out
fn events_for(command: &Command) -> Result<Vec<UiEvent>> {
    let events = match command {
        Command::Show | Command::Url | Command::Curl => Vec::new(),
        Command::Method { method } => vec![UiEvent::SetMethod(method.parse::<HttpMethod>()?)],
        Command::ContentType { value } => vec![UiEvent::SetContentType(value.clone())],
        Command::Body { text, file } => {
            let body = match (text, file) {
                (_, Some(path)) => std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?,
                (Some(text), None) => text.clone(),
                (None, None) => String::new(),
            };
            vec![UiEvent::SetBody(body)]
        }
        Command::Header { action } => vec![match action {
            RowAction::Add { key, value } => UiEvent::InsertHeader {
                key: key.clone(),
                value: value.clone(),
            },
            RowAction::Remove { index } => UiEvent::RemoveHeader(*index),
            RowAction::Set { index, field, value } => UiEvent::UpdateHeader {
                index: *index,
                field: (*field).into(),
                value: value.clone(),
            },
        }],
        Command::Param { action } => vec![match action {
            RowAction::Add { key, value } => UiEvent::InsertParam {
                key: key.clone(),
                value: value.clone(),
            },
            RowAction::Remove { index } => UiEvent::RemoveParam(*index),
            RowAction::Set { index, field, value } => UiEvent::UpdateParam {
                index: *index,
                field: (*field).into(),
                value: value.clone(),
            },
        }],
        Command::Send => vec![UiEvent::SendRequest],
    };
    Ok(events)
}

async fn next_render(render_rx: &mut mpsc::UnboundedReceiver<RenderState>) -> Result<RenderState> {
    render_rx.recv().await.ok_or_else(|| anyhow!("harness stopped"))
}

fn print_outcome(command: &Command, state: &RenderState) -> Result<ExitCode> {
    match command {
        Command::Url => println!("{}", state.url),
        Command::Curl => println!("{}", state.curl),
        Command::Send => {
            if let Some(error) = &state.error {
                eprintln!("{} {}", "Error".red().bold(), error);
                return Ok(ExitCode::FAILURE);
            }
            if let Some(response) = &state.response {
                println!("{}", status_badge(response));
                println!("{}", format_response(response));
            }
        }
        _ => {
            println!("{}", serde_json::to_string_pretty(&state.spec)?);
            println!("{} {}", "→".dimmed(), state.url);
        }
    }
    Ok(ExitCode::SUCCESS)
}
