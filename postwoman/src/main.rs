mod form;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use postwoman_cli_utils::{get_config_file, get_default_config, parse_header, print_result};
use postwoman_lib::{HeaderEntry, Method, RequestDraft, RequestRunner, RunState, RunnerConfig};
use std::{io::Write, path::PathBuf};
use tokio::{sync::watch, task::JoinHandle};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Compose one HTTP request, send it and inspect the response.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    action: Action,

    /// Path to the config file.
    #[clap(short, long, global = true, value_parser = get_config_file)]
    config: Option<PathBuf>,

    /// Log more; repeat for more detail.
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u64,
}

#[derive(clap::Subcommand, Debug, Clone)]
enum Action {
    /// Send a single request described on the command line.
    Send(SendArgs),
    /// Fill in the request interactively, then send it.
    Interactive,
}

#[derive(Parser, Debug, Clone)]
struct SendArgs {
    /// GET, POST, PUT, PATCH or DELETE.
    #[clap(value_parser = parse_method)]
    method: Method,

    #[clap(value_parser)]
    url: String,

    /// Request header as "key: value". Later values win for a repeated key.
    #[clap(short = 'H', long = "header", value_parser = parse_header, number_of_values = 1)]
    headers: Vec<HeaderEntry>,

    /// JSON body, ignored for GET and DELETE.
    #[clap(short = 'd', long = "data", value_parser, default_value = "")]
    body: String,

    /// Show the whole response envelope instead of the body.
    #[clap(long, action)]
    raw: bool,
}

fn parse_method(s: &str) -> Result<Method> {
    s.parse()
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    let config = match args.config.or_else(|| get_default_config("postwoman.yml")) {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            RunnerConfig::try_load(&path).await?
        }
        None => RunnerConfig::default(),
    };
    let runner = RequestRunner::with_config(&config)?;

    let ok = match args.action {
        Action::Send(args) => send(&runner, args).await?,
        Action::Interactive => form::interactive(&runner).await?,
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(verbose: u64) -> Result<()> {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Returns false when the run ended in an error.
async fn send(runner: &RequestRunner, args: SendArgs) -> Result<bool> {
    let draft = RequestDraft {
        url: args.url,
        method: args.method,
        headers: args.headers,
        body_text: args.body,
    };

    let watcher = watch_state(runner.subscribe());
    let result = runner.execute(&draft).await;
    watcher.abort();

    let mut output: Vec<String> = Vec::new();
    print_result(&mut output, &result, args.raw);
    flush(output)?;

    Ok(!result.is_error())
}

/// Report in-flight runs on stderr while stdout carries the response.
fn watch_state(mut rx: watch::Receiver<RunState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let run = match &*rx.borrow_and_update() {
                RunState::InFlight { run } => *run,
                _ => continue,
            };
            if atty::is(atty::Stream::Stderr) {
                eprintln!("{}", format!("sending request #{}...", run).dimmed());
            }
        }
    })
}

fn flush(output: Vec<String>) -> Result<()> {
    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    for line in output {
        write!(stdout, "{}", line)?;
    }
    stdout.flush()?;
    Ok(())
}
