//! formprobe: paced login form attempt scheduler.
//!
//! This binary can run in two modes:
//! - Preview mode: print the first candidates a session would try
//! - Daemon mode: JSON-RPC server driven by a host page script

use anyhow::{bail, Context};
use tracing::info;
use tracing_subscriber::EnvFilter;

use formprobe::candidates::Wordlist;
use formprobe::cli::Cli;
use formprobe::config::ProbeConfig;
use formprobe::rpc::run_server;
use formprobe::store::{load_session, FileStore};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse_args();
    let mut config = ProbeConfig::from_env();
    cli.apply_to_config(&mut config);

    init_tracing(&config.log_filter);

    if let Some(reason) = config.validate() {
        bail!("invalid configuration: {}", reason);
    }

    if cli.is_daemon_mode() {
        run_daemon_mode(config)
    } else if let Some(count) = cli.preview_count() {
        run_preview_mode(&cli, &config, count)
    } else {
        print_usage();
        Ok(())
    }
}

/// Logs go to stderr; stdout carries JSON-RPC traffic.
fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Runs the daemon mode (JSON-RPC server).
fn run_daemon_mode(config: ProbeConfig) -> anyhow::Result<()> {
    info!("=== formprobe JSON-RPC Server ===");
    info!("Reading from stdin, writing to stdout.");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(run_server(config))?;
    Ok(())
}

/// Prints the first `count` candidates of the saved session, with CLI
/// overrides applied. Nothing is written back to the store.
fn run_preview_mode(cli: &Cli, config: &ProbeConfig, count: usize) -> anyhow::Result<()> {
    let store = FileStore::open(config.effective_store_path())?;
    let mut context = load_session(&store)?;

    let mut settings = context.settings().clone();
    cli.apply_to_settings(&mut settings);
    context.apply_settings(settings)?;

    if let Some(path) = &cli.wordlist {
        let wordlist = Wordlist::load(path)?;
        context.load_wordlist(wordlist)?;
    }

    let source = context.source_mut();
    for candidate in std::iter::from_fn(|| source.next_candidate()).take(count) {
        println!("{}", candidate.value);
    }
    Ok(())
}

/// Prints usage information.
fn print_usage() {
    eprintln!("formprobe: paced login form attempt scheduler");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  Preview the first candidates of the saved session:");
    eprintln!("    formprobe --preview 20 --alphabet abc --max-length 3");
    eprintln!();
    eprintln!("  Daemon mode (JSON-RPC server):");
    eprintln!("    formprobe --daemon");
    eprintln!();
    eprintln!("Run 'formprobe --help' for full options.");
}
