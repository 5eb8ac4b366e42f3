// src/main.rs
//! Wallet batch generator entry point.
//!
//! Exit codes: 0 success, 1 invalid input or config, 2 interrupted,
//! 3 export failure, 4 generation failure.
use clap::Parser;
use std::future::{poll_fn, Future};
use std::io::{self, Write};
use std::task::Poll;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use wallet_batch_gen::cli::{Cli, Request};
use wallet_batch_gen::core::wallet::{BatchGenerator, Progress};
use wallet_batch_gen::core::{GeneratorConfig, WalletGenError};
use wallet_batch_gen::export::{ExportOutcome, ExportWriter};
use wallet_batch_gen::security::status::display_module_status;
use wallet_batch_gen::security::{RuntimeGuard, SecureStore};

const EXIT_INTERRUPTED: i32 = 2;

enum RunError {
    Interrupted,
    Failed(WalletGenError),
}

impl From<WalletGenError> for RunError {
    fn from(err: WalletGenError) -> Self {
        RunError::Failed(err)
    }
}

#[tokio::main]
async fn main() {
    let code = run().await;
    println!("Program end");
    std::process::exit(code);
}

async fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help / --version print to stdout and are not failures
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            return code;
        }
    };

    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("⚠️ {}", e);
            return e.exit_code();
        }
    };

    if cli.status {
        let guard = RuntimeGuard::from_config(&config.guard);
        display_module_status(&guard).await;
        return 0;
    }

    // covers the guard and the prompt as well as generation and export
    let interrupt = listen_for_interrupt().await;

    println!("🔒 Checking security modules...");
    println!("✅ Owner-only export permissions: enabled");
    println!("✅ In-memory secret store: enabled");
    println!("✅ Secret redaction in logs: enabled\n");

    if config.guard.enabled {
        let guard = RuntimeGuard::from_config(&config.guard);
        let safe = tokio::select! {
            safe = guard.assess_safety(config.guard.verbose) => safe,
            _ = interrupted(interrupt.clone()) => return cancelled(),
        };
        if !safe {
            println!("⚠️ Runtime environment check flagged this session; continuing anyway\n");
        }
    }

    let request = tokio::select! {
        res = resolve_request(cli.clone()) => match res {
            Ok(request) => request,
            Err(e) => {
                eprintln!("⚠️ {}", e);
                return e.exit_code();
            }
        },
        _ = interrupted(interrupt.clone()) => return cancelled(),
    };

    let mut store = SecureStore::new();
    let result = tokio::select! {
        res = execute(&cli, &config, request, &mut store) => res,
        _ = interrupted(interrupt) => Err(RunError::Interrupted),
    };
    store.teardown();

    match result {
        Ok(outcome) => {
            println!("\nExport succeeded: {}", outcome.path.display());
            if let Some(warning) = &outcome.permission_warning {
                println!("⚠️ Warning: file permissions could not be restricted: {}", warning);
            }
            println!("⚠️ Security notice: private keys and mnemonics are stored in plain text, keep this file safe");
            0
        }
        Err(RunError::Interrupted) => cancelled(),
        Err(RunError::Failed(e @ (WalletGenError::ExportIo(_) | WalletGenError::MalformedRecord { .. }))) => {
            println!("\nExport failed: {}", e);
            e.exit_code()
        }
        Err(RunError::Failed(e)) => {
            println!("\nProgram error: {}", e);
            println!("Please check:");
            println!("1. The configuration file and WALLETGEN_* environment variables");
            println!("2. That the output directory is writable");
            println!("3. That the output file is not open in another program");
            e.exit_code().max(1)
        }
    }
}

fn cancelled() -> i32 {
    println!("\nOperation cancelled by user");
    EXIT_INTERRUPTED
}

/// Install the Ctrl-C handler once; the returned receiver flips to `true` on SIGINT.
async fn listen_for_interrupt() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    let (ready_tx, ready_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        let mut signal = Box::pin(tokio::signal::ctrl_c());
        // first poll registers the handler
        let first = poll_fn(|cx| Poll::Ready(signal.as_mut().poll(cx))).await;
        let _ = ready_tx.send(());
        let result = match first {
            Poll::Ready(result) => result,
            Poll::Pending => signal.await,
        };
        match result {
            Ok(()) => {
                let _ = tx.send(true);
            }
            Err(e) => warn!(error = %e, "Unable to listen for Ctrl-C"),
        }
    });
    let _ = ready_rx.await;
    rx
}

async fn interrupted(mut rx: watch::Receiver<bool>) {
    while !*rx.borrow_and_update() {
        if rx.changed().await.is_err() {
            // listener gone, never resolve
            std::future::pending::<()>().await;
        }
    }
}

/// Flags or the interactive prompt, read on a blocking thread so Ctrl-C stays observable.
async fn resolve_request(cli: Cli) -> Result<Request, WalletGenError> {
    tokio::task::spawn_blocking(move || {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        cli.resolve_request(&mut input, &mut output)
    })
    .await
    .map_err(|e| WalletGenError::Prompt(format!("prompt task failed: {}", e)))?
}

async fn execute(
    cli: &Cli,
    config: &GeneratorConfig,
    request: Request,
    store: &mut SecureStore,
) -> Result<ExportOutcome, RunError> {
    println!("\nGenerating wallets...");
    let generator = BatchGenerator::from_config(request.chain, config);
    let batch = generator.run(request.count, print_progress).await?;

    // session keyring, wiped on teardown
    for record in &batch {
        store.put(record.address(), record.private_key());
    }
    info!(entries = store.len(), "Private keys held in session store");

    let filename = cli.filename.clone().unwrap_or_else(|| request.chain.default_filename());
    let outcome = ExportWriter::from_config(config).export(&batch, &filename)?;
    if outcome.permission_warning.is_some() {
        warn!(path = %outcome.path.display(), "Export written without owner-only permissions");
    }
    Ok(outcome)
}

fn print_progress(progress: &Progress) {
    print!(
        "\rGenerated {}/{} | remaining: {:.1}s",
        progress.completed,
        progress.total,
        progress.remaining.as_secs_f64()
    );
    let _ = io::stdout().flush();
}

fn load_config(cli: &Cli) -> Result<GeneratorConfig, WalletGenError> {
    let mut config = GeneratorConfig::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    if cli.skip_guard {
        config.guard.enabled = false;
    }
    Ok(config)
}

fn init_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_max_level(tracing::Level::TRACE)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
