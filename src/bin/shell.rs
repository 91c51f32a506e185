//! tablekv Shell
//!
//! Runs an in-process table engine and executes commands read from stdin,
//! one per line. See `tablekv::protocol::codec` for the command syntax.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tablekv::protocol::{format_error, format_outcome, parse_command};
use tablekv::{Config, Dispatcher, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// tablekv Shell
#[derive(Parser, Debug)]
#[command(name = "tablekv-shell")]
#[command(about = "Interactive shell for the tablekv table engine")]
#[command(version)]
struct Args {
    /// Dispatcher worker threads
    #[arg(short, long, default_value = "4")]
    workers: usize,

    /// Dispatcher queue depth
    #[arg(short, long, default_value = "1024")]
    queue_depth: usize,

    /// Reject negative counter deltas
    #[arg(long)]
    deny_negative_delta: bool,

    /// Per-command deadline in milliseconds (0 waits forever)
    #[arg(short, long, default_value = "0")]
    timeout_ms: u64,
}

fn main() {
    // Logs go to stderr so command output stays clean
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tablekv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!("tablekv shell v{}", tablekv::VERSION);

    let config = Config::builder()
        .dispatch_workers(args.workers)
        .dispatch_queue_depth(args.queue_depth)
        .allow_negative_delta(!args.deny_negative_delta)
        .build();

    let engine = Arc::new(Engine::new(config));
    let dispatcher = match Dispatcher::start(engine) {
        Ok(d) => d,
        Err(e) => {
            tracing::error!("Failed to start dispatcher: {}", e);
            std::process::exit(1);
        }
    };

    let timeout = (args.timeout_ms > 0).then(|| Duration::from_millis(args.timeout_ms));

    if let Err(e) = run(&dispatcher, timeout) {
        tracing::error!("Shell error: {}", e);
        std::process::exit(1);
    }

    dispatcher.shutdown();
    tracing::info!("Shell stopped");
}

fn run(dispatcher: &Dispatcher, timeout: Option<Duration>) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }

        let result = parse_command(line)
            .and_then(|command| dispatcher.submit(command))
            .and_then(|pending| match timeout {
                Some(timeout) => pending.wait_timeout(timeout),
                None => pending.wait(),
            });

        match result {
            Ok(outcome) => writeln!(stdout, "{}", format_outcome(&outcome))?,
            Err(e) => writeln!(stdout, "{}", format_error(&e))?,
        }
        stdout.flush()?;
    }

    Ok(())
}
