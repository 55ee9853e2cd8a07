//! # Tend
//!
//! Terminal session manager console.
//!
//! ## Overview
//!
//! Spawns the host process that owns the real shells, speaks the JSON-lines
//! session protocol with it over its stdin/stdout, and offers a small command
//! console on this process's stdin for managing pages and tabs.
//!
//! ## Architecture
//!
//! This is Layer 3 - the binary that ties together:
//! - tend-core: Core types and configuration
//! - tend-transport: Wire protocol
//! - tend-emulator: Headless screens
//! - tend-session: Session lifecycle

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{bail, Context};
use tokio::io::BufReader;
use tokio::process::Command;

use tend::{run, Console};
use tend_core::AppConfig;
use tend_transport::{connect_ui, protocol_schema};

/// How long the host gets to exit after all sessions were removed.
const HOST_EXIT_GRACE: Duration = Duration::from_secs(2);

struct Args {
    config: Option<PathBuf>,
    host: Option<String>,
    print_schema: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        config: None,
        host: None,
        print_schema: false,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().context("--config needs a path")?;
                args.config = Some(PathBuf::from(path));
            }
            "--host" => {
                args.host = Some(iter.next().context("--host needs a command")?);
            }
            "--print-schema" => args.print_schema = true,
            "-h" | "--help" => {
                println!("usage: tend [--config <path>] [--host <command>] [--print-schema]");
                std::process::exit(0);
            }
            other => bail!("unknown argument '{other}'"),
        }
    }
    Ok(args)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = parse_args()?;

    if args.print_schema {
        println!("{}", serde_json::to_string_pretty(&protocol_schema()?)?);
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => AppConfig::default(),
    };
    if let Some(host) = &args.host {
        let mut parts = host.split_whitespace().map(str::to_string);
        config.host.command = parts.next().context("--host is empty")?;
        config.host.args = parts.collect();
    }
    config.validate()?;

    // Initialize logging; stdout belongs to the console
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.shell.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(
        "Tend v{} starting host '{}'",
        env!("CARGO_PKG_VERSION"),
        config.host.command
    );

    let mut child = Command::new(&config.host.command)
        .args(&config.host.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("spawning host '{}'", config.host.command))?;

    let host_stdout = child.stdout.take().context("host stdout not captured")?;
    let host_stdin = child.stdin.take().context("host stdin not captured")?;
    let mut endpoint = connect_ui(host_stdout, host_stdin);

    let mut console = Console::new(&config, &endpoint);
    let stdin = BufReader::new(tokio::io::stdin());
    run(&mut console, &mut endpoint, stdin, tokio::io::stdout()).await?;

    // Dropping every sender closes the host's stdin once queued removals
    // are written
    drop(console);
    drop(endpoint);
    match tokio::time::timeout(HOST_EXIT_GRACE, child.wait()).await {
        Ok(status) => tracing::info!("Host exited: {}", status?),
        Err(_) => {
            tracing::warn!("Host did not exit in time, killing it");
            child.kill().await?;
        }
    }

    tracing::info!("Tend shutting down");
    Ok(())
}
