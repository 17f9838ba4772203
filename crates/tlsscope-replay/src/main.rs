use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tlsscope_core::{Config, Worker};

mod input;
mod output;
mod replay;

#[derive(Parser)]
#[command(name = "tlsscope-replay")]
#[command(about = "Replay reassembled TLS streams through the handshake dissector")]
struct Cli {
    /// Client-to-server stream bytes
    #[arg(long)]
    client: Option<PathBuf>,

    /// Server-to-client stream bytes
    #[arg(long)]
    server: Option<PathBuf>,

    /// Stream files hold hex text instead of raw bytes
    #[arg(long, default_value_t = false)]
    hex: bool,

    /// Feed each stream in segments of this many bytes
    #[arg(long, default_value_t = 1460)]
    chunk: usize,

    /// Also record the canonical JA3/JA3S strings
    #[arg(long, default_value_t = false)]
    ja3_strings: bool,

    /// Dissector diagnostics; repeat for more
    #[arg(short, long, action = ArgAction::Count)]
    debug: u8,

    /// Log at DEBUG level
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Output format: "text" (human-readable) or "json" (NDJSON, one object per line)
    #[arg(short, long, default_value = "text")]
    output: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose || cli.debug > 0 {
        "debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let format = output::OutputFormat::parse(&cli.output)?;

    if cli.client.is_none() && cli.server.is_none() {
        bail!("Nothing to replay: pass --client and/or --server");
    }

    let load = |path: &Option<PathBuf>| -> Result<Vec<u8>> {
        match path {
            Some(p) => input::load(p, cli.hex)
                .with_context(|| format!("Failed to load stream '{}'", p.display())),
            None => Ok(Vec::new()),
        }
    };
    let client = load(&cli.client)?;
    let server = load(&cli.server)?;
    info!(
        "Replaying {} client bytes, {} server bytes in {}-byte segments",
        client.len(),
        server.len(),
        cli.chunk
    );

    let mut worker = Worker::new(Config {
        ja3_strings: cli.ja3_strings,
        debug: cli.debug,
    });
    let report = replay::replay(
        &mut worker,
        &input::chunks(&client, cli.chunk)?,
        &input::chunks(&server, cli.chunk)?,
    );

    output::print_report(&report, format)
}
