/// Mosaic command-line tool: inspect and replay raw receiver captures.
///
/// # Command overview
///
/// ```text
/// mosaic <COMMAND> [OPTIONS]
///
/// Commands:
///   inspect    List every SBF block and NMEA sentence in a capture
///   replay     Push a capture through the mailboxes and print deliveries
///   help       Print help information
///
/// Global options:
///   -v, --verbose    More log output (repeat for debug / trace)
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                  |
/// |------|------------------------------------------|
/// | 0    | Success                                  |
/// | 1    | Error (I/O failure, runtime start, etc.) |
///
/// Logs and errors go to stderr so stdout can be piped cleanly.
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use mosaic_buffers::config::DEFAULT_QUEUE_DEPTH;
use mosaic_msgs::Quantity;
use tracing_subscriber::EnvFilter;

mod cmd_inspect;
mod cmd_replay;
mod sink;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// Tools for Septentrio Mosaic receiver captures.
#[derive(Parser)]
#[command(name = "mosaic", version, about = "Mosaic GNSS capture tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Raise the log level: -v info, -vv debug, -vvv trace. `RUST_LOG`
    /// overrides this.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// List every frame in a raw capture file.
    Inspect(InspectArgs),
    /// Replay a capture through the publish mailboxes as JSON lines.
    Replay(ReplayArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `mosaic inspect`.
///
/// ```text
/// ┌────────────┬──────────────────────────────────────────────────────┐
/// │ Flag       │ Effect                                               │
/// ├────────────┼──────────────────────────────────────────────────────┤
/// │ --json     │ Print the frame list as a JSON array                 │
/// │ --show-hex │ Hex dump each frame, 16 bytes per line               │
/// └────────────┴──────────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct InspectArgs {
    /// Raw capture: the receiver's byte stream written straight to disk.
    pub file: PathBuf,

    /// Print JSON instead of the text listing.
    #[arg(long)]
    pub json: bool,

    /// Include a hex dump of every frame.
    #[arg(long)]
    pub show_hex: bool,
}

/// Arguments for `mosaic replay`.
///
/// Frames are read from the capture and committed to the mailboxes as fast
/// as the file can be read, or paced with `--frame-delay-ms`. A separate
/// publisher task delivers whatever is pending every `--rate-ms`, so with
/// pacing slower than the publish rate every sample gets through, and with
/// no pacing most are overwritten before delivery.
#[derive(clap::Args)]
pub struct ReplayArgs {
    /// Raw capture to replay.
    pub file: PathBuf,

    /// Publish period in milliseconds.
    #[arg(long, default_value_t = 100)]
    pub rate_ms: u64,

    /// Sleep this long after each frame to mimic a live receiver.
    #[arg(long, default_value_t = 0)]
    pub frame_delay_ms: u64,

    /// Disable a quantity (fix, pose, velocity, nmea_sentence,
    /// time_reference). May be repeated.
    #[arg(long = "disable", value_name = "QUANTITY")]
    pub disable: Vec<Quantity>,

    /// Frame id written into message headers.
    #[arg(long, default_value = "gnss")]
    pub frame_id: String,

    /// Outgoing queue length per topic.
    #[arg(long, default_value_t = DEFAULT_QUEUE_DEPTH)]
    pub queue_depth: usize,

    /// Keep the last message of every topic for late readers.
    #[arg(long)]
    pub latch: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Inspect(args) => cmd_inspect::run(&args),
        Commands::Replay(args) => cmd_replay::run(&args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
