/// SBE command-line tool: build, inspect, and use intermediate
/// representations of message schemas.
///
/// # Command overview
///
/// ```text
/// sbe <COMMAND> [OPTIONS]
///
/// Commands:
///   generate   Build an IR file from a JSON schema
///   inspect    Print the token lists stored in an IR file
///   decode     Decode a framed message to JSON using an IR file
///   help       Print help information
///
/// Global options:
///   -v, --verbose    Log debug output to stderr
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                        |
/// |------|------------------------------------------------|
/// | 0    | Success                                        |
/// | 1    | Error (I/O failure, invalid schema or message) |
///
/// Errors and logs go to stderr so stdout can be piped cleanly.
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd_decode;
mod cmd_generate;
mod cmd_inspect;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// The SBE intermediate representation tool.
#[derive(Parser)]
#[command(name = "sbe", version, about = "SBE intermediate representation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log debug output to stderr (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    verbose: bool,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Build an IR file from a JSON schema.
    Generate(GenerateArgs),
    /// Print the token lists stored in an IR file.
    Inspect(InspectArgs),
    /// Decode a framed message to JSON using an IR file.
    Decode(DecodeArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `sbe generate`.
///
/// ```text
/// ┌──────────────────────┬─────────────────────────────────────────────────┐
/// │ Flag                 │ Effect                                          │
/// ├──────────────────────┼─────────────────────────────────────────────────┤
/// │ -o / --output        │ IR file to write                                │
/// │ --target-version N   │ Drop everything introduced after version N      │
/// │ --compress           │ zstd-compress the frame body                    │
/// └──────────────────────┴─────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct GenerateArgs {
    /// Path to the JSON schema.
    pub schema: PathBuf,

    /// Output IR file path.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Generate IR as the schema stood at this version.
    #[arg(long)]
    pub target_version: Option<u32>,

    /// Compress the frame body with zstd.
    #[arg(long)]
    pub compress: bool,
}

/// Arguments for `sbe inspect`.
///
/// Without flags every message is printed. `--message` narrows the
/// output to one template; `--types` adds the named types.
#[derive(clap::Args)]
pub struct InspectArgs {
    /// Path to the IR file.
    pub file: PathBuf,

    /// Print only the message with this template id.
    #[arg(long)]
    pub message: Option<i32>,

    /// Also print every named type.
    #[arg(long)]
    pub types: bool,
}

/// Arguments for `sbe decode`.
#[derive(clap::Args)]
pub struct DecodeArgs {
    /// Path to the IR file describing the message.
    pub ir: PathBuf,

    /// Path to the encoded message, header first.
    pub message: PathBuf,

    /// Indent the JSON output.
    #[arg(long)]
    pub pretty: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Generate(args) => cmd_generate::run(&args),
        Commands::Inspect(args) => cmd_inspect::run(&args),
        Commands::Decode(args) => cmd_decode::run(&args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` with `-v`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
