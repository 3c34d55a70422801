// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `sketchwire`: encode, inspect and dump sketch command streams.
//!
//! Scripts are JSON arrays of commands in the `sketch-port` serde shape, e.g.
//! `[{"op":"push"},{"op":"rect","x":10,"y":10,"width":50,"height":50},{"op":"pop"}]`.
//! Wire settings come from the persisted config (`sketchwire config show`),
//! overridden per invocation by the global flags.

mod config;
mod input;
mod inspect;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use sketch_port::Command;
use sketch_wire::{encode_commands, Endian, Framing, WireConfig};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::config::{set_key, ConfigService, FsConfigStore};
use crate::input::StreamInput;

#[derive(Parser, Debug)]
#[command(
    name = "sketchwire",
    author,
    version,
    about = "Encode, inspect and dump sketch command streams",
    disable_help_subcommand = true
)]
struct Cli {
    #[command(flatten)]
    wire: WireArgs,

    /// Directory holding the persisted config (defaults to the platform config dir).
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` also applies.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Per-invocation overrides of the stored wire config.
#[derive(Args, Debug)]
struct WireArgs {
    /// Big-endian multi-byte fields.
    #[arg(long, global = true)]
    big_endian: bool,

    /// Length-prefixed records.
    #[arg(long, global = true)]
    framed: bool,

    /// Decode bound for strings, terminator included.
    #[arg(long, global = true, value_name = "BYTES")]
    max_string_len: Option<usize>,

    /// Do not write the default-state prologue when encoding.
    #[arg(long, global = true)]
    no_prologue: bool,
}

impl WireArgs {
    fn apply(&self, mut config: WireConfig) -> WireConfig {
        if self.big_endian {
            config.endian = Endian::Big;
        }
        if self.framed {
            config.framing = Framing::LengthPrefixed;
        }
        if let Some(len) = self.max_string_len {
            config.max_string_len = len;
        }
        if self.no_prologue {
            config.prologue = false;
        }
        config
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode a JSON command script into a stream file.
    Encode(EncodeArgs),
    /// Decode a stream and print every record.
    Inspect {
        /// Stream file.
        stream: PathBuf,
    },
    /// Hex dump a stream, one group per record.
    Dump {
        /// Stream file.
        stream: PathBuf,
    },
    /// Show or change the persisted wire config.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// JSON array of commands.
    script: PathBuf,

    /// Output stream file.
    #[arg(short, long)]
    output: PathBuf,

    /// Encoder buffer size in bytes.
    #[arg(long, default_value_t = 16 * 1024 * 1024)]
    capacity: usize,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective config as JSON.
    Show,
    /// Set one setting by its JSON name, e.g. `endian big`.
    Set {
        /// Setting name (`endian`, `framing`, `maxStringLen`, `maxPoints`,
        /// `maxImagePixels`, `prologue`, `paintFallback`).
        key: String,
        /// New value.
        value: String,
    },
    /// Restore defaults.
    Reset,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let service = ConfigService::new(match &cli.config_dir {
        Some(dir) => FsConfigStore::at(dir),
        None => FsConfigStore::new().context("resolve config dir")?,
    });
    // Reset must work even when the stored config no longer parses.
    if matches!(
        cli.command,
        Commands::Config {
            action: ConfigAction::Reset
        }
    ) {
        service
            .save_wire(&WireConfig::default())
            .context("save config")?;
        info!("config reset to defaults");
        return Ok(());
    }

    let stored = service.wire().context("load config")?;
    let config = cli.wire.apply(stored.clone());
    debug!(?config, "effective wire config");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Commands::Encode(args) => run_encode(&args, &config),
        Commands::Inspect { stream } => run_inspect(&stream, &config, &mut out),
        Commands::Dump { stream } => run_dump(&stream, &config, &mut out),
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                writeln!(out, "{}", serde_json::to_string_pretty(&config)?)?;
                Ok(())
            }
            ConfigAction::Set { key, value } => {
                let updated = set_key(&stored, &key, &value)
                    .with_context(|| format!("set {key} = {value}"))?;
                service.save_wire(&updated).context("save config")?;
                info!(%key, %value, "config updated");
                Ok(())
            }
            // Handled before the stored config is loaded.
            ConfigAction::Reset => Ok(()),
        },
    }
}

fn init_tracing(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn run_encode(args: &EncodeArgs, config: &WireConfig) -> Result<()> {
    let script = fs::read_to_string(&args.script)
        .with_context(|| format!("read {}", args.script.display()))?;
    let commands: Vec<Command> = serde_json::from_str(&script)
        .with_context(|| format!("parse {}", args.script.display()))?;
    let bytes = encode_commands(&commands, config, args.capacity).context("encode script")?;
    fs::write(&args.output, &bytes)
        .with_context(|| format!("write {}", args.output.display()))?;
    info!(
        commands = commands.len(),
        bytes = bytes.len(),
        output = %args.output.display(),
        "stream written"
    );
    Ok(())
}

fn run_inspect(stream: &Path, config: &WireConfig, out: &mut impl Write) -> Result<()> {
    let input = StreamInput::open(stream)?;
    let report = inspect::inspect(input.as_ref(), config);
    inspect::render(&report, out)?;
    if let Some(err) = report.fault {
        bail!("stream faulted: {err}");
    }
    Ok(())
}

fn run_dump(stream: &Path, config: &WireConfig, out: &mut impl Write) -> Result<()> {
    let input = StreamInput::open(stream)?;
    if let Some(err) = inspect::dump(input.as_ref(), config, out)? {
        bail!("stream faulted: {err}");
    }
    Ok(())
}
