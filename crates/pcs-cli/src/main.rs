mod conversations;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use glob::glob;
use pcs_core::link::unpack_frame;
use pcs_core::{
    ChecksumStatus, DecodeOptions, FrameSource, PacketSummary, PcapFileSource, render_chain, verify,
};
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::conversations::{Splitter, tcp_conversation};

const EXAMPLES: &str = "Examples:\n  pcs decode capture.pcap\n  pcs decode capture.pcapng --json --verify --limit 10\n  pcs split capture.pcap -o conversations/";

#[derive(Parser, Debug)]
#[command(name = "pcs")]
#[command(version)]
#[command(long_version = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("PCS_BUILD_COMMIT"),
    " ",
    env!("PCS_BUILD_DATE"),
    ")"
))]
#[command(
    about = "Decode captures into layered packets and split TCP conversations.",
    long_about = None,
    after_help = EXAMPLES
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode every frame of a capture and print its layers.
    Decode {
        /// Path to a .pcap or .pcapng file (a glob matching one file is accepted)
        input: PathBuf,

        /// Print one JSON object per frame
        #[arg(long)]
        json: bool,

        /// Pretty-print JSON output
        #[arg(long, requires = "json")]
        pretty: bool,

        /// Reject headers whose bit widths do not end on a byte boundary
        #[arg(long)]
        strict: bool,

        /// Verify the checksum of every layer
        #[arg(long)]
        verify: bool,

        /// Stop after this many frames
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Write each TCP conversation of a capture to its own .pcap file.
    ///
    /// A conversation is the unordered pair of (address, port) endpoints, so
    /// both directions of a connection share one file rather than one file
    /// per direction.
    #[command(
        after_help = "Files are named conversation-0001.pcap, conversation-0002.pcap, ... in order of\nfirst appearance; conversations.json lists their endpoints and frame counts.\nBoth directions of a connection go to the same file."
    )]
    Split {
        /// Path to a .pcap or .pcapng file (a glob matching one file is accepted)
        input: PathBuf,

        /// Output directory, created if missing
        #[arg(short = 'o', long)]
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Decode {
            input,
            json,
            pretty,
            strict,
            verify,
            limit,
        } => cmd_decode(
            &input,
            DecodeArgs {
                json,
                pretty,
                strict,
                verify,
                limit,
            },
        ),
        Commands::Split { input, output } => cmd_split(&input, &output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        })
    });
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{:#}", err), None)
    }
}

#[derive(Debug, Clone, Copy)]
struct DecodeArgs {
    json: bool,
    pretty: bool,
    strict: bool,
    verify: bool,
    limit: Option<usize>,
}

/// One JSON line of `pcs decode --json`.
#[derive(Debug, Serialize)]
struct FrameOutput {
    frame: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(flatten)]
    summary: Option<PacketSummary>,
}

fn cmd_decode(input: &Path, args: DecodeArgs) -> Result<(), CliError> {
    let resolved = resolve_input_path(input)?;
    validate_input_file(&resolved)?;
    let mut source = open_capture(&resolved)?;
    let options = if args.strict {
        DecodeOptions::strict()
    } else {
        DecodeOptions::default()
    };

    let mut index = 0u64;
    let mut failures = 0u64;
    while let Some(frame) = source
        .next_frame()
        .with_context(|| format!("Failed to read capture: {}", resolved.display()))?
    {
        if args.limit.is_some_and(|limit| index as usize >= limit) {
            break;
        }
        index += 1;

        let decoded = unpack_frame(&frame, options);
        if let Err(err) = &decoded {
            failures += 1;
            warn!(frame = index, error = %err, "frame did not decode");
        }

        if args.json {
            let output = match decoded {
                Ok(packet) => FrameOutput {
                    frame: index,
                    error: None,
                    summary: Some(PacketSummary::from_packet(packet.as_ref(), args.verify)),
                },
                Err(err) => FrameOutput {
                    frame: index,
                    error: Some(err.to_string()),
                    summary: None,
                },
            };
            let json = if args.pretty {
                serde_json::to_string_pretty(&output)
            } else {
                serde_json::to_string(&output)
            }
            .context("JSON serialization failed")?;
            println!("{}", json);
            continue;
        }

        let ts = frame
            .ts
            .map(|ts| format!("{ts:.6}"))
            .unwrap_or_else(|| "-".to_string());
        println!("#{} ts={} len={}", index, ts, frame.data.len());
        match decoded {
            Ok(packet) => {
                print!("{}", render_chain(packet.as_ref()));
                if args.verify {
                    for report in verify(packet.as_ref()) {
                        println!("checksum {}: {}", report.kind, status_label(report.status));
                    }
                }
            }
            Err(err) => println!("error: {}", err),
        }
        println!();
    }

    info!(frames = index, failures, "decode finished");
    Ok(())
}

fn status_label(status: ChecksumStatus) -> String {
    match status {
        ChecksumStatus::Valid => "valid".to_string(),
        ChecksumStatus::Invalid { stored, computed } => {
            format!("invalid (stored {stored:#06x}, computed {computed:#06x})")
        }
        ChecksumStatus::NotApplicable => "n/a".to_string(),
    }
}

fn cmd_split(input: &Path, output: &Path) -> Result<(), CliError> {
    let resolved = resolve_input_path(input)?;
    validate_input_file(&resolved)?;
    if output.is_file() {
        return Err(CliError::new(
            format!("output path is a file: {}", output.display()),
            Some("pass a directory for -o/--output".to_string()),
        ));
    }
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))?;

    let mut source = open_capture(&resolved)?;
    let mut splitter = Splitter::new(output);
    let mut frames = 0u64;
    let mut skipped = 0u64;
    while let Some(frame) = source
        .next_frame()
        .with_context(|| format!("Failed to read capture: {}", resolved.display()))?
    {
        frames += 1;
        let key = match unpack_frame(&frame, DecodeOptions::default()) {
            Ok(packet) => tcp_conversation(packet.as_ref()),
            Err(err) => {
                debug!(frame = frames, error = %err, "frame did not decode");
                None
            }
        };
        match key {
            Some(key) => splitter.add(key, &frame)?,
            None => skipped += 1,
        }
    }

    let entries = splitter.finish()?;
    let index_path = output.join("conversations.json");
    let json = serde_json::to_string_pretty(&entries).context("JSON serialization failed")?;
    fs::write(&index_path, json)
        .with_context(|| format!("Failed to write index: {}", index_path.display()))?;

    info!(frames, skipped, "split finished");
    eprintln!(
        "OK: {} conversations written -> {}",
        entries.len(),
        output.display()
    );
    Ok(())
}

fn open_capture(path: &Path) -> Result<PcapFileSource, CliError> {
    PcapFileSource::open(path).map_err(|err| {
        CliError::new(
            format!("cannot open capture {}: {}", path.display(), err),
            Some("use a .pcap or .pcapng file".to_string()),
        )
    })
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "pcap" && ext != "pcapng" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .pcap or .pcapng file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected .pcap or .pcapng".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let mut listed = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            if count > 3 {
                listed.push_str(", ...");
            }
            Err(CliError::new(
                format!(
                    "multiple files match pattern '{}' ({} matches); matches: {}",
                    pattern, count, listed
                ),
                Some("pass a single capture file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
