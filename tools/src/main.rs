use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use hidp_tools::{
    collect_report_files, decode_report, format_caps_pretty, format_decode_pretty, hex_bytes,
    init_report, inspect_caps, load_table, parse_hex, DEMO_PREFIX,
};
use schema::{CapabilityTable, ReportType};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "hidp-tools",
    version,
    about = "hidp capability table and report inspection tools"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the capabilities a table declares.
    Caps {
        /// Table JSON path, or `demo:<name>`.
        #[arg(long)]
        table: String,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
    /// Decode report bytes into usages, values and data items.
    Decode {
        /// Path to a raw report, or a directory of them.
        #[arg(required_unless_present = "hex")]
        report_path: Option<PathBuf>,
        /// Report bytes as hex instead of a file.
        #[arg(long, conflicts_with = "report_path")]
        hex: Option<String>,
        /// Table JSON path, or `demo:<name>`.
        #[arg(long)]
        table: String,
        #[arg(long, value_enum, default_value_t = ReportKind::Input)]
        report_type: ReportKind,
        /// Optional glob filter when decoding a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Print a zeroed report stamped with a report ID, as hex.
    Init {
        /// Table JSON path, or `demo:<name>`.
        #[arg(long)]
        table: String,
        #[arg(long, value_enum, default_value_t = ReportKind::Input)]
        report_type: ReportKind,
        #[arg(long, default_value_t = 0)]
        report_id: u8,
        /// Write the raw bytes here instead of printing hex.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print a built-in table as JSON, or list them.
    Demo {
        /// Table name; omit to list the available names.
        name: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ReportKind {
    Input,
    Output,
    Feature,
}

impl From<ReportKind> for ReportType {
    fn from(kind: ReportKind) -> Self {
        match kind {
            ReportKind::Input => Self::Input,
            ReportKind::Output => Self::Output,
            ReportKind::Feature => Self::Feature,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Caps { table, format } => {
            let table = load_table(&table).context("load table")?;
            let report = inspect_caps(&table)?;
            match format {
                OutputFormat::Json => print_json(&report)?,
                OutputFormat::Pretty => print!("{}", format_caps_pretty(&report)),
            }
        }
        Command::Decode {
            report_path,
            hex,
            table,
            report_type,
            glob,
            format,
        } => {
            let table = load_table(&table).context("load table")?;
            let report_type = ReportType::from(report_type);
            match (hex, report_path) {
                (Some(hex), _) => {
                    let bytes = parse_hex(&hex)?;
                    decode_one(&table, report_type, &bytes, format)?;
                }
                (None, Some(path)) if path.is_dir() => {
                    let files = collect_report_files(&path, glob.as_deref())?;
                    info!(
                        count = files.len(),
                        dir = %path.display(),
                        "decoding report directory"
                    );
                    for file in files {
                        let bytes = read_report(&file)?;
                        println!("== {} ({} bytes) ==", file.display(), bytes.len());
                        decode_one(&table, report_type, &bytes, format)?;
                    }
                }
                (None, Some(path)) => {
                    let bytes = read_report(&path)?;
                    decode_one(&table, report_type, &bytes, format)?;
                }
                (None, None) => bail!("either a report path or --hex is required"),
            }
        }
        Command::Init {
            table,
            report_type,
            report_id,
            output,
        } => {
            let table = load_table(&table).context("load table")?;
            let report = init_report(&table, report_type.into(), report_id)?;
            match output {
                Some(path) => {
                    fs::write(&path, &report)
                        .with_context(|| format!("write report {}", path.display()))?;
                }
                None => println!("{}", hex_bytes(&report)),
            }
        }
        Command::Demo { name: Some(name) } => {
            let table = load_table(&format!("{DEMO_PREFIX}{name}"))?;
            print_json(&table)?;
        }
        Command::Demo { name: None } => {
            for name in demo_devices::NAMES {
                println!("{name}");
            }
        }
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("hidp_tools={level},codec={level}").into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn read_report(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("read report {}", path.display()))
}

fn decode_one(
    table: &CapabilityTable,
    report_type: ReportType,
    bytes: &[u8],
    format: OutputFormat,
) -> Result<()> {
    let decoded = decode_report(table, report_type, bytes)?;
    match format {
        OutputFormat::Json => print_json(&decoded)?,
        OutputFormat::Pretty => print!("{}", format_decode_pretty(&decoded)),
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize json")?;
    println!("{json}");
    Ok(())
}
