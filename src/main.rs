// ImeiSift - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and logging initialisation
// 3. Report extraction, optional bulk query, and export

use clap::Parser;
use imeisift::app::state::AppState;
use imeisift::core::export::{self, ExportFormat, TextExportOptions};
use imeisift::platform::{config, fs};
use imeisift::util::error::{ImeiSiftError, Result};
use imeisift::util::{constants, logging};
use std::io::Write;
use std::path::{Path, PathBuf};

/// ImeiSift - sort IMEI-lookup reports into carrier and activation groups.
///
/// Reads an HTML report from an IMEI-lookup service, classifies every device,
/// optionally narrows it to a bulk list of IMEI/serial fragments, and prints
/// a grouped listing ready to paste into a message.
#[derive(Parser, Debug)]
#[command(name = "imeisift", version, about)]
struct Cli {
    /// HTML report to load.
    report: PathBuf,

    /// Bulk query: IMEI or serial fragments separated by commas, spaces or newlines.
    #[arg(short = 'q', long = "query")]
    query: Option<String>,

    /// Read the bulk query from a file.
    #[arg(long = "query-file")]
    query_file: Option<PathBuf>,

    /// Export format: text, csv or json.
    #[arg(long = "format", value_parser = parse_format)]
    format: Option<ExportFormat>,

    /// Write the export to this file instead of stdout.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Print the carrier groups and load summary instead of exporting.
    #[arg(long = "groups")]
    groups: bool,

    /// Width of the `=` separator line in the text export (1-200).
    #[arg(long = "separator-width", value_parser = parse_separator_width)]
    separator_width: Option<usize>,

    /// Config file to use instead of the platform default.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn parse_format(value: &str) -> std::result::Result<ExportFormat, String> {
    ExportFormat::parse(value).ok_or_else(|| format!("unknown format '{value}' (text, csv, json)"))
}

fn parse_separator_width(value: &str) -> std::result::Result<usize, String> {
    let range = constants::MIN_SEPARATOR_WIDTH..=constants::MAX_SEPARATOR_WIDTH;
    value
        .parse::<usize>()
        .ok()
        .filter(|width| range.contains(width))
        .ok_or_else(|| {
            format!(
                "separator width must be a number from {} to {}",
                range.start(),
                range.end()
            )
        })
}

fn main() {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| config::PlatformPaths::resolve().config_file());
    let (app_config, config_warnings) = config::load_config(&config_path);

    logging::init(
        cli.debug,
        app_config.log_level.as_deref(),
        app_config.log_file.as_deref(),
    );

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "ImeiSift starting"
    );

    for warning in &config_warnings {
        tracing::warn!(error = %warning, "Config problem; using defaults for affected values");
    }

    if let Err(e) = run(&cli, &app_config) {
        tracing::error!(error = %e, "ImeiSift failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli, app_config: &config::AppConfig) -> Result<()> {
    let bytes = fs::read_report(&cli.report, app_config.max_input_size)?;

    let mut state = AppState::new();
    state.load_report(bytes, cli.report.clone())?;

    if cli.groups {
        return print_groups(&state);
    }

    if let Some(raw_query) = collect_query(cli)? {
        let outcome = state.run_query(&raw_query);
        if !outcome.not_found.is_empty() {
            eprintln!("Not found ({}):", outcome.not_found.len());
            for token in &outcome.not_found {
                eprintln!("{token}");
            }
        }
    }

    let format = cli.format.unwrap_or(app_config.export_format);
    let text_options = TextExportOptions {
        separator_width: cli.separator_width.unwrap_or(app_config.separator_width),
    };
    let devices = state.current_devices();

    let count = match &cli.output {
        Some(path) => {
            let file = std::fs::File::create(path).map_err(|source| ImeiSiftError::Io {
                path: path.clone(),
                operation: "create export file",
                source,
            })?;
            export::write_export(devices, format, &text_options, std::io::BufWriter::new(file), path)?
        }
        None => {
            let stdout = std::io::stdout();
            export::write_export(devices, format, &text_options, stdout.lock(), Path::new("<stdout>"))?
        }
    };

    tracing::info!(devices = count, export_format = ?format, "Export written");
    Ok(())
}

/// Combine `--query` and `--query-file`; None when neither was given.
fn collect_query(cli: &Cli) -> Result<Option<String>> {
    let mut parts = Vec::new();
    if let Some(query) = &cli.query {
        parts.push(query.clone());
    }
    if let Some(path) = &cli.query_file {
        parts.push(fs::read_query_file(path)?);
    }
    Ok((!parts.is_empty()).then(|| parts.join("\n")))
}

fn print_groups(state: &AppState) -> Result<()> {
    let summary = &state.summary;

    let mut lines = vec![format!(
        "{} devices ({} active, {} not active, {} iCloud locked, {} duplicate IMEIs)",
        summary.total_devices,
        summary.active,
        summary.inactive,
        summary.icloud_locked,
        summary.duplicate_imeis
    )];
    for group in state.groups() {
        lines.push(format!("{:<16} {}", group.name.label(), group.count));
    }

    writeln!(std::io::stdout().lock(), "{}", lines.join("\n")).map_err(|source| {
        ImeiSiftError::Io {
            path: PathBuf::from("<stdout>"),
            operation: "print groups",
            source,
        }
    })
}
