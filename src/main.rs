// LogAtlas - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading (platform default or --config override)
// 3. Logging initialisation (debug mode support)
// 4. Dispatch to the parse / slugify / gazette subcommands

use clap::{Parser, Subcommand};
use logatlas::app::batch;
use logatlas::core::export::ExportFormat;
use logatlas::core::gazette::CountryGazette;
use logatlas::core::geo::slugify_name;
use logatlas::core::parser::ParseConfig;
use logatlas::platform::config::{self, AppConfig, PlatformPaths};
use logatlas::util::{self, error::LogAtlasError};
use std::path::PathBuf;

/// LogAtlas - Web access log decoder and country name gazette.
///
/// Decodes combined-format access log lines into typed records and resolves
/// free-text country names against a slug-indexed lookup table.
#[derive(Parser, Debug)]
#[command(name = "LogAtlas", version, about)]
struct Cli {
    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    /// Read configuration from this file instead of the platform default.
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode an access log and print a summary.
    Parse {
        /// Access log to decode.
        file: PathBuf,

        /// Write decoded records to this path.
        #[arg(short = 'e', long = "export")]
        export: Option<PathBuf>,

        /// Export format: csv or json (defaults to the configured format).
        #[arg(short = 'f', long = "format")]
        format: Option<String>,

        /// Write lines that did not match the grammar to this CSV path.
        #[arg(long = "bad-records")]
        bad_records: Option<PathBuf>,
    },

    /// Print the slug of each name, one per line.
    Slugify {
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Load a country gazette and report on it or resolve names against it.
    Gazette {
        /// Tab-separated lookup table (defaults to the configured table).
        table: Option<PathBuf>,

        /// The table's first row is a header.
        #[arg(long = "headers")]
        headers: bool,

        /// Country names to resolve.
        #[arg(short = 'r', long = "resolve")]
        resolve: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let platform_paths = PlatformPaths::resolve();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| platform_paths.config_file());
    let (app_config, config_warnings) = config::load_config(&config_path);

    util::logging::init(cli.debug, app_config.log_level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "LogAtlas starting"
    );

    // Config warnings are collected before tracing is up; replay them now.
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    if let Err(e) = run(cli.command, &app_config, &platform_paths) {
        tracing::error!(error = %e, "Command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(
    command: Command,
    app_config: &AppConfig,
    platform_paths: &PlatformPaths,
) -> Result<(), LogAtlasError> {
    match command {
        Command::Parse {
            file,
            export,
            format,
            bad_records,
        } => {
            let parse_config = ParseConfig {
                max_parse_errors: app_config.max_parse_errors,
            };
            let result = batch::parse_file(&file, &parse_config)?;
            let summary = result.summary();

            println!("lines:           {}", summary.lines_processed);
            println!("records:         {}", summary.records);
            println!("bad records:     {}", summary.bad_records);
            println!("coercion errors: {}", summary.decode_failures);
            for err in &result.errors {
                println!("  {err}");
            }
            let suppressed = summary.decode_failures - result.errors.len() as u64;
            if suppressed > 0 {
                println!("  ... {suppressed} more not shown");
            }

            if let Some(export_path) = export {
                let name = format.as_deref().unwrap_or(&app_config.export_format);
                let format = ExportFormat::from_name(name).unwrap_or_else(|| {
                    tracing::warn!(format = name, "Unknown export format; using csv");
                    ExportFormat::Csv
                });
                let count = batch::export_records(&result, &export_path, format)?;
                println!("exported {count} records to {}", export_path.display());
            }

            if let Some(bad_path) = bad_records {
                let count = batch::export_bad_records(&result, &bad_path)?;
                println!("exported {count} bad records to {}", bad_path.display());
            }
        }

        Command::Slugify { names } => {
            for name in &names {
                println!("{}", slugify_name(name));
            }
        }

        Command::Gazette {
            table,
            headers,
            resolve,
        } => {
            let path = table
                .or_else(|| app_config.gazette_path.clone())
                .unwrap_or_else(|| platform_paths.default_gazette());
            let has_headers = headers || app_config.gazette_has_headers;
            let gazette = CountryGazette::init_global(&path, has_headers)?;

            if resolve.is_empty() {
                println!(
                    "{} slugs ({} duplicate rows replaced)",
                    gazette.len(),
                    gazette.duplicate_slugs()
                );
            }
            for name in &resolve {
                match gazette.resolve(name) {
                    Some(row) => println!(
                        "{name}\t{}\t{}\t{}\t{}",
                        row.slug, row.country_id, row.country_al3id, row.name
                    ),
                    None => println!("{name}\t(not found: {})", slugify_name(name)),
                }
            }
        }
    }

    Ok(())
}
