mod cli;

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use tally_core::logging;
use tally_core::{ExportConfig, ExportError, ExportFormat, ExportRequest, Language, Role};
use tally_docs::{DocumentAnalyzer, ExportCoordinator, build_sections, parse_document};

use cli::{AudienceArgs, Cli, Command, ExportArgs, PreviewArgs};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let language = cli.command.language();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            let err = ExportError::Config(format!("{err:#}"));
            eprintln!("{}", err.user_message(language));
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = match init_logging(cli.log_dir.as_deref(), &config.log_level) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("warning: logging disabled: {err:#}");
            None
        }
    };

    let outcome = match &cli.command {
        Command::Export(args) => run_export(&config, args),
        Command::Preview(args) => run_preview(args),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(category = ?err.category(), "{err}");
            eprintln!("{}", err.user_message(language));
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<ExportConfig> {
    match path {
        Some(path) => ExportConfig::load_from_path(path),
        None => ExportConfig::load(),
    }
}

fn init_logging(log_dir: Option<&Path>, level: &str) -> Result<logging::WorkerGuard> {
    match log_dir {
        Some(dir) => logging::init_logging_to_dir(dir, &logging::filter_for_level(level)),
        None => logging::init_logging(level),
    }
}

/// Read the input file and parse it into a document.
fn read_document(path: &Path) -> Result<serde_json::Value, ExportError> {
    let raw = std::fs::read(path)
        .with_context(|| format!("Failed to read {}", path.display()))
        .map_err(|err| ExportError::MalformedInput(format!("{err:#}")))?;
    parse_document(&raw)
}

fn resolve_request(
    audience: &AudienceArgs,
    document: &serde_json::Value,
    format: ExportFormat,
) -> ExportRequest {
    let variant = audience
        .variant
        .fixed()
        .unwrap_or_else(|| DocumentAnalyzer::new(document).detect_variant());
    ExportRequest::new(
        variant,
        Role::from_token(&audience.role),
        Language::from_code(&audience.language),
        format,
    )
}

fn run_export(config: &ExportConfig, args: &ExportArgs) -> Result<(), ExportError> {
    let format: ExportFormat = args.format.parse()?;
    let document = read_document(&args.audience.input)?;
    let request = resolve_request(&args.audience, &document, format);

    let artifact = ExportCoordinator::new(config.clone()).export(&document, request)?;

    let path = args.out_dir.join(&artifact.filename);
    write_atomically(&args.out_dir, &path, &artifact.bytes).map_err(ExportError::Render)?;

    info!(path = %path.display(), "export written");
    println!("{}", path.display());
    Ok(())
}

/// Write `bytes` to a temp file beside `path` and rename it into place, so a
/// failed write never leaves a partial export behind.
fn write_atomically(dir: &Path, path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let mut staged = tempfile::Builder::new()
        .prefix(".tally-")
        .suffix(".part")
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    staged
        .write_all(bytes)
        .and_then(|()| staged.as_file().sync_all())
        .with_context(|| format!("Failed to write {}", staged.path().display()))?;
    staged
        .persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn run_preview(args: &PreviewArgs) -> Result<(), ExportError> {
    let document = read_document(&args.audience.input)?;
    // Format does not affect the section layout.
    let request = resolve_request(&args.audience, &document, ExportFormat::DelimitedText);
    let model = build_sections(&document, request.variant, request.role, request.language);

    let json = serde_json::to_string_pretty(&model)
        .context("Failed to serialize section model")
        .map_err(ExportError::Render)?;
    println!("{json}");
    Ok(())
}
