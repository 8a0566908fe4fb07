use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tally_core::{Language, ReportVariant};

#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(about = "Export election and survey results as XLSX or CSV")]
#[command(version)]
pub struct Cli {
    /// Config file (default: ~/.tally/config.json)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write logs here instead of ~/.tally/logs
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Export a result document and write the file
    Export(ExportArgs),
    /// Print the section layout an export would produce, as JSON
    Preview(PreviewArgs),
}

/// Who the report is for, in which language, and which layout.
#[derive(Args, Debug, Clone)]
pub struct AudienceArgs {
    /// Result document (JSON)
    pub input: PathBuf,

    /// `creator` sees everything; any other value gets the viewer layout
    #[arg(long, default_value = "viewer")]
    pub role: String,

    /// Language code (`en` or `ar`)
    #[arg(long = "lang", default_value = "en")]
    pub language: String,

    /// Report layout; `auto` guesses from the document
    #[arg(long, value_enum, default_value_t = VariantArg::Auto)]
    pub variant: VariantArg,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub audience: AudienceArgs,

    /// `excel`/`xlsx` or `csv`
    #[arg(long)]
    pub format: String,

    /// Directory the file is written to
    #[arg(long, default_value = ".", value_name = "DIR")]
    pub out_dir: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub audience: AudienceArgs,
}

impl Command {
    pub fn audience(&self) -> &AudienceArgs {
        match self {
            Self::Export(args) => &args.audience,
            Self::Preview(args) => &args.audience,
        }
    }

    /// Language for user-facing messages, known before anything else loads.
    pub fn language(&self) -> Language {
        Language::from_code(&self.audience().language)
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantArg {
    Auto,
    Election,
    Survey,
}

impl VariantArg {
    /// The explicit variant, or `None` for auto-detection.
    pub fn fixed(self) -> Option<ReportVariant> {
        match self {
            Self::Auto => None,
            Self::Election => Some(ReportVariant::Election),
            Self::Survey => Some(ReportVariant::Survey),
        }
    }
}
