use crate::utils::error::{FolioError, Result};
use crate::utils::validation::{self, Validate};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "folio")]
#[command(about = "Render student portfolios into static HTML templates")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Render a record into a template and write the HTML
    Render(RenderArgs),
    /// Show which bindings of a template find an insertion point
    Check(CheckArgs),
    /// Write a zip bundle with the rendered page and the record
    Export(ExportArgs),
    /// Serve rendered portfolios over HTTP
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Portfolio record JSON file
    #[arg(short, long)]
    pub record: PathBuf,

    /// Template library root
    #[arg(long, default_value = "./templates")]
    pub templates: PathBuf,

    /// Template id; defaults to the record's templateId
    #[arg(short, long)]
    pub template: Option<String>,

    /// Output file; prints to stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Template library root
    #[arg(long, default_value = "./templates")]
    pub templates: PathBuf,

    /// Template id
    #[arg(short, long)]
    pub template: String,

    /// Record to render; an empty record is used when omitted
    #[arg(short, long)]
    pub record: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Portfolio record JSON file
    #[arg(short, long)]
    pub record: PathBuf,

    /// Template library root
    #[arg(long, default_value = "./templates")]
    pub templates: PathBuf,

    /// Template id; defaults to the record's templateId
    #[arg(short, long)]
    pub template: Option<String>,

    /// Output zip path
    #[arg(short, long, default_value = "./portfolio.zip")]
    pub output: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Configuration file
    #[arg(short, long, default_value = "folio.toml")]
    pub config: PathBuf,

    /// Override the configured port
    #[arg(short, long)]
    pub port: Option<u16>,
}

fn path_str(path: &std::path::Path) -> Result<&str> {
    path.to_str().ok_or_else(|| FolioError::InvalidConfigValueError {
        field: "path".to_string(),
        value: path.display().to_string(),
        reason: "Path is not valid UTF-8".to_string(),
    })
}

impl Validate for Cli {
    fn validate(&self) -> Result<()> {
        match &self.command {
            Command::Render(args) => {
                validation::validate_path("templates", path_str(&args.templates)?)?;
                validation::validate_path("record", path_str(&args.record)?)?;
                if let Some(output) = &args.output {
                    validation::validate_path("output", path_str(output)?)?;
                }
            }
            Command::Check(args) => {
                validation::validate_path("templates", path_str(&args.templates)?)?;
                validation::validate_non_empty_string("template", &args.template)?;
                if let Some(record) = &args.record {
                    validation::validate_path("record", path_str(record)?)?;
                }
            }
            Command::Export(args) => {
                validation::validate_path("templates", path_str(&args.templates)?)?;
                validation::validate_path("record", path_str(&args.record)?)?;
                validation::validate_path("output", path_str(&args.output)?)?;
            }
            Command::Serve(args) => {
                validation::validate_path("config", path_str(&args.config)?)?;
                if let Some(port) = args.port {
                    validation::validate_range("port", port, 1, u16::MAX)?;
                }
            }
        }
        Ok(())
    }
}
