pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::Cli;
pub use crate::config::AppConfig;

pub use crate::adapters::{FileRecordStore, HttpRecordStore, TemplateLibrary};
pub use crate::core::{BindingOutcome, RenderReport, TemplateInjector};
pub use crate::domain::model::{PortfolioRecord, RenderedMarkup, TemplateDocument};
pub use crate::utils::error::{FolioError, Result};
