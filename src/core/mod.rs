pub mod dom;
pub mod fragment;
pub mod injector;
pub mod links;
pub mod manifest;
pub mod placeholder;
pub mod selector;
pub mod style;

pub use crate::domain::model::{PortfolioRecord, RenderedMarkup, TemplateDocument};
pub use crate::domain::ports::{RecordStore, TemplateSource};
pub use crate::utils::error::Result;
pub use injector::{BindingOutcome, RenderReport, TemplateInjector};
