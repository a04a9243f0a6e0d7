// Adapters layer: concrete implementations for external systems (templates on disk, record stores, http server, export)

pub mod export;
pub mod http;
pub mod pages;
pub mod server;
pub mod storage;

pub use http::HttpRecordStore;
pub use server::{router, AppState};
pub use storage::{FileRecordStore, TemplateLibrary};
