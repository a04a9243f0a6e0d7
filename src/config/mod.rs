#[cfg(feature = "cli")]
pub mod cli;

use crate::adapters::http::HttpRecordStore;
use crate::adapters::storage::{FileRecordStore, TemplateLibrary};
use crate::domain::ports::RecordStore;
use crate::utils::error::{FolioError, Result};
use crate::utils::validation::{self, Validate};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_TEMPLATE_PATTERN: &str = r"^template\d{2}$";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub templates: TemplatesConfig,
    pub record_store: RecordStoreConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub cors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    pub root: String,
    pub default_template: String,
    pub id_pattern: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStoreKind {
    #[default]
    File,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordStoreConfig {
    pub r#type: RecordStoreKind,
    pub endpoint: Option<String>,
    pub collection: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_seconds: u64,
    pub directory: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8080,
            cors: false,
        }
    }
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            root: "./templates".to_string(),
            default_template: "template01".to_string(),
            id_pattern: DEFAULT_TEMPLATE_PATTERN.to_string(),
        }
    }
}

impl Default for RecordStoreConfig {
    fn default() -> Self {
        Self {
            r#type: RecordStoreKind::File,
            endpoint: None,
            collection: "portfolios".to_string(),
            api_key: None,
            timeout_seconds: 10,
            retry_attempts: 2,
            retry_delay_seconds: 1,
            directory: "./records".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FolioError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| FolioError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${RECORD_STORE_KEY})；未設定的變數保留原文
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = validation::compile_pattern("env_substitution", r"\$\{([^}]+)\}")?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("server.bind", &self.server.bind)?;
        validation::validate_range("server.port", self.server.port, 1, u16::MAX)?;

        validation::validate_path("templates.root", &self.templates.root)?;
        let pattern =
            validation::compile_pattern("templates.id_pattern", &self.templates.id_pattern)?;
        if !pattern.is_match(&self.templates.default_template) {
            return Err(FolioError::InvalidConfigValueError {
                field: "templates.default_template".to_string(),
                value: self.templates.default_template.clone(),
                reason: format!("Does not match id_pattern {}", self.templates.id_pattern),
            });
        }

        let store = &self.record_store;
        match store.r#type {
            RecordStoreKind::Http => {
                let endpoint =
                    validation::validate_required_field("record_store.endpoint", &store.endpoint)?;
                validation::validate_url("record_store.endpoint", endpoint)?;
                validation::validate_non_empty_string(
                    "record_store.collection",
                    &store.collection,
                )?;
                validation::validate_range("record_store.timeout_seconds", store.timeout_seconds, 1, 300)?;
                validation::validate_range("record_store.retry_attempts", store.retry_attempts, 0, 10)?;
            }
            RecordStoreKind::File => {
                validation::validate_path("record_store.directory", &store.directory)?;
            }
        }

        match self.logging.level.to_ascii_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(FolioError::InvalidConfigValueError {
                field: "logging.level".to_string(),
                value: other.to_string(),
                reason: "Expected one of trace, debug, info, warn, error".to_string(),
            }),
        }
    }

    pub fn template_library(&self) -> Result<TemplateLibrary> {
        let pattern =
            validation::compile_pattern("templates.id_pattern", &self.templates.id_pattern)?;
        Ok(TemplateLibrary::new(&self.templates.root, pattern))
    }

    /// 程序啟動時建立一次，之後以參數傳遞
    pub fn http_client(&self) -> Result<Client> {
        Ok(Client::builder()
            .timeout(Duration::from_secs(self.record_store.timeout_seconds))
            .build()?)
    }

    pub fn build_record_store(&self, client: Client) -> Result<Arc<dyn RecordStore>> {
        let store = &self.record_store;
        match store.r#type {
            RecordStoreKind::File => Ok(Arc::new(FileRecordStore::new(&store.directory))),
            RecordStoreKind::Http => {
                let endpoint =
                    validation::validate_required_field("record_store.endpoint", &store.endpoint)?;
                let api_key = store
                    .api_key
                    .clone()
                    .filter(|key| !key.trim().is_empty() && !key.starts_with("${"));
                Ok(Arc::new(
                    HttpRecordStore::new(client, endpoint, &store.collection)
                        .with_api_key(api_key)
                        .with_retry(
                            store.retry_attempts,
                            Duration::from_secs(store.retry_delay_seconds),
                        ),
                ))
            }
        }
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
