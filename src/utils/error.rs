use thiserror::Error;

#[derive(Error, Debug)]
pub enum FolioError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: String, id: String },

    #[error("Invalid template id: {id}")]
    InvalidTemplateId { id: String },

    #[error("Template '{template_id}' could not be parsed: {reason}")]
    TemplateParse { template_id: String, reason: String },

    #[error("Manifest error in '{template_id}': {message}")]
    ManifestError {
        template_id: String,
        message: String,
    },

    #[error("Record store error: {message}")]
    RecordStoreError { message: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Lookup,
    Template,
    Upstream,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FolioError {
    pub fn not_found(kind: &str, id: &str) -> Self {
        FolioError::NotFound {
            kind: kind.to_string(),
            id: id.to_string(),
        }
    }

    pub fn template_parse(template_id: &str, reason: impl Into<String>) -> Self {
        FolioError::TemplateParse {
            template_id: template_id.to_string(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            FolioError::NotFound { .. } | FolioError::InvalidTemplateId { .. } => {
                ErrorCategory::Lookup
            }
            FolioError::TemplateParse { .. } | FolioError::ManifestError { .. } => {
                ErrorCategory::Template
            }
            FolioError::RecordStoreError { .. } | FolioError::ApiError(_) => {
                ErrorCategory::Upstream
            }
            FolioError::ConfigError { .. }
            | FolioError::ConfigValidationError { .. }
            | FolioError::InvalidConfigValueError { .. }
            | FolioError::MissingConfigError { .. } => ErrorCategory::Configuration,
            FolioError::ZipError(_)
            | FolioError::IoError(_)
            | FolioError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Lookup => ErrorSeverity::Low,
            ErrorCategory::Upstream => ErrorSeverity::Medium,
            ErrorCategory::Template | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 對應的 HTTP 狀態碼
    pub fn status_code(&self) -> u16 {
        match self {
            FolioError::NotFound { .. } => 404,
            FolioError::InvalidTemplateId { .. } => 400,
            FolioError::RecordStoreError { .. } | FolioError::ApiError(_) => 502,
            _ => 500,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            FolioError::NotFound { .. } => "Check the portfolio handle or template id",
            FolioError::InvalidTemplateId { .. } => {
                "Template ids look like 'template01'; pick one from the template library"
            }
            FolioError::TemplateParse { .. } => {
                "The template asset is broken; fix the markup file, retrying will not help"
            }
            FolioError::ManifestError { .. } => "Fix the template's manifest.toml",
            FolioError::RecordStoreError { .. } | FolioError::ApiError(_) => {
                "Check that the record store endpoint is reachable and the API key is valid"
            }
            FolioError::ConfigError { .. }
            | FolioError::ConfigValidationError { .. }
            | FolioError::InvalidConfigValueError { .. }
            | FolioError::MissingConfigError { .. } => "Review the configuration file",
            FolioError::ZipError(_) | FolioError::IoError(_) => {
                "Check file permissions and available disk space"
            }
            FolioError::SerializationError(_) => "Check that the record JSON is well formed",
        }
    }

    /// 不洩漏內部細節的訊息，可直接顯示給終端使用者
    pub fn user_friendly_message(&self) -> String {
        match self {
            FolioError::NotFound { kind, .. } => format!("The requested {} was not found.", kind),
            FolioError::InvalidTemplateId { .. } => "Invalid template id.".to_string(),
            FolioError::TemplateParse { .. } | FolioError::ManifestError { .. } => {
                "This portfolio template is currently unavailable.".to_string()
            }
            FolioError::RecordStoreError { .. } | FolioError::ApiError(_) => {
                "Portfolio data is temporarily unavailable.".to_string()
            }
            FolioError::ConfigError { .. }
            | FolioError::ConfigValidationError { .. }
            | FolioError::InvalidConfigValueError { .. }
            | FolioError::MissingConfigError { .. } => format!("Configuration problem: {}", self),
            _ => "Something went wrong while rendering this portfolio.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FolioError>;
