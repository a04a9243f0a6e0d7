use crate::core::manifest::TemplateManifest;
use crate::domain::model::{PortfolioRecord, TemplateDocument};
use crate::domain::ports::{RecordStore, TemplateSource};
use crate::utils::error::{FolioError, Result};
use crate::utils::validation::{self, is_valid_handle};
use regex::Regex;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// 模板資料夾內依序嘗試的標記檔名，`{id}` 會替換成模板 ID
const MARKUP_CANDIDATES: [&str; 3] = ["{id}.html", "index.html", "code.html"];
const MANIFEST_FILE: &str = "manifest.toml";

/// 讀取檔案；不存在時回傳 `Ok(None)`
async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(FolioError::IoError(e)),
    }
}

/// 本機模板庫：`<root>/<template_id>/` 底下放標記與選用的 manifest.toml
#[derive(Debug, Clone)]
pub struct TemplateLibrary {
    root: PathBuf,
    id_pattern: Regex,
}

impl TemplateLibrary {
    pub fn new<P: Into<PathBuf>>(root: P, id_pattern: Regex) -> Self {
        Self {
            root: root.into(),
            id_pattern,
        }
    }

    pub fn template_dir(&self, template_id: &str) -> Result<PathBuf> {
        validation::validate_template_id(&self.id_pattern, template_id)?;
        Ok(self.root.join(template_id))
    }

    /// 只讀取原始標記，不套用任何資料
    pub async fn load_markup(&self, template_id: &str) -> Result<(PathBuf, String)> {
        let dir = self.template_dir(template_id)?;

        for candidate in MARKUP_CANDIDATES {
            let path = dir.join(candidate.replace("{id}", template_id));
            if let Some(bytes) = read_optional(&path).await? {
                let markup = String::from_utf8(bytes).map_err(|_| {
                    FolioError::template_parse(template_id, "template markup is not valid UTF-8")
                })?;
                tracing::debug!("📁 Loaded template {} from {}", template_id, path.display());
                return Ok((path, markup));
            }
        }

        Err(FolioError::not_found("template", template_id))
    }

    pub async fn load_manifest(&self, template_id: &str) -> Result<TemplateManifest> {
        let path = self.template_dir(template_id)?.join(MANIFEST_FILE);
        match read_optional(&path).await? {
            Some(bytes) => {
                let content = String::from_utf8(bytes).map_err(|_| FolioError::ManifestError {
                    template_id: template_id.to_string(),
                    message: "manifest.toml is not valid UTF-8".to_string(),
                })?;
                TemplateManifest::from_toml_str(template_id, &content)
            }
            None => Ok(TemplateManifest::standard()),
        }
    }

    /// 列出符合命名規則的模板 ID（依名稱排序）
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if self.id_pattern.is_match(name) {
                    ids.push(name.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[async_trait::async_trait]
impl TemplateSource for TemplateLibrary {
    async fn load(&self, template_id: &str) -> Result<TemplateDocument> {
        let (_, markup) = self.load_markup(template_id).await?;
        let manifest = self.load_manifest(template_id).await?;
        Ok(TemplateDocument::new(template_id, markup).with_manifest(manifest))
    }
}

/// 從 JSON 檔案讀取單筆紀錄
pub async fn read_record_file<P: AsRef<Path>>(path: P) -> Result<PortfolioRecord> {
    let bytes = tokio::fs::read(path.as_ref()).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// 本機紀錄儲存：`<directory>/<handle>.json`
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    directory: PathBuf,
}

impl FileRecordStore {
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

#[async_trait::async_trait]
impl RecordStore for FileRecordStore {
    async fn fetch(&self, handle: &str) -> Result<Option<PortfolioRecord>> {
        if !is_valid_handle(handle) {
            return Ok(None);
        }
        let path = self.directory.join(format!("{}.json", handle));
        match read_optional(&path).await? {
            Some(bytes) => {
                let record = serde_json::from_slice(&bytes).map_err(|e| {
                    FolioError::RecordStoreError {
                        message: format!("{} is not a valid portfolio record: {}", path.display(), e),
                    }
                })?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }
}
