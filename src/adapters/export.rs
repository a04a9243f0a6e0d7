use crate::domain::model::{PortfolioRecord, RenderedMarkup};
use crate::utils::error::Result;
use std::io::Write;
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};

pub const BUNDLE_MARKUP: &str = "index.html";
pub const BUNDLE_RECORD: &str = "portfolio.json";

/// 打包渲染結果與原始紀錄，方便離線部署
pub fn bundle(markup: &RenderedMarkup, record: &PortfolioRecord) -> Result<Vec<u8>> {
    let zip_data = {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

        zip.start_file::<_, ()>(BUNDLE_MARKUP, FileOptions::default())?;
        zip.write_all(markup.as_str().as_bytes())?;

        let json_data = serde_json::to_string_pretty(record)?;
        zip.start_file::<_, ()>(BUNDLE_RECORD, FileOptions::default())?;
        zip.write_all(json_data.as_bytes())?;

        let cursor = zip.finish()?;
        cursor.into_inner()
    };

    tracing::debug!("Built export bundle ({} bytes)", zip_data.len());
    Ok(zip_data)
}

pub async fn write_bundle<P: AsRef<Path>>(
    path: P,
    markup: &RenderedMarkup,
    record: &PortfolioRecord,
) -> Result<()> {
    let zip_data = bundle(markup, record)?;
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path.as_ref(), &zip_data).await?;
    tracing::info!("📁 Export saved to: {}", path.as_ref().display());
    Ok(())
}
