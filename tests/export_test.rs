use anyhow::Result;
use folio_press::adapters::export::{self, BUNDLE_MARKUP, BUNDLE_RECORD};
use folio_press::{PortfolioRecord, TemplateDocument, TemplateInjector};
use std::io::{Cursor, Read};
use tempfile::TempDir;
use zip::ZipArchive;

fn rendered() -> Result<(PortfolioRecord, folio_press::RenderedMarkup)> {
    let record = PortfolioRecord {
        full_name: Some("Jane Doe".to_string()),
        ..Default::default()
    };
    let template = TemplateDocument::new(
        "template02",
        r#"<html><body><h1 id="portfolio-name">Your Name</h1></body></html>"#,
    );
    let markup = TemplateInjector::new().render(&record, &template)?;
    Ok((record, markup))
}

#[test]
fn test_bundle_contains_markup_and_record() -> Result<()> {
    let (record, markup) = rendered()?;
    let zip_data = export::bundle(&markup, &record)?;

    let mut archive = ZipArchive::new(Cursor::new(zip_data))?;
    assert_eq!(archive.len(), 2);

    let mut html = String::new();
    archive.by_name(BUNDLE_MARKUP)?.read_to_string(&mut html)?;
    assert_eq!(html, markup.as_str());

    let mut json = String::new();
    archive.by_name(BUNDLE_RECORD)?.read_to_string(&mut json)?;
    let restored: PortfolioRecord = serde_json::from_str(&json)?;
    assert_eq!(restored.full_name.as_deref(), Some("Jane Doe"));
    Ok(())
}

#[tokio::test]
async fn test_write_bundle_creates_parent_dirs() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("exports/jane/portfolio.zip");
    let (record, markup) = rendered()?;

    export::write_bundle(&output, &markup, &record).await?;

    let archive = ZipArchive::new(std::fs::File::open(&output)?)?;
    assert!(archive.file_names().any(|name| name == BUNDLE_MARKUP));
    Ok(())
}
