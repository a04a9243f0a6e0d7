//! Per-template manifests: which record value goes to which insertion point.
//!
//! A manifest lives next to the template asset as `manifest.toml`. Templates
//! without one use [`TemplateManifest::standard`], which follows the
//! `portfolio-*` / `social-*` id convention with class and `data-*`
//! attribute fallbacks.

use crate::core::links::LinkScheme;
use crate::core::selector::SelectorStrategy;
use crate::domain::model::{RecordField, SectionSource};
use crate::utils::error::{FolioError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_true")]
    pub inherit_standard: bool,
    #[serde(default)]
    pub document: DocumentBinding,
    #[serde(default)]
    pub fields: Vec<FieldBinding>,
    #[serde(default)]
    pub sections: Vec<SectionBinding>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentBinding {
    /// 例如 `"{fullName} | Portfolio"`
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Image,
    Link,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pick {
    #[default]
    All,
    First,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldBinding {
    pub name: String,
    pub source: RecordField,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub scheme: LinkScheme,
    #[serde(default)]
    pub placeholder: bool,
    #[serde(default)]
    pub pick: Pick,
    pub strategies: Vec<SelectorStrategy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionBinding {
    pub name: String,
    pub source: SectionSource,
    #[serde(default)]
    pub header: Vec<SelectorStrategy>,
    pub container: Vec<SelectorStrategy>,
    #[serde(default)]
    pub item_markup: Option<String>,
}

fn default_version() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

impl FieldBinding {
    fn conventional(
        name: &str,
        source: RecordField,
        kind: FieldKind,
        id: &str,
        bind_attr: &str,
        bind_key: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            source,
            kind,
            scheme: LinkScheme::Web,
            placeholder: false,
            pick: Pick::All,
            strategies: vec![
                SelectorStrategy::id(id),
                SelectorStrategy::class(id),
                SelectorStrategy::attr(bind_attr, bind_key),
            ],
        }
    }

    fn text(name: &str, source: RecordField, id: &str) -> Self {
        Self::conventional(name, source, FieldKind::Text, id, "data-bind", name)
    }

    fn image(name: &str, id: &str) -> Self {
        let mut binding = Self::conventional(
            name,
            RecordField::ProfilePhoto,
            FieldKind::Image,
            id,
            "data-bind-img",
            name,
        );
        binding.placeholder = true;
        binding
    }

    /// 依序追加以紀錄鍵比對的屬性策略
    fn with_attr_fallbacks(mut self, attr: &str, keys: &[&str]) -> Self {
        self.strategies
            .extend(keys.iter().map(|key| SelectorStrategy::attr(attr, key)));
        self
    }

    /// 社群連結的綁定名稱與 id 相同，例如 `social-github`
    fn social(network: &str, source: RecordField, scheme: LinkScheme) -> Self {
        let id = format!("social-{}", network);
        let mut binding = Self::conventional(
            &id,
            source,
            FieldKind::Link,
            &id,
            "data-bind-link",
            &format!("socialLinks.{}", network),
        );
        binding.scheme = scheme;
        binding
    }
}

impl SectionBinding {
    fn conventional(source: SectionSource) -> Self {
        let key = source.as_str();
        Self {
            name: key.to_string(),
            source,
            header: vec![
                SelectorStrategy::id(&format!("portfolio-{}-header", key)),
                SelectorStrategy::class(&format!("portfolio-{}-header", key)),
            ],
            container: vec![
                SelectorStrategy::id(&format!("portfolio-{}", key)),
                SelectorStrategy::class(&format!("portfolio-{}", key)),
                SelectorStrategy::attr("data-loop", key),
                SelectorStrategy::attr("data-loop-inline", key),
            ],
            item_markup: None,
        }
    }
}

impl TemplateManifest {
    /// 內建的標準清單
    pub fn standard() -> Self {
        Self {
            name: Some("standard".to_string()),
            version: 1,
            inherit_standard: false,
            document: DocumentBinding {
                title: Some("{fullName} | Portfolio".to_string()),
                description: Some("{professionalTitle}".to_string()),
            },
            fields: vec![
                FieldBinding::text("fullName", RecordField::FullName, "portfolio-name"),
                FieldBinding::text(
                    "professionalTitle",
                    RecordField::ProfessionalTitle,
                    "portfolio-title",
                ),
                FieldBinding::text("aboutMe", RecordField::AboutMe, "portfolio-bio"),
                FieldBinding::text("domain", RecordField::Domain, "portfolio-domain"),
                FieldBinding::text("email", RecordField::Email, "portfolio-email"),
                FieldBinding::text("phone", RecordField::Phone, "portfolio-phone"),
                FieldBinding::text("location", RecordField::Location, "portfolio-location"),
                FieldBinding::image("heroImage", "portfolio-hero-image")
                    .with_attr_fallbacks("data-bind-img", &["profilePhotoUrl", "profilePhoto"]),
                FieldBinding::image("mainImage", "portfolio-main-image"),
                FieldBinding::social("github", RecordField::Github, LinkScheme::Web),
                FieldBinding::social("linkedin", RecordField::Linkedin, LinkScheme::Web),
                FieldBinding::social("twitter", RecordField::Twitter, LinkScheme::Web),
                FieldBinding::social("website", RecordField::Website, LinkScheme::Web),
                FieldBinding::social("email", RecordField::Email, LinkScheme::Email),
            ],
            sections: vec![
                SectionBinding::conventional(SectionSource::Education),
                SectionBinding::conventional(SectionSource::Projects),
                SectionBinding::conventional(SectionSource::Skills),
                SectionBinding::conventional(SectionSource::Certifications),
            ],
        }
    }

    pub fn from_file<P: AsRef<Path>>(template_id: &str, path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FolioError::IoError)?;
        Self::from_toml_str(template_id, &content)
    }

    pub fn from_toml_str(template_id: &str, content: &str) -> Result<Self> {
        let manifest: TemplateManifest =
            toml::from_str(content).map_err(|e| FolioError::ManifestError {
                template_id: template_id.to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;
        manifest.validate(template_id)?;
        Ok(manifest.resolved())
    }

    /// 補上標準清單中未被覆寫的綁定
    pub fn resolved(mut self) -> Self {
        if !self.inherit_standard {
            return self;
        }
        let standard = Self::standard();

        let declared: HashSet<String> = self.fields.iter().map(|f| f.name.clone()).collect();
        self.fields.extend(
            standard
                .fields
                .into_iter()
                .filter(|f| !declared.contains(&f.name)),
        );

        let declared: HashSet<String> = self.sections.iter().map(|s| s.name.clone()).collect();
        self.sections.extend(
            standard
                .sections
                .into_iter()
                .filter(|s| !declared.contains(&s.name)),
        );

        if self.document.title.is_none() {
            self.document.title = standard.document.title;
        }
        if self.document.description.is_none() {
            self.document.description = standard.document.description;
        }
        self.inherit_standard = false;
        self
    }

    pub fn validate(&self, template_id: &str) -> Result<()> {
        let error = |message: String| FolioError::ManifestError {
            template_id: template_id.to_string(),
            message,
        };

        let mut names = HashSet::new();
        for field in &self.fields {
            if !names.insert(format!("field:{}", field.name)) {
                return Err(error(format!("duplicate field binding '{}'", field.name)));
            }
            if field.strategies.is_empty() {
                return Err(error(format!("field '{}' has no strategies", field.name)));
            }
            check_strategies(&field.strategies).map_err(&error)?;
        }
        for section in &self.sections {
            if !names.insert(format!("section:{}", section.name)) {
                return Err(error(format!("duplicate section binding '{}'", section.name)));
            }
            if section.container.is_empty() {
                return Err(error(format!(
                    "section '{}' has no container strategies",
                    section.name
                )));
            }
            check_strategies(&section.header).map_err(&error)?;
            check_strategies(&section.container).map_err(&error)?;
        }
        Ok(())
    }
}

fn check_strategies(strategies: &[SelectorStrategy]) -> std::result::Result<(), String> {
    for strategy in strategies {
        match strategy {
            SelectorStrategy::Css(css)
            | SelectorStrategy::AfterHeader {
                within: Some(css), ..
            } => {
                kuchikiki::Selectors::compile(css)
                    .map_err(|()| format!("invalid CSS selector '{}'", css))?;
            }
            SelectorStrategy::Contains { text, .. } if text.trim().is_empty() => {
                return Err("contains strategy needs non-empty text".to_string());
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_manifest_is_valid() {
        let manifest = TemplateManifest::standard();
        assert!(manifest.validate("standard").is_ok());
        assert_eq!(manifest.sections.len(), 4);
        let github = manifest.fields.iter().find(|f| f.name == "social-github").unwrap();
        assert_eq!(github.strategies[0], SelectorStrategy::id("social-github"));
        assert_eq!(github.kind, FieldKind::Link);
    }

    #[test]
    fn test_declared_fields_override_standard() {
        let manifest = TemplateManifest::from_toml_str(
            "template01",
            r#"
name = "Modern Professional"

[document]
title = "{fullName} - Developer"

[[fields]]
name = "fullName"
source = "fullName"
strategies = [{ contains = { text = "TechNexus", tag = "h2" } }]
"#,
        )
        .unwrap();

        let full_name: Vec<_> = manifest
            .fields
            .iter()
            .filter(|f| f.name == "fullName")
            .collect();
        assert_eq!(full_name.len(), 1);
        assert_eq!(
            full_name[0].strategies,
            vec![SelectorStrategy::contains("TechNexus", Some("h2"))]
        );
        assert!(manifest.fields.iter().any(|f| f.name == "aboutMe"));
        assert_eq!(manifest.sections.len(), 4);
        assert_eq!(manifest.document.title.as_deref(), Some("{fullName} - Developer"));
        assert_eq!(
            manifest.document.description.as_deref(),
            Some("{professionalTitle}")
        );
    }

    #[test]
    fn test_invalid_css_is_rejected() {
        let result = TemplateManifest::from_toml_str(
            "template02",
            r#"
inherit_standard = false

[[sections]]
name = "projects"
source = "projects"
container = [{ css = "div[[" }]
"#,
        );
        assert!(matches!(result, Err(FolioError::ManifestError { .. })));
    }

    #[test]
    fn test_unknown_source_is_rejected() {
        let result = TemplateManifest::from_toml_str(
            "template02",
            r#"
[[fields]]
name = "x"
source = "favouriteColour"
strategies = [{ id = "x" }]
"#,
        );
        assert!(result.is_err());
    }
}
