use crate::core::manifest::TemplateManifest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 作品集資料，由外部 CRUD 表單寫入，渲染時唯讀
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortfolioRecord {
    pub username: Option<String>,
    pub template_id: Option<String>,
    pub status: PortfolioStatus,

    pub full_name: Option<String>,
    pub professional_title: Option<String>,
    pub about_me: Option<String>,
    pub domain: Option<String>,
    pub email: Option<String>,
    pub public_email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    #[serde(alias = "profilePhoto")]
    pub profile_photo_url: Option<String>,
    pub resume_url: Option<String>,

    pub projects: Vec<Project>,
    pub education: Vec<Education>,
    pub skills: Vec<Skill>,
    pub certifications: Vec<Certification>,
    pub social_links: SocialLinks,

    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortfolioStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub repo_link: Option<String>,
    pub image_url: Option<String>,
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub current: bool,
    pub description: Option<String>,
}

/// 技能可以是純字串或 `{ "name": ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Skill {
    Name(String),
    Named { name: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Certification {
    Title(String),
    Detailed(CertificationDetail),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CertificationDetail {
    pub name: Option<String>,
    pub issuer: Option<String>,
    pub date: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialLinks {
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
}

/// 紀錄中可綁定到單一元素的欄位
///
/// 別名讓模板可以直接使用紀錄 JSON 的鍵，包含 `socialLinks.github` 這類巢狀路徑。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordField {
    FullName,
    ProfessionalTitle,
    AboutMe,
    Domain,
    #[serde(alias = "publicEmail", alias = "socialLinks.email")]
    Email,
    Phone,
    Location,
    #[serde(alias = "profilePhotoUrl")]
    ProfilePhoto,
    ResumeUrl,
    #[serde(alias = "socialLinks.github")]
    Github,
    #[serde(alias = "socialLinks.linkedin")]
    Linkedin,
    #[serde(alias = "socialLinks.twitter")]
    Twitter,
    #[serde(alias = "socialLinks.website")]
    Website,
}

/// 紀錄中的重複區段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionSource {
    Projects,
    Education,
    Skills,
    Certifications,
}

impl SectionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionSource::Projects => "projects",
            SectionSource::Education => "education",
            SectionSource::Skills => "skills",
            SectionSource::Certifications => "certifications",
        }
    }
}

/// 空字串與純空白一律視為缺值
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl RecordField {
    /// 接受欄位名稱或紀錄 JSON 的鍵
    pub fn from_key(key: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(key.to_string())).ok()
    }

    /// 值本身是網址的欄位
    pub fn is_link(&self) -> bool {
        matches!(
            self,
            RecordField::ResumeUrl
                | RecordField::Github
                | RecordField::Linkedin
                | RecordField::Twitter
                | RecordField::Website
        )
    }
}

impl PortfolioRecord {
    pub fn is_active(&self) -> bool {
        self.status == PortfolioStatus::Active
    }

    /// 聯絡信箱：socialLinks.email > publicEmail > email
    pub fn contact_email(&self) -> Option<&str> {
        non_empty(&self.social_links.email)
            .or_else(|| non_empty(&self.public_email))
            .or_else(|| non_empty(&self.email))
    }

    pub fn field(&self, field: RecordField) -> Option<&str> {
        match field {
            RecordField::FullName => non_empty(&self.full_name),
            RecordField::ProfessionalTitle => non_empty(&self.professional_title),
            RecordField::AboutMe => non_empty(&self.about_me),
            RecordField::Domain => non_empty(&self.domain),
            RecordField::Email => self.contact_email(),
            RecordField::Phone => non_empty(&self.phone),
            RecordField::Location => non_empty(&self.location),
            RecordField::ProfilePhoto => non_empty(&self.profile_photo_url),
            RecordField::ResumeUrl => non_empty(&self.resume_url),
            RecordField::Github => non_empty(&self.social_links.github),
            RecordField::Linkedin => non_empty(&self.social_links.linkedin),
            RecordField::Twitter => non_empty(&self.social_links.twitter),
            RecordField::Website => non_empty(&self.social_links.website),
        }
    }

    pub fn section_len(&self, section: SectionSource) -> usize {
        match section {
            SectionSource::Projects => self.projects.len(),
            SectionSource::Education => self.education.len(),
            SectionSource::Skills => self.skills.len(),
            SectionSource::Certifications => self.certifications.len(),
        }
    }

    /// 以 `data-show-if` / 標題格式使用的鍵查詢是否有值
    pub fn has_value(&self, key: &str) -> bool {
        if let Some(field) = RecordField::from_key(key) {
            return self.field(field).is_some();
        }
        match key {
            "projects" => !self.projects.is_empty(),
            "education" => !self.education.is_empty(),
            "skills" => !self.skills.is_empty(),
            "certifications" => !self.certifications.is_empty(),
            "socialLinks" => [
                RecordField::Github,
                RecordField::Linkedin,
                RecordField::Twitter,
                RecordField::Website,
            ]
            .iter()
            .any(|f| self.field(*f).is_some()),
            _ => false,
        }
    }
}

impl Skill {
    pub fn name(&self) -> &str {
        match self {
            Skill::Name(name) => name.trim(),
            Skill::Named { name } => name.trim(),
        }
    }
}

/// 模板文件：原始標記加上其插入點清單
#[derive(Debug, Clone)]
pub struct TemplateDocument {
    pub template_id: String,
    pub markup: String,
    pub manifest: TemplateManifest,
}

impl TemplateDocument {
    pub fn new(template_id: impl Into<String>, markup: impl Into<String>) -> Self {
        Self {
            template_id: template_id.into(),
            markup: markup.into(),
            manifest: TemplateManifest::standard(),
        }
    }

    pub fn with_manifest(mut self, manifest: TemplateManifest) -> Self {
        self.manifest = manifest;
        self
    }
}

/// 渲染結果，每次請求重新產生
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMarkup {
    pub template_id: String,
    pub html: String,
}

impl RenderedMarkup {
    pub fn as_str(&self) -> &str {
        &self.html
    }

    pub fn into_string(self) -> String {
        self.html
    }
}
