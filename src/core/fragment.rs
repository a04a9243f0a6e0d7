//! Item fragments for repeated sections.
//!
//! Every collection item gets a fresh copy of the section's prototype markup,
//! then the `data-bind*` attributes inside the copy are resolved against the
//! item.

use crate::core::dom;
use crate::core::links::{normalize_link, LinkScheme};
use crate::domain::model::{non_empty, Certification, Education, Project, SectionSource, Skill};
use kuchikiki::NodeRef;

pub const PRESENT: &str = "Present";

/// 區段項目可供片段綁定的欄位
pub trait ItemFields {
    fn text(&self, key: &str) -> Option<String>;

    fn list(&self, _key: &str) -> Vec<String> {
        Vec::new()
    }

    fn flag(&self, _key: &str) -> bool {
        false
    }

    /// 圖片替代文字使用的名稱
    fn label(&self) -> Option<String>;
}

/// 顯示用的結束時間：就讀中一律為 "Present"，否則為紀錄值或 "Present"
pub fn display_end(end: Option<&str>, current: bool) -> String {
    if current {
        return PRESENT.to_string();
    }
    end.map(str::to_string)
        .unwrap_or_else(|| PRESENT.to_string())
}

pub fn date_range(start: &str, end: Option<&str>, current: bool) -> String {
    format!("{} — {}", start, display_end(end, current))
}

fn owned(value: &Option<String>) -> Option<String> {
    non_empty(value).map(str::to_string)
}

impl ItemFields for Project {
    fn text(&self, key: &str) -> Option<String> {
        match key {
            "title" | "name" => owned(&self.title),
            "description" => owned(&self.description),
            "link" => owned(&self.link),
            "repoLink" => owned(&self.repo_link),
            "imageUrl" | "image" => owned(&self.image_url),
            "technologies" => {
                let tags = self.list(key);
                (!tags.is_empty()).then(|| tags.join(", "))
            }
            _ => None,
        }
    }

    fn list(&self, key: &str) -> Vec<String> {
        match key {
            "technologies" | "tags" => self
                .technologies
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    fn label(&self) -> Option<String> {
        owned(&self.title)
    }
}

impl ItemFields for Education {
    fn text(&self, key: &str) -> Option<String> {
        match key {
            "institution" | "name" => owned(&self.institution),
            "degree" => owned(&self.degree),
            "fieldOfStudy" => owned(&self.field_of_study),
            "description" => owned(&self.description),
            "startDate" => owned(&self.start_date),
            "endDate" => Some(display_end(non_empty(&self.end_date), self.current)),
            "dateRange" => non_empty(&self.start_date)
                .map(|start| date_range(start, non_empty(&self.end_date), self.current)),
            _ => None,
        }
    }

    fn flag(&self, key: &str) -> bool {
        matches!(key, "current") && self.current
    }

    fn label(&self) -> Option<String> {
        owned(&self.institution)
    }
}

impl ItemFields for Skill {
    fn text(&self, key: &str) -> Option<String> {
        match key {
            "name" | "skill" => Some(self.name().to_string()).filter(|n| !n.is_empty()),
            _ => None,
        }
    }

    fn label(&self) -> Option<String> {
        self.text("name")
    }
}

impl ItemFields for Certification {
    fn text(&self, key: &str) -> Option<String> {
        match self {
            Certification::Title(title) => match key {
                "name" | "title" => Some(title.trim().to_string()).filter(|t| !t.is_empty()),
                _ => None,
            },
            Certification::Detailed(detail) => match key {
                "name" | "title" => owned(&detail.name),
                "issuer" => owned(&detail.issuer),
                "date" => owned(&detail.date),
                "link" => owned(&detail.link),
                _ => None,
            },
        }
    }

    fn label(&self) -> Option<String> {
        self.text("name")
    }
}

/// 各區段的內建項目片段
pub fn default_item_markup(source: SectionSource) -> &'static str {
    match source {
        SectionSource::Projects => concat!(
            "<article class=\"portfolio-project\">",
            "<img class=\"portfolio-project-image\" data-bind-img=\"imageUrl\" data-placeholder>",
            "<h3 class=\"portfolio-project-title\" data-bind=\"title\"></h3>",
            "<p class=\"portfolio-project-description\" data-bind=\"description\"></p>",
            "<ul class=\"portfolio-project-tech\" data-bind-array=\"technologies\"></ul>",
            "<a class=\"portfolio-project-link\" data-bind-link=\"link\" target=\"_blank\" rel=\"noopener\">View Project</a>",
            "<a class=\"portfolio-project-repo\" data-bind-link=\"repoLink\" target=\"_blank\" rel=\"noopener\">Source</a>",
            "</article>"
        ),
        SectionSource::Education => concat!(
            "<div class=\"portfolio-education-item\">",
            "<h3 data-bind=\"institution\"></h3>",
            "<p><span data-bind=\"degree\"></span> <span data-bind=\"fieldOfStudy\"></span></p>",
            "<p class=\"portfolio-education-dates\" data-bind-range=\"startDate,endDate,current\"></p>",
            "</div>"
        ),
        SectionSource::Skills => "<span class=\"portfolio-skill\" data-bind=\"name\"></span>",
        SectionSource::Certifications => concat!(
            "<div class=\"portfolio-certification\">",
            "<span data-bind=\"name\"></span>",
            "</div>"
        ),
    }
}

/// 依原型產生單一項目的節點
pub fn build_item<T: ItemFields>(prototype: &str, item: &T, index: usize) -> Vec<NodeRef> {
    let nodes = dom::parse_fragment(prototype);
    for node in &nodes {
        bind_item(node, item, index);
    }
    nodes
}

fn bind_item<T: ItemFields>(root: &NodeRef, item: &T, index: usize) {
    for node in dom::elements_with_attr(root, "data-bind") {
        let key = dom::get_attr(&node, "data-bind").unwrap_or_default();
        match item.text(&key) {
            Some(value) => dom::set_text(&node, &value),
            None => dom::hide(&node),
        }
    }

    for node in dom::elements_with_attr(root, "data-bind-img") {
        let key = dom::get_attr(&node, "data-bind-img").unwrap_or_default();
        let alt = item
            .label()
            .unwrap_or_else(|| format!("{} image {}", key, index + 1));
        match item.text(&key) {
            Some(url) => dom::set_image(&node, &url, &alt),
            None if dom::has_attr(&node, "data-placeholder") => {
                dom::set_image(&node, &crate::core::placeholder::silhouette_data_uri(), &alt)
            }
            None => dom::hide(&node),
        }
    }

    for node in dom::elements_with_attr(root, "data-bind-link") {
        let key = dom::get_attr(&node, "data-bind-link").unwrap_or_default();
        let scheme = LinkScheme::from_attr(dom::get_attr(&node, "data-link-scheme").as_deref());
        match item.text(&key) {
            Some(url) => dom::set_attr(&node, "href", &normalize_link(&url, scheme)),
            None => dom::hide_link(&node),
        }
    }

    for node in dom::elements_with_attr(root, "data-bind-array") {
        let key = dom::get_attr(&node, "data-bind-array").unwrap_or_default();
        let values = item.list(&key);
        if values.is_empty() {
            dom::hide(&node);
        } else {
            fill_tags(&node, &values);
        }
    }

    for node in dom::elements_with_attr(root, "data-bind-range") {
        let spec = dom::get_attr(&node, "data-bind-range").unwrap_or_default();
        let keys: Vec<&str> = spec.split(',').map(str::trim).collect();
        let start = keys.first().and_then(|k| item.text(k));
        let end_key = keys.get(1).copied().unwrap_or("endDate");
        let current = keys.get(2).map(|k| item.flag(k)).unwrap_or(false);
        match start {
            Some(start) => {
                let end = item.text(end_key);
                dom::set_text(&node, &date_range(&start, end.as_deref(), current));
            }
            None => dom::hide(&node),
        }
    }
}

/// 標籤清單：列表內用 `<li>`，其他元素用 `<span>`
fn fill_tags(node: &NodeRef, values: &[String]) {
    let in_list = dom::is_tag(node, "ul") || dom::is_tag(node, "ol");
    let tag = if in_list { "li" } else { "span" };
    let class = dom::get_attr(node, "data-tag-class").unwrap_or_else(|| "tag".to_string());

    dom::clear_children(node);
    for value in values {
        if let Some(label) = dom::create_element(tag) {
            dom::set_attr(&label, "class", &class);
            dom::set_text(&label, value);
            node.append(label);
        }
    }
}
