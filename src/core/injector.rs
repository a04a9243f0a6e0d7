use crate::core::dom;
use crate::core::fragment::{self, ItemFields};
use crate::core::links::{normalize_link, LinkScheme};
use crate::core::manifest::{FieldBinding, FieldKind, Pick, SectionBinding};
use crate::core::placeholder::silhouette_data_uri;
use crate::core::selector::{resolve, Resolution};
use crate::domain::model::{
    PortfolioRecord, RecordField, RenderedMarkup, SectionSource, TemplateDocument,
};
use crate::utils::error::Result;
use kuchikiki::NodeRef;
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// 單一綁定的處理結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingOutcome {
    /// 已填入值
    Bound { strategy: usize, elements: usize },
    /// 缺值，以剪影佔位圖代替
    Placeholder { strategy: usize, elements: usize },
    /// 缺值，元素已隱藏
    Hidden { strategy: usize, elements: usize },
    /// 區段已依序產生項目
    Rendered { strategy: usize, items: usize },
    /// 區段為空，標題與容器已移除
    Removed,
    /// 模板中沒有對應的插入點
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingReport {
    pub name: String,
    pub outcome: BindingOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub template_id: String,
    pub bindings: Vec<BindingReport>,
}

impl RenderReport {
    pub fn outcome(&self, name: &str) -> Option<&BindingOutcome> {
        self.bindings
            .iter()
            .find(|b| b.name == name)
            .map(|b| &b.outcome)
    }

    pub fn skipped(&self) -> impl Iterator<Item = &BindingReport> {
        self.bindings
            .iter()
            .filter(|b| b.outcome == BindingOutcome::Skipped)
    }

    fn push(&mut self, name: &str, outcome: BindingOutcome) {
        match &outcome {
            BindingOutcome::Skipped => {
                tracing::debug!("⏭️  {}: no insertion point in {}", name, self.template_id)
            }
            other => tracing::debug!("🔗 {}: {:?}", name, other),
        }
        self.bindings.push(BindingReport {
            name: name.to_string(),
            outcome,
        });
    }
}

/// 已解析的區段插入點
struct ResolvedSection<'m> {
    binding: &'m SectionBinding,
    header: Option<NodeRef>,
    container: Option<(usize, NodeRef)>,
    prototype: String,
}

/// 模板注入引擎
///
/// `render` 是純函式：每次呼叫都重新解析模板，不保留任何狀態，
/// 同樣的輸入必定產生逐位元組相同的輸出。
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateInjector;

impl TemplateInjector {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        record: &PortfolioRecord,
        template: &TemplateDocument,
    ) -> Result<RenderedMarkup> {
        self.render_with_report(record, template)
            .map(|(markup, _)| markup)
    }

    pub fn render_with_report(
        &self,
        record: &PortfolioRecord,
        template: &TemplateDocument,
    ) -> Result<(RenderedMarkup, RenderReport)> {
        let template_id = template.template_id.as_str();
        let document = dom::parse_document(template_id, &template.markup)?;
        let manifest = &template.manifest;
        let mut report = RenderReport {
            template_id: template_id.to_string(),
            bindings: Vec::new(),
        };

        // 先在原始文件上定位所有插入點，再開始改寫
        let fields: Vec<(&FieldBinding, Option<Resolution>)> = manifest
            .fields
            .iter()
            .map(|binding| (binding, resolve(&binding.strategies, &document, None)))
            .collect();
        let sections: Vec<ResolvedSection> = manifest
            .sections
            .iter()
            .map(|binding| resolve_section(binding, &document))
            .collect();
        let loose = loose_bindings(&document, &fields, &sections);
        let conditionals = dom::elements_with_attr(&document, "data-show-if");

        apply_document(&document, record, manifest);

        for (binding, resolution) in fields {
            let outcome = match resolution {
                Some(resolution) => bind_field(record, binding, resolution),
                None => BindingOutcome::Skipped,
            };
            report.push(&binding.name, outcome);
        }

        for section in sections {
            let outcome = render_section(record, &section);
            report.push(&section.binding.name, outcome);
        }

        for (attr, node) in loose {
            let key = dom::get_attr(&node, attr).unwrap_or_default();
            let key = key.trim();
            let outcome = bind_loose(record, attr, key, &node);
            report.push(&format!("{}={}", attr, key), outcome);
        }

        for node in conditionals {
            let key = dom::get_attr(&node, "data-show-if").unwrap_or_default();
            if record.has_value(key.trim()) {
                dom::show(&node);
            } else {
                dom::hide(&node);
            }
        }

        let html = dom::serialize(template_id, &document)?;
        Ok((
            RenderedMarkup {
                template_id: template_id.to_string(),
                html,
            },
            report,
        ))
    }
}

fn resolve_section<'m>(binding: &'m SectionBinding, document: &NodeRef) -> ResolvedSection<'m> {
    let header = resolve(&binding.header, document, None).and_then(|r| r.nodes.into_iter().next());
    let container = resolve(&binding.container, document, header.as_ref())
        .and_then(|r| r.nodes.into_iter().next().map(|node| (r.strategy, node)));

    // 原型優先序：容器內的 <template> > manifest item_markup > 內建片段
    let template_child = container.as_ref().and_then(|(_, node)| {
        node.children()
            .find(|child| dom::is_tag(child, "template"))
    });
    let prototype = match (&template_child, &binding.item_markup) {
        (Some(template), _) => dom::inner_markup(template),
        (None, Some(markup)) => markup.clone(),
        (None, None) => fragment::default_item_markup(binding.source).to_string(),
    };

    ResolvedSection {
        binding,
        header,
        container,
        prototype,
    }
}

fn picked(binding: &FieldBinding, nodes: Vec<NodeRef>) -> Vec<NodeRef> {
    match binding.pick {
        Pick::All => nodes,
        Pick::First => nodes.into_iter().take(1).collect(),
    }
}

fn bind_field(
    record: &PortfolioRecord,
    binding: &FieldBinding,
    resolution: Resolution,
) -> BindingOutcome {
    let strategy = resolution.strategy;
    let nodes = picked(binding, resolution.nodes);
    let elements = nodes.len();
    let value = record.field(binding.source);

    match (binding.kind, value) {
        (FieldKind::Text, Some(text)) => {
            nodes.iter().for_each(|node| dom::set_text(node, text));
            BindingOutcome::Bound { strategy, elements }
        }
        (FieldKind::Image, Some(url)) => {
            let alt = image_label(record, binding);
            nodes.iter().for_each(|node| dom::set_image(node, url, &alt));
            BindingOutcome::Bound { strategy, elements }
        }
        (FieldKind::Image, None) if binding.placeholder => {
            let alt = image_label(record, binding);
            let placeholder = silhouette_data_uri();
            nodes
                .iter()
                .for_each(|node| dom::set_image(node, &placeholder, &alt));
            BindingOutcome::Placeholder { strategy, elements }
        }
        (FieldKind::Link, Some(url)) => {
            let href = normalize_link(url, binding.scheme);
            nodes.iter().for_each(|node| {
                dom::set_attr(node, "href", &href);
                dom::show(node);
            });
            BindingOutcome::Bound { strategy, elements }
        }
        (FieldKind::Link, None) => {
            nodes.iter().for_each(dom::hide_link);
            BindingOutcome::Hidden { strategy, elements }
        }
        (_, None) => {
            nodes.iter().for_each(dom::hide);
            BindingOutcome::Hidden { strategy, elements }
        }
    }
}

fn image_label(record: &PortfolioRecord, binding: &FieldBinding) -> String {
    match binding.source {
        RecordField::ProfilePhoto => record
            .field(RecordField::FullName)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} image", binding.name)),
        _ => format!("{} image", binding.name),
    }
}

const LOOSE_ATTRS: [&str; 2] = ["data-bind", "data-bind-img"];

/// 清單沒有涵蓋、也不在區段容器內的 `data-bind` / `data-bind-img` 元素
fn loose_bindings(
    document: &NodeRef,
    fields: &[(&FieldBinding, Option<Resolution>)],
    sections: &[ResolvedSection],
) -> Vec<(&'static str, NodeRef)> {
    let claimed: Vec<&NodeRef> = fields
        .iter()
        .filter_map(|(_, resolution)| resolution.as_ref())
        .flat_map(|resolution| resolution.nodes.iter())
        .collect();
    let containers: Vec<&NodeRef> = sections
        .iter()
        .filter_map(|section| section.container.as_ref().map(|(_, node)| node))
        .collect();

    LOOSE_ATTRS
        .iter()
        .flat_map(|attr| {
            dom::elements_with_attr(document, attr)
                .into_iter()
                .map(move |node| (*attr, node))
        })
        .filter(|(_, node)| !claimed.contains(&node))
        .filter(|(_, node)| {
            !containers
                .iter()
                .any(|container| *container == node || dom::is_ancestor_of(container, node))
        })
        .collect()
}

fn link_scheme(field: RecordField) -> Option<LinkScheme> {
    match field {
        RecordField::Email => Some(LinkScheme::Email),
        RecordField::Phone => Some(LinkScheme::Tel),
        field if field.is_link() => Some(LinkScheme::Web),
        _ => None,
    }
}

/// 以紀錄鍵直接綁定；鍵不是紀錄欄位時保持原樣
fn bind_loose(record: &PortfolioRecord, attr: &str, key: &str, node: &NodeRef) -> BindingOutcome {
    let Some(field) = RecordField::from_key(key) else {
        return BindingOutcome::Skipped;
    };
    let bound = BindingOutcome::Bound {
        strategy: 0,
        elements: 1,
    };

    match (attr, record.field(field)) {
        ("data-bind-img", Some(url)) => {
            let alt = dom::get_attr(node, "alt")
                .filter(|alt| !alt.trim().is_empty())
                .unwrap_or_else(|| loose_image_label(record, field, key));
            dom::set_image(node, url, &alt);
            dom::show(node);
            bound
        }
        ("data-bind-img", None) if dom::has_attr(node, "data-placeholder") => {
            let alt = loose_image_label(record, field, key);
            dom::set_image(node, &silhouette_data_uri(), &alt);
            BindingOutcome::Placeholder {
                strategy: 0,
                elements: 1,
            }
        }
        (_, Some(value)) => {
            dom::set_text(node, value);
            if let (true, Some(scheme)) = (dom::is_tag(node, "a"), link_scheme(field)) {
                dom::set_attr(node, "href", &normalize_link(value, scheme));
            }
            dom::show(node);
            bound
        }
        (_, None) => {
            if dom::is_tag(node, "a") {
                dom::hide_link(node);
            } else {
                dom::hide(node);
            }
            BindingOutcome::Hidden {
                strategy: 0,
                elements: 1,
            }
        }
    }
}

fn loose_image_label(record: &PortfolioRecord, field: RecordField, key: &str) -> String {
    let name = match field {
        RecordField::ProfilePhoto => record.field(RecordField::FullName),
        _ => None,
    };
    name.map(str::to_string)
        .unwrap_or_else(|| format!("{} image", key))
}

fn render_section(record: &PortfolioRecord, section: &ResolvedSection) -> BindingOutcome {
    let source = section.binding.source;
    if record.section_len(source) == 0 {
        // 空集合：標題與容器一起移除
        let mut removed = false;
        if let Some(header) = &section.header {
            header.detach();
            removed = true;
        }
        if let Some((_, container)) = &section.container {
            container.detach();
            removed = true;
        }
        return if removed {
            BindingOutcome::Removed
        } else {
            BindingOutcome::Skipped
        };
    }

    let Some((strategy, container)) = &section.container else {
        return BindingOutcome::Skipped;
    };

    dom::clear_children(container);
    let items = match source {
        SectionSource::Projects => append_items(container, &section.prototype, &record.projects),
        SectionSource::Education => {
            append_items(container, &section.prototype, &record.education)
        }
        SectionSource::Skills => append_items(container, &section.prototype, &record.skills),
        SectionSource::Certifications => {
            append_items(container, &section.prototype, &record.certifications)
        }
    };
    dom::show(container);
    if let Some(header) = &section.header {
        dom::show(header);
    }

    BindingOutcome::Rendered {
        strategy: *strategy,
        items,
    }
}

/// 依原始順序逐一附加，不排序也不去重
fn append_items<T: ItemFields>(container: &NodeRef, prototype: &str, items: &[T]) -> usize {
    for (index, item) in items.iter().enumerate() {
        for node in fragment::build_item(prototype, item, index) {
            container.append(node);
        }
    }
    items.len()
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{([\w.]+)\}").expect("format pattern is a valid regex"))
}

/// 套用格式字串；任一引用的欄位缺值時回傳 None
pub fn format_with_record(format: &str, record: &PortfolioRecord) -> Option<String> {
    let pattern = placeholder_pattern();
    let all_present = pattern.captures_iter(format).all(|caps| {
        RecordField::from_key(&caps[1])
            .and_then(|field| record.field(field))
            .is_some()
    });
    if !all_present {
        return None;
    }
    Some(
        pattern
            .replace_all(format, |caps: &Captures| {
                RecordField::from_key(&caps[1])
                    .and_then(|field| record.field(field))
                    .unwrap_or_default()
                    .to_string()
            })
            .to_string(),
    )
}

fn apply_document(
    document: &NodeRef,
    record: &PortfolioRecord,
    manifest: &crate::core::manifest::TemplateManifest,
) {
    if let Some(title) = manifest
        .document
        .title
        .as_deref()
        .and_then(|format| format_with_record(format, record))
    {
        if let Ok(node) = document.select_first("head > title") {
            dom::set_text(node.as_node(), &title);
        } else if let Ok(head) = document.select_first("head") {
            if let Some(node) = dom::create_element("title") {
                dom::set_text(&node, &title);
                head.as_node().append(node);
            }
        }
    }

    if let Some(description) = manifest
        .document
        .description
        .as_deref()
        .and_then(|format| format_with_record(format, record))
    {
        if let Ok(node) = document.select_first("meta[name=\"description\"]") {
            dom::set_attr(node.as_node(), "content", &description);
        } else if let Ok(head) = document.select_first("head") {
            if let Some(node) = dom::create_element("meta") {
                dom::set_attr(&node, "name", "description");
                dom::set_attr(&node, "content", &description);
                head.as_node().append(node);
            }
        }
    }
}
