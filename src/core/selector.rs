//! Selector strategies used to locate insertion points.
//!
//! A binding carries an ordered list of strategies. The first strategy that
//! matches at least one element wins; matches are never merged across
//! strategies.

use crate::core::dom;
use kuchikiki::NodeRef;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorStrategy {
    /// `id` 屬性完全相符
    Id(String),
    /// class 清單中包含此名稱
    Class(String),
    /// 任意屬性相符，例如 `data-bind="fullName"`
    Attr { name: String, value: String },
    /// 一般 CSS 選擇器
    Css(String),
    /// 文字內容啟發式：只取最內層包含該文字的元素
    Contains {
        text: String,
        #[serde(default)]
        tag: Option<String>,
    },
    /// 區段容器：緊接在已解析標題之後的兄弟元素
    AfterHeader {
        #[serde(default)]
        tag: Option<String>,
        #[serde(default)]
        within: Option<String>,
    },
}

impl SelectorStrategy {
    pub fn id(value: &str) -> Self {
        SelectorStrategy::Id(value.to_string())
    }

    pub fn class(value: &str) -> Self {
        SelectorStrategy::Class(value.to_string())
    }

    pub fn attr(name: &str, value: &str) -> Self {
        SelectorStrategy::Attr {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    pub fn contains(text: &str, tag: Option<&str>) -> Self {
        SelectorStrategy::Contains {
            text: text.to_string(),
            tag: tag.map(str::to_string),
        }
    }

    /// 回傳文件順序的符合元素
    pub fn matches(&self, document: &NodeRef, header: Option<&NodeRef>) -> Vec<NodeRef> {
        match self {
            SelectorStrategy::Id(id) => elements(document)
                .filter(|node| dom::get_attr(node, "id").as_deref() == Some(id.as_str()))
                .collect(),
            SelectorStrategy::Class(class) => elements(document)
                .filter(|node| dom::has_class(node, class))
                .collect(),
            SelectorStrategy::Attr { name, value } => elements(document)
                .filter(|node| dom::get_attr(node, name).as_deref() == Some(value.as_str()))
                .collect(),
            SelectorStrategy::Css(css) => match document.select(css) {
                Ok(selection) => selection.map(|el| el.as_node().clone()).collect(),
                Err(()) => Vec::new(),
            },
            SelectorStrategy::Contains { text, tag } => innermost(
                elements(document)
                    .filter(|node| tag.as_deref().map_or(true, |t| dom::is_tag(node, t)))
                    .filter(|node| node.text_contents().contains(text.as_str()))
                    .collect(),
            ),
            SelectorStrategy::AfterHeader { tag, within } => {
                let Some(header) = header else {
                    return Vec::new();
                };
                let Some(sibling) = header.following_siblings().find(|n| n.as_element().is_some())
                else {
                    return Vec::new();
                };
                if tag.as_deref().map_or(false, |t| !dom::is_tag(&sibling, t)) {
                    return Vec::new();
                }
                match within {
                    Some(css) => match sibling.select(css) {
                        Ok(selection) => selection.map(|el| el.as_node().clone()).collect(),
                        Err(()) => Vec::new(),
                    },
                    None => vec![sibling],
                }
            }
        }
    }
}

fn elements(document: &NodeRef) -> impl Iterator<Item = NodeRef> + '_ {
    document
        .descendants()
        .filter(|node| node.as_element().is_some())
}

/// 候選元素中去掉「祖先也在候選內」的外層元素
fn innermost(candidates: Vec<NodeRef>) -> Vec<NodeRef> {
    candidates
        .iter()
        .filter(|candidate| {
            !candidates
                .iter()
                .any(|other| other != *candidate && dom::is_ancestor_of(candidate, other))
        })
        .cloned()
        .collect()
}

/// 解析結果：勝出的策略序號與符合的元素
#[derive(Debug, Clone)]
pub struct Resolution {
    pub strategy: usize,
    pub nodes: Vec<NodeRef>,
}

pub fn resolve(
    strategies: &[SelectorStrategy],
    document: &NodeRef,
    header: Option<&NodeRef>,
) -> Option<Resolution> {
    strategies.iter().enumerate().find_map(|(index, strategy)| {
        let nodes = strategy.matches(document, header);
        if nodes.is_empty() {
            None
        } else {
            Some(Resolution {
                strategy: index,
                nodes,
            })
        }
    })
}
