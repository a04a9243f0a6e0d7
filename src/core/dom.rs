//! Thin helpers over the `kuchikiki` tree used by the injector.
//!
//! Every render works on a fresh parse, so these helpers mutate freely.

use crate::core::style;
use crate::utils::error::{FolioError, Result};
use kuchikiki::traits::*;
use kuchikiki::NodeRef;

/// 解析完整模板文件
///
/// html5ever 對大部分錯誤都會容錯修復，這裡只擋下無法當作模板的輸入：
/// 空白文件、完全沒有標記、或沒有 `<body>` (例如 frameset)。
pub fn parse_document(template_id: &str, markup: &str) -> Result<NodeRef> {
    if markup.trim().is_empty() {
        return Err(FolioError::template_parse(template_id, "document is blank"));
    }
    if !contains_markup(markup) {
        return Err(FolioError::template_parse(
            template_id,
            "document contains no markup elements",
        ));
    }

    let document = kuchikiki::parse_html().one(markup);
    if document.select_first("body").is_err() {
        return Err(FolioError::template_parse(
            template_id,
            "document has no body element",
        ));
    }
    Ok(document)
}

fn contains_markup(markup: &str) -> bool {
    markup
        .as_bytes()
        .windows(2)
        .any(|w| w[0] == b'<' && (w[1].is_ascii_alphabetic() || w[1] == b'!'))
}

pub fn serialize(template_id: &str, node: &NodeRef) -> Result<String> {
    let mut buffer = Vec::new();
    node.serialize(&mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| FolioError::template_parse(template_id, format!("serializer output: {}", e)))
}

/// 將片段標記解析成可插入的節點 (已從暫存文件分離)
pub fn parse_fragment(markup: &str) -> Vec<NodeRef> {
    let document =
        kuchikiki::parse_html().one(format!("<!DOCTYPE html><html><body>{}</body></html>", markup));
    let Ok(body) = document.select_first("body") else {
        return Vec::new();
    };
    let nodes: Vec<NodeRef> = body.as_node().children().collect();
    for node in &nodes {
        node.detach();
    }
    nodes
}

pub fn create_element(tag: &str) -> Option<NodeRef> {
    parse_fragment(&format!("<{tag}></{tag}>"))
        .into_iter()
        .find(|node| node.as_element().is_some())
}

/// 以片段序列化的方式取得節點內容，用於複製原型
pub fn inner_markup(node: &NodeRef) -> String {
    let source = node
        .as_element()
        .and_then(|el| el.template_contents.clone())
        .unwrap_or_else(|| node.clone());
    source
        .children()
        .map(|child| child.to_string())
        .collect::<Vec<_>>()
        .join("")
}

pub fn is_tag(node: &NodeRef, tag: &str) -> bool {
    node.as_element()
        .map(|el| el.name.local.as_ref().eq_ignore_ascii_case(tag))
        .unwrap_or(false)
}

pub fn get_attr(node: &NodeRef, name: &str) -> Option<String> {
    node.as_element()
        .and_then(|el| el.attributes.borrow().get(name).map(str::to_string))
}

pub fn has_attr(node: &NodeRef, name: &str) -> bool {
    node.as_element()
        .map(|el| el.attributes.borrow().contains(name))
        .unwrap_or(false)
}

pub fn set_attr(node: &NodeRef, name: &str, value: &str) {
    if let Some(el) = node.as_element() {
        el.attributes.borrow_mut().insert(name, value.to_string());
    }
}

pub fn remove_attr(node: &NodeRef, name: &str) {
    if let Some(el) = node.as_element() {
        el.attributes.borrow_mut().remove(name);
    }
}

pub fn has_class(node: &NodeRef, class: &str) -> bool {
    get_attr(node, "class")
        .map(|classes| classes.split_whitespace().any(|c| c == class))
        .unwrap_or(false)
}

pub fn clear_children(node: &NodeRef) {
    let children: Vec<NodeRef> = node.children().collect();
    for child in children {
        child.detach();
    }
}

/// 以純文字取代內容；序列化時會自動跳脫
pub fn set_text(node: &NodeRef, text: &str) {
    clear_children(node);
    node.append(NodeRef::new_text(text));
}

pub fn hide(node: &NodeRef) {
    let current = get_attr(node, "style").unwrap_or_default();
    set_attr(node, "style", &style::set_declaration(&current, "display", "none"));
}

pub fn show(node: &NodeRef) {
    if let Some(current) = get_attr(node, "style") {
        if style::is_hidden(&current) {
            let remaining = style::remove_declaration(&current, "display");
            if remaining.is_empty() {
                remove_attr(node, "style");
            } else {
                set_attr(node, "style", &remaining);
            }
        }
    }
}

/// 隱藏連結並拿掉 href，避免留下模板的佔位網址
pub fn hide_link(node: &NodeRef) {
    hide(node);
    remove_attr(node, "href");
}

/// `<img>` 設定 src/alt，其餘元素改寫 background-image
pub fn set_image(node: &NodeRef, url: &str, alt: &str) {
    if is_tag(node, "img") {
        set_attr(node, "src", url);
        set_attr(node, "alt", alt);
        remove_attr(node, "srcset");
    } else {
        let current = get_attr(node, "style").unwrap_or_default();
        set_attr(node, "style", &style::with_background_image(&current, url));
        if !has_attr(node, "role") {
            set_attr(node, "role", "img");
        }
        set_attr(node, "aria-label", alt);
    }
}

pub fn elements_with_attr(root: &NodeRef, name: &str) -> Vec<NodeRef> {
    root.inclusive_descendants()
        .filter(|node| has_attr(node, name))
        .collect()
}

pub fn is_ancestor_of(ancestor: &NodeRef, node: &NodeRef) -> bool {
    node.ancestors().any(|a| a == *ancestor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_non_markup() {
        assert!(matches!(
            parse_document("template01", "   "),
            Err(FolioError::TemplateParse { .. })
        ));
        assert!(parse_document("template01", "just some words").is_err());
        assert!(parse_document(
            "template01",
            "<html><frameset><frame src='a.html'></frameset></html>"
        )
        .is_err());
        assert!(parse_document("template01", "<p>hello</p>").is_ok());
    }

    #[test]
    fn test_set_text_escapes() {
        let doc = parse_document("t", "<html><body><h1 id='n'>Old</h1></body></html>").unwrap();
        let h1 = doc.select_first("#n").unwrap().as_node().clone();
        set_text(&h1, "<b>Jane</b> & co");
        let html = serialize("t", &doc).unwrap();
        assert!(html.contains("<h1 id=\"n\">&lt;b&gt;Jane&lt;/b&gt; &amp; co</h1>"));
    }

    #[test]
    fn test_hide_then_show() {
        let doc = parse_document("t", "<body><p id='p' style='color: red'>x</p></body>").unwrap();
        let p = doc.select_first("#p").unwrap().as_node().clone();
        hide(&p);
        assert_eq!(get_attr(&p, "style").as_deref(), Some("color: red; display: none"));
        show(&p);
        assert_eq!(get_attr(&p, "style").as_deref(), Some("color: red"));
    }

    #[test]
    fn test_fragment_and_template_contents() {
        let doc = parse_document(
            "t",
            "<body><ul id='l'><template><li data-bind='name'>x</li></template></ul></body>",
        )
        .unwrap();
        let template = doc.select_first("template").unwrap().as_node().clone();
        assert_eq!(inner_markup(&template), "<li data-bind=\"name\">x</li>");

        let nodes = parse_fragment("<li>a</li><li>b</li>");
        assert_eq!(nodes.len(), 2);
        assert!(nodes.iter().all(|n| n.parent().is_none()));
        assert!(is_tag(&create_element("span").unwrap(), "SPAN"));
    }
}
