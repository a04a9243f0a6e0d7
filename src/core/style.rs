//! Inline `style` attribute editing that keeps the template's own declarations.

/// 解析 inline style；引號與括號內的 `;` 不視為分隔 (例如 data URI)
pub fn parse_declarations(style: &str) -> Vec<(String, String)> {
    let mut declarations = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for ch in style.chars() {
        match (quote, ch) {
            (Some(q), c) if c == q => {
                quote = None;
                current.push(c);
            }
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(ch);
                current.push(ch);
            }
            (None, '(') => {
                depth += 1;
                current.push(ch);
            }
            (None, ')') => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            (None, ';') if depth == 0 => {
                push_declaration(&mut declarations, &current);
                current.clear();
            }
            (None, c) => current.push(c),
        }
    }
    push_declaration(&mut declarations, &current);
    declarations
}

fn push_declaration(declarations: &mut Vec<(String, String)>, raw: &str) {
    if let Some((name, value)) = raw.split_once(':') {
        let name = name.trim().to_ascii_lowercase();
        let value = value.trim();
        if !name.is_empty() {
            declarations.push((name, value.to_string()));
        }
    }
}

pub fn serialize_declarations(declarations: &[(String, String)]) -> String {
    declarations
        .iter()
        .map(|(name, value)| format!("{}: {}", name, value))
        .collect::<Vec<_>>()
        .join("; ")
}

/// 設定單一宣告：已存在則原位取代，否則附加在最後
pub fn set_declaration(style: &str, name: &str, value: &str) -> String {
    let mut declarations = parse_declarations(style);
    match declarations.iter_mut().find(|(n, _)| n == name) {
        Some(existing) => existing.1 = value.to_string(),
        None => declarations.push((name.to_string(), value.to_string())),
    }
    serialize_declarations(&declarations)
}

pub fn remove_declaration(style: &str, name: &str) -> String {
    let declarations: Vec<_> = parse_declarations(style)
        .into_iter()
        .filter(|(n, _)| n != name)
        .collect();
    serialize_declarations(&declarations)
}

pub fn is_hidden(style: &str) -> bool {
    parse_declarations(style)
        .iter()
        .any(|(n, v)| n == "display" && v.eq_ignore_ascii_case("none"))
}

/// 只改寫 background-image，再補上固定的 cover/center 尺寸宣告
pub fn with_background_image(style: &str, url: &str) -> String {
    let image = format!("url('{}')", url.replace('\'', "%27"));
    let mut declarations: Vec<_> = parse_declarations(style)
        .into_iter()
        .filter(|(n, _)| n != "background-size" && n != "background-position")
        .collect();

    match declarations.iter_mut().find(|(n, _)| n == "background-image") {
        Some(existing) => existing.1 = image,
        None => declarations.push(("background-image".to_string(), image)),
    }
    declarations.push(("background-size".to_string(), "cover".to_string()));
    declarations.push(("background-position".to_string(), "center".to_string()));
    serialize_declarations(&declarations)
}
