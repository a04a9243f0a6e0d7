//! Fixed pages served instead of a rendered portfolio.

/// 作品集停用時顯示
pub const MAINTENANCE_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Portfolio under maintenance</title>
<style>
body { font-family: system-ui, sans-serif; display: flex; min-height: 100vh; margin: 0; align-items: center; justify-content: center; background: #f5f5f5; color: #333; }
main { text-align: center; padding: 2rem; }
</style>
</head>
<body>
<main>
<h1>This portfolio is under maintenance</h1>
<p>The owner has temporarily taken this page offline. Please check back later.</p>
</main>
</body>
</html>
"#;

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn error_page(status: u16, message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{status}</title>
</head>
<body>
<main>
<h1>{status}</h1>
<p>{message}</p>
</main>
</body>
</html>
"#,
        status = status,
        message = escape_html(message)
    )
}
