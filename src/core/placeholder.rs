const SILHOUETTE_SVG: &str = concat!(
    "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 128 128'>",
    "<rect width='128' height='128' fill='#e2e8f0'/>",
    "<circle cx='64' cy='50' r='24' fill='#94a3b8'/>",
    "<path d='M20 120c0-24 20-42 44-42s44 18 44 42z' fill='#94a3b8'/>",
    "</svg>"
);

/// 沒有圖片時使用的剪影，固定內容所以每次輸出相同
pub fn silhouette_data_uri() -> String {
    format!(
        "data:image/svg+xml;utf8,{}",
        urlencoding::encode(SILHOUETTE_SVG)
    )
}
