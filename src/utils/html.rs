//! HTML 扫描辅助模块
//!
//! 针对不可信页面的宽容提取：大小写不敏感的标签定位、
//! 标签剥离、实体还原、空白归一。不依赖完整 DOM 解析，
//! 属性顺序和多余空白不影响结果。

use regex::Regex;

/// 按 id 精确查找元素，返回其内部 HTML
pub fn find_element_by_id(html: &str, id: &str) -> Option<String> {
    let pattern = format!(
        r#"(?is)<([a-zA-Z][a-zA-Z0-9]*)\b[^>]*\bid\s*=\s*["']{}["'][^>]*>"#,
        regex::escape(id)
    );
    find_element(html, &pattern)
}

/// 按 class 查找元素（class 属性可包含多个类名，按词匹配），返回其内部 HTML
pub fn find_element_by_class(html: &str, class: &str) -> Option<String> {
    let pattern = format!(
        r#"(?is)<([a-zA-Z][a-zA-Z0-9]*)\b[^>]*\bclass\s*=\s*["'][^"']*\b{}\b[^"']*["'][^>]*>"#,
        regex::escape(class)
    );
    find_element(html, &pattern)
}

/// 根据开始标签的正则定位元素并截取内部内容
fn find_element(html: &str, open_pattern: &str) -> Option<String> {
    let re = Regex::new(open_pattern).ok()?;
    let caps = re.captures(html)?;
    let whole = caps.get(0)?;
    let tag = caps.get(1)?.as_str().to_ascii_lowercase();
    let content_start = whole.end();
    let content_end = find_matching_close(html, content_start, &tag)?;
    Some(html[content_start..content_end].to_string())
}

/// 从 content_start 开始查找与当前标签配对的闭合标签位置（处理同名嵌套）
fn find_matching_close(html: &str, content_start: usize, tag: &str) -> Option<usize> {
    // ASCII 小写化保持字节偏移不变
    let lower: String = html.chars().map(|c| c.to_ascii_lowercase()).collect();
    let open_pat = format!("<{}", tag);
    let close_pat = format!("</{}", tag);

    let mut depth = 1usize;
    let mut pos = content_start;

    while pos < lower.len() {
        let next_open = find_tag_at(&lower, pos, &open_pat);
        let next_close = find_tag_at(&lower, pos, &close_pat);

        match (next_open, next_close) {
            (_, None) => return None,
            (Some(o), Some(c)) if o < c => {
                depth += 1;
                pos = o + open_pat.len();
            }
            (_, Some(c)) => {
                depth -= 1;
                if depth == 0 {
                    return Some(c);
                }
                pos = c + close_pat.len();
            }
        }
    }
    None
}

/// 查找下一个以 pat 开头且标签名边界完整的位置
fn find_tag_at(lower: &str, from: usize, pat: &str) -> Option<usize> {
    let mut search = from;
    while let Some(found) = lower[search..].find(pat).map(|i| i + search) {
        let after = lower.as_bytes().get(found + pat.len());
        match after {
            Some(b) if b.is_ascii_alphanumeric() => {
                // 前缀命中了更长的标签名（如查 <t 命中 <table），继续向后找
                search = found + pat.len();
            }
            _ => return Some(found),
        }
    }
    None
}

/// 提取纯文本：去掉 script/style 块和全部标签，还原实体，归一空白
pub fn text_content(html: &str) -> String {
    let mut text = html.to_string();

    if let Ok(re) = Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>") {
        text = re.replace_all(&text, " ").to_string();
    }
    if let Ok(re) = Regex::new(r"(?s)<[^>]*>") {
        text = re.replace_all(&text, " ").to_string();
    }

    let text = decode_entities(&text);
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 还原常见 HTML 实体
pub fn decode_entities(text: &str) -> String {
    let mut out = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'");

    if let Ok(re) = Regex::new(r"&#(\d+);") {
        out = re
            .replace_all(&out, |caps: &regex::Captures<'_>| {
                caps[1]
                    .parse::<u32>()
                    .ok()
                    .and_then(char::from_u32)
                    .map(String::from)
                    .unwrap_or_default()
            })
            .to_string();
    }

    // &amp; 最后还原，避免二次解码
    out.replace("&amp;", "&")
}

/// 截取页面中的第一个 table 块（含内部内容，不含外层标签）
pub fn first_table(html: &str) -> Option<String> {
    find_element(html, r"(?is)<(table)\b[^>]*>")
}

/// 将 table 块解析为按行排列的单元格文本
///
/// th 与 td 同等对待，首行即表头行
pub fn table_rows(table_html: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();

    let row_re = match Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr\s*>") {
        Ok(re) => re,
        Err(_) => return rows,
    };
    let cell_re = match Regex::new(r"(?is)<t[hd]\b[^>]*>(.*?)</t[hd]\s*>") {
        Ok(re) => re,
        Err(_) => return rows,
    };

    for row_caps in row_re.captures_iter(table_html) {
        let row_html = &row_caps[1];
        let cells: Vec<String> = cell_re
            .captures_iter(row_html)
            .map(|c| text_content(&c[1]))
            .collect();
        if !cells.is_empty() {
            rows.push(cells);
        }
    }
    rows
}

/// 提取页面中所有超链接的 href 原始值
pub fn find_links(html: &str) -> Vec<String> {
    let re = match Regex::new(r#"(?is)<a\b[^>]*\bhref\s*=\s*["']([^"']+)["']"#) {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };
    re.captures_iter(html).map(|c| c[1].to_string()).collect()
}

/// 提取第一个 form 的 action 属性
pub fn find_form_action(html: &str) -> Option<String> {
    let re = Regex::new(r#"(?is)<form\b[^>]*\baction\s*=\s*["']([^"']+)["']"#).ok()?;
    re.captures(html).map(|c| c[1].to_string())
}

/// 提取页面中出现的所有绝对 URL 字面量
pub fn absolute_urls(html: &str) -> Vec<String> {
    let re = match Regex::new(r#"https?://[^\s"'<>]+"#) {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };
    re.find_iter(html).map(|m| m.as_str().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_element_by_id() {
        let html = r#"<html><body><div id="result">What is 1+1?</div></body></html>"#;
        assert_eq!(
            find_element_by_id(html, "result").as_deref(),
            Some("What is 1+1?")
        );
    }

    /// 同名嵌套元素应匹配到正确的闭合标签
    #[test]
    fn test_find_element_nested() {
        let html = r#"<div id="result">outer <div>inner</div> tail</div><div>after</div>"#;
        let inner = find_element_by_id(html, "result").unwrap();
        assert_eq!(inner, "outer <div>inner</div> tail");
    }

    #[test]
    fn test_find_element_by_class_token() {
        let html = r#"<div class="box question large">Q?</div>"#;
        assert_eq!(find_element_by_class(html, "question").as_deref(), Some("Q?"));
        assert!(find_element_by_class(html, "quest").is_none());
    }

    #[test]
    fn test_text_content_strips_script_and_entities() {
        let html = "<p>a &amp; b</p><script>var x = 1;</script><p>c&nbsp;d</p>";
        assert_eq!(text_content(html), "a & b c d");
    }

    #[test]
    fn test_table_rows() {
        let html = "<table><tr><th>value</th></tr><tr><td>1,200</td></tr><tr><td>300</td></tr></table>";
        let table = first_table(html).unwrap();
        let rows = table_rows(&table);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["value"]);
        assert_eq!(rows[1], vec!["1,200"]);
        assert_eq!(rows[2], vec!["300"]);
    }

    #[test]
    fn test_find_links_and_form_action() {
        let html = r#"<a href="/files/data.csv">csv</a><form method="post" action="/submit"></form>"#;
        assert_eq!(find_links(html), vec!["/files/data.csv"]);
        assert_eq!(find_form_action(html).as_deref(), Some("/submit"));
    }
}
