//! 页面内容解码 - 业务能力层
//!
//! 把抓取到的原始页面变成"题目文本 + 提交地址"：
//! - 识别 atob("…") 包裹的 base64 文档（外层页面只是伪装壳）
//! - 按优先级提取题目文本
//! - 按优先级定位提交端点
//!
//! 解码和解析失败在本层内部消化：失败就退回把原始页面当作文档，
//! 绝不向上抛出。

use base64::{engine::general_purpose::STANDARD, Engine as _};
use regex::Regex;
use tracing::{debug, warn};
use url::Url;

use crate::utils::html;

/// 解码后的页面
#[derive(Debug, Clone)]
pub struct DecodedPage {
    /// 题目文本（可能为空字符串，调用方自行判断）
    pub question_text: String,
    /// 提交端点，找不到时为 None（窗口视为无法求解）
    pub submit_url: Option<String>,
    /// 实际承载内容的文档（解码后的内层页面，或原始页面本身）
    pub document_html: String,
}

/// 页面内容解码器
pub struct ContentDecoder;

impl ContentDecoder {
    pub fn new() -> Self {
        Self
    }

    /// 解码页面并提取题目与提交地址
    pub fn decode(&self, raw_html: &str, page_url: &str) -> DecodedPage {
        let document_html = self.unwrap_document(raw_html);

        let question_text = self.extract_question(&document_html);
        if question_text.is_empty() {
            warn!("⚠️ 页面中没有提取到题目文本: {}", page_url);
        }

        // 提交地址优先在内层文档里找，找不到再扫原始页面
        let submit_url = find_submit_url(&document_html, page_url)
            .or_else(|| find_submit_url(raw_html, page_url));

        DecodedPage {
            question_text,
            submit_url,
            document_html,
        }
    }

    /// 识别并解开 atob("…") 包裹的内层文档
    ///
    /// 没有包裹层或解码失败时原样返回外层页面
    fn unwrap_document(&self, raw_html: &str) -> String {
        let re = match Regex::new(r#"atob\("([^"]+)"\)"#) {
            Ok(re) => re,
            Err(_) => return raw_html.to_string(),
        };
        let Some(caps) = re.captures(raw_html) else {
            return raw_html.to_string();
        };

        match STANDARD.decode(&caps[1]) {
            Ok(bytes) => {
                debug!("检测到 base64 包裹文档，已解码 {} 字节", bytes.len());
                String::from_utf8_lossy(&bytes).to_string()
            }
            Err(e) => {
                debug!("base64 解码失败，按原始页面处理: {}", e);
                raw_html.to_string()
            }
        }
    }

    /// 按优先级提取题目文本
    ///
    /// id="result" 元素 → class="question" 内容块 → 整个文档的纯文本
    fn extract_question(&self, document_html: &str) -> String {
        if let Some(inner) = html::find_element_by_id(document_html, "result") {
            let text = html::text_content(&inner);
            if !text.is_empty() {
                return text;
            }
        }
        if let Some(inner) = html::find_element_by_class(document_html, "question") {
            let text = html::text_content(&inner);
            if !text.is_empty() {
                return text;
            }
        }
        html::text_content(document_html)
    }
}

/// 按优先级定位提交端点
///
/// form action → 路径含 submit/answer 的绝对 URL → JSON 形式的 "url" 字段 → 任意绝对 URL
fn find_submit_url(html_text: &str, base_url: &str) -> Option<String> {
    // 1. form action（相对地址按页面地址补全）
    if let Some(action) = html::find_form_action(html_text) {
        if let Some(resolved) = resolve_url(base_url, &action) {
            return Some(resolved);
        }
    }

    // 2. 路径里带提交特征词的绝对 URL
    let urls = html::absolute_urls(html_text);
    for u in &urls {
        if let Ok(parsed) = Url::parse(u) {
            let path = parsed.path().to_lowercase();
            if path.contains("submit") || path.contains("answer") {
                return Some(u.clone());
            }
        }
    }

    // 3. JSON 形式的 "url" 字段（绝对地址直接用，根相对路径补全）
    if let Ok(re) = Regex::new(r#""url"\s*:\s*"([^"]+)""#) {
        if let Some(caps) = re.captures(html_text) {
            let value = &caps[1];
            if value.starts_with("http://") || value.starts_with("https://") {
                return Some(value.to_string());
            }
            if let Some(resolved) = resolve_url(base_url, value) {
                return Some(resolved);
            }
        }
    }

    // 4. 兜底：页面里的第一个绝对 URL
    urls.into_iter().next()
}

/// 把相对地址解析为绝对地址
fn resolve_url(base_url: &str, target: &str) -> Option<String> {
    Url::parse(base_url)
        .ok()?
        .join(target)
        .ok()
        .map(|u| u.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://judge.example.com/quiz/1";

    #[test]
    fn test_decode_plain_page() {
        let html = r#"<html><div id="result">What is 2+2?</div>
            <form action="/submit"></form></html>"#;
        let page = ContentDecoder::new().decode(html, BASE);
        assert_eq!(page.question_text, "What is 2+2?");
        assert_eq!(
            page.submit_url.as_deref(),
            Some("http://judge.example.com/submit")
        );
    }

    /// base64 编解码往返应还原原始文档
    #[test]
    fn test_unwrap_document_round_trip() {
        let inner = r#"<div id="result">hidden question</div>"#;
        let encoded = STANDARD.encode(inner);
        assert_eq!(STANDARD.decode(&encoded).unwrap(), inner.as_bytes());

        let outer = format!(
            r#"<html><script>document.write(atob("{}"));</script></html>"#,
            encoded
        );
        let page = ContentDecoder::new().decode(&outer, BASE);
        assert_eq!(page.document_html, inner);
        assert_eq!(page.question_text, "hidden question");
    }

    /// 解码失败时退回原始页面，不报错
    #[test]
    fn test_invalid_base64_falls_back_to_raw() {
        let html = r#"<html><script>atob("!!!not-base64!!!")</script><div class="question">Q?</div></html>"#;
        let page = ContentDecoder::new().decode(html, BASE);
        assert_eq!(page.question_text, "Q?");
    }

    /// 题目提取优先级：id=result 优先于 class=question
    #[test]
    fn test_question_priority() {
        let html = r#"<div class="question">second</div><div id="result">first</div>"#;
        let page = ContentDecoder::new().decode(html, BASE);
        assert_eq!(page.question_text, "first");
    }

    #[test]
    fn test_question_falls_back_to_full_text() {
        let html = "<p>no markers here</p>";
        let page = ContentDecoder::new().decode(html, BASE);
        assert_eq!(page.question_text, "no markers here");
    }

    /// 提交地址优先级：form action 优先于特征词 URL
    #[test]
    fn test_submit_url_form_action_wins() {
        let html = r#"<form action="http://judge.example.com/form-submit"></form>
            <p>http://other.example.com/api/submit</p>"#;
        let page = ContentDecoder::new().decode(html, BASE);
        assert_eq!(
            page.submit_url.as_deref(),
            Some("http://judge.example.com/form-submit")
        );
    }

    #[test]
    fn test_submit_url_token_match() {
        let html = r#"<p>see http://judge.example.com/static/logo.png and
            http://judge.example.com/api/answer here</p>"#;
        let page = ContentDecoder::new().decode(html, BASE);
        assert_eq!(
            page.submit_url.as_deref(),
            Some("http://judge.example.com/api/answer")
        );
    }

    #[test]
    fn test_submit_url_json_field_root_relative() {
        let html = r#"<script>var cfg = {"url": "/grade/now"};</script>"#;
        let page = ContentDecoder::new().decode(html, BASE);
        assert_eq!(
            page.submit_url.as_deref(),
            Some("http://judge.example.com/grade/now")
        );
    }

    #[test]
    fn test_no_submit_url() {
        let html = "<p>nothing useful</p>";
        let page = ContentDecoder::new().decode(html, BASE);
        assert!(page.submit_url.is_none());
    }
}
