//! 嵌入式结构化答案策略
//!
//! 页面里藏着第二种 base64 载荷：atob(`…`)（反引号语法，区别于
//! 页面伪装层的 atob("…")）。解码后在文本里找第一个花括号 JSON
//! 对象，带 answer 字段就直接采用。结构化信号最可信。

use anyhow::Result;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use regex::Regex;
use serde_json::Value as JsonValue;

use crate::extraction::{AnswerHandler, HandlerInput};
use crate::models::ExtractionResult;

/// 嵌入式结构化答案策略
pub struct EmbeddedAnswerHandler;

impl EmbeddedAnswerHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AnswerHandler for EmbeddedAnswerHandler {
    fn name(&self) -> &'static str {
        "embedded_answer"
    }

    async fn try_extract(&self, input: &HandlerInput<'_>) -> Result<Option<ExtractionResult>> {
        let re = match Regex::new(r"atob\(`([^`]+)`\)") {
            Ok(re) => re,
            Err(_) => return Ok(None),
        };
        let Some(caps) = re.captures(input.raw_html) else {
            return Ok(None);
        };

        let Ok(bytes) = STANDARD.decode(&caps[1]) else {
            return Ok(None);
        };
        let text = String::from_utf8_lossy(&bytes);

        // 解码文本里的第一个花括号对象
        let Ok(json_re) = Regex::new(r"\{[\s\S]*?\}") else {
            return Ok(None);
        };
        let Some(candidate) = json_re.find(&text) else {
            return Ok(None);
        };

        let Ok(parsed) = serde_json::from_str::<JsonValue>(candidate.as_str()) else {
            return Ok(None);
        };
        let Some(answer) = parsed.get("answer") else {
            return Ok(None);
        };

        Ok(Some(ExtractionResult::new(
            answer.clone(),
            0.99,
            self.name(),
        )))
    }
}
