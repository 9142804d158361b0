//! 答案短语兜底策略
//!
//! 最后一道防线：题目文本里直接写着 "answer is N" 时正则取数。
//! 可信度最低。

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value as JsonValue;

use crate::extraction::{AnswerHandler, HandlerInput};
use crate::models::{table::parse_number, ExtractionResult};

/// 答案短语兜底策略
pub struct AnswerPhraseHandler;

impl AnswerPhraseHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AnswerHandler for AnswerPhraseHandler {
    fn name(&self) -> &'static str {
        "answer_phrase"
    }

    async fn try_extract(&self, input: &HandlerInput<'_>) -> Result<Option<ExtractionResult>> {
        let re = match Regex::new(r"(?i)answer\s*is\s*[:\s]*([0-9.,]+)") {
            Ok(re) => re,
            Err(_) => return Ok(None),
        };
        let Some(caps) = re.captures(input.question_text) else {
            return Ok(None);
        };

        Ok(parse_number(&caps[1])
            .map(|value| ExtractionResult::new(JsonValue::from(value), 0.4, self.name())))
    }
}
