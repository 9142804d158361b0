//! 表格求和策略
//!
//! 题目文本暗示"对某列求和"时，解析页面的第一个表格：
//! 优先目标列，没有就找第一个含数值的列，千分位分隔符剥离后求和。

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::extraction::{AnswerHandler, HandlerInput};
use crate::models::{ExtractionResult, Table};
use crate::services::documents::TARGET_COLUMN;
use crate::utils::html;

/// 表格求和策略
pub struct TableSumHandler {
    column: &'static str,
}

impl TableSumHandler {
    pub fn new() -> Self {
        Self {
            column: TARGET_COLUMN,
        }
    }
}

#[async_trait]
impl AnswerHandler for TableSumHandler {
    fn name(&self) -> &'static str {
        "table_sum"
    }

    async fn try_extract(&self, input: &HandlerInput<'_>) -> Result<Option<ExtractionResult>> {
        let question = input.question_text.to_lowercase();
        if !(question.contains("sum") && question.contains(self.column)) {
            return Ok(None);
        }

        let Some(table_html) = html::first_table(input.document_html) else {
            return Ok(None);
        };
        let table = Table::from_rows(html::table_rows(&table_html));
        if table.is_empty() {
            return Ok(None);
        }

        let sum = table
            .sum_column(self.column)
            .or_else(|| table.first_numeric_sum());

        Ok(sum.map(|value| ExtractionResult::new(JsonValue::from(value), 0.92, self.name())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::{Duration, Instant};

    fn input<'a>(question: &'a str, document_html: &'a str) -> HandlerInput<'a> {
        HandlerInput {
            question_text: question,
            raw_html: document_html,
            document_html,
            page_url: "http://judge.example.com/q",
            deadline: Instant::now() + Duration::from_secs(60),
        }
    }

    /// 典型场景：value 列 1,200 + 300 = 1500.0，置信度 0.92
    #[tokio::test]
    async fn test_sum_value_column() {
        let html =
            "<table><tr><th>value</th></tr><tr><td>1,200</td></tr><tr><td>300</td></tr></table>";
        let handler = TableSumHandler::new();
        let result = handler
            .try_extract(&input("What is the sum of the value column?", html))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.value, json!(1500.0));
        assert_eq!(result.confidence, 0.92);
    }

    /// 题目没提到求和时不触发
    #[tokio::test]
    async fn test_requires_sum_keyword() {
        let html = "<table><tr><th>value</th></tr><tr><td>5</td></tr></table>";
        let handler = TableSumHandler::new();
        assert!(handler
            .try_extract(&input("What color is the sky?", html))
            .await
            .unwrap()
            .is_none());
    }

    /// 目标列不存在时落到第一个数值列
    #[tokio::test]
    async fn test_falls_back_to_first_numeric_column() {
        let html = "<table><tr><th>name</th><th>amount</th></tr>\
             <tr><td>a</td><td>10</td></tr><tr><td>b</td><td>20</td></tr></table>";
        let handler = TableSumHandler::new();
        let result = handler
            .try_extract(&input("sum of value please", html))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.value, json!(30.0));
    }

    #[tokio::test]
    async fn test_no_table_in_page() {
        let handler = TableSumHandler::new();
        assert!(handler
            .try_extract(&input("sum of value", "<p>no table</p>"))
            .await
            .unwrap()
            .is_none());
    }
}
