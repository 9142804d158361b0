//! LLM 兜底求解 - 业务能力层
//!
//! 只在本地策略链全部落空时调用：把题目文本交给外部补全服务，
//! 要求严格返回单键 JSON 对象。不关心窗口和流程。
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务

use std::time::Duration;

use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use regex::Regex;
use serde_json::Value as JsonValue;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::SolverError;
use crate::models::ExtractionResult;

/// 约束补全输出的系统指令
const SYSTEM_INSTRUCTION: &str = "You answer data analysis quiz questions accurately. \
    Respond with strictly a single-key JSON object of the form {\"answer\": ...} \
    and nothing else.";

/// LLM 兜底求解器
///
/// 职责：
/// - 调用补全服务计算答案
/// - 宽容解析返回内容（JSON / 代码块 / 花括号子串 / 裸字面量）
/// - 管理重试与线性退避
pub struct AnswerResolver {
    client: Client<OpenAIConfig>,
    model_name: String,
    enabled: bool,
    max_retries: usize,
    backoff_step: Duration,
    call_timeout: Duration,
}

impl AnswerResolver {
    /// 创建新的兜底求解器
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
            enabled: !config.llm_api_key.is_empty(),
            max_retries: config.llm_max_retries.max(1),
            backoff_step: Duration::from_millis(config.llm_backoff_ms),
            call_timeout: Duration::from_secs(config.http_timeout_secs),
        }
    }

    /// 是否配置了补全服务
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// 计算答案
    ///
    /// 传输或解析失败会按线性退避重试；重试耗尽后返回 Resolver 错误，
    /// 调用方应把窗口视为无法求解
    pub async fn resolve(&self, question_text: &str) -> Result<ExtractionResult> {
        let mut last_reason = String::new();

        for attempt in 1..=self.max_retries {
            // 单次调用有独立超时，不依赖会话级预算
            let call = timeout(self.call_timeout, self.ask(question_text)).await;
            match call.unwrap_or_else(|_| Err(anyhow::anyhow!("LLM 调用超时"))) {
                Ok(content) => {
                    if let Some(answer) = parse_answer(&content) {
                        debug!("LLM 返回答案: {}", answer);
                        // 没有其它信号时按约定视为权威结果
                        return Ok(ExtractionResult::new(answer, 1.0, "llm_resolver"));
                    }
                    warn!(
                        "LLM 返回内容无法解析 (尝试 {}/{}): {}",
                        attempt,
                        self.max_retries,
                        crate::utils::logging::truncate_text(&content, 80)
                    );
                    last_reason = "返回内容无法解析".to_string();
                }
                Err(e) => {
                    warn!("LLM 调用失败 (尝试 {}/{}): {}", attempt, self.max_retries, e);
                    last_reason = e.to_string();
                }
            }

            if attempt < self.max_retries {
                // 线性递增退避
                sleep(self.backoff_step * attempt as u32).await;
            }
        }

        Err(SolverError::resolver_failed(self.max_retries, last_reason).into())
    }

    /// 单次补全调用
    async fn ask(&self, question_text: &str) -> Result<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(SYSTEM_INSTRUCTION)
            .build()?;
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(question_text)
            .build()?;
        let messages = vec![
            ChatCompletionRequestMessage::System(system_msg),
            ChatCompletionRequestMessage::User(user_msg),
        ];

        // 确定性采样
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.0)
            .max_tokens(500u32)
            .build()?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            anyhow::anyhow!("LLM API 调用失败: {}", e)
        })?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("LLM 返回内容为空"))?;

        Ok(content.trim().to_string())
    }
}

/// 从补全文本中解析出答案值
///
/// 宽容顺序：整体 JSON → 代码块内容 → 花括号子串 → 裸整数/小数/布尔
fn parse_answer(text: &str) -> Option<JsonValue> {
    let value = parse_completion(text)?;
    let answer = unwrap_answer(value);
    if answer.is_null() {
        return None;
    }
    Some(answer)
}

/// 宽容解析补全文本为 JSON 值
fn parse_completion(text: &str) -> Option<JsonValue> {
    let trimmed = text.trim();

    // 1. 整体就是 JSON
    if let Ok(value) = serde_json::from_str::<JsonValue>(trimmed) {
        return Some(value);
    }

    // 2. 围栏代码块
    if let Ok(re) = Regex::new(r"(?s)```(?:json)?\s*(.*?)```") {
        if let Some(caps) = re.captures(trimmed) {
            if let Ok(value) = serde_json::from_str::<JsonValue>(caps[1].trim()) {
                return Some(value);
            }
        }
    }

    // 3. 第一个花括号到最后一个花括号之间的子串
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<JsonValue>(&trimmed[start..=end]) {
                return Some(value);
            }
        }
    }

    // 4. 裸字面量
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(JsonValue::from(i));
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return Some(JsonValue::from(f));
    }
    if let Ok(b) = trimmed.parse::<bool>() {
        return Some(JsonValue::from(b));
    }

    None
}

/// 从单键对象中取出答案值；非对象的值原样返回
fn unwrap_answer(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => {
            if let Some(answer) = map.get("answer") {
                return answer.clone();
            }
            map.into_iter()
                .next()
                .map(|(_, v)| v)
                .unwrap_or(JsonValue::Null)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_direct_json() {
        assert_eq!(parse_answer(r#"{"answer": 42}"#), Some(json!(42)));
    }

    /// 围栏代码块里的 JSON 应被解析出来
    #[test]
    fn test_parse_fenced_code_block() {
        let body = "```json\n{\"answer\": 42}\n```";
        assert_eq!(parse_answer(body), Some(json!(42)));
    }

    #[test]
    fn test_parse_brace_substring() {
        let body = r#"The result is {"answer": "Paris"} as requested."#;
        assert_eq!(parse_answer(body), Some(json!("Paris")));
    }

    #[test]
    fn test_parse_bare_literals() {
        assert_eq!(parse_answer("42"), Some(json!(42)));
        assert_eq!(parse_answer("3.14"), Some(json!(3.14)));
        assert_eq!(parse_answer("true"), Some(json!(true)));
        assert_eq!(parse_answer("no idea"), None);
    }

    /// 单键对象即使键名不是 answer 也取其值
    #[test]
    fn test_unwrap_single_key_object() {
        assert_eq!(parse_answer(r#"{"result": 7}"#), Some(json!(7)));
    }

    /// 实连补全服务的测试
    ///
    /// 运行方式：
    /// ```bash
    /// cargo test test_resolve_live -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_resolve_live() {
        let _ = tracing_subscriber::fmt::try_init();

        let config = crate::config::Config::from_env();
        let resolver = AnswerResolver::new(&config);
        if !resolver.is_enabled() {
            println!("❌ 未配置 LLM_API_KEY，跳过");
            return;
        }

        let result = resolver.resolve("What is 2 + 2?").await;
        match result {
            Ok(extraction) => {
                println!("✅ LLM 返回: {}", extraction.value);
                assert_eq!(extraction.confidence, 1.0);
            }
            Err(e) => panic!("LLM 调用失败: {}", e),
        }
    }
}
