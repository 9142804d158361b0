//! 答案提交 - 业务能力层
//!
//! 把候选答案 POST 给判题服务器并对响应分类。判题方不可信，
//! 响应可能是带 correct 的 JSON、带下一题 url 的 JSON、两者皆无的
//! JSON，或者纯文本（部分部署用它表示整链完成）。

use std::time::Duration;

use anyhow::Result;
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::SolverError;
use crate::models::{AnswerPayload, Classification, SubmissionOutcome};
use crate::utils::logging::truncate_text;

/// 答案提交客户端
pub struct SubmissionClient {
    client: reqwest::Client,
}

impl SubmissionClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;
        Ok(Self { client })
    }

    /// 提交答案并分类响应
    ///
    /// 传输层失败不向上抛错：归类为 TransportError，窗口由调用方放弃
    pub async fn submit(&self, submit_url: &str, payload: &AnswerPayload) -> SubmissionOutcome {
        info!("📤 提交答案: {} -> {}", payload.url, submit_url);

        let resp = match self.client.post(submit_url).json(payload).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("⚠️ {}", SolverError::transport(submit_url, e));
                return SubmissionOutcome {
                    http_status: None,
                    parsed_body: None,
                    classification: Classification::TransportError,
                };
            }
        };

        let status = resp.status().as_u16();
        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("⚠️ {}", SolverError::transport(submit_url, e));
                return SubmissionOutcome {
                    http_status: Some(status),
                    parsed_body: None,
                    classification: Classification::TransportError,
                };
            }
        };

        let (parsed_body, classification) = classify(&body, &payload.url);
        SubmissionOutcome {
            http_status: Some(status),
            parsed_body,
            classification,
        }
    }
}

/// 对判题响应体分类
///
/// 规则按序评估：非 JSON → 终局；带下一题 url（且非自循环）→ 链条
/// 继续，correct 标志不影响该判定；correct == true → 正确；其余 →
/// 答错不重试
fn classify(body: &str, submitted_url: &str) -> (Option<JsonValue>, Classification) {
    let parsed: JsonValue = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => {
            debug!(
                "{}",
                SolverError::SubmissionFormat {
                    body_preview: truncate_text(body, 80),
                }
            );
            return (None, Classification::TerminalNonJson);
        }
    };

    if let Some(next) = parsed.get("url").and_then(|v| v.as_str()) {
        // 自循环保护：返回的地址和刚提交的一样时按终局处理，不再加窗
        if next == submitted_url {
            warn!("⚠️ {}", SolverError::loop_guard(next));
            return (Some(parsed), Classification::TerminalNonJson);
        }
        let next = next.to_string();
        return (Some(parsed), Classification::ChainContinues(next));
    }

    if parsed.get("correct").and_then(|v| v.as_bool()) == Some(true) {
        return (Some(parsed), Classification::Correct);
    }

    (Some(parsed), Classification::IncorrectContinue)
}
