use serde::Serialize;
use serde_json::Value as JsonValue;

/// 提交给判题服务器的请求体
#[derive(Debug, Clone, Serialize)]
pub struct AnswerPayload {
    pub email: String,
    pub secret: String,
    pub url: String,
    pub answer: JsonValue,
}

/// 判题响应的分类结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "next_url")]
pub enum Classification {
    /// 回答正确，窗口完成
    Correct,
    /// 回答错误且没有后续地址，窗口一次性放弃
    IncorrectContinue,
    /// 响应携带下一题地址，链条继续（无论 correct 标志如何）
    ChainContinues(String),
    /// 响应不是 JSON，视为判题方的终局信号
    TerminalNonJson,
    /// 传输层失败（连接错误、超时），窗口放弃
    TransportError,
}

/// 一次提交的完整结果
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    /// HTTP 状态码，传输失败时为 None
    pub http_status: Option<u16>,
    /// 解析出的 JSON 响应体，非 JSON 时为 None
    pub parsed_body: Option<JsonValue>,
    pub classification: Classification,
}

impl SubmissionOutcome {
    /// 取出链条的下一题地址（仅 ChainContinues 有）
    pub fn next_url(&self) -> Option<&str> {
        match &self.classification {
            Classification::ChainContinues(url) => Some(url),
            _ => None,
        }
    }
}
