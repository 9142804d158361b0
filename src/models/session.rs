use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::models::submission::SubmissionOutcome;

/// 前门收到的求解请求
#[derive(Debug, Clone, Deserialize)]
pub struct SolveRequest {
    /// 起始挑战页面地址
    pub url: String,
    pub email: String,
    pub secret: String,
}

/// 单次提交的审计记录
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionRecord {
    /// 被解答的挑战页面
    pub question_url: String,
    /// 提交的答案
    pub answer: JsonValue,
    /// 产生答案的策略置信度
    pub confidence: f64,
    /// 产生答案的策略名称
    pub handler: String,
    /// 判题结果
    pub outcome: SubmissionOutcome,
}

/// 会话结果：按时间顺序排列的提交历史
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionResult {
    pub results: Vec<SubmissionRecord>,
}
