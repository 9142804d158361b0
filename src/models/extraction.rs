use serde_json::Value as JsonValue;

/// 提取结果
///
/// 策略或 LLM 兜底产出的候选答案。置信度落在 [0, 1]，
/// 只用于结果间的取舍，不代表概率保证。
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// 候选答案（数值、文本或结构化值）
    pub value: JsonValue,
    /// 策略自评的可信度
    pub confidence: f64,
    /// 产生该结果的策略名称
    pub source: &'static str,
}

impl ExtractionResult {
    pub fn new(value: impl Into<JsonValue>, confidence: f64, source: &'static str) -> Self {
        Self {
            value: value.into(),
            confidence,
            source,
        }
    }
}
