use std::fmt;

/// 求解器错误类型
///
/// 所有错误都被限制在当前窗口内：出错的窗口被标记为已放弃，
/// 会话本身只在全局时间预算耗尽时提前结束。
#[derive(Debug)]
pub enum SolverError {
    /// 网络传输错误（连接失败、超时）
    Transport {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 解码或解析页面失败
    Decode {
        reason: String,
    },
    /// 所有提取策略都未产生答案
    ExtractionMiss,
    /// LLM 兜底失败（重试耗尽或返回内容无法解析）
    Resolver {
        attempts: usize,
        reason: String,
    },
    /// 判题服务器响应格式异常
    SubmissionFormat {
        body_preview: String,
    },
    /// 检测到重复 URL 自循环
    LoopGuard {
        url: String,
    },
    /// 配置错误
    Config {
        var_name: String,
        reason: String,
    },
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::Transport { url, source } => {
                write!(f, "网络请求失败 ({}): {}", url, source)
            }
            SolverError::Decode { reason } => write!(f, "页面解码失败: {}", reason),
            SolverError::ExtractionMiss => write!(f, "所有提取策略均未找到答案"),
            SolverError::Resolver { attempts, reason } => {
                write!(f, "LLM 兜底失败 (已重试 {} 次): {}", attempts, reason)
            }
            SolverError::SubmissionFormat { body_preview } => {
                write!(f, "判题响应不是 JSON: {}", body_preview)
            }
            SolverError::LoopGuard { url } => {
                write!(f, "检测到自循环 URL，停止跟进: {}", url)
            }
            SolverError::Config { var_name, reason } => {
                write!(f, "配置错误 ({}): {}", var_name, reason)
            }
        }
    }
}

impl std::error::Error for SolverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolverError::Transport { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

// ========== 便捷构造函数 ==========

impl SolverError {
    /// 创建网络传输错误
    pub fn transport(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        SolverError::Transport {
            url: url.into(),
            source: Box::new(source),
        }
    }

    /// 创建页面解码错误
    pub fn decode(reason: impl Into<String>) -> Self {
        SolverError::Decode {
            reason: reason.into(),
        }
    }

    /// 创建 LLM 兜底失败错误
    pub fn resolver_failed(attempts: usize, reason: impl Into<String>) -> Self {
        SolverError::Resolver {
            attempts,
            reason: reason.into(),
        }
    }

    /// 创建自循环错误
    pub fn loop_guard(url: impl Into<String>) -> Self {
        SolverError::LoopGuard { url: url.into() }
    }
}

// ========== 从常见错误类型转换 ==========

impl From<serde_json::Error> for SolverError {
    fn from(err: serde_json::Error) -> Self {
        SolverError::Decode {
            reason: err.to_string(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 求解器结果类型
pub type SolverResult<T> = Result<T, SolverError>;
