//! 窗口处理上下文
//!
//! 封装"我正在哪个会话里处理哪个窗口"这一信息

use std::fmt::Display;
use std::time::Instant;

/// 窗口处理上下文
#[derive(Debug, Clone)]
pub struct ChallengeCtx {
    /// 会话编号（仅用于日志显示）
    pub session_id: usize,

    /// 当前窗口的挑战页面地址
    pub url: String,

    /// 会话级硬截止时刻，超过后不再发起任何网络操作
    pub session_deadline: Instant,
}

impl ChallengeCtx {
    /// 创建新的窗口上下文
    pub fn new(session_id: usize, url: String, session_deadline: Instant) -> Self {
        Self {
            session_id,
            url,
            session_deadline,
        }
    }

    /// 会话预算是否已经耗尽
    pub fn session_expired(&self) -> bool {
        Instant::now() >= self.session_deadline
    }
}

impl Display for ChallengeCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[会话 #{} 窗口 {}]", self.session_id, self.url)
    }
}
