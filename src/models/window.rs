use std::time::{Duration, Instant};

/// 答题窗口
///
/// 一个打开的挑战实例，以 URL 作为身份标识。
/// 窗口只会被标记为已解决，从不删除，防止失败过的 URL 被重新加入。
#[derive(Debug, Clone)]
pub struct ChallengeWindow {
    /// 挑战页面地址，管理器内的身份键
    pub url: String,
    /// 窗口打开时刻
    pub opened_at: Instant,
    /// 窗口截止时刻（opened_at + 窗口时长）
    pub deadline: Instant,
    /// 是否已解决（成功、过期或放弃都算终态）
    pub solved: bool,
}

impl ChallengeWindow {
    /// 创建新窗口并赋予全新截止时间
    pub fn new(url: impl Into<String>, window_duration: Duration) -> Self {
        let now = Instant::now();
        Self {
            url: url.into(),
            opened_at: now,
            deadline: now + window_duration,
            solved: false,
        }
    }

    /// 窗口是否已过期
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }
}
