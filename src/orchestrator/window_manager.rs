//! 窗口管理器 - 编排层
//!
//! 管理会话内所有答题窗口的登记与调度：
//! - `add` 登记新窗口并赋予全新截止时间（唯一的截止时间来源）
//! - `next` 按"最早截止优先"挑选下一个待处理窗口
//!
//! 最早截止优先能压住最坏情况下的等待：快到期的窗口先被服务，
//! 减少白白过期的窗口。窗口只标记不删除，失败过的 URL 不会被
//! 重新登记而造成循环。

use std::time::Duration;

use tracing::{debug, warn};

use crate::models::ChallengeWindow;

/// 窗口管理器
pub struct WindowManager {
    windows: Vec<ChallengeWindow>,
    window_duration: Duration,
}

impl WindowManager {
    pub fn new(window_duration: Duration) -> Self {
        Self {
            windows: Vec::new(),
            window_duration,
        }
    }

    /// 登记新窗口
    ///
    /// URL 是窗口身份：已登记过（无论是否解决）的 URL 直接拒绝
    pub fn add(&mut self, url: &str) -> bool {
        if self.windows.iter().any(|w| w.url == url) {
            debug!("URL 已登记过，跳过: {}", url);
            return false;
        }
        self.windows
            .push(ChallengeWindow::new(url, self.window_duration));
        true
    }

    /// 挑选下一个待处理窗口
    ///
    /// 未解决窗口中截止时间最早者优先；挑选时发现已过期的窗口
    /// 当场标记为已解决（过期是终态，不发起任何网络操作）
    pub fn next(&mut self) -> Option<String> {
        loop {
            let candidate = self
                .windows
                .iter_mut()
                .filter(|w| !w.solved)
                .min_by_key(|w| w.deadline)?;

            if candidate.is_expired() {
                warn!("⏰ 窗口已过期，标记放弃: {}", candidate.url);
                candidate.solved = true;
                continue;
            }
            return Some(candidate.url.clone());
        }
    }

    /// 标记窗口为已解决（成功、过期、放弃共用的终态）
    pub fn mark_solved(&mut self, url: &str) {
        if let Some(window) = self.windows.iter_mut().find(|w| w.url == url) {
            window.solved = true;
        }
    }

    /// 按 URL 查窗口
    pub fn window(&self, url: &str) -> Option<&ChallengeWindow> {
        self.windows.iter().find(|w| w.url == url)
    }

    /// 尚未解决且未过期的窗口数
    pub fn open_count(&self) -> usize {
        self.windows
            .iter()
            .filter(|w| !w.solved && !w.is_expired())
            .count()
    }

    /// 登记过的窗口总数
    pub fn total(&self) -> usize {
        self.windows.len()
    }
}
