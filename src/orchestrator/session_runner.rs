//! 会话执行器 - 编排层
//!
//! ## 职责
//!
//! 驱动单个会话的端到端循环：
//!
//! 1. **窗口调度**：从 WindowManager 取最早截止的窗口
//! 2. **流程委托**：交给 ChallengeFlow 执行抓取 → 提取 → 提交
//! 3. **状态更新**：按提交分类标记窗口、登记后续窗口
//! 4. **预算控制**：会话级截止时间是硬上限，超时立即收尾
//! 5. **资源管理**：页面抓取器在会话开始获取、结束时无条件释放
//!
//! ## 设计特点
//!
//! - **窗口内消化**：任何失败只放弃当前窗口，绝不中断整个会话
//! - **顺序处理**：会话内严格一次一个窗口，没有窗口级并行
//! - **会话隔离**：每次调用独占自己的全部状态，可跨会话并发

use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::infrastructure::PageFetcher;
use crate::models::{SessionResult, SolveRequest, SubmissionRecord};
use crate::orchestrator::window_manager::WindowManager;
use crate::workflow::{ChallengeCtx, ChallengeFlow, WindowOutcome};

/// 执行单个会话直至完成
///
/// 结束条件：会话预算耗尽、没有可处理的窗口。单个窗口的失败
/// 只标记该窗口，循环继续。返回按时间顺序累计的提交历史。
pub async fn run_session(
    config: &Config,
    session_id: usize,
    request: &SolveRequest,
) -> Result<SessionResult> {
    let session_deadline = Instant::now() + Duration::from_secs(config.session_budget_secs);

    let mut manager = WindowManager::new(Duration::from_secs(config.window_secs));
    manager.add(&request.url);

    let flow = ChallengeFlow::new(config, &request.email, &request.secret)?;
    let fetcher = PageFetcher::new(config).await?;

    log_session_start(session_id, &request.url);

    let mut history: Vec<SubmissionRecord> = Vec::new();

    loop {
        // 全局预算是硬上限：超时后不再发起任何网络操作
        if Instant::now() >= session_deadline {
            info!(
                "[会话 {}] 🛑 会话预算耗尽，返回已累计的 {} 条记录",
                session_id,
                history.len()
            );
            break;
        }

        let Some(url) = manager.next() else {
            info!("[会话 {}] 没有可处理的窗口，会话结束", session_id);
            break;
        };

        let ctx = ChallengeCtx::new(session_id, url.clone(), session_deadline);

        match flow.run(&fetcher, &ctx).await {
            Ok(WindowOutcome::Submitted { record, next_url }) => {
                // 一次性窗口：提交过即为终态
                manager.mark_solved(&url);
                if let Some(next) = next_url {
                    if manager.add(&next) {
                        info!("[会话 {}] ➕ 新窗口登记: {}", session_id, next);
                    }
                }
                history.push(record);
            }
            Ok(WindowOutcome::Unsolvable { error }) => {
                warn!("[会话 {}] ⚠️ 窗口无法求解，标记放弃: {}", session_id, error);
                manager.mark_solved(&url);
            }
            Ok(WindowOutcome::DeadlineExceeded) => {
                info!(
                    "[会话 {}] 🛑 会话预算耗尽，返回已累计的 {} 条记录",
                    session_id,
                    history.len()
                );
                break;
            }
            Err(e) => {
                error!("[会话 {}] ❌ 窗口处理过程中发生错误: {}", session_id, e);
                manager.mark_solved(&url);
            }
        }
    }

    // 无条件释放渲染资源（包括出错路径）
    fetcher.shutdown().await;

    log_session_complete(session_id, &history, manager.total());
    Ok(SessionResult { results: history })
}

// ========== 日志辅助函数 ==========

fn log_session_start(session_id: usize, start_url: &str) {
    info!("{}", "=".repeat(60));
    info!("[会话 {}] 开始处理", session_id);
    info!("[会话 {}] 起始地址: {}", session_id, start_url);
    info!("{}", "=".repeat(60));
}

fn log_session_complete(session_id: usize, history: &[SubmissionRecord], total_windows: usize) {
    info!("\n{}", "─".repeat(60));
    info!(
        "[会话 {}] ✅ 会话结束: 提交 {} 次, 涉及窗口 {} 个",
        session_id,
        history.len(),
        total_windows
    );
    info!("{}", "─".repeat(60));
}
