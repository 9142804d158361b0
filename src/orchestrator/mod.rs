//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责窗口调度与会话执行，是整个引擎的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `window_manager` - 窗口管理器
//! - 登记窗口并赋予截止时间（唯一的截止时间来源）
//! - 最早截止优先的挑选策略
//! - 过期窗口当场标记，零网络调用
//!
//! ### `session_runner` - 会话执行器
//! - 驱动"取窗 → 流程 → 更新"的主循环
//! - 执行会话级时间预算（硬上限）
//! - 管理页面抓取器的生命周期
//! - 汇总提交历史为会话结果
//!
//! ## 层次关系
//!
//! ```text
//! session_runner (处理一个 Session)
//!     ↓
//! window_manager (调度 ChallengeWindow)
//!     ↓
//! workflow::ChallengeFlow (处理单个窗口)
//!     ↓
//! services (能力层：decode / extract / resolve / submit)
//!     ↓
//! infrastructure (基础设施：PageFetcher)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：window_manager 管调度，session_runner 管循环
//! 2. **资源隔离**：只有编排层持有 PageFetcher
//! 3. **向下依赖**：编排层 → workflow → services → infrastructure
//! 4. **失败局部化**：窗口失败不升级，只有预算耗尽能提前收尾

pub mod session_runner;
pub mod window_manager;

// 重新导出主要类型
pub use session_runner::run_session;
pub use window_manager::WindowManager;
