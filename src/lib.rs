//! # LLM Quiz Solver
//!
//! 一个自动求解链式答题挑战的 Rust 服务
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（浏览器页面 + HTTP 客户端），只暴露能力
//! - `PageFetcher` - 唯一的渲染资源 owner，提供 fetch() 能力
//!
//! ### ② 业务能力层（Services / Extraction）
//! - `services/` - 描述"我能做什么"，只处理单个页面或单次调用
//! - `ContentDecoder` - 页面解码能力（伪装壳、题目、提交地址）
//! - `AnswerResolver` - LLM 兜底能力
//! - `SubmissionClient` - 提交与响应分类能力
//! - `extraction/` - 有序答案提取策略链（固定可信度排序，首个命中者胜出）
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个窗口"的完整处理流程
//! - `ChallengeCtx` - 上下文封装（session_id + url + 会话截止）
//! - `ChallengeFlow` - 流程编排（decode → extract → resolve → submit）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/window_manager` - 窗口调度器，最早截止优先
//! - `orchestrator/session_runner` - 会话主循环，执行时间预算和资源生命周期
//!
//! 前门（`server/`）在层次之外：受理或拒绝请求，把会话交给后台任务。
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod extraction;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod server;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{SolverError, SolverResult};
pub use extraction::{AnswerHandler, HandlerChain, HandlerInput};
pub use infrastructure::PageFetcher;
pub use models::{
    ChallengeWindow, Classification, ExtractionResult, SessionResult, SolveRequest,
    SubmissionOutcome, SubmissionRecord,
};
pub use orchestrator::{run_session, WindowManager};
pub use workflow::{ChallengeCtx, ChallengeFlow, WindowOutcome};
