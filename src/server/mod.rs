//! HTTP 前门 - 接入层
//!
//! 对外只承诺两种状态：受理（校验通过，后台开跑）或拒绝（密钥
//! 不符 / 字段缺失，同步返回原因）。求解过程的最终结果不回传给
//! 调用方，由答题链自己的提交机制通知判题方。

pub mod routes;

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use anyhow::Result;
use axum::routing::{get, post};
use axum::Router;
use tracing::info;

use crate::config::Config;

/// 前门共享状态
pub struct AppState {
    pub config: Config,
    /// 会话编号分配器（仅用于日志区分并发会话）
    pub session_counter: AtomicUsize,
}

/// 构建路由
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/solve", post(routes::solve))
        .with_state(state)
}

/// 启动 HTTP 服务
pub async fn serve(config: Config) -> Result<()> {
    let listen_port = config.listen_port;
    let state = Arc::new(AppState {
        config,
        session_counter: AtomicUsize::new(1),
    });

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", listen_port)).await?;
    info!("🌐 服务监听: {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
