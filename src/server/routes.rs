//! 前门路由处理

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value as JsonValue};
use tracing::{error, info};

use crate::models::SolveRequest;
use crate::orchestrator::run_session;
use crate::server::AppState;

/// 服务状态
pub async fn root() -> Json<JsonValue> {
    Json(json!({"status": "running", "endpoint": "/solve"}))
}

/// 健康检查
pub async fn health() -> Json<JsonValue> {
    Json(json!({"status": "healthy"}))
}

/// 受理求解请求
///
/// 校验通过后把会话交给后台任务立即返回；前门不等待求解结果
pub async fn solve(
    State(state): State<Arc<AppState>>,
    Json(body): Json<JsonValue>,
) -> (StatusCode, Json<JsonValue>) {
    // 1. 校验密钥
    let secret = body.get("secret").and_then(|v| v.as_str()).unwrap_or("");
    if secret != state.config.expected_secret {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"error": "invalid_secret"})),
        );
    }

    // 2. 校验必填字段
    let url = body
        .get("url")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty());
    let email = body
        .get("email")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty());
    let (Some(url), Some(email)) = (url, email) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "missing_fields"})),
        );
    };

    let request = SolveRequest {
        url: url.to_string(),
        email: email.to_string(),
        secret: secret.to_string(),
    };

    // 3. 后台执行，立即受理
    let session_id = state.session_counter.fetch_add(1, Ordering::SeqCst);
    let config = state.config.clone();
    info!("[会话 {}] 📥 请求受理: {}", session_id, request.url);

    tokio::spawn(async move {
        match run_session(&config, session_id, &request).await {
            Ok(result) => {
                info!(
                    "[会话 {}] 🏁 最终结果: {}",
                    session_id,
                    serde_json::to_string(&result).unwrap_or_default()
                );
            }
            Err(e) => {
                error!("[会话 {}] ❌ 会话执行失败: {}", session_id, e);
            }
        }
    });

    (StatusCode::OK, Json(json!({"message": "Request accepted"})))
}
