use anyhow::Result;
use llm_quiz_solver::config::Config;
use llm_quiz_solver::server;
use llm_quiz_solver::utils::logging;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();
    logging::log_startup(&config);

    // 启动前门服务
    server::serve(config).await?;

    Ok(())
}
