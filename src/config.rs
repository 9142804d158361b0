/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// HTTP 服务监听端口
    pub listen_port: u16,
    /// 前门预共享密钥（请求中的 secret 必须与之一致）
    pub expected_secret: String,
    /// 单次网络调用超时（秒）
    pub http_timeout_secs: u64,
    /// 会话全局时间预算（秒），始终低于单题窗口时长
    pub session_budget_secs: u64,
    /// 单题窗口时长（秒）
    pub window_secs: u64,
    /// 是否启用无头浏览器渲染页面
    pub render_enabled: bool,
    /// 浏览器可执行文件路径（可选，留空则使用系统默认）
    pub chrome_executable: Option<String>,
    /// 页面加载后的等待时间（毫秒）
    pub render_settle_ms: u64,
    /// 下载文件存放目录
    pub download_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// LLM 调用最大重试次数
    pub llm_max_retries: usize,
    /// LLM 重试退避步长（毫秒），按次数线性递增
    pub llm_backoff_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_port: 8000,
            expected_secret: "Mysecret".to_string(),
            http_timeout_secs: 30,
            session_budget_secs: 170,
            window_secs: 180,
            render_enabled: false,
            chrome_executable: None,
            render_settle_ms: 500,
            download_dir: std::env::temp_dir()
                .join("llmquiz")
                .to_string_lossy()
                .to_string(),
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://aipipe.org/openrouter/v1".to_string(),
            llm_model_name: "openai/gpt-4.1-nano".to_string(),
            llm_max_retries: 3,
            llm_backoff_ms: 2000,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            listen_port: std::env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.listen_port),
            expected_secret: std::env::var("QUIZ_SECRET").unwrap_or(default.expected_secret),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.http_timeout_secs),
            session_budget_secs: std::env::var("MAX_GLOBAL_SECONDS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.session_budget_secs),
            window_secs: std::env::var("QUESTION_WINDOW_SECONDS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.window_secs),
            render_enabled: std::env::var("RENDER_ENABLED").ok().and_then(|v| v.parse().ok()).unwrap_or(default.render_enabled),
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok().filter(|v| !v.is_empty()),
            render_settle_ms: std::env::var("RENDER_SETTLE_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.render_settle_ms),
            download_dir: std::env::var("DOWNLOAD_DIR").unwrap_or(default.download_dir),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_max_retries: std::env::var("LLM_MAX_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_max_retries),
            llm_backoff_ms: std::env::var("LLM_BACKOFF_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_backoff_ms),
        }
    }
}
