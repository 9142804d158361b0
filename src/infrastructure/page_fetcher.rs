//! 页面抓取器 - 基础设施层
//!
//! 持有会话内唯一的稀缺资源（无头浏览器页面 + HTTP 客户端），
//! 只暴露"抓取页面"的能力：
//! - 不认识 ChallengeWindow / Session
//! - 不处理业务流程
//!
//! 渲染是可选项：浏览器启动失败或渲染出错时自动退回普通 GET，
//! 绝不因为渲染问题让窗口之外的流程中断。

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::SolverError;

/// 页面抓取器
pub struct PageFetcher {
    client: reqwest::Client,
    browser: Option<Browser>,
    page: Option<Page>,
    call_timeout: Duration,
    settle: Duration,
}

impl PageFetcher {
    /// 创建抓取器，按配置尝试启动无头浏览器
    ///
    /// 浏览器在会话开始时获取，会话结束时必须调用 [`shutdown`](Self::shutdown) 释放
    pub async fn new(config: &Config) -> Result<Self> {
        let call_timeout = Duration::from_secs(config.http_timeout_secs);
        let client = reqwest::Client::builder().timeout(call_timeout).build()?;

        let (browser, page) = if config.render_enabled {
            match launch_headless_browser(config.chrome_executable.as_deref()).await {
                Ok((browser, page)) => (Some(browser), Some(page)),
                Err(e) => {
                    warn!("⚠️ 无头浏览器启动失败，退回直接抓取: {}", e);
                    (None, None)
                }
            }
        } else {
            (None, None)
        };

        Ok(Self {
            client,
            browser,
            page,
            call_timeout,
            settle: Duration::from_millis(config.render_settle_ms),
        })
    }

    /// 抓取页面标记文本
    ///
    /// 优先浏览器渲染，失败时退回普通 GET
    pub async fn fetch(&self, url: &str) -> Result<String> {
        if let Some(page) = &self.page {
            match self.render(page, url).await {
                Ok(html) => return Ok(html),
                Err(e) => {
                    warn!("⚠️ 页面渲染失败，退回直接抓取 ({}): {}", url, e);
                }
            }
        }
        self.fetch_plain(url).await
    }

    /// 通过浏览器渲染页面
    async fn render(&self, page: &Page, url: &str) -> Result<String> {
        timeout(self.call_timeout, async {
            page.goto(url).await?;
            page.wait_for_navigation().await?;
            Ok::<_, anyhow::Error>(())
        })
        .await
        .map_err(|_| anyhow::anyhow!("页面渲染超时: {}", url))??;

        // 等待页面脚本稳定
        sleep(self.settle).await;

        let html = page.content().await?;
        debug!("渲染完成: {} ({} 字节)", url, html.len());
        Ok(html)
    }

    /// 普通 GET 抓取
    ///
    /// 判题页面可能用非 200 状态码返回有效内容，状态码不作为失败条件
    async fn fetch_plain(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SolverError::transport(url, e))?;
        let html = resp
            .text()
            .await
            .map_err(|e| SolverError::transport(url, e))?;
        debug!("抓取完成: {} ({} 字节)", url, html.len());
        Ok(html)
    }

    /// 释放浏览器资源
    ///
    /// 会话结束时（包括出错路径）无条件调用
    pub async fn shutdown(mut self) {
        self.page = None;
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                warn!("⚠️ 关闭浏览器失败: {}", e);
            } else {
                debug!("浏览器已关闭");
            }
        }
    }
}

/// 启动无头浏览器并创建空白页面
async fn launch_headless_browser(chrome_executable: Option<&str>) -> Result<(Browser, Page)> {
    info!("🚀 启动无头浏览器...");

    let mut builder = BrowserConfig::builder().new_headless_mode().args(vec![
        "--disable-gpu",
        "--no-sandbox",
        "--disable-dev-shm-usage",
        "--remote-debugging-port=0",
    ]);
    if let Some(path) = chrome_executable {
        builder = builder.chrome_executable(Path::new(path));
    }
    let config = builder
        .build()
        .map_err(|e| anyhow::anyhow!("配置无头浏览器失败: {}", e))?;

    let (browser, mut handler) = Browser::launch(config)
        .await
        .map_err(|e| anyhow::anyhow!("启动无头浏览器失败: {}", e))?;
    debug!("无头浏览器启动成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(Duration::from_millis(300)).await;

    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| anyhow::anyhow!("创建页面失败: {}", e))?;

    info!("✅ 无头浏览器就绪");
    Ok((browser, page))
}
