//! 窗口处理流程 - 流程层
//!
//! 核心职责：定义"一个窗口"的完整处理流程
//!
//! 流程顺序：
//! 1. 抓取页面 → 解码（剥伪装壳、取题目、找提交地址）
//! 2. 策略链提取答案
//! 3. 未命中 → LLM 兜底
//! 4. 提交并分类判题响应
//!
//! 所有失败都在窗口内消化，只有会话预算耗尽会要求上层提前收尾。

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::SolverError;
use crate::extraction::{HandlerChain, HandlerInput};
use crate::infrastructure::PageFetcher;
use crate::models::{AnswerPayload, Classification, SubmissionRecord};
use crate::services::{AnswerResolver, ContentDecoder, SubmissionClient};
use crate::utils::logging::truncate_text;
use crate::workflow::challenge_ctx::ChallengeCtx;

/// 窗口处理结果
#[derive(Debug)]
pub enum WindowOutcome {
    /// 已提交（附审计记录，链条继续时带下一题地址）
    Submitted {
        record: SubmissionRecord,
        next_url: Option<String>,
    },
    /// 窗口无法求解，应标记放弃
    Unsolvable { error: SolverError },
    /// 会话预算耗尽，上层应立即收尾
    DeadlineExceeded,
}

/// 窗口处理流程
///
/// - 编排完整的单窗口处理流程
/// - 决定何时解码、何时提取、何时兜底
/// - 不持有任何稀缺资源（页面抓取器由上层传入）
/// - 只依赖业务能力（services / extraction）
pub struct ChallengeFlow {
    decoder: ContentDecoder,
    chain: HandlerChain,
    resolver: AnswerResolver,
    submission: SubmissionClient,
    email: String,
    secret: String,
    verbose_logging: bool,
}

impl ChallengeFlow {
    /// 创建新的窗口处理流程
    pub fn new(config: &Config, email: &str, secret: &str) -> Result<Self> {
        Ok(Self {
            decoder: ContentDecoder::new(),
            chain: HandlerChain::standard(config)?,
            resolver: AnswerResolver::new(config),
            submission: SubmissionClient::new(config)?,
            email: email.to_string(),
            secret: secret.to_string(),
            verbose_logging: config.verbose_logging,
        })
    }

    pub async fn run(&self, fetcher: &PageFetcher, ctx: &ChallengeCtx) -> Result<WindowOutcome> {
        // 全局预算在每次网络操作前检查
        if ctx.session_expired() {
            return Ok(WindowOutcome::DeadlineExceeded);
        }

        // ========== 步骤 1: 抓取并解码页面 ==========
        info!("[会话 {}] 🔍 抓取页面: {}", ctx.session_id, ctx.url);

        let raw_html = match fetcher.fetch(&ctx.url).await {
            Ok(html) => html,
            Err(e) => {
                return Ok(WindowOutcome::Unsolvable {
                    error: SolverError::Transport {
                        url: ctx.url.clone(),
                        source: e.into(),
                    },
                });
            }
        };

        let decoded = self.decoder.decode(&raw_html, &ctx.url);

        let Some(submit_url) = decoded.submit_url.clone() else {
            return Ok(WindowOutcome::Unsolvable {
                error: SolverError::decode("未找到提交地址"),
            });
        };

        info!(
            "[会话 {}] 题目: {}",
            ctx.session_id,
            truncate_text(&decoded.question_text, 80)
        );
        if self.verbose_logging {
            debug!("[会话 {}] 提交地址: {}", ctx.session_id, submit_url);
        }

        // ========== 步骤 2: 策略链提取 ==========
        let input = HandlerInput {
            question_text: &decoded.question_text,
            raw_html: &raw_html,
            document_html: &decoded.document_html,
            page_url: &ctx.url,
            deadline: ctx.session_deadline,
        };

        let extraction = match self.chain.run(&input).await {
            Some(result) => result,
            None => {
                // ========== 步骤 3: LLM 兜底 ==========
                if !self.resolver.is_enabled() {
                    return Ok(WindowOutcome::Unsolvable {
                        error: SolverError::ExtractionMiss,
                    });
                }
                if ctx.session_expired() {
                    return Ok(WindowOutcome::DeadlineExceeded);
                }
                info!("[会话 {}] 🤖 本地策略未命中，调用 LLM 兜底...", ctx.session_id);
                match self.resolver.resolve(&decoded.question_text).await {
                    Ok(result) => result,
                    Err(e) => {
                        let error = match e.downcast::<SolverError>() {
                            Ok(solver_error) => solver_error,
                            Err(other) => SolverError::resolver_failed(0, other.to_string()),
                        };
                        return Ok(WindowOutcome::Unsolvable { error });
                    }
                }
            }
        };

        // ========== 步骤 4: 提交答案 ==========
        if ctx.session_expired() {
            return Ok(WindowOutcome::DeadlineExceeded);
        }

        let payload = AnswerPayload {
            email: self.email.clone(),
            secret: self.secret.clone(),
            url: ctx.url.clone(),
            answer: extraction.value.clone(),
        };

        let outcome = self.submission.submit(&submit_url, &payload).await;
        self.log_outcome(ctx, &outcome.classification);

        let next_url = outcome.next_url().map(String::from);
        let record = SubmissionRecord {
            question_url: ctx.url.clone(),
            answer: extraction.value,
            confidence: extraction.confidence,
            handler: extraction.source.to_string(),
            outcome,
        };

        Ok(WindowOutcome::Submitted { record, next_url })
    }

    /// 按分类输出结果日志
    fn log_outcome(&self, ctx: &ChallengeCtx, classification: &Classification) {
        match classification {
            Classification::Correct => {
                info!("[会话 {}] 🎉 回答正确", ctx.session_id);
            }
            Classification::IncorrectContinue => {
                info!("[会话 {}] ❌ 回答未通过，窗口不再重试", ctx.session_id);
            }
            Classification::ChainContinues(next) => {
                info!("[会话 {}] ➡️ 链条继续: {}", ctx.session_id, next);
            }
            Classification::TerminalNonJson => {
                info!("[会话 {}] 🏁 判题方返回终局信号", ctx.session_id);
            }
            Classification::TransportError => {
                warn!("[会话 {}] ⚠️ 提交传输失败，窗口放弃", ctx.session_id);
            }
        }
    }
}
