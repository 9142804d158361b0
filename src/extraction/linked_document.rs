//! 链接文档策略
//!
//! 跟进页面里指向数据文件的超链接（csv / xls / xlsx / pdf），
//! 下载后套用同一套列求和逻辑。分页文档固定取第二页，页面上
//! 没有表格形态时退化为全文数值求和。

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::extraction::{AnswerHandler, HandlerInput};
use crate::models::{ExtractionResult, Table};
use crate::services::documents::{
    self, document_kind, DocumentKind, DocumentService, PAGINATED_TARGET_PAGE, TARGET_COLUMN,
};

/// 链接文档策略
pub struct LinkedDocumentHandler {
    documents: DocumentService,
}

impl LinkedDocumentHandler {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            documents: DocumentService::new(config)?,
        })
    }

    /// 对下载下来的表格求和
    fn sum_table(&self, table: &Table) -> Option<ExtractionResult> {
        if let Some(sum) = table.sum_column(TARGET_COLUMN) {
            return Some(ExtractionResult::new(JsonValue::from(sum), 0.9, self.name()));
        }
        table
            .first_numeric_sum()
            .map(|sum| ExtractionResult::new(JsonValue::from(sum), 0.7, self.name()))
    }

    /// 分页文档：固定第二页，先找表格，退化为全文数值求和
    fn sum_paginated(&self, path: &Path) -> Result<Option<ExtractionResult>> {
        let Some(text) = documents::paginated_page_text(path, PAGINATED_TARGET_PAGE)? else {
            return Ok(None);
        };

        if let Some(table) = documents::table_from_page_text(&text) {
            if let Some(sum) = table.sum_column(TARGET_COLUMN) {
                return Ok(Some(ExtractionResult::new(
                    JsonValue::from(sum),
                    0.9,
                    self.name(),
                )));
            }
        }

        Ok(documents::sum_numbers_in_text(&text)
            .map(|sum| ExtractionResult::new(JsonValue::from(sum), 0.8, self.name())))
    }

    /// 下载并解析单个文档
    async fn extract_from(
        &self,
        url: &str,
        kind: DocumentKind,
    ) -> Result<Option<ExtractionResult>> {
        let path = self.documents.download(url).await?;
        match kind {
            DocumentKind::Delimited => {
                let table = documents::parse_delimited(&path)?;
                Ok(self.sum_table(&table))
            }
            DocumentKind::Spreadsheet => {
                let table = documents::parse_spreadsheet(&path)?;
                Ok(self.sum_table(&table))
            }
            DocumentKind::Paginated => self.sum_paginated(&path),
        }
    }
}

#[async_trait]
impl AnswerHandler for LinkedDocumentHandler {
    fn name(&self) -> &'static str {
        "linked_document"
    }

    async fn try_extract(&self, input: &HandlerInput<'_>) -> Result<Option<ExtractionResult>> {
        for href in html_links(input.document_html, input.page_url) {
            let Some(kind) = document_kind(&href) else {
                continue;
            };
            // 会话预算是硬上限，下载前检查
            if Instant::now() >= input.deadline {
                debug!("会话预算耗尽，停止跟进文档链接");
                break;
            }
            match self.extract_from(&href, kind).await {
                Ok(Some(result)) => return Ok(Some(result)),
                Ok(None) => {}
                Err(e) => {
                    warn!("⚠️ 文档下载解析失败 ({}): {}", href, e);
                }
            }
        }
        Ok(None)
    }
}

/// 提取页面超链接并补全为绝对地址
fn html_links(document_html: &str, page_url: &str) -> Vec<String> {
    crate::utils::html::find_links(document_html)
        .into_iter()
        .filter_map(|href| {
            Url::parse(page_url)
                .ok()?
                .join(&href)
                .ok()
                .map(|u| u.to_string())
        })
        .collect()
}
