//! 文档下载与解析 - 业务能力层
//!
//! 页面链接指向的数据文件（分隔文本 / 电子表格 / 分页文档）统一
//! 消费为"文档 → 字段表格"：下载到本地目录后按扩展名分派解析。

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use phf::phf_map;
use regex::Regex;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::error::SolverError;
use crate::models::Table;

/// 表格求和的目标列名
pub const TARGET_COLUMN: &str = "value";

/// 分页文档取数的固定页码（从 1 开始）
pub const PAGINATED_TARGET_PAGE: u32 = 2;

/// 可下载文档类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// 分隔文本（csv）
    Delimited,
    /// 电子表格（xls / xlsx）
    Spreadsheet,
    /// 分页文档（pdf）
    Paginated,
}

/// 扩展名 → 文档类型
static DOC_EXTENSIONS: phf::Map<&'static str, DocumentKind> = phf_map! {
    "csv" => DocumentKind::Delimited,
    "xls" => DocumentKind::Spreadsheet,
    "xlsx" => DocumentKind::Spreadsheet,
    "pdf" => DocumentKind::Paginated,
};

/// 根据 URL 扩展名判断文档类型
pub fn document_kind(url: &str) -> Option<DocumentKind> {
    let path = Url::parse(url).ok()?.path().to_lowercase();
    let ext = path.rsplit('.').next()?;
    DOC_EXTENSIONS.get(ext).copied()
}

/// 文档服务
///
/// 持有下载客户端和落盘目录，只处理单个文件，不关心流程
pub struct DocumentService {
    client: reqwest::Client,
    download_dir: PathBuf,
}

impl DocumentService {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            download_dir: PathBuf::from(&config.download_dir),
        })
    }

    /// 下载文件到本地目录，返回落盘路径
    pub async fn download(&self, url: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.download_dir).await?;

        let file_name = Url::parse(url)
            .ok()
            .and_then(|u| {
                u.path_segments()
                    .and_then(|segments| segments.last().map(String::from))
            })
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "file".to_string());
        let path = self.download_dir.join(file_name);

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SolverError::transport(url, e))?
            .error_for_status()
            .map_err(|e| SolverError::transport(url, e))?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| SolverError::transport(url, e))?;

        tokio::fs::write(&path, &bytes).await?;
        debug!("文件已下载: {} -> {} ({} 字节)", url, path.display(), bytes.len());
        Ok(path)
    }
}

/// 解析分隔文本文件为表格（首行即表头）
pub fn parse_delimited(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(String::from).collect());
    }
    Ok(Table::from_rows(rows))
}

/// 解析电子表格的第一个工作表为表格
pub fn parse_spreadsheet(path: &Path) -> Result<Table> {
    use calamine::Reader;

    let mut workbook = calamine::open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SolverError::decode("电子表格没有工作表"))??;

    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();
    Ok(Table::from_rows(rows))
}

/// 提取分页文档指定页的文本，页不存在时返回 None
pub fn paginated_page_text(path: &Path, page_number: u32) -> Result<Option<String>> {
    let doc = lopdf::Document::load(path)?;
    if !doc.get_pages().contains_key(&page_number) {
        return Ok(None);
    }
    let text = doc.extract_text(&[page_number])?;
    Ok(Some(text))
}

/// 尝试把分页文档的页面文本按行切成表格
///
/// 每行按空白切分为单元格，少于两行视为没有表格
pub fn table_from_page_text(text: &str) -> Option<Table> {
    let rows: Vec<Vec<String>> = text
        .lines()
        .map(|line| line.split_whitespace().map(String::from).collect())
        .filter(|cells: &Vec<String>| !cells.is_empty())
        .collect();
    if rows.len() < 2 {
        return None;
    }
    Some(Table::from_rows(rows))
}

/// 文本兜底：把文本中出现的所有数值求和（千分位分隔符先行剥离）
pub fn sum_numbers_in_text(text: &str) -> Option<f64> {
    let cleaned = text.replace(',', "");
    let re = Regex::new(r"[-+]?\d*\.\d+|\d+").ok()?;
    let values: Vec<f64> = re
        .find_iter(&cleaned)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect();
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum())
}
