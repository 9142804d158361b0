/// 字段表格
///
/// 文档解析协作方（HTML / CSV / 电子表格 / PDF）统一的输出形态：
/// 首行表头 + 若干数据行。
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// 从按行排列的单元格文本构建表格，首行作为表头
    pub fn from_rows(mut rows: Vec<Vec<String>>) -> Self {
        if rows.is_empty() {
            return Self::default();
        }
        let headers = rows.remove(0);
        Self { headers, rows }
    }

    /// 表格是否没有任何数据行
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 按列名求和（列名大小写不敏感）
    ///
    /// 列存在即返回 Some：无法解析的单元格被跳过，全部无法解析时和为 0
    pub fn sum_column(&self, name: &str) -> Option<f64> {
        let idx = self
            .headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))?;
        let sum = self
            .rows
            .iter()
            .filter_map(|row| row.get(idx))
            .filter_map(|cell| parse_number(cell))
            .sum();
        Some(sum)
    }

    /// 第一个含有数值的列的和
    pub fn first_numeric_sum(&self) -> Option<f64> {
        let width = self.headers.len().max(
            self.rows.iter().map(|r| r.len()).max().unwrap_or(0),
        );
        for idx in 0..width {
            let values: Vec<f64> = self
                .rows
                .iter()
                .filter_map(|row| row.get(idx))
                .filter_map(|cell| parse_number(cell))
                .collect();
            if !values.is_empty() {
                return Some(values.iter().sum());
            }
        }
        None
    }
}

/// 解析带千分位分隔符的数值文本
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned = text.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}
