// ==========================================
// 生产订单组件导入 - 表格行模型
// ==========================================
// RowRecord: 表头 → 单元格原始值
// 由解析器按文件顺序产出（跳过全空行），创建后不可变
// ==========================================

use chrono::NaiveDateTime;
use std::collections::HashMap;

// ==========================================
// 输入文件列名（区分大小写）
// ==========================================
pub mod columns {
    pub const PRODUCT: &str = "Product";
    pub const QUANTITY: &str = "Quantity";
    pub const UOM: &str = "UoM";
    pub const PLANNED_START: &str = "Planned Start";
    pub const REFERENCE: &str = "Reference";
    pub const COMPANY: &str = "Company";
    pub const SOURCE_LOCATION: &str = "Source Location";
    pub const DESTINATION_LOCATION: &str = "Destination Location";
    pub const RESPONSIBLE: &str = "Responsible";
    pub const PRIORITY: &str = "Priority";
}

// ==========================================
// CellValue - 单元格原始值
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
    Absent,
}

impl CellValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, CellValue::Absent)
    }

    /// 渲染为去除首尾空白的文本；空文本视为无值
    ///
    /// 整数值的数字单元格不带小数点（1001.0 → "1001"），
    /// 这样按数字录入的产品编码也能匹配。
    pub fn as_trimmed_text(&self) -> Option<String> {
        let text = match self {
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Date(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            CellValue::Absent => return None,
        };
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

static ABSENT: CellValue = CellValue::Absent;

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

// ==========================================
// RowRecord - 数据行
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowRecord {
    cells: HashMap<String, CellValue>,
}

impl RowRecord {
    pub fn new(cells: HashMap<String, CellValue>) -> Self {
        Self { cells }
    }

    /// 按列名取值；缺列与空单元格均返回 Absent
    pub fn get(&self, column: &str) -> &CellValue {
        self.cells.get(column).unwrap_or(&ABSENT)
    }

    /// 按列名取去空白文本
    pub fn text(&self, column: &str) -> Option<String> {
        self.get(column).as_trimmed_text()
    }

    /// 是否所有单元格都无值
    pub fn is_blank(&self) -> bool {
        self.cells.values().all(CellValue::is_absent)
    }
}

impl FromIterator<(String, CellValue)> for RowRecord {
    fn from_iter<I: IntoIterator<Item = (String, CellValue)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
