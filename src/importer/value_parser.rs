// ==========================================
// 生产订单组件导入 - 单元格值解析
// ==========================================
// 职责: 数量 / 日期 / 优先级的宽松解析
// - 数量: 数字单元格直接使用；文本去空白、逗号视为小数点
// - 日期: 日期单元格直接使用；文本支持 YYYY-MM-DD [HH:MM:SS]
// ==========================================

use crate::domain::row::CellValue;
use crate::i18n::t_with_args;
use crate::importer::error::{ImportError, ImportResult};
use chrono::{NaiveDate, NaiveDateTime};

fn not_a_number(value: &str) -> ImportError {
    ImportError::Input(t_with_args("import.not_a_number", &[("value", value)]))
}

/// 解析浮点数（无值返回 0.0）
pub fn parse_float(cell: &CellValue) -> ImportResult<f64> {
    let value = match cell {
        CellValue::Absent => return Ok(0.0),
        CellValue::Number(n) => *n,
        CellValue::Text(s) => {
            let normalized = s.trim().replace(',', ".");
            if normalized.is_empty() {
                return Ok(0.0);
            }
            normalized.parse::<f64>().map_err(|_| not_a_number(s))?
        }
        CellValue::Date(dt) => return Err(not_a_number(&dt.to_string())),
    };

    if !value.is_finite() {
        return Err(not_a_number(&value.to_string()));
    }
    Ok(value)
}

/// 解析数量：必须严格为正
pub fn parse_quantity(cell: &CellValue) -> ImportResult<f64> {
    let quantity = parse_float(cell)?;
    if quantity <= 0.0 {
        return Err(ImportError::Input(crate::i18n::t(
            "import.quantity_not_positive",
        )));
    }
    Ok(quantity)
}

/// 解析计划开始日期（无值返回 None）
pub fn parse_date(cell: &CellValue) -> ImportResult<Option<NaiveDateTime>> {
    match cell {
        CellValue::Absent => Ok(None),
        CellValue::Date(dt) => Ok(Some(*dt)),
        CellValue::Text(s) if s.trim().is_empty() => Ok(None),
        CellValue::Text(s) => {
            let raw = s.trim();
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                })
                .map(Some)
                .ok_or_else(|| bad_date(raw))
        }
        CellValue::Number(n) => Err(bad_date(&n.to_string())),
    }
}

fn bad_date(value: &str) -> ImportError {
    ImportError::Input(t_with_args("import.bad_date", &[("value", value)]))
}

/// 解析优先级（无值返回 None，小数截断为整数）
pub fn parse_priority(cell: &CellValue) -> ImportResult<Option<i64>> {
    if cell.as_trimmed_text().is_none() {
        return Ok(None);
    }
    let value = parse_float(cell)?;
    Ok(Some(value.trunc() as i64))
}
