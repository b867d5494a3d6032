// ==========================================
// 生产订单组件导入 - 表格解析器
// ==========================================
// 支持: Excel (.xlsx/.xlsm/.xls/.xlsb) / CSV (.csv)
// 契约:
// - 首行为表头（去空白文本），数据单元格按列位置对应表头
// - 所有单元格均无值的行整行跳过
// - 无法解码或没有任何行 → Format 错误
// - 一次解码只产生一次前向遍历；需要两遍的调用方自行 collect
// ==========================================

use crate::domain::row::{CellValue, RowRecord};
use crate::i18n::t;
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecordsIntoIter};
use std::io::Cursor;
use std::path::Path;

// ==========================================
// TabularFormat - 按扩展名判定的文件格式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabularFormat {
    Excel,
    Csv,
}

impl TabularFormat {
    /// 根据文件名判定格式
    ///
    /// # 参数
    /// - file_name: 上传文件名
    /// - allowed: 允许的扩展名（小写，不含点）
    ///
    /// # 返回
    /// - None: 扩展名不被允许或无法识别
    pub fn from_file_name(file_name: &str, allowed: &[String]) -> Option<Self> {
        let ext = Path::new(file_name.trim())
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())?;

        if !allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext)) {
            return None;
        }

        match ext.as_str() {
            "csv" => Some(TabularFormat::Csv),
            "xlsx" | "xlsm" | "xls" | "xlsb" => Some(TabularFormat::Excel),
            _ => None,
        }
    }
}

// ==========================================
// TabularReader
// ==========================================
pub struct TabularReader;

impl TabularReader {
    /// 解码文件内容，返回惰性行流
    pub fn read_rows(&self, content: &[u8], format: TabularFormat) -> ImportResult<RowStream> {
        match format {
            TabularFormat::Excel => Self::open_excel(content),
            TabularFormat::Csv => Self::open_csv(content),
        }
    }

    fn open_excel(content: &[u8]) -> ImportResult<RowStream> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(content.to_vec()))?;

        // 读取第一个 sheet
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ImportError::Format(t("import.empty_file")))??;

        let (height, width) = range.get_size();
        if range.is_empty() || height == 0 {
            return Err(ImportError::Format(t("import.empty_file")));
        }

        // 提取表头（第一行）
        let headers = (0..width)
            .map(|col| {
                range
                    .get((0, col))
                    .map(|cell| cell.to_string().trim().to_string())
                    .unwrap_or_default()
            })
            .collect();

        Ok(RowStream {
            headers,
            source: RowSource::Sheet { range, next: 1 },
        })
    }

    fn open_csv(content: &[u8]) -> ImportResult<RowStream> {
        let mut records = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .from_reader(Cursor::new(content.to_vec()))
            .into_records();

        let header_record = match records.next() {
            Some(record) => record?,
            None => return Err(ImportError::Format(t("import.empty_file"))),
        };

        let headers = header_record
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        Ok(RowStream {
            headers,
            source: RowSource::Csv(records),
        })
    }
}

// ==========================================
// RowStream - 惰性行流
// ==========================================
pub struct RowStream {
    headers: Vec<String>,
    source: RowSource,
}

enum RowSource {
    Sheet { range: Range<Data>, next: usize },
    Csv(StringRecordsIntoIter<Cursor<Vec<u8>>>),
}

impl RowStream {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    fn next_cells(&mut self) -> Option<ImportResult<Vec<CellValue>>> {
        match &mut self.source {
            RowSource::Sheet { range, next } => {
                let (height, width) = range.get_size();
                if *next >= height {
                    return None;
                }
                let row = *next;
                *next += 1;
                let cells = (0..width)
                    .map(|col| range.get((row, col)).map(cell_from_data).unwrap_or(CellValue::Absent))
                    .collect();
                Some(Ok(cells))
            }
            RowSource::Csv(records) => match records.next()? {
                Ok(record) => Some(Ok(record.iter().map(cell_from_text).collect())),
                Err(e) => Some(Err(e.into())),
            },
        }
    }
}

impl Iterator for RowStream {
    type Item = ImportResult<RowRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let cells = match self.next_cells()? {
                Ok(cells) => cells,
                Err(e) => return Some(Err(e)),
            };

            let record = self.headers.iter().cloned().zip(cells).collect::<RowRecord>();
            // 跳过完全空白的行
            if record.is_blank() {
                continue;
            }
            return Some(Ok(record));
        }
    }
}

// ==========================================
// 单元格转换
// ==========================================

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Absent,
        Data::String(s) => cell_from_text(s),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

/// 只有空字符串视为无值；纯空白文本保留
fn cell_from_text(value: &str) -> CellValue {
    if value.is_empty() {
        CellValue::Absent
    } else {
        CellValue::Text(value.to_string())
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
