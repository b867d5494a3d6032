// ==========================================
// 生产订单组件导入 - 导入结果汇总
// ==========================================
// 日志格式（行间以 \n 分隔）:
//   {n} production order(s) created.
//   Errors ({k}):          ← 仅有错误时
//   Line {n} – {error}     ← 每条错误一行，按出现顺序
// ==========================================

use crate::domain::types::ImportStatus;
use crate::engine::row_processor::RowTally;
use crate::i18n::t_with_args;
use serde::Serialize;
use std::collections::BTreeSet;

// ==========================================
// ImportSummary - 一次完整导入的结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSummary {
    pub batch_id: String,
    pub order_id: i64,
    pub success_count: usize,
    pub errors: Vec<String>,
    pub log: String,
    pub import_status: ImportStatus,
    pub order_confirmed: bool,
}

/// 根据行处理结果生成日志与导入状态
pub fn build_log(tally: &RowTally) -> (String, ImportStatus) {
    let mut lines = vec![t_with_args(
        "import.orders_created",
        &[("count", &tally.success_count.to_string())],
    )];

    if tally.has_errors() {
        lines.push(t_with_args(
            "import.errors_header",
            &[("count", &tally.errors.len().to_string())],
        ));
        lines.extend(tally.errors.iter().cloned());
        (lines.join("\n"), ImportStatus::Error)
    } else {
        (lines.join("\n"), ImportStatus::Success)
    }
}

/// 预检中止日志（编码有序，逗号分隔）
pub fn abort_log(missing_codes: &BTreeSet<String>) -> String {
    let codes = missing_codes
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    t_with_args("import.aborted_missing_products", &[("codes", &codes)])
}
