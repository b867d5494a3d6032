// ==========================================
// 生产订单组件导入 - 行处理器
// ==========================================
// 职责: 逐行转换并落库组件行
// 规则:
// - 行号从 2 开始（第 1 行为表头），按非空行顺序编号
// - 单行失败: 回滚该行 savepoint，记录 "Line {n} – {error}"，继续下一行
// - 行级失败不向上传播；只有进度落库失败会中止整批
// ==========================================

use crate::domain::order::ProductionOrder;
use crate::domain::row::RowRecord;
use crate::engine::progress_tracker::ProgressTracker;
use crate::i18n::t_with_args;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::row_converter::RowConverter;
use crate::repository::OrderRepository;
use serde::Serialize;
use tracing::{debug, warn};

/// 第一条数据行的行号
pub const FIRST_DATA_LINE: usize = 2;

// ==========================================
// RowTally - 行处理结果统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RowTally {
    pub success_count: usize,
    pub errors: Vec<String>, // 按出现顺序
}

impl RowTally {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

pub struct RowProcessor<'c, 'r, 'a> {
    converter: &'c RowConverter<'r, 'a>,
    orders: &'c dyn OrderRepository,
}

impl<'c, 'r, 'a> RowProcessor<'c, 'r, 'a> {
    pub fn new(converter: &'c RowConverter<'r, 'a>, orders: &'c dyn OrderRepository) -> Self {
        Self { converter, orders }
    }

    /// 处理全部数据行
    pub fn process(
        &self,
        rows: &[RowRecord],
        order: &ProductionOrder,
        tracker: &mut ProgressTracker<'_>,
    ) -> ImportResult<RowTally> {
        let mut tally = RowTally::default();

        for (index, row) in rows.iter().enumerate() {
            let line_no = index + FIRST_DATA_LINE;

            match self.process_row(row, order) {
                Ok(move_id) => {
                    tally.success_count += 1;
                    debug!(line = line_no, move_id, "组件行已落库");
                }
                Err(e) => {
                    warn!(
                        batch_id = %tracker.batch_id(),
                        line = line_no,
                        kind = e.kind(),
                        error = %e,
                        "组件行导入失败"
                    );
                    tally.errors.push(t_with_args(
                        "import.line_error",
                        &[("line", &line_no.to_string()), ("error", &e.to_string())],
                    ));
                }
            }

            let done = (index + 1) as u64;
            tracker.advance(done, index + 1 == rows.len())?;
        }

        Ok(tally)
    }

    /// 单行: 纯转换 → savepoint 内落库
    fn process_row(&self, row: &RowRecord, order: &ProductionOrder) -> Result<i64, ImportError> {
        let line = self.converter.convert(row, order)?;
        let persisted = self.orders.persist_line(&line)?;
        Ok(persisted.move_id)
    }
}
