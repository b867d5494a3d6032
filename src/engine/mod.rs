// ==========================================
// 生产订单组件导入 - 引擎层
// ==========================================
// 职责: 批次生命周期、行处理、进度、结果汇总
// 红线: Engine 不拼 SQL
// ==========================================

pub mod component_importer;
pub mod progress_tracker;
pub mod row_processor;
pub mod summary;

// 重导出核心引擎
pub use component_importer::{ComponentImporter, ImportOutcome};
pub use progress_tracker::{ProcessingGuard, ProgressTracker};
pub use row_processor::{RowProcessor, RowTally};
pub use summary::ImportSummary;
