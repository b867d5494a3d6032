// ==========================================
// 生产订单组件导入 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod import_batch;
pub mod order;
pub mod row;
pub mod types;

// 重导出核心类型
pub use import_batch::{ImportBatch, NewImportBatch, Progress, ProgressSnapshot};
pub use order::{
    Company, Location, NewProductionOrder, NewTargetLine, Product, ProductionOrder, TargetLine,
    Uom, User, WarehouseRouting,
};
pub use row::{columns, CellValue, RowRecord};
pub use types::{BatchState, ImportStatus, OrderState};
