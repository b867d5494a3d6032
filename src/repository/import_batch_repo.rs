// ==========================================
// 生产订单组件导入 - 导入批次 Repository Trait
// ==========================================
// 职责: 批次会话状态 + 进度值对象的读写
// 说明: 进度写入后立即提交（自动提交模式），轮询方在独立连接上可见
// ==========================================

use crate::domain::import_batch::{ImportBatch, NewImportBatch, Progress, ProgressSnapshot};
use crate::domain::types::{BatchState, ImportStatus};
use crate::repository::error::RepositoryResult;

// ==========================================
// BatchUpdate - 批次字段更新
// ==========================================
// None 表示不修改该字段
#[derive(Debug, Clone, Default)]
pub struct BatchUpdate {
    pub state: Option<BatchState>,
    pub row_count: Option<u64>,
    pub log: Option<String>,
    pub import_status: Option<ImportStatus>,
    pub order_id: Option<i64>,
}

// ==========================================
// ImportBatchRepository Trait
// ==========================================
// 实现者: ImportBatchRepositoryImpl（使用 rusqlite）
pub trait ImportBatchRepository: Send + Sync {
    /// 创建批次（state = draft），返回批次 ID
    fn insert_batch(&self, batch: &NewImportBatch) -> RepositoryResult<String>;

    /// 按 ID 查询批次
    fn find_batch(&self, batch_id: &str) -> RepositoryResult<Option<ImportBatch>>;

    /// 更新批次字段
    fn update_batch(&self, batch_id: &str, update: &BatchUpdate) -> RepositoryResult<()>;

    /// 写入进度（单条 UPDATE，返回时已持久化）
    fn write_progress(&self, batch_id: &str, progress: &Progress) -> RepositoryResult<()>;

    /// 读取进度快照
    ///
    /// # 返回
    /// - Ok(None): 批次不存在
    fn read_progress(&self, batch_id: &str) -> RepositoryResult<Option<ProgressSnapshot>>;
}
