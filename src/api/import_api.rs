// ==========================================
// 组件导入API
// ==========================================
// 职责: 异步封装批次创建、确认、导入、进度查询
// 说明: 引擎为同步实现，在 spawn_blocking 中执行；每次调用使用独立连接
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, ImportConfigReader, ImportSettings};
use crate::domain::import_batch::{ImportBatch, NewImportBatch, ProgressSnapshot};
use crate::engine::{ComponentImporter, ImportOutcome};
use crate::importer::error::ImportResult;
use crate::repository::{ImportBatchRepository, ImportBatchRepositoryImpl};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{info, instrument};

/// 单个批次的完整导入结果
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub batch_id: String,
    pub row_count: u64,
    pub outcome: ImportOutcome,
    /// 导入耗时（毫秒）
    pub elapsed_ms: i64,
}

/// 创建批次请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBatchRequest {
    #[serde(skip)]
    pub file: Vec<u8>,
    pub file_name: String,
    pub target_product_code: String,
    pub target_quantity: f64,
    #[serde(default)]
    pub auto_confirm: bool,
}

impl From<CreateBatchRequest> for NewImportBatch {
    fn from(request: CreateBatchRequest) -> Self {
        NewImportBatch {
            file: request.file,
            file_name: Some(request.file_name),
            target_product_code: request.target_product_code,
            target_quantity: request.target_quantity,
            auto_confirm: request.auto_confirm,
        }
    }
}

/// 导入API
pub struct ImportApi {
    db_path: String,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// 读取导入配置快照
    pub async fn load_settings(&self) -> ApiResult<ImportSettings> {
        let config = ConfigManager::new(&self.db_path)?;
        Ok(config.load_settings().await?)
    }

    /// 创建导入批次（state = draft）
    pub async fn create_batch(&self, request: CreateBatchRequest) -> ApiResult<String> {
        let batch: NewImportBatch = request.into();
        self.with_batch_repo(move |repo| Ok(repo.insert_batch(&batch)?))
            .await
    }

    /// 从文件路径创建导入批次
    pub async fn create_batch_from_path(
        &self,
        path: &Path,
        target_product_code: &str,
        target_quantity: f64,
        auto_confirm: bool,
    ) -> ApiResult<String> {
        let file = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::InvalidInput(format!("无法读取文件 {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        self.create_batch(CreateBatchRequest {
            file,
            file_name,
            target_product_code: target_product_code.to_string(),
            target_quantity,
            auto_confirm,
        })
        .await
    }

    /// 统计数据行并确认批次（draft → confirmed）
    pub async fn count_rows(&self, batch_id: &str) -> ApiResult<u64> {
        let batch_id = batch_id.to_string();
        self.with_importer(move |importer| importer.action_count_rows(&batch_id))
            .await
    }

    /// 执行导入（confirmed → done）
    pub async fn run_import(&self, batch_id: &str) -> ApiResult<ImportOutcome> {
        let batch_id = batch_id.to_string();
        self.with_importer(move |importer| importer.action_import(&batch_id))
            .await
    }

    /// 创建、确认并导入一个文件
    #[instrument(skip(self, request), fields(file_name = %request.file_name))]
    pub async fn import_file(&self, request: CreateBatchRequest) -> ApiResult<ImportReport> {
        let started = Instant::now();
        let batch_id = self.create_batch(request).await?;
        let row_count = self.count_rows(&batch_id).await?;
        let outcome = self.run_import(&batch_id).await?;
        let elapsed_ms = started.elapsed().as_millis() as i64;

        info!(batch_id = %batch_id, row_count, elapsed_ms, "文件导入结束");
        Ok(ImportReport {
            batch_id,
            row_count,
            outcome,
            elapsed_ms,
        })
    }

    /// 并发导入多个文件（各批次失败互不影响）
    pub async fn batch_import(&self, requests: Vec<CreateBatchRequest>) -> Vec<ApiResult<ImportReport>> {
        join_all(requests.into_iter().map(|request| self.import_file(request))).await
    }

    /// 查询批次进度（独立连接，不受导入写入阻塞）
    ///
    /// # 返回
    /// - Ok(None): 批次不存在
    pub async fn get_progress(&self, batch_id: &str) -> ApiResult<Option<ProgressSnapshot>> {
        let batch_id = batch_id.to_string();
        self.with_batch_repo(move |repo| Ok(repo.read_progress(&batch_id)?))
            .await
    }

    /// 查询批次
    pub async fn get_batch(&self, batch_id: &str) -> ApiResult<ImportBatch> {
        let batch_id = batch_id.to_string();
        self.with_batch_repo(move |repo| {
            repo.find_batch(&batch_id)?
                .ok_or_else(|| ApiError::NotFound(format!("ImportBatch(id={})不存在", batch_id)))
        })
        .await
    }

    async fn with_importer<T, F>(&self, task: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&ComponentImporter) -> ImportResult<T> + Send + 'static,
    {
        let settings = self.load_settings().await?;
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || -> ApiResult<T> {
            let importer = ComponentImporter::open(&db_path, settings)?;
            Ok(task(&importer)?)
        })
        .await
        .map_err(|e| ApiError::InternalError(format!("导入任务异常终止: {}", e)))?
    }

    async fn with_batch_repo<T, F>(&self, task: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&ImportBatchRepositoryImpl) -> ApiResult<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || -> ApiResult<T> {
            let repo = ImportBatchRepositoryImpl::new(&db_path)?;
            task(&repo)
        })
        .await
        .map_err(|e| ApiError::InternalError(format!("查询任务异常终止: {}", e)))?
    }
}
