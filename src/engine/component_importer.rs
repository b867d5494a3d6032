// ==========================================
// 生产订单组件导入 - 批次生命周期服务
// ==========================================
// 状态机: draft --action_count_rows--> confirmed --action_import--> done
// 职责:
// - action_count_rows: 校验文件类型、统计数据行
// - action_import: 预检 → 创建目标订单 → 逐行落库 → 可选确认 → 汇总
// 红线: Engine 不拼 SQL，所有写入经 Repository
// ==========================================

use crate::config::ImportSettings;
use crate::db::open_sqlite_connection;
use crate::domain::import_batch::{ImportBatch, Progress, ProgressSnapshot};
use crate::domain::order::{NewProductionOrder, ProductionOrder};
use crate::domain::row::RowRecord;
use crate::domain::types::{BatchState, ImportStatus};
use crate::engine::progress_tracker::ProgressTracker;
use crate::engine::row_processor::RowProcessor;
use crate::engine::summary::{self, ImportSummary};
use crate::i18n::{t, t_with_args};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{TabularFormat, TabularReader};
use crate::importer::preflight::PreflightValidator;
use crate::importer::reference_resolver::ReferenceResolver;
use crate::importer::row_converter::RowConverter;
use crate::repository::{
    BatchUpdate, ImportBatchRepository, ImportBatchRepositoryImpl, OrderRepository,
    OrderRepositoryImpl, ReferenceRepository, ReferenceRepositoryImpl, RepositoryResult,
};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tracing::{error, info, instrument};

// ==========================================
// ImportOutcome - action_import 的结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ImportOutcome {
    /// 行处理已执行（可能含行级错误）
    Completed(ImportSummary),
    /// 预检发现不存在的产品编码，未写入任何组件行
    Aborted { missing_codes: Vec<String> },
}

impl ImportOutcome {
    pub fn import_status(&self) -> ImportStatus {
        match self {
            ImportOutcome::Completed(summary) => summary.import_status,
            ImportOutcome::Aborted { .. } => ImportStatus::Error,
        }
    }
}

// ==========================================
// ComponentImporter
// ==========================================
pub struct ComponentImporter {
    batches: Arc<dyn ImportBatchRepository>,
    references: Arc<dyn ReferenceRepository>,
    orders: Arc<dyn OrderRepository>,
    settings: ImportSettings,
    reader: TabularReader,
}

impl ComponentImporter {
    pub fn new(
        batches: Arc<dyn ImportBatchRepository>,
        references: Arc<dyn ReferenceRepository>,
        orders: Arc<dyn OrderRepository>,
        settings: ImportSettings,
    ) -> Self {
        Self {
            batches,
            references,
            orders,
            settings,
            reader: TabularReader,
        }
    }

    /// 在单个连接上组装全部仓储
    ///
    /// 该连接即批次的会话范围；进度轮询方应使用独立连接。
    pub fn open(db_path: &str, settings: ImportSettings) -> RepositoryResult<Self> {
        let conn = Arc::new(Mutex::new(open_sqlite_connection(db_path)?));
        Ok(Self::new(
            Arc::new(ImportBatchRepositoryImpl::from_connection(conn.clone())),
            Arc::new(ReferenceRepositoryImpl::from_connection(conn.clone())),
            Arc::new(OrderRepositoryImpl::from_connection(conn)),
            settings,
        ))
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    // ==========================================
    // draft → confirmed
    // ==========================================

    /// 统计数据行并确认批次
    ///
    /// # 返回
    /// - Ok(u64): 非空数据行数
    ///
    /// # 错误
    /// - Input: 批次不是 draft / 扩展名不被支持 / 没有数据行
    /// - Format: 文件无法解码
    #[instrument(skip(self), fields(batch_id = %batch_id))]
    pub fn action_count_rows(&self, batch_id: &str) -> ImportResult<u64> {
        let batch = self.load_batch(batch_id)?;
        Self::ensure_state(&batch, BatchState::Draft)?;

        let format = self.detect_format(&batch)?;
        let mut row_count = 0u64;
        for row in self.reader.read_rows(&batch.file, format)? {
            row?;
            row_count += 1;
        }

        if row_count == 0 {
            return Err(ImportError::Input(t("import.no_data_rows")));
        }

        self.batches.update_batch(
            batch_id,
            &BatchUpdate {
                state: Some(BatchState::Confirmed),
                row_count: Some(row_count),
                ..Default::default()
            },
        )?;
        self.batches.write_progress(
            batch_id,
            &Progress {
                current: 0,
                total: row_count,
                is_processing: false,
            },
        )?;

        info!(row_count, "导入批次已确认");
        Ok(row_count)
    }

    // ==========================================
    // confirmed → done
    // ==========================================

    /// 执行导入
    ///
    /// # 返回
    /// - Ok(Completed): 行处理已执行，日志与状态已写入批次
    /// - Ok(Aborted): 预检中止，零组件行
    ///
    /// # 错误
    /// - Input: 批次不是 confirmed（批次不做任何修改）
    /// - 其他致命错误: 批次置为 done / error 并写入日志后向上传播
    #[instrument(skip(self), fields(batch_id = %batch_id))]
    pub fn action_import(&self, batch_id: &str) -> ImportResult<ImportOutcome> {
        let batch = self.load_batch(batch_id)?;
        if batch.state != BatchState::Confirmed {
            return Err(ImportError::Input(t("import.confirm_first")));
        }

        let mut guard = ProgressTracker::start(
            self.batches.as_ref(),
            batch_id,
            batch.row_count,
            self.settings.progress_flush_every,
        )?;

        match self.run_import(&batch, &mut guard) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!(kind = e.kind(), error = %e, "导入失败");
                let log = t_with_args("import.fatal", &[("error", &e.to_string())]);
                if let Err(write_err) = self.finish(batch_id, log, ImportStatus::Error) {
                    error!(error = %write_err, "写入失败日志时出错");
                }
                Err(e)
            }
        }
    }

    /// 读取批次进度
    ///
    /// # 返回
    /// - Ok(None): 批次不存在
    pub fn get_progress(&self, batch_id: &str) -> ImportResult<Option<ProgressSnapshot>> {
        Ok(self.batches.read_progress(batch_id)?)
    }

    fn run_import(
        &self,
        batch: &ImportBatch,
        tracker: &mut ProgressTracker<'_>,
    ) -> ImportResult<ImportOutcome> {
        let batch_id = batch.batch_id.as_str();

        let format = self.detect_format(batch)?;
        let rows = self
            .reader
            .read_rows(&batch.file, format)?
            .collect::<ImportResult<Vec<RowRecord>>>()?;

        let resolver =
            ReferenceResolver::new(self.references.as_ref(), self.settings.duplicate_code_policy);

        // 1. 预检
        let missing = PreflightValidator::new(&resolver).validate(&rows)?;
        if !missing.is_empty() {
            info!(missing = missing.len(), "预检发现不存在的产品编码，中止导入");
            self.finish(batch_id, summary::abort_log(&missing), ImportStatus::Error)?;
            return Ok(ImportOutcome::Aborted {
                missing_codes: missing.into_iter().collect(),
            });
        }

        // 2. 目标订单
        let order = self.create_target_order(&resolver, batch)?;

        // 3. 逐行处理
        let converter = RowConverter::new(&resolver);
        let tally = RowProcessor::new(&converter, self.orders.as_ref()).process(
            &rows,
            &order,
            tracker,
        )?;

        // 4. 自动确认
        let order_confirmed = batch.auto_confirm && tally.success_count > 0;
        if order_confirmed {
            self.orders.confirm_order(order.order_id)?;
        }

        // 5. 汇总
        let (log, import_status) = summary::build_log(&tally);
        self.finish(batch_id, log.clone(), import_status)?;

        info!(
            order_id = order.order_id,
            success = tally.success_count,
            errors = tally.errors.len(),
            "导入完成"
        );

        Ok(ImportOutcome::Completed(ImportSummary {
            batch_id: batch_id.to_string(),
            order_id: order.order_id,
            success_count: tally.success_count,
            errors: tally.errors,
            log,
            import_status,
            order_confirmed,
        }))
    }

    /// 解析目标产品与生产路线并创建生产订单
    fn create_target_order(
        &self,
        resolver: &ReferenceResolver<'_>,
        batch: &ImportBatch,
    ) -> ImportResult<ProductionOrder> {
        let product = resolver.resolve_product(Some(&batch.target_product_code))?;
        if !(batch.target_quantity.is_finite() && batch.target_quantity > 0.0) {
            return Err(ImportError::Input(t("import.target_quantity_not_positive")));
        }

        let company = resolver.resolve_order_company(self.settings.company_name.as_deref())?;
        let routing = self
            .references
            .find_warehouse_routing(company.company_id)?
            .ok_or_else(|| ImportError::not_found("Warehouse routing", company.name.clone()))?;

        let order = self.orders.create_order(&NewProductionOrder {
            product_id: product.product_id,
            product_qty: batch.target_quantity,
            uom_id: product.uom_id,
            company_id: company.company_id,
            warehouse_id: routing.warehouse_id,
            location_src_id: routing.location_src_id,
            location_dest_id: routing.location_dest_id,
            origin: batch.file_name.clone(),
        })?;

        self.batches.update_batch(
            &batch.batch_id,
            &BatchUpdate {
                order_id: Some(order.order_id),
                ..Default::default()
            },
        )?;
        info!(order_id = order.order_id, product = %product.name, "目标生产订单已创建");
        Ok(order)
    }

    fn finish(&self, batch_id: &str, log: String, status: ImportStatus) -> RepositoryResult<()> {
        self.batches.update_batch(
            batch_id,
            &BatchUpdate {
                state: Some(BatchState::Done),
                log: Some(log),
                import_status: Some(status),
                ..Default::default()
            },
        )
    }

    fn load_batch(&self, batch_id: &str) -> ImportResult<ImportBatch> {
        self.batches
            .find_batch(batch_id)?
            .ok_or_else(|| ImportError::not_found("ImportBatch", batch_id))
    }

    fn detect_format(&self, batch: &ImportBatch) -> ImportResult<TabularFormat> {
        let file_name = batch.file_name.as_deref().unwrap_or_default();
        TabularFormat::from_file_name(file_name, &self.settings.allowed_extensions)
            .ok_or_else(|| ImportError::Input(t("import.invalid_file_type")))
    }

    fn ensure_state(batch: &ImportBatch, expected: BatchState) -> ImportResult<()> {
        if batch.state == expected {
            return Ok(());
        }
        Err(ImportError::Input(t_with_args(
            "import.invalid_state",
            &[("state", batch.state.as_str()), ("expected", expected.as_str())],
        )))
    }
}
