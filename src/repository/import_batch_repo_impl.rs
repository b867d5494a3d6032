// ==========================================
// 生产订单组件导入 - 导入批次 Repository 实现
// ==========================================
// 职责: import_batch 表读写（使用 rusqlite）
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::import_batch::{ImportBatch, NewImportBatch, Progress, ProgressSnapshot};
use crate::domain::types::{BatchState, ImportStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::import_batch_repo::{BatchUpdate, ImportBatchRepository};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

fn parse_state(raw: &str) -> RepositoryResult<BatchState> {
    raw.parse().map_err(|message| RepositoryError::FieldValueError {
        field: "import_batch.state".to_string(),
        message,
    })
}

fn parse_status(raw: Option<String>) -> RepositoryResult<Option<ImportStatus>> {
    raw.filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.parse().map_err(|message| RepositoryError::FieldValueError {
                field: "import_batch.import_status".to_string(),
                message,
            })
        })
        .transpose()
}

// ==========================================
// ImportBatchRepositoryImpl
// ==========================================
pub struct ImportBatchRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl ImportBatchRepositoryImpl {
    /// 创建新的 Repository 实例（独立连接，可用于进度轮询）
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn not_found(batch_id: &str) -> RepositoryError {
        RepositoryError::NotFound {
            entity: "ImportBatch".to_string(),
            id: batch_id.to_string(),
        }
    }
}

impl ImportBatchRepository for ImportBatchRepositoryImpl {
    fn insert_batch(&self, batch: &NewImportBatch) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        let batch_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        conn.execute(
            r#"
            INSERT INTO import_batch (
                batch_id, file, file_name, target_product_code, target_quantity,
                auto_confirm, state, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            "#,
            params![
                batch_id,
                batch.file,
                batch.file_name,
                batch.target_product_code,
                batch.target_quantity,
                batch.auto_confirm as i32,
                BatchState::Draft.as_str(),
                now,
            ],
        )?;
        Ok(batch_id)
    }

    fn find_batch(&self, batch_id: &str) -> RepositoryResult<Option<ImportBatch>> {
        let conn = self.get_conn()?;
        let raw = conn
            .query_row(
                r#"
                SELECT batch_id, file, file_name, target_product_code, target_quantity,
                       auto_confirm, log, state, row_count, progress_current,
                       progress_total, is_processing, import_status, order_id,
                       created_at, updated_at
                FROM import_batch
                WHERE batch_id = ?1
                "#,
                params![batch_id],
                |row| {
                    Ok((
                        ImportBatch {
                            batch_id: row.get(0)?,
                            file: row.get(1)?,
                            file_name: row.get(2)?,
                            target_product_code: row.get(3)?,
                            target_quantity: row.get(4)?,
                            auto_confirm: row.get::<_, i64>(5)? != 0,
                            log: row.get(6)?,
                            state: BatchState::Draft,
                            row_count: row.get::<_, i64>(8)?.max(0) as u64,
                            progress: Progress {
                                current: row.get::<_, i64>(9)?.max(0) as u64,
                                total: row.get::<_, i64>(10)?.max(0) as u64,
                                is_processing: row.get::<_, i64>(11)? != 0,
                            },
                            import_status: None,
                            order_id: row.get(13)?,
                            created_at: row.get::<_, DateTime<Utc>>(14)?,
                            updated_at: row.get::<_, DateTime<Utc>>(15)?,
                        },
                        row.get::<_, String>(7)?,
                        row.get::<_, Option<String>>(12)?,
                    ))
                },
            )
            .optional()?;

        match raw {
            Some((mut batch, state_raw, status_raw)) => {
                batch.state = parse_state(&state_raw)?;
                batch.import_status = parse_status(status_raw)?;
                Ok(Some(batch))
            }
            None => Ok(None),
        }
    }

    fn update_batch(&self, batch_id: &str, update: &BatchUpdate) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let touched = conn.execute(
            r#"
            UPDATE import_batch SET
                state = COALESCE(?2, state),
                row_count = COALESCE(?3, row_count),
                log = COALESCE(?4, log),
                import_status = COALESCE(?5, import_status),
                order_id = COALESCE(?6, order_id),
                updated_at = ?7
            WHERE batch_id = ?1
            "#,
            params![
                batch_id,
                update.state.map(|s| s.as_str()),
                update.row_count.map(|n| n as i64),
                update.log,
                update.import_status.map(|s| s.as_str()),
                update.order_id,
                Utc::now(),
            ],
        )?;
        if touched == 0 {
            return Err(Self::not_found(batch_id));
        }
        Ok(())
    }

    fn write_progress(&self, batch_id: &str, progress: &Progress) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let touched = conn.execute(
            r#"
            UPDATE import_batch SET
                progress_current = ?2,
                progress_total = ?3,
                is_processing = ?4
            WHERE batch_id = ?1
            "#,
            params![
                batch_id,
                progress.current as i64,
                progress.total as i64,
                progress.is_processing as i32,
            ],
        )?;
        if touched == 0 {
            return Err(Self::not_found(batch_id));
        }
        Ok(())
    }

    fn read_progress(&self, batch_id: &str) -> RepositoryResult<Option<ProgressSnapshot>> {
        let conn = self.get_conn()?;
        let raw = conn
            .query_row(
                r#"
                SELECT progress_current, progress_total, is_processing, state
                FROM import_batch
                WHERE batch_id = ?1
                "#,
                params![batch_id],
                |row| {
                    Ok((
                        Progress {
                            current: row.get::<_, i64>(0)?.max(0) as u64,
                            total: row.get::<_, i64>(1)?.max(0) as u64,
                            is_processing: row.get::<_, i64>(2)? != 0,
                        },
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        match raw {
            Some((progress, state_raw)) => Ok(Some(ProgressSnapshot::new(
                progress,
                parse_state(&state_raw)?,
            ))),
            None => Ok(None),
        }
    }
}
