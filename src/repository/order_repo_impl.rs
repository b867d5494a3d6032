// ==========================================
// 生产订单组件导入 - 生产订单 Repository 实现
// ==========================================
// 职责: 实现生产订单与组件行的数据访问（使用 rusqlite）
// 行级隔离: 每行写入包在具名 savepoint 内
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::order::{NewProductionOrder, NewTargetLine, ProductionOrder, TargetLine};
use crate::domain::types::OrderState;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::order_repo::OrderRepository;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

/// 单行 savepoint 名称
const ROW_SAVEPOINT: &str = "component_import_row";

const ORDER_COLUMNS: &str = r#"
    order_id, product_id, product_qty, uom_id, company_id, warehouse_id,
    location_src_id, location_dest_id, state, component_count, origin, created_at
"#;

const LINE_COLUMNS: &str = r#"
    move_id, order_id, name, product_id, quantity, uom_id, location_src_id,
    location_dest_id, company_id, warehouse_id, origin, date_planned,
    responsible_id, priority, created_at
"#;

// ==========================================
// OrderRepositoryImpl
// ==========================================
pub struct OrderRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl OrderRepositoryImpl {
    /// 创建新的 Repository 实例
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

    fn map_order(row: &Row) -> SqliteResult<(ProductionOrder, String)> {
        let state_raw: String = row.get(8)?;
        Ok((
            ProductionOrder {
                order_id: row.get(0)?,
                product_id: row.get(1)?,
                product_qty: row.get(2)?,
                uom_id: row.get(3)?,
                company_id: row.get(4)?,
                warehouse_id: row.get(5)?,
                location_src_id: row.get(6)?,
                location_dest_id: row.get(7)?,
                // 先占位，调用方解析 state_raw 后回填
                state: OrderState::Draft,
                component_count: row.get(9)?,
                origin: row.get(10)?,
                created_at: row.get::<_, DateTime<Utc>>(11)?,
            },
            state_raw,
        ))
    }

    fn finish_order((mut order, state_raw): (ProductionOrder, String)) -> RepositoryResult<ProductionOrder> {
        order.state = state_raw
            .parse()
            .map_err(|message| RepositoryError::FieldValueError {
                field: "production_order.state".to_string(),
                message,
            })?;
        Ok(order)
    }

    fn map_line(row: &Row) -> SqliteResult<TargetLine> {
        Ok(TargetLine {
            move_id: row.get(0)?,
            line: NewTargetLine {
                order_id: row.get(1)?,
                name: row.get(2)?,
                product_id: row.get(3)?,
                quantity: row.get(4)?,
                uom_id: row.get(5)?,
                location_src_id: row.get(6)?,
                location_dest_id: row.get(7)?,
                company_id: row.get(8)?,
                warehouse_id: row.get(9)?,
                origin: row.get(10)?,
                date_planned: row.get(11)?,
                responsible_id: row.get(12)?,
                priority: row.get(13)?,
            },
            created_at: row.get::<_, DateTime<Utc>>(14)?,
        })
    }
}

impl OrderRepository for OrderRepositoryImpl {
    fn create_order(&self, order: &NewProductionOrder) -> RepositoryResult<ProductionOrder> {
        let conn = self.get_conn()?;
        let now = Utc::now();
        conn.execute(
            r#"
            INSERT INTO production_order (
                product_id, product_qty, uom_id, company_id, warehouse_id,
                location_src_id, location_dest_id, state, component_count, origin, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9, ?10)
            "#,
            params![
                order.product_id,
                order.product_qty,
                order.uom_id,
                order.company_id,
                order.warehouse_id,
                order.location_src_id,
                order.location_dest_id,
                OrderState::Draft.as_str(),
                order.origin,
                now,
            ],
        )?;

        Ok(ProductionOrder {
            order_id: conn.last_insert_rowid(),
            product_id: order.product_id,
            product_qty: order.product_qty,
            uom_id: order.uom_id,
            company_id: order.company_id,
            warehouse_id: order.warehouse_id,
            location_src_id: order.location_src_id,
            location_dest_id: order.location_dest_id,
            state: OrderState::Draft,
            component_count: 0,
            origin: order.origin.clone(),
            created_at: now,
        })
    }

    fn persist_line(&self, line: &NewTargetLine) -> RepositoryResult<TargetLine> {
        let mut conn = self.get_conn()?;
        let now = Utc::now();

        // Savepoint 在 drop 时默认回滚；只有 commit() 才释放并保留本行写入
        let sp = conn.savepoint_with_name(ROW_SAVEPOINT)?;

        let touched = sp.execute(
            "UPDATE production_order SET component_count = component_count + 1 WHERE order_id = ?1",
            params![line.order_id],
        )?;
        if touched != 1 {
            return Err(RepositoryError::NotFound {
                entity: "ProductionOrder".to_string(),
                id: line.order_id.to_string(),
            });
        }

        sp.execute(
            r#"
            INSERT INTO stock_move (
                order_id, name, product_id, quantity, uom_id, location_src_id,
                location_dest_id, company_id, warehouse_id, origin, date_planned,
                responsible_id, priority, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                line.order_id,
                line.name,
                line.product_id,
                line.quantity,
                line.uom_id,
                line.location_src_id,
                line.location_dest_id,
                line.company_id,
                line.warehouse_id,
                line.origin,
                line.date_planned,
                line.responsible_id,
                line.priority,
                now,
            ],
        )?;
        let move_id = sp.last_insert_rowid();

        sp.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(TargetLine {
            move_id,
            line: line.clone(),
            created_at: now,
        })
    }

    fn confirm_order(&self, order_id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let touched = conn.execute(
            "UPDATE production_order SET state = ?1 WHERE order_id = ?2",
            params![OrderState::Confirmed.as_str(), order_id],
        )?;
        if touched == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ProductionOrder".to_string(),
                id: order_id.to_string(),
            });
        }
        Ok(())
    }

    fn find_order(&self, order_id: i64) -> RepositoryResult<Option<ProductionOrder>> {
        let conn = self.get_conn()?;
        let query = format!("SELECT {} FROM production_order WHERE order_id = ?1", ORDER_COLUMNS);
        let raw = conn
            .query_row(&query, params![order_id], Self::map_order)
            .optional()?;
        raw.map(Self::finish_order).transpose()
    }

    fn list_lines_by_order(&self, order_id: i64) -> RepositoryResult<Vec<TargetLine>> {
        let conn = self.get_conn()?;
        let query = format!(
            "SELECT {} FROM stock_move WHERE order_id = ?1 ORDER BY move_id",
            LINE_COLUMNS
        );
        let mut stmt = conn.prepare(&query)?;
        let lines = stmt
            .query_map(params![order_id], Self::map_line)?
            .collect::<SqliteResult<Vec<TargetLine>>>()?;
        Ok(lines)
    }

    fn count_lines_by_order(&self, order_id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM stock_move WHERE order_id = ?1",
            params![order_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn count_all_lines(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM stock_move", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
