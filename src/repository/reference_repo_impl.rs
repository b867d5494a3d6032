// ==========================================
// 生产订单组件导入 - 主数据引用 Repository 实现
// ==========================================
// 职责: 实现主数据查询（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据查询
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::order::{Company, Location, Product, Uom, User, WarehouseRouting};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::reference_repo::ReferenceRepository;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

// ==========================================
// ReferenceRepositoryImpl
// ==========================================
pub struct ReferenceRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl ReferenceRepositoryImpl {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
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

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_product(row: &Row) -> SqliteResult<Product> {
        Ok(Product {
            product_id: row.get(0)?,
            name: row.get(1)?,
            default_code: row.get(2)?,
            uom_id: row.get(3)?,
            active: row.get::<_, i64>(4)? != 0,
        })
    }

    fn map_uom(row: &Row) -> SqliteResult<Uom> {
        Ok(Uom {
            uom_id: row.get(0)?,
            name: row.get(1)?,
            active: row.get::<_, i64>(2)? != 0,
        })
    }

    fn map_company(row: &Row) -> SqliteResult<Company> {
        Ok(Company {
            company_id: row.get(0)?,
            name: row.get(1)?,
        })
    }
}

impl ReferenceRepository for ReferenceRepositoryImpl {
    fn find_products_by_code(&self, code: &str, limit: usize) -> RepositoryResult<Vec<Product>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT product_id, name, default_code, uom_id, active
            FROM product
            WHERE default_code = ?1
            ORDER BY product_id
            LIMIT ?2
            "#,
        )?;

        let products = stmt
            .query_map(params![code, limit as i64], Self::map_product)?
            .collect::<SqliteResult<Vec<Product>>>()?;
        Ok(products)
    }

    fn find_missing_product_codes(
        &self,
        codes: &BTreeSet<String>,
    ) -> RepositoryResult<BTreeSet<String>> {
        if codes.is_empty() {
            return Ok(BTreeSet::new());
        }

        // 编码整体作为一个 JSON 数组参数传入，不受 SQLite 变量个数上限约束
        let codes_json = serde_json::to_string(codes)
            .map_err(|e| RepositoryError::InternalError(e.to_string()))?;

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT DISTINCT default_code
            FROM product
            WHERE default_code IN (SELECT value FROM json_each(?1))
            "#,
        )?;

        let found = stmt
            .query_map(params![codes_json], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<BTreeSet<String>>>()?;

        Ok(codes.difference(&found).cloned().collect())
    }

    fn find_units_by_name(&self, name: &str, limit: usize) -> RepositoryResult<Vec<Uom>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT uom_id, name, active FROM uom WHERE name = ?1 ORDER BY uom_id LIMIT ?2",
        )?;
        let units = stmt
            .query_map(params![name, limit as i64], Self::map_uom)?
            .collect::<SqliteResult<Vec<Uom>>>()?;
        Ok(units)
    }

    fn find_company_by_name(&self, name: &str) -> RepositoryResult<Option<Company>> {
        let conn = self.get_conn()?;
        let company = conn
            .query_row(
                "SELECT company_id, name FROM res_company WHERE name = ?1 ORDER BY company_id LIMIT 1",
                params![name],
                Self::map_company,
            )
            .optional()?;
        Ok(company)
    }

    fn find_location_by_name(&self, name: &str) -> RepositoryResult<Option<Location>> {
        let conn = self.get_conn()?;
        let location = conn
            .query_row(
                "SELECT location_id, name FROM stock_location WHERE name = ?1 ORDER BY location_id LIMIT 1",
                params![name],
                |row| {
                    Ok(Location {
                        location_id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(location)
    }

    fn find_user_by_name(&self, name: &str) -> RepositoryResult<Option<User>> {
        let conn = self.get_conn()?;
        let user = conn
            .query_row(
                "SELECT user_id, name FROM res_users WHERE name = ?1 ORDER BY user_id LIMIT 1",
                params![name],
                |row| {
                    Ok(User {
                        user_id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    fn find_warehouse_routing(
        &self,
        company_id: i64,
    ) -> RepositoryResult<Option<WarehouseRouting>> {
        let conn = self.get_conn()?;
        let routing = conn
            .query_row(
                r#"
                SELECT warehouse_id, company_id, location_src_id, location_dest_id
                FROM warehouse_routing
                WHERE company_id = ?1 AND active = 1
                ORDER BY warehouse_id
                LIMIT 1
                "#,
                params![company_id],
                |row| {
                    Ok(WarehouseRouting {
                        warehouse_id: row.get(0)?,
                        company_id: row.get(1)?,
                        location_src_id: row.get(2)?,
                        location_dest_id: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(routing)
    }

    fn find_default_company(&self) -> RepositoryResult<Option<Company>> {
        let conn = self.get_conn()?;
        let company = conn
            .query_row(
                "SELECT company_id, name FROM res_company ORDER BY company_id LIMIT 1",
                [],
                Self::map_company,
            )
            .optional()?;
        Ok(company)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, init_schema};

    fn setup() -> ReferenceRepositoryImpl {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO uom (uom_id, name, active) VALUES (1, 'Unit', 1), (2, 'kg', 0);
            INSERT INTO product (product_id, name, default_code, uom_id, active) VALUES
                (1, 'Cable', 'P-CABLE', 1, 1),
                (2, 'Old board', 'P-BOARD', 1, 0);
            "#,
        )
        .unwrap();
        ReferenceRepositoryImpl::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_find_missing_product_codes_returns_exact_subset() {
        let repo = setup();
        let wanted: BTreeSet<String> = ["P-CABLE", "P-BOARD", "BAD-SKU-1", "p-cable"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let missing = repo.find_missing_product_codes(&wanted).unwrap();
        // 停用产品计为存在；大小写敏感
        let expected: BTreeSet<String> =
            ["BAD-SKU-1", "p-cable"].iter().map(|s| s.to_string()).collect();
        assert_eq!(missing, expected);
    }

    #[test]
    fn test_find_missing_product_codes_empty_input() {
        let repo = setup();
        assert!(repo.find_missing_product_codes(&BTreeSet::new()).unwrap().is_empty());
    }

    #[test]
    fn test_find_missing_product_codes_beyond_variable_limit() {
        let repo = setup();
        let mut wanted: BTreeSet<String> = (0..40_000).map(|i| format!("C-{}", i)).collect();
        wanted.insert("P-CABLE".to_string());

        let missing = repo.find_missing_product_codes(&wanted).unwrap();
        assert_eq!(missing.len(), 40_000);
        assert!(!missing.contains("P-CABLE"));
        assert!(missing.contains("C-39999"));
    }

    #[test]
    fn test_inactive_unit_is_found() {
        let repo = setup();
        let units = repo.find_units_by_name("kg", 2).unwrap();
        assert_eq!(units.len(), 1);
        assert!(!units[0].active);
    }
}
