// ==========================================
// 生产订单组件导入 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键 / busy_timeout / WAL）
// - WAL: 进度轮询方在独立连接上读取，不阻塞导入写入，也不被其阻塞
// - 统一建表（幂等）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::path::PathBuf;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
/// - journal_mode=WAL 对数据库文件持久生效；内存库会返回 "memory"，忽略即可
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    tracing::trace!(journal_mode = %mode, "SQLite 连接已配置");
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 默认数据库路径
///
/// 优先读取环境变量 MRP_COMPONENT_IMPORT_DB_PATH，否则位于用户数据目录下。
pub fn default_db_path() -> String {
    if let Ok(path) = std::env::var("MRP_COMPONENT_IMPORT_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./mrp_component_import.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("mrp-component-import");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("mrp_component_import.db");
        }
    }
    path.to_string_lossy().to_string()
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 初始化数据库 schema（幂等）
///
/// 主数据表（product / uom / res_company / stock_location / res_users /
/// warehouse_routing）由外部系统维护，这里只保证表结构存在。
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_scope (
            scope_id TEXT PRIMARY KEY,
            scope_type TEXT NOT NULL,
            scope_key TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(scope_type, scope_key)
        );

        INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
        VALUES ('global', 'GLOBAL', 'global');

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS res_company (
            company_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS uom (
            uom_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            active INTEGER NOT NULL DEFAULT 1
        );
        CREATE INDEX IF NOT EXISTS idx_uom_name ON uom(name);

        CREATE TABLE IF NOT EXISTS product (
            product_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            default_code TEXT,
            uom_id INTEGER NOT NULL REFERENCES uom(uom_id),
            active INTEGER NOT NULL DEFAULT 1
        );
        CREATE INDEX IF NOT EXISTS idx_product_default_code ON product(default_code);

        CREATE TABLE IF NOT EXISTS stock_location (
            location_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            company_id INTEGER REFERENCES res_company(company_id)
        );
        CREATE INDEX IF NOT EXISTS idx_stock_location_name ON stock_location(name);

        CREATE TABLE IF NOT EXISTS res_users (
            user_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS warehouse_routing (
            warehouse_id INTEGER PRIMARY KEY,
            company_id INTEGER NOT NULL REFERENCES res_company(company_id),
            name TEXT NOT NULL,
            location_src_id INTEGER NOT NULL REFERENCES stock_location(location_id),
            location_dest_id INTEGER NOT NULL REFERENCES stock_location(location_id),
            active INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS production_order (
            order_id INTEGER PRIMARY KEY AUTOINCREMENT,
            product_id INTEGER NOT NULL REFERENCES product(product_id),
            product_qty REAL NOT NULL CHECK (product_qty > 0),
            uom_id INTEGER NOT NULL REFERENCES uom(uom_id),
            company_id INTEGER NOT NULL REFERENCES res_company(company_id),
            warehouse_id INTEGER NOT NULL REFERENCES warehouse_routing(warehouse_id),
            location_src_id INTEGER NOT NULL REFERENCES stock_location(location_id),
            location_dest_id INTEGER NOT NULL REFERENCES stock_location(location_id),
            state TEXT NOT NULL DEFAULT 'draft',
            component_count INTEGER NOT NULL DEFAULT 0,
            origin TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS stock_move (
            move_id INTEGER PRIMARY KEY AUTOINCREMENT,
            order_id INTEGER NOT NULL REFERENCES production_order(order_id),
            name TEXT NOT NULL,
            product_id INTEGER NOT NULL REFERENCES product(product_id),
            quantity REAL NOT NULL CHECK (quantity > 0),
            uom_id INTEGER NOT NULL REFERENCES uom(uom_id),
            location_src_id INTEGER NOT NULL REFERENCES stock_location(location_id),
            location_dest_id INTEGER NOT NULL REFERENCES stock_location(location_id),
            company_id INTEGER NOT NULL REFERENCES res_company(company_id),
            warehouse_id INTEGER NOT NULL REFERENCES warehouse_routing(warehouse_id),
            origin TEXT,
            date_planned TEXT,
            responsible_id INTEGER REFERENCES res_users(user_id),
            priority INTEGER,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_stock_move_order ON stock_move(order_id);

        CREATE TABLE IF NOT EXISTS import_batch (
            batch_id TEXT PRIMARY KEY,
            file BLOB NOT NULL,
            file_name TEXT,
            target_product_code TEXT NOT NULL,
            target_quantity REAL NOT NULL DEFAULT 1.0,
            auto_confirm INTEGER NOT NULL DEFAULT 0,
            log TEXT,
            state TEXT NOT NULL DEFAULT 'draft',
            row_count INTEGER NOT NULL DEFAULT 0,
            progress_current INTEGER NOT NULL DEFAULT 0,
            progress_total INTEGER NOT NULL DEFAULT 0,
            is_processing INTEGER NOT NULL DEFAULT 0,
            import_status TEXT,
            order_id INTEGER REFERENCES production_order(order_id),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}
