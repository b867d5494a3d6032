// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库、主数据种子、内存 xlsx 生成
// ==========================================

#![allow(dead_code)]

use mrp_component_import::config::ImportSettings;
use mrp_component_import::db::{init_schema, open_sqlite_connection};
use mrp_component_import::domain::NewImportBatch;
use mrp_component_import::repository::{ImportBatchRepository, ImportBatchRepositoryImpl};
use mrp_component_import::ComponentImporter;
use rust_xlsxwriter::Workbook;
use std::error::Error;
use tempfile::TempDir;

/// 测试单元格
#[derive(Debug, Clone, Copy)]
pub enum Cell<'a> {
    Text(&'a str),
    Num(f64),
    Empty,
}

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - TempDir: 临时目录（需要保持存活，WAL 文件也在其中）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(TempDir, String), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("import_test.db").to_string_lossy().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((dir, db_path))
}

/// 写入主数据
///
/// - 公司 Acme Manufacturing，生产路线 WH/Stock → Virtual/Production
/// - 产品 P-DESK（目标产品）、P-CABLE（单位 m）、P-BOARD
pub fn seed_master_data(db_path: &str) -> Result<(), Box<dyn Error>> {
    let conn = open_sqlite_connection(db_path)?;
    conn.execute_batch(
        r#"
        INSERT INTO res_company (company_id, name) VALUES (1, 'Acme Manufacturing');
        INSERT INTO uom (uom_id, name, active) VALUES (1, 'Units', 1), (2, 'm', 1), (3, 'Dozens', 0);
        INSERT INTO stock_location (location_id, name, company_id) VALUES
            (1, 'WH/Stock', 1),
            (2, 'Virtual/Production', 1),
            (3, 'WH/Spare Parts', 1);
        INSERT INTO res_users (user_id, name) VALUES (1, 'Planner');
        INSERT INTO warehouse_routing (warehouse_id, company_id, name, location_src_id, location_dest_id, active)
            VALUES (1, 1, 'Main Warehouse', 1, 2, 1);
        INSERT INTO product (product_id, name, default_code, uom_id, active) VALUES
            (1, 'Office Desk', 'P-DESK', 1, 1),
            (2, 'Power Cable', 'P-CABLE', 2, 1),
            (3, 'Desk Board', 'P-BOARD', 1, 1);
        "#,
    )?;
    Ok(())
}

/// 执行任意 SQL（测试构造异常场景）
pub fn exec_sql(db_path: &str, sql: &str) -> Result<(), Box<dyn Error>> {
    let conn = open_sqlite_connection(db_path)?;
    conn.execute_batch(sql)?;
    Ok(())
}

/// 生成 xlsx 内容（第一行为表头）
pub fn xlsx_bytes(headers: &[&str], rows: &[Vec<Cell>]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    for (r, row) in rows.iter().enumerate() {
        let excel_row = (r + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            match cell {
                Cell::Text(s) => {
                    sheet.write_string(excel_row, col as u16, *s).unwrap();
                }
                Cell::Num(n) => {
                    sheet.write_number(excel_row, col as u16, *n).unwrap();
                }
                Cell::Empty => {}
            }
        }
    }

    workbook.save_to_buffer().unwrap()
}

/// 标准两行组件文件: P-CABLE × 10, P-BOARD × 5
pub fn two_row_file() -> Vec<u8> {
    xlsx_bytes(
        &["Product", "Quantity", "UoM"],
        &[
            vec![Cell::Text("P-CABLE"), Cell::Num(10.0), Cell::Empty],
            vec![Cell::Text("P-BOARD"), Cell::Num(5.0), Cell::Text("Units")],
        ],
    )
}

/// 创建 draft 批次
pub fn insert_batch(
    db_path: &str,
    file: Vec<u8>,
    file_name: &str,
    auto_confirm: bool,
) -> Result<String, Box<dyn Error>> {
    let repo = ImportBatchRepositoryImpl::new(db_path)?;
    let batch_id = repo.insert_batch(&NewImportBatch {
        file,
        file_name: Some(file_name.to_string()),
        target_product_code: "P-DESK".to_string(),
        target_quantity: 1.0,
        auto_confirm,
    })?;
    Ok(batch_id)
}

/// 使用默认配置打开导入服务
pub fn open_importer(db_path: &str) -> ComponentImporter {
    ComponentImporter::open(db_path, ImportSettings::default()).unwrap()
}
