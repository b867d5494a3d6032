// ==========================================
// 生产订单组件导入 - 行转换
// ==========================================
// 职责: 单行 → NewTargetLine（纯转换，不写库）
// 失败原因以 ImportError 返回；落库与回滚由调用方负责
// ==========================================

use crate::domain::order::{NewTargetLine, ProductionOrder};
use crate::domain::row::{columns, RowRecord};
use crate::importer::error::ImportResult;
use crate::importer::reference_resolver::ReferenceResolver;
use crate::importer::value_parser::{parse_date, parse_priority, parse_quantity};

pub struct RowConverter<'r, 'a> {
    resolver: &'r ReferenceResolver<'a>,
}

impl<'r, 'a> RowConverter<'r, 'a> {
    pub fn new(resolver: &'r ReferenceResolver<'a>) -> Self {
        Self { resolver }
    }

    /// 将一行转换为目标订单的组件行
    ///
    /// # 规则
    /// - Product 必填，按外部编码解析
    /// - Quantity 必须严格为正
    /// - UoM 为空时使用产品默认单位
    /// - Company / Source Location / Destination Location 非空时覆盖订单默认值
    pub fn convert(&self, row: &RowRecord, order: &ProductionOrder) -> ImportResult<NewTargetLine> {
        let product = self
            .resolver
            .resolve_product(row.text(columns::PRODUCT).as_deref())?;
        let quantity = parse_quantity(row.get(columns::QUANTITY))?;
        let uom_id = self
            .resolver
            .resolve_uom(row.text(columns::UOM).as_deref())?
            .map(|uom| uom.uom_id)
            .unwrap_or(product.uom_id);

        let company_id = match row.text(columns::COMPANY) {
            Some(name) => self.resolver.resolve_company(&name)?.company_id,
            None => order.company_id,
        };
        let location_src_id = match row.text(columns::SOURCE_LOCATION) {
            Some(name) => self.resolver.resolve_location(&name)?.location_id,
            None => order.location_src_id,
        };
        let location_dest_id = match row.text(columns::DESTINATION_LOCATION) {
            Some(name) => self.resolver.resolve_location(&name)?.location_id,
            None => order.location_dest_id,
        };
        let responsible_id = row
            .text(columns::RESPONSIBLE)
            .map(|name| self.resolver.resolve_user(&name).map(|u| u.user_id))
            .transpose()?;

        Ok(NewTargetLine {
            order_id: order.order_id,
            name: product.name,
            product_id: product.product_id,
            quantity,
            uom_id,
            location_src_id,
            location_dest_id,
            company_id,
            warehouse_id: order.warehouse_id,
            origin: row.text(columns::REFERENCE),
            date_planned: parse_date(row.get(columns::PLANNED_START))?,
            responsible_id,
            priority: parse_priority(row.get(columns::PRIORITY))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DuplicateCodePolicy;
    use crate::db::{configure_sqlite_connection, init_schema};
    use crate::domain::row::CellValue;
    use crate::domain::types::OrderState;
    use crate::importer::error::ImportError;
    use crate::repository::ReferenceRepositoryImpl;
    use chrono::{NaiveDate, Utc};
    use rusqlite::Connection;
    use std::sync::{Arc, Mutex};

    fn setup() -> ReferenceRepositoryImpl {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO res_company (company_id, name) VALUES (1, 'Acme'), (2, 'Globex');
            INSERT INTO uom (uom_id, name) VALUES (1, 'Unit'), (2, 'm');
            INSERT INTO product (product_id, name, default_code, uom_id) VALUES (1, 'Cable', 'P-CABLE', 2);
            INSERT INTO stock_location (location_id, name) VALUES (1, 'WH/Stock'), (2, 'WH/Production'), (3, 'WH/Spare');
            INSERT INTO res_users (user_id, name) VALUES (7, 'Planner');
            "#,
        )
        .unwrap();
        ReferenceRepositoryImpl::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn order() -> ProductionOrder {
        ProductionOrder {
            order_id: 42,
            product_id: 1,
            product_qty: 1.0,
            uom_id: 1,
            company_id: 1,
            warehouse_id: 1,
            location_src_id: 1,
            location_dest_id: 2,
            state: OrderState::Draft,
            component_count: 0,
            origin: None,
            created_at: Utc::now(),
        }
    }

    fn row(cells: &[(&str, CellValue)]) -> RowRecord {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_minimal_row_uses_order_defaults() {
        let repo = setup();
        let resolver = ReferenceResolver::new(&repo, DuplicateCodePolicy::Reject);
        let converter = RowConverter::new(&resolver);

        let line = converter
            .convert(
                &row(&[
                    (columns::PRODUCT, text("P-CABLE")),
                    (columns::QUANTITY, CellValue::Number(10.0)),
                ]),
                &order(),
            )
            .unwrap();

        assert_eq!(line.order_id, 42);
        assert_eq!(line.name, "Cable");
        assert_eq!(line.quantity, 10.0);
        // UoM 为空 → 产品默认单位
        assert_eq!(line.uom_id, 2);
        assert_eq!((line.location_src_id, line.location_dest_id), (1, 2));
        assert_eq!(line.company_id, 1);
        assert_eq!(line.date_planned, None);
        assert_eq!(line.responsible_id, None);
    }

    #[test]
    fn test_optional_columns_override() {
        let repo = setup();
        let resolver = ReferenceResolver::new(&repo, DuplicateCodePolicy::Reject);
        let converter = RowConverter::new(&resolver);

        let line = converter
            .convert(
                &row(&[
                    (columns::PRODUCT, text("P-CABLE")),
                    (columns::QUANTITY, text("2,5")),
                    (columns::UOM, text("Unit")),
                    (columns::COMPANY, text("Globex")),
                    (columns::SOURCE_LOCATION, text("WH/Spare")),
                    (columns::RESPONSIBLE, text("Planner")),
                    (columns::REFERENCE, text("REF-001")),
                    (columns::PLANNED_START, text("2024-06-15")),
                    (columns::PRIORITY, text("1")),
                ]),
                &order(),
            )
            .unwrap();

        assert_eq!(line.quantity, 2.5);
        assert_eq!(line.uom_id, 1);
        assert_eq!(line.company_id, 2);
        assert_eq!(line.location_src_id, 3);
        assert_eq!(line.location_dest_id, 2);
        assert_eq!(line.responsible_id, Some(7));
        assert_eq!(line.origin.as_deref(), Some("REF-001"));
        assert_eq!(
            line.date_planned,
            NaiveDate::from_ymd_opt(2024, 6, 15).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(line.priority, Some(1));
    }

    #[test]
    fn test_row_errors() {
        let repo = setup();
        let resolver = ReferenceResolver::new(&repo, DuplicateCodePolicy::Reject);
        let converter = RowConverter::new(&resolver);

        let zero = converter
            .convert(
                &row(&[(columns::PRODUCT, text("P-CABLE")), (columns::QUANTITY, text("0"))]),
                &order(),
            )
            .unwrap_err();
        assert_eq!(zero.to_string(), "Quantity must be strictly positive.");

        let bad_uom = converter
            .convert(
                &row(&[
                    (columns::PRODUCT, text("P-CABLE")),
                    (columns::QUANTITY, text("1")),
                    (columns::UOM, text("Dozen")),
                ]),
                &order(),
            )
            .unwrap_err();
        assert!(matches!(bad_uom, ImportError::NotFound { .. }));

        let bad_user = converter
            .convert(
                &row(&[
                    (columns::PRODUCT, text("P-CABLE")),
                    (columns::QUANTITY, text("1")),
                    (columns::RESPONSIBLE, text("Nobody")),
                ]),
                &order(),
            )
            .unwrap_err();
        assert_eq!(bad_user.to_string(), "User not found: Nobody");
    }
}
