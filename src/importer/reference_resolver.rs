// ==========================================
// 生产订单组件导入 - 引用解析器
// ==========================================
// 职责: 将人工录入的文本引用（产品编码、单位名称、公司/库位/用户名称）
//       解析为实体；批量检查产品编码是否存在
// 规则:
// - 产品: 按外部编码精确匹配（区分大小写，包含停用产品）
// - 单位: 按显示名称精确匹配（包含停用单位）；空输入 → 不覆盖
// - 重复匹配按 DuplicateCodePolicy 处理
// ==========================================

use crate::config::DuplicateCodePolicy;
use crate::domain::order::{Company, Location, Product, Uom, User};
use crate::i18n::t;
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::ReferenceRepository;
use std::collections::BTreeSet;
use tracing::warn;

/// 单次查询最多取回的匹配条数（用于检测重复）
const LOOKUP_LIMIT: usize = 10;

pub struct ReferenceResolver<'a> {
    repo: &'a dyn ReferenceRepository,
    policy: DuplicateCodePolicy,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(repo: &'a dyn ReferenceRepository, policy: DuplicateCodePolicy) -> Self {
        Self { repo, policy }
    }

    /// 按外部编码解析产品
    ///
    /// # 错误
    /// - Input: 编码为空
    /// - NotFound("Product", code): 无匹配
    /// - AmbiguousReference: 多条匹配且策略为 reject
    pub fn resolve_product(&self, code: Option<&str>) -> ImportResult<Product> {
        let code = match code.map(str::trim).filter(|c| !c.is_empty()) {
            Some(code) => code,
            None => return Err(ImportError::Input(t("import.product_mandatory"))),
        };
        let matches = self.repo.find_products_by_code(code, LOOKUP_LIMIT)?;
        self.pick_unique("Product", code, matches)
    }

    /// 按显示名称解析计量单位
    ///
    /// # 返回
    /// - Ok(None): 名称为空（调用方使用产品默认单位）
    pub fn resolve_uom(&self, name: Option<&str>) -> ImportResult<Option<Uom>> {
        let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name,
            None => return Ok(None),
        };
        let matches = self.repo.find_units_by_name(name, LOOKUP_LIMIT)?;
        self.pick_unique("UoM", name, matches).map(Some)
    }

    /// 批量检查产品编码，返回数据库中不存在的编码
    pub fn check_missing_products(
        &self,
        codes: &BTreeSet<String>,
    ) -> ImportResult<BTreeSet<String>> {
        if codes.is_empty() {
            return Ok(BTreeSet::new());
        }
        Ok(self.repo.find_missing_product_codes(codes)?)
    }

    pub fn resolve_company(&self, name: &str) -> ImportResult<Company> {
        self.repo
            .find_company_by_name(name)?
            .ok_or_else(|| ImportError::not_found("Company", name))
    }

    pub fn resolve_location(&self, name: &str) -> ImportResult<Location> {
        self.repo
            .find_location_by_name(name)?
            .ok_or_else(|| ImportError::not_found("Location", name))
    }

    pub fn resolve_user(&self, name: &str) -> ImportResult<User> {
        self.repo
            .find_user_by_name(name)?
            .ok_or_else(|| ImportError::not_found("User", name))
    }

    /// 目标订单所属公司：配置了名称则按名称解析，否则取默认公司
    pub fn resolve_order_company(&self, name: Option<&str>) -> ImportResult<Company> {
        match name {
            Some(name) => self.resolve_company(name),
            None => self
                .repo
                .find_default_company()?
                .ok_or_else(|| ImportError::not_found("Company", "<default>")),
        }
    }

    fn pick_unique<T>(&self, entity: &str, reference: &str, mut matches: Vec<T>) -> ImportResult<T> {
        match matches.len() {
            0 => Err(ImportError::not_found(entity, reference)),
            1 => Ok(matches.remove(0)),
            count => match self.policy {
                DuplicateCodePolicy::Reject => Err(ImportError::AmbiguousReference {
                    entity: entity.to_string(),
                    reference: reference.to_string(),
                    count,
                }),
                DuplicateCodePolicy::FirstMatch => {
                    warn!(entity, reference, count, "引用不唯一，取第一条匹配");
                    Ok(matches.remove(0))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, init_schema};
    use crate::repository::ReferenceRepositoryImpl;
    use rusqlite::Connection;
    use std::sync::{Arc, Mutex};

    fn setup() -> ReferenceRepositoryImpl {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO res_company (company_id, name) VALUES (1, 'Acme'), (2, 'Globex');
            INSERT INTO uom (uom_id, name, active) VALUES (1, 'Unit', 1), (2, 'kg', 0);
            INSERT INTO product (product_id, name, default_code, uom_id, active) VALUES
                (1, 'Cable', 'P-CABLE', 1, 1),
                (2, 'Board', 'P-BOARD', 2, 0),
                (3, 'Screw A', 'P-SCREW', 1, 1),
                (4, 'Screw B', 'P-SCREW', 1, 1),
                (5, 'Numeric', '1001', 1, 1);
            INSERT INTO stock_location (location_id, name, company_id) VALUES (1, 'WH/Stock', 1);
            INSERT INTO res_users (user_id, name) VALUES (1, 'Mitchell Admin');
            "#,
        )
        .unwrap();
        ReferenceRepositoryImpl::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_resolve_product_exact_and_inactive() {
        let repo = setup();
        let resolver = ReferenceResolver::new(&repo, DuplicateCodePolicy::Reject);

        assert_eq!(resolver.resolve_product(Some(" P-CABLE ")).unwrap().product_id, 1);
        // 停用产品同样可解析
        assert_eq!(resolver.resolve_product(Some("P-BOARD")).unwrap().product_id, 2);
        assert_eq!(resolver.resolve_product(Some("1001")).unwrap().product_id, 5);

        let err = resolver.resolve_product(Some("p-cable")).unwrap_err();
        assert!(matches!(err, ImportError::NotFound { ref entity, .. } if entity == "Product"));

        let err = resolver.resolve_product(Some("   ")).unwrap_err();
        assert!(matches!(err, ImportError::Input(_)));
        assert!(resolver.resolve_product(None).is_err());
    }

    #[test]
    fn test_duplicate_code_policy() {
        let repo = setup();

        let strict = ReferenceResolver::new(&repo, DuplicateCodePolicy::Reject);
        let err = strict.resolve_product(Some("P-SCREW")).unwrap_err();
        assert!(matches!(err, ImportError::AmbiguousReference { count: 2, .. }));

        let lenient = ReferenceResolver::new(&repo, DuplicateCodePolicy::FirstMatch);
        assert_eq!(lenient.resolve_product(Some("P-SCREW")).unwrap().product_id, 3);
    }

    #[test]
    fn test_resolve_uom() {
        let repo = setup();
        let resolver = ReferenceResolver::new(&repo, DuplicateCodePolicy::Reject);

        assert!(resolver.resolve_uom(None).unwrap().is_none());
        assert!(resolver.resolve_uom(Some("  ")).unwrap().is_none());
        assert_eq!(resolver.resolve_uom(Some("kg")).unwrap().unwrap().uom_id, 2);

        let err = resolver.resolve_uom(Some("Dozen")).unwrap_err();
        assert_eq!(err.to_string(), "UoM not found: Dozen");
    }

    #[test]
    fn test_check_missing_products() {
        let repo = setup();
        let resolver = ReferenceResolver::new(&repo, DuplicateCodePolicy::Reject);
        let codes: BTreeSet<String> = ["P-CABLE", "BAD-SKU-1"].iter().map(|s| s.to_string()).collect();

        let missing = resolver.check_missing_products(&codes).unwrap();
        assert_eq!(missing.into_iter().collect::<Vec<_>>(), vec!["BAD-SKU-1"]);
        assert!(resolver.check_missing_products(&BTreeSet::new()).unwrap().is_empty());
    }

    #[test]
    fn test_resolve_named_references() {
        let repo = setup();
        let resolver = ReferenceResolver::new(&repo, DuplicateCodePolicy::Reject);

        assert_eq!(resolver.resolve_company("Globex").unwrap().company_id, 2);
        assert_eq!(resolver.resolve_order_company(None).unwrap().company_id, 1);
        assert_eq!(resolver.resolve_location("WH/Stock").unwrap().location_id, 1);
        assert_eq!(resolver.resolve_user("Mitchell Admin").unwrap().user_id, 1);

        let err = resolver.resolve_location("Nowhere").unwrap_err();
        assert!(matches!(err, ImportError::NotFound { ref entity, .. } if entity == "Location"));
    }
}
