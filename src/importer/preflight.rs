// ==========================================
// 生产订单组件导入 - 预检校验
// ==========================================
// 职责: 在任何写入之前，一次性检查文件中出现的全部产品编码
// 规则:
// - 收集所有行 Product 列去空白后的非空值（去重）
// - 集合为空 → Input 错误
// - 通过一次批量查询得到不存在的编码
// ==========================================

use crate::domain::row::{columns, RowRecord};
use crate::i18n::t;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::reference_resolver::ReferenceResolver;
use std::collections::BTreeSet;
use tracing::debug;

/// 收集文件中出现的产品编码
pub fn collect_product_codes(rows: &[RowRecord]) -> ImportResult<BTreeSet<String>> {
    let codes: BTreeSet<String> = rows
        .iter()
        .filter_map(|row| row.text(columns::PRODUCT))
        .collect();

    if codes.is_empty() {
        return Err(ImportError::Input(t("import.empty_product_column")));
    }
    Ok(codes)
}

pub struct PreflightValidator<'r, 'a> {
    resolver: &'r ReferenceResolver<'a>,
}

impl<'r, 'a> PreflightValidator<'r, 'a> {
    pub fn new(resolver: &'r ReferenceResolver<'a>) -> Self {
        Self { resolver }
    }

    /// 预检
    ///
    /// # 返回
    /// - Ok(空集合): 全部产品编码存在，可以继续
    /// - Ok(非空集合): 不存在的编码（有序），调用方应中止整批
    pub fn validate(&self, rows: &[RowRecord]) -> ImportResult<BTreeSet<String>> {
        let codes = collect_product_codes(rows)?;
        let missing = self.resolver.check_missing_products(&codes)?;
        debug!(
            distinct_codes = codes.len(),
            missing = missing.len(),
            "产品编码预检完成"
        );
        Ok(missing)
    }
}
