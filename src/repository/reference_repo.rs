// ==========================================
// 生产订单组件导入 - 主数据引用 Repository Trait
// ==========================================
// 职责: 定义主数据查询接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据查询
// ==========================================

use crate::domain::order::{Company, Location, Product, Uom, User, WarehouseRouting};
use crate::repository::error::RepositoryResult;
use std::collections::BTreeSet;

// ==========================================
// ReferenceRepository Trait
// ==========================================
// 用途: 将人工录入的文本引用解析为实体
// 实现者: ReferenceRepositoryImpl（使用 rusqlite）
pub trait ReferenceRepository: Send + Sync {
    /// 按外部编码精确查找产品（区分大小写，包含停用产品）
    ///
    /// # 参数
    /// - code: 产品外部编码
    /// - limit: 最多返回条数（调用方用 2 检测重复编码）
    ///
    /// # 返回
    /// - Ok(Vec<Product>): 按 product_id 升序
    fn find_products_by_code(&self, code: &str, limit: usize) -> RepositoryResult<Vec<Product>>;

    /// 批量检查产品编码是否存在（一次查询）
    ///
    /// # 参数
    /// - codes: 待检查的编码集合
    ///
    /// # 返回
    /// - Ok(BTreeSet<String>): 数据库中不存在的编码（恰好是 codes 的子集）
    fn find_missing_product_codes(
        &self,
        codes: &BTreeSet<String>,
    ) -> RepositoryResult<BTreeSet<String>>;

    /// 按显示名称精确查找计量单位（包含停用单位）
    fn find_units_by_name(&self, name: &str, limit: usize) -> RepositoryResult<Vec<Uom>>;

    /// 按名称查找公司
    fn find_company_by_name(&self, name: &str) -> RepositoryResult<Option<Company>>;

    /// 按名称查找库位
    fn find_location_by_name(&self, name: &str) -> RepositoryResult<Option<Location>>;

    /// 按名称查找用户
    fn find_user_by_name(&self, name: &str) -> RepositoryResult<Option<User>>;

    /// 查找公司的生产路线（仓库 + 默认组件源/目的库位）
    ///
    /// # 返回
    /// - Ok(None): 公司没有启用的生产路线
    fn find_warehouse_routing(&self, company_id: i64)
        -> RepositoryResult<Option<WarehouseRouting>>;

    /// 默认公司（ID 最小者）
    fn find_default_company(&self) -> RepositoryResult<Option<Company>>;
}
