// ==========================================
// 生产订单组件导入 - 生产订单 Repository Trait
// ==========================================
// 职责: 定义生产订单与组件行的数据访问接口
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::order::{NewProductionOrder, NewTargetLine, ProductionOrder, TargetLine};
use crate::repository::error::RepositoryResult;

// ==========================================
// OrderRepository Trait
// ==========================================
// 实现者: OrderRepositoryImpl（使用 rusqlite）
pub trait OrderRepository: Send + Sync {
    /// 创建生产订单
    fn create_order(&self, order: &NewProductionOrder) -> RepositoryResult<ProductionOrder>;

    /// 在单行 savepoint 内落库一条组件行
    ///
    /// # 说明
    /// - 该行的全部写入（订单 component_count 计数 + stock_move 插入）在同一 savepoint 内
    /// - 任一写入失败 → 回滚到 savepoint，不留下半行数据；之前已提交的行不受影响
    /// - 成功 → 释放 savepoint（提交本行）
    fn persist_line(&self, line: &NewTargetLine) -> RepositoryResult<TargetLine>;

    /// 确认生产订单（auto_confirm）
    fn confirm_order(&self, order_id: i64) -> RepositoryResult<()>;

    /// 按 ID 查询订单
    fn find_order(&self, order_id: i64) -> RepositoryResult<Option<ProductionOrder>>;

    /// 查询订单的全部组件行（按创建顺序）
    fn list_lines_by_order(&self, order_id: i64) -> RepositoryResult<Vec<TargetLine>>;

    /// 统计订单组件行数
    fn count_lines_by_order(&self, order_id: i64) -> RepositoryResult<usize>;

    /// 统计全部组件行数
    fn count_all_lines(&self) -> RepositoryResult<usize>;
}
