// ==========================================
// 生产订单组件导入 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod import_batch_repo;
pub mod import_batch_repo_impl;
pub mod order_repo;
pub mod order_repo_impl;
pub mod reference_repo;
pub mod reference_repo_impl;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use import_batch_repo::{BatchUpdate, ImportBatchRepository};
pub use import_batch_repo_impl::ImportBatchRepositoryImpl;
pub use order_repo::OrderRepository;
pub use order_repo_impl::OrderRepositoryImpl;
pub use reference_repo::ReferenceRepository;
pub use reference_repo_impl::ReferenceRepositoryImpl;
