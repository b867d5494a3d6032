// ==========================================
// 生产订单组件导入引擎 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + calamine
// 系统定位: 表格行批量导入（预检 → 逐行隔离 → 进度上报 → 汇总日志）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 表格解析 / 引用解析 / 预检
pub mod importer;

// 引擎层 - 逐行处理 / 进度 / 汇总 / 批次生命周期
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 异步门面
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{BatchState, ImportStatus, OrderState};

// 领域实体
pub use domain::{
    CellValue, ImportBatch, NewTargetLine, ProductionOrder, Progress, ProgressSnapshot,
    RowRecord, TargetLine,
};

// 引擎
pub use engine::{ComponentImporter, ImportOutcome, ImportSummary};

// 导入层
pub use importer::{ImportError, ImportResult};

// API
pub use api::{ApiError, ImportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "MRP Component Import";
