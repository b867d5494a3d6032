// ==========================================
// 生产订单组件导入 - 导入层
// ==========================================
// 职责: 文件解码、引用解析、预检、行转换
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod error;
pub mod file_parser;
pub mod preflight;
pub mod reference_resolver;
pub mod row_converter;
pub mod value_parser;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use file_parser::{RowStream, TabularFormat, TabularReader};
pub use preflight::{collect_product_codes, PreflightValidator};
pub use reference_resolver::ReferenceResolver;
pub use row_converter::RowConverter;
