// ==========================================
// 生产订单组件导入 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 作用域规则:
// - Format: 致命，任何处理之前中止
// - Input / NotFound / AmbiguousReference: 预检/批次准备阶段 → 中止整批；
//   行处理阶段 → 只中止该行（记入日志，不向上传播）
// ==========================================

use crate::i18n::t_with_args;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    /// 文件无法解码为表格，或没有表头行
    #[error("{0}")]
    Format(String),

    // ===== 输入数据错误 =====
    /// 单元格值错误 / 行数为零 / 必填列为空 / 状态不允许
    #[error("{0}")]
    Input(String),

    // ===== 引用解析错误 =====
    #[error("{entity} not found: {reference}")]
    NotFound { entity: String, reference: String },

    /// 同一引用匹配到多条记录（主数据完整性问题）
    #[error("{entity} reference is not unique: {reference} matches {count} records")]
    AmbiguousReference {
        entity: String,
        reference: String,
        count: usize,
    },

    // ===== 数据库错误 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    pub fn not_found(entity: &str, reference: impl Into<String>) -> Self {
        ImportError::NotFound {
            entity: entity.to_string(),
            reference: reference.into(),
        }
    }

    /// 错误类别（日志字段）
    pub fn kind(&self) -> &'static str {
        match self {
            ImportError::Format(_) => "format",
            ImportError::Input(_) => "input",
            ImportError::NotFound { .. } => "not_found",
            ImportError::AmbiguousReference { .. } => "ambiguous_reference",
            ImportError::Repository(_) => "repository",
            ImportError::Other(_) => "other",
        }
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::Format(t_with_args(
            "import.unreadable_file",
            &[("error", &err.to_string())],
        ))
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::Format(t_with_args(
            "import.unreadable_file",
            &[("error", &err.to_string())],
        ))
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
