// ==========================================
// 生产订单组件导入 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入流程所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ==========================================
// ConfigError
// ==========================================
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("锁获取失败: {0}")]
    LockError(String),

    #[error("配置读取失败: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("配置值非法: {key} = {value} ({message})")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// ==========================================
// DuplicateCodePolicy - 重复引用处理策略
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateCodePolicy {
    /// 重复编码视为主数据完整性错误
    #[default]
    Reject,
    /// 取 ID 最小者并记录警告
    FirstMatch,
}

impl DuplicateCodePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicateCodePolicy::Reject => "reject",
            DuplicateCodePolicy::FirstMatch => "first_match",
        }
    }
}

impl fmt::Display for DuplicateCodePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DuplicateCodePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(DuplicateCodePolicy::Reject),
            "first_match" => Ok(DuplicateCodePolicy::FirstMatch),
            other => Err(format!("未知的重复编码策略: {}", other)),
        }
    }
}

// ==========================================
// ImportSettings - 单次导入使用的配置快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSettings {
    pub progress_flush_every: u64,
    pub duplicate_code_policy: DuplicateCodePolicy,
    pub allowed_extensions: Vec<String>, // 小写，不含点
    pub company_name: Option<String>,    // 目标订单所属公司（None → 默认公司）
    pub locale: String,
}

pub const DEFAULT_PROGRESS_FLUSH_EVERY: u64 = 10;
pub const DEFAULT_ALLOWED_EXTENSIONS: [&str; 4] = ["xlsx", "xls", "xlsm", "csv"];
pub const DEFAULT_LOCALE: &str = "en";

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            progress_flush_every: DEFAULT_PROGRESS_FLUSH_EVERY,
            duplicate_code_policy: DuplicateCodePolicy::default(),
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            company_name: None,
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 进度落库间隔（行数）
    ///
    /// # 默认值
    /// - 10
    async fn get_progress_flush_every(&self) -> ConfigResult<u64>;

    /// 重复产品编码 / 单位名称的处理策略
    ///
    /// # 默认值
    /// - reject
    async fn get_duplicate_code_policy(&self) -> ConfigResult<DuplicateCodePolicy>;

    /// 允许上传的文件扩展名
    ///
    /// # 默认值
    /// - xlsx, xls, xlsm, csv
    async fn get_allowed_extensions(&self) -> ConfigResult<Vec<String>>;

    /// 目标订单所属公司名称
    async fn get_company_name(&self) -> ConfigResult<Option<String>>;

    /// 日志消息语言
    ///
    /// # 默认值
    /// - en
    async fn get_locale(&self) -> ConfigResult<String>;

    /// 读取完整配置快照
    async fn load_settings(&self) -> ConfigResult<ImportSettings> {
        Ok(ImportSettings {
            progress_flush_every: self.get_progress_flush_every().await?,
            duplicate_code_policy: self.get_duplicate_code_policy().await?,
            allowed_extensions: self.get_allowed_extensions().await?,
            company_name: self.get_company_name().await?,
            locale: self.get_locale().await?,
        })
    }
}
