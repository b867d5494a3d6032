// ==========================================
// 生产订单组件导入 - 配置管理器
// ==========================================
// 职责: 导入配置的加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::{
    ConfigError, ConfigResult, DuplicateCodePolicy, ImportConfigReader,
    DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_LOCALE, DEFAULT_PROGRESS_FLUSH_EVERY,
};
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> ConfigResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global 配置（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 获取所有 global 配置（按键排序）
    pub fn get_config_snapshot(&self) -> ConfigResult<BTreeMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut snapshot = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }

    /// 读取非空配置值（空白视为未配置）
    fn get_trimmed(&self, key: &str) -> ConfigResult<Option<String>> {
        Ok(self
            .get_global_config_value(key)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }

    fn invalid(key: &str, value: &str, message: impl Into<String>) -> ConfigError {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_progress_flush_every(&self) -> ConfigResult<u64> {
        let key = config_keys::PROGRESS_FLUSH_EVERY;
        match self.get_trimmed(key)? {
            None => Ok(DEFAULT_PROGRESS_FLUSH_EVERY),
            Some(raw) => match raw.parse::<u64>() {
                Ok(every) if every > 0 => Ok(every),
                Ok(_) => Err(Self::invalid(key, &raw, "必须大于 0")),
                Err(e) => Err(Self::invalid(key, &raw, e.to_string())),
            },
        }
    }

    async fn get_duplicate_code_policy(&self) -> ConfigResult<DuplicateCodePolicy> {
        let key = config_keys::DUPLICATE_CODE_POLICY;
        match self.get_trimmed(key)? {
            None => Ok(DuplicateCodePolicy::default()),
            Some(raw) => raw
                .parse::<DuplicateCodePolicy>()
                .map_err(|message| Self::invalid(key, &raw, message)),
        }
    }

    async fn get_allowed_extensions(&self) -> ConfigResult<Vec<String>> {
        let key = config_keys::ALLOWED_EXTENSIONS;
        let raw = match self.get_trimmed(key)? {
            None => {
                return Ok(DEFAULT_ALLOWED_EXTENSIONS
                    .iter()
                    .map(|e| e.to_string())
                    .collect())
            }
            Some(raw) => raw,
        };

        // 逗号分隔，如 "xlsx,csv"
        let extensions: Vec<String> = raw
            .split(',')
            .map(|e| e.trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        if extensions.is_empty() {
            return Err(Self::invalid(key, &raw, "扩展名列表为空"));
        }
        Ok(extensions)
    }

    async fn get_company_name(&self) -> ConfigResult<Option<String>> {
        self.get_trimmed(config_keys::COMPANY_NAME)
    }

    async fn get_locale(&self) -> ConfigResult<String> {
        Ok(self
            .get_trimmed(config_keys::LOCALE)?
            .unwrap_or_else(|| DEFAULT_LOCALE.to_string()))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    pub const PROGRESS_FLUSH_EVERY: &str = "import.progress_flush_every";
    pub const DUPLICATE_CODE_POLICY: &str = "import.duplicate_code_policy";
    pub const ALLOWED_EXTENSIONS: &str = "import.allowed_extensions"; // 逗号分隔
    pub const COMPANY_NAME: &str = "import.company_name";
    pub const LOCALE: &str = "import.locale";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::import_config_trait::ImportSettings;
    use crate::db::{configure_sqlite_connection, init_schema};

    fn setup() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[tokio::test]
    async fn test_defaults_when_keys_absent() {
        let config = setup();
        let settings = config.load_settings().await.unwrap();
        assert_eq!(settings, ImportSettings::default());
    }

    #[tokio::test]
    async fn test_overrides_are_read() {
        let config = setup();
        config
            .set_global_config_value(config_keys::PROGRESS_FLUSH_EVERY, "25")
            .unwrap();
        config
            .set_global_config_value(config_keys::DUPLICATE_CODE_POLICY, "first_match")
            .unwrap();
        config
            .set_global_config_value(config_keys::ALLOWED_EXTENSIONS, ".XLSX, csv")
            .unwrap();
        config
            .set_global_config_value(config_keys::COMPANY_NAME, "  Acme Manufacturing ")
            .unwrap();

        let settings = config.load_settings().await.unwrap();
        assert_eq!(settings.progress_flush_every, 25);
        assert_eq!(settings.duplicate_code_policy, DuplicateCodePolicy::FirstMatch);
        assert_eq!(settings.allowed_extensions, vec!["xlsx", "csv"]);
        assert_eq!(settings.company_name.as_deref(), Some("Acme Manufacturing"));
        assert_eq!(config.get_config_snapshot().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_malformed_values_are_errors() {
        let config = setup();
        config
            .set_global_config_value(config_keys::PROGRESS_FLUSH_EVERY, "0")
            .unwrap();
        assert!(matches!(
            config.get_progress_flush_every().await,
            Err(ConfigError::InvalidValue { .. })
        ));

        config
            .set_global_config_value(config_keys::DUPLICATE_CODE_POLICY, "newest")
            .unwrap();
        assert!(config.get_duplicate_code_policy().await.is_err());
    }
}
