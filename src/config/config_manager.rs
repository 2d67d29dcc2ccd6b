// ==========================================
// 配件目录管理系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 校验限值（加载时解析，校验引擎拿到的是已落定的值）
///
/// max_year 在加载时按当前日历年算死，校验过程不再读时钟。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationLimits {
    pub max_text_length: usize, // 文本字段长度上限
    pub min_year: i32,          // 年份下界
    pub max_year: i32,          // 年份上界（当前年 + 偏移）
}

impl Default for ValidationLimits {
    fn default() -> Self {
        use chrono::Datelike;
        Self {
            max_text_length: defaults::MAX_TEXT_LENGTH,
            min_year: defaults::MIN_YEAR,
            max_year: chrono::Utc::now().year() + defaults::MAX_YEAR_OFFSET,
        }
    }
}

/// 配置键常量
pub mod config_keys {
    pub const MAX_TEXT_LENGTH: &str = "validation.max_text_length";
    pub const MIN_YEAR: &str = "validation.min_year";
    pub const MAX_YEAR_OFFSET: &str = "validation.max_year_offset";
}

/// 配置默认值
pub mod defaults {
    pub const MAX_TEXT_LENGTH: usize = 50;
    pub const MIN_YEAR: i32 = 1900;
    /// 年份上界相对当前日历年的偏移（下一年度车型提前发布）
    pub const MAX_YEAR_OFFSET: i32 = 2;
}

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
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global scope 配置值（upsert）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 加载校验限值（缺失或不可解析的键回落默认值）
    pub fn load_validation_limits(&self) -> Result<ValidationLimits, Box<dyn Error>> {
        use chrono::Datelike;

        let max_text_length = self
            .get_config_value(config_keys::MAX_TEXT_LENGTH)?
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults::MAX_TEXT_LENGTH);
        let min_year = self
            .get_config_value(config_keys::MIN_YEAR)?
            .and_then(|v| v.parse::<i32>().ok())
            .unwrap_or(defaults::MIN_YEAR);
        let max_year_offset = self
            .get_config_value(config_keys::MAX_YEAR_OFFSET)?
            .and_then(|v| v.parse::<i32>().ok())
            .unwrap_or(defaults::MAX_YEAR_OFFSET);

        Ok(ValidationLimits {
            max_text_length,
            min_year,
            max_year: chrono::Utc::now().year() + max_year_offset,
        })
    }
}
