// ==========================================
// 餐厅外卖预订系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

/// 配置键全集
pub mod config_keys {
    /// 下单提前量（分钟），当日截止时刻 = round_up(now + 提前量)
    pub const ORDER_OFFSET_MINUTES: &str = "order_offset_minutes";
    /// 截止时刻取整单位（分钟）
    pub const ROUND_UNIT_MINUTES: &str = "round_unit_minutes";
}

/// 下单提前量默认值（分钟）
pub const DEFAULT_ORDER_OFFSET_MINUTES: i64 = 180;

/// 取整单位默认值（分钟）
pub const DEFAULT_ROUND_UNIT_MINUTES: i64 = 30;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有共享连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }
        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
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

    /// 写入配置值（scope_id='global'，存在则覆盖）
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
            ON CONFLICT(scope_id, key) DO UPDATE SET value = excluded.value
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    fn get_i64_or(&self, key: &str, default: i64) -> RepositoryResult<i64> {
        match self.get_config_value(key)? {
            Some(raw) => raw.parse::<i64>().map_err(|_| RepositoryError::FieldValueError {
                field: key.to_string(),
                message: format!("不是合法整数: {}", raw),
            }),
            None => Ok(default),
        }
    }

    /// 下单提前量（分钟），缺省 180
    pub fn order_offset_minutes(&self) -> RepositoryResult<i64> {
        self.get_i64_or(config_keys::ORDER_OFFSET_MINUTES, DEFAULT_ORDER_OFFSET_MINUTES)
    }

    /// 截止时刻取整单位（分钟），缺省 30
    pub fn round_unit_minutes(&self) -> RepositoryResult<i64> {
        self.get_i64_or(config_keys::ROUND_UNIT_MINUTES, DEFAULT_ROUND_UNIT_MINUTES)
    }
}
