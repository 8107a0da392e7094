// ==========================================
// 餐厅外卖预订系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免"部分模块外键开启/部分不开启"
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 表结构在代码内幂等建立（表集合很小，不走外部迁移脚本）
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 幂等建立全部表结构
///
/// 日期/时刻统一以边界文本格式存储（YYYY/MM/DD、HH:MM、
/// YYYY/MM/DD HH:MM），该格式定宽且字典序与时间序一致，
/// 取货日期过滤可直接做字符串比较。
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS business_hour (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            start_time  TEXT NOT NULL,
            end_time    TEXT NOT NULL,
            weekdays    TEXT NOT NULL,      -- JSON 数组 (0=周日..6=周六)
            hour_offset INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS special_business_hour (
            id               TEXT PRIMARY KEY,
            name             TEXT NOT NULL,
            date             TEXT NOT NULL,
            start_time       TEXT NOT NULL,
            end_time         TEXT NOT NULL,
            business_hour_id TEXT NOT NULL REFERENCES business_hour(id)
        );

        CREATE TABLE IF NOT EXISTS special_holiday (
            id         TEXT PRIMARY KEY,
            name       TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS stock_item (
            id        TEXT PRIMARY KEY,
            name      TEXT NOT NULL,
            price     INTEGER NOT NULL,
            max_order INTEGER NOT NULL,
            remain    INTEGER NOT NULL,
            max_stock INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS food_item (
            id                TEXT PRIMARY KEY,
            name              TEXT NOT NULL,
            price             INTEGER NOT NULL,
            max_order         INTEGER NOT NULL,
            max_order_per_day INTEGER NOT NULL,
            business_hour_ids TEXT NOT NULL   -- JSON 数组
        );

        CREATE TABLE IF NOT EXISTS order_info (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL,
            user_name   TEXT NOT NULL,
            user_email  TEXT NOT NULL,
            user_tel_no TEXT NOT NULL,
            memo        TEXT NOT NULL,
            ordered_at  TEXT NOT NULL,
            pickup_at   TEXT NOT NULL,
            canceled    INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_order_info_user ON order_info (user_id, canceled);
        CREATE INDEX IF NOT EXISTS idx_order_info_pickup ON order_info (pickup_at);

        CREATE TABLE IF NOT EXISTS ordered_item (
            order_id  TEXT NOT NULL REFERENCES order_info(id),
            item_id   TEXT NOT NULL,
            item_kind TEXT NOT NULL,      -- 'stock' | 'food'
            name      TEXT NOT NULL,
            price     INTEGER NOT NULL,
            quantity  INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_ordered_item_order ON ordered_item (order_id);

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key      TEXT NOT NULL,
            value    TEXT NOT NULL,
            PRIMARY KEY (scope_id, key)
        );
        "#,
    )
}
