// ==========================================
// 餐厅外卖预订系统 - 营业时段数据仓储
// ==========================================
// 职责: 管理 business_hour 表的读写与首用种子
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::business_hour::{BusinessHour, WeeklySchedule};
use crate::domain::ranges::{format_time, parse_time, TimeRange};
use crate::repository::corrupt_column;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex, MutexGuard};

/// 营业时段仓储
pub struct BusinessHourRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BusinessHourRepository {
    /// 从共享连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn row_to_hour(row: &Row<'_>) -> rusqlite::Result<BusinessHour> {
        let start: String = row.get(2)?;
        let end: String = row.get(3)?;
        let weekdays_json: String = row.get(4)?;
        Ok(BusinessHour {
            id: row.get(0)?,
            name: row.get(1)?,
            time_range: TimeRange {
                start: parse_time(&start).map_err(|e| corrupt_column(2, e))?,
                end: parse_time(&end).map_err(|e| corrupt_column(3, e))?,
            },
            weekdays: serde_json::from_str(&weekdays_json).map_err(|e| corrupt_column(4, e))?,
            hour_offset: row.get(5)?,
        })
    }

    /// 读取整份每周营业时段（按开始时刻排序）
    pub fn fetch(&self) -> RepositoryResult<WeeklySchedule> {
        let conn = self.get_conn()?;
        Self::fetch_in(&conn)
    }

    /// 事务内读取（供 transact 闭包使用）
    pub fn fetch_in(conn: &Connection) -> RepositoryResult<WeeklySchedule> {
        let mut stmt = conn.prepare(
            r#"
            SELECT id, name, start_time, end_time, weekdays, hour_offset
            FROM business_hour
            ORDER BY start_time
            "#,
        )?;
        let hours = stmt
            .query_map([], Self::row_to_hour)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(WeeklySchedule::from_rows(hours))
    }

    /// 首次使用时写入默认班次（早市/午市/晚市）
    ///
    /// # 返回
    /// - Ok(true): 本次写入了种子数据
    /// - Ok(false): 表已有数据，未写入
    pub fn ensure_seeded(&self) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM business_hour", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(false);
        }
        let schedule = WeeklySchedule::default_schedule();
        for hour in schedule.hours() {
            Self::insert_in(&conn, hour)?;
        }
        tracing::info!("已写入默认营业时段种子数据: {} 个班次", schedule.hours().len());
        Ok(true)
    }

    /// 插入单个班次
    pub fn insert_in(conn: &Connection, hour: &BusinessHour) -> RepositoryResult<()> {
        let weekdays_json = serde_json::to_string(&hour.weekdays)
            .map_err(|e| RepositoryError::InternalError(e.to_string()))?;
        conn.execute(
            r#"
            INSERT INTO business_hour (id, name, start_time, end_time, weekdays, hour_offset)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                hour.id,
                hour.name,
                format_time(hour.time_range.start),
                format_time(hour.time_range.end),
                weekdays_json,
                hour.hour_offset,
            ],
        )?;
        Ok(())
    }

    /// 更新单个班次
    ///
    /// # 返回
    /// - Err(NotFound): id 不存在
    pub fn update(&self, hour: &BusinessHour) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let weekdays_json = serde_json::to_string(&hour.weekdays)
            .map_err(|e| RepositoryError::InternalError(e.to_string()))?;
        let affected = conn.execute(
            r#"
            UPDATE business_hour
            SET name = ?2, start_time = ?3, end_time = ?4, weekdays = ?5, hour_offset = ?6
            WHERE id = ?1
            "#,
            params![
                hour.id,
                hour.name,
                format_time(hour.time_range.start),
                format_time(hour.time_range.end),
                weekdays_json,
                hour.hour_offset,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "business_hour".to_string(),
                id: hour.id.clone(),
            });
        }
        Ok(())
    }
}
