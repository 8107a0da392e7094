// ==========================================
// 餐厅外卖预订系统 - 特别营业时段数据仓储
// ==========================================
// 职责: 管理 special_business_hour 表的 CRUD 操作
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::ranges::{format_date, format_time, parse_date, parse_time, TimeRange};
use crate::domain::special_hour::SpecialBusinessHour;
use crate::repository::corrupt_column;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const SELECT_COLUMNS: &str = "id, name, date, start_time, end_time, business_hour_id";

/// 特别营业时段仓储
pub struct SpecialHourRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SpecialHourRepository {
    /// 从共享连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn row_to_hour(row: &Row<'_>) -> rusqlite::Result<SpecialBusinessHour> {
        let date: String = row.get(2)?;
        let start: String = row.get(3)?;
        let end: String = row.get(4)?;
        Ok(SpecialBusinessHour {
            id: row.get(0)?,
            name: row.get(1)?,
            date: parse_date(&date).map_err(|e| corrupt_column(2, e))?,
            time_range: TimeRange {
                start: parse_time(&start).map_err(|e| corrupt_column(3, e))?,
                end: parse_time(&end).map_err(|e| corrupt_column(4, e))?,
            },
            business_hour_id: row.get(5)?,
        })
    }

    /// 按 id 查询
    pub fn find(&self, id: &str) -> RepositoryResult<Option<SpecialBusinessHour>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM special_business_hour WHERE id = ?1",
            SELECT_COLUMNS
        );
        let hour = conn
            .query_row(&sql, params![id], Self::row_to_hour)
            .optional()?;
        Ok(hour)
    }

    /// 查询全部（按日期、开始时刻排序）
    pub fn find_all(&self) -> RepositoryResult<Vec<SpecialBusinessHour>> {
        let conn = self.get_conn()?;
        Self::find_all_in(&conn)
    }

    /// 事务内查询全部
    pub fn find_all_in(conn: &Connection) -> RepositoryResult<Vec<SpecialBusinessHour>> {
        let sql = format!(
            "SELECT {} FROM special_business_hour ORDER BY date, start_time",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let hours = stmt
            .query_map([], Self::row_to_hour)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(hours)
    }

    /// 插入
    pub fn create(&self, hour: &SpecialBusinessHour) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO special_business_hour
                (id, name, date, start_time, end_time, business_hour_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                hour.id,
                hour.name,
                format_date(hour.date),
                format_time(hour.time_range.start),
                format_time(hour.time_range.end),
                hour.business_hour_id,
            ],
        )?;
        Ok(())
    }

    /// 更新
    ///
    /// # 返回
    /// - Err(NotFound): id 不存在
    pub fn update(&self, hour: &SpecialBusinessHour) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE special_business_hour
            SET name = ?2, date = ?3, start_time = ?4, end_time = ?5, business_hour_id = ?6
            WHERE id = ?1
            "#,
            params![
                hour.id,
                hour.name,
                format_date(hour.date),
                format_time(hour.time_range.start),
                format_time(hour.time_range.end),
                hour.business_hour_id,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "special_business_hour".to_string(),
                id: hour.id.clone(),
            });
        }
        Ok(())
    }

    /// 删除
    ///
    /// # 返回
    /// - Err(NotFound): id 不存在
    pub fn delete(&self, id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM special_business_hour WHERE id = ?1",
            params![id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "special_business_hour".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
