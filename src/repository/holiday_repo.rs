// ==========================================
// 餐厅外卖预订系统 - 特别休业期数据仓储
// ==========================================
// 职责: 管理 special_holiday 表的 CRUD 操作
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::holiday::SpecialHoliday;
use crate::domain::ranges::{format_date, parse_date, DateRange};
use crate::repository::corrupt_column;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

/// 特别休业期仓储
pub struct HolidayRepository {
    conn: Arc<Mutex<Connection>>,
}

impl HolidayRepository {
    /// 从共享连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn row_to_holiday(row: &Row<'_>) -> rusqlite::Result<SpecialHoliday> {
        let start: String = row.get(2)?;
        let end: String = row.get(3)?;
        Ok(SpecialHoliday {
            id: row.get(0)?,
            name: row.get(1)?,
            date_range: DateRange {
                start: parse_date(&start).map_err(|e| corrupt_column(2, e))?,
                end: parse_date(&end).map_err(|e| corrupt_column(3, e))?,
            },
        })
    }

    /// 按 id 查询
    pub fn find(&self, id: &str) -> RepositoryResult<Option<SpecialHoliday>> {
        let conn = self.get_conn()?;
        let holiday = conn
            .query_row(
                "SELECT id, name, start_date, end_date FROM special_holiday WHERE id = ?1",
                params![id],
                Self::row_to_holiday,
            )
            .optional()?;
        Ok(holiday)
    }

    /// 查询全部（按开始日期排序）
    pub fn find_all(&self) -> RepositoryResult<Vec<SpecialHoliday>> {
        let conn = self.get_conn()?;
        Self::find_all_in(&conn)
    }

    /// 事务内查询全部
    pub fn find_all_in(conn: &Connection) -> RepositoryResult<Vec<SpecialHoliday>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, start_date, end_date FROM special_holiday ORDER BY start_date",
        )?;
        let holidays = stmt
            .query_map([], Self::row_to_holiday)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(holidays)
    }

    /// 插入
    pub fn create(&self, holiday: &SpecialHoliday) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO special_holiday (id, name, start_date, end_date)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                holiday.id,
                holiday.name,
                format_date(holiday.date_range.start),
                format_date(holiday.date_range.end),
            ],
        )?;
        Ok(())
    }

    /// 更新
    ///
    /// # 返回
    /// - Err(NotFound): id 不存在
    pub fn update(&self, holiday: &SpecialHoliday) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE special_holiday
            SET name = ?2, start_date = ?3, end_date = ?4
            WHERE id = ?1
            "#,
            params![
                holiday.id,
                holiday.name,
                format_date(holiday.date_range.start),
                format_date(holiday.date_range.end),
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "special_holiday".to_string(),
                id: holiday.id.clone(),
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
        let affected = conn.execute("DELETE FROM special_holiday WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "special_holiday".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
