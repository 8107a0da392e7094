// ==========================================
// 餐厅外卖预订系统 - 订单数据仓储
// ==========================================
// 职责: 管理 order_info / ordered_item 表的读写
// 红线: Repository 不含业务逻辑; 订单与明细在同一事务内落库
// ==========================================

use crate::domain::order::{Order, OrderedItem};
use crate::domain::ranges::{format_date, format_date_time, parse_date_time};
use crate::repository::corrupt_column;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const ORDER_COLUMNS: &str =
    "id, user_id, user_name, user_email, user_tel_no, memo, ordered_at, pickup_at, canceled";

/// 明细类别标识
const KIND_STOCK: &str = "stock";
const KIND_FOOD: &str = "food";

/// 订单仓储
pub struct OrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OrderRepository {
    /// 从共享连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn row_to_order(row: &Row<'_>) -> rusqlite::Result<Order> {
        let ordered_at: String = row.get(6)?;
        let pickup_at: String = row.get(7)?;
        let canceled: i64 = row.get(8)?;
        Ok(Order {
            id: row.get(0)?,
            user_id: row.get(1)?,
            user_name: row.get(2)?,
            user_email: row.get(3)?,
            user_tel_no: row.get(4)?,
            memo: row.get(5)?,
            // 无法解析的时间文本视为行损坏，上浮为查询错误
            ordered_at: parse_date_time(&ordered_at).map_err(|e| corrupt_column(6, e))?,
            pickup_at: parse_date_time(&pickup_at).map_err(|e| corrupt_column(7, e))?,
            stock_items: Vec::new(),
            food_items: Vec::new(),
            canceled: canceled != 0,
        })
    }

    /// 补齐订单明细
    fn load_items(conn: &Connection, order: &mut Order) -> RepositoryResult<()> {
        let mut stmt = conn.prepare(
            r#"
            SELECT item_id, item_kind, name, price, quantity
            FROM ordered_item
            WHERE order_id = ?1
            ORDER BY rowid
            "#,
        )?;
        let rows = stmt
            .query_map(params![order.id], |row| {
                let kind: String = row.get(1)?;
                Ok((
                    kind,
                    OrderedItem {
                        item_id: row.get(0)?,
                        name: row.get(2)?,
                        price: row.get(3)?,
                        quantity: row.get(4)?,
                    },
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        for (kind, item) in rows {
            if kind == KIND_FOOD {
                order.food_items.push(item);
            } else {
                order.stock_items.push(item);
            }
        }
        Ok(())
    }

    /// 按 id 查询
    pub fn find(&self, id: &str) -> RepositoryResult<Option<Order>> {
        let conn = self.get_conn()?;
        Self::find_in(&conn, id)
    }

    /// 事务内按 id 查询
    pub fn find_in(conn: &Connection, id: &str) -> RepositoryResult<Option<Order>> {
        let sql = format!("SELECT {} FROM order_info WHERE id = ?1", ORDER_COLUMNS);
        let order = conn
            .query_row(&sql, params![id], Self::row_to_order)
            .optional()?;
        match order {
            Some(mut order) => {
                Self::load_items(conn, &mut order)?;
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }

    /// 按取货日期查询（含已取消订单，由调用方按需过滤）
    pub fn find_by_pickup_date(&self, date: NaiveDate) -> RepositoryResult<Vec<Order>> {
        let conn = self.get_conn()?;
        Self::find_by_pickup_date_in(&conn, date)
    }

    /// 事务内按取货日期查询
    pub fn find_by_pickup_date_in(conn: &Connection, date: NaiveDate) -> RepositoryResult<Vec<Order>> {
        let sql = format!(
            "SELECT {} FROM order_info WHERE substr(pickup_at, 1, 10) = ?1 ORDER BY pickup_at",
            ORDER_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut orders = stmt
            .query_map(params![format_date(date)], Self::row_to_order)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        for order in &mut orders {
            Self::load_items(conn, order)?;
        }
        Ok(orders)
    }

    /// 按取货日期区间查询（两端含）
    pub fn find_by_pickup_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<Order>> {
        let conn = self.get_conn()?;
        Self::find_by_pickup_date_range_in(&conn, start, end)
    }

    /// 事务内按取货日期区间查询
    pub fn find_by_pickup_date_range_in(
        conn: &Connection,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<Order>> {
        // 定宽日期文本，字典序即时间序
        let sql = format!(
            r#"SELECT {} FROM order_info
               WHERE substr(pickup_at, 1, 10) BETWEEN ?1 AND ?2
               ORDER BY pickup_at"#,
            ORDER_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut orders = stmt
            .query_map(
                params![format_date(start), format_date(end)],
                Self::row_to_order,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        for order in &mut orders {
            Self::load_items(conn, order)?;
        }
        Ok(orders)
    }

    /// 查询用户的未取消订单
    pub fn find_active_by_user(&self, user_id: &str) -> RepositoryResult<Vec<Order>> {
        let conn = self.get_conn()?;
        Self::find_active_by_user_in(&conn, user_id)
    }

    /// 事务内查询用户的未取消订单
    pub fn find_active_by_user_in(conn: &Connection, user_id: &str) -> RepositoryResult<Vec<Order>> {
        let sql = format!(
            "SELECT {} FROM order_info WHERE user_id = ?1 AND canceled = 0 ORDER BY ordered_at",
            ORDER_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut orders = stmt
            .query_map(params![user_id], Self::row_to_order)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        for order in &mut orders {
            Self::load_items(conn, order)?;
        }
        Ok(orders)
    }

    /// 事务内插入订单与全部明细
    pub fn insert_in(conn: &Connection, order: &Order) -> RepositoryResult<()> {
        conn.execute(
            &format!(
                r#"INSERT INTO order_info ({})
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"#,
                ORDER_COLUMNS
            ),
            params![
                order.id,
                order.user_id,
                order.user_name,
                order.user_email,
                order.user_tel_no,
                order.memo,
                format_date_time(order.ordered_at),
                format_date_time(order.pickup_at),
                if order.canceled { 1 } else { 0 },
            ],
        )?;

        let mut stmt = conn.prepare(
            r#"
            INSERT INTO ordered_item (order_id, item_id, item_kind, name, price, quantity)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )?;
        for item in &order.stock_items {
            stmt.execute(params![
                order.id,
                item.item_id,
                KIND_STOCK,
                item.name,
                item.price,
                item.quantity,
            ])?;
        }
        for item in &order.food_items {
            stmt.execute(params![
                order.id,
                item.item_id,
                KIND_FOOD,
                item.name,
                item.price,
                item.quantity,
            ])?;
        }
        Ok(())
    }

    /// 事务内更新取消状态
    ///
    /// # 返回
    /// - Err(NotFound): id 不存在
    pub fn update_status_in(conn: &Connection, id: &str, canceled: bool) -> RepositoryResult<()> {
        let affected = conn.execute(
            "UPDATE order_info SET canceled = ?2 WHERE id = ?1",
            params![id, if canceled { 1 } else { 0 }],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "order_info".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
