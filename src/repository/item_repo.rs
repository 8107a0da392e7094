// ==========================================
// 餐厅外卖预订系统 - 商品目录数据仓储
// ==========================================
// 职责: 管理 stock_item / food_item 表的读写
// 红线: Repository 不含业务逻辑; 库存更新必须走事务内变体
// ==========================================

use crate::domain::item::{FoodItem, ItemCommon, StockItem, StockRemain};
use crate::repository::corrupt_column;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

/// 商品目录仓储
pub struct ItemRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ItemRepository {
    /// 从共享连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn row_to_stock(row: &Row<'_>) -> rusqlite::Result<StockItem> {
        let remain: u32 = row.get(4)?;
        let max_stock: u32 = row.get(5)?;
        Ok(StockItem {
            common: ItemCommon {
                id: row.get(0)?,
                name: row.get(1)?,
                price: row.get(2)?,
                max_order: row.get(3)?,
            },
            // 越界的库存值视为行损坏，上浮为查询错误
            remain: StockRemain::new(remain, max_stock).map_err(|e| corrupt_column(4, e))?,
        })
    }

    fn row_to_food(row: &Row<'_>) -> rusqlite::Result<FoodItem> {
        let hour_ids_json: String = row.get(5)?;
        Ok(FoodItem {
            common: ItemCommon {
                id: row.get(0)?,
                name: row.get(1)?,
                price: row.get(2)?,
                max_order: row.get(3)?,
            },
            max_order_per_day: row.get(4)?,
            business_hour_ids: serde_json::from_str(&hour_ids_json)
                .map_err(|e| corrupt_column(5, e))?,
        })
    }

    // ==========================================
    // 限量库存商品
    // ==========================================

    /// 查询全部限量库存商品
    pub fn find_all_stock(&self) -> RepositoryResult<Vec<StockItem>> {
        let conn = self.get_conn()?;
        Self::find_all_stock_in(&conn)
    }

    /// 事务内查询全部限量库存商品
    pub fn find_all_stock_in(conn: &Connection) -> RepositoryResult<Vec<StockItem>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, price, max_order, remain, max_stock FROM stock_item ORDER BY name",
        )?;
        let items = stmt
            .query_map([], Self::row_to_stock)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    /// 事务内按 id 查询限量库存商品
    pub fn find_stock_in(conn: &Connection, id: &str) -> RepositoryResult<Option<StockItem>> {
        let item = conn
            .query_row(
                "SELECT id, name, price, max_order, remain, max_stock FROM stock_item WHERE id = ?1",
                params![id],
                Self::row_to_stock,
            )
            .optional()?;
        Ok(item)
    }

    /// 插入限量库存商品
    pub fn create_stock_item(&self, item: &StockItem) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO stock_item (id, name, price, max_order, remain, max_stock)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                item.common.id,
                item.common.name,
                item.common.price,
                item.common.max_order,
                item.remain.value(),
                item.remain.max(),
            ],
        )?;
        Ok(())
    }

    /// 更新库存剩余量（仓储入口，内部走事务内变体）
    pub fn update_stock_remain(&self, id: &str, remain: u32) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::update_stock_remain_in(&conn, id, remain)
    }

    /// 事务内更新库存剩余量
    ///
    /// # 返回
    /// - Err(NotFound): id 不存在
    pub fn update_stock_remain_in(conn: &Connection, id: &str, remain: u32) -> RepositoryResult<()> {
        let affected = conn.execute(
            "UPDATE stock_item SET remain = ?2 WHERE id = ?1",
            params![id, remain],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "stock_item".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    // ==========================================
    // 按日限购餐品
    // ==========================================

    /// 查询全部按日限购餐品
    pub fn find_all_food(&self) -> RepositoryResult<Vec<FoodItem>> {
        let conn = self.get_conn()?;
        Self::find_all_food_in(&conn)
    }

    /// 事务内查询全部按日限购餐品
    pub fn find_all_food_in(conn: &Connection) -> RepositoryResult<Vec<FoodItem>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT id, name, price, max_order, max_order_per_day, business_hour_ids
            FROM food_item
            ORDER BY name
            "#,
        )?;
        let items = stmt
            .query_map([], Self::row_to_food)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    /// 插入按日限购餐品
    pub fn create_food_item(&self, item: &FoodItem) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let hour_ids_json = serde_json::to_string(&item.business_hour_ids)
            .map_err(|e| RepositoryError::InternalError(e.to_string()))?;
        conn.execute(
            r#"
            INSERT INTO food_item (id, name, price, max_order, max_order_per_day, business_hour_ids)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                item.common.id,
                item.common.name,
                item.common.price,
                item.common.max_order,
                item.max_order_per_day,
                hour_ids_json,
            ],
        )?;
        Ok(())
    }
}
