// ==========================================
// 餐厅外卖预订系统 - 事务执行器
// ==========================================
// 职责: 提供 transact(fn) 原子执行单元
// 红线: 预订判定与库存读改写必须在同一事务内完成
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard};

/// 事务执行器
///
/// 持有与各仓储共享的同一把连接。`transact` 在互斥锁内开启
/// SQLite 事务并执行闭包：互斥锁把整个 check-then-act 预订
/// 单元串行化，事务保证其中的读改写要么全部提交、要么全部
/// 回滚。闭包入参是 `&Connection`，配合各仓储的 `*_in`
/// 关联函数在已持有的事务内执行查询。
#[derive(Clone)]
pub struct Datastore {
    conn: Arc<Mutex<Connection>>,
}

impl Datastore {
    /// 打开数据库文件并创建执行器
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有共享连接创建执行器
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 共享连接句柄（供各仓储 from_connection 使用）
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 原子执行一个工作单元
    ///
    /// # 语义
    /// - 闭包返回 Ok -> 提交
    /// - 闭包返回 Err 或提交失败 -> 回滚（Transaction Drop 即回滚）
    ///
    /// # 返回
    /// - 闭包的结果；事务本身的失败以 `E: From<RepositoryError>` 上抛
    pub fn transact<T, E, F>(&self, f: F) -> Result<T, E>
    where
        E: From<RepositoryError>,
        F: FnOnce(&Connection) -> Result<T, E>,
    {
        let conn = self.get_conn().map_err(E::from)?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| E::from(RepositoryError::DatabaseTransactionError(e.to_string())))?;

        let out = f(&tx)?;

        tx.commit()
            .map_err(|e| E::from(RepositoryError::DatabaseTransactionError(e.to_string())))?;
        Ok(out)
    }
}
