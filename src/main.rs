// ==========================================
// 餐厅外卖预订系统 - 主入口
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 外卖可用性与预订引擎
// ==========================================

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Local};
use takeout_booking::config::ConfigManager;
use takeout_booking::domain::ranges::{format_date, DateRange};
use takeout_booking::engine::{BookingRepositories, LoggingNotifier, OrderUseCase};
use takeout_booking::repository::Datastore;
use takeout_booking::{db, logging, AvailabilityApi, OrderApi};

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 TAKEOUT_BOOKING_DB_PATH 指定的路径（优先）
/// - 否则: 用户数据目录/takeout-booking/takeout_booking.db
fn get_default_db_path() -> String {
    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("TAKEOUT_BOOKING_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    // 使用用户数据目录, 先给一个默认回退值
    let mut path = PathBuf::from("./takeout_booking.db");
    if let Some(data_dir) = dirs::data_dir() {
        path = data_dir.join("takeout-booking").join("takeout_booking.db");
    }
    path.to_string_lossy().to_string()
}

fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("餐厅外卖预订系统 - 可用性与预订引擎");
    tracing::info!("系统版本: {}", takeout_booking::VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径
    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    if let Some(parent) = PathBuf::from(&db_path).parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("无法创建数据目录: {}", parent.display()))?;
    }

    // 初始化数据库与服务
    let datastore = Datastore::new(&db_path).context("无法打开数据库")?;
    {
        let conn = datastore.connection();
        let guard = conn.lock().map_err(|_| anyhow::anyhow!("数据库锁获取失败"))?;
        db::init_schema(&guard).context("数据库初始化失败")?;
    }

    let repos = BookingRepositories::from_datastore(&datastore);
    repos.business_hour_repo.ensure_seeded()?;

    let config = Arc::new(ConfigManager::from_connection(datastore.connection())?);
    let use_case = Arc::new(OrderUseCase::new(
        datastore.clone(),
        repos.clone(),
        config.clone(),
        Arc::new(LoggingNotifier),
    ));

    let availability_api = AvailabilityApi::new(datastore.clone(), repos.clone(), config.clone());
    let _order_api = OrderApi::new(use_case);

    // 启动自检: 解析今起一周的可下单窗口
    let today = Local::now().date_naive();
    let range = DateRange::new(today, today + Duration::days(6))
        .map_err(|e| anyhow::anyhow!("日期区间非法: {}", e))?;
    let days = availability_api
        .resolve_availability(&format_date(range.start), &format_date(range.end))
        .map_err(|e| anyhow::anyhow!("可下单窗口解析失败: {}", e))?;
    for day in &days {
        tracing::info!(
            date = %format_date(day.date),
            windows = day.windows.len(),
            "可下单窗口"
        );
    }

    tracing::info!("服务初始化完成, 数据库就绪");
    Ok(())
}
