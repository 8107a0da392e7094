// ==========================================
// 餐厅外卖预订系统 - 可下单窗口解析引擎
// ==========================================
// 职责: 基于快照数据解析日期区间内的营业窗口并附加商品余量
// 红线: Engine 不拼 SQL; 快照进、结果出
// ==========================================

use crate::domain::holiday::SpecialHoliday;
use crate::domain::item::{FoodItem, StockItem};
use crate::domain::order::Order;
use crate::domain::ranges::DateRange;
use crate::domain::special_hour::SpecialBusinessHour;
use crate::domain::business_hour::WeeklySchedule;
use crate::engine::availability_core::{AvailabilityCore, WindowSlot};
use crate::engine::daily_demand::DailyDemandAggregator;
use crate::repository::{
    BusinessHourRepository, HolidayRepository, ItemRepository, RepositoryResult,
    SpecialHourRepository,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// ScheduleSnapshot - 排期快照
// ==========================================

/// 排期快照
///
/// 营业时段/替换/休业期/商品目录的一次性读取结果。
/// 这些数据读多写少，按请求缓存即可（与最近一次管理端
/// 修改保持最终一致）。
#[derive(Debug, Clone)]
pub struct ScheduleSnapshot {
    pub schedule: WeeklySchedule,
    pub special_hours: Vec<SpecialBusinessHour>,
    pub holidays: Vec<SpecialHoliday>,
    pub stock_items: Vec<StockItem>,
    pub food_items: Vec<FoodItem>,
}

impl ScheduleSnapshot {
    /// 在同一连接（或事务）内加载完整快照
    pub fn load_in(conn: &Connection) -> RepositoryResult<Self> {
        Ok(Self {
            schedule: BusinessHourRepository::fetch_in(conn)?,
            special_hours: SpecialHourRepository::find_all_in(conn)?,
            holidays: HolidayRepository::find_all_in(conn)?,
            stock_items: ItemRepository::find_all_stock_in(conn)?,
            food_items: ItemRepository::find_all_food_in(conn)?,
        })
    }
}

// ==========================================
// 解析结果类型
// ==========================================

/// 窗口内单个商品的可购信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemAvailability {
    pub item_id: String,
    pub name: String,
    pub price: u32,
    /// 展示余量: 限量商品为库存值; 餐品为当日剩余可订量（下限 0）
    pub remain: u32,
    /// 单笔订单上限
    pub max_order: u32,
}

/// 附加了商品信息的营业窗口
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessWindow {
    pub business_hour_id: String,
    pub name: String,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub hour_offset: u32,
    pub items: Vec<ItemAvailability>,
}

/// 单个日历日的解析结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub windows: Vec<BusinessWindow>,
}

// ==========================================
// AvailabilityResolver - 窗口解析引擎
// ==========================================

/// 窗口解析引擎
pub struct AvailabilityResolver {
    snapshot: ScheduleSnapshot,
    order_offset_minutes: i64,
    round_unit_minutes: i64,
}

impl AvailabilityResolver {
    pub fn new(snapshot: ScheduleSnapshot, order_offset_minutes: i64, round_unit_minutes: i64) -> Self {
        Self {
            snapshot,
            order_offset_minutes,
            round_unit_minutes,
        }
    }

    pub fn snapshot(&self) -> &ScheduleSnapshot {
        &self.snapshot
    }

    /// 解析日期区间内每一天的可下单窗口
    ///
    /// # 参数
    /// - range: 日期区间（两端含）
    /// - now: 当前时刻（"today" 裁剪基准）
    /// - demand_by_date: 各取货日已订餐品数量（item_id -> 数量）
    ///
    /// # 返回
    /// 区间内每个日期各一条记录，windows 可能为空
    pub fn resolve(
        &self,
        range: DateRange,
        now: NaiveDateTime,
        demand_by_date: &HashMap<NaiveDate, HashMap<String, u32>>,
    ) -> Vec<DayAvailability> {
        let cutoff = AvailabilityCore::round_up_cutoff(
            now,
            self.order_offset_minutes,
            self.round_unit_minutes,
        );
        let today = now.date();

        range
            .iter_dates()
            .into_iter()
            .map(|date| {
                let slots = AvailabilityCore::resolve_slots_for_date(
                    date,
                    self.snapshot.schedule.hours(),
                    &self.snapshot.special_hours,
                    &self.snapshot.holidays,
                );
                let slots = AvailabilityCore::adjust_today(slots, today, cutoff);
                let demand = demand_by_date.get(&date);
                let windows = slots
                    .into_iter()
                    .map(|slot| self.attach_items(slot, demand))
                    .collect();
                DayAvailability { date, windows }
            })
            .collect()
    }

    /// 取货时刻是否落在当前可下单的窗口内（两端含）
    pub fn is_orderable(&self, pickup_at: NaiveDateTime, now: NaiveDateTime) -> bool {
        let cutoff = AvailabilityCore::round_up_cutoff(
            now,
            self.order_offset_minutes,
            self.round_unit_minutes,
        );
        let slots = AvailabilityCore::resolve_slots_for_date(
            pickup_at.date(),
            self.snapshot.schedule.hours(),
            &self.snapshot.special_hours,
            &self.snapshot.holidays,
        );
        let slots = AvailabilityCore::adjust_today(slots, now.date(), cutoff);
        let t = pickup_at.time();
        slots.iter().any(|s| s.start <= t && t <= s.end)
    }

    /// 为窗口附加可购商品
    ///
    /// # 规则
    /// - 限量库存商品: 任意窗口均可购，余量取库存计数器当前值
    /// - 餐品: 仅出现在绑定的班次窗口，余量为
    ///   max_order_per_day - 当日已订量（下限 0，上限 max_order_per_day）
    fn attach_items(
        &self,
        slot: WindowSlot,
        demand: Option<&HashMap<String, u32>>,
    ) -> BusinessWindow {
        let mut items = Vec::new();

        for item in &self.snapshot.stock_items {
            items.push(ItemAvailability {
                item_id: item.common.id.clone(),
                name: item.common.name.clone(),
                price: item.common.price,
                remain: item.remain.value(),
                max_order: item.common.max_order,
            });
        }

        for item in &self.snapshot.food_items {
            if !item.sold_in(&slot.business_hour_id) {
                continue;
            }
            let already = demand
                .map(|d| DailyDemandAggregator::quantity_of(d, &item.common.id))
                .unwrap_or(0);
            let remain = item
                .max_order_per_day
                .saturating_sub(already)
                .min(item.max_order_per_day);
            items.push(ItemAvailability {
                item_id: item.common.id.clone(),
                name: item.common.name.clone(),
                price: item.common.price,
                remain,
                max_order: item.common.max_order,
            });
        }

        BusinessWindow {
            business_hour_id: slot.business_hour_id,
            name: slot.name,
            start: slot.start,
            end: slot.end,
            hour_offset: slot.hour_offset,
            items,
        }
    }
}

/// 把同一取货日的订单汇总成 demand_by_date 形态
pub fn demand_by_date(orders: &[Order]) -> HashMap<NaiveDate, HashMap<String, u32>> {
    let mut by_date: HashMap<NaiveDate, Vec<&Order>> = HashMap::new();
    for order in orders {
        by_date.entry(order.pickup_at.date()).or_default().push(order);
    }
    by_date
        .into_iter()
        .map(|(date, orders)| (date, DailyDemandAggregator::aggregate_refs(&orders)))
        .collect()
}
