// ==========================================
// 餐厅外卖预订系统 - 当日需求汇总引擎
// ==========================================
// 职责: 汇总某取货日未取消订单中各餐品的已订数量
// 红线: 无状态、无副作用、无 I/O 操作
// ==========================================

use crate::domain::order::Order;
use std::collections::HashMap;

/// 当日需求汇总器
///
/// 餐品库存视为无限，按日上限依赖"已订数量"这一聚合值；
/// 已取消的订单不计入。
pub struct DailyDemandAggregator;

impl DailyDemandAggregator {
    /// 汇总订单集中各餐品的已订数量（item_id -> 合计数量）
    pub fn aggregate(orders: &[Order]) -> HashMap<String, u32> {
        let refs: Vec<&Order> = orders.iter().collect();
        Self::aggregate_refs(&refs)
    }

    /// 引用切片版本（供按日分组后的聚合使用）
    pub fn aggregate_refs(orders: &[&Order]) -> HashMap<String, u32> {
        let mut demand: HashMap<String, u32> = HashMap::new();
        for order in orders.iter().filter(|o| !o.canceled) {
            for item in &order.food_items {
                *demand.entry(item.item_id.clone()).or_insert(0) += item.quantity;
            }
        }
        demand
    }

    /// 单个餐品的已订数量
    pub fn quantity_ordered(orders: &[Order], item_id: &str) -> u32 {
        orders
            .iter()
            .filter(|o| !o.canceled)
            .flat_map(|o| o.food_items.iter())
            .filter(|item| item.item_id == item_id)
            .map(|item| item.quantity)
            .sum()
    }

    /// 从已汇总的映射中取单个餐品数量
    pub fn quantity_of(demand: &HashMap<String, u32>, item_id: &str) -> u32 {
        demand.get(item_id).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{Order, OrderedItem};
    use crate::domain::ranges::parse_date_time;

    fn order_with_food(item_id: &str, quantity: u32, canceled: bool) -> Order {
        let mut order = Order::new(
            "u-1".to_string(),
            "山田".to_string(),
            "yamada@example.com".to_string(),
            "090-1234-5678".to_string(),
            String::new(),
            parse_date_time("2022/10/01 09:00").unwrap(),
            parse_date_time("2022/10/05 12:00").unwrap(),
            Vec::new(),
            vec![OrderedItem {
                item_id: item_id.to_string(),
                name: "烧味便当".to_string(),
                price: 800,
                quantity,
            }],
        );
        order.canceled = canceled;
        order
    }

    #[test]
    fn test_aggregate_skips_canceled() {
        let orders = vec![
            order_with_food("f1", 3, false),
            order_with_food("f1", 2, true),
            order_with_food("f2", 1, false),
        ];
        let demand = DailyDemandAggregator::aggregate(&orders);
        assert_eq!(DailyDemandAggregator::quantity_of(&demand, "f1"), 3);
        assert_eq!(DailyDemandAggregator::quantity_of(&demand, "f2"), 1);
        assert_eq!(DailyDemandAggregator::quantity_of(&demand, "f3"), 0);
    }

    #[test]
    fn test_quantity_ordered_sums_across_orders() {
        let orders = vec![
            order_with_food("f1", 3, false),
            order_with_food("f1", 4, false),
        ];
        assert_eq!(DailyDemandAggregator::quantity_ordered(&orders, "f1"), 7);
    }
}
