// ==========================================
// 餐厅外卖预订系统 - 商品领域模型
// ==========================================
// 职责: 目录商品（限量库存商品/按日限购餐品）与库存计数器
// 红线: 库存计数器永远落在 [0, max] 区间内
// ==========================================

use crate::domain::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};

/// 库存上限的系统绝对上界
pub const ABSOLUTE_MAX_STOCK: u32 = 999;

// ==========================================
// ItemCommon - 商品共通属性
// ==========================================

/// 商品共通属性（组合进各具体商品类型，不做基类继承）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCommon {
    pub id: String,
    pub name: String,
    /// 单价（日元/分等最小货币单位）
    pub price: u32,
    /// 单笔订单的最大购买数量
    pub max_order: u32,
}

// ==========================================
// Trait: OrderableItem
// ==========================================

/// 可下单商品的能力接口
pub trait OrderableItem {
    fn item_id(&self) -> &str;

    fn item_name(&self) -> &str;

    fn price(&self) -> u32;

    /// 数量是否不超过单笔订单上限
    fn within_max_order(&self, quantity: u32) -> bool;
}

// ==========================================
// StockRemain - 库存计数器
// ==========================================

/// 库存计数器
///
/// 有界非负整数，新商品从 0 起步，只能通过
/// `consume` / `increase` 变更，且永不越过 [0, max]。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRemain {
    value: u32,
    max: u32,
}

impl StockRemain {
    /// 创建库存计数器
    ///
    /// # 返回
    /// - Err(Validation): max 超过系统上界 999，或 value 超过 max
    pub fn new(value: u32, max: u32) -> DomainResult<Self> {
        if max > ABSOLUTE_MAX_STOCK {
            return Err(DomainError::validation(format!(
                "库存上限超过系统上界 ({}): {}",
                ABSOLUTE_MAX_STOCK, max
            )));
        }
        if value > max {
            return Err(DomainError::validation(format!(
                "库存值超过上限: value={}, max={}",
                value, max
            )));
        }
        Ok(Self { value, max })
    }

    /// 新商品的初始库存（0）
    pub fn initial(max: u32) -> DomainResult<Self> {
        Self::new(0, max)
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// 消耗库存
    ///
    /// # 返回
    /// - Err(Validation): n 超过当前剩余（“库存不足”）
    pub fn consume(&mut self, n: u32) -> DomainResult<()> {
        if n > self.value {
            return Err(DomainError::validation(format!(
                "库存不足: remaining={}, requested={}",
                self.value, n
            )));
        }
        self.value -= n;
        Ok(())
    }

    /// 回补库存
    ///
    /// # 返回
    /// - Err(Validation): 回补后超过上限
    pub fn increase(&mut self, n: u32) -> DomainResult<()> {
        let next = self.value.saturating_add(n);
        if next > self.max {
            return Err(DomainError::validation(format!(
                "库存超过上限: value={}, increase={}, max={}",
                self.value, n, self.max
            )));
        }
        self.value = next;
        Ok(())
    }
}

// ==========================================
// StockItem - 限量库存商品
// ==========================================

/// 限量库存商品
///
/// 人工补货的有限库存，任意营业窗口均可购买。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItem {
    pub common: ItemCommon,
    pub remain: StockRemain,
}

impl OrderableItem for StockItem {
    fn item_id(&self) -> &str {
        &self.common.id
    }

    fn item_name(&self) -> &str {
        &self.common.name
    }

    fn price(&self) -> u32 {
        self.common.price
    }

    fn within_max_order(&self, quantity: u32) -> bool {
        quantity > 0 && quantity <= self.common.max_order
    }
}

// ==========================================
// FoodItem - 按日限购餐品
// ==========================================

/// 按日限购餐品
///
/// 库存视为无限，但每个日历日存在合计下单上限
/// `max_order_per_day`；仅在绑定的班次窗口内出售。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodItem {
    pub common: ItemCommon,
    /// 单日合计下单上限
    pub max_order_per_day: u32,
    /// 出售该餐品的班次 id 列表
    pub business_hour_ids: Vec<String>,
}

impl FoodItem {
    /// 该餐品在指定班次是否出售
    pub fn sold_in(&self, business_hour_id: &str) -> bool {
        self.business_hour_ids
            .iter()
            .any(|id| id == business_hour_id)
    }
}

impl OrderableItem for FoodItem {
    fn item_id(&self) -> &str {
        &self.common.id
    }

    fn item_name(&self) -> &str {
        &self.common.name
    }

    fn price(&self) -> u32 {
        self.common.price
    }

    fn within_max_order(&self, quantity: u32) -> bool {
        quantity > 0 && quantity <= self.common.max_order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_remain_bounds() {
        assert!(StockRemain::new(0, 1000).is_err());
        assert!(StockRemain::new(10, 5).is_err());
        let remain = StockRemain::initial(999).unwrap();
        assert_eq!(remain.value(), 0);
    }

    #[test]
    fn test_consume_then_increase_round_trip() {
        let mut remain = StockRemain::new(5, 10).unwrap();
        remain.consume(3).unwrap();
        assert_eq!(remain.value(), 2);
        remain.increase(3).unwrap();
        assert_eq!(remain.value(), 5);
    }

    #[test]
    fn test_consume_insufficient() {
        let mut remain = StockRemain::new(1, 10).unwrap();
        assert!(remain.consume(2).is_err());
        // 失败不改变值
        assert_eq!(remain.value(), 1);
        remain.consume(1).unwrap();
        assert!(remain.consume(1).is_err());
    }

    #[test]
    fn test_increase_over_max() {
        let mut remain = StockRemain::new(9, 10).unwrap();
        assert!(remain.increase(2).is_err());
        assert_eq!(remain.value(), 9);
        remain.increase(1).unwrap();
        assert_eq!(remain.value(), 10);
    }

    #[test]
    fn test_within_max_order() {
        let item = StockItem {
            common: ItemCommon {
                id: "s1".to_string(),
                name: "布丁".to_string(),
                price: 400,
                max_order: 3,
            },
            remain: StockRemain::new(5, 10).unwrap(),
        };
        assert!(item.within_max_order(3));
        assert!(!item.within_max_order(4));
        assert!(!item.within_max_order(0));
    }

    #[test]
    fn test_food_item_sold_in() {
        let food = FoodItem {
            common: ItemCommon {
                id: "f1".to_string(),
                name: "烧味便当".to_string(),
                price: 800,
                max_order: 5,
            },
            max_order_per_day: 20,
            business_hour_ids: vec!["bh-lunch".to_string()],
        };
        assert!(food.sold_in("bh-lunch"));
        assert!(!food.sold_in("bh-dinner"));
    }
}
