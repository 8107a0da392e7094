// ==========================================
// 餐厅外卖预订系统 - 订单装配引擎
// ==========================================
// 职责: 校验原始下单请求并装配未落库的候选订单
// 红线: 单笔上限在此校验; 库存/日上限由预订事务裁决
// ==========================================

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::item::{FoodItem, OrderableItem, StockItem};
use crate::domain::order::{
    validate_email, validate_memo, validate_tel_no, validate_user_id, validate_user_name, Order,
    OrderedItem,
};
use crate::domain::ranges::parse_date_time;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 单个商品的下单请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRequest {
    pub item_id: String,
    pub quantity: u32,
}

/// 下单请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub user_tel_no: String,
    #[serde(default)]
    pub memo: String,
    /// 取货时刻（YYYY/MM/DD HH:MM）
    pub pickup_at: String,
    #[serde(default)]
    pub stock_requests: Vec<ItemRequest>,
    #[serde(default)]
    pub food_requests: Vec<ItemRequest>,
}

// ==========================================
// OrderFactory - 订单装配
// ==========================================

/// 订单装配引擎
///
/// 产出"已校验、未落库、未扣库存"的候选订单。
/// 明细保存下单时刻的商品名/单价快照，目录后续改价
/// 不回溯影响已成订单。
pub struct OrderFactory;

impl OrderFactory {
    /// 装配候选订单
    ///
    /// # 规则
    /// 1. 标量字段校验（用户 id/用户名/邮箱/电话/备注）
    /// 2. 取货时刻解析失败 -> Validation
    /// 3. 每个请求商品必须存在于目录且数量不超过单笔上限
    /// 4. 两类明细不得同时为空
    pub fn create(
        req: &CreateOrderRequest,
        stock_catalog: &[StockItem],
        food_catalog: &[FoodItem],
        now: NaiveDateTime,
    ) -> DomainResult<Order> {
        validate_user_id(&req.user_id)?;
        validate_user_name(&req.user_name)?;
        validate_email(&req.user_email)?;
        validate_tel_no(&req.user_tel_no)?;
        validate_memo(&req.memo)?;

        let pickup_at = parse_date_time(&req.pickup_at)?;

        let stock_items = Self::snapshot_lines(&req.stock_requests, stock_catalog)?;
        let food_items = Self::snapshot_lines(&req.food_requests, food_catalog)?;

        if stock_items.is_empty() && food_items.is_empty() {
            return Err(DomainError::validation(
                "订单必须至少包含一件商品".to_string(),
            ));
        }

        Ok(Order::new(
            req.user_id.clone(),
            req.user_name.clone(),
            req.user_email.clone(),
            req.user_tel_no.clone(),
            req.memo.clone(),
            now,
            pickup_at,
            stock_items,
            food_items,
        ))
    }

    /// 对照目录校验请求并生成明细快照
    fn snapshot_lines<T: OrderableItem>(
        requests: &[ItemRequest],
        catalog: &[T],
    ) -> DomainResult<Vec<OrderedItem>> {
        let mut lines = Vec::with_capacity(requests.len());
        for req in requests {
            let item = catalog
                .iter()
                .find(|item| item.item_id() == req.item_id)
                .ok_or_else(|| {
                    DomainError::validation(format!("商品不存在: id={}", req.item_id))
                })?;
            if !item.within_max_order(req.quantity) {
                return Err(DomainError::validation(format!(
                    "数量超过单笔上限: item={}, quantity={}",
                    item.item_name(),
                    req.quantity
                )));
            }
            lines.push(OrderedItem {
                item_id: item.item_id().to_string(),
                name: item.item_name().to_string(),
                price: item.price(),
                quantity: req.quantity,
            });
        }
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::item::{FoodItem, ItemCommon, StockItem, StockRemain};
    use crate::domain::ranges::parse_date_time;

    fn stock_catalog() -> Vec<StockItem> {
        vec![StockItem {
            common: ItemCommon {
                id: "s1".to_string(),
                name: "布丁".to_string(),
                price: 400,
                max_order: 3,
            },
            remain: StockRemain::new(5, 10).unwrap(),
        }]
    }

    fn food_catalog() -> Vec<FoodItem> {
        vec![FoodItem {
            common: ItemCommon {
                id: "f1".to_string(),
                name: "烧味便当".to_string(),
                price: 800,
                max_order: 5,
            },
            max_order_per_day: 20,
            business_hour_ids: vec!["bh-lunch".to_string()],
        }]
    }

    fn base_request() -> CreateOrderRequest {
        CreateOrderRequest {
            user_id: "u-1".to_string(),
            user_name: "山田".to_string(),
            user_email: "yamada@example.com".to_string(),
            user_tel_no: "090-1234-5678".to_string(),
            memo: String::new(),
            pickup_at: "2022/10/05 12:00".to_string(),
            stock_requests: vec![ItemRequest {
                item_id: "s1".to_string(),
                quantity: 2,
            }],
            food_requests: vec![ItemRequest {
                item_id: "f1".to_string(),
                quantity: 1,
            }],
        }
    }

    fn now() -> chrono::NaiveDateTime {
        parse_date_time("2022/10/01 09:00").unwrap()
    }

    #[test]
    fn test_create_snapshots_catalog_values() {
        let order =
            OrderFactory::create(&base_request(), &stock_catalog(), &food_catalog(), now()).unwrap();
        assert_eq!(order.stock_items.len(), 1);
        assert_eq!(order.stock_items[0].name, "布丁");
        assert_eq!(order.stock_items[0].price, 400);
        assert_eq!(order.food_items[0].quantity, 1);
        assert_eq!(order.total_price(), 1600);
        assert!(!order.canceled);
    }

    #[test]
    fn test_unknown_item_rejected() {
        let mut req = base_request();
        req.stock_requests[0].item_id = "missing".to_string();
        let err = OrderFactory::create(&req, &stock_catalog(), &food_catalog(), now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn test_over_max_order_rejected() {
        let mut req = base_request();
        req.stock_requests[0].quantity = 4; // max_order=3
        assert!(OrderFactory::create(&req, &stock_catalog(), &food_catalog(), now()).is_err());
    }

    #[test]
    fn test_empty_lines_rejected() {
        let mut req = base_request();
        req.stock_requests.clear();
        req.food_requests.clear();
        assert!(OrderFactory::create(&req, &stock_catalog(), &food_catalog(), now()).is_err());
    }

    #[test]
    fn test_bad_pickup_format_rejected() {
        let mut req = base_request();
        req.pickup_at = "2022-10-05T12:00".to_string();
        assert!(OrderFactory::create(&req, &stock_catalog(), &food_catalog(), now()).is_err());
    }

    #[test]
    fn test_bad_email_rejected() {
        let mut req = base_request();
        req.user_email = "nope".to_string();
        assert!(OrderFactory::create(&req, &stock_catalog(), &food_catalog(), now()).is_err());
    }
}
