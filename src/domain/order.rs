// ==========================================
// 餐厅外卖预订系统 - 订单领域模型
// ==========================================
// 职责: 订单实体与下单时的商品快照明细
// 红线: 明细是值快照，目录改价不回溯影响已成订单
// ==========================================

use crate::domain::error::{DomainError, DomainResult};
use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;

/// 用户名最大长度（字符数）
pub const MAX_USER_NAME_LEN: usize = 10;

/// 备注最大长度（字符数）
pub const MAX_MEMO_LEN: usize = 500;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)+$")
            .expect("email 正则非法")
    })
}

fn tel_no_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^0\d{1,4}-?\d{1,4}-?\d{3,4}$").expect("电话正则非法")
    })
}

// ==========================================
// OrderedItem - 订单明细快照
// ==========================================

/// 订单明细（下单时刻的商品快照）
///
/// 只保存 id/名称/单价/数量的值拷贝，不引用活动目录商品。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedItem {
    pub item_id: String,
    pub name: String,
    pub price: u32,
    pub quantity: u32,
}

impl OrderedItem {
    /// 明细小计
    pub fn subtotal(&self) -> u32 {
        self.price * self.quantity
    }
}

// ==========================================
// Order - 订单
// ==========================================

/// 订单
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub user_tel_no: String,
    /// 自由备注（可为空）
    pub memo: String,
    /// 下单时刻（创建时固定，不可变）
    pub ordered_at: NaiveDateTime,
    /// 取货时刻
    pub pickup_at: NaiveDateTime,
    /// 限量库存商品明细
    pub stock_items: Vec<OrderedItem>,
    /// 按日限购餐品明细
    pub food_items: Vec<OrderedItem>,
    /// 取消标记（单向置位）
    pub canceled: bool,
}

impl Order {
    /// 装配订单（由 OrderFactory 调用，字段已各自校验）
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: String,
        user_name: String,
        user_email: String,
        user_tel_no: String,
        memo: String,
        ordered_at: NaiveDateTime,
        pickup_at: NaiveDateTime,
        stock_items: Vec<OrderedItem>,
        food_items: Vec<OrderedItem>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            user_name,
            user_email,
            user_tel_no,
            memo,
            ordered_at,
            pickup_at,
            stock_items,
            food_items,
            canceled: false,
        }
    }

    /// 置取消标记
    ///
    /// # 返回
    /// - Err(Validation): 订单已取消（防止库存二次回补）
    pub fn cancel(&mut self) -> DomainResult<()> {
        if self.canceled {
            return Err(DomainError::validation(format!(
                "订单已经取消: id={}",
                self.id
            )));
        }
        self.canceled = true;
        Ok(())
    }

    /// 订单合计金额
    pub fn total_price(&self) -> u32 {
        self.stock_items
            .iter()
            .chain(self.food_items.iter())
            .map(|item| item.subtotal())
            .sum()
    }
}

// ==========================================
// 标量字段校验
// ==========================================

/// 校验用户 id（非空）
pub fn validate_user_id(user_id: &str) -> DomainResult<()> {
    if user_id.is_empty() {
        return Err(DomainError::validation("用户 id 不能为空".to_string()));
    }
    Ok(())
}

/// 校验用户名（1-10 字符）
pub fn validate_user_name(user_name: &str) -> DomainResult<()> {
    if user_name.is_empty() || user_name.chars().count() > MAX_USER_NAME_LEN {
        return Err(DomainError::validation(format!(
            "用户名长度非法 (1-{} 字符): {}",
            MAX_USER_NAME_LEN, user_name
        )));
    }
    Ok(())
}

/// 校验邮箱格式
pub fn validate_email(email: &str) -> DomainResult<()> {
    if !email_pattern().is_match(email) {
        return Err(DomainError::validation(format!("邮箱格式错误: {}", email)));
    }
    Ok(())
}

/// 校验电话号码格式
pub fn validate_tel_no(tel_no: &str) -> DomainResult<()> {
    if !tel_no_pattern().is_match(tel_no) {
        return Err(DomainError::validation(format!(
            "电话号码格式错误: {}",
            tel_no
        )));
    }
    Ok(())
}

/// 校验备注（可空，最长 500 字符）
pub fn validate_memo(memo: &str) -> DomainResult<()> {
    if memo.chars().count() > MAX_MEMO_LEN {
        return Err(DomainError::validation(format!(
            "备注超长 (最多 {} 字符)",
            MAX_MEMO_LEN
        )));
    }
    Ok(())
}
