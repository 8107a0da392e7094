// ==========================================
// 预订流程集成测试
// ==========================================
// 测试目标: 下单 → 扣库存 → 取消回补 的完整事务流程
// ==========================================


use chrono::NaiveDateTime;
use takeout_booking::domain::error::DomainError;
use takeout_booking::domain::ranges::{parse_date, parse_date_time};
use takeout_booking::engine::BookingError;
use takeout_booking::logging;
use test_helpers::*;

/// 固定的"当前时刻": 2025/06/04 周三 10:00
fn now() -> NaiveDateTime {
    parse_date_time("2025/06/04 10:00").unwrap()
}

fn remain_of(ctx: &TestContext, item_id: &str) -> u32 {
    ctx.repos
        .item_repo
        .find_all_stock()
        .expect("读取库存失败")
        .iter()
        .find(|i| i.common.id == item_id)
        .expect("商品不存在")
        .remain
        .value()
}

fn assert_validation(err: BookingError, fragment: &str) {
    match err {
        BookingError::Domain(DomainError::Validation(msg)) => {
            assert!(msg.contains(fragment), "错误信息不符: {}", msg)
        }
        other => panic!("期待校验错误, 实际: {:?}", other),
    }
}

// ==========================================
// 测试用例
// ==========================================

#[test]
fn test_create_order_consumes_stock() {
    logging::init_test();
    let ctx = create_test_context();
    insert_stock_item(&ctx, "bento", "弁当", 800, 5, 3, 10);

    // 周五午市取货
    let order = ctx
        .use_case
        .create_at(&order_request("u1", "2025/06/06 12:00", &[("bento", 2)], &[]), false, now())
        .expect("下单应成功");
    assert_eq!(order.total_price(), 1600);
    assert_eq!(remain_of(&ctx, "bento"), 1);

    // 剩余 1 份, 再订 2 份失败, 且库存不变
    let err = ctx
        .use_case
        .create_at(&order_request("u2", "2025/06/06 12:00", &[("bento", 2)], &[]), false, now())
        .unwrap_err();
    assert_validation(err, "库存不足");
    assert_eq!(remain_of(&ctx, "bento"), 1);

    // 最后 1 份可以被订走
    ctx.use_case
        .create_at(&order_request("u3", "2025/06/06 12:00", &[("bento", 1)], &[]), false, now())
        .expect("最后一份应可下单");
    assert_eq!(remain_of(&ctx, "bento"), 0);
}

#[test]
fn test_last_unit_bookable_on_next_tuesday_morning() {
    let ctx = create_test_context();
    insert_stock_item(&ctx, "pudding", "布丁", 400, 3, 1, 10);

    // 下周二早市 08:00 取货, 最后一份
    ctx.use_case
        .create_at(&order_request("u1", "2025/06/10 08:00", &[("pudding", 1)], &[]), false, now())
        .expect("最后一份应可预订");
    assert_eq!(remain_of(&ctx, "pudding"), 0);

    // 同一时段再订即库存不足
    let err = ctx
        .use_case
        .create_at(&order_request("u2", "2025/06/10 08:00", &[("pudding", 1)], &[]), false, now())
        .unwrap_err();
    assert_validation(err, "库存不足");
}

#[test]
fn test_cancel_restores_stock() {
    logging::init_test();
    let ctx = create_test_context();
    insert_stock_item(&ctx, "bento", "弁当", 800, 5, 3, 10);

    let order = ctx
        .use_case
        .create_at(&order_request("u1", "2025/06/06 12:00", &[("bento", 2)], &[]), false, now())
        .expect("下单应成功");
    assert_eq!(remain_of(&ctx, "bento"), 1);

    let canceled = ctx.use_case.cancel(&order.id).expect("取消应成功");
    assert!(canceled.canceled);
    assert_eq!(remain_of(&ctx, "bento"), 3);

    // 重复取消是校验错误, 不再回补
    let err = ctx.use_case.cancel(&order.id).unwrap_err();
    assert_validation(err, "已经取消");
    assert_eq!(remain_of(&ctx, "bento"), 3);
}

#[test]
fn test_cancel_missing_order_is_not_found() {
    let ctx = create_test_context();
    match ctx.use_case.cancel("no-such-order").unwrap_err() {
        BookingError::Domain(DomainError::NotFound(msg)) => {
            assert!(msg.contains("no-such-order"))
        }
        other => panic!("期待 NotFound, 实际: {:?}", other),
    }
}

#[test]
fn test_one_active_order_per_user() {
    let ctx = create_test_context();
    insert_stock_item(&ctx, "bento", "弁当", 800, 5, 10, 10);

    let first = ctx
        .use_case
        .create_at(&order_request("u1", "2025/06/06 12:00", &[("bento", 1)], &[]), false, now())
        .expect("首单应成功");

    // 同一用户存在在途订单时拒绝
    let err = ctx
        .use_case
        .create_at(&order_request("u1", "2025/06/06 18:30", &[("bento", 1)], &[]), false, now())
        .unwrap_err();
    assert_validation(err, "未取消的订单");

    // 管理员代下单跳过该限制
    ctx.use_case
        .create_at(&order_request("u1", "2025/06/06 18:30", &[("bento", 1)], &[]), true, now())
        .expect("管理员代下单应成功");

    // 取消后恢复普通下单资格
    ctx.use_case.cancel(&first.id).expect("取消应成功");
    let active = ctx.use_case.list_active("u1").expect("查询应成功");
    assert_eq!(active.len(), 1);
}

#[test]
fn test_food_daily_cap() {
    let ctx = create_test_context();
    let lunch = hour_id_by_name(&ctx, "lunch");
    let dinner = hour_id_by_name(&ctx, "dinner");
    insert_food_item(&ctx, "curry", "カレー", 600, 5, 5, vec![lunch, dinner]);

    ctx.use_case
        .create_at(&order_request("u1", "2025/06/06 12:00", &[], &[("curry", 3)]), false, now())
        .expect("首单应成功");

    // 跨越当日上限的那一单失败, 之前的不受影响
    let err = ctx
        .use_case
        .create_at(&order_request("u2", "2025/06/06 18:30", &[], &[("curry", 3)]), false, now())
        .unwrap_err();
    assert_validation(err, "当日订购量超限");

    // 限额以内仍可下单; 其他日期不受当日计数影响
    ctx.use_case
        .create_at(&order_request("u2", "2025/06/06 18:30", &[], &[("curry", 2)]), false, now())
        .expect("限额内应成功");
    ctx.use_case
        .create_at(&order_request("u3", "2025/06/07 12:00", &[], &[("curry", 5)]), false, now())
        .expect("其他日期应不受影响");
}

#[test]
fn test_food_daily_cap_counts_duplicate_lines() {
    let ctx = create_test_context();
    let lunch = hour_id_by_name(&ctx, "lunch");
    insert_food_item(&ctx, "curry", "カレー", 600, 5, 5, vec![lunch]);

    // 同一订单内的重复明细按商品合并计数: 3 + 3 > 5
    let err = ctx
        .use_case
        .create_at(
            &order_request("u1", "2025/06/06 12:00", &[], &[("curry", 3), ("curry", 3)]),
            false,
            now(),
        )
        .unwrap_err();
    assert_validation(err, "当日订购量超限");

    // 合并后仍在限额内则可下单
    ctx.use_case
        .create_at(
            &order_request("u1", "2025/06/06 12:00", &[], &[("curry", 3), ("curry", 2)]),
            false,
            now(),
        )
        .expect("合并后限额内应成功");
}

#[test]
fn test_canceled_order_releases_daily_cap() {
    let ctx = create_test_context();
    let lunch = hour_id_by_name(&ctx, "lunch");
    insert_food_item(&ctx, "curry", "カレー", 600, 5, 5, vec![lunch]);

    let order = ctx
        .use_case
        .create_at(&order_request("u1", "2025/06/06 12:00", &[], &[("curry", 5)]), false, now())
        .expect("首单应成功");
    let err = ctx
        .use_case
        .create_at(&order_request("u2", "2025/06/06 12:00", &[], &[("curry", 1)]), false, now())
        .unwrap_err();
    assert_validation(err, "当日订购量超限");

    ctx.use_case.cancel(&order.id).expect("取消应成功");
    ctx.use_case
        .create_at(&order_request("u2", "2025/06/06 12:00", &[], &[("curry", 1)]), false, now())
        .expect("取消后配额应释放");
}

#[test]
fn test_pickup_outside_business_window_rejected() {
    let ctx = create_test_context();
    insert_stock_item(&ctx, "bento", "弁当", 800, 5, 10, 10);

    // 周五 10:00 不落在任何午市/晚市窗口
    let err = ctx
        .use_case
        .create_at(&order_request("u1", "2025/06/06 10:00", &[("bento", 1)], &[]), false, now())
        .unwrap_err();
    assert_validation(err, "取货时间不在营业时间内");

    // 周一整日无班次
    let err = ctx
        .use_case
        .create_at(&order_request("u1", "2025/06/09 12:00", &[("bento", 1)], &[]), false, now())
        .unwrap_err();
    assert_validation(err, "取货时间不在营业时间内");
}

#[test]
fn test_pickup_window_boundaries_inclusive() {
    let ctx = create_test_context();
    insert_stock_item(&ctx, "bento", "弁当", 800, 5, 10, 10);

    // 午市窗口两端 11:30 / 15:00 均可取货
    ctx.use_case
        .create_at(&order_request("u1", "2025/06/06 11:30", &[("bento", 1)], &[]), false, now())
        .expect("窗口起点应可取货");
    ctx.use_case
        .create_at(&order_request("u2", "2025/06/06 15:00", &[("bento", 1)], &[]), false, now())
        .expect("窗口终点应可取货");
}

#[test]
fn test_today_cutoff_blocks_near_pickups() {
    let ctx = create_test_context();
    insert_stock_item(&ctx, "bento", "弁当", 800, 5, 10, 10);

    // now=10:20, 提前量 180 分钟, 30 分钟取整 -> 截止 13:30
    let now = parse_date_time("2025/06/04 10:20").unwrap();

    let err = ctx
        .use_case
        .create_at(&order_request("u1", "2025/06/04 12:00", &[("bento", 1)], &[]), false, now)
        .unwrap_err();
    assert_validation(err, "取货时间不在营业时间内");

    // 截止时刻本身可以取货（窗口起点被抬升到 13:30, 两端含）
    ctx.use_case
        .create_at(&order_request("u2", "2025/06/04 13:30", &[("bento", 1)], &[]), false, now)
        .expect("截止时刻应可取货");

    // 未来日期不受当日截止影响
    ctx.use_case
        .create_at(&order_request("u3", "2025/06/05 11:30", &[("bento", 1)], &[]), false, now)
        .expect("未来日期不受截止影响");
}

#[test]
fn test_pickup_in_holiday_rejected() {
    let ctx = create_test_context();
    insert_stock_item(&ctx, "bento", "弁当", 800, 5, 10, 10);
    schedule_api(&ctx)
        .create_holiday("年始休业", "2056/01/01", "2056/01/03")
        .expect("休业期创建应成功");

    let err = ctx
        .use_case
        .create_at(&order_request("u1", "2056/01/02 12:00", &[("bento", 1)], &[]), false, now())
        .unwrap_err();
    assert_validation(err, "取货时间不在营业时间内");
}

#[test]
fn test_empty_and_unknown_items_rejected() {
    let ctx = create_test_context();
    insert_stock_item(&ctx, "bento", "弁当", 800, 5, 10, 10);

    // 空订单
    let err = ctx
        .use_case
        .create_at(&order_request("u1", "2025/06/06 12:00", &[], &[]), false, now())
        .unwrap_err();
    assert!(matches!(err, BookingError::Domain(DomainError::Validation(_))));

    // 目录中不存在的商品
    let err = ctx
        .use_case
        .create_at(&order_request("u1", "2025/06/06 12:00", &[("ghost", 1)], &[]), false, now())
        .unwrap_err();
    assert_validation(err, "商品不存在");

    // 超过单笔上限
    let err = ctx
        .use_case
        .create_at(&order_request("u1", "2025/06/06 12:00", &[("bento", 6)], &[]), false, now())
        .unwrap_err();
    assert!(matches!(err, BookingError::Domain(DomainError::Validation(_))));
}

#[test]
fn test_admin_restock_enables_booking() {
    let ctx = create_test_context();
    insert_stock_item(&ctx, "bento", "弁当", 800, 5, 0, 10);

    // 售罄时无法下单
    let err = ctx
        .use_case
        .create_at(&order_request("u1", "2025/06/06 12:00", &[("bento", 1)], &[]), false, now())
        .unwrap_err();
    assert_validation(err, "库存不足");

    // 管理员补货后恢复可订
    ctx.repos
        .item_repo
        .update_stock_remain("bento", 5)
        .expect("补货应成功");
    ctx.use_case
        .create_at(&order_request("u1", "2025/06/06 12:00", &[("bento", 2)], &[]), false, now())
        .expect("补货后应可下单");
    assert_eq!(remain_of(&ctx, "bento"), 3);

    // 不存在的商品不可补货
    assert!(ctx.repos.item_repo.update_stock_remain("ghost", 1).is_err());
}

#[test]
fn test_orders_listed_by_pickup_date_range() {
    let ctx = create_test_context();
    insert_stock_item(&ctx, "bento", "弁当", 800, 5, 10, 10);

    ctx.use_case
        .create_at(&order_request("u1", "2025/06/06 12:00", &[("bento", 1)], &[]), false, now())
        .expect("下单应成功");
    ctx.use_case
        .create_at(&order_request("u2", "2025/06/07 12:00", &[("bento", 1)], &[]), false, now())
        .expect("下单应成功");
    ctx.use_case
        .create_at(&order_request("u3", "2025/06/10 08:00", &[("bento", 1)], &[]), false, now())
        .expect("下单应成功");

    // 区间两端含, 明细随订单一并加载
    let orders = ctx
        .repos
        .order_repo
        .find_by_pickup_date_range(
            parse_date("2025/06/06").unwrap(),
            parse_date("2025/06/07").unwrap(),
        )
        .expect("区间查询应成功");
    assert_eq!(orders.len(), 2);
    assert!(orders.iter().all(|o| !o.stock_items.is_empty()));
}

#[test]
fn test_notify_daily_order_counts_active_orders() {
    let ctx = create_test_context();
    insert_stock_item(&ctx, "bento", "弁当", 800, 5, 10, 10);

    let first = ctx
        .use_case
        .create_at(&order_request("u1", "2025/06/06 12:00", &[("bento", 1)], &[]), false, now())
        .expect("下单应成功");
    ctx.use_case
        .create_at(&order_request("u2", "2025/06/06 18:30", &[("bento", 1)], &[]), false, now())
        .expect("下单应成功");
    ctx.use_case
        .create_at(&order_request("u3", "2025/06/07 12:00", &[("bento", 1)], &[]), false, now())
        .expect("下单应成功");
    ctx.use_case.cancel(&first.id).expect("取消应成功");

    // 已取消与其他日期的订单不计入
    let count = ctx
        .use_case
        .notify_daily_order(parse_date_time("2025/06/06 00:00").unwrap().date())
        .expect("汇总应成功");
    assert_eq!(count, 1);
}
