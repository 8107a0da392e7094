// ==========================================
// 餐厅外卖预订系统 - Availability Core 纯函数库
// ==========================================
// 职责: 提供休业判定、单日窗口合成、当日截止时刻裁剪的纯逻辑
// 红线: 无状态、无副作用、无 I/O 操作
// ==========================================

use crate::domain::business_hour::{weekday_of, BusinessHour};
use crate::domain::holiday::SpecialHoliday;
use crate::domain::special_hour::SpecialBusinessHour;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

// ==========================================
// WindowSlot - 单日营业窗口
// ==========================================

/// 单日营业窗口（未附加商品信息）
///
/// 裁剪后窗口跨度可能短于班次的 60 分钟下限，
/// 因此这里直接持有 start/end 而不是 TimeRange。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSlot {
    pub date: NaiveDate,
    pub business_hour_id: String,
    pub name: String,
    pub start: NaiveTime,
    pub end: NaiveTime,
    /// 展示用提前小时数（来自所属班次）
    pub hour_offset: u32,
}

// ==========================================
// AvailabilityCore - 纯函数工具类
// ==========================================
pub struct AvailabilityCore;

impl AvailabilityCore {
    /// 日期是否落在任一休业期内
    pub fn in_holiday(date: NaiveDate, holidays: &[SpecialHoliday]) -> bool {
        holidays.iter().any(|h| h.contains(date))
    }

    /// 合成单个日历日的营业窗口
    ///
    /// # 规则 (按优先级)
    /// 1. 日期落在休业期内 -> 无窗口
    /// 2. 当日存在特别营业时段 -> 为其指向的班次发出替换窗口
    /// 3. 未被替换的班次按每周规则回落: 星期匹配则发出班次窗口
    ///
    /// 替换永远**取代**所指班次的每周规则，从不并列。
    pub fn resolve_slots_for_date(
        date: NaiveDate,
        hours: &[BusinessHour],
        special_hours: &[SpecialBusinessHour],
        holidays: &[SpecialHoliday],
    ) -> Vec<WindowSlot> {
        if Self::in_holiday(date, holidays) {
            return Vec::new();
        }

        let mut slots = Vec::new();
        let mut claimed: Vec<&str> = Vec::new();

        for special in special_hours.iter().filter(|s| s.date == date) {
            let hour = hours.iter().find(|h| h.id == special.business_hour_id);
            slots.push(WindowSlot {
                date,
                business_hour_id: special.business_hour_id.clone(),
                name: hour
                    .map(|h| h.name.clone())
                    .unwrap_or_else(|| special.name.clone()),
                start: special.time_range.start,
                end: special.time_range.end,
                hour_offset: hour
                    .map(|h| h.hour_offset)
                    .unwrap_or(crate::domain::business_hour::DEFAULT_HOUR_OFFSET),
            });
            claimed.push(special.business_hour_id.as_str());
        }

        let weekday = weekday_of(date);
        for hour in hours {
            if claimed.contains(&hour.id.as_str()) {
                continue;
            }
            if hour.applies_on(weekday) {
                slots.push(WindowSlot {
                    date,
                    business_hour_id: hour.id.clone(),
                    name: hour.name.clone(),
                    start: hour.time_range.start,
                    end: hour.time_range.end,
                    hour_offset: hour.hour_offset,
                });
            }
        }

        slots.sort_by_key(|s| s.start);
        slots
    }

    /// 计算当日下单截止时刻
    ///
    /// # 规则
    /// - cutoff = round_up(now + offset_minutes, unit_minutes)
    /// - 恰好落在取整边界上时不再进位
    /// - 跨过午夜时进位到次日（当日窗口随之全部淘汰）
    pub fn round_up_cutoff(
        now: NaiveDateTime,
        offset_minutes: i64,
        unit_minutes: i64,
    ) -> NaiveDateTime {
        let mut t = now + Duration::minutes(offset_minutes);
        // 分钟粒度: 秒数非零先进到下一分钟
        if t.second() > 0 || t.nanosecond() > 0 {
            t += Duration::seconds(60 - t.second() as i64);
            t = t.with_nanosecond(0).unwrap_or(t);
        }
        if unit_minutes <= 1 {
            return t;
        }
        let minutes_of_day = (t.hour() * 60 + t.minute()) as i64;
        let rem = minutes_of_day % unit_minutes;
        if rem == 0 {
            t
        } else {
            t + Duration::minutes(unit_minutes - rem)
        }
    }

    /// 当日窗口裁剪
    ///
    /// # 规则
    /// 1. 早于 today 的窗口无条件淘汰（调用方传入过期区间时）
    /// 2. 晚于 today 的窗口原样保留
    /// 3. today 的窗口:
    ///    - cutoff 已进位到次日 -> 全部淘汰
    ///    - end <= cutoff 时刻 -> 淘汰（已完全流逝）
    ///    - cutoff 时刻严格落在窗口内 -> start 提升到 cutoff 时刻
    ///    - 提升后 start == end -> 淘汰（零长度）
    pub fn adjust_today(
        slots: Vec<WindowSlot>,
        today: NaiveDate,
        cutoff: NaiveDateTime,
    ) -> Vec<WindowSlot> {
        let mut adjusted = Vec::with_capacity(slots.len());
        for mut slot in slots {
            if slot.date < today {
                continue;
            }
            if slot.date > today {
                adjusted.push(slot);
                continue;
            }
            if cutoff.date() > today {
                continue;
            }
            let cutoff_time = cutoff.time();
            if slot.end <= cutoff_time {
                continue;
            }
            if slot.start < cutoff_time {
                slot.start = cutoff_time;
            }
            if slot.start == slot.end {
                continue;
            }
            adjusted.push(slot);
        }
        adjusted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ranges::{parse_date, parse_date_time, parse_time, TimeRange};

    fn hour(id: &str, name: &str, start: &str, end: &str, weekdays: Vec<u8>) -> BusinessHour {
        BusinessHour {
            id: id.to_string(),
            name: name.to_string(),
            time_range: TimeRange::parse(start, end).unwrap(),
            weekdays,
            hour_offset: 3,
        }
    }

    fn slot(date: &str, start: &str, end: &str) -> WindowSlot {
        WindowSlot {
            date: parse_date(date).unwrap(),
            business_hour_id: "bh-1".to_string(),
            name: "morning".to_string(),
            start: parse_time(start).unwrap(),
            end: parse_time(end).unwrap(),
            hour_offset: 3,
        }
    }

    #[test]
    fn test_holiday_suppresses_all_windows() {
        let hours = vec![hour("bh-1", "morning", "07:00", "09:30", vec![0, 1, 2, 3, 4, 5, 6])];
        let holidays = vec![SpecialHoliday {
            id: "h-1".to_string(),
            name: "夏季休业".to_string(),
            date_range: crate::domain::ranges::DateRange::parse("2056/07/10", "2056/10/03")
                .unwrap(),
        }];
        let slots = AvailabilityCore::resolve_slots_for_date(
            parse_date("2056/08/01").unwrap(),
            &hours,
            &[],
            &holidays,
        );
        assert!(slots.is_empty());
    }

    #[test]
    fn test_special_hour_replaces_weekly_shift() {
        // 2023/01/03 是周二 (weekday=2)
        let hours = vec![
            hour("bh-1", "morning", "07:00", "09:30", vec![2]),
            hour("bh-2", "lunch", "11:30", "15:00", vec![2]),
        ];
        let special = SpecialBusinessHour {
            id: "sp-1".to_string(),
            name: "新年早市".to_string(),
            date: parse_date("2023/01/03").unwrap(),
            time_range: TimeRange::parse("08:00", "10:00").unwrap(),
            business_hour_id: "bh-1".to_string(),
        };
        let slots = AvailabilityCore::resolve_slots_for_date(
            parse_date("2023/01/03").unwrap(),
            &hours,
            std::slice::from_ref(&special),
            &[],
        );
        assert_eq!(slots.len(), 2);
        // 替换窗口取代了 morning 的每周时间
        let morning = slots.iter().find(|s| s.business_hour_id == "bh-1").unwrap();
        assert_eq!(morning.start, parse_time("08:00").unwrap());
        assert_eq!(morning.end, parse_time("10:00").unwrap());
        // lunch 不受影响
        let lunch = slots.iter().find(|s| s.business_hour_id == "bh-2").unwrap();
        assert_eq!(lunch.start, parse_time("11:30").unwrap());
    }

    #[test]
    fn test_weekday_mismatch_emits_nothing() {
        // 2023/01/02 是周一 (weekday=1)
        let hours = vec![hour("bh-1", "morning", "07:00", "09:30", vec![2, 3])];
        let slots = AvailabilityCore::resolve_slots_for_date(
            parse_date("2023/01/02").unwrap(),
            &hours,
            &[],
            &[],
        );
        assert!(slots.is_empty());
    }

    #[test]
    fn test_round_up_cutoff() {
        // 10:20 + 180min = 13:20 -> 13:30
        let now = parse_date_time("2022/10/05 10:20").unwrap();
        let cutoff = AvailabilityCore::round_up_cutoff(now, 180, 30);
        assert_eq!(cutoff, parse_date_time("2022/10/05 13:30").unwrap());

        // 恰好整点边界不进位
        let now = parse_date_time("2022/10/05 10:30").unwrap();
        let cutoff = AvailabilityCore::round_up_cutoff(now, 180, 30);
        assert_eq!(cutoff, parse_date_time("2022/10/05 13:30").unwrap());

        // 跨午夜进位到次日
        let now = parse_date_time("2022/10/05 23:50").unwrap();
        let cutoff = AvailabilityCore::round_up_cutoff(now, 180, 30);
        assert_eq!(cutoff, parse_date_time("2022/10/06 03:00").unwrap());
    }

    #[test]
    fn test_adjust_today_scenarios() {
        // now=2022/10/05 10:20, offset=180 -> cutoff 13:30
        let today = parse_date("2022/10/05").unwrap();
        let cutoff = parse_date_time("2022/10/05 13:30").unwrap();

        let slots = vec![
            slot("2022/10/05", "09:00", "13:00"), // 已完全流逝 -> 淘汰
            slot("2022/10/05", "13:30", "17:00"), // start 已 >= cutoff -> 原样保留
            slot("2022/10/05", "09:00", "14:00"), // cutoff 落在窗口内 -> start 提升
            slot("2022/10/04", "09:00", "14:00"), // 过期日期 -> 淘汰
            slot("2022/10/06", "09:00", "14:00"), // 未来日期 -> 原样保留
        ];
        let adjusted = AvailabilityCore::adjust_today(slots, today, cutoff);
        assert_eq!(adjusted.len(), 3);
        assert_eq!(adjusted[0].start, parse_time("13:30").unwrap());
        assert_eq!(adjusted[0].end, parse_time("17:00").unwrap());
        assert_eq!(adjusted[1].start, parse_time("13:30").unwrap());
        assert_eq!(adjusted[1].end, parse_time("14:00").unwrap());
        assert_eq!(adjusted[2].date, parse_date("2022/10/06").unwrap());
    }

    #[test]
    fn test_adjust_today_cutoff_past_midnight_drops_day() {
        let today = parse_date("2022/10/05").unwrap();
        let cutoff = parse_date_time("2022/10/06 03:00").unwrap();
        let slots = vec![slot("2022/10/05", "18:00", "21:00")];
        assert!(AvailabilityCore::adjust_today(slots, today, cutoff).is_empty());
    }
}
