// ==========================================
// 餐厅外卖预订系统 - 区间值对象
// ==========================================
// 职责: 时间区间/日期区间的基础运算与边界格式
// 红线: 纯值对象，不含 I/O，不含仓储逻辑
// ==========================================

use crate::domain::error::{DomainError, DomainResult};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// 边界日期格式（如 2022/10/05）
pub const DATE_FORMAT: &str = "%Y/%m/%d";

/// 边界时刻格式（如 09:30）
pub const TIME_FORMAT: &str = "%H:%M";

/// 边界取货时间格式（如 2022/10/05 14:10）
pub const DATE_TIME_FORMAT: &str = "%Y/%m/%d %H:%M";

/// 时间区间最小跨度（分钟）
pub const MIN_TIME_SPAN_MINUTES: i64 = 60;

/// 解析边界格式的日期字符串
pub fn parse_date(s: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|_| DomainError::validation(format!("日期格式错误 (期望 YYYY/MM/DD): {}", s)))
}

/// 解析边界格式的时刻字符串
pub fn parse_time(s: &str) -> DomainResult<NaiveTime> {
    NaiveTime::parse_from_str(s, TIME_FORMAT)
        .map_err(|_| DomainError::validation(format!("时刻格式错误 (期望 HH:MM): {}", s)))
}

/// 解析边界格式的取货时间字符串
pub fn parse_date_time(s: &str) -> DomainResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DATE_TIME_FORMAT).map_err(|_| {
        DomainError::validation(format!("取货时间格式错误 (期望 YYYY/MM/DD HH:MM): {}", s))
    })
}

/// 格式化为边界日期字符串
pub fn format_date(d: NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

/// 格式化为边界时刻字符串
pub fn format_time(t: NaiveTime) -> String {
    t.format(TIME_FORMAT).to_string()
}

/// 格式化为边界取货时间字符串
pub fn format_date_time(dt: NaiveDateTime) -> String {
    dt.format(DATE_TIME_FORMAT).to_string()
}

// ==========================================
// TimeRange - 时刻区间
// ==========================================

/// 时刻区间
///
/// # 不变式
/// - `end` 必须晚于 `start` 至少 60 分钟（最小营业跨度）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeRange {
    /// 创建时刻区间
    ///
    /// # 参数
    /// - start: 开始时刻
    /// - end: 结束时刻
    ///
    /// # 返回
    /// - Ok(TimeRange): 区间合法
    /// - Err(Validation): end 距 start 不足 60 分钟
    pub fn new(start: NaiveTime, end: NaiveTime) -> DomainResult<Self> {
        let span = end.signed_duration_since(start).num_minutes();
        if span < MIN_TIME_SPAN_MINUTES {
            return Err(DomainError::validation(format!(
                "时间区间跨度不足: start={}, end={}, 最少需要 {} 分钟",
                format_time(start),
                format_time(end),
                MIN_TIME_SPAN_MINUTES
            )));
        }
        Ok(Self { start, end })
    }

    /// 从边界字符串创建时刻区间
    pub fn parse(start: &str, end: &str) -> DomainResult<Self> {
        Self::new(parse_time(start)?, parse_time(end)?)
    }

    /// 区间重叠判定
    ///
    /// # 规则
    /// - `other.start < self.end && self.start < other.end`
    /// - 首尾相接（09:30 结束 / 09:30 开始）不算重叠
    pub fn is_overlap(&self, other: &TimeRange) -> bool {
        other.start < self.end && self.start < other.end
    }

    /// 时刻是否落在区间内（两端含）
    pub fn contains(&self, t: NaiveTime) -> bool {
        self.start <= t && t <= self.end
    }
}

// ==========================================
// DateRange - 日期区间
// ==========================================

/// 日期区间（两端含）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// 创建日期区间
    ///
    /// # 返回
    /// - Err(Validation): start 晚于 end
    pub fn new(start: NaiveDate, end: NaiveDate) -> DomainResult<Self> {
        if start > end {
            return Err(DomainError::validation(format!(
                "日期区间顺序错误: start={}, end={}",
                format_date(start),
                format_date(end)
            )));
        }
        Ok(Self { start, end })
    }

    /// 从边界字符串创建日期区间
    pub fn parse(start: &str, end: &str) -> DomainResult<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// 区间重叠判定（两端含）
    pub fn is_overlap(&self, other: &DateRange) -> bool {
        other.start <= self.end && self.start <= other.end
    }

    /// 日期是否落在区间内（两端含）
    pub fn contains(&self, d: NaiveDate) -> bool {
        self.start <= d && d <= self.end
    }

    /// 枚举区间内的所有日期（含两端）
    pub fn iter_dates(&self) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        let mut cur = self.start;
        while cur <= self.end {
            dates.push(cur);
            cur = cur.succ_opt().unwrap_or(cur);
            if dates.last() == Some(&cur) {
                break;
            }
        }
        dates
    }
}
