// ==========================================
// 餐厅外卖预订系统 - 特别营业时段领域模型
// ==========================================
// 职责: 单日替换某个班次的营业时间
// 红线: 同一班次最多一条替换; 同一天的替换时间不得重叠
// ==========================================

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::ranges::{format_date, TimeRange};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 特别营业时段名称最大长度（字符数）
pub const MAX_SPECIAL_HOUR_NAME_LEN: usize = 30;

/// 特别营业时段
///
/// 针对单个日历日，整体**替换**所指向班次当天的营业时间；
/// 替换与每周规则从不并列生效。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialBusinessHour {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    pub time_range: TimeRange,
    /// 被替换的班次 id
    pub business_hour_id: String,
}

impl SpecialBusinessHour {
    /// 创建特别营业时段（自动分配 id）
    pub fn new(
        name: &str,
        date: NaiveDate,
        time_range: TimeRange,
        business_hour_id: &str,
    ) -> DomainResult<Self> {
        let hour = Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            date,
            time_range,
            business_hour_id: business_hour_id.to_string(),
        };
        hour.validate_fields()?;
        Ok(hour)
    }

    /// 校验单条记录的字段规则
    pub fn validate_fields(&self) -> DomainResult<()> {
        if self.name.is_empty() || self.name.chars().count() > MAX_SPECIAL_HOUR_NAME_LEN {
            return Err(DomainError::validation(format!(
                "特别营业时段名称长度非法 (1-{} 字符): {}",
                MAX_SPECIAL_HOUR_NAME_LEN, self.name
            )));
        }
        if self.business_hour_id.is_empty() {
            return Err(DomainError::validation(
                "特别营业时段必须指定被替换的班次".to_string(),
            ));
        }
        Ok(())
    }

    /// 对照完整现存集合校验候选记录
    ///
    /// # 规则
    /// 1. 同一班次在整个集合中最多被一条替换“认领”
    /// 2. 同一天内任意两条替换的时间区间不得重叠
    ///
    /// 更新场景下自身记录（相同 id）不参与比较。
    pub fn validate_against(&self, existing: &[SpecialBusinessHour]) -> DomainResult<()> {
        self.validate_fields()?;
        for other in existing.iter().filter(|h| h.id != self.id) {
            if other.business_hour_id == self.business_hour_id {
                return Err(DomainError::validation(format!(
                    "班次已被其他特别营业时段替换: business_hour_id={} ({})",
                    self.business_hour_id, other.name
                )));
            }
            if other.date == self.date && other.time_range.is_overlap(&self.time_range) {
                return Err(DomainError::validation(format!(
                    "同一日期的特别营业时段时间重叠: {} 与 {} ({})",
                    self.name,
                    other.name,
                    format_date(self.date)
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ranges::parse_date;

    fn special(name: &str, date: &str, start: &str, end: &str, hour_id: &str) -> SpecialBusinessHour {
        SpecialBusinessHour::new(
            name,
            parse_date(date).unwrap(),
            TimeRange::parse(start, end).unwrap(),
            hour_id,
        )
        .unwrap()
    }

    #[test]
    fn test_one_override_per_shift() {
        let existing = vec![special("元旦早市", "2023/01/01", "08:00", "10:00", "bh-1")];
        let candidate = special("元旦早市2", "2023/01/02", "08:00", "10:00", "bh-1");
        assert!(candidate.validate_against(&existing).is_err());

        let other_shift = special("元旦午市", "2023/01/01", "11:00", "14:00", "bh-2");
        assert!(other_shift.validate_against(&existing).is_ok());
    }

    #[test]
    fn test_same_date_overlap_rejected() {
        let existing = vec![special("元旦早市", "2023/01/01", "08:00", "10:00", "bh-1")];
        let overlapping = special("元旦加时", "2023/01/01", "09:00", "11:00", "bh-2");
        assert!(overlapping.validate_against(&existing).is_err());

        // 不同日期允许重叠时间
        let other_date = special("初二加时", "2023/01/02", "09:00", "11:00", "bh-2");
        assert!(other_date.validate_against(&existing).is_ok());
    }

    #[test]
    fn test_update_skips_self() {
        let a = special("元旦早市", "2023/01/01", "08:00", "10:00", "bh-1");
        let mut updated = a.clone();
        updated.time_range = TimeRange::parse("08:30", "10:30").unwrap();
        // 自身不与自身冲突
        assert!(updated.validate_against(std::slice::from_ref(&a)).is_ok());
    }

    #[test]
    fn test_name_length_limit() {
        let long_name = "x".repeat(MAX_SPECIAL_HOUR_NAME_LEN + 1);
        let result = SpecialBusinessHour::new(
            &long_name,
            parse_date("2023/01/01").unwrap(),
            TimeRange::parse("08:00", "10:00").unwrap(),
            "bh-1",
        );
        assert!(result.is_err());
    }
}
