// ==========================================
// 餐厅外卖预订系统 - 特别休业期领域模型
// ==========================================
// 职责: 命名的闭区间休业日期段，期间所有班次不可下单
// 红线: 休业期之间不得重叠
// ==========================================

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::ranges::DateRange;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 休业期名称最大长度（字符数）
pub const MAX_HOLIDAY_NAME_LEN: usize = 20;

/// 特别休业期
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialHoliday {
    pub id: String,
    pub name: String,
    pub date_range: DateRange,
}

impl SpecialHoliday {
    /// 创建休业期（自动分配 id）
    pub fn new(name: &str, date_range: DateRange) -> DomainResult<Self> {
        let holiday = Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            date_range,
        };
        holiday.validate_fields()?;
        Ok(holiday)
    }

    /// 校验单条记录的字段规则
    pub fn validate_fields(&self) -> DomainResult<()> {
        if self.name.is_empty() || self.name.chars().count() > MAX_HOLIDAY_NAME_LEN {
            return Err(DomainError::validation(format!(
                "休业期名称长度非法 (1-{} 字符): {}",
                MAX_HOLIDAY_NAME_LEN, self.name
            )));
        }
        Ok(())
    }

    /// 休业期重叠判定（日期区间两端含）
    pub fn is_overlap(&self, other: &SpecialHoliday) -> bool {
        self.date_range.is_overlap(&other.date_range)
    }

    /// 日期是否落在休业期内
    pub fn contains(&self, d: NaiveDate) -> bool {
        self.date_range.contains(d)
    }

    /// 对照完整现存集合校验候选记录
    ///
    /// 更新场景下自身记录（相同 id）不参与比较。
    pub fn validate_against(&self, existing: &[SpecialHoliday]) -> DomainResult<()> {
        self.validate_fields()?;
        for other in existing.iter().filter(|h| h.id != self.id) {
            if self.is_overlap(other) {
                return Err(DomainError::validation(format!(
                    "休业期重叠: {} 与 {}",
                    self.name, other.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holiday(name: &str, start: &str, end: &str) -> SpecialHoliday {
        SpecialHoliday::new(name, DateRange::parse(start, end).unwrap()).unwrap()
    }

    #[test]
    fn test_overlap_rejected() {
        let existing = vec![holiday("夏季休业", "2056/07/10", "2056/10/03")];
        let overlapping = holiday("设备检修", "2056/10/01", "2056/10/05");
        assert!(overlapping.validate_against(&existing).is_err());

        let disjoint = holiday("年末休业", "2056/12/30", "2056/12/31");
        assert!(disjoint.validate_against(&existing).is_ok());
    }

    #[test]
    fn test_contains() {
        let h = holiday("夏季休业", "2056/07/10", "2056/10/03");
        assert!(h.contains(crate::domain::ranges::parse_date("2056/08/01").unwrap()));
        assert!(!h.contains(crate::domain::ranges::parse_date("2056/10/04").unwrap()));
    }

    #[test]
    fn test_name_length_limit() {
        let long_name = "x".repeat(MAX_HOLIDAY_NAME_LEN + 1);
        let result =
            SpecialHoliday::new(&long_name, DateRange::parse("2056/07/10", "2056/10/03").unwrap());
        assert!(result.is_err());
    }
}
