// ==========================================
// 餐厅外卖预订系统 - 营业时段领域模型
// ==========================================
// 职责: 每周循环营业时段（班次）及其聚合校验
// 红线: 同一星期日不允许两个班次时间重叠
// ==========================================

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::ranges::TimeRange;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 每周最多可配置的班次数
pub const MAX_BUSINESS_HOURS: usize = 5;

/// 班次名称最大长度（字符数）
pub const MAX_BUSINESS_HOUR_NAME_LEN: usize = 10;

/// 展示用提前小时数的取值范围
pub const HOUR_OFFSET_MIN: u32 = 1;
pub const HOUR_OFFSET_MAX: u32 = 12;

/// 展示用提前小时数默认值
pub const DEFAULT_HOUR_OFFSET: u32 = 3;

/// 计算日期对应的星期编号（周日=0 .. 周六=6）
pub fn weekday_of(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

// ==========================================
// BusinessHour - 营业班次
// ==========================================

/// 营业班次
///
/// 每周循环的命名时段，绑定一组适用的星期编号。
/// `hour_offset` 仅作展示/排序提示，与全局下单提前量是两个独立配置。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessHour {
    pub id: String,
    pub name: String,
    pub time_range: TimeRange,
    /// 适用星期编号（周日=0 .. 周六=6，不允许重复）
    pub weekdays: Vec<u8>,
    /// 展示用提前小时数（1-12）
    pub hour_offset: u32,
}

impl BusinessHour {
    /// 创建营业班次（自动分配 id）
    pub fn new(
        name: &str,
        time_range: TimeRange,
        weekdays: Vec<u8>,
        hour_offset: u32,
    ) -> DomainResult<Self> {
        let hour = Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            time_range,
            weekdays,
            hour_offset,
        };
        hour.validate_fields()?;
        Ok(hour)
    }

    /// 校验单个班次的字段规则
    ///
    /// # 规则
    /// 1. 名称非空且不超过 10 字符
    /// 2. 星期编号落在 0-6 且不重复
    /// 3. hour_offset 落在 1-12
    pub fn validate_fields(&self) -> DomainResult<()> {
        if self.name.is_empty() || self.name.chars().count() > MAX_BUSINESS_HOUR_NAME_LEN {
            return Err(DomainError::validation(format!(
                "班次名称长度非法 (1-{} 字符): {}",
                MAX_BUSINESS_HOUR_NAME_LEN, self.name
            )));
        }
        if self.weekdays.is_empty() {
            return Err(DomainError::validation(format!(
                "班次必须至少绑定一个星期: {}",
                self.name
            )));
        }
        for (i, wd) in self.weekdays.iter().enumerate() {
            if *wd > 6 {
                return Err(DomainError::validation(format!(
                    "星期编号非法 (0-6): {}",
                    wd
                )));
            }
            if self.weekdays[..i].contains(wd) {
                return Err(DomainError::validation(format!(
                    "星期编号重复: {} (班次 {})",
                    wd, self.name
                )));
            }
        }
        if self.hour_offset < HOUR_OFFSET_MIN || self.hour_offset > HOUR_OFFSET_MAX {
            return Err(DomainError::validation(format!(
                "hour_offset 超出范围 ({}-{}): {}",
                HOUR_OFFSET_MIN, HOUR_OFFSET_MAX, self.hour_offset
            )));
        }
        Ok(())
    }

    /// 是否与另一班次共享至少一个星期
    pub fn shares_weekday(&self, other: &BusinessHour) -> bool {
        self.weekdays.iter().any(|wd| other.weekdays.contains(wd))
    }

    /// 班次重叠判定
    ///
    /// # 规则
    /// 共享至少一个星期 且 时刻区间重叠，才算冲突
    pub fn is_overlap(&self, other: &BusinessHour) -> bool {
        self.shares_weekday(other) && self.time_range.is_overlap(&other.time_range)
    }

    /// 该班次在指定星期是否适用
    pub fn applies_on(&self, weekday: u8) -> bool {
        self.weekdays.contains(&weekday)
    }
}

// ==========================================
// WeeklySchedule - 每周营业时段集合
// ==========================================

/// 每周营业时段集合
///
/// 小型有序聚合（最多 5 个班次）。所有写操作采用
/// “先整体校验、后提交”的原子语义：任一规则失败则整体拒绝。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklySchedule {
    hours: Vec<BusinessHour>,
}

impl WeeklySchedule {
    /// 创建并整体校验
    pub fn new(hours: Vec<BusinessHour>) -> DomainResult<Self> {
        Self::validate_set(&hours)?;
        Ok(Self { hours })
    }

    /// 从仓储行直接装配（写入时已整体校验）
    pub fn from_rows(hours: Vec<BusinessHour>) -> Self {
        Self { hours }
    }

    /// 默认种子数据：早市/午市/晚市
    pub fn default_schedule() -> Self {
        let morning = BusinessHour::new(
            "morning",
            TimeRange::parse("07:00", "09:30").expect("默认班次时间非法"),
            vec![2, 3, 5, 6, 0],
            DEFAULT_HOUR_OFFSET,
        )
        .expect("默认班次非法");
        let lunch = BusinessHour::new(
            "lunch",
            TimeRange::parse("11:30", "15:00").expect("默认班次时间非法"),
            vec![0, 2, 3, 4, 5, 6],
            DEFAULT_HOUR_OFFSET,
        )
        .expect("默认班次非法");
        let dinner = BusinessHour::new(
            "dinner",
            TimeRange::parse("18:00", "21:00").expect("默认班次时间非法"),
            vec![0, 2, 3, 4, 5, 6],
            DEFAULT_HOUR_OFFSET,
        )
        .expect("默认班次非法");
        Self {
            hours: vec![morning, lunch, dinner],
        }
    }

    pub fn hours(&self) -> &[BusinessHour] {
        &self.hours
    }

    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }

    /// 按 id 查找班次
    pub fn find(&self, id: &str) -> Option<&BusinessHour> {
        self.hours.iter().find(|h| h.id == id)
    }

    /// 更新指定班次
    ///
    /// 先定位（不存在则 NotFound），应用新值，再对**整个集合**
    /// 复跑重叠/星期规则；失败则整体回退，不产生半更新状态。
    ///
    /// # 返回
    /// - Ok(&BusinessHour): 更新后的班次
    /// - Err(NotFound): id 不存在
    /// - Err(Validation): 集合规则被违反
    pub fn update(
        &mut self,
        id: &str,
        name: &str,
        time_range: TimeRange,
        weekdays: Vec<u8>,
    ) -> DomainResult<&BusinessHour> {
        let idx = self
            .hours
            .iter()
            .position(|h| h.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("营业班次不存在: id={}", id)))?;

        let mut candidate = self.hours.clone();
        candidate[idx].name = name.to_string();
        candidate[idx].time_range = time_range;
        candidate[idx].weekdays = weekdays;

        Self::validate_set(&candidate)?;
        self.hours = candidate;
        Ok(&self.hours[idx])
    }

    /// 集合整体校验
    ///
    /// # 规则
    /// 1. 班次数不超过 5
    /// 2. 每个班次的字段规则成立
    /// 3. 两两之间不存在“共享星期且时间重叠”
    pub fn validate_set(hours: &[BusinessHour]) -> DomainResult<()> {
        if hours.len() > MAX_BUSINESS_HOURS {
            return Err(DomainError::validation(format!(
                "班次数量超限 (最多 {}): {}",
                MAX_BUSINESS_HOURS,
                hours.len()
            )));
        }
        for hour in hours {
            hour.validate_fields()?;
        }
        for (i, a) in hours.iter().enumerate() {
            for b in &hours[i + 1..] {
                if a.is_overlap(b) {
                    return Err(DomainError::validation(format!(
                        "班次时间重叠: {} 与 {}",
                        a.name, b.name
                    )));
                }
            }
        }
        Ok(())
    }
}
