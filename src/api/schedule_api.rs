// ==========================================
// 餐厅外卖预订系统 - 排期管理 API
// ==========================================
// 职责: 营业班次更新、特别营业时段/休业期的管理端 CRUD
// 约束: 每次写入前对照完整现存集合重新校验
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::business_hour::{BusinessHour, WeeklySchedule};
use crate::domain::error::DomainError;
use crate::domain::holiday::SpecialHoliday;
use crate::domain::ranges::{parse_date, DateRange, TimeRange};
use crate::domain::special_hour::SpecialBusinessHour;
use crate::repository::{BusinessHourRepository, HolidayRepository, SpecialHourRepository};
use std::sync::Arc;

/// 排期管理 API
pub struct ScheduleApi {
    business_hour_repo: Arc<BusinessHourRepository>,
    special_hour_repo: Arc<SpecialHourRepository>,
    holiday_repo: Arc<HolidayRepository>,
}

impl ScheduleApi {
    pub fn new(
        business_hour_repo: Arc<BusinessHourRepository>,
        special_hour_repo: Arc<SpecialHourRepository>,
        holiday_repo: Arc<HolidayRepository>,
    ) -> Self {
        Self {
            business_hour_repo,
            special_hour_repo,
            holiday_repo,
        }
    }

    // ==========================================
    // 营业班次
    // ==========================================

    /// 读取整份每周营业时段（首次使用时写入默认班次）
    pub fn get_schedule(&self) -> ApiResult<WeeklySchedule> {
        self.business_hour_repo.ensure_seeded()?;
        Ok(self.business_hour_repo.fetch()?)
    }

    /// 更新单个营业班次
    ///
    /// 定位失败 -> UpdateTargetNotFound；集合规则失败 -> Validation。
    /// 先整体校验成功后才写库（原子 validate-then-commit）。
    pub fn update_business_hour(
        &self,
        id: &str,
        name: &str,
        start: &str,
        end: &str,
        weekdays: Vec<u8>,
    ) -> ApiResult<BusinessHour> {
        let time_range = TimeRange::parse(start, end)?;
        let mut schedule = self.get_schedule()?;

        let updated = match schedule.update(id, name, time_range, weekdays) {
            Ok(hour) => hour.clone(),
            Err(DomainError::NotFound(msg)) => return Err(ApiError::UpdateTargetNotFound(msg)),
            Err(e) => return Err(e.into()),
        };

        self.business_hour_repo.update(&updated)?;
        tracing::info!(business_hour_id = %updated.id, "营业班次已更新");
        Ok(updated)
    }

    // ==========================================
    // 特别营业时段
    // ==========================================

    pub fn list_special_hours(&self) -> ApiResult<Vec<SpecialBusinessHour>> {
        Ok(self.special_hour_repo.find_all()?)
    }

    /// 新建特别营业时段
    pub fn create_special_hour(
        &self,
        name: &str,
        date: &str,
        start: &str,
        end: &str,
        business_hour_id: &str,
    ) -> ApiResult<SpecialBusinessHour> {
        self.require_business_hour(business_hour_id)?;
        let candidate = SpecialBusinessHour::new(
            name,
            parse_date(date)?,
            TimeRange::parse(start, end)?,
            business_hour_id,
        )?;
        candidate.validate_against(&self.special_hour_repo.find_all()?)?;
        self.special_hour_repo.create(&candidate)?;
        tracing::info!(special_hour_id = %candidate.id, "特别营业时段已创建");
        Ok(candidate)
    }

    /// 更新特别营业时段
    pub fn update_special_hour(
        &self,
        id: &str,
        name: &str,
        date: &str,
        start: &str,
        end: &str,
        business_hour_id: &str,
    ) -> ApiResult<SpecialBusinessHour> {
        let mut candidate = self.special_hour_repo.find(id)?.ok_or_else(|| {
            ApiError::UpdateTargetNotFound(format!("特别营业时段不存在: id={}", id))
        })?;
        self.require_business_hour(business_hour_id)?;

        candidate.name = name.to_string();
        candidate.date = parse_date(date)?;
        candidate.time_range = TimeRange::parse(start, end)?;
        candidate.business_hour_id = business_hour_id.to_string();

        candidate.validate_against(&self.special_hour_repo.find_all()?)?;
        self.special_hour_repo.update(&candidate)?;
        Ok(candidate)
    }

    /// 删除特别营业时段
    pub fn delete_special_hour(&self, id: &str) -> ApiResult<()> {
        if self.special_hour_repo.find(id)?.is_none() {
            return Err(ApiError::UpdateTargetNotFound(format!(
                "特别营业时段不存在: id={}",
                id
            )));
        }
        self.special_hour_repo.delete(id)?;
        Ok(())
    }

    // ==========================================
    // 特别休业期
    // ==========================================

    pub fn list_holidays(&self) -> ApiResult<Vec<SpecialHoliday>> {
        Ok(self.holiday_repo.find_all()?)
    }

    /// 新建休业期
    pub fn create_holiday(&self, name: &str, start: &str, end: &str) -> ApiResult<SpecialHoliday> {
        let candidate = SpecialHoliday::new(name, DateRange::parse(start, end)?)?;
        candidate.validate_against(&self.holiday_repo.find_all()?)?;
        self.holiday_repo.create(&candidate)?;
        tracing::info!(holiday_id = %candidate.id, "特别休业期已创建");
        Ok(candidate)
    }

    /// 更新休业期
    pub fn update_holiday(
        &self,
        id: &str,
        name: &str,
        start: &str,
        end: &str,
    ) -> ApiResult<SpecialHoliday> {
        let mut candidate = self.holiday_repo.find(id)?.ok_or_else(|| {
            ApiError::UpdateTargetNotFound(format!("特别休业期不存在: id={}", id))
        })?;
        candidate.name = name.to_string();
        candidate.date_range = DateRange::parse(start, end)?;
        candidate.validate_against(&self.holiday_repo.find_all()?)?;
        self.holiday_repo.update(&candidate)?;
        Ok(candidate)
    }

    /// 删除休业期
    pub fn delete_holiday(&self, id: &str) -> ApiResult<()> {
        if self.holiday_repo.find(id)?.is_none() {
            return Err(ApiError::UpdateTargetNotFound(format!(
                "特别休业期不存在: id={}",
                id
            )));
        }
        self.holiday_repo.delete(id)?;
        Ok(())
    }

    fn require_business_hour(&self, business_hour_id: &str) -> ApiResult<()> {
        let schedule = self.get_schedule()?;
        if schedule.find(business_hour_id).is_none() {
            return Err(ApiError::NotFound(format!(
                "营业班次不存在: id={}",
                business_hour_id
            )));
        }
        Ok(())
    }
}
