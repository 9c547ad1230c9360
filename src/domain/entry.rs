// ==========================================
// 班产损失追踪系统 - 生产记录领域模型
// ==========================================
// 职责: 生产记录、损失记录、已校验记录的值对象
// 红线: total_loss_time 只能由有效损失记录推导, 不可单独设置
// ==========================================

use crate::domain::types::EntryId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// LossRecord - 损失记录
// ==========================================
// 红线: reason 非空 (已 trim), loss_time > 0
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LossRecord {
    pub reason: String,          // 损失原因
    pub loss_time: u32,          // 损失时间 (分钟)
    pub remarks: Option<String>, // 备注 (trim 后为空视为无)
}

impl LossRecord {
    /// 构造损失记录, 对 reason/remarks 做 trim 归一化
    pub fn new(reason: &str, loss_time: u32, remarks: Option<&str>) -> Self {
        Self {
            reason: reason.trim().to_string(),
            loss_time,
            remarks: normalize_remarks(remarks),
        }
    }

    /// 是否满足有效损失记录的条件
    pub fn is_valid(&self) -> bool {
        !self.reason.trim().is_empty() && self.loss_time > 0
    }
}

/// 备注归一化: trim 后为空则返回 None
pub fn normalize_remarks(remarks: Option<&str>) -> Option<String> {
    remarks
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
}

/// 计算损失时间合计 (饱和加法)
pub fn sum_loss_time(losses: &[LossRecord]) -> u32 {
    losses
        .iter()
        .fold(0u32, |acc, loss| acc.saturating_add(loss.loss_time))
}

// ==========================================
// LossRecordInput - 损失行初始值
// ==========================================
// 用途: 新增草稿行时预填内容 (编辑已有记录时回填)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LossRecordInput {
    pub reason: String,
    pub loss_time: String,
    pub remarks: String,
}

impl LossRecordInput {
    pub fn new(reason: &str, loss_time: &str, remarks: &str) -> Self {
        Self {
            reason: reason.to_string(),
            loss_time: loss_time.to_string(),
            remarks: remarks.to_string(),
        }
    }
}

impl From<&LossRecord> for LossRecordInput {
    fn from(record: &LossRecord) -> Self {
        Self {
            reason: record.reason.clone(),
            loss_time: record.loss_time.to_string(),
            remarks: record.remarks.clone().unwrap_or_default(),
        }
    }
}

// ==========================================
// ProductionEntry - 生产记录
// ==========================================
// 一条记录 = 某产线某时段的计划/实际产量
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductionEntry {
    pub id: Option<EntryId>, // 存储层分配, 草稿为空
    pub line_number: u32,    // 产线号
    pub from_time: String,   // 时段开始 (对引擎不透明)
    pub to_time: String,     // 时段结束 (对引擎不透明)
    pub planned: u32,        // 计划产量
    pub actual: u32,         // 实际产量
    total_loss_time: u32,    // 损失时间合计 (分钟, 推导值)
    losses: Vec<LossRecord>, // 损失记录 (录入顺序)
}

impl ProductionEntry {
    /// 创建生产记录, total_loss_time 由 losses 推导
    pub fn new(
        id: Option<EntryId>,
        line_number: u32,
        from_time: impl Into<String>,
        to_time: impl Into<String>,
        planned: u32,
        actual: u32,
        losses: Vec<LossRecord>,
    ) -> Self {
        let total_loss_time = sum_loss_time(&losses);
        Self {
            id,
            line_number,
            from_time: from_time.into(),
            to_time: to_time.into(),
            planned,
            actual,
            total_loss_time,
            losses,
        }
    }

    pub fn losses(&self) -> &[LossRecord] {
        &self.losses
    }

    pub fn total_loss_time(&self) -> u32 {
        self.total_loss_time
    }

    /// 时段展示文本, 形如 "08:00-09:00"
    pub fn time_range(&self) -> String {
        format!("{}-{}", self.from_time, self.to_time)
    }
}

// ==========================================
// ValidatedEntry - 已通过提交校验的记录
// ==========================================
// 红线: 只能由 SubmissionValidator 构造
// losses 即有效损失记录, total_loss_time 即其合计
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedEntry {
    pub entry_id: Option<EntryId>,
    pub line_number: u32,
    pub from_time: String,
    pub to_time: String,
    pub planned: u32,
    pub actual: u32,
    total_loss_time: u32,
    losses: Vec<LossRecord>,
}

impl ValidatedEntry {
    pub(crate) fn new(
        entry_id: Option<EntryId>,
        line_number: u32,
        from_time: String,
        to_time: String,
        planned: u32,
        actual: u32,
        losses: Vec<LossRecord>,
    ) -> Self {
        let total_loss_time = sum_loss_time(&losses);
        Self {
            entry_id,
            line_number,
            from_time,
            to_time,
            planned,
            actual,
            total_loss_time,
            losses,
        }
    }

    pub fn losses(&self) -> &[LossRecord] {
        &self.losses
    }

    pub fn total_loss_time(&self) -> u32 {
        self.total_loss_time
    }

    /// 转换为已持久化的生产记录
    pub fn into_entry(self, id: EntryId) -> ProductionEntry {
        ProductionEntry {
            id: Some(id),
            line_number: self.line_number,
            from_time: self.from_time,
            to_time: self.to_time,
            planned: self.planned,
            actual: self.actual,
            total_loss_time: self.total_loss_time,
            losses: self.losses,
        }
    }
}

// ==========================================
// DatedEntry - 带记录日期的生产记录
// ==========================================
// 用途: 区间报表按日期分组
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatedEntry {
    pub recorded_on: NaiveDate,
    pub entry: ProductionEntry,
}
