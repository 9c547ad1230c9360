// ==========================================
// 班产损失追踪系统 - 汇总领域模型
// ==========================================
// 职责: 当日汇总 / 区间报表的输出结构
// 红线: 只做数据承载, 聚合规则在 engine 层
// ==========================================

use crate::domain::entry::ProductionEntry;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// LossOccurrence - 单次损失发生
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LossOccurrence {
    pub from_time: String,
    pub to_time: String,
    pub time_range: String,      // "from-to"
    pub loss_time: u32,          // 本次损失时间 (分钟)
    pub remarks: Option<String>, // 备注
}

// ==========================================
// LossReasonSummary - 按损失原因汇总
// ==========================================
// 分组键: reason 精确匹配 (区分大小写)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LossReasonSummary {
    pub reason: String,
    pub total_time: u64,                  // 累计损失时间 (分钟)
    pub occurrences: Vec<LossOccurrence>, // 记录顺序 × 记录内顺序
}

// ==========================================
// LineSummary - 单产线当日汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineSummary {
    pub line_number: u32,
    pub total_planned: u64,
    pub total_actual: u64,
    pub total_loss_time: u64,
    pub entries: Vec<ProductionEntry>, // 保持存储层返回顺序
    pub loss_summary: Vec<LossReasonSummary>,
}

impl LineSummary {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ==========================================
// DailySummary - 当日汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySummary {
    pub lines: Vec<LineSummary>, // 按配置产线顺序
}

impl DailySummary {
    /// 按产线号查找
    pub fn line(&self, line_number: u32) -> Option<&LineSummary> {
        self.lines.iter().find(|l| l.line_number == line_number)
    }
}

// ==========================================
// 区间报表
// ==========================================

/// 单产线单日数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayReport {
    pub date: NaiveDate,
    pub planned: u64,
    pub actual: u64,
    pub total_loss_time: u64,
    pub losses: Vec<LossReasonSummary>,
}

/// 单产线区间数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineReport {
    pub line_number: u32,
    pub days: Vec<DayReport>, // 日期升序
}

/// 区间报表
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub lines: Vec<LineReport>,
}

impl RangeReport {
    pub fn line(&self, line_number: u32) -> Option<&LineReport> {
        self.lines.iter().find(|l| l.line_number == line_number)
    }
}
