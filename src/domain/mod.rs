// ==========================================
// 班产损失追踪系统 - 领域模型层
// ==========================================
// 职责: 定义生产记录、损失记录、汇总结构等值对象
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod entry;
pub mod summary;
pub mod types;

// 重导出核心类型
pub use entry::{DatedEntry, LossRecord, LossRecordInput, ProductionEntry, ValidatedEntry};
pub use summary::{
    DailySummary, DayReport, LineReport, LineSummary, LossOccurrence, LossReasonSummary,
    RangeReport,
};
pub use types::{EntryId, ReportType, UnknownReportType};
