// ==========================================
// 班产损失追踪系统 - 引擎层
// ==========================================
// 职责: 损失核算规则 (欠产判定、草稿损失行、提交校验、汇总)
// 红线: Engine 不访问存储, 不触碰界面状态, 只接收/返回值对象
// ==========================================

pub mod aggregator;
pub mod deficiency;
pub mod draft;
pub mod error;
pub mod report;
pub mod submission;

// 重导出核心引擎
pub use aggregator::DailyAggregator;
pub use deficiency::{coerce_count, is_deficient, is_deficient_raw, parse_leading_int};
pub use draft::{DraftEntry, DraftLossSet, LossRowDraft, RowHandle};
pub use error::{ValidationError, ValidationResult};
pub use report::ReportAggregator;
pub use submission::SubmissionValidator;
