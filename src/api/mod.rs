// ==========================================
// 班产损失追踪系统 - API 层
// ==========================================
// 职责: 组合引擎与存储, 对外提供生产记录业务接口
// ==========================================

pub mod entry_api;
pub mod error;

// 重导出核心类型
pub use entry_api::{EntryApi, SubmitOutcome};
pub use error::{ApiError, ApiResult, ErrorResponse};
