// ==========================================
// 班产损失追踪系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite (本地) / HTTP (远程)
// 系统定位: 按产线、时段记录计划/实际产量, 欠产时强制填写损失原因
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 值对象与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{EntryId, ReportType};

// 领域实体
pub use domain::{DailySummary, LossRecord, ProductionEntry, RangeReport, ValidatedEntry};

// 引擎
pub use engine::{DailyAggregator, DraftEntry, ReportAggregator, SubmissionValidator};

// API
pub use api::{ApiError, EntryApi, SubmitOutcome};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "班产损失追踪系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
