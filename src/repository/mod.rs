// ==========================================
// 班产损失追踪系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供生产记录存储接口, 屏蔽本地数据库 / 远程接口细节
// 约束: 所有查询使用参数化, 防止 SQL 注入
// ==========================================

pub mod dto;
pub mod entry_repo;
pub mod entry_store;
pub mod error;
pub mod http_store;
pub mod report_csv;

// 重导出核心仓储
pub use entry_repo::SqliteEntryStore;
pub use entry_store::{EntryStore, StoreError, StoreResult};
pub use error::{RepositoryError, RepositoryResult};
pub use http_store::HttpEntryStore;
