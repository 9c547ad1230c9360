// ==========================================
// 班产损失追踪系统 - 生产记录存储 Trait
// ==========================================
// 职责: 定义引擎所依赖的存储协作方接口
// 实现者: SqliteEntryStore（rusqlite）、HttpEntryStore（reqwest）
// 红线: 任一调用失败必须整体中止, 不允许部分写入
// ==========================================

use crate::domain::entry::{ProductionEntry, ValidatedEntry};
use crate::domain::types::{EntryId, ReportType};
use crate::repository::error::RepositoryError;
use async_trait::async_trait;
use thiserror::Error;

// ==========================================
// StoreError - 存储调用错误
// ==========================================
#[derive(Error, Debug)]
pub enum StoreError {
    /// 请求失败（非成功状态 / 传输错误 / 数据库错误）
    #[error("存储请求失败 (operation={operation}): {message}")]
    RequestFailed { operation: String, message: String },

    /// 指定记录不存在
    #[error("生产记录不存在: id={id}")]
    NotFound { id: EntryId },

    /// 返回数据不符合约定结构
    #[error("存储返回数据格式错误: {0}")]
    MalformedPayload(String),
}

impl StoreError {
    pub fn request_failed(operation: &str, message: impl ToString) -> Self {
        StoreError::RequestFailed {
            operation: operation.to_string(),
            message: message.to_string(),
        }
    }

    /// 将仓储层错误归入存储调用错误
    pub fn from_repository(operation: &str, err: RepositoryError) -> Self {
        Self::request_failed(operation, err)
    }
}

/// Result 类型别名
pub type StoreResult<T> = Result<T, StoreError>;

// ==========================================
// EntryStore Trait
// ==========================================
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// 新建记录
    ///
    /// # 返回
    /// - Ok(Some(EntryId)): 存储层分配的记录ID
    /// - Ok(None): 写入已提交, 但存储未回传记录ID
    async fn create_entry(&self, entry: &ValidatedEntry) -> StoreResult<Option<EntryId>>;

    /// 覆盖已有记录（字段与损失列表整体替换）
    async fn update_entry(&self, id: EntryId, entry: &ValidatedEntry) -> StoreResult<()>;

    /// 按ID读取记录（含损失列表）
    async fn get_entry(&self, id: EntryId) -> StoreResult<ProductionEntry>;

    /// 读取当日全部记录（按时段开始时间排序）
    async fn list_today_entries(&self) -> StoreResult<Vec<ProductionEntry>>;

    /// 打开报表（内容对引擎不透明）
    async fn open_report(&self, report_type: ReportType) -> StoreResult<Vec<u8>>;
}
