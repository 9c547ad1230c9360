// ==========================================
// 班产损失追踪系统 - 生产记录数据仓储 (SQLite)
// ==========================================
// 依据: db.rs production_entry / loss_entry 表
// 红线: 记录与损失明细必须在同一事务内写入
// ==========================================

mod core;
mod queries;


pub use self::core::{SqliteEntryStore, MAX_REASON_LEN};

use crate::domain::entry::{ProductionEntry, ValidatedEntry};
use crate::domain::types::{EntryId, ReportType};
use crate::engine::ReportAggregator;
use crate::repository::entry_store::{EntryStore, StoreError, StoreResult};
use crate::repository::error::RepositoryError;
use crate::repository::report_csv::render_report_csv;
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use tracing::{info, instrument};

impl SqliteEntryStore {
    /// 生成报表内容 (CSV)
    ///
    /// # 参数
    /// - report_type: 报表类型
    /// - today: 基准日期
    #[instrument(skip(self))]
    pub fn render_report(&self, report_type: ReportType, today: NaiveDate) -> StoreResult<Vec<u8>> {
        let (start_date, end_date) = report_type.date_range(today);

        let entries = self
            .find_between(start_date, end_date)
            .map_err(|e| StoreError::from_repository("open_report", e))?;

        let report = ReportAggregator::new(self.config())
            .aggregate_range(start_date, end_date, &entries)
            .map_err(|e| StoreError::request_failed("open_report", e))?;

        let content =
            render_report_csv(&report).map_err(|e| StoreError::request_failed("open_report", e))?;

        info!(
            report_type = %report_type,
            %start_date,
            %end_date,
            entry_count = entries.len(),
            bytes = content.len(),
            "报表已生成"
        );
        Ok(content)
    }
}

#[async_trait]
impl EntryStore for SqliteEntryStore {
    async fn create_entry(&self, entry: &ValidatedEntry) -> StoreResult<Option<EntryId>> {
        self.insert_entry(entry, Local::now().naive_local())
            .map(Some)
            .map_err(|e| StoreError::from_repository("create_entry", e))
    }

    async fn update_entry(&self, id: EntryId, entry: &ValidatedEntry) -> StoreResult<()> {
        self.replace_entry(id, entry).map_err(|e| match e {
            RepositoryError::NotFound { .. } => StoreError::NotFound { id },
            other => StoreError::from_repository("update_entry", other),
        })
    }

    async fn get_entry(&self, id: EntryId) -> StoreResult<ProductionEntry> {
        self.find_by_id(id)
            .map_err(|e| StoreError::from_repository("get_entry", e))?
            .ok_or(StoreError::NotFound { id })
    }

    async fn list_today_entries(&self) -> StoreResult<Vec<ProductionEntry>> {
        self.find_by_date(Local::now().date_naive())
            .map_err(|e| StoreError::from_repository("list_today_entries", e))
    }

    async fn open_report(&self, report_type: ReportType) -> StoreResult<Vec<u8>> {
        self.render_report(report_type, Local::now().date_naive())
    }
}
