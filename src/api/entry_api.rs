// ==========================================
// 班产损失追踪系统 - 生产记录 API
// ==========================================
// 职责: 组合引擎与存储, 对外提供 提交 / 回填编辑 / 当日汇总 / 报表 操作
// 红线: 先校验后写入, 校验失败不触发任何存储调用
// 红线: 同一草稿同一时刻只允许一个提交在途
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::EngineConfig;
use crate::domain::summary::DailySummary;
use crate::domain::types::{EntryId, ReportType};
use crate::engine::{DailyAggregator, DraftEntry, SubmissionValidator};
use crate::repository::entry_store::EntryStore;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, instrument, warn};
use uuid::Uuid;

// ==========================================
// SubmitOutcome - 提交结果
// ==========================================
// Created(None): 写入已提交, 但存储未回传记录ID (不得重试)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(Option<EntryId>),
    Updated(EntryId),
}

impl SubmitOutcome {
    pub fn entry_id(&self) -> Option<EntryId> {
        match self {
            SubmitOutcome::Created(id) => *id,
            SubmitOutcome::Updated(id) => Some(*id),
        }
    }
}

// ==========================================
// EntryApi
// ==========================================
pub struct EntryApi {
    store: Arc<dyn EntryStore>,
    validator: SubmissionValidator,
    aggregator: DailyAggregator,
    in_flight: Mutex<HashSet<Uuid>>,
}

impl EntryApi {
    /// 创建新的 EntryApi 实例
    ///
    /// # 参数
    /// - store: 存储实现 (本地 SQLite 或远程 HTTP)
    /// - config: 引擎配置
    pub fn new(store: Arc<dyn EntryStore>, config: &EngineConfig) -> Self {
        Self {
            store,
            validator: SubmissionValidator::new(),
            aggregator: DailyAggregator::new(config),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// 提交草稿
    ///
    /// 草稿无记录ID时新建, 否则覆盖原记录。失败时草稿保持原样,
    /// 成功后由调用方自行清空表单。
    ///
    /// # 返回
    /// - Ok(SubmitOutcome): 新建/更新后的记录ID (新建时存储可能不回传ID)
    /// - Err(ApiError::Validation): 欠产但未填写有效损失原因
    /// - Err(ApiError::SubmissionInFlight): 该草稿已有提交在途
    #[instrument(skip(self, draft), fields(draft_id = %draft.draft_id(), line = draft.line_number))]
    pub async fn submit(&self, draft: &DraftEntry) -> ApiResult<SubmitOutcome> {
        let _guard = InFlightGuard::acquire(&self.in_flight, draft.draft_id())?;

        let validated = self.validator.validate_for_submit(draft)?;

        let outcome = match validated.entry_id {
            None => SubmitOutcome::Created(self.store.create_entry(&validated).await?),
            Some(id) => {
                self.store.update_entry(id, &validated).await?;
                SubmitOutcome::Updated(id)
            }
        };

        info!(
            entry_id = ?outcome.entry_id(),
            total_loss_time = validated.total_loss_time(),
            outcome = ?outcome,
            "生产记录提交成功"
        );
        Ok(outcome)
    }

    /// 读取记录并回填为可编辑草稿
    #[instrument(skip(self))]
    pub async fn load_for_edit(&self, id: EntryId) -> ApiResult<DraftEntry> {
        let entry = self.store.get_entry(id).await?;
        Ok(DraftEntry::from_entry(&entry))
    }

    /// 当日汇总
    ///
    /// 存储或校验任一失败则整体失败, 不返回部分汇总
    #[instrument(skip(self))]
    pub async fn daily_summary(&self) -> ApiResult<DailySummary> {
        let entries = self.store.list_today_entries().await?;
        let summary = self.aggregator.aggregate(&entries)?;

        info!(
            entry_count = entries.len(),
            line_count = summary.lines.len(),
            "当日汇总已刷新"
        );
        Ok(summary)
    }

    /// 打开报表
    ///
    /// # 参数
    /// - tag: 报表类型标签 ("daily" / "weekly")
    pub async fn open_report(&self, tag: &str) -> ApiResult<Vec<u8>> {
        let report_type: ReportType = tag.parse()?;
        self.open_report_type(report_type).await
    }

    #[instrument(skip(self))]
    pub async fn open_report_type(&self, report_type: ReportType) -> ApiResult<Vec<u8>> {
        let content = self.store.open_report(report_type).await?;
        info!(report_type = %report_type, bytes = content.len(), "报表已打开");
        Ok(content)
    }
}

// ==========================================
// InFlightGuard - 在途提交标记
// ==========================================
// 离开作用域时移除标记 (成功/失败/取消均适用)
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<Uuid>>,
    draft_id: Uuid,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(set: &'a Mutex<HashSet<Uuid>>, draft_id: Uuid) -> ApiResult<Self> {
        let mut ids = set
            .lock()
            .map_err(|e| ApiError::InternalError(format!("锁获取失败: {}", e)))?;

        if !ids.insert(draft_id) {
            warn!(%draft_id, "重复提交被拒绝");
            return Err(ApiError::SubmissionInFlight { draft_id });
        }

        Ok(Self { set, draft_id })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut ids: MutexGuard<'_, HashSet<Uuid>> = match self.set.lock() {
            Ok(ids) => ids,
            Err(poisoned) => poisoned.into_inner(),
        };
        ids.remove(&self.draft_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entry::{LossRecordInput, ProductionEntry, ValidatedEntry};
    use crate::engine::error::ValidationError;
    use crate::repository::entry_store::{StoreError, StoreResult};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::{Notify, Semaphore};

    /// 内存存储, create_entry 可被闸门阻塞
    #[derive(Default)]
    struct MemoryStore {
        entries: Mutex<HashMap<i64, ProductionEntry>>,
        next_id: AtomicUsize,
        writes: AtomicUsize,
        gate: Option<Arc<Semaphore>>,
        started: Arc<Notify>,
        omit_ids: bool,
    }

    impl MemoryStore {
        fn gated(gate: Arc<Semaphore>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl EntryStore for MemoryStore {
        async fn create_entry(&self, entry: &ValidatedEntry) -> StoreResult<Option<EntryId>> {
            self.started.notify_one();
            if let Some(gate) = &self.gate {
                let _permit = gate.acquire().await.unwrap();
            }
            self.writes.fetch_add(1, Ordering::SeqCst);
            let id = EntryId(self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1);
            self.entries
                .lock()
                .unwrap()
                .insert(id.value(), entry.clone().into_entry(id));
            Ok(if self.omit_ids { None } else { Some(id) })
        }

        async fn update_entry(&self, id: EntryId, entry: &ValidatedEntry) -> StoreResult<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            let mut entries = self.entries.lock().unwrap();
            if !entries.contains_key(&id.value()) {
                return Err(StoreError::NotFound { id });
            }
            entries.insert(id.value(), entry.clone().into_entry(id));
            Ok(())
        }

        async fn get_entry(&self, id: EntryId) -> StoreResult<ProductionEntry> {
            self.entries
                .lock()
                .unwrap()
                .get(&id.value())
                .cloned()
                .ok_or(StoreError::NotFound { id })
        }

        async fn list_today_entries(&self) -> StoreResult<Vec<ProductionEntry>> {
            let mut entries: Vec<_> = self.entries.lock().unwrap().values().cloned().collect();
            entries.sort_by_key(|e| e.id);
            Ok(entries)
        }

        async fn open_report(&self, report_type: ReportType) -> StoreResult<Vec<u8>> {
            Ok(report_type.as_str().as_bytes().to_vec())
        }
    }

    fn api_with(store: Arc<MemoryStore>) -> EntryApi {
        EntryApi::new(store, &EngineConfig::default())
    }

    fn draft(line: u32, planned: &str, actual: &str) -> DraftEntry {
        let mut draft = DraftEntry::new(line);
        draft.from_time = "08:00".to_string();
        draft.to_time = "09:00".to_string();
        draft.set_planned(planned);
        draft.set_actual(actual);
        draft
    }

    #[tokio::test]
    async fn test_submit_missing_justification_writes_nothing() {
        let store = Arc::new(MemoryStore::default());
        let api = api_with(store.clone());

        let err = api.submit(&draft(1, "10", "5")).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Validation(ValidationError::MissingLossJustification)
        ));
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_submit_creates_then_updates() {
        let store = Arc::new(MemoryStore::default());
        let api = api_with(store.clone());

        let mut form = draft(1, "10", "3");
        form.add_loss_row(Some(LossRecordInput::new("Jam", "7", "")));
        let created = api.submit(&form).await.unwrap();
        assert!(matches!(created, SubmitOutcome::Created(Some(_))));
        let id = created.entry_id().unwrap();

        let mut editing = api.load_for_edit(id).await.unwrap();
        assert_eq!(editing.entry_id, Some(id));
        assert_eq!(editing.losses().len(), 1);

        editing.set_actual("10");
        assert!(editing.losses().is_empty());
        let updated = api.submit(&editing).await.unwrap();
        assert_eq!(updated, SubmitOutcome::Updated(id));

        let stored = store.get_entry(id).await.unwrap();
        assert!(stored.losses().is_empty());
        assert_eq!(stored.total_loss_time(), 0);
    }

    #[tokio::test]
    async fn test_submit_committed_without_id_is_success() {
        let store = Arc::new(MemoryStore {
            omit_ids: true,
            ..MemoryStore::default()
        });
        let api = api_with(store.clone());

        let outcome = api.submit(&draft(1, "5", "5")).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Created(None));
        assert_eq!(outcome.entry_id(), None);
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_load_for_edit_missing_entry() {
        let api = api_with(Arc::new(MemoryStore::default()));
        let err = api.load_for_edit(EntryId(99)).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(EntryId(99))));
    }

    #[tokio::test]
    async fn test_daily_summary_rejects_unknown_line() {
        let store = Arc::new(MemoryStore::default());
        let api = api_with(store.clone());

        api.submit(&draft(1, "5", "5")).await.unwrap();
        api.submit(&draft(3, "5", "5")).await.unwrap();

        let err = api.daily_summary().await.unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_LINE");
    }

    #[tokio::test]
    async fn test_open_report_parses_tag() {
        let api = api_with(Arc::new(MemoryStore::default()));
        assert_eq!(api.open_report(" Weekly ").await.unwrap(), b"weekly".to_vec());
        assert!(matches!(
            api.open_report("monthly").await,
            Err(ApiError::UnknownReportType(_))
        ));
    }

    #[tokio::test]
    async fn test_second_submit_of_same_draft_rejected_while_in_flight() {
        let gate = Arc::new(Semaphore::new(0));
        let store = Arc::new(MemoryStore::gated(gate.clone()));
        let started = store.started.clone();
        let api = Arc::new(api_with(store.clone()));

        let form = draft(2, "8", "8");
        let first = {
            let api = api.clone();
            let form = form.clone();
            tokio::spawn(async move { api.submit(&form).await })
        };
        started.notified().await;

        let err = api.submit(&form).await.unwrap_err();
        assert!(matches!(err, ApiError::SubmissionInFlight { draft_id } if draft_id == form.draft_id()));

        gate.add_permits(2);
        let outcome = first.await.unwrap().unwrap();
        assert!(matches!(outcome, SubmitOutcome::Created(_)));
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);

        // 标记已释放, 同一草稿可再次提交
        assert!(api.submit(&form).await.is_ok());
    }
}
