// ==========================================
// 班产损失追踪系统 - 远程生产记录存储 (HTTP)
// ==========================================
// 职责: 通过 HTTP/JSON 接口实现 EntryStore
// 接口:
// - POST /api/entry            新建, 响应 {"id": ...} (id 可缺省)
// - PUT  /api/entry/{id}       覆盖
// - GET  /api/entry/{id}       读取单条
// - GET  /api/daily-report     当日记录列表
// - GET  /api/report/{type}    报表内容
// 红线: 非 2xx 一律视为失败, 不做重试
// 红线: 新建返回 2xx 即视为已提交
// ==========================================

use crate::domain::entry::{ProductionEntry, ValidatedEntry};
use crate::domain::types::{EntryId, ReportType};
use crate::repository::dto::{decode_created_id, decode_entry, decode_entry_list, EntryPayload};
use crate::repository::entry_store::{EntryStore, StoreError, StoreResult};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};

/// 请求超时
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct HttpEntryStore {
    http: reqwest::Client,
    base_url: String,
}

impl HttpEntryStore {
    pub fn new(base_url: &str) -> StoreResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| StoreError::request_failed("build_client", e))?;

        Ok(Self {
            http,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn entry_url(&self) -> String {
        format!("{}/api/entry", self.base_url)
    }

    pub(crate) fn entry_id_url(&self, id: EntryId) -> String {
        format!("{}/api/entry/{}", self.base_url, id)
    }

    pub(crate) fn daily_report_url(&self) -> String {
        format!("{}/api/daily-report", self.base_url)
    }

    pub(crate) fn report_url(&self, report_type: ReportType) -> String {
        format!("{}/api/report/{}", self.base_url, report_type.as_str())
    }

    /// 发送请求并读取响应体
    ///
    /// # 参数
    /// - operation: 操作名 (错误上下文)
    /// - request: 已构造的请求
    /// - entry_id: 按ID访问时传入, 404 映射为 NotFound
    async fn execute(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
        entry_id: Option<EntryId>,
    ) -> StoreResult<Vec<u8>> {
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::request_failed(operation, e))?;

        let status = response.status();
        if !status.is_success() {
            if let (StatusCode::NOT_FOUND, Some(id)) = (status, entry_id) {
                return Err(StoreError::NotFound { id });
            }
            let body = response.text().await.unwrap_or_default();
            warn!(operation, status = status.as_u16(), "远程存储返回失败状态");
            return Err(StoreError::request_failed(
                operation,
                format!("HTTP {}: {}", status.as_u16(), body),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| StoreError::request_failed(operation, e))?;
        debug!(operation, bytes = body.len(), "远程存储响应已接收");
        Ok(body.to_vec())
    }
}

#[async_trait]
impl EntryStore for HttpEntryStore {
    async fn create_entry(&self, entry: &ValidatedEntry) -> StoreResult<Option<EntryId>> {
        let request = self.http.post(self.entry_url()).json(&EntryPayload::from(entry));
        let body = self.execute("create_entry", request, None).await?;
        // 2xx 即已落库, 响应体解析失败也不能报告为写入失败
        Ok(decode_created_id(&body))
    }

    async fn update_entry(&self, id: EntryId, entry: &ValidatedEntry) -> StoreResult<()> {
        let request = self.http.put(self.entry_id_url(id)).json(&EntryPayload::from(entry));
        self.execute("update_entry", request, Some(id)).await?;
        Ok(())
    }

    async fn get_entry(&self, id: EntryId) -> StoreResult<ProductionEntry> {
        let request = self.http.get(self.entry_id_url(id));
        let body = self.execute("get_entry", request, Some(id)).await?;
        let mut entry = decode_entry(&body)?;
        // 响应省略 id 时以请求路径为准
        entry.id.get_or_insert(id);
        Ok(entry)
    }

    async fn list_today_entries(&self) -> StoreResult<Vec<ProductionEntry>> {
        let request = self.http.get(self.daily_report_url());
        let body = self.execute("list_today_entries", request, None).await?;
        decode_entry_list(&body)
    }

    async fn open_report(&self, report_type: ReportType) -> StoreResult<Vec<u8>> {
        let request = self.http.get(self.report_url(report_type));
        self.execute("open_report", request, None).await
    }
}
