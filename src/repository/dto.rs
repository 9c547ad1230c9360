// ==========================================
// 班产损失追踪系统 - 存储线格式 DTO
// ==========================================
// 职责: 远程存储请求/响应的 JSON 结构与领域对象互转
// 红线: 入站记录的 total_loss_time 一律按损失列表重算
// ==========================================

use crate::domain::entry::{LossRecord, ProductionEntry, ValidatedEntry};
use crate::domain::types::EntryId;
use crate::repository::entry_store::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use tracing::warn;

// ==========================================
// 出站结构
// ==========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LossPayload {
    pub reason: String,
    pub loss_time: u32,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl From<&LossRecord> for LossPayload {
    fn from(record: &LossRecord) -> Self {
        Self {
            reason: record.reason.clone(),
            loss_time: record.loss_time,
            remarks: record.remarks.clone(),
        }
    }
}

/// 新建/覆盖记录的请求体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryPayload {
    pub line_number: u32,
    pub from_time: String,
    pub to_time: String,
    pub planned: u32,
    pub actual: u32,
    pub total_loss_time: u32,
    pub losses: Vec<LossPayload>,
}

impl From<&ValidatedEntry> for EntryPayload {
    fn from(entry: &ValidatedEntry) -> Self {
        Self {
            line_number: entry.line_number,
            from_time: entry.from_time.clone(),
            to_time: entry.to_time.clone(),
            planned: entry.planned,
            actual: entry.actual,
            total_loss_time: entry.total_loss_time(),
            losses: entry.losses().iter().map(LossPayload::from).collect(),
        }
    }
}

// ==========================================
// 入站结构
// ==========================================

/// 存储返回的单条记录
#[derive(Debug, Clone, Deserialize)]
pub struct EntryRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub line_number: u32,
    pub from_time: String,
    pub to_time: String,
    pub planned: u32,
    pub actual: u32,
    #[serde(default)]
    pub total_loss_time: Option<u32>,
    #[serde(default)]
    pub losses: Vec<LossPayload>,
}

/// 新建记录的响应体
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedResponse {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl TryFrom<EntryRecord> for ProductionEntry {
    type Error = StoreError;

    fn try_from(record: EntryRecord) -> Result<Self, Self::Error> {
        let losses = record
            .losses
            .iter()
            .map(|loss| {
                let converted = LossRecord::new(&loss.reason, loss.loss_time, loss.remarks.as_deref());
                if converted.is_valid() {
                    Ok(converted)
                } else {
                    Err(StoreError::MalformedPayload(format!(
                        "损失记录无效: reason='{}', loss_time={}",
                        loss.reason, loss.loss_time
                    )))
                }
            })
            .collect::<StoreResult<Vec<_>>>()?;

        let entry = ProductionEntry::new(
            record.id.map(EntryId),
            record.line_number,
            record.from_time,
            record.to_time,
            record.planned,
            record.actual,
            losses,
        );

        if let Some(reported) = record.total_loss_time {
            if reported != entry.total_loss_time() {
                warn!(
                    entry_id = ?entry.id,
                    reported,
                    derived = entry.total_loss_time(),
                    "存储返回的损失合计与明细不一致, 以明细为准"
                );
            }
        }

        Ok(entry)
    }
}

// ==========================================
// 解码辅助
// ==========================================

fn malformed(err: serde_json::Error) -> StoreError {
    StoreError::MalformedPayload(err.to_string())
}

/// 解码新建响应中的记录ID
///
/// 调用时写入已成功, 响应缺少 id 或无法解析只记录告警并返回 None
pub fn decode_created_id(body: &[u8]) -> Option<EntryId> {
    match serde_json::from_slice::<CreatedResponse>(body) {
        Ok(CreatedResponse { id: Some(id), .. }) => Some(EntryId(id)),
        Ok(CreatedResponse { id: None, message }) => {
            warn!(?message, "新建响应未包含记录ID");
            None
        }
        Err(e) => {
            warn!(error = %e, "新建响应无法解析");
            None
        }
    }
}

/// 解码单条记录
pub fn decode_entry(body: &[u8]) -> StoreResult<ProductionEntry> {
    let record: EntryRecord = serde_json::from_slice(body).map_err(malformed)?;
    ProductionEntry::try_from(record)
}

/// 解码记录列表 (每条必须带 id)
pub fn decode_entry_list(body: &[u8]) -> StoreResult<Vec<ProductionEntry>> {
    let records: Vec<EntryRecord> = serde_json::from_slice(body).map_err(malformed)?;
    records
        .into_iter()
        .map(|record| {
            if record.id.is_none() {
                return Err(StoreError::MalformedPayload(format!(
                    "记录缺少 id: line_number={}, time_range={}-{}",
                    record.line_number, record.from_time, record.to_time
                )));
            }
            ProductionEntry::try_from(record)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_entry_recomputes_total() {
        let body = br#"{
            "id": 7, "line_number": 1, "from_time": "08:00", "to_time": "09:00",
            "planned": 10, "actual": 8, "total_loss_time": 99,
            "losses": [{"reason": "Jam", "loss_time": 5, "remarks": ""}]
        }"#;
        let entry = decode_entry(body).unwrap();
        assert_eq!(entry.id, Some(EntryId(7)));
        assert_eq!(entry.total_loss_time(), 5);
        assert_eq!(entry.losses()[0].remarks, None);
    }

    #[test]
    fn test_decode_entry_rejects_invalid_loss() {
        let body = br#"{
            "id": 7, "line_number": 1, "from_time": "08:00", "to_time": "09:00",
            "planned": 10, "actual": 8,
            "losses": [{"reason": "  ", "loss_time": 5}]
        }"#;
        assert!(matches!(decode_entry(body), Err(StoreError::MalformedPayload(_))));
    }

    #[test]
    fn test_decode_list_requires_id() {
        let body = br#"[{"line_number": 1, "from_time": "08:00", "to_time": "09:00",
                         "planned": 10, "actual": 10}]"#;
        assert!(matches!(decode_entry_list(body), Err(StoreError::MalformedPayload(_))));
    }

    #[test]
    fn test_decode_created_id() {
        assert_eq!(decode_created_id(br#"{"id": 42}"#), Some(EntryId(42)));
        assert_eq!(
            decode_created_id(br#"{"message": "Entry added successfully"}"#),
            None
        );
        assert_eq!(decode_created_id(b"not json"), None);
    }
}
