use crate::config::EngineConfig;
use crate::domain::entry::{LossRecord, ValidatedEntry};
use crate::domain::types::EntryId;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDateTime, NaiveTime};
use rusqlite::{params, Connection, Transaction};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// 损失原因最大长度 (字符)
pub const MAX_REASON_LEN: usize = 50;

/// 记录时间存储格式
pub(super) const RECORDED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// SqliteEntryStore - 本地生产记录仓储
// ==========================================
// 红线: Repository 不做业务校验, 只做字段格式检查与数据映射
pub struct SqliteEntryStore {
    conn: Arc<Mutex<Connection>>,
    config: EngineConfig,
}

impl SqliteEntryStore {
    /// 创建新的生产记录仓储
    ///
    /// # 参数
    /// - conn: 已初始化 schema 的连接
    /// - config: 引擎配置 (报表产线范围)
    pub fn new(conn: Arc<Mutex<Connection>>, config: EngineConfig) -> Self {
        Self { conn, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 获取数据库连接
    pub(super) fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入生产记录及其损失明细（单事务）
    ///
    /// # 参数
    /// - entry: 已校验记录
    /// - recorded_at: 记录时间 (决定所属日期)
    ///
    /// # 返回
    /// - Ok(EntryId): 新记录ID
    pub fn insert_entry(
        &self,
        entry: &ValidatedEntry,
        recorded_at: NaiveDateTime,
    ) -> RepositoryResult<EntryId> {
        let row = EntryColumns::prepare(entry)?;

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute(
            r#"
            INSERT INTO production_entry (
                recorded_at, line_number, from_time, to_time,
                planned, actual, total_loss_time
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                recorded_at.format(RECORDED_AT_FORMAT).to_string(),
                entry.line_number,
                row.from_time,
                row.to_time,
                entry.planned,
                entry.actual,
                entry.total_loss_time(),
            ],
        )?;
        let id = EntryId(tx.last_insert_rowid());

        insert_losses(&tx, id, entry.losses())?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        info!(
            entry_id = %id,
            line_number = entry.line_number,
            loss_count = entry.losses().len(),
            "生产记录已保存"
        );
        Ok(id)
    }

    /// 覆盖生产记录（字段更新 + 损失明细整体替换, 单事务）
    ///
    /// recorded_at 保持不变
    pub fn replace_entry(&self, id: EntryId, entry: &ValidatedEntry) -> RepositoryResult<()> {
        let row = EntryColumns::prepare(entry)?;

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let updated = tx.execute(
            r#"
            UPDATE production_entry
            SET line_number = ?1, from_time = ?2, to_time = ?3,
                planned = ?4, actual = ?5, total_loss_time = ?6
            WHERE id = ?7
            "#,
            params![
                entry.line_number,
                row.from_time,
                row.to_time,
                entry.planned,
                entry.actual,
                entry.total_loss_time(),
                id.value(),
            ],
        )?;

        if updated == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ProductionEntry".to_string(),
                id: id.to_string(),
            });
        }

        let removed = tx.execute(
            "DELETE FROM loss_entry WHERE production_entry_id = ?1",
            params![id.value()],
        )?;
        insert_losses(&tx, id, entry.losses())?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        debug!(entry_id = %id, removed, inserted = entry.losses().len(), "损失明细已替换");
        info!(entry_id = %id, line_number = entry.line_number, "生产记录已更新");
        Ok(())
    }
}

/// 写入损失明细, seq_no 按录入顺序从 1 开始
fn insert_losses(tx: &Transaction<'_>, id: EntryId, losses: &[LossRecord]) -> RepositoryResult<()> {
    let mut stmt = tx.prepare(
        r#"
        INSERT INTO loss_entry (production_entry_id, seq_no, reason, loss_time, remarks)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )?;

    for (idx, loss) in losses.iter().enumerate() {
        stmt.execute(params![
            id.value(),
            (idx + 1) as i64,
            loss.reason,
            loss.loss_time,
            loss.remarks,
        ])?;
    }
    Ok(())
}

// ==========================================
// 字段格式检查
// ==========================================

/// 待写入的归一化字段
struct EntryColumns {
    from_time: String,
    to_time: String,
}

impl EntryColumns {
    fn prepare(entry: &ValidatedEntry) -> RepositoryResult<Self> {
        for loss in entry.losses() {
            check_reason_len(&loss.reason)?;
        }
        Ok(Self {
            from_time: normalize_time("from_time", &entry.from_time)?,
            to_time: normalize_time("to_time", &entry.to_time)?,
        })
    }
}

/// 时间归一化为 HH:MM
pub(crate) fn normalize_time(field: &str, raw: &str) -> RepositoryResult<String> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map(|t| t.format("%H:%M").to_string())
        .map_err(|e| RepositoryError::FieldValueError {
            field: field.to_string(),
            message: format!("时间格式应为 HH:MM, 实际为 '{}': {}", raw, e),
        })
}

fn check_reason_len(reason: &str) -> RepositoryResult<()> {
    let len = reason.chars().count();
    if len > MAX_REASON_LEN {
        return Err(RepositoryError::FieldValueError {
            field: "reason".to_string(),
            message: format!("损失原因长度 {} 超过上限 {}", len, MAX_REASON_LEN),
        });
    }
    Ok(())
}
