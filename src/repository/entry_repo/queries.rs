use super::core::SqliteEntryStore;
use crate::domain::entry::{DatedEntry, LossRecord, ProductionEntry};
use crate::domain::types::EntryId;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::collections::HashMap;
use tracing::warn;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// production_entry 行 (不含损失明细)
struct EntryRow {
    id: i64,
    recorded_on: String,
    line_number: u32,
    from_time: String,
    to_time: String,
    planned: u32,
    actual: u32,
    total_loss_time: u32,
}

const ENTRY_COLUMNS: &str = r#"
    SELECT id, date(recorded_at), line_number, from_time, to_time,
           planned, actual, total_loss_time
    FROM production_entry
"#;

impl SqliteEntryStore {
    // ==========================================
    // 查询操作
    // ==========================================

    /// 按ID查询生产记录
    pub fn find_by_id(&self, id: EntryId) -> RepositoryResult<Option<ProductionEntry>> {
        let conn = self.get_conn()?;

        let sql = format!("{} WHERE id = ?1", ENTRY_COLUMNS);
        let row = match conn.query_row(&sql, params![id.value()], map_entry_row) {
            Ok(row) => row,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut losses = load_losses(&conn, "WHERE l.production_entry_id = ?1", params![id.value()])?;
        Ok(Some(assemble(row, &mut losses).1))
    }

    /// 查询指定日期的生产记录
    ///
    /// 排序: from_time 升序, 同一时段按 id 升序
    pub fn find_by_date(&self, date: NaiveDate) -> RepositoryResult<Vec<ProductionEntry>> {
        Ok(self
            .query_range(date, date, "from_time, id")?
            .into_iter()
            .map(|dated| dated.entry)
            .collect())
    }

    /// 查询日期区间内的生产记录 (闭区间)
    ///
    /// 排序: 录入时间升序 (即录入顺序), 与时段先后无关
    pub fn find_between(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> RepositoryResult<Vec<DatedEntry>> {
        self.query_range(start_date, end_date, "recorded_at, id")
    }

    fn query_range(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        order_by: &str,
    ) -> RepositoryResult<Vec<DatedEntry>> {
        let start = start_date.format(DATE_FORMAT).to_string();
        let end = end_date.format(DATE_FORMAT).to_string();

        let conn = self.get_conn()?;

        let sql = format!(
            "{} WHERE date(recorded_at) BETWEEN ?1 AND ?2 ORDER BY {}",
            ENTRY_COLUMNS, order_by
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![start, end], map_entry_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        let mut losses = load_losses(
            &conn,
            "JOIN production_entry p ON p.id = l.production_entry_id \
             WHERE date(p.recorded_at) BETWEEN ?1 AND ?2",
            params![start, end],
        )?;

        rows.into_iter()
            .map(|row| {
                let (recorded_on, entry) = assemble(row, &mut losses);
                let recorded_on = NaiveDate::parse_from_str(&recorded_on, DATE_FORMAT).map_err(
                    |e| RepositoryError::FieldValueError {
                        field: "recorded_at".to_string(),
                        message: format!("'{}': {}", recorded_on, e),
                    },
                )?;
                Ok(DatedEntry { recorded_on, entry })
            })
            .collect()
    }
}

fn map_entry_row(row: &Row) -> SqliteResult<EntryRow> {
    Ok(EntryRow {
        id: row.get(0)?,
        recorded_on: row.get(1)?,
        line_number: row.get(2)?,
        from_time: row.get(3)?,
        to_time: row.get(4)?,
        planned: row.get(5)?,
        actual: row.get(6)?,
        total_loss_time: row.get(7)?,
    })
}

/// 加载损失明细, 按记录ID分组, 组内按 seq_no 排序
fn load_losses<P: rusqlite::Params>(
    conn: &Connection,
    filter: &str,
    params: P,
) -> RepositoryResult<HashMap<i64, Vec<LossRecord>>> {
    let sql = format!(
        "SELECT l.production_entry_id, l.reason, l.loss_time, l.remarks \
         FROM loss_entry l {} ORDER BY l.production_entry_id, l.seq_no",
        filter
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params, |row| {
            let entry_id: i64 = row.get(0)?;
            let reason: String = row.get(1)?;
            let loss_time: u32 = row.get(2)?;
            let remarks: Option<String> = row.get(3)?;
            Ok((entry_id, LossRecord::new(&reason, loss_time, remarks.as_deref())))
        })?
        .collect::<SqliteResult<Vec<_>>>()?;

    let mut grouped: HashMap<i64, Vec<LossRecord>> = HashMap::new();
    for (entry_id, record) in rows {
        grouped.entry(entry_id).or_default().push(record);
    }
    Ok(grouped)
}

fn assemble(row: EntryRow, losses: &mut HashMap<i64, Vec<LossRecord>>) -> (String, ProductionEntry) {
    let entry = ProductionEntry::new(
        Some(EntryId(row.id)),
        row.line_number,
        row.from_time,
        row.to_time,
        row.planned,
        row.actual,
        losses.remove(&row.id).unwrap_or_default(),
    );

    if entry.total_loss_time() != row.total_loss_time {
        warn!(
            entry_id = row.id,
            stored = row.total_loss_time,
            derived = entry.total_loss_time(),
            "损失合计与明细不一致, 以明细为准"
        );
    }

    (row.recorded_on, entry)
}
