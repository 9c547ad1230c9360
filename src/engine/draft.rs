// ==========================================
// 班产损失追踪系统 - 草稿损失行管理
// ==========================================
// 职责: 维护表单中正在编辑的损失行, 计算展示用合计, 过滤有效损失记录
// 输入: 表现层的原始输入 (文本)
// 输出: 有效损失记录 (LossRecord)
// ==========================================
// 红线: 欠产 -> 不欠产 时必须清空全部损失行, 合计归零
// 红线: 欠产且损失行为空时, 自动补一条空行
// ==========================================

use crate::domain::entry::{LossRecord, LossRecordInput, ProductionEntry};
use crate::domain::types::EntryId;
use crate::engine::deficiency::{coerce_count, is_deficient, parse_leading_int};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ==========================================
// RowHandle - 损失行句柄
// ==========================================
// 用途: 表现层定位某一行的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowHandle(Uuid);

impl RowHandle {
    fn generate() -> Self {
        RowHandle(Uuid::new_v4())
    }
}

impl fmt::Display for RowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ==========================================
// LossRowDraft - 损失草稿行
// ==========================================
// 三个字段均为原始文本, 提交时才做过滤
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LossRowDraft {
    pub reason: String,
    pub loss_time: String,
    pub remarks: String,
}

impl LossRowDraft {
    /// 解析损失时间, 空值或无法解析视为 0
    pub fn parsed_loss_time(&self) -> i64 {
        parse_leading_int(&self.loss_time).unwrap_or(0)
    }

    /// 转换为有效损失记录
    ///
    /// # 返回
    /// - Some: reason trim 后非空 且 loss_time > 0
    /// - None: 不完整的草稿行
    pub fn to_valid_record(&self) -> Option<LossRecord> {
        let reason = self.reason.trim();
        let loss_time = self.parsed_loss_time();
        if reason.is_empty() || loss_time <= 0 {
            return None;
        }
        let loss_time = u32::try_from(loss_time).unwrap_or(u32::MAX);
        Some(LossRecord::new(reason, loss_time, Some(&self.remarks)))
    }
}

impl From<LossRecordInput> for LossRowDraft {
    fn from(input: LossRecordInput) -> Self {
        Self {
            reason: input.reason,
            loss_time: input.loss_time,
            remarks: input.remarks,
        }
    }
}

// ==========================================
// DraftLossSet - 草稿损失行集合
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct DraftLossSet {
    rows: Vec<(RowHandle, LossRowDraft)>,
}

impl DraftLossSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一行, 可选预填内容
    pub fn add_row(&mut self, initial: Option<LossRecordInput>) -> RowHandle {
        let handle = RowHandle::generate();
        let row = initial.map(LossRowDraft::from).unwrap_or_default();
        self.rows.push((handle, row));
        handle
    }

    /// 删除一行
    ///
    /// # 返回
    /// - Some: 被删除的行
    /// - None: 句柄不存在
    pub fn remove_row(&mut self, handle: RowHandle) -> Option<LossRowDraft> {
        let idx = self.rows.iter().position(|(h, _)| *h == handle)?;
        Some(self.rows.remove(idx).1)
    }

    pub fn row(&self, handle: RowHandle) -> Option<&LossRowDraft> {
        self.rows.iter().find(|(h, _)| *h == handle).map(|(_, r)| r)
    }

    pub fn row_mut(&mut self, handle: RowHandle) -> Option<&mut LossRowDraft> {
        self.rows
            .iter_mut()
            .find(|(h, _)| *h == handle)
            .map(|(_, r)| r)
    }

    /// 全部句柄 (展示顺序)
    pub fn handles(&self) -> Vec<RowHandle> {
        self.rows.iter().map(|(h, _)| *h).collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = &LossRowDraft> {
        self.rows.iter().map(|(_, r)| r)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// 计算展示用合计
    ///
    /// 包含所有行 (含不完整行), 无法解析的损失时间按 0 计。
    /// 与提交时的 total_loss_time 不同, 后者只统计有效行。
    pub fn recompute_total(&self) -> i64 {
        self.rows
            .iter()
            .map(|(_, r)| r.parsed_loss_time())
            .fold(0i64, i64::saturating_add)
    }

    /// 过滤出有效损失记录 (即最终提交与合计的集合)
    pub fn to_valid_records(&self) -> Vec<LossRecord> {
        self.rows
            .iter()
            .filter_map(|(_, r)| r.to_valid_record())
            .collect()
    }
}

// ==========================================
// DraftEntry - 生产记录草稿 (表单状态)
// ==========================================
// 归表现层所有; 引擎只读取其快照
#[derive(Debug, Clone)]
pub struct DraftEntry {
    draft_id: Uuid,
    pub entry_id: Option<EntryId>,
    pub line_number: u32,
    pub from_time: String,
    pub to_time: String,
    planned: String,
    actual: String,
    losses: DraftLossSet,
}

impl DraftEntry {
    /// 创建空白草稿
    pub fn new(line_number: u32) -> Self {
        Self {
            draft_id: Uuid::new_v4(),
            entry_id: None,
            line_number,
            from_time: String::new(),
            to_time: String::new(),
            planned: String::new(),
            actual: String::new(),
            losses: DraftLossSet::new(),
        }
    }

    /// 将已持久化记录回填为草稿 (编辑)
    ///
    /// - 保留记录ID
    /// - 欠产: 按原顺序回填损失行; 无损失记录时补一条空行
    /// - 不欠产: 不回填损失行
    pub fn from_entry(entry: &ProductionEntry) -> Self {
        let mut draft = Self {
            draft_id: Uuid::new_v4(),
            entry_id: entry.id,
            line_number: entry.line_number,
            from_time: entry.from_time.clone(),
            to_time: entry.to_time.clone(),
            planned: entry.planned.to_string(),
            actual: entry.actual.to_string(),
            losses: DraftLossSet::new(),
        };

        if is_deficient(entry.planned, entry.actual) {
            if entry.losses().is_empty() {
                draft.losses.add_row(None);
            } else {
                for loss in entry.losses() {
                    draft.losses.add_row(Some(LossRecordInput::from(loss)));
                }
            }
        }

        draft
    }

    /// 草稿唯一标识 (用于防重复提交)
    pub fn draft_id(&self) -> Uuid {
        self.draft_id
    }

    pub fn planned_raw(&self) -> &str {
        &self.planned
    }

    pub fn actual_raw(&self) -> &str {
        &self.actual
    }

    /// 计划产量 (非数字归零)
    pub fn planned(&self) -> u32 {
        coerce_count(&self.planned)
    }

    /// 实际产量 (非数字归零)
    pub fn actual(&self) -> u32 {
        coerce_count(&self.actual)
    }

    pub fn is_deficient(&self) -> bool {
        is_deficient(self.planned(), self.actual())
    }

    /// 损失录入区是否可见
    pub fn loss_section_visible(&self) -> bool {
        self.is_deficient()
    }

    pub fn set_planned(&mut self, raw: &str) {
        self.planned = raw.to_string();
        self.sync_loss_section();
    }

    pub fn set_actual(&mut self, raw: &str) {
        self.actual = raw.to_string();
        self.sync_loss_section();
    }

    pub fn losses(&self) -> &DraftLossSet {
        &self.losses
    }

    pub fn add_loss_row(&mut self, initial: Option<LossRecordInput>) -> RowHandle {
        self.losses.add_row(initial)
    }

    /// 删除损失行; 欠产且删空时自动补一条空行
    pub fn remove_loss_row(&mut self, handle: RowHandle) -> Option<LossRowDraft> {
        let removed = self.losses.remove_row(handle);
        if self.losses.is_empty() && self.is_deficient() {
            self.losses.add_row(None);
        }
        removed
    }

    pub fn loss_row_mut(&mut self, handle: RowHandle) -> Option<&mut LossRowDraft> {
        self.losses.row_mut(handle)
    }

    /// 展示用损失时间合计
    pub fn displayed_total(&self) -> i64 {
        self.losses.recompute_total()
    }

    /// 清空表单 (提交成功后), 生成新的草稿标识
    pub fn clear(&mut self) {
        let line_number = self.line_number;
        *self = Self::new(line_number);
    }

    /// 计划/实际变化后同步损失录入区
    fn sync_loss_section(&mut self) {
        if self.is_deficient() {
            if self.losses.is_empty() {
                self.losses.add_row(None);
            }
        } else if !self.losses.is_empty() {
            tracing::debug!(
                draft_id = %self.draft_id,
                rows = self.losses.len(),
                "不再欠产, 清空损失行"
            );
            self.losses.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(reason: &str, loss_time: &str, remarks: &str) -> Option<LossRecordInput> {
        Some(LossRecordInput::new(reason, loss_time, remarks))
    }

    #[test]
    fn test_recompute_total_counts_all_rows() {
        let mut set = DraftLossSet::new();
        set.add_row(input("Jam", "5", ""));
        set.add_row(input("", "3", ""));
        set.add_row(input("Setup", "abc", ""));
        set.add_row(None);

        // 展示合计包含不完整行
        assert_eq!(set.recompute_total(), 8);
        // 有效记录只有一条
        let valid = set.to_valid_records();
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].reason, "Jam");
    }

    #[test]
    fn test_to_valid_records_filters_and_trims() {
        let mut set = DraftLossSet::new();
        set.add_row(input("  Jam  ", "7", "  belt slipped "));
        set.add_row(input(" ", "5", ""));
        set.add_row(input("Zero", "0", ""));
        set.add_row(input("Negative", "-2", ""));
        set.add_row(input("Garbage", "x", ""));
        set.add_row(input("Setup", "4", "   "));

        let valid = set.to_valid_records();
        assert_eq!(
            valid,
            vec![
                LossRecord::new("Jam", 7, Some("belt slipped")),
                LossRecord::new("Setup", 4, None),
            ]
        );
    }

    #[test]
    fn test_remove_row_unknown_handle() {
        let mut set = DraftLossSet::new();
        let h = set.add_row(None);
        assert!(set.remove_row(h).is_some());
        assert!(set.remove_row(h).is_none());
    }

    #[test]
    fn test_becoming_deficient_inserts_one_empty_row() {
        let mut draft = DraftEntry::new(1);
        draft.set_actual("5");
        assert!(!draft.loss_section_visible());
        assert!(draft.losses().is_empty());

        draft.set_planned("10");
        assert!(draft.loss_section_visible());
        assert_eq!(draft.losses().len(), 1);
        assert_eq!(draft.losses().rows().next(), Some(&LossRowDraft::default()));

        // 再次变化但仍欠产, 不重复插入
        draft.set_actual("6");
        assert_eq!(draft.losses().len(), 1);
    }

    #[test]
    fn test_blank_actual_counts_as_zero() {
        let mut draft = DraftEntry::new(1);
        draft.set_planned("10");
        assert!(draft.loss_section_visible());
        assert_eq!(draft.losses().len(), 1);
        assert_eq!(draft.losses().rows().next(), Some(&LossRowDraft::default()));

        draft.set_actual("10");
        assert!(!draft.loss_section_visible());
        assert!(draft.losses().is_empty());
    }

    #[test]
    fn test_leaving_deficiency_clears_rows_and_total() {
        let mut draft = DraftEntry::new(1);
        draft.set_planned("10");
        draft.set_actual("5");
        let h = draft.losses().handles()[0];
        {
            let row = draft.loss_row_mut(h).unwrap();
            row.reason = "Jam".to_string();
            row.loss_time = "7".to_string();
        }
        assert_eq!(draft.displayed_total(), 7);

        draft.set_actual("10");
        assert!(!draft.loss_section_visible());
        assert!(draft.losses().is_empty());
        assert_eq!(draft.displayed_total(), 0);

        // 再次欠产: 只出现空行, 旧行不复活
        draft.set_actual("5");
        assert_eq!(draft.losses().len(), 1);
        assert!(draft.losses().to_valid_records().is_empty());
        assert_eq!(draft.displayed_total(), 0);
    }

    #[test]
    fn test_remove_last_row_while_deficient_reinserts_empty_row() {
        let mut draft = DraftEntry::new(2);
        draft.set_planned("10");
        draft.set_actual("5");
        let h = draft.losses().handles()[0];

        let removed = draft.remove_loss_row(h);
        assert!(removed.is_some());
        assert_eq!(draft.losses().len(), 1);
        assert_ne!(draft.losses().handles()[0], h);
    }

    #[test]
    fn test_remove_last_row_while_not_deficient_leaves_empty() {
        let mut draft = DraftEntry::new(1);
        draft.set_planned("5");
        draft.set_actual("5");
        let h = draft.add_loss_row(None);
        draft.remove_loss_row(h);
        assert!(draft.losses().is_empty());
    }

    #[test]
    fn test_from_entry_repopulates_rows() {
        let entry = ProductionEntry::new(
            Some(EntryId(9)),
            1,
            "08:00",
            "09:00",
            10,
            6,
            vec![
                LossRecord::new("Jam", 3, Some("left feeder")),
                LossRecord::new("Setup", 1, None),
            ],
        );
        let draft = DraftEntry::from_entry(&entry);
        assert_eq!(draft.entry_id, Some(EntryId(9)));
        assert!(draft.loss_section_visible());
        assert_eq!(draft.losses().to_valid_records(), entry.losses().to_vec());
        assert_eq!(draft.displayed_total(), 4);
    }

    #[test]
    fn test_from_entry_deficient_without_losses_gets_empty_row() {
        let entry = ProductionEntry::new(Some(EntryId(3)), 2, "10:00", "11:00", 10, 2, vec![]);
        let draft = DraftEntry::from_entry(&entry);
        assert_eq!(draft.losses().len(), 1);
        assert!(draft.losses().to_valid_records().is_empty());
    }

    #[test]
    fn test_from_entry_not_deficient_has_no_rows() {
        let entry = ProductionEntry::new(Some(EntryId(4)), 1, "10:00", "11:00", 10, 10, vec![]);
        let draft = DraftEntry::from_entry(&entry);
        assert!(!draft.loss_section_visible());
        assert!(draft.losses().is_empty());
    }

    #[test]
    fn test_clear_resets_draft_identity() {
        let mut draft = DraftEntry::new(2);
        draft.entry_id = Some(EntryId(5));
        draft.set_planned("10");
        draft.set_actual("1");
        let old_id = draft.draft_id();

        draft.clear();
        assert_eq!(draft.entry_id, None);
        assert_eq!(draft.line_number, 2);
        assert!(draft.losses().is_empty());
        assert_ne!(draft.draft_id(), old_id);
    }
}
