// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use shift_loss_tracker::domain::entry::{LossRecordInput, ValidatedEntry};
use shift_loss_tracker::domain::types::EntryId;
use shift_loss_tracker::engine::{DraftEntry, SubmissionValidator};

// ==========================================
// DraftEntry 构建器
// ==========================================
// 模拟表单录入: 先填计划/实际, 再逐行填写损失原因

pub struct DraftBuilder {
    entry_id: Option<EntryId>,
    line_number: u32,
    from_time: String,
    to_time: String,
    planned: String,
    actual: String,
    losses: Vec<(String, String, String)>,
}

impl DraftBuilder {
    pub fn new(line_number: u32) -> Self {
        Self {
            entry_id: None,
            line_number,
            from_time: "08:00".to_string(),
            to_time: "09:00".to_string(),
            planned: "0".to_string(),
            actual: "0".to_string(),
            losses: Vec::new(),
        }
    }

    pub fn entry_id(mut self, id: EntryId) -> Self {
        self.entry_id = Some(id);
        self
    }

    pub fn time_range(mut self, from: &str, to: &str) -> Self {
        self.from_time = from.to_string();
        self.to_time = to.to_string();
        self
    }

    pub fn planned(mut self, planned: &str) -> Self {
        self.planned = planned.to_string();
        self
    }

    pub fn actual(mut self, actual: &str) -> Self {
        self.actual = actual.to_string();
        self
    }

    pub fn loss(mut self, reason: &str, loss_time: &str, remarks: &str) -> Self {
        self.losses
            .push((reason.to_string(), loss_time.to_string(), remarks.to_string()));
        self
    }

    pub fn build(self) -> DraftEntry {
        let mut draft = DraftEntry::new(self.line_number);
        draft.entry_id = self.entry_id;
        draft.from_time = self.from_time;
        draft.to_time = self.to_time;
        draft.set_planned(&self.planned);
        draft.set_actual(&self.actual);

        let mut losses = self.losses.into_iter();

        // 欠产时表单已自动补一条空行, 先填它
        if let Some(first) = draft.losses().handles().first().copied() {
            if let Some((reason, loss_time, remarks)) = losses.next() {
                if let Some(row) = draft.loss_row_mut(first) {
                    row.reason = reason;
                    row.loss_time = loss_time;
                    row.remarks = remarks;
                }
            }
        }

        for (reason, loss_time, remarks) in losses {
            draft.add_loss_row(Some(LossRecordInput::new(&reason, &loss_time, &remarks)));
        }

        draft
    }

    /// 构建并通过提交校验
    pub fn validated(self) -> ValidatedEntry {
        SubmissionValidator::new()
            .validate_for_submit(&self.build())
            .expect("测试数据应通过提交校验")
    }
}
