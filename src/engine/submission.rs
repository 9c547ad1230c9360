// ==========================================
// 班产损失追踪系统 - 提交校验器
// ==========================================
// 职责: 提交前校验草稿, 产出 ValidatedEntry
// 输入: DraftEntry 快照
// 输出: ValidatedEntry / ValidationError
// ==========================================
// 红线: 欠产且无有效损失记录 -> MissingLossJustification
// 红线: total_loss_time 只统计有效损失记录, 不使用展示合计
// 红线: 不欠产 -> losses 为空, total_loss_time = 0
// ==========================================

use crate::domain::entry::ValidatedEntry;
use crate::engine::deficiency::is_deficient;
use crate::engine::draft::DraftEntry;
use crate::engine::error::{ValidationError, ValidationResult};
use tracing::instrument;

// ==========================================
// SubmissionValidator - 提交校验器
// ==========================================
// 无状态, 不做任何持久化或网络调用
#[derive(Debug, Clone, Default)]
pub struct SubmissionValidator;

impl SubmissionValidator {
    pub fn new() -> Self {
        Self
    }

    /// 校验草稿是否可提交
    ///
    /// 产线、时段、非负等字段由表现层负责, 这里只校验欠产规则。
    ///
    /// # 返回
    /// - Ok(ValidatedEntry): 可提交的记录
    /// - Err(MissingLossJustification): 欠产但无有效损失记录
    #[instrument(skip(self, draft), fields(draft_id = %draft.draft_id(), line = draft.line_number))]
    pub fn validate_for_submit(&self, draft: &DraftEntry) -> ValidationResult<ValidatedEntry> {
        let planned = draft.planned();
        let actual = draft.actual();
        let deficient = is_deficient(planned, actual);

        let losses = if deficient {
            let valid = draft.losses().to_valid_records();
            if valid.is_empty() {
                tracing::debug!(planned, actual, "欠产但没有有效损失记录");
                return Err(ValidationError::MissingLossJustification);
            }
            valid
        } else {
            Vec::new()
        };

        let validated = ValidatedEntry::new(
            draft.entry_id,
            draft.line_number,
            draft.from_time.clone(),
            draft.to_time.clone(),
            planned,
            actual,
            losses,
        );

        tracing::debug!(
            deficient,
            losses = validated.losses().len(),
            total_loss_time = validated.total_loss_time(),
            "提交校验通过"
        );

        Ok(validated)
    }
}
