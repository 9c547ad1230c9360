// ==========================================
// 班产损失追踪系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::domain::types::EntryId;
use thiserror::Error;

/// 损失核算校验错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// 实际 < 计划, 但没有任何有效损失记录
    #[error("缺少损失原因: 实际产量低于计划产量时至少需要一条有效损失记录")]
    MissingLossJustification,

    /// 汇总时遇到未配置的产线
    #[error("未知产线: line_number={line_number}, entry_id={}", display_entry_id(.entry_id))]
    UnknownLine {
        line_number: u32,
        entry_id: Option<EntryId>,
    },
}

fn display_entry_id(entry_id: &Option<EntryId>) -> String {
    entry_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Result 类型别名
pub type ValidationResult<T> = Result<T, ValidationError>;
