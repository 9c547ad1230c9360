// ==========================================
// 班产损失追踪系统 - API层错误类型
// ==========================================
// 职责: 汇集引擎校验错误与存储错误, 提供错误码与面向用户的提示
// 红线: 错误信息必须包含显式原因
// ==========================================

use crate::domain::types::{EntryId, UnknownReportType};
use crate::engine::error::ValidationError;
use crate::i18n::{t, t_with_args};
use crate::repository::entry_store::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 校验错误
    // ==========================================
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("未知的报表类型: {0}")]
    UnknownReportType(String),

    // ==========================================
    // 并发控制错误
    // ==========================================
    #[error("记录正在提交中: draft_id={draft_id}")]
    SubmissionInFlight { draft_id: Uuid },

    // ==========================================
    // 存储错误
    // ==========================================
    #[error("生产记录不存在: id={0}")]
    NotFound(EntryId),

    #[error("存储请求失败 (operation={operation}): {message}")]
    StoreRequestFailed { operation: String, message: String },

    #[error("存储返回数据格式错误: {0}")]
    MalformedPayload(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RequestFailed { operation, message } => {
                ApiError::StoreRequestFailed { operation, message }
            }
            StoreError::NotFound { id } => ApiError::NotFound(id),
            StoreError::MalformedPayload(msg) => ApiError::MalformedPayload(msg),
        }
    }
}

impl From<UnknownReportType> for ApiError {
    fn from(err: UnknownReportType) -> Self {
        ApiError::UnknownReportType(err.0)
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// 错误代码
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(ValidationError::MissingLossJustification) => {
                "MISSING_LOSS_JUSTIFICATION"
            }
            ApiError::Validation(ValidationError::UnknownLine { .. }) => "UNKNOWN_LINE",
            ApiError::UnknownReportType(_) => "UNKNOWN_REPORT_TYPE",
            ApiError::SubmissionInFlight { .. } => "SUBMISSION_IN_FLIGHT",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::StoreRequestFailed { .. } => "STORE_REQUEST_FAILED",
            ApiError::MalformedPayload(_) => "MALFORMED_PAYLOAD",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// 面向用户的提示 (按当前语言)
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation(ValidationError::MissingLossJustification) => {
                t("entry.missing_loss_justification")
            }
            ApiError::Validation(ValidationError::UnknownLine { line_number, .. }) => {
                t_with_args("entry.unknown_line", &[("line", &line_number.to_string())])
            }
            ApiError::UnknownReportType(tag) => t_with_args("report.unknown_type", &[("tag", tag)]),
            ApiError::SubmissionInFlight { .. } => t("entry.submission_in_flight"),
            ApiError::NotFound(id) => t_with_args("entry.not_found", &[("id", &id.to_string())]),
            ApiError::StoreRequestFailed { operation, .. } => match operation.as_str() {
                "create_entry" | "update_entry" => t("entry.save_failed"),
                "get_entry" => t("entry.load_failed"),
                "list_today_entries" => t("summary.load_failed"),
                "open_report" => t("report.open_failed"),
                _ => t("common.internal_error"),
            },
            ApiError::MalformedPayload(_) => t("store.malformed_payload"),
            ApiError::InternalError(_) => t("common.internal_error"),
        }
    }

    /// 转换为错误响应
    pub fn to_error_response(&self) -> ErrorResponse {
        let details = match self {
            ApiError::Validation(ValidationError::UnknownLine {
                line_number,
                entry_id,
            }) => Some(serde_json::json!({
                "line_number": line_number,
                "entry_id": entry_id,
            })),
            ApiError::SubmissionInFlight { draft_id } => {
                Some(serde_json::json!({ "draft_id": draft_id }))
            }
            ApiError::NotFound(id) => Some(serde_json::json!({ "entry_id": id })),
            ApiError::StoreRequestFailed { operation, message } => Some(serde_json::json!({
                "operation": operation,
                "cause": message,
            })),
            _ => None,
        };

        ErrorResponse {
            code: self.code().to_string(),
            message: self.user_message(),
            details,
        }
    }
}

// ==========================================
// ErrorResponse - 错误响应
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 错误代码
    pub code: String,

    /// 错误消息
    pub message: String,

    /// 详细信息（可选）
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{}: {}", self.code, self.message))
    }
}
