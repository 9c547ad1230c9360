// ==========================================
// 班产损失追踪系统 - 领域类型定义
// ==========================================
// 职责: 生产记录标识、报表类型等基础值类型
// ==========================================

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ==========================================
// 生产记录ID (Entry Id)
// ==========================================
// 由存储层在创建时分配, 草稿阶段为空
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub i64);

impl EntryId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for EntryId {
    fn from(value: i64) -> Self {
        EntryId(value)
    }
}

// ==========================================
// 报表类型 (Report Type)
// ==========================================
// 序列化格式: 小写标签 (与报表接口路径一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Daily,  // 当日
    Weekly, // 本周 (周一至今日)
}

impl ReportType {
    /// 报表标签
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Daily => "daily",
            ReportType::Weekly => "weekly",
        }
    }

    /// 计算报表覆盖的日期范围 (闭区间)
    ///
    /// # 参数
    /// - today: 基准日期
    ///
    /// # 返回
    /// - (start_date, end_date)
    pub fn date_range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            ReportType::Daily => (today, today),
            ReportType::Weekly => {
                let offset = today.weekday().num_days_from_monday() as i64;
                (today - Duration::days(offset), today)
            }
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 报表类型解析失败
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("未知的报表类型: {0}")]
pub struct UnknownReportType(pub String);

impl FromStr for ReportType {
    type Err = UnknownReportType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(ReportType::Daily),
            "weekly" => Ok(ReportType::Weekly),
            _ => Err(UnknownReportType(s.to_string())),
        }
    }
}
