// ==========================================
// 班产损失追踪系统 - 区间报表引擎
// ==========================================
// 职责: 按 产线 -> 日期 汇总区间内的生产记录 (日报/周报数据)
// 输入: 带记录日期的生产记录
// 输出: RangeReport
// ==========================================
// 红线: 未配置产线的处理与当日汇总一致 (整体失败)
// ==========================================

use crate::config::EngineConfig;
use crate::domain::entry::DatedEntry;
use crate::domain::summary::{DayReport, LineReport, RangeReport};
use crate::engine::aggregator::{ensure_known_lines, LossReasonGrouper};
use crate::engine::error::ValidationResult;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::instrument;

// ==========================================
// ReportAggregator - 区间报表引擎
// ==========================================
#[derive(Debug, Clone)]
pub struct ReportAggregator {
    config: EngineConfig,
}

/// 单日累加器
#[derive(Default)]
struct DayAccumulator {
    planned: u64,
    actual: u64,
    total_loss_time: u64,
    grouper: LossReasonGrouper,
}

impl ReportAggregator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// 生成区间报表
    ///
    /// # 参数
    /// - start_date / end_date: 报表区间 (闭区间, 仅用于标注)
    /// - entries: 区间内记录; 同一日内保持输入顺序
    ///
    /// # 返回
    /// - Ok(RangeReport): 每个配置产线一条, 日期升序
    /// - Err(UnknownLine): 存在未配置产线的记录
    #[instrument(skip(self, entries), fields(count = entries.len()))]
    pub fn aggregate_range(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        entries: &[DatedEntry],
    ) -> ValidationResult<RangeReport> {
        ensure_known_lines(&self.config, entries.iter().map(|d| &d.entry))?;

        let lines = self
            .config
            .production_lines
            .iter()
            .map(|&line_number| {
                let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();

                for dated in entries.iter().filter(|d| d.entry.line_number == line_number) {
                    let acc = days.entry(dated.recorded_on).or_default();
                    acc.planned += u64::from(dated.entry.planned);
                    acc.actual += u64::from(dated.entry.actual);
                    acc.total_loss_time += u64::from(dated.entry.total_loss_time());
                    acc.grouper.push_entry(&dated.entry);
                }

                LineReport {
                    line_number,
                    days: days
                        .into_iter()
                        .map(|(date, acc)| DayReport {
                            date,
                            planned: acc.planned,
                            actual: acc.actual,
                            total_loss_time: acc.total_loss_time,
                            losses: acc.grouper.finish(),
                        })
                        .collect(),
                }
            })
            .collect();

        Ok(RangeReport {
            start_date,
            end_date,
            lines,
        })
    }
}
