// ==========================================
// 班产损失追踪系统 - 当日汇总引擎
// ==========================================
// 职责: 按产线汇总当日生产记录, 按损失原因分组
// 输入: 存储层返回的当日记录 (保持返回顺序)
// 输出: DailySummary
// ==========================================
// 红线: 未配置产线 -> 整体失败 (UnknownLine), 不输出部分汇总
// 红线: 损失原因精确匹配分组, 发生顺序 = 记录顺序 × 记录内顺序
// ==========================================

use crate::config::EngineConfig;
use crate::domain::entry::ProductionEntry;
use crate::domain::summary::{DailySummary, LineSummary, LossOccurrence, LossReasonSummary};
use crate::engine::error::{ValidationError, ValidationResult};
use std::collections::HashMap;
use tracing::instrument;

// ==========================================
// LossReasonGrouper - 损失原因分组器
// ==========================================
// 按首次出现顺序输出分组
#[derive(Debug, Default)]
pub(crate) struct LossReasonGrouper {
    index: HashMap<String, usize>,
    groups: Vec<LossReasonSummary>,
}

impl LossReasonGrouper {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 累加一条记录的全部损失
    pub(crate) fn push_entry(&mut self, entry: &ProductionEntry) {
        for loss in entry.losses() {
            let idx = match self.index.get(&loss.reason) {
                Some(idx) => *idx,
                None => {
                    self.groups.push(LossReasonSummary {
                        reason: loss.reason.clone(),
                        total_time: 0,
                        occurrences: Vec::new(),
                    });
                    let idx = self.groups.len() - 1;
                    self.index.insert(loss.reason.clone(), idx);
                    idx
                }
            };

            let group = &mut self.groups[idx];
            group.total_time += u64::from(loss.loss_time);
            group.occurrences.push(LossOccurrence {
                from_time: entry.from_time.clone(),
                to_time: entry.to_time.clone(),
                time_range: entry.time_range(),
                loss_time: loss.loss_time,
                remarks: loss.remarks.clone(),
            });
        }
    }

    pub(crate) fn finish(self) -> Vec<LossReasonSummary> {
        self.groups
    }
}

/// 检查所有记录的产线是否在配置范围内
pub(crate) fn ensure_known_lines<'a>(
    config: &EngineConfig,
    entries: impl IntoIterator<Item = &'a ProductionEntry>,
) -> ValidationResult<()> {
    for entry in entries {
        if !config.is_known_line(entry.line_number) {
            tracing::warn!(
                line_number = entry.line_number,
                entry_id = ?entry.id,
                "记录的产线不在配置范围内"
            );
            return Err(ValidationError::UnknownLine {
                line_number: entry.line_number,
                entry_id: entry.id,
            });
        }
    }
    Ok(())
}

// ==========================================
// DailyAggregator - 当日汇总引擎
// ==========================================
// 无状态引擎, 只持有产线配置
#[derive(Debug, Clone)]
pub struct DailyAggregator {
    config: EngineConfig,
}

impl DailyAggregator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn lines(&self) -> &[u32] {
        &self.config.production_lines
    }

    /// 生成当日汇总
    ///
    /// # 参数
    /// - entries: 当日全部记录 (存储层返回顺序)
    ///
    /// # 返回
    /// - Ok(DailySummary): 每个配置产线一条汇总 (无记录的产线为空汇总)
    /// - Err(UnknownLine): 存在未配置产线的记录
    #[instrument(skip(self, entries), fields(count = entries.len()))]
    pub fn aggregate(&self, entries: &[ProductionEntry]) -> ValidationResult<DailySummary> {
        ensure_known_lines(&self.config, entries)?;

        let lines = self
            .lines()
            .iter()
            .map(|&line_number| {
                let line_entries: Vec<&ProductionEntry> = entries
                    .iter()
                    .filter(|e| e.line_number == line_number)
                    .collect();
                self.summarize_line(line_number, &line_entries)
            })
            .collect();

        Ok(DailySummary { lines })
    }

    /// 汇总单产线
    fn summarize_line(&self, line_number: u32, entries: &[&ProductionEntry]) -> LineSummary {
        let mut grouper = LossReasonGrouper::new();
        let mut total_planned = 0u64;
        let mut total_actual = 0u64;
        let mut total_loss_time = 0u64;

        for entry in entries {
            total_planned += u64::from(entry.planned);
            total_actual += u64::from(entry.actual);
            total_loss_time += u64::from(entry.total_loss_time());
            grouper.push_entry(entry);
        }

        LineSummary {
            line_number,
            total_planned,
            total_actual,
            total_loss_time,
            entries: entries.iter().map(|e| (*e).clone()).collect(),
            loss_summary: grouper.finish(),
        }
    }
}
