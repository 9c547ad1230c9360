// ==========================================
// 班产损失追踪系统 - 报表 CSV 渲染
// ==========================================
// 职责: RangeReport -> CSV 字节流 (本地存储的报表内容)
// 行结构: 每个 产线×日期 一行 summary, 之后逐原因列出 loss 明细与 loss_total
// ==========================================

use crate::domain::summary::RangeReport;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    line_number: u32,
    date: String,
    section: &'static str,
    reason: Option<&'a str>,
    time_range: Option<&'a str>,
    loss_time: Option<u64>,
    planned: Option<u64>,
    actual: Option<u64>,
    total_loss_time: Option<u64>,
    remarks: Option<&'a str>,
}

impl<'a> ReportRow<'a> {
    fn blank(line_number: u32, date: String, section: &'static str) -> Self {
        Self {
            line_number,
            date,
            section,
            reason: None,
            time_range: None,
            loss_time: None,
            planned: None,
            actual: None,
            total_loss_time: None,
            remarks: None,
        }
    }
}

/// 将区间报表渲染为 CSV
pub fn render_report_csv(report: &RangeReport) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for line in &report.lines {
        for day in &line.days {
            let date = day.date.format("%Y-%m-%d").to_string();

            writer.serialize(ReportRow {
                planned: Some(day.planned),
                actual: Some(day.actual),
                total_loss_time: Some(day.total_loss_time),
                ..ReportRow::blank(line.line_number, date.clone(), "summary")
            })?;

            for reason in &day.losses {
                for occurrence in &reason.occurrences {
                    writer.serialize(ReportRow {
                        reason: Some(&reason.reason),
                        time_range: Some(&occurrence.time_range),
                        loss_time: Some(u64::from(occurrence.loss_time)),
                        remarks: occurrence.remarks.as_deref(),
                        ..ReportRow::blank(line.line_number, date.clone(), "loss")
                    })?;
                }
                writer.serialize(ReportRow {
                    reason: Some(&reason.reason),
                    loss_time: Some(reason.total_time),
                    ..ReportRow::blank(line.line_number, date.clone(), "loss_total")
                })?;
            }
        }
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}
