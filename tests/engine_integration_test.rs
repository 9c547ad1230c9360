// ==========================================
// 引擎集成测试
// ==========================================
// 测试目标: 草稿 -> 提交校验 -> 当日汇总 / 区间报表 (不经过存储)
// ==========================================

mod helpers;

use chrono::NaiveDate;
use helpers::test_data_builder::DraftBuilder;
use shift_loss_tracker::config::EngineConfig;
use shift_loss_tracker::domain::entry::DatedEntry;
use shift_loss_tracker::engine::{DailyAggregator, DraftEntry, ReportAggregator, ValidationError};
use shift_loss_tracker::{EntryId, SubmissionValidator};

#[test]
fn test_total_counts_only_valid_rows() {
    let draft = DraftBuilder::new(1)
        .planned("10")
        .actual("4")
        .loss("Jam", "5", "")
        .loss("", "9", "no reason")
        .loss("Changeover", "abc", "")
        .loss("Cleaning", "3", "")
        .build();

    // 展示合计包含不完整行
    assert_eq!(draft.displayed_total(), 17);

    let validated = SubmissionValidator::new().validate_for_submit(&draft).unwrap();
    assert_eq!(validated.losses().len(), 2);
    assert_eq!(validated.total_loss_time(), 8);
}

#[test]
fn test_non_deficient_submit_drops_losses() {
    let mut draft = DraftEntry::new(2);
    draft.set_planned("10");
    draft.set_actual("3");
    draft.add_loss_row(None);
    draft.set_actual("12");

    let validated = SubmissionValidator::new().validate_for_submit(&draft).unwrap();
    assert!(validated.losses().is_empty());
    assert_eq!(validated.total_loss_time(), 0);
}

#[test]
fn test_non_numeric_counts_are_zero() {
    let draft = DraftBuilder::new(1).planned("ten").actual("").build();
    assert_eq!(draft.planned(), 0);
    assert!(!draft.is_deficient());
    assert!(SubmissionValidator::new().validate_for_submit(&draft).is_ok());
}

#[test]
fn test_daily_and_range_aggregation_agree() {
    let config = EngineConfig::default();
    let validator = SubmissionValidator::new();

    let entries: Vec<_> = vec![
        DraftBuilder::new(1).planned("10").actual("8").loss("Jam", "5", "").build(),
        DraftBuilder::new(1).time_range("09:00", "10:00").planned("10").actual("10").build(),
        DraftBuilder::new(2).planned("5").actual("1").loss("Jam", "30", "").build(),
    ]
    .iter()
    .enumerate()
    .map(|(idx, draft)| {
        validator
            .validate_for_submit(draft)
            .unwrap()
            .into_entry(EntryId(idx as i64 + 1))
    })
    .collect();

    let summary = DailyAggregator::new(&config).aggregate(&entries).unwrap();
    let line1 = summary.line(1).unwrap();
    assert_eq!((line1.total_planned, line1.total_actual, line1.total_loss_time), (20, 18, 5));
    assert_eq!(summary.line(2).unwrap().loss_summary[0].total_time, 30);

    let day = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
    let dated: Vec<_> = entries
        .iter()
        .cloned()
        .map(|entry| DatedEntry { recorded_on: day, entry })
        .collect();
    let report = ReportAggregator::new(&config).aggregate_range(day, day, &dated).unwrap();
    let day1 = &report.line(1).unwrap().days[0];
    assert_eq!((day1.planned, day1.actual, day1.total_loss_time), (20, 18, 5));
}

#[test]
fn test_unknown_line_rejected_by_both_aggregators() {
    let config = EngineConfig::default();
    let entry = DraftBuilder::new(9)
        .planned("1")
        .actual("1")
        .validated()
        .into_entry(EntryId(1));

    assert!(matches!(
        DailyAggregator::new(&config).aggregate(std::slice::from_ref(&entry)),
        Err(ValidationError::UnknownLine { line_number: 9, .. })
    ));

    let day = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
    let dated = vec![DatedEntry { recorded_on: day, entry }];
    assert!(ReportAggregator::new(&config)
        .aggregate_range(day, day, &dated)
        .is_err());
}
