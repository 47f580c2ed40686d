//! Paginated scan and filter tests.

use bytes::Bytes;
use rowpipe_parquet::{
    CancelToken, ConditionKind, FilterSet, PageRequest, RowGroupReader, RowsCursor, ScanConfig,
    Scanner, SourceField, Value, WritePipeline, WriterConfig,
};

/// 10,000 rows of (seq, category, label) in 1,000-row groups.
fn sample_reader() -> RowGroupReader {
    let mut source = RowsCursor::new(
        vec![
            SourceField::new("seq", "System.Int64"),
            SourceField::new("category", "System.Int32"),
            SourceField::new("label", "System.String"),
        ],
        (0..10_000i64)
            .map(|i| {
                vec![
                    Some(Value::Long(i)),
                    Some(Value::Integer((i % 4) as i32)),
                    Some(Value::String(format!("Item {i}"))),
                ]
            })
            .collect(),
    );
    let pipeline = WritePipeline::new(WriterConfig {
        row_group_size: 1_000,
        notify_after: 0,
        ..WriterConfig::default()
    });
    let mut sink = Vec::new();
    pipeline
        .write_to(&mut sink, &mut source, None, &CancelToken::new())
        .unwrap();
    RowGroupReader::from_bytes(Bytes::from(sink)).unwrap()
}

fn scan(reader: &RowGroupReader, request: PageRequest, filters: &FilterSet) -> (Vec<i64>, u64) {
    let result = Scanner::default()
        .scan(reader, &request, filters, None, &CancelToken::new())
        .unwrap();
    let seqs = result
        .rows
        .iter()
        .map(|row| match &row[0] {
            Some(Value::Long(v)) => *v,
            other => panic!("expected seq, got {other:?}"),
        })
        .collect();
    (seqs, result.total_matched)
}

#[test]
fn test_pagination_arithmetic_unfiltered() {
    let reader = sample_reader();
    let none = FilterSet::new();

    let (page1, _) = scan(&reader, PageRequest::new(1, 2_500, false), &none);
    assert_eq!(page1, (0..2_500).collect::<Vec<_>>());

    // The offset spans multiple row groups; groups before it are skipped by
    // row-count arithmetic when no filter is present.
    let (page4, _) = scan(&reader, PageRequest::new(4, 2_500, false), &none);
    assert_eq!(page4, (7_500..10_000).collect::<Vec<_>>());

    let (page5, total) = scan(&reader, PageRequest::new(5, 2_500, true), &none);
    assert!(page5.is_empty());
    assert_eq!(total, 10_000);
}

#[test]
fn test_stop_early_vs_count_all() {
    let reader = sample_reader();
    let none = FilterSet::new();

    // Stop-early halts once the page is complete.
    let (_, partial) = scan(&reader, PageRequest::new(1, 2_500, false), &none);
    assert_eq!(partial, 2_500);

    // Count-all scans on to the exact total, page content unchanged.
    let (page1, total) = scan(&reader, PageRequest::new(1, 2_500, true), &none);
    assert_eq!(page1.len(), 2_500);
    assert_eq!(total, 10_000);
}

#[test]
fn test_equals_filter_gates_rows_before_pagination() {
    let reader = sample_reader();
    let mut filters = FilterSet::new();
    filters.add(
        "category",
        ConditionKind::Equals,
        Some(Value::Integer(2)),
        None,
    );

    let (page1, total) = scan(&reader, PageRequest::new(1, 100, true), &filters);
    assert_eq!(total, 2_500);
    assert_eq!(page1.len(), 100);
    // Only rows with category == 2, i.e. seq % 4 == 2, in file order.
    assert_eq!(page1[0], 2);
    assert_eq!(page1[1], 6);
    assert!(page1.iter().all(|seq| seq % 4 == 2));

    // Page 2 continues where page 1 left off, across group boundaries.
    let (page2, _) = scan(&reader, PageRequest::new(2, 100, false), &filters);
    assert_eq!(page2[0], 402);
    assert_eq!(page2.len(), 100);
}

#[test]
fn test_contains_filter_is_case_insensitive() {
    let reader = sample_reader();
    let mut filters = FilterSet::new();
    filters.add(
        "label",
        ConditionKind::Contains,
        Some(Value::String("item 99".into())),
        None,
    );

    // "Item 99", "Item 990" .. "Item 999", "Item 9900" .. "Item 9999".
    let (rows, total) = scan(&reader, PageRequest::new(1, 1_000, true), &filters);
    assert_eq!(total, 111);
    assert!(rows.contains(&99));
    assert!(rows.contains(&9_999));
}

#[test]
fn test_ordering_filter_over_long_column() {
    let reader = sample_reader();
    let mut filters = FilterSet::new();
    filters.add(
        "seq",
        ConditionKind::GreaterOrEqual,
        Some(Value::Long(9_990)),
        None,
    );

    let (rows, total) = scan(&reader, PageRequest::new(1, 100, true), &filters);
    assert_eq!(total, 10);
    assert_eq!(rows, (9_990..10_000).collect::<Vec<_>>());
}

#[test]
fn test_between_and_in_exclude_every_row() {
    // Pinned limitation carried over from the predicate grammar.
    let reader = sample_reader();

    let mut between = FilterSet::new();
    between.add(
        "seq",
        ConditionKind::Between,
        Some(Value::Long(0)),
        Some(Value::Long(9_999)),
    );
    let (rows, total) = scan(&reader, PageRequest::new(1, 100, true), &between);
    assert!(rows.is_empty());
    assert_eq!(total, 0);

    let mut in_list = FilterSet::new();
    in_list.add("seq", ConditionKind::In, Some(Value::Long(5)), None);
    let (rows, total) = scan(&reader, PageRequest::new(1, 100, true), &in_list);
    assert!(rows.is_empty());
    assert_eq!(total, 0);
}

#[test]
fn test_scan_progress_notification() {
    let reader = sample_reader();
    let scanner = Scanner::new(ScanConfig { notify_after: 4_000 });
    let mut seen = Vec::new();
    let mut progress = |scanned: u64| seen.push(scanned);

    scanner
        .scan(
            &reader,
            &PageRequest::new(1, 10_000, true),
            &FilterSet::new(),
            Some(&mut progress),
            &CancelToken::new(),
        )
        .unwrap();
    assert_eq!(seen, vec![4_000, 8_000]);
}

#[test]
fn test_pre_cancelled_scan_returns_nothing() {
    let reader = sample_reader();
    let cancel = CancelToken::new();
    cancel.cancel();

    let result = Scanner::default()
        .scan(
            &reader,
            &PageRequest::new(1, 100, true),
            &FilterSet::new(),
            None,
            &cancel,
        )
        .unwrap();
    assert!(result.rows.is_empty());
    assert_eq!(result.total_matched, 0);
}

#[test]
fn test_invalid_page_request_is_rejected() {
    let reader = sample_reader();
    let err = Scanner::default()
        .scan(
            &reader,
            &PageRequest::new(0, 100, false),
            &FilterSet::new(),
            None,
            &CancelToken::new(),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        rowpipe_result::Error::InvalidArgumentError(_)
    ));
}
