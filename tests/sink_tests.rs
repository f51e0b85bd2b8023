//! Sinks: headers, quoting, reading the reference log back and merging result files.

use presscrape::sink::{
    LogRow, RecordSink, ReferenceLog, ReferenceSink, format_record_row, format_reference_row,
    merge_result_files, parse_row,
};
use presscrape::{Record, Reference, ScrapeError};
use std::fs;

// --- row format ---

#[test]
fn test_reference_row_format() {
    let r = Reference::new("https://news.joins.com/article/1", "제목 \"따옴표\"");
    assert_eq!(
        format_reference_row(&r),
        r#"https://news.joins.com/article/1, "제목 ""따옴표""""#
    );
}

#[test]
fn test_reference_row_quotes_url_with_comma() {
    let r = Reference::new("https://news.example.com/article?id=1,2", "Title here");
    assert_eq!(
        format_reference_row(&r),
        r#""https://news.example.com/article?id=1,2", "Title here""#
    );
    let r = Reference::new(" https://a/1", "t");
    assert_eq!(format_reference_row(&r), r#"https://a/1, "t""#);
}

#[test]
fn test_record_row_replaces_line_breaks() {
    let r = Record::new("2021-03-04", "t", "line one\r\nline two").unwrap();
    assert_eq!(
        format_record_row(&r),
        r#""2021-03-04", "t", "line one  line two""#
    );
}

#[test]
fn test_parse_row_reads_back_quoted_fields() {
    let r = Record::new("2021-03-04", "a, \"b\"", "c").unwrap();
    let fields = parse_row(&format_record_row(&r)).unwrap();
    assert_eq!(fields, ["2021-03-04", "a, \"b\"", "c"]);
}

#[test]
fn test_parse_row_truncated_is_error() {
    assert!(parse_row(r#""2021-03-04", "title", "body cut o"#).is_err());
}

#[test]
fn test_parse_row_garbage_after_quote_is_error() {
    assert!(parse_row(r#""a"b, "c""#).is_err());
}

// --- sinks ---

#[test]
fn test_sinks_write_header_even_when_empty() {
    let dir = tempfile::tempdir().unwrap();
    let list = dir.path().join("list.csv");
    let result = dir.path().join("result.csv");
    assert_eq!(ReferenceSink::create(&list).unwrap().close().unwrap(), 0);
    assert_eq!(RecordSink::create(&result).unwrap().close().unwrap(), 0);

    assert_eq!(fs::read_to_string(&list).unwrap(), "\"url\", \"title\"\n");
    assert_eq!(
        fs::read_to_string(&result).unwrap(),
        "\"date\", \"title\", \"body\"\n"
    );
}

#[test]
fn test_rows_are_visible_before_close() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("result.csv");
    let mut sink = RecordSink::create(&path).unwrap();
    sink.append(&Record::new("2021-03-04", "t", "b").unwrap())
        .unwrap();

    // Each row is flushed as it is written.
    assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 2);
    assert_eq!(sink.rows(), 1);
    assert_eq!(sink.close().unwrap(), 1);
}

#[test]
fn test_create_in_missing_directory_is_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope").join("list.csv");
    assert!(matches!(
        ReferenceSink::create(&path),
        Err(ScrapeError::Configuration(_))
    ));
}

// --- reference log ---

#[test]
fn test_reference_log_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("list.csv");
    let refs = vec![
        Reference::new("https://a/1", "첫 기사"),
        Reference::new("https://a/2", "comma, \"quote\""),
    ];
    let mut sink = ReferenceSink::create(&path).unwrap();
    for r in &refs {
        sink.append(r).unwrap();
    }
    sink.close().unwrap();

    assert_eq!(ReferenceLog::read_all(&path).unwrap(), refs);
}

#[test]
fn test_reference_log_round_trip_url_with_comma() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("list.csv");
    let refs = vec![
        Reference::new("https://news.example.com/article?id=1,2", "Title here"),
        Reference::new("https://a/q?x=\"y\"", "quoted"),
    ];
    let mut sink = ReferenceSink::create(&path).unwrap();
    for r in &refs {
        sink.append(r).unwrap();
    }
    sink.close().unwrap();

    assert_eq!(ReferenceLog::read_all(&path).unwrap(), refs);
}

#[test]
fn test_reference_log_reports_malformed_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("list.csv");
    fs::write(
        &path,
        "\"url\", \"title\"\nhttps://a/1, \"ok\"\n, \"no url\"\nhttps://a/3, \"cut\n",
    )
    .unwrap();

    let rows: Vec<LogRow> = ReferenceLog::open(&path)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], LogRow::Reference(Reference::new("https://a/1", "ok")));
    assert!(matches!(rows[1], LogRow::Malformed { line: 3, .. }));
    assert!(matches!(rows[2], LogRow::Malformed { line: 4, .. }));
}

#[test]
fn test_reference_log_without_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("list.csv");
    fs::write(&path, "https://a/1, \"one\"\n\"https://a/2\", \"two\"\n").unwrap();
    let refs = ReferenceLog::read_all(&path).unwrap();
    assert_eq!(
        refs,
        vec![
            Reference::new("https://a/1", "one"),
            Reference::new("https://a/2", "two")
        ]
    );
}

#[test]
fn test_missing_reference_log_is_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        ReferenceLog::open(&dir.path().join("none.csv")),
        Err(ScrapeError::Configuration(_))
    ));
}

// --- merge ---

#[test]
fn test_merge_keeps_first_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.csv");
    let b = dir.path().join("b.csv");
    let out = dir.path().join("merged.csv");
    fs::write(&a, "\"date\", \"title\", \"body\"\n\"2021-01-01\", \"a\", \"x\"\n").unwrap();
    fs::write(
        &b,
        "\"date\", \"title\", \"body\"\n\"2021-01-02\", \"b\", \"y\"\n\n\"2021-01-03\", \"c\", \"z\"\n",
    )
    .unwrap();

    assert_eq!(merge_result_files(&out, &[&a, &b]).unwrap(), 3);
    let merged = fs::read_to_string(&out).unwrap();
    assert_eq!(merged.lines().count(), 4);
    assert_eq!(merged.matches("\"date\"").count(), 1);
}

#[test]
fn test_merge_without_inputs_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let none: [&std::path::Path; 0] = [];
    assert!(matches!(
        merge_result_files(&dir.path().join("out.csv"), &none),
        Err(ScrapeError::Configuration(_))
    ));
}
