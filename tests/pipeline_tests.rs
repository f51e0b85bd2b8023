//! Coordinator runs end to end against the scripted adapter: outcomes, sinks, backpressure,
//! cancellation and draining.

mod common;

use common::{Event, ScriptedAdapter, data_lines, raw_refs, test_opts, url_for};
use presscrape::pipeline::{CancelToken, bounded_queue, run_collect, run_pipeline, run_scrap};
use presscrape::sink::{ReferenceLog, parse_row};
use presscrape::{Query, RunMode, RunOutcome, run_with_adapter};
use std::sync::Arc;
use std::time::Duration;

// --- queue ---

#[test]
fn test_queue_drains_after_producer_closes() {
    let (mut producer, consumer) = bounded_queue(4);
    for r in raw_refs(3) {
        producer.push(r).unwrap();
    }
    assert_eq!(producer.close(), 3);
    let drained: Vec<_> = consumer.map(|r| r.url).collect();
    assert_eq!(drained, (0..3).map(url_for).collect::<Vec<_>>());
}

#[test]
fn test_queue_capacity_zero_still_buffers_one() {
    let (mut producer, mut consumer) = bounded_queue(0);
    producer.push(raw_refs(1).remove(0)).unwrap();
    assert_eq!(producer.max_depth(), 1);
    drop(producer);
    assert!(consumer.next().is_some());
    assert!(consumer.next().is_none());
}

#[test]
fn test_push_fails_once_consumer_is_gone() {
    let (mut producer, consumer) = bounded_queue(2);
    drop(consumer);
    let back = producer.push(raw_refs(1).remove(0)).unwrap_err();
    assert_eq!(back.url, url_for(0));
}

// --- pipeline mode ---

#[test]
fn test_pipeline_skips_failed_article_and_completes() {
    let dir = tempfile::tempdir().unwrap();
    let opts = test_opts(dir.path());
    let adapter = Arc::new(ScriptedAdapter::new(raw_refs(5), 5).bad_article(2));
    let summary = run_pipeline(
        adapter,
        &Query::new("economy", 5),
        &opts,
        &CancelToken::new(),
    );

    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.collected, 5);
    assert_eq!(summary.scraped, 4);
    assert_eq!(summary.failed_items, 1);
    assert!(summary.error.is_none());
    assert_eq!(data_lines(&opts.list_path).len(), 5);

    let records = data_lines(&opts.result_path);
    let titles: Vec<String> = records
        .iter()
        .map(|l| parse_row(l).unwrap()[1].clone())
        .collect();
    assert_eq!(titles, ["title 0", "title 1", "title 3", "title 4"]);
}

#[test]
fn test_pipeline_stops_on_fatal_article_error() {
    let dir = tempfile::tempdir().unwrap();
    let opts = test_opts(dir.path());
    let adapter = Arc::new(ScriptedAdapter::new(raw_refs(10), 5).fatal_article(3));
    let summary = run_pipeline(
        adapter,
        &Query::new("economy", 10),
        &opts,
        &CancelToken::new(),
    );

    assert_eq!(summary.outcome, RunOutcome::Failed);
    assert!(summary.error.as_deref().unwrap().contains("no parser"));
    assert_eq!(summary.scraped, 3);
    assert_eq!(summary.failed_items, 0);
    assert_eq!(data_lines(&opts.result_path).len(), 3);
}

#[test]
fn test_pipeline_preserves_emission_order() {
    let dir = tempfile::tempdir().unwrap();
    let opts = test_opts(dir.path());
    let adapter = Arc::new(ScriptedAdapter::new(raw_refs(50), 7));
    let summary = run_pipeline(
        adapter.clone(),
        &Query::new("economy", 30).with_skip(4),
        &opts,
        &CancelToken::new(),
    );

    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.ignored, 4);
    let logged: Vec<String> = ReferenceLog::read_all(&opts.list_path)
        .unwrap()
        .into_iter()
        .map(|r| r.url)
        .collect();
    let expected: Vec<String> = (4..34).map(url_for).collect();
    assert_eq!(logged, expected);

    let extracted: Vec<usize> = adapter
        .events()
        .into_iter()
        .filter_map(|e| match e {
            Event::Extract(p) => Some(p),
            Event::Pull(_) => None,
        })
        .collect();
    assert_eq!(extracted, (4..34).collect::<Vec<_>>());
}

#[test]
fn test_backpressure_with_capacity_one() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = test_opts(dir.path());
    opts.queue_capacity = 1;
    let adapter = Arc::new(
        ScriptedAdapter::new(raw_refs(12), 1).extract_delay(Duration::from_millis(15)),
    );
    let summary = run_pipeline(
        adapter.clone(),
        &Query::new("economy", 12),
        &opts,
        &CancelToken::new(),
    );

    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.scraped, 12);
    assert!(summary.max_queue_depth <= 1);

    // Discovery never runs more than queue + in-flight + in-hand ahead of extraction.
    let events = adapter.events();
    let index_of = |wanted: &Event| events.iter().position(|e| e == wanted).unwrap();
    for k in 3..12 {
        assert!(
            index_of(&Event::Extract(k - 3)) < index_of(&Event::Pull(k)),
            "pulled {k} before extraction of {} started: {events:?}",
            k - 3
        );
    }
}

#[test]
fn test_cancellation_drains_queue_and_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = test_opts(dir.path());
    opts.queue_capacity = 2;
    let cancel = CancelToken::new();
    let adapter = Arc::new(
        ScriptedAdapter::new(raw_refs(200), 10)
            .extract_delay(Duration::from_millis(5))
            .cancel_after(5, cancel.clone()),
    );
    let summary = run_pipeline(adapter, &Query::new("economy", 200), &opts, &cancel);

    assert_eq!(summary.outcome, RunOutcome::Aborted);
    assert!(summary.collected < 200);
    // Everything queued before cancellation was still extracted.
    assert_eq!(summary.scraped + summary.failed_items, summary.collected);

    // Both files are complete: every row parses, the reference log matches what was collected.
    let references = data_lines(&opts.list_path);
    assert_eq!(references.len(), summary.collected);
    let records = data_lines(&opts.result_path);
    assert_eq!(records.len(), summary.scraped);
    for line in records {
        assert_eq!(parse_row(&line).unwrap().len(), 3);
    }
}

#[test]
fn test_unwritable_result_path_fails_before_discovery() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = test_opts(dir.path());
    opts.result_path = dir.path().join("missing").join("result.csv");
    let adapter = Arc::new(ScriptedAdapter::new(raw_refs(5), 5));
    let summary = run_pipeline(
        adapter.clone(),
        &Query::new("economy", 5),
        &opts,
        &CancelToken::new(),
    );

    assert_eq!(summary.outcome, RunOutcome::Failed);
    assert!(summary.error.is_some());
    assert!(adapter.events().is_empty());
}

#[test]
fn test_exhausted_retries_fail_the_run_but_keep_work() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = test_opts(dir.path());
    opts.max_attempts = 2;
    let adapter = Arc::new(ScriptedAdapter::new(raw_refs(40), 5).failing_page_always(1));
    let summary = run_pipeline(
        adapter,
        &Query::new("economy", 20),
        &opts,
        &CancelToken::new(),
    );

    assert_eq!(summary.outcome, RunOutcome::Failed);
    assert_eq!(summary.collected, 5);
    assert_eq!(summary.discovery_attempts, 2);
    assert_eq!(summary.ignored, 0);
    // References collected before the failure were still extracted.
    assert_eq!(summary.scraped, 5);
    assert_eq!(data_lines(&opts.result_path).len(), 5);
}

#[test]
fn test_exhausted_retries_still_report_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = test_opts(dir.path());
    opts.max_attempts = 2;
    let adapter = Arc::new(ScriptedAdapter::new(raw_refs(40), 5).failing_page_always(1));
    let summary = run_pipeline(
        adapter,
        &Query::new("economy", 20).with_skip(2),
        &opts,
        &CancelToken::new(),
    );

    assert_eq!(summary.outcome, RunOutcome::Failed);
    assert_eq!(summary.ignored, 2);
    assert_eq!(summary.collected, 3);
    assert_eq!(summary.scraped, 3);
}

#[test]
fn test_pipeline_short_source_completes() {
    let dir = tempfile::tempdir().unwrap();
    let opts = test_opts(dir.path());
    let adapter = Arc::new(ScriptedAdapter::new(raw_refs(3), 5));
    let summary = run_pipeline(
        adapter,
        &Query::new("economy", 10),
        &opts,
        &CancelToken::new(),
    );

    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.collected, 3);
    assert_eq!(summary.scraped, 3);
}

#[test]
fn test_empty_query_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let opts = test_opts(dir.path());
    let adapter = Arc::new(ScriptedAdapter::new(raw_refs(3), 5));
    let summary = run_pipeline(
        adapter.clone(),
        &Query::new("  ", 10),
        &opts,
        &CancelToken::new(),
    );

    assert_eq!(summary.outcome, RunOutcome::Failed);
    assert!(adapter.events().is_empty());
    assert!(!opts.list_path.exists());
}

// --- standalone modes ---

#[test]
fn test_collect_only_writes_reference_log() {
    let dir = tempfile::tempdir().unwrap();
    let opts = test_opts(dir.path());
    let adapter = ScriptedAdapter::new(raw_refs(30), 10);
    let summary = run_collect(
        &adapter,
        &Query::new("economy", 12).with_skip(2),
        &opts,
        &CancelToken::new(),
    );

    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.collected, 12);
    assert_eq!(summary.ignored, 2);
    assert_eq!(summary.scraped, 0);
    assert!(!opts.result_path.exists());
    let logged = ReferenceLog::read_all(&opts.list_path).unwrap();
    assert_eq!(logged, raw_refs(14)[2..].to_vec());
}

#[test]
fn test_scrap_only_reads_log_and_skips_malformed_rows() {
    let dir = tempfile::tempdir().unwrap();
    let opts = test_opts(dir.path());
    std::fs::write(
        &opts.list_path,
        format!(
            "\"url\", \"title\"\n{}, \"first\"\n\n{}, \"unterminated\n{}, \"third\"\n",
            url_for(0),
            url_for(1),
            url_for(2)
        ),
    )
    .unwrap();
    let adapter = ScriptedAdapter::new(Vec::new(), 5);
    let summary = run_scrap(&adapter, &opts, &CancelToken::new());

    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.scraped, 2);
    assert_eq!(summary.failed_items, 1);
    assert_eq!(
        adapter.events(),
        vec![Event::Extract(0), Event::Extract(2)]
    );
}

#[test]
fn test_scrap_only_missing_log_fails() {
    let dir = tempfile::tempdir().unwrap();
    let opts = test_opts(dir.path());
    let adapter = ScriptedAdapter::new(Vec::new(), 5);
    let summary = run_scrap(&adapter, &opts, &CancelToken::new());

    assert_eq!(summary.outcome, RunOutcome::Failed);
    assert!(!opts.result_path.exists());
}

#[test]
fn test_scrap_only_stops_between_items_on_cancel() {
    let dir = tempfile::tempdir().unwrap();
    let opts = test_opts(dir.path());
    let rows: String = (0..10)
        .map(|i| format!("{}, \"t\"\n", url_for(i)))
        .collect();
    std::fs::write(&opts.list_path, format!("\"url\", \"title\"\n{rows}")).unwrap();
    let cancel = CancelToken::new();
    let adapter = ScriptedAdapter::new(Vec::new(), 5).cancel_after(3, cancel.clone());
    let summary = run_scrap(&adapter, &opts, &cancel);

    assert_eq!(summary.outcome, RunOutcome::Aborted);
    assert_eq!(summary.scraped, 3);
    assert_eq!(data_lines(&opts.result_path).len(), 3);
}

#[test]
fn test_run_with_adapter_requires_query_for_collect() {
    let dir = tempfile::tempdir().unwrap();
    let opts = test_opts(dir.path());
    let adapter = Arc::new(ScriptedAdapter::new(raw_refs(3), 5));
    let summary = run_with_adapter(RunMode::Collect, None, &opts, adapter, &CancelToken::new());
    assert_eq!(summary.outcome, RunOutcome::Failed);
    assert_eq!(summary.outcome.exit_code(), 1);
}
