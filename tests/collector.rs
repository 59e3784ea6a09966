//! Collector integration tests against a mock Nagios server.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use nagios_exporter::exposition::{Collector, Metric};
use nagios_exporter::nagios::collector::{DURATION_METRIC, HOST_STATUS_METRIC};
use nagios_exporter::nagios::{EventSink, FetchConfig, NagiosCollector, ScrapeError};

mod common;
use common::{
    spacer_row, start_mock_nagios, start_mock_nagios_bytes, start_silent_backend, status_page,
    status_row,
};

#[derive(Default)]
struct RecordingSink {
    kinds: Mutex<Vec<String>>,
}

impl EventSink for RecordingSink {
    fn scrape_failed(&self, _target: &str, error: &ScrapeError) {
        self.kinds.lock().unwrap().push(error.kind());
    }
}

async fn collect_all(collector: &NagiosCollector) -> Vec<Metric> {
    let (tx, mut rx) = mpsc::channel(4);
    let produce = async move { collector.collect(&tx).await };
    let consume = async {
        let mut records = Vec::new();
        while let Some(metric) = rx.recv().await {
            records.push(metric);
        }
        records
    };
    let ((), records) = tokio::join!(produce, consume);
    records
}

fn gauge_parts(metric: &Metric) -> (String, Vec<String>, f64) {
    match metric {
        Metric::Gauge(g) => (
            g.name().to_string(),
            g.label_values().to_vec(),
            g.value(),
        ),
        Metric::Invalid(e) => panic!("unexpected invalid record: {}", e),
    }
}

#[tokio::test]
async fn test_collect_success_emits_duration_then_hosts() {
    let page = status_page(&[
        status_row(Some("web1"), Some("http"), "OK"),
        status_row(None, Some("disk"), "CRITICAL"),
        spacer_row(),
        status_row(Some("db1"), Some("ping"), "OK"),
        status_row(None, Some("load"), "OK"),
        spacer_row(),
        status_row(Some("api1"), None, "OK"),
    ]);
    let mock = start_mock_nagios(200, page).await;

    let collector = NagiosCollector::new(&mock.addr.to_string(), &FetchConfig::default()).unwrap();
    let records = collect_all(&collector).await;

    assert_eq!(records.len(), 3);

    let (name, labels, duration) = gauge_parts(&records[0]);
    assert_eq!(name, DURATION_METRIC);
    assert!(labels.is_empty());
    assert!(duration >= 0.0);

    let mut hosts: Vec<(String, f64)> = records[1..]
        .iter()
        .map(|m| {
            let (name, labels, value) = gauge_parts(m);
            assert_eq!(name, HOST_STATUS_METRIC);
            (labels[0].clone(), value)
        })
        .collect();
    hosts.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(hosts, vec![("db1".to_string(), 0.0), ("web1".to_string(), 1.0)]);

    let requests = mock.requests.lock().unwrap();
    assert_eq!(
        requests[0],
        "GET /nagios/cgi-bin/status.cgi?host=all&embedded=1&noheader=1 HTTP/1.1"
    );
}

#[tokio::test]
async fn test_collect_is_fresh_every_cycle() {
    let page = status_page(&[status_row(Some("db1"), Some("ping"), "OK")]);
    let mock = start_mock_nagios(200, page).await;
    let collector = NagiosCollector::new(&mock.addr.to_string(), &FetchConfig::default()).unwrap();

    for _ in 0..3 {
        let records = collect_all(&collector).await;
        assert_eq!(records.len(), 2);
        assert_eq!(gauge_parts(&records[1]), (HOST_STATUS_METRIC.to_string(), vec!["db1".to_string()], 0.0));
    }
    assert_eq!(mock.requests.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_collect_empty_table_emits_only_duration() {
    let mock = start_mock_nagios(200, status_page(&[])).await;
    let collector = NagiosCollector::new(&mock.addr.to_string(), &FetchConfig::default()).unwrap();

    let records = collect_all(&collector).await;
    assert_eq!(records.len(), 1);
    assert_eq!(gauge_parts(&records[0]).0, DURATION_METRIC);
}

#[tokio::test]
async fn test_collect_non_success_status_is_invalid() {
    let mock = start_mock_nagios(503, "maintenance".to_string()).await;
    let sink = Arc::new(RecordingSink::default());
    let collector = NagiosCollector::new(&mock.addr.to_string(), &FetchConfig::default())
        .unwrap()
        .with_event_sink(sink.clone());

    let records = collect_all(&collector).await;
    assert_eq!(records.len(), 1);
    assert!(records[0].is_invalid());
    assert_eq!(*sink.kinds.lock().unwrap(), vec!["fetch.status".to_string()]);
}

#[tokio::test]
async fn test_collect_unparsable_page_is_invalid() {
    let mock = start_mock_nagios(200, String::new()).await;
    let sink = Arc::new(RecordingSink::default());
    let collector = NagiosCollector::new(&mock.addr.to_string(), &FetchConfig::default())
        .unwrap()
        .with_event_sink(sink.clone());

    let records = collect_all(&collector).await;
    assert_eq!(records.len(), 1);
    match &records[0] {
        Metric::Invalid(invalid) => assert_eq!(invalid.to_string(), "status page is empty"),
        Metric::Gauge(g) => panic!("unexpected gauge {}", g.name()),
    }
    assert_eq!(*sink.kinds.lock().unwrap(), vec!["parse.empty".to_string()]);
    assert_eq!(mock.requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_collect_tolerates_non_utf8_page() {
    let page = status_page(&[status_row(Some("web1"), Some("http"), "OK")]);
    let mut body = page.into_bytes();
    body.extend_from_slice(b"<!-- Pr\xFCfung -->");
    let mock = start_mock_nagios_bytes(200, body).await;
    let collector = NagiosCollector::new(&mock.addr.to_string(), &FetchConfig::default()).unwrap();

    let records = collect_all(&collector).await;
    assert_eq!(records.len(), 2);
    assert_eq!(
        gauge_parts(&records[1]),
        (HOST_STATUS_METRIC.to_string(), vec!["web1".to_string()], 0.0)
    );
}

#[tokio::test]
async fn test_collect_timeout_is_invalid() {
    let addr = start_silent_backend().await;
    let sink = Arc::new(RecordingSink::default());
    let config = FetchConfig {
        request_timeout: Duration::from_millis(300),
        ..FetchConfig::default()
    };
    let collector = NagiosCollector::new(&addr.to_string(), &config)
        .unwrap()
        .with_event_sink(sink.clone());

    let started = Instant::now();
    let records = collect_all(&collector).await;
    assert!(started.elapsed() < Duration::from_secs(5));

    assert_eq!(records.len(), 1);
    match &records[0] {
        Metric::Invalid(invalid) => assert!(invalid.to_string().contains("timed out")),
        Metric::Gauge(_) => panic!("expected invalid record"),
    }
    assert_eq!(*sink.kinds.lock().unwrap(), vec!["fetch.timeout".to_string()]);
}

#[tokio::test]
async fn test_collect_concurrently() {
    let page = status_page(&[
        status_row(Some("web1"), Some("http"), "OK"),
        status_row(Some("web2"), Some("http"), "WARNING"),
    ]);
    let mock = start_mock_nagios(200, page).await;
    let collector = Arc::new(
        NagiosCollector::new(&mock.addr.to_string(), &FetchConfig::default()).unwrap(),
    );

    let mut handles = Vec::new();
    for _ in 0..4 {
        let collector = collector.clone();
        handles.push(tokio::spawn(async move { collect_all(&collector).await.len() }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), 3);
    }
}
