use std::collections::HashMap;
use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, Once};

use async_trait::async_trait;

use s3_table::{BlobStorageProvider, FetchErrorKind, S3Config, StorageFetcher, Value};

/// An in-memory store that counts the requests it receives
#[derive(Default)]
struct Memory {
    blobs: HashMap<String, Vec<u8>>,
    requests: AtomicUsize,
}

impl Memory {
    fn with(mut self, blob_name: &str, contents: &str) -> Self {
        self.blobs
            .insert(blob_name.to_string(), contents.as_bytes().to_vec());
        self
    }

    fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStorageProvider for Memory {
    async fn maybe_get(&self, blob_name: &str) -> Result<Option<Vec<u8>>, std::io::Error> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.blobs.get(blob_name).cloned())
    }

    fn container(&self) -> &str {
        "memory"
    }
}

/// Records every log entry so that tests can assert on them
struct Capture(Mutex<Vec<(log::Level, String)>>);

impl log::Log for Capture {
    fn enabled(&self, _: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        self.0
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static LOGS: Capture = Capture(Mutex::new(Vec::new()));
static INIT: Once = Once::new();

fn capture_logs() {
    INIT.call_once(|| {
        log::set_logger(&LOGS).unwrap();
        log::set_max_level(log::LevelFilter::Trace);
    });
}

/// Number of entries at `level` mentioning `needle`
fn logged(level: log::Level, needle: &str) -> usize {
    LOGS.0
        .lock()
        .unwrap()
        .iter()
        .filter(|(l, message)| *l == level && message.contains(needle))
        .count()
}

fn sample() -> Memory {
    Memory::default()
        .with("data/sample.csv", "a,b\n1,2\n3,4")
        .with("data/malformed.csv", "a,b\n1,2\n3,4,5\n")
        .with("data/short.csv", "a,b\n1\n3,4\n")
}

#[tokio::test]
async fn fetch_sample() -> Result<(), Box<dyn Error>> {
    let fetcher = StorageFetcher::with_provider(sample());

    let table = fetcher.fetch_object("data/sample.csv").await.ok_or("absent")?;

    assert_eq!(table.num_rows(), 2);
    assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(
        table.rows(),
        &[
            vec![Value::Int64(1), Value::Int64(2)],
            vec![Value::Int64(3), Value::Int64(4)]
        ]
    );
    assert_eq!(fetcher.provider().requests(), 1);
    Ok(())
}

/// Rows are the content lines minus the header
#[tokio::test]
async fn rows_and_columns_follow_content() -> Result<(), Box<dyn Error>> {
    let content = "id,name,score\n1,ana,1.5\n2,bo,2\n3,cy,\n4,di,7.25\n";
    let fetcher =
        StorageFetcher::with_provider(Memory::default().with("scores.csv", content));

    let table = fetcher.fetch_object("scores.csv").await.ok_or("absent")?;

    assert_eq!(table.num_rows(), content.lines().count() - 1);
    assert_eq!(
        table.column_names().collect::<Vec<_>>(),
        vec!["id", "name", "score"]
    );
    assert_eq!(table.value(2, "score"), Some(&Value::Null));
    assert_eq!(table.value(3, "score"), Some(&Value::Float64(7.25)));
    Ok(())
}

#[tokio::test]
async fn missing_key_logs_one_error() {
    capture_logs();
    let fetcher = StorageFetcher::with_provider(sample());

    assert!(fetcher.fetch_object("missing/key.csv").await.is_none());

    assert_eq!(logged(log::Level::Error, "missing/key.csv"), 1);
    assert_eq!(fetcher.provider().requests(), 1);
}

#[tokio::test]
async fn success_logs_record_count() {
    capture_logs();
    let fetcher = StorageFetcher::with_provider(
        Memory::default().with("logged/count.csv", "x\n1\n2\n3\n"),
    );

    assert!(fetcher.fetch_object("logged/count.csv").await.is_some());

    assert_eq!(logged(log::Level::Info, "'logged/count.csv' with 3 records"), 1);
    assert_eq!(logged(log::Level::Error, "logged/count.csv"), 0);
}

/// Records with fewer fields than the header are padded with nulls
#[tokio::test]
async fn short_records_are_padded() -> Result<(), Box<dyn Error>> {
    let fetcher = StorageFetcher::with_provider(sample());

    let table = fetcher.fetch_object("data/short.csv").await.ok_or("absent")?;

    assert_eq!(table.num_rows(), 2);
    assert_eq!(table.column("b"), Some(vec![&Value::Null, &Value::Int64(4)]));
    Ok(())
}

/// A record with more fields than the header makes the whole fetch fail
#[tokio::test]
async fn malformed_is_absent() {
    let fetcher = StorageFetcher::with_provider(sample());

    assert!(fetcher.fetch_object("data/malformed.csv").await.is_none());
    let error = fetcher
        .try_fetch_object("data/malformed.csv")
        .await
        .unwrap_err();
    assert_eq!(error.kind(), FetchErrorKind::Decode);
}

#[tokio::test]
async fn idempotent() {
    let fetcher = StorageFetcher::with_provider(sample());

    let first = fetcher.fetch_object("data/sample.csv").await;
    let second = fetcher.fetch_object("data/sample.csv").await;

    assert!(first.is_some());
    assert_eq!(first, second);
    assert_eq!(fetcher.provider().requests(), 2);
}

/// Empty credentials do not fail on construction, only on the first fetch
#[tokio::test]
async fn empty_credentials() {
    capture_logs();
    let config = S3Config::from_lookup(|name| {
        (name == "S3_ENDPOINT_URL").then(|| "http://127.0.0.1:1".to_string())
    });
    let fetcher = StorageFetcher::new(config).await;

    assert!(fetcher.fetch_object("empty/credentials.csv").await.is_none());
    assert_eq!(logged(log::Level::Error, "empty/credentials.csv"), 1);
}

#[tokio::test]
async fn unreachable_is_transport() {
    let config = S3Config::new("bucket".to_string(), "key".to_string(), "secret".to_string())
        .with_endpoint_url("http://127.0.0.1:1");
    let fetcher = StorageFetcher::new(config).await;

    let error = fetcher
        .try_fetch_object("data/sample.csv")
        .await
        .unwrap_err();
    assert_eq!(error.kind(), FetchErrorKind::Transport);
    assert_eq!(error.key(), "data/sample.csv");
}
