#![allow(dead_code)]

use serde_json::json;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// One post line in the dump layout (`created_at` with microseconds and a `Z`).
pub fn post(id: &str, created_at: &str, author_id: &str, lang: &str) -> String {
    json!({
        "id": id,
        "created_at": created_at,
        "author_id": author_id,
        "lang": lang,
        "text": format!("post {id}"),
        "public_metrics": { "like_count": 0, "retweet_count": 0 }
    })
    .to_string()
}

/// Write plain JSONL lines to `path` (parents created).
pub fn write_lines(path: &Path, lines: &[String]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut f = File::create(path).unwrap();
    for l in lines {
        writeln!(&mut f, "{}", l).unwrap();
    }
}

/// Write a compressed `.zst` file containing the provided JSONL lines.
pub fn write_zst_lines(path: &Path, lines: &[String]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let f = File::create(path).unwrap();
    let mut enc = zstd::stream::write::Encoder::new(f, 3).unwrap();
    for l in lines {
        writeln!(&mut enc, "{}", l).unwrap();
    }
    enc.finish().unwrap();
}

/// Read a text file line-by-line into strings (skips empty lines).
pub fn read_lines(path: &Path) -> Vec<String> {
    let f = File::open(path).unwrap();
    let r = BufReader::new(f);
    r.lines().map(|l| l.unwrap()).filter(|s| !s.is_empty()).collect()
}

/// A small dump spanning three months:
/// - 2023-03: ids 1, 2 (authors a, b; langs en, ja)
/// - 2023-04: ids 3, 4, 5 (authors a, c, c; langs en, en, <none>)
/// - 2024-01: id 6 (author d; lang ja)
/// plus one invalid JSON line, one post without `created_at`,
/// one post with a malformed timestamp, and one blank line.
///
/// Earliest post is id 2 (2023-03-01 08:30:00), latest is id 6 (2024-01-15 23:59:59).
pub fn sample_dump() -> Vec<String> {
    vec![
        post("1", "2023-03-05T10:00:00.000000Z", "a", "en"),
        post("2", "2023-03-01T08:30:00.123456Z", "b", "ja"),
        "{not json".to_string(),
        post("3", "2023-04-10T00:00:00.000000Z", "a", "en"),
        json!({ "id": "x1", "author_id": "z", "lang": "en" }).to_string(),
        post("4", "2023-04-11T12:00:00.000000Z", "c", "en"),
        json!({ "id": "5", "created_at": "2023-04-30T18:45:10.000001Z", "author_id": "c" }).to_string(),
        post("bad-ts", "2023/04/30 18:45", "e", "fr"),
        String::new(),
        post("6", "2024-01-15T23:59:59.999999Z", "d", "ja"),
    ]
}

/// Run `f` with a thread-local fmt subscriber at DEBUG and return its output as text.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct Sink(Arc<Mutex<Vec<u8>>>);
    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let sink = Sink(Arc::new(Mutex::new(Vec::new())));
    let writer = sink.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    let text = String::from_utf8(sink.0.lock().unwrap().clone()).unwrap();
    (out, text)
}
