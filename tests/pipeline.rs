#[path = "common/mod.rs"]
mod common;

use common::*;
use std::fs;
use tweet_stats::{LineWriter, TweetStats, YearMonth, GENERAL_STATS_FILE, LANGUAGES_FILE, MONTHLY_SUBDIR};

/// End-to-end over a plain `.jsonl` dump:
/// - three month files named `tweet_ids_YYYY_MM.txt`, ids sorted
/// - `general_stats.txt` with totals and formatted first/last dates
/// - `tweets_by_language.txt` ordered by descending count
#[test]
fn run_writes_monthly_and_statistics_files() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("datasets").join("tweets.jsonl");
    let out = tmp.path().join("out");
    write_lines(&input, &sample_dump());

    let report = TweetStats::new()
        .input(&input)
        .output_dir(&out)
        .progress(false)
        .run()
        .unwrap();

    assert_eq!(report.stats.total(), 6);

    let monthly = out.join(MONTHLY_SUBDIR);
    let names: Vec<String> = report
        .monthly_files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["tweet_ids_2023_03.txt", "tweet_ids_2023_04.txt", "tweet_ids_2024_01.txt"]);

    assert_eq!(read_lines(&monthly.join("tweet_ids_2023_03.txt")), vec!["1", "2"]);
    assert_eq!(read_lines(&monthly.join("tweet_ids_2023_04.txt")), vec!["3", "4", "5"]);
    assert_eq!(read_lines(&monthly.join("tweet_ids_2024_01.txt")), vec!["6"]);

    // Staged `.inprogress` files must all have been promoted.
    let leftovers: Vec<_> = fs::read_dir(&monthly)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().map_or(true, |x| x != "txt"))
        .collect();
    assert!(leftovers.is_empty(), "unexpected files: {leftovers:?}");

    assert_eq!(report.general_stats_file, out.join(GENERAL_STATS_FILE));
    assert_eq!(
        read_lines(&report.general_stats_file),
        vec![
            "Total tweets: 6",
            "Total unique authors: 4",
            "First tweet date: 2023-03-01 08:30:00",
            "Last tweet date: 2024-01-15 23:59:59",
        ]
    );

    assert_eq!(report.languages_file, out.join(LANGUAGES_FILE));
    assert_eq!(read_lines(&report.languages_file), vec!["en: 3", "ja: 2"]);
}

/// Two posts in different months produce two files, each holding only its own id.
#[test]
fn two_months_two_files() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("two.jsonl");
    write_lines(
        &input,
        &[
            post("100", "2021-12-31T23:59:59.999999Z", "a", "en"),
            post("200", "2022-01-01T00:00:00.000000Z", "b", "en"),
        ],
    );

    let job = TweetStats::new().input(&input).output_dir(tmp.path().join("out")).progress(false);
    let stats = job.aggregate().unwrap();
    let files = job.write_monthly(&stats).unwrap();

    assert_eq!(files.len(), 2);
    assert_eq!(read_lines(&files[0]), vec!["100"]);
    assert_eq!(read_lines(&files[1]), vec!["200"]);
}

/// `.zst` dumps and directories of dumps feed one accumulator.
/// The directory holds a plain part (2023-03) and a compressed part (2023-04),
/// plus an unrelated `notes.txt` that must be ignored.
#[test]
fn directory_of_plain_and_zstd_dumps() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("dumps");
    write_lines(&dir.join("part_01.jsonl"), &[post("1", "2023-03-05T10:00:00.000000Z", "a", "en")]);
    write_zst_lines(
        &dir.join("nested").join("part_02.jsonl.zst"),
        &[
            post("2", "2023-04-05T10:00:00.000000Z", "b", "de"),
            "garbage".to_string(),
            post("3", "2023-04-06T10:00:00.000000Z", "a", "de"),
        ],
    );
    fs::write(dir.join("notes.txt"), "not a dump\n").unwrap();

    let stats = TweetStats::new().input(&dir).progress(false).aggregate().unwrap();

    assert_eq!(stats.total(), 3);
    assert_eq!(stats.skipped().invalid_json, 1);
    assert_eq!(stats.month(YearMonth::new(2023, 4)).unwrap().len(), 2);
    assert_eq!(stats.unique_authors().len(), 2);
    assert_eq!(stats.languages().most_common(), vec![("de", 2), ("en", 1)]);
}

/// With no usable posts the statistics file still has four lines; dates read `n/a`.
#[test]
fn empty_input_writes_placeholder_dates() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("empty.jsonl");
    write_lines(&input, &["{oops".to_string()]);
    let out = tmp.path().join("out");

    let report = TweetStats::new().input(&input).output_dir(&out).progress(false).run().unwrap();

    assert!(report.monthly_files.is_empty());
    assert_eq!(
        read_lines(&report.general_stats_file),
        vec!["Total tweets: 0", "Total unique authors: 0", "First tweet date: n/a", "Last tweet date: n/a"]
    );
    assert!(read_lines(&report.languages_file).is_empty());
}

/// Re-running over the same output directory replaces the files, it does not append.
#[test]
fn rerun_overwrites_outputs() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("in.jsonl");
    let out = tmp.path().join("out");
    write_lines(&input, &sample_dump());

    let job = TweetStats::new().input(&input).output_dir(&out).progress(false);
    let first = job.run().unwrap();
    let second = job.run().unwrap();

    assert_eq!(first.stats, second.stats);
    assert_eq!(read_lines(&second.monthly_files[1]), vec!["3", "4", "5"]);
    assert_eq!(read_lines(&second.general_stats_file).len(), 4);
}

/// An input path that does not exist is the one fatal error.
#[test]
fn missing_input_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let err = TweetStats::new()
        .input(tmp.path().join("nope.jsonl"))
        .progress(false)
        .aggregate()
        .unwrap_err();
    assert!(err.to_string().contains("cannot open input"), "got: {err:#}");
}

/// Custom monthly subdirectory from the options builder.
#[test]
fn custom_monthly_subdir() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("in.jsonl");
    write_lines(&input, &[post("1", "2023-04-01T12:00:00.000000Z", "a", "en")]);

    let job = TweetStats::new()
        .input(&input)
        .output_dir(tmp.path())
        .monthly_subdir("by_month")
        .io_buffers(1, 1)
        .progress(false);
    assert_eq!(job.options().read_buffer_bytes, 8 * 1024);

    let files = job.run().unwrap().monthly_files;
    assert_eq!(files, vec![tmp.path().join("by_month").join("tweet_ids_2023_04.txt")]);
}

/// A directory walk that hits an unreadable entry (here a dangling symlink)
/// fails the run instead of reporting statistics with data missing.
#[cfg(unix)]
#[test]
fn dangling_symlink_in_input_directory_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("dumps");
    write_lines(&dir.join("a.jsonl"), &[post("1", "2023-04-01T12:00:00.000000Z", "a", "en")]);
    std::os::unix::fs::symlink(tmp.path().join("gone.jsonl"), dir.join("b.jsonl")).unwrap();

    let err = TweetStats::new().input(&dir).progress(false).aggregate().unwrap_err();
    assert!(err.to_string().contains("cannot open input"), "got: {err:#}");

    // The same link given directly is fatal too.
    assert!(TweetStats::new().input(dir.join("b.jsonl")).progress(false).aggregate().is_err());
}

/// A writer dropped before `finish()` leaves neither the staging file nor the final file.
#[test]
fn unfinished_writer_removes_staging_file() {
    let tmp = tempfile::tempdir().unwrap();
    let target = tmp.path().join("tweet_ids_2023_04.txt");

    let mut w = LineWriter::create(&target, 8 * 1024).unwrap();
    w.write_line("1").unwrap();
    let staging = w.staging_path().to_path_buf();
    assert!(staging.exists());
    drop(w);

    assert!(!staging.exists());
    assert!(!target.exists());

    let mut w = LineWriter::create(&target, 8 * 1024).unwrap();
    w.write_line("1").unwrap();
    w.write_line("2").unwrap();
    assert_eq!(w.finish().unwrap(), target);
    assert_eq!(read_lines(&target), vec!["1", "2"]);
    assert!(!staging.exists());
}
