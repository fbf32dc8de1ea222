//! Behavior tests for the CSV sink.

use histfill_core::{read_csv, Bar, CsvSink, ResultTable, UtcDateTime};
use tempfile::tempdir;

fn bar(seconds: i64, close: f64, bar_count: i64) -> Bar {
    let date = UtcDateTime::from_unix_seconds(seconds).expect("valid timestamp");
    Bar::new(date, 17.02, 17.31, 16.875, close, 1250.0, 17.1043, bar_count)
}

#[test]
fn written_rows_read_back_with_equal_values() {
    // Given: a table of bars with awkward decimal values
    let mut table = ResultTable::new();
    table.prepend(vec![bar(1_709_913_600, 17.15, 42), bar(1_709_913_900, 0.1 + 0.2, 7)]);
    table.prepend(vec![bar(1_709_827_200, 16.999_999, 0)]);
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("bars.csv");

    // When: the table is written and read back
    let written = CsvSink::new(&path).write(&table).expect("write");
    let rows = read_csv(&path).expect("read");

    // Then: every row survives unchanged and in table order
    assert_eq!(written, 3);
    assert_eq!(rows, table.into_rows());
}

#[test]
fn existing_file_is_replaced() {
    // Given: a stale file at the destination
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("VIX_5min_data.csv");
    std::fs::write(&path, "stale contents\nthat are longer than the new file\n").expect("seed");
    let mut table = ResultTable::new();
    table.prepend(vec![bar(1_709_913_600, 17.15, 42)]);

    // When: the table is written
    CsvSink::new(&path).write(&table).expect("write");

    // Then: only the new contents remain, with no staging files left behind
    let text = std::fs::read_to_string(&path).expect("read");
    assert!(text.starts_with("date,open,high,low,close,volume,average,barCount\n"));
    assert_eq!(text.lines().count(), 2);
    let entries = std::fs::read_dir(dir.path()).expect("list").count();
    assert_eq!(entries, 1);
}

#[test]
fn header_only_file_reads_back_as_no_rows() {
    // Given: an empty table written to disk
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("empty.csv");
    CsvSink::new(&path).write(&ResultTable::new()).expect("write");

    // When: the file is read back
    let rows = read_csv(&path).expect("read");

    // Then: there are no rows
    assert!(rows.is_empty());
}
