//! Summary rendering.

use std::io::Write;

use histfill_core::{Bar, RunSummary};

use crate::cli::OutputFormat;
use crate::error::CliError;

pub fn render(summary: &RunSummary, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_summary(&mut out, summary, format, pretty)?;
    out.flush()?;
    Ok(())
}

fn write_summary(
    out: &mut impl Write,
    summary: &RunSummary,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            if pretty {
                serde_json::to_writer_pretty(&mut *out, summary)?;
            } else {
                serde_json::to_writer(&mut *out, summary)?;
            }
            writeln!(out)?;
        }
        OutputFormat::Table => write_table(out, summary)?,
    }
    Ok(())
}

fn write_table(out: &mut impl Write, summary: &RunSummary) -> std::io::Result<()> {
    writeln!(
        out,
        "{}: {} rows from {} requests ({} empty) saved to {}",
        summary.contract,
        summary.rows,
        summary.requests,
        summary.empty_requests,
        summary.output.display()
    )?;
    if summary.preview.is_empty() {
        return Ok(());
    }

    writeln!(out)?;
    writeln!(
        out,
        "{:<20} {:>10} {:>10} {:>10} {:>10} {:>12} {:>10} {:>8}",
        "date", "open", "high", "low", "close", "volume", "average", "barCount"
    )?;
    for bar in &summary.preview {
        write_row(out, bar)?;
    }
    Ok(())
}

fn write_row(out: &mut impl Write, bar: &Bar) -> std::io::Result<()> {
    writeln!(
        out,
        "{:<20} {:>10} {:>10} {:>10} {:>10} {:>12} {:>10} {:>8}",
        bar.date.to_string(),
        bar.open,
        bar.high,
        bar.low,
        bar.close,
        bar.volume,
        bar.average,
        bar.bar_count
    )
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use histfill_core::UtcDateTime;

    use super::*;

    fn summary(preview: Vec<Bar>) -> RunSummary {
        RunSummary {
            contract: String::from("IND VIX@CBOE"),
            output: PathBuf::from("VIX_5min_data.csv"),
            rows: preview.len(),
            requests: 3,
            empty_requests: 1,
            preview,
        }
    }

    fn bar() -> Bar {
        let date = UtcDateTime::parse("2024-03-08T14:30:00Z").expect("date");
        Bar::new(date, 14.5, 14.75, 14.25, 14.6, -1.0, -1.0, 0)
    }

    #[test]
    fn table_lists_header_and_preview_rows() {
        let mut out = Vec::new();
        write_summary(&mut out, &summary(vec![bar()]), OutputFormat::Table, false)
            .expect("render");
        let text = String::from_utf8(out).expect("utf8");
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(
            lines[0],
            "IND VIX@CBOE: 1 rows from 3 requests (1 empty) saved to VIX_5min_data.csv"
        );
        assert!(lines[2].starts_with("date"));
        assert!(lines[3].starts_with("2024-03-08T14:30:00Z"));
        assert!(lines[3].contains("14.75"));
    }

    #[test]
    fn empty_preview_prints_only_the_summary_line() {
        let mut out = Vec::new();
        write_summary(&mut out, &summary(Vec::new()), OutputFormat::Table, false)
            .expect("render");
        assert_eq!(String::from_utf8(out).expect("utf8").lines().count(), 1);
    }

    #[test]
    fn json_carries_rows_and_preview() {
        let mut out = Vec::new();
        write_summary(&mut out, &summary(vec![bar()]), OutputFormat::Json, false)
            .expect("render");
        let value: serde_json::Value = serde_json::from_slice(&out).expect("json");

        assert_eq!(value["rows"], 1);
        assert_eq!(value["preview"][0]["date"], "2024-03-08T14:30:00Z");
        assert_eq!(value["preview"][0]["barCount"], 0);
    }
}
