use crate::results::{BatchReport, PageResult};
use serde::Serialize;
use std::fmt::Write as _;
use std::io;

/// One line of the exported table
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    url: &'a str,
    word_count: usize,
    status: &'a str,
    error: &'a str,
}

/// Writes the results table as CSV with columns `url,word_count,status,error`.
///
/// Invalid input lines are included as error rows so every input line shows up.
pub fn write_csv<W: io::Write>(report: &BatchReport, writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    // Rows write the header themselves; an empty report still gets one
    if report.results.is_empty() && report.invalid.is_empty() {
        csv_writer.write_record(["url", "word_count", "status", "error"])?;
    }

    for result in &report.results {
        csv_writer.serialize(CsvRow {
            url: &result.url,
            word_count: result.word_count,
            status: if result.is_success() { "success" } else { "error" },
            error: result.error_message.as_deref().unwrap_or(""),
        })?;
    }

    for invalid in &report.invalid {
        let error = format!("invalid URL: {}", invalid.reason);
        csv_writer.serialize(CsvRow {
            url: &invalid.url,
            word_count: 0,
            status: "error",
            error: &error,
        })?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Renders the results table as a CSV string
pub fn to_csv_string(report: &BatchReport) -> Result<String, csv::Error> {
    let mut buf = Vec::new();
    write_csv(report, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Renders one page as a text block: URL, word count, then the text or error.
///
/// `preview_chars` truncates the body text; 0 shows it in full.
pub fn render_page(result: &PageResult, preview_chars: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "-".repeat(72));
    let _ = writeln!(out, "URL: {}", result.url);

    match &result.error_message {
        Some(message) => {
            let _ = writeln!(out, "Status: error");
            let _ = writeln!(out, "Error: {message}");
        }
        None => {
            let _ = writeln!(out, "Word count: {}", result.word_count);
            if result.body_text.is_empty() {
                let _ = writeln!(out, "(no content extracted)");
            } else {
                let _ = writeln!(out);
                let _ = writeln!(out, "{}", preview(&result.body_text, preview_chars));
            }
        }
    }
    out
}

/// Renders the batch summary and the results table
pub fn render_summary(report: &BatchReport) -> String {
    let stats = &report.stats;
    let mut out = String::new();

    let _ = writeln!(out, "{}", "=".repeat(72));
    let _ = writeln!(out, "Total words:        {}", stats.total_words);
    let _ = writeln!(out, "Average words/page: {:.1}", stats.average_words_per_page);
    let _ = writeln!(
        out,
        "Successful pages:   {} of {} ({:.0}%)",
        stats.succeeded,
        stats.attempted,
        stats.success_ratio * 100.0
    );
    if stats.invalid > 0 {
        let _ = writeln!(out, "Invalid URLs:       {}", stats.invalid);
    }
    let _ = writeln!(out);

    let url_width = report
        .results
        .iter()
        .map(|r| r.url.chars().count())
        .chain(report.invalid.iter().map(|i| i.url.chars().count()))
        .chain(std::iter::once(3))
        .max()
        .unwrap_or(3)
        .min(60);

    let _ = writeln!(out, "{:<url_width$}  {:>10}  {:<7}  error", "url", "word_count", "status");
    for result in &report.results {
        let _ = writeln!(
            out,
            "{:<url_width$}  {:>10}  {:<7}  {}",
            result.url,
            result.word_count,
            result.status.to_string(),
            result.error_message.as_deref().unwrap_or("")
        );
    }
    for invalid in &report.invalid {
        let _ = writeln!(
            out,
            "{:<url_width$}  {:>10}  {:<7}  invalid URL: {}",
            invalid.url, 0, "error", invalid.reason
        );
    }
    out
}

fn preview(text: &str, max_chars: usize) -> String {
    if max_chars == 0 || text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::Extraction;
    use crate::filter::InvalidUrl;

    fn report() -> BatchReport {
        BatchReport::new(
            vec![
                PageResult::success(
                    "https://shop.example/boots",
                    Extraction::from_text("Warm boots, built to last.".to_string()),
                ),
                PageResult::failure(
                    "https://shop.example/slow",
                    "timeout after 15s fetching https://shop.example/slow",
                ),
            ],
            vec![InvalidUrl {
                url: "not a url".to_string(),
                reason: "not a URL: relative URL without a base".to_string(),
            }],
            1200,
        )
    }

    #[test]
    fn test_csv_columns_and_rows() {
        let csv = to_csv_string(&report()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "url,word_count,status,error");
        assert_eq!(lines[1], "https://shop.example/boots,5,success,");
        assert_eq!(
            lines[2],
            "https://shop.example/slow,0,error,timeout after 15s fetching https://shop.example/slow"
        );
        assert_eq!(
            lines[3],
            "not a url,0,error,invalid URL: not a URL: relative URL without a base"
        );
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_csv_quotes_commas() {
        let report = BatchReport::new(
            vec![PageResult::failure("https://a.example/?q=1,2", "bad, very bad")],
            vec![],
            0,
        );
        let csv = to_csv_string(&report).unwrap();
        assert!(csv.contains("\"https://a.example/?q=1,2\",0,error,\"bad, very bad\""));
    }

    #[test]
    fn test_render_page_success_and_error() {
        let report = report();

        let block = render_page(&report.results[0], 0);
        assert!(block.contains("URL: https://shop.example/boots"));
        assert!(block.contains("Word count: 5"));
        assert!(block.contains("Warm boots, built to last."));

        let block = render_page(&report.results[1], 0);
        assert!(block.contains("Status: error"));
        assert!(block.contains("Error: timeout after 15s"));
    }

    #[test]
    fn test_render_page_preview() {
        let result = PageResult::success(
            "https://a.example/",
            Extraction::from_text("abcdefghij klmnop".to_string()),
        );
        let block = render_page(&result, 10);
        assert!(block.contains("abcdefghij…"));
        assert!(!block.contains("klmnop"));
    }

    #[test]
    fn test_render_summary() {
        let summary = render_summary(&report());
        assert!(summary.contains("Total words:        5"));
        assert!(summary.contains("Average words/page: 5.0"));
        assert!(summary.contains("Successful pages:   1 of 2 (50%)"));
        assert!(summary.contains("Invalid URLs:       1"));
        assert!(summary.contains("https://shop.example/slow"));
        assert!(summary.contains("invalid URL: not a URL"));
    }

    #[test]
    fn test_preview_short_text_untouched() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("anything", 0), "anything");
    }
}
