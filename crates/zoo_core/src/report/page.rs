//! Pagination and file export for built reports.

use super::{Report, ReportError, ReportResult};
use log::info;
use std::path::Path;

const PAGE_BREAK: char = '\u{c}';

/// One printable page of a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number.
    pub number: usize,
    pub total: usize,
    pub lines: Vec<String>,
}

/// Splits a report into pages of at most `rows_per_page` body rows.
///
/// Every page repeats the title and column header; the summary line closes
/// the last page. An empty report still produces one page.
pub fn paginate(report: &Report, rows_per_page: usize) -> Vec<Page> {
    let rows_per_page = rows_per_page.max(1);
    let chunks: Vec<&[String]> = if report.rows.is_empty() {
        vec![report.rows.as_slice()]
    } else {
        report.rows.chunks(rows_per_page).collect()
    };
    let total = chunks.len();

    chunks
        .into_iter()
        .enumerate()
        .map(|(index, chunk)| {
            let number = index + 1;
            let mut lines = vec![format!("{} (page {number}/{total})", report.title)];
            if let Some(header) = &report.header {
                lines.push(header.clone());
                lines.push("-".repeat(header.chars().count()));
            }
            lines.extend(chunk.iter().cloned());
            if number == total {
                lines.push(String::new());
                lines.push(report.summary.clone());
            }
            Page {
                number,
                total,
                lines,
            }
        })
        .collect()
}

/// Writes the paginated report to `path`, pages separated by form feeds.
///
/// Returns the number of pages written.
pub fn export_report(
    report: &Report,
    path: impl AsRef<Path>,
    rows_per_page: usize,
) -> ReportResult<usize> {
    let path = path.as_ref();
    let pages = paginate(report, rows_per_page);
    let mut document = String::new();
    for (index, page) in pages.iter().enumerate() {
        if index > 0 {
            document.push(PAGE_BREAK);
        }
        for line in &page.lines {
            document.push_str(line);
            document.push('\n');
        }
    }

    std::fs::write(path, document).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!(
        "event=report_export module=report status=ok kind={} pages={} path={}",
        report.kind,
        pages.len(),
        path.display()
    );
    Ok(pages.len())
}
