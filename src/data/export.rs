use std::io::Write;

use serde::Serialize;

use super::filter::Selection;
use super::model::PaperSet;

// ---------------------------------------------------------------------------
// CSV export of a filtered view
// ---------------------------------------------------------------------------

/// Columns written to the export, matching the preview table.
pub const EXPORT_COLUMNS: [&str; 4] = ["title", "journal", "year", "publish_time"];

/// One exported record.  Field order defines the CSV header.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    title: &'a str,
    journal: &'a str,
    year: i32,
    publish_time: String,
}

/// Serialize the filtered view to CSV.
///
/// Header row first, then one record per index in filtered (not source)
/// order.  Dates are normalized to ISO `%Y-%m-%d`; quoting of embedded
/// commas and quotes follows standard CSV rules.
pub fn write_csv<W: Write>(
    set: &PaperSet,
    indices: &[usize],
    writer: W,
) -> Result<(), csv::Error> {
    let mut w = csv::Writer::from_writer(writer);
    for &i in indices {
        let paper = &set.papers[i];
        w.serialize(ExportRow {
            title: &paper.title,
            journal: &paper.journal,
            year: paper.year,
            publish_time: paper.publish_time.format("%Y-%m-%d").to_string(),
        })?;
    }
    w.flush()?;
    Ok(())
}

/// Suggested filename for an export covering the given year range.
pub fn export_filename(selection: &Selection) -> String {
    format!("papers_{}-{}.csv", selection.year_min, selection.year_max)
}
