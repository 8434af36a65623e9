use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{
    Array, AsArray, BooleanArray, Date32Array, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::datatypes::DataType;
use bytes::Bytes;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{CellValue, Paper, PaperSet, UNKNOWN_JOURNAL};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Everything that can go wrong between a file on disk and a [`PaperSet`].
///
/// Row-level date-parse failures are not errors; those rows are dropped
/// during normalization.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("parsing CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("parsing JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("reading Parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("reading Parquet: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("malformed input: {0}")]
    Malformed(String),
    #[error("no valid date column found")]
    NoDateColumn,
}

// ---------------------------------------------------------------------------
// Schema constants
// ---------------------------------------------------------------------------

/// Canonical column names of the metadata schema.
const TITLE_COLUMN: &str = "title";
const JOURNAL_COLUMN: &str = "journal";
const DATE_COLUMN: &str = "publish_time";

/// Column names scanned in order when the canonical date column is absent.
const DATE_FALLBACKS: &[&str] = &["pub_date", "published", "date", "publication_date", "created"];

/// Date formats tried in order for each cell of the date column.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d %b %Y", "%b %d, %Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Input format, resolved from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Json,
    Parquet,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "json" => Ok(SourceFormat::Json),
            "parquet" | "pq" => Ok(SourceFormat::Parquet),
            other => Err(LoadError::UnsupportedExtension(other.to_string())),
        }
    }
}

/// Load and normalize a metadata file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one record per paper (the usual shape)
/// * `.json`    – `[{ "title": ..., "journal": ..., "publish_time": ... }, ...]`
/// * `.parquet` – flat scalar columns with the same names
pub fn load_file(path: &Path) -> Result<PaperSet, LoadError> {
    let format = SourceFormat::from_path(path)?;
    let bytes = std::fs::read(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    load_bytes(&bytes, format)
}

/// Load and normalize a metadata byte stream of a known format.
pub fn load_bytes(bytes: &[u8], format: SourceFormat) -> Result<PaperSet, LoadError> {
    let raw = match format {
        SourceFormat::Csv => read_csv(bytes)?,
        SourceFormat::Json => read_json(bytes)?,
        SourceFormat::Parquet => read_parquet(bytes)?,
    };
    normalize(raw)
}

// ---------------------------------------------------------------------------
// Raw table – the format-independent intermediate
// ---------------------------------------------------------------------------

/// Header order plus one column→value map per row.  All three readers
/// converge here so normalization is format-independent.
struct RawTable {
    headers: Vec<String>,
    rows: Vec<BTreeMap<String, CellValue>>,
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// CSV layout: header row with arbitrary column names, no predeclared schema.
fn read_csv(bytes: &[u8]) -> Result<RawTable, LoadError> {
    let mut reader = csv::Reader::from_reader(bytes);
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let mut row = BTreeMap::new();
        for (idx, header) in headers.iter().enumerate() {
            row.insert(
                header.clone(),
                guess_cell_value(record.get(idx).unwrap_or("")),
            );
        }
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

fn guess_cell_value(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "title": "…", "journal": "…", "publish_time": "2020-03-14", "source_x": "PMC" },
///   ...
/// ]
/// ```
fn read_json(bytes: &[u8]) -> Result<RawTable, LoadError> {
    let root: JsonValue = serde_json::from_slice(bytes)?;
    let records = root
        .as_array()
        .ok_or_else(|| LoadError::Malformed("expected top-level JSON array".into()))?;

    let mut headers: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::Malformed(format!("row {i} is not a JSON object")))?;

        let mut row = BTreeMap::new();
        for (key, val) in obj {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.clone());
            }
            row.insert(key.clone(), json_to_cell(val));
        }
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Flat scalar columns (strings, ints, floats, bools, date32).  Works with
/// files written by both Pandas (`df.to_parquet()`) and Polars
/// (`df.write_parquet()`).
fn read_parquet(bytes: &[u8]) -> Result<RawTable, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::copy_from_slice(bytes))?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        for row_idx in 0..batch.num_rows() {
            let mut row = BTreeMap::new();
            for (col_idx, header) in headers.iter().enumerate() {
                row.insert(header.clone(), cell_from_arrow(batch.column(col_idx), row_idx));
            }
            rows.push(row);
        }
    }

    Ok(RawTable { headers, rows })
}

/// Extract a single cell from an Arrow column at a given row.
fn cell_from_arrow(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => {
            if let Some(s) = col.as_any().downcast_ref::<StringArray>() {
                CellValue::String(s.value(row).to_string())
            } else {
                // LargeStringArray
                let s = col.as_string::<i64>();
                CellValue::String(s.value(row).to_string())
            }
        }
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            CellValue::Integer(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            CellValue::Integer(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>().unwrap();
            CellValue::Float(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
            CellValue::Float(arr.value(row))
        }
        DataType::Boolean => {
            let arr = col.as_any().downcast_ref::<BooleanArray>().unwrap();
            CellValue::Bool(arr.value(row))
        }
        DataType::Date32 => {
            let arr = col.as_any().downcast_ref::<Date32Array>().unwrap();
            match arr.value_as_date(row) {
                Some(d) => CellValue::String(d.to_string()),
                None => CellValue::Null,
            }
        }
        _ => CellValue::String(format!("{:?}", col.data_type())),
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Turn a raw table into a [`PaperSet`]:
/// * resolve the date column (canonical name, then the fallback list);
/// * parse dates and derive `year`, dropping rows that fail;
/// * substitute [`UNKNOWN_JOURNAL`] for missing journals;
/// * keep every other column as a passthrough.
fn normalize(raw: RawTable) -> Result<PaperSet, LoadError> {
    let date_col = resolve_date_column(&raw.headers).ok_or(LoadError::NoDateColumn)?;

    let extra_columns: Vec<String> = raw
        .headers
        .iter()
        .filter(|h| {
            h.as_str() != date_col && h.as_str() != TITLE_COLUMN && h.as_str() != JOURNAL_COLUMN
        })
        .cloned()
        .collect();

    let total = raw.rows.len();
    let mut papers = Vec::with_capacity(total);

    for mut row in raw.rows {
        let Some(publish_time) = row.remove(&date_col).as_ref().and_then(parse_publish_date)
        else {
            continue;
        };

        let title = match row.remove(TITLE_COLUMN) {
            Some(CellValue::Null) | None => String::new(),
            Some(CellValue::String(s)) => s,
            Some(other) => other.to_string(),
        };

        let journal = match row.remove(JOURNAL_COLUMN) {
            Some(CellValue::String(s)) if !s.is_empty() => s,
            Some(CellValue::Null) | None => UNKNOWN_JOURNAL.to_string(),
            Some(other) => other.to_string(),
        };

        papers.push(Paper {
            title,
            journal,
            year: publish_time.year(),
            publish_time,
            extra: row,
        });
    }

    let dropped = total - papers.len();
    if dropped > 0 {
        log::warn!("dropped {dropped} of {total} rows with unparseable dates");
    }

    Ok(PaperSet::from_papers(papers, extra_columns))
}

/// Pick the column that holds the publication date.
fn resolve_date_column(headers: &[String]) -> Option<String> {
    if headers.iter().any(|h| h == DATE_COLUMN) {
        return Some(DATE_COLUMN.to_string());
    }
    DATE_FALLBACKS
        .iter()
        .find(|name| headers.iter().any(|h| h == *name))
        .map(|name| name.to_string())
}

fn parse_publish_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::String(s) => parse_date_str(s.trim()),
        // CSV cells like "2020" arrive as integers from type guessing.
        CellValue::Integer(i) => year_to_date(*i),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    // Bare year, as some metadata dumps carry.
    s.parse::<i64>().ok().and_then(year_to_date)
}

fn year_to_date(y: i64) -> Option<NaiveDate> {
    if !(1000..=9999).contains(&y) {
        return None;
    }
    NaiveDate::from_ymd_opt(y as i32, 1, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn load_csv_str(s: &str) -> Result<PaperSet, LoadError> {
        load_bytes(s.as_bytes(), SourceFormat::Csv)
    }

    #[test]
    fn csv_happy_path() {
        let set = load_csv_str(
            "title,journal,publish_time,source_x\n\
             Viral load dynamics,Nature,2020-03-14,PMC\n\
             Vaccine efficacy trial,Nature,2020-07-01,Medline\n\
             Genome sequencing methods,Science,2021-01-20,PMC\n",
        )
        .unwrap();

        assert_eq!(set.len(), 3);
        assert_eq!(set.journals, vec!["Nature", "Science"]);
        assert_eq!(set.extra_columns, vec!["source_x"]);
        assert_eq!(
            set.papers.iter().map(|p| p.year).collect::<Vec<_>>(),
            vec![2020, 2020, 2021]
        );
        assert_eq!(
            set.papers[0].extra.get("source_x"),
            Some(&CellValue::String("PMC".into()))
        );
    }

    #[test]
    fn date_column_falls_back_to_known_aliases() {
        let set = load_csv_str("title,pub_date\nSome paper,2019-11-02\n").unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.papers[0].year, 2019);

        // The fallback column is consumed by the rename, not kept as extra.
        assert!(set.extra_columns.is_empty());
    }

    #[test]
    fn missing_date_column_is_a_schema_error() {
        let err = load_csv_str("title,journal\nA paper,Nature\n").unwrap_err();
        assert!(matches!(err, LoadError::NoDateColumn));
    }

    #[test]
    fn unparseable_dates_drop_the_row() {
        let set = load_csv_str(
            "title,publish_time\n\
             kept,2020-05-05\n\
             dropped,not-a-date\n\
             also kept,2021-06-06\n",
        )
        .unwrap();

        // Raw count is 3; the normalized set is a strict subset.
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.papers.iter().map(|p| p.title.as_str()).collect::<Vec<_>>(),
            vec!["kept", "also kept"]
        );
        assert!(set.papers.iter().all(|p| (1000..=9999).contains(&p.year)));
    }

    #[test]
    fn bare_year_dates_parse() {
        let set = load_csv_str("title,publish_time\nold survey,2005\n").unwrap();
        assert_eq!(set.papers[0].year, 2005);
        assert_eq!(
            set.papers[0].publish_time,
            NaiveDate::from_ymd_opt(2005, 1, 1).unwrap()
        );
    }

    #[test]
    fn datetime_values_parse_to_their_date() {
        let set = load_csv_str("title,publish_time\nx,2020-03-14T12:30:00\n").unwrap();
        assert_eq!(
            set.papers[0].publish_time,
            NaiveDate::from_ymd_opt(2020, 3, 14).unwrap()
        );
    }

    #[test]
    fn absent_journal_column_synthesizes_unknown() {
        let set = load_csv_str("title,publish_time\nA,2020-01-01\nB,2020-01-02\n").unwrap();
        assert!(set.papers.iter().all(|p| p.journal == UNKNOWN_JOURNAL));
        assert_eq!(set.journals, vec![UNKNOWN_JOURNAL]);
    }

    #[test]
    fn empty_journal_cells_become_unknown() {
        let set =
            load_csv_str("title,journal,publish_time\nA,Nature,2020-01-01\nB,,2020-01-02\n")
                .unwrap();
        assert_eq!(set.papers[1].journal, UNKNOWN_JOURNAL);
        assert_eq!(set.journals, vec!["Nature", UNKNOWN_JOURNAL]);
    }

    #[test]
    fn json_records_load() {
        let set = load_bytes(
            br#"[
                {"title": "A", "journal": "Nature", "publish_time": "2020-02-02"},
                {"title": "B", "journal": null, "publish_time": "2021-03-03"}
            ]"#,
            SourceFormat::Json,
        )
        .unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.papers[1].journal, UNKNOWN_JOURNAL);
    }

    #[test]
    fn json_must_be_a_record_array() {
        let err = load_bytes(br#"{"title": "A"}"#, SourceFormat::Json).unwrap_err();
        assert!(matches!(err, LoadError::Malformed(_)));
    }

    #[test]
    fn parquet_flat_columns_load() {
        use arrow::array::StringArray;
        use arrow::datatypes::{DataType, Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("title", DataType::Utf8, false),
            Field::new("journal", DataType::Utf8, false),
            Field::new("publish_time", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["A", "B"])),
                Arc::new(StringArray::from(vec!["Nature", "Science"])),
                Arc::new(StringArray::from(vec!["2020-01-01", "2021-02-02"])),
            ],
        )
        .unwrap();

        let mut buf = Vec::new();
        let mut writer = ArrowWriter::try_new(&mut buf, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let set = load_bytes(&buf, SourceFormat::Parquet).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.papers[1].year, 2021);
    }

    #[test]
    fn load_file_dispatches_on_extension() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "title,publish_time\nfrom disk,2020-04-04\n").unwrap();

        let set = load_file(file.path()).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.papers[0].title, "from disk");

        let err = SourceFormat::from_path(Path::new("metadata.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedExtension(e) if e == "xlsx"));
    }
}
