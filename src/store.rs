//! CSV store of daily sentiment per symbol.
//!
//! The store is a flat CSV file with header `symbol,date,sentiment`. It is
//! append-only from this program's point of view: rows are never changed or
//! removed, and a `(symbol, date)` pair is written at most once. A newly
//! computed value for a date that is already stored is dropped, not used to
//! refresh the old one.
//!
//! # Write Strategy
//!
//! The whole file is read into memory, new rows are appended, and the result
//! is written to a temporary file next to the store which is then renamed
//! over it. A crash mid-write leaves the previous store intact.

use crate::error::StoreError;
use crate::models::{DailySentiment, STORE_COLUMNS, StoredRecord};
use chrono::NaiveDate;
use csv::StringRecord;
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

/// Result of merging one symbol's daily sentiment into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// This many rows were appended and the store was rewritten.
    Appended(usize),
    /// Every date was already stored for the symbol; the file was not touched.
    NoNewRecords,
}

impl MergeOutcome {
    pub fn appended(&self) -> usize {
        match self {
            MergeOutcome::Appended(n) => *n,
            MergeOutcome::NoNewRecords => 0,
        }
    }
}

impl fmt::Display for MergeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeOutcome::Appended(n) => write!(f, "appended {n} new records"),
            MergeOutcome::NoNewRecords => f.write_str("no new records"),
        }
    }
}

/// A row loaded from the store: the parsed key and value, plus the cells
/// exactly as they were read so the row can be written back unchanged.
#[derive(Debug, Clone)]
pub struct StoreRow {
    pub record: StoredRecord,
    raw: StringRecord,
}

/// Read every row of the store.
///
/// A missing or zero-length file is an empty store. A header other than
/// `symbol,date,sentiment` is rejected rather than rewritten.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn load_records(path: &Path) -> Result<Vec<StoreRow>, StoreError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Store does not exist yet; starting empty");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let csv_err = |source| StoreError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new().from_reader(file);
    let mut headers = reader.headers().map_err(csv_err)?.clone();
    headers.trim();
    if headers.is_empty() {
        debug!("Store is empty; starting empty");
        return Ok(Vec::new());
    }
    if headers.iter().ne(STORE_COLUMNS) {
        return Err(StoreError::Schema {
            path: path.to_path_buf(),
            found: headers.iter().collect::<Vec<_>>().join(","),
        });
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let raw = result.map_err(csv_err)?;
        let mut cells = raw.clone();
        cells.trim();
        let record = cells
            .deserialize::<StoredRecord>(Some(&headers))
            .map_err(csv_err)?;
        rows.push(StoreRow { record, raw });
    }
    debug!(rows = rows.len(), "Loaded store");
    Ok(rows)
}

/// Dates already stored for `symbol`. Other symbols' rows are ignored.
pub fn existing_dates(rows: &[StoreRow], symbol: &str) -> HashSet<NaiveDate> {
    rows.iter()
        .map(|row| &row.record)
        .filter(|r| r.symbol == symbol)
        .map(|r| r.date)
        .collect()
}

/// Rows of `daily` whose date is not yet stored for `symbol`, in date order.
pub fn new_records(
    symbol: &str,
    daily: &DailySentiment,
    existing: &HashSet<NaiveDate>,
) -> Vec<StoredRecord> {
    daily
        .iter()
        .filter(|(date, _)| !existing.contains(date))
        .map(|(&date, &sentiment)| StoredRecord {
            symbol: symbol.to_string(),
            date,
            sentiment,
        })
        .collect()
}

/// Replace the store at `path` with `existing` rows (as read) followed by
/// `fresh` records, via a temp file and rename.
#[instrument(
    level = "debug",
    skip_all,
    fields(path = %path.display(), existing = existing.len(), fresh = fresh.len())
)]
pub fn write_records(
    path: &Path,
    existing: &[StoreRow],
    fresh: &[StoredRecord],
) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    let csv_err = |source| StoreError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(io_err)?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;

    {
        // Header written by hand so an empty frame still carries the schema.
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(tmp.as_file_mut());
        writer.write_record(STORE_COLUMNS).map_err(csv_err)?;
        for row in existing {
            writer.write_record(&row.raw).map_err(csv_err)?;
        }
        for record in fresh {
            writer.serialize(record).map_err(csv_err)?;
        }
        writer.flush().map_err(io_err)?;
    }
    tmp.as_file_mut().sync_all().map_err(io_err)?;

    tmp.persist(path).map_err(|source| StoreError::Persist {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Append the not-yet-stored days of `daily` for `symbol` to the store.
///
/// Existing rows keep their order; new rows follow in date order. When
/// nothing is new the file is left untouched and
/// [`MergeOutcome::NoNewRecords`] is returned.
#[instrument(level = "info", skip_all, fields(%symbol, path = %path.display()))]
pub fn merge_into_store(
    symbol: &str,
    daily: &DailySentiment,
    path: &Path,
) -> Result<MergeOutcome, StoreError> {
    let rows = load_records(path)?;
    let existing = existing_dates(&rows, symbol);
    let fresh = new_records(symbol, daily, &existing);

    let skipped = daily.len() - fresh.len();
    if skipped > 0 {
        debug!(skipped, "Dropped days already stored for symbol");
    }

    if fresh.is_empty() {
        return Ok(MergeOutcome::NoNewRecords);
    }

    let appended = fresh.len();
    write_records(path, &rows, &fresh)?;
    info!(appended, total = rows.len() + appended, "Store updated");
    Ok(MergeOutcome::Appended(appended))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily(entries: &[((i32, u32, u32), f64)]) -> DailySentiment {
        entries
            .iter()
            .map(|&((y, m, d), s)| (date(y, m, d), s))
            .collect()
    }

    #[test]
    fn test_merge_into_fresh_store_then_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("news_sentiment.csv");

        let first = daily(&[((2024, 1, 1), 0.35), ((2024, 1, 2), -0.10)]);
        let outcome = merge_into_store("SPY", &first, &path).unwrap();
        assert_eq!(outcome, MergeOutcome::Appended(2));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "symbol,date,sentiment\nSPY,2024-01-01,0.35\nSPY,2024-01-02,-0.10\n"
        );

        let before = fs::read(&path).unwrap();
        let again = daily(&[((2024, 1, 1), 0.99)]);
        assert_eq!(
            merge_into_store("SPY", &again, &path).unwrap(),
            MergeOutcome::NoNewRecords
        );
        assert_eq!(merge_into_store("SPY", &first, &path).unwrap().appended(), 0);
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_other_symbols_do_not_block_dates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.csv");

        let d = daily(&[((2024, 1, 1), 0.2)]);
        merge_into_store("SPY", &d, &path).unwrap();
        assert_eq!(
            merge_into_store("QQQ", &d, &path).unwrap(),
            MergeOutcome::Appended(1)
        );

        let records = load_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].record.symbol, "SPY");
        assert_eq!(records[1].record.symbol, "QQQ");
    }

    #[test]
    fn test_partial_overlap_appends_only_new_dates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.csv");
        fs::write(
            &path,
            "symbol,date,sentiment\nSPY,2024-01-01,0.10\nIWM,2024-01-02,0.50\n",
        )
        .unwrap();

        let d = daily(&[((2024, 1, 1), 0.9), ((2024, 1, 2), -0.3)]);
        assert_eq!(
            merge_into_store("SPY", &d, &path).unwrap(),
            MergeOutcome::Appended(1)
        );
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "symbol,date,sentiment\nSPY,2024-01-01,0.10\nIWM,2024-01-02,0.50\nSPY,2024-01-02,-0.30\n"
        );
    }

    #[test]
    fn test_no_write_when_nothing_to_add_and_store_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.csv");
        assert_eq!(
            merge_into_store("SPY", &DailySentiment::new(), &path).unwrap(),
            MergeOutcome::NoNewRecords
        );
        assert!(!path.exists());
    }

    #[test]
    fn test_uniqueness_across_many_merges() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.csv");

        for round in 0..3 {
            for symbol in ["SPY", "QQQ"] {
                let d = daily(&[((2024, 1, 1 + round), 0.1), ((2024, 1, 2 + round), 0.2)]);
                merge_into_store(symbol, &d, &path).unwrap();
            }
        }

        let records = load_records(&path).unwrap();
        let keys: HashSet<(String, NaiveDate)> =
            records
                .iter()
                .map(|r| (r.record.symbol.clone(), r.record.date))
                .collect();
        assert_eq!(keys.len(), records.len());
        assert_eq!(records.len(), 8);
    }

    #[test]
    fn test_empty_file_is_empty_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.csv");
        fs::write(&path, "").unwrap();
        assert!(load_records(&path).unwrap().is_empty());

        let d = daily(&[((2024, 5, 1), 0.0)]);
        merge_into_store("SPY", &d, &path).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "symbol,date,sentiment\nSPY,2024-05-01,0.00\n"
        );
    }

    #[test]
    fn test_wrong_header_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.csv");
        fs::write(&path, "date,symbol,sentiment\n2024-01-01,SPY,0.1\n").unwrap();

        let d = daily(&[((2024, 1, 2), 0.3)]);
        let err = merge_into_store("SPY", &d, &path).unwrap_err();
        assert!(matches!(err, StoreError::Schema { .. }));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "date,symbol,sentiment\n2024-01-01,SPY,0.1\n"
        );
    }

    #[test]
    fn test_malformed_row_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.csv");
        fs::write(&path, "symbol,date,sentiment\nSPY,tomorrow,0.1\n").unwrap();

        let err = load_records(&path).unwrap_err();
        assert!(matches!(err, StoreError::Csv { .. }));
    }

    #[test]
    fn test_write_records_creates_parent_dirs_and_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("store.csv");
        write_records(&path, &[], &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "symbol,date,sentiment\n");
    }

    #[test]
    fn test_existing_rows_written_back_unchanged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.csv");
        let original = "symbol,date,sentiment\n\
                        SPY,2024-01-01,0.123\n\
                        IWM,2024-01-02 00:00:00,-0.1\n\
                        DIA,2024-01-03,1.0\n";
        fs::write(&path, original).unwrap();

        let d = daily(&[((2024, 1, 1), 0.5)]);
        assert_eq!(
            merge_into_store("QQQ", &d, &path).unwrap(),
            MergeOutcome::Appended(1)
        );

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, format!("{original}QQQ,2024-01-01,0.50\n"));
    }

    #[test]
    fn test_same_symbol_timestamp_row_blocks_date_and_survives() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.csv");
        let original = "symbol,date,sentiment\n\
                        SPY,2024-01-01 00:00:00,0.3333\n";
        fs::write(&path, original).unwrap();

        let d = daily(&[((2024, 1, 1), 0.9), ((2024, 1, 2), -0.25)]);
        assert_eq!(
            merge_into_store("SPY", &d, &path).unwrap(),
            MergeOutcome::Appended(1)
        );

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, format!("{original}SPY,2024-01-02,-0.25\n"));
    }

    #[test]
    fn test_loaded_rows_parse_padded_cells() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.csv");
        fs::write(&path, "symbol, date, sentiment\nSPY, 2024-01-01 , 0.25\n").unwrap();

        let rows = load_records(&path).unwrap();
        assert_eq!(rows[0].record.symbol, "SPY");
        assert_eq!(rows[0].record.date, date(2024, 1, 1));
        assert_eq!(rows[0].record.sentiment, 0.25);
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(MergeOutcome::Appended(2).to_string(), "appended 2 new records");
        assert_eq!(MergeOutcome::NoNewRecords.to_string(), "no new records");
    }
}
