//! In-memory view of the master CSV file.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;
use tracing::debug;

/// Column holding the owning client's code.
pub(crate) const CLIENT_CODE_COLUMN: &str = "Client_Code";

/// Column holding the shipment status string.
pub(crate) const STATUS_COLUMN: &str = "ShipmentStatus";

/// Column holding the Pacific-time processing timestamp (dashboard filters).
pub(crate) const PROCESSED_PST_COLUMN: &str = "ProcessedOn_PST";

/// Column holding the UTC processing timestamp (trim ordering).
pub(crate) const PROCESSED_UTC_COLUMN: &str = "ProcessedOn";

/// Dashboard display order for well-known columns. Columns not listed here
/// are appended after these, in file order.
pub const DEFAULT_COLUMNS: &[&str] = &[
    "Client_Code",
    "Client_Name",
    "CustomerOrder",
    "TransactionNumber",
    "ShipmentStatus",
    "Total_Shipping_Charge",
    "Routing_ServiceCode",
    "ShipToAddress_Name",
    "ShipToAddress_Address1",
    "Package_ExtendedTrackingNumber",
    "Package_PackageFreightCharge_ShippingChargeTotal",
    "ProcessedOn_PST",
    "EST",
    "Event_name",
];

/// Errors from master database operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the file.
    #[error("Database missing '{0}' column")]
    MissingColumn(String),

    /// No export files were found in the input directory.
    #[error("No CSV exports found in {0}")]
    NoExports(String),
}

/// The master database: header row plus string-valued data rows.
///
/// All cells are kept as strings; the only parsing applied anywhere is the
/// timestamp parsing used by the date-range filter and the trim operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasterDb {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl MasterDb {
    /// Create an empty database with the given header row.
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Load a CSV file. Ragged rows are padded or truncated to the header
    /// width so the in-memory table is always rectangular.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        debug!(path = %path.display(), rows = rows.len(), "loaded master database");
        Ok(Self { headers, rows })
    }

    /// Write the database to a CSV file.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;

        debug!(path = %path.display(), rows = self.rows.len(), "saved master database");
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub(crate) fn push_row(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.headers.len());
        self.rows.push(row);
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Vec<String>> {
        &mut self.rows
    }

    /// Add a column with empty cells if it is not already present.
    pub(crate) fn ensure_column(&mut self, name: &str) -> usize {
        match self.column_index(name) {
            Some(idx) => idx,
            None => {
                self.headers.push(name.to_string());
                for row in &mut self.rows {
                    row.push(String::new());
                }
                self.headers.len() - 1
            }
        }
    }

    fn filtered<F>(&self, keep: F) -> MasterDb
    where
        F: Fn(&[String]) -> bool,
    {
        MasterDb {
            headers: self.headers.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| keep(row))
                .cloned()
                .collect(),
        }
    }

    /// Rows belonging to one client. The client-code column is required;
    /// its absence means the file was produced by a broken export.
    pub fn filter_client(&self, client_code: &str) -> Result<MasterDb, StoreError> {
        let idx = self
            .column_index(CLIENT_CODE_COLUMN)
            .ok_or_else(|| StoreError::MissingColumn(CLIENT_CODE_COLUMN.to_string()))?;
        Ok(self.filtered(|row| row[idx] == client_code))
    }

    /// Multi-term search: a row matches when any cell contains any term,
    /// case-insensitively.
    pub fn search(&self, terms: &[String]) -> MasterDb {
        let lowered: Vec<String> = terms
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        if lowered.is_empty() {
            return self.clone();
        }

        self.filtered(|row| {
            row.iter().any(|cell| {
                let cell = cell.to_lowercase();
                lowered.iter().any(|term| cell.contains(term))
            })
        })
    }

    /// Rows whose shipment status is one of `statuses`. A missing status
    /// column leaves the rows untouched, matching the dashboard behavior.
    pub fn filter_status(&self, statuses: &[String]) -> MasterDb {
        let Some(idx) = self.column_index(STATUS_COLUMN) else {
            return self.clone();
        };
        self.filtered(|row| statuses.iter().any(|s| *s == row[idx]))
    }

    /// Distinct non-empty shipment statuses, sorted.
    pub fn statuses(&self) -> Vec<String> {
        let Some(idx) = self.column_index(STATUS_COLUMN) else {
            return Vec::new();
        };
        let mut statuses: Vec<String> = self
            .rows
            .iter()
            .map(|row| row[idx].clone())
            .filter(|s| !s.is_empty())
            .collect();
        statuses.sort();
        statuses.dedup();
        statuses
    }

    /// Rows processed within `[from, to]` (inclusive of the whole end day),
    /// judged on `ProcessedOn_PST`. Rows without a parseable timestamp drop
    /// out of the filtered set.
    pub fn filter_date_range(&self, from: NaiveDate, to: NaiveDate) -> MasterDb {
        let Some(idx) = self.column_index(PROCESSED_PST_COLUMN) else {
            return self.clone();
        };
        let start = from.and_hms_opt(0, 0, 0);
        let end = to.succ_opt().and_then(|d| d.and_hms_opt(0, 0, 0));
        let (Some(start), Some(end)) = (start, end) else {
            return self.clone();
        };

        self.filtered(|row| match parse_timestamp(&row[idx]) {
            Some(ts) => ts >= start && ts < end,
            None => false,
        })
    }

    /// Projection onto the named columns; unknown names are skipped.
    pub fn select_columns(&self, columns: &[String]) -> MasterDb {
        let indices: Vec<usize> = columns
            .iter()
            .filter_map(|name| self.column_index(name))
            .collect();

        MasterDb {
            headers: indices.iter().map(|&i| self.headers[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        }
    }

    /// Column names in dashboard display order: the well-known defaults
    /// that exist in this file first, then everything else in file order.
    pub fn display_columns(&self) -> Vec<String> {
        let mut ordered: Vec<String> = DEFAULT_COLUMNS
            .iter()
            .filter(|name| self.column_index(name).is_some())
            .map(|name| name.to_string())
            .collect();
        for header in &self.headers {
            if !ordered.contains(header) {
                ordered.push(header.clone());
            }
        }
        ordered
    }
}

/// Parse a processing timestamp. Tolerates the `" UTC"` suffix the export
/// writes and a handful of date-only or slash-separated layouts.
pub(crate) fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim().trim_end_matches(" UTC").trim();
    if value.is_empty() {
        return None;
    }

    const FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%m/%d/%Y %H:%M:%S"];
    for format in FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Some(ts);
        }
    }

    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// Newest CSV export in a directory, by modification time.
pub fn latest_export(dir: &Path) -> Result<PathBuf, StoreError> {
    let pattern = dir.join("*.csv");
    let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;

    for entry in glob::glob(&pattern.to_string_lossy())
        .map_err(|e| StoreError::NoExports(format!("{}: {}", dir.display(), e)))?
    {
        let Ok(path) = entry else { continue };
        let Ok(modified) = path.metadata().and_then(|m| m.modified()) else {
            continue;
        };
        if newest.as_ref().map(|(at, _)| modified > *at).unwrap_or(true) {
            newest = Some((modified, path));
        }
    }

    newest
        .map(|(_, path)| path)
        .ok_or_else(|| StoreError::NoExports(dir.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn sample_db() -> MasterDb {
        let mut db = MasterDb::new(
            ["Client_Code", "TransactionNumber", "ShipmentStatus", "ProcessedOn_PST"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        db.push_row(row(&["BS04", "T100", "Delivered", "2026-02-01 10:00:00"]));
        db.push_row(row(&["BS04", "T101", "In Transit", "2026-02-10 08:30:00"]));
        db.push_row(row(&["CB05", "T200", "Delivered", "2026-02-05 12:00:00"]));
        db.push_row(row(&["BS04", "T102", "Exception", "not a date"]));
        db
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_load_and_save_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("master.csv");

        let db = sample_db();
        db.save(&path).unwrap();
        let loaded = MasterDb::load(&path).unwrap();

        assert_eq!(loaded, db);
    }

    #[test]
    fn test_load_pads_ragged_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ragged.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "A,B,C").unwrap();
        writeln!(file, "1,2").unwrap();
        writeln!(file, "1,2,3,4").unwrap();
        drop(file);

        let db = MasterDb::load(&path).unwrap();
        assert_eq!(db.rows()[0], row(&["1", "2", ""]));
        assert_eq!(db.rows()[1], row(&["1", "2", "3"]));
    }

    #[test]
    fn test_filter_client() {
        let db = sample_db();
        let filtered = db.filter_client("BS04").unwrap();
        assert_eq!(filtered.len(), 3);
        let filtered = db.filter_client("ZZ99").unwrap();
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_filter_client_requires_column() {
        let db = MasterDb::new(vec!["Other".to_string()]);
        match db.filter_client("BS04") {
            Err(StoreError::MissingColumn(col)) => assert_eq!(col, "Client_Code"),
            other => panic!("expected missing column error, got {:?}", other),
        }
    }

    #[test]
    fn test_search_is_case_insensitive_or() {
        let db = sample_db();
        let found = db.search(&["delivered".to_string(), "T101".to_string()]);
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_search_with_no_terms_keeps_everything() {
        let db = sample_db();
        assert_eq!(db.search(&[]).len(), db.len());
        assert_eq!(db.search(&["  ".to_string()]).len(), db.len());
    }

    #[test]
    fn test_filter_status() {
        let db = sample_db();
        let filtered = db.filter_status(&["Delivered".to_string()]);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_statuses_sorted_distinct() {
        let db = sample_db();
        assert_eq!(db.statuses(), vec!["Delivered", "Exception", "In Transit"]);
    }

    #[test]
    fn test_filter_date_range_inclusive_end_day() {
        let db = sample_db();
        let filtered = db.filter_date_range(
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 5).unwrap(),
        );
        // T100 and T200 fall in range, T101 is later, T102 is unparseable.
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_select_columns_skips_unknown() {
        let db = sample_db();
        let projected = db.select_columns(&[
            "ShipmentStatus".to_string(),
            "NoSuchColumn".to_string(),
            "Client_Code".to_string(),
        ]);
        assert_eq!(projected.headers(), &["ShipmentStatus", "Client_Code"]);
        assert_eq!(projected.rows()[0], row(&["Delivered", "BS04"]));
    }

    #[test]
    fn test_display_columns_orders_defaults_first() {
        let db = MasterDb::new(
            ["Custom_Field", "ShipmentStatus", "Client_Code"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        assert_eq!(
            db.display_columns(),
            vec!["Client_Code", "ShipmentStatus", "Custom_Field"]
        );
    }

    #[test]
    fn test_parse_timestamp_variants() {
        assert!(parse_timestamp("2026-02-04 22:37:35 UTC").is_some());
        assert!(parse_timestamp("2026-02-04 22:37:35").is_some());
        assert!(parse_timestamp("2026-02-04").is_some());
        assert!(parse_timestamp("02/04/2026").is_some());
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("soon").is_none());
    }

    #[test]
    fn test_latest_export_picks_newest() {
        let dir = TempDir::new().unwrap();
        let older = dir.path().join("export_old.csv");
        let newer = dir.path().join("export_new.csv");
        std::fs::write(&older, "A\n1\n").unwrap();
        std::fs::write(&newer, "A\n2\n").unwrap();

        let old_time = filetime_from_secs(1_000_000);
        set_mtime(&older, old_time);

        let picked = latest_export(dir.path()).unwrap();
        assert_eq!(picked, newer);
    }

    #[test]
    fn test_latest_export_empty_dir_errors() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            latest_export(dir.path()),
            Err(StoreError::NoExports(_))
        ));
    }

    fn filetime_from_secs(secs: u64) -> std::time::SystemTime {
        std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(secs)
    }

    fn set_mtime(path: &Path, time: std::time::SystemTime) {
        let file = std::fs::OpenOptions::new().write(true).open(path).unwrap();
        file.set_modified(time).unwrap();
    }
}
