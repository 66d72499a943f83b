//! Row-cap trim of the master database, keeping the newest rows.

use tracing::{info, warn};

use super::master::{parse_timestamp, MasterDb, PROCESSED_UTC_COLUMN};

/// What a trim did to the master.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimOutcome {
    pub kept: usize,
    pub trimmed: usize,
    /// False when the timestamp column was missing and the trim fell back
    /// to keeping the tail of the file.
    pub by_timestamp: bool,
}

/// Cap `master` at `max_rows` rows.
///
/// When the `ProcessedOn` column is present, rows are ordered newest first
/// by that timestamp (unparseable timestamps sort last, so they are the
/// first to go) and the newest `max_rows` are kept. Without the column the
/// last `max_rows` rows in file order are kept.
pub fn trim_master(master: &mut MasterDb, max_rows: usize) -> TrimOutcome {
    let original = master.len();

    match master.column_index(PROCESSED_UTC_COLUMN) {
        Some(idx) => {
            let rows = master.rows_mut();
            let mut keyed: Vec<_> = rows
                .drain(..)
                .map(|row| (parse_timestamp(&row[idx]), row))
                .collect();
            // Newest first; rows without a parseable timestamp at the end.
            keyed.sort_by(|(a, _), (b, _)| match (a, b) {
                (Some(x), Some(y)) => y.cmp(x),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            });
            keyed.truncate(max_rows);
            rows.extend(keyed.into_iter().map(|(_, row)| row));

            let outcome = TrimOutcome {
                kept: master.len(),
                trimmed: original - master.len(),
                by_timestamp: true,
            };
            info!(kept = outcome.kept, trimmed = outcome.trimmed, "trimmed master by timestamp");
            outcome
        }
        None => {
            warn!("'{}' column not found, using tail trim", PROCESSED_UTC_COLUMN);
            let rows = master.rows_mut();
            if rows.len() > max_rows {
                let excess = rows.len() - max_rows;
                rows.drain(..excess);
            }
            TrimOutcome {
                kept: master.len(),
                trimmed: original - master.len(),
                by_timestamp: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_with_timestamps(timestamps: &[&str]) -> MasterDb {
        let mut db = MasterDb::new(vec!["Id".to_string(), "ProcessedOn".to_string()]);
        for (i, ts) in timestamps.iter().enumerate() {
            db.push_row(vec![i.to_string(), ts.to_string()]);
        }
        db
    }

    #[test]
    fn test_trim_keeps_newest_rows() {
        let mut db = db_with_timestamps(&[
            "2026-02-01 10:00:00 UTC",
            "2026-02-04 22:37:35 UTC",
            "2026-02-02 08:00:00 UTC",
        ]);

        let outcome = trim_master(&mut db, 2);
        assert_eq!(outcome, TrimOutcome { kept: 2, trimmed: 1, by_timestamp: true });
        let ids: Vec<&str> = db.rows().iter().map(|r| r[0].as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_trim_under_cap_is_noop() {
        let mut db = db_with_timestamps(&["2026-02-01 10:00:00 UTC"]);
        let outcome = trim_master(&mut db, 10);
        assert_eq!(outcome.kept, 1);
        assert_eq!(outcome.trimmed, 0);
    }

    #[test]
    fn test_unparseable_timestamps_trimmed_first() {
        let mut db = db_with_timestamps(&[
            "garbage",
            "2026-02-01 10:00:00 UTC",
            "",
            "2026-02-02 10:00:00 UTC",
        ]);

        trim_master(&mut db, 2);
        let ids: Vec<&str> = db.rows().iter().map(|r| r[0].as_str()).collect();
        assert_eq!(ids, vec!["3", "1"]);
    }

    #[test]
    fn test_tail_trim_without_timestamp_column() {
        let mut db = MasterDb::new(vec!["Id".to_string()]);
        for i in 0..5 {
            db.push_row(vec![i.to_string()]);
        }

        let outcome = trim_master(&mut db, 2);
        assert!(!outcome.by_timestamp);
        assert_eq!(outcome.trimmed, 3);
        let ids: Vec<&str> = db.rows().iter().map(|r| r[0].as_str()).collect();
        assert_eq!(ids, vec!["3", "4"]);
    }
}
