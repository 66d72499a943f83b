//! Upsert merge of a fresh warehouse export into the master database.

use tracing::info;

use super::master::MasterDb;

/// Column identifying a shipment transaction.
const TRANSACTION_COLUMN: &str = "TransactionNumber";

/// Column carrying the carrier tracking number, second half of the key.
const TRACKING_COLUMN: &str = "Package_ExtendedTrackingNumber";

/// What a merge did to the master.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Rows overwritten in place because the key already existed.
    pub updated: usize,
    /// Rows appended because the key was new.
    pub added: usize,
    /// The incoming data replaced the master wholesale (empty master or an
    /// export without the key column).
    pub replaced: bool,
}

/// Merge `incoming` into `master`, deduplicated by the composite key
/// `TransactionNumber + "_" + Package_ExtendedTrackingNumber`.
///
/// Existing rows are updated column-by-column with incoming values; keys
/// not yet in the master are appended. Columns that only exist in the
/// incoming export are added to the master with empty cells for old rows.
/// When the master is empty or the export has no `TransactionNumber`
/// column, the export replaces the master outright.
pub fn merge_master(master: &mut MasterDb, incoming: &MasterDb) -> MergeOutcome {
    if master.is_empty() || incoming.column_index(TRANSACTION_COLUMN).is_none() {
        *master = incoming.clone();
        info!(rows = master.len(), "replaced master with incoming export");
        return MergeOutcome {
            replaced: true,
            ..MergeOutcome::default()
        };
    }

    // The master may predate columns added to newer exports.
    for header in incoming.headers().to_vec() {
        master.ensure_column(&header);
    }

    let incoming_headers: Vec<String> = incoming.headers().to_vec();
    let master_width = master.headers().len();
    let master_indices: Vec<usize> = incoming_headers
        .iter()
        .map(|h| master.column_index(h).expect("column ensured above"))
        .collect();

    let mut keys: std::collections::HashMap<String, usize> = master
        .rows()
        .iter()
        .enumerate()
        .map(|(i, _)| (row_key(master, i), i))
        .collect();

    let mut outcome = MergeOutcome::default();
    for row in incoming.rows().to_vec() {
        let key = cells_key(incoming, &row);
        match keys.get(&key).copied() {
            Some(master_idx) => {
                for (incoming_idx, &target_idx) in master_indices.iter().enumerate() {
                    master.rows_mut()[master_idx][target_idx] = row[incoming_idx].clone();
                }
                outcome.updated += 1;
            }
            None => {
                let mut new_row = vec![String::new(); master_width];
                for (incoming_idx, &target_idx) in master_indices.iter().enumerate() {
                    new_row[target_idx] = row[incoming_idx].clone();
                }
                master.push_row(new_row);
                keys.insert(key, master.len() - 1);
                outcome.added += 1;
            }
        }
    }

    info!(
        updated = outcome.updated,
        added = outcome.added,
        total = master.len(),
        "merged export into master"
    );
    outcome
}

fn row_key(db: &MasterDb, row_idx: usize) -> String {
    cells_key(db, &db.rows()[row_idx])
}

fn cells_key(db: &MasterDb, row: &[String]) -> String {
    let transaction = db
        .column_index(TRANSACTION_COLUMN)
        .map(|i| row[i].as_str())
        .unwrap_or("");
    let tracking = db
        .column_index(TRACKING_COLUMN)
        .map(|i| row[i].as_str())
        .unwrap_or("");
    format!("{}_{}", transaction, tracking)
}
