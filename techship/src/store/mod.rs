//! Master shipment database: a flat CSV file maintained by periodic
//! exports from the warehouse system.
//!
//! [`MasterDb`] holds the file in memory as headers plus string rows and
//! offers the dashboard's row operations (client filter, multi-term search,
//! status and date filters, column projection). The two maintenance
//! operations live alongside it: [`merge_master`] upserts a fresh export
//! into the master by shipment key, and [`trim_master`] caps the master at
//! a row count, newest first.

mod master;
mod merge;
mod trim;

pub use master::{latest_export, MasterDb, StoreError, DEFAULT_COLUMNS};
pub use merge::{merge_master, MergeOutcome};
pub use trim::{trim_master, TrimOutcome};
