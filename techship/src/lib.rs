//! TechShip - shipment tracking dashboard core
//!
//! This library backs the `techship` CLI: live tracking lookups against the
//! TechTrack carrier API, the flat-file master shipment database with its
//! merge and trim maintenance operations, PIN-scoped client access, and
//! configuration handling.

pub mod auth;
pub mod config;
pub mod logging;
pub mod store;
pub mod tracking;

pub use auth::ClientPins;
pub use config::ConfigFile;
pub use store::MasterDb;
pub use tracking::{TrackingClient, TrackingEvent, TrackingResult};
