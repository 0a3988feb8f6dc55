//! `rollcall-engine` — multi-source participant roster reconciliation.
//!
//! Pure engine crate: receives pre-loaded records, returns the reconciled
//! roster. No CLI or IO dependencies.

pub mod breakdown;
pub mod config;
pub mod dates;
pub mod engine;
pub mod error;
pub mod facade;
pub mod grouper;
pub mod identity;
pub mod ingest;
pub mod matcher;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod reconcile;
pub mod summary;

pub use config::RosterConfig;
pub use engine::run;
pub use error::RosterError;
pub use model::{RawRecord, RosterInput, RosterResult};
