//! `partner-recon`: daily partner-feed reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded customers, orders and items, returns
//! per-customer spend summaries plus error records for dangling references.
//! No CLI or storage dependencies.

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod ids;
pub mod load;
pub mod model;
pub mod naming;
pub mod orphans;

pub use config::PartnerConfig;
pub use engine::{reconcile, reconcile_with_ids, run, RunContext};
pub use error::ReconError;
pub use ids::{IdSource, RandomIds, SequentialIds};
pub use model::{
    Customer, CustomerSummary, ErrorRecord, Item, Order, ReconInput, ReconOutput, ReconResult,
};
pub use naming::{DailyFiles, Entity};
