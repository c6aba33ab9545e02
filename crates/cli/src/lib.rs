//! Job glue for `precon`: trigger events, storage and output collaborators,
//! and the daily pipeline that drives the `partner-recon` engine.

pub mod error;
pub mod event;
pub mod exit_codes;
pub mod pipeline;
pub mod sink;
pub mod storage;

pub use error::PipelineError;
pub use pipeline::{check_arrival, run_daily, Arrival, Collaborators, RunOutcome};
