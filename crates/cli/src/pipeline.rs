//! Daily job: arrival gate, load, reconcile, dispatch.

use chrono::NaiveDate;
use log::{debug, info};
use serde::Serialize;

use partner_recon::engine::{run, RunContext};
use partner_recon::load::load_input;
use partner_recon::{DailyFiles, Entity, PartnerConfig, ReconResult};

use crate::error::PipelineError;
use crate::sink::{ItemTable, MessageQueue};
use crate::storage::ObjectStore;

pub const SUMMARY_STREAM: &str = "customer_messages";
pub const ERROR_STREAM: &str = "error_messages";

/// External systems the job talks to.
pub struct Collaborators<'a> {
    pub store: &'a dyn ObjectStore,
    pub queue: &'a dyn MessageQueue,
    pub table: &'a dyn ItemTable,
}

// ---------------------------------------------------------------------------
// Arrival gate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Arrival {
    pub files: DailyFiles,
    pub present: Vec<Entity>,
}

impl Arrival {
    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// Object keys not yet delivered, in entity order.
    pub fn missing(&self) -> Vec<String> {
        self.files
            .all()
            .iter()
            .filter(|(entity, _)| !self.present.contains(entity))
            .map(|(_, key)| key.to_string())
            .collect()
    }
}

/// Look for each of the day's files in `bucket`.
pub fn check_arrival(
    store: &dyn ObjectStore,
    bucket: &str,
    files: &DailyFiles,
) -> Result<Arrival, PipelineError> {
    let mut present = Vec::new();
    for (entity, key) in files.all() {
        let listed = store.list(bucket, key)?;
        if listed.iter().any(|k| k == key) {
            present.push(entity);
        }
    }
    let arrival = Arrival { files: files.clone(), present };
    debug!("arrival in '{bucket}': {} of 3 present", arrival.present.len());
    Ok(arrival)
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum RunOutcome {
    /// At least one file has not arrived; nothing was loaded or written.
    Waiting { missing: Vec<String> },
    Completed(ReconResult),
}

/// Table key for one output stream of one partition.
pub fn item_key(bucket: &str, date: NaiveDate, stream: &str) -> String {
    format!("{bucket}/{date}/{stream}")
}

pub fn run_daily(
    collab: &Collaborators<'_>,
    config: &PartnerConfig,
    bucket: &str,
    date: NaiveDate,
) -> Result<RunOutcome, PipelineError> {
    let files = DailyFiles::for_date(&config.files, date)?;
    info!(
        "bucket '{bucket}' date {date}: expecting {}, {}, {}",
        files.customers, files.orders, files.items
    );

    let arrival = check_arrival(collab.store, bucket, &files)?;
    if !arrival.is_complete() {
        let missing = arrival.missing();
        info!("waiting for {}", missing.join(", "));
        return Ok(RunOutcome::Waiting { missing });
    }

    let customers = collab.store.get(bucket, &files.customers)?;
    let orders = collab.store.get(bucket, &files.orders)?;
    let items = collab.store.get(bucket, &files.items)?;
    let input = load_input(&customers, &orders, &items, &config.columns)?;

    let context = RunContext { bucket: Some(bucket.to_string()), date: Some(date) };
    let result = run(config, &input, context);

    let summaries = serde_json::to_value(&result.output.valid)
        .map_err(|e| PipelineError::Queue(format!("cannot encode summaries: {e}")))?;
    let errors = serde_json::to_value(&result.output.errors)
        .map_err(|e| PipelineError::Queue(format!("cannot encode errors: {e}")))?;

    let queue = &config.output.queue;
    for (stream, body) in [(SUMMARY_STREAM, &summaries), (ERROR_STREAM, &errors)] {
        let id = collab.queue.send_message(queue, &body.to_string())?;
        info!("sent {stream} to '{queue}' as {id}");
    }

    let table = &config.output.table;
    for (stream, item) in [(SUMMARY_STREAM, &summaries), (ERROR_STREAM, &errors)] {
        let key = item_key(bucket, date, stream);
        collab.table.put_item(table, &key, item)?;
        info!("stored {key} in '{table}'");
    }

    Ok(RunOutcome::Completed(result))
}
