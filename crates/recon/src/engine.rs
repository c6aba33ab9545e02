use log::info;

use crate::aggregate::{aggregate_customers, join};
use crate::config::{PartnerConfig, DEFAULT_ERROR_MESSAGE};
use crate::evidence::compute_summary;
use crate::ids::{IdSource, RandomIds};
use crate::model::{
    Customer, Item, Order, ReconInput, ReconMeta, ReconOutput, ReconResult, ReconSummary,
};
use crate::orphans::{error_records, partition_items, partition_orders};

/// Reconcile one delivery with random identifiers and the default error message.
pub fn reconcile(customers: &[Customer], orders: &[Order], items: &[Item]) -> ReconOutput {
    reconcile_with_ids(customers, orders, items, DEFAULT_ERROR_MESSAGE, &mut RandomIds)
}

/// Reconcile one delivery, drawing identifiers from `ids`.
///
/// Orphaned orders and items become error records; valid orders are joined to
/// valid items and aggregated per customer. Inputs are not modified.
pub fn reconcile_with_ids(
    customers: &[Customer],
    orders: &[Order],
    items: &[Item],
    error_message: &str,
    ids: &mut dyn IdSource,
) -> ReconOutput {
    reconcile_counted(customers, orders, items, error_message, ids).0
}

fn reconcile_counted(
    customers: &[Customer],
    orders: &[Order],
    items: &[Item],
    error_message: &str,
    ids: &mut dyn IdSource,
) -> (ReconOutput, ReconSummary) {
    let order_split = partition_orders(customers, orders);
    let item_split = partition_items(orders, items);
    let errors = error_records(&order_split, &item_split, error_message, ids);
    let rows = join(&order_split.valid, &item_split.valid);
    let valid = aggregate_customers(&rows, ids);
    let output = ReconOutput { valid, errors };
    let summary = compute_summary(customers.len(), &order_split, &item_split, rows.len(), &output);
    (output, summary)
}

/// Partition the run belongs to, recorded in the result metadata.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    pub bucket: Option<String>,
    pub date: Option<chrono::NaiveDate>,
}

/// Run reconciliation per config. Returns both output streams + summary.
pub fn run(config: &PartnerConfig, input: &ReconInput, context: RunContext) -> ReconResult {
    run_with_ids(config, input, context, &mut RandomIds)
}

pub fn run_with_ids(
    config: &PartnerConfig,
    input: &ReconInput,
    context: RunContext,
    ids: &mut dyn IdSource,
) -> ReconResult {
    let (output, summary) = reconcile_counted(
        &input.customers,
        &input.orders,
        &input.items,
        &config.output.error_message,
        ids,
    );
    info!(
        "reconciled {} customers, {} orders, {} items: {} summaries, {} errors",
        summary.customers, summary.orders, summary.items, summary.summaries, summary.errors,
    );

    ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            bucket: context.bucket,
            date: context.date,
        },
        summary,
        output,
    }
}
