//! Referential-integrity checks: orders → customers, items → orders.

use std::collections::HashSet;

use log::debug;

use crate::ids::IdSource;
use crate::model::{Customer, ErrorOrigin, ErrorRecord, Item, MessageType, Order};

/// Orders split by whether their customer exists. Every input order lands in
/// exactly one of the two lists, in input order.
#[derive(Debug)]
pub struct OrderPartition<'a> {
    pub valid: Vec<&'a Order>,
    pub orphaned: Vec<&'a Order>,
}

/// Items split by whether their order exists.
#[derive(Debug)]
pub struct ItemPartition<'a> {
    pub valid: Vec<&'a Item>,
    pub orphaned: Vec<&'a Item>,
}

pub fn partition_orders<'a>(customers: &[Customer], orders: &'a [Order]) -> OrderPartition<'a> {
    let known: HashSet<&str> = customers.iter().map(|c| c.customer_reference.as_str()).collect();
    let (valid, orphaned): (Vec<&Order>, Vec<&Order>) = orders
        .iter()
        .partition(|o| known.contains(o.customer_reference.as_str()));
    OrderPartition { valid, orphaned }
}

/// Items are checked against the full order set, not just the valid orders:
/// an item on an orphaned order is not itself an orphan.
pub fn partition_items<'a>(orders: &[Order], items: &'a [Item]) -> ItemPartition<'a> {
    let known: HashSet<&str> = orders.iter().map(|o| o.order_reference.as_str()).collect();
    let (valid, orphaned): (Vec<&Item>, Vec<&Item>) = items
        .iter()
        .partition(|i| known.contains(i.order_reference.as_str()));
    ItemPartition { valid, orphaned }
}

/// One error record per orphaned order, then one per orphaned item.
pub fn error_records(
    orders: &OrderPartition<'_>,
    items: &ItemPartition<'_>,
    message: &str,
    ids: &mut dyn IdSource,
) -> Vec<ErrorRecord> {
    let mut records = Vec::with_capacity(orders.orphaned.len() + items.orphaned.len());

    for order in &orders.orphaned {
        debug!(
            "order '{}' references unknown customer '{}'",
            order.order_reference, order.customer_reference
        );
        records.push(error_record(&order.order_reference, ErrorOrigin::OrphanedOrder, message, ids));
    }

    for item in &items.orphaned {
        debug!("item references unknown order '{}'", item.order_reference);
        records.push(error_record(&item.order_reference, ErrorOrigin::OrphanedItem, message, ids));
    }

    records
}

fn error_record(
    order_reference: &str,
    origin: ErrorOrigin,
    message: &str,
    ids: &mut dyn IdSource,
) -> ErrorRecord {
    ErrorRecord {
        kind: MessageType::ErrorMessage,
        uuid: ids.next_id(),
        order_reference: order_reference.to_string(),
        customer_reference: None,
        message: message.to_string(),
        origin,
    }
}
