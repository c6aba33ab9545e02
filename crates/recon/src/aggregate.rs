use std::collections::{BTreeMap, BTreeSet, HashMap};

use rust_decimal::Decimal;

use crate::ids::IdSource;
use crate::model::{CustomerSummary, Item, MessageType, Order};

/// One row of the orders ⋈ items inner join.
#[derive(Debug, Clone, Copy)]
pub struct JoinedRow<'a> {
    pub order: &'a Order,
    pub item: &'a Item,
}

/// Inner join on `order_reference`. An order with N matching items yields N
/// rows; orders without items and items without orders yield none.
pub fn join<'a>(orders: &[&'a Order], items: &[&'a Item]) -> Vec<JoinedRow<'a>> {
    let mut by_order: HashMap<&str, Vec<&'a Item>> = HashMap::new();
    for &item in items {
        by_order.entry(item.order_reference.as_str()).or_default().push(item);
    }

    let mut rows = Vec::new();
    for &order in orders {
        if let Some(matched) = by_order.get(order.order_reference.as_str()) {
            rows.extend(matched.iter().map(|&item| JoinedRow { order, item }));
        }
    }
    rows
}

/// Group joined rows by customer: distinct orders counted once, `total_price`
/// summed once per joined row (an order with two items contributes twice).
pub fn aggregate_customers(rows: &[JoinedRow<'_>], ids: &mut dyn IdSource) -> Vec<CustomerSummary> {
    let mut groups: BTreeMap<&str, (BTreeSet<&str>, Decimal)> = BTreeMap::new();

    for row in rows {
        let entry = groups
            .entry(row.order.customer_reference.as_str())
            .or_insert_with(|| (BTreeSet::new(), Decimal::ZERO));
        entry.0.insert(row.order.order_reference.as_str());
        entry.1 += row.order.total_price;
    }

    groups
        .into_iter()
        .map(|(customer_reference, (orders, total))| CustomerSummary {
            kind: MessageType::CustomerMessage,
            uuid: ids.next_id(),
            customer_reference: customer_reference.to_string(),
            number_of_orders: orders.len(),
            total_amount_spent: total,
        })
        .collect()
}
