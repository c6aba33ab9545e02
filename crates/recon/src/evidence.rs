use crate::model::{ReconOutput, ReconSummary};
use crate::orphans::{ItemPartition, OrderPartition};

/// Compute run counts from the partitions and the produced output.
///
/// Order and item totals are the sums of their partitions; every input row
/// sits in exactly one side.
pub fn compute_summary(
    customers: usize,
    orders: &OrderPartition<'_>,
    items: &ItemPartition<'_>,
    joined_rows: usize,
    output: &ReconOutput,
) -> ReconSummary {
    ReconSummary {
        customers,
        orders: orders.valid.len() + orders.orphaned.len(),
        items: items.valid.len() + items.orphaned.len(),
        valid_orders: orders.valid.len(),
        orphaned_orders: orders.orphaned.len(),
        valid_items: items.valid.len(),
        orphaned_items: items.orphaned.len(),
        joined_rows,
        summaries: output.valid.len(),
        errors: output.errors.len(),
    }
}

impl ReconSummary {
    /// True when the delivery had no dangling references.
    pub fn is_clean(&self) -> bool {
        self.errors == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use crate::model::{Customer, Item, Order, ReconInput};
    use crate::orphans::{error_records, partition_items, partition_orders};
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    #[test]
    fn summary_counts() {
        let input = ReconInput {
            customers: vec![Customer { customer_reference: "C1".into(), attributes: BTreeMap::new() }],
            orders: vec![
                Order {
                    order_reference: "O1".into(),
                    customer_reference: "C1".into(),
                    total_price: dec!(2),
                    attributes: BTreeMap::new(),
                },
                Order {
                    order_reference: "O2".into(),
                    customer_reference: "C9".into(),
                    total_price: dec!(3),
                    attributes: BTreeMap::new(),
                },
            ],
            items: vec![
                Item { order_reference: "O1".into(), attributes: BTreeMap::new() },
                Item { order_reference: "O8".into(), attributes: BTreeMap::new() },
            ],
        };
        let op = partition_orders(&input.customers, &input.orders);
        let ip = partition_items(&input.orders, &input.items);
        let output = ReconOutput {
            valid: vec![],
            errors: error_records(&op, &ip, "x", &mut SequentialIds::new()),
        };

        let summary = compute_summary(input.customers.len(), &op, &ip, 1, &output);
        assert_eq!(summary.customers, 1);
        assert_eq!(summary.orders, 2);
        assert_eq!(summary.items, 2);
        assert_eq!(summary.valid_orders, 1);
        assert_eq!(summary.orphaned_orders, 1);
        assert_eq!(summary.valid_items, 1);
        assert_eq!(summary.orphaned_items, 1);
        assert_eq!(summary.joined_rows, 1);
        assert_eq!(summary.errors, 2);
        assert!(!summary.is_clean());
    }
}
