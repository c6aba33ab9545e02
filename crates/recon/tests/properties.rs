// Property-based tests for the reconciliation pass.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::{BTreeMap, BTreeSet, HashSet};

use proptest::prelude::*;
use rust_decimal::Decimal;

use partner_recon::engine::reconcile_with_ids;
use partner_recon::model::{Customer, ErrorOrigin, Item, Order, ReconOutput};
use partner_recon::orphans::{partition_items, partition_orders};
use partner_recon::{RandomIds, SequentialIds};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Small key spaces so references collide and dangle often.
fn arb_customer_ref() -> impl Strategy<Value = String> {
    (0u8..6).prop_map(|n| format!("C{n}"))
}

fn arb_order_ref() -> impl Strategy<Value = String> {
    (0u8..10).prop_map(|n| format!("O{n}"))
}

/// Prices in cents, 0.00 ..= 999.99.
fn arb_price() -> impl Strategy<Value = Decimal> {
    (0i64..100_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_customers() -> impl Strategy<Value = Vec<Customer>> {
    prop::collection::btree_set(arb_customer_ref(), 0..5).prop_map(|refs| {
        refs.into_iter()
            .map(|r| Customer { customer_reference: r, attributes: BTreeMap::new() })
            .collect()
    })
}

/// Orders keep `order_reference` unique, as the feed guarantees.
fn arb_orders() -> impl Strategy<Value = Vec<Order>> {
    prop::collection::btree_map(arb_order_ref(), (arb_customer_ref(), arb_price()), 0..8).prop_map(
        |m| {
            m.into_iter()
                .map(|(o, (c, p))| Order {
                    order_reference: o,
                    customer_reference: c,
                    total_price: p,
                    attributes: BTreeMap::new(),
                })
                .collect()
        },
    )
}

fn arb_items() -> impl Strategy<Value = Vec<Item>> {
    prop::collection::vec(arb_order_ref(), 0..16).prop_map(|refs| {
        refs.into_iter()
            .map(|r| Item { order_reference: r, attributes: BTreeMap::new() })
            .collect()
    })
}

fn run(customers: &[Customer], orders: &[Order], items: &[Item]) -> ReconOutput {
    reconcile_with_ids(customers, orders, items, "Something went wrong!", &mut SequentialIds::new())
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    /// Every order and every item lands on exactly one side of its split.
    #[test]
    fn partition_is_complete_and_disjoint(
        customers in arb_customers(),
        orders in arb_orders(),
        items in arb_items(),
    ) {
        let op = partition_orders(&customers, &orders);
        prop_assert_eq!(op.valid.len() + op.orphaned.len(), orders.len());
        for o in &orders {
            let in_valid = op.valid.iter().any(|v| std::ptr::eq(*v, o));
            let in_orphaned = op.orphaned.iter().any(|v| std::ptr::eq(*v, o));
            prop_assert!(in_valid != in_orphaned);
        }

        let ip = partition_items(&orders, &items);
        prop_assert_eq!(ip.valid.len() + ip.orphaned.len(), items.len());
        for i in &items {
            let in_valid = ip.valid.iter().any(|v| std::ptr::eq(*v, i));
            let in_orphaned = ip.orphaned.iter().any(|v| std::ptr::eq(*v, i));
            prop_assert!(in_valid != in_orphaned);
        }
    }

    /// An order has an error record iff its customer is unknown.
    #[test]
    fn order_errors_match_unknown_customers(
        customers in arb_customers(),
        orders in arb_orders(),
        items in arb_items(),
    ) {
        let out = run(&customers, &orders, &items);
        let known: HashSet<&str> = customers.iter().map(|c| c.customer_reference.as_str()).collect();
        let flagged: HashSet<&str> = out
            .errors
            .iter()
            .filter(|e| e.origin == ErrorOrigin::OrphanedOrder)
            .map(|e| e.order_reference.as_str())
            .collect();

        for o in &orders {
            let dangling = !known.contains(o.customer_reference.as_str());
            prop_assert_eq!(dangling, flagged.contains(o.order_reference.as_str()));
        }
    }

    /// One item error per item whose order is unknown.
    #[test]
    fn item_errors_match_unknown_orders(
        customers in arb_customers(),
        orders in arb_orders(),
        items in arb_items(),
    ) {
        let out = run(&customers, &orders, &items);
        let known: HashSet<&str> = orders.iter().map(|o| o.order_reference.as_str()).collect();
        let expected: Vec<&str> = items
            .iter()
            .filter(|i| !known.contains(i.order_reference.as_str()))
            .map(|i| i.order_reference.as_str())
            .collect();
        let actual: Vec<&str> = out
            .errors
            .iter()
            .filter(|e| e.origin == ErrorOrigin::OrphanedItem)
            .map(|e| e.order_reference.as_str())
            .collect();
        prop_assert_eq!(actual, expected);
        prop_assert!(out.errors.iter().all(|e| e.customer_reference.is_none()));
    }

    /// Summaries match a naive nested-loop computation: distinct orders with at
    /// least one item, price summed per (order, item) pair.
    #[test]
    fn aggregation_matches_nested_loop(
        customers in arb_customers(),
        orders in arb_orders(),
        items in arb_items(),
    ) {
        let out = run(&customers, &orders, &items);
        let known: HashSet<&str> = customers.iter().map(|c| c.customer_reference.as_str()).collect();

        let mut expected: BTreeMap<&str, (BTreeSet<&str>, Decimal)> = BTreeMap::new();
        for o in orders.iter().filter(|o| known.contains(o.customer_reference.as_str())) {
            for _ in items.iter().filter(|i| i.order_reference == o.order_reference) {
                let e = expected
                    .entry(o.customer_reference.as_str())
                    .or_insert_with(|| (BTreeSet::new(), Decimal::ZERO));
                e.0.insert(o.order_reference.as_str());
                e.1 += o.total_price;
            }
        }

        prop_assert_eq!(out.valid.len(), expected.len());
        for s in &out.valid {
            let (orders_seen, total) = &expected[s.customer_reference.as_str()];
            prop_assert_eq!(s.number_of_orders, orders_seen.len());
            prop_assert!(s.number_of_orders >= 1);
            prop_assert_eq!(s.total_amount_spent, *total);
            prop_assert!(s.total_amount_spent >= Decimal::ZERO);
        }
    }

    /// At most one summary per customer.
    #[test]
    fn no_duplicate_summaries(
        customers in arb_customers(),
        orders in arb_orders(),
        items in arb_items(),
    ) {
        let out = run(&customers, &orders, &items);
        let distinct: HashSet<&str> = out.valid.iter().map(|s| s.customer_reference.as_str()).collect();
        prop_assert_eq!(distinct.len(), out.valid.len());
    }

    /// Random identifiers never collide within a run.
    #[test]
    fn identifiers_pairwise_distinct(
        customers in arb_customers(),
        orders in arb_orders(),
        items in arb_items(),
    ) {
        let out = reconcile_with_ids(&customers, &orders, &items, "x", &mut RandomIds);
        let ids: Vec<_> = out
            .valid
            .iter()
            .map(|s| s.uuid)
            .chain(out.errors.iter().map(|e| e.uuid))
            .collect();
        let distinct: HashSet<_> = ids.iter().collect();
        prop_assert_eq!(distinct.len(), ids.len());
    }

    /// An order's price is counted once per joined item.
    #[test]
    fn fan_out_multiplies_price(price in arb_price(), copies in 1usize..6) {
        let customers = vec![Customer { customer_reference: "C1".into(), attributes: BTreeMap::new() }];
        let orders = vec![Order {
            order_reference: "O1".into(),
            customer_reference: "C1".into(),
            total_price: price,
            attributes: BTreeMap::new(),
        }];
        let items: Vec<Item> = (0..copies)
            .map(|_| Item { order_reference: "O1".into(), attributes: BTreeMap::new() })
            .collect();

        let out = run(&customers, &orders, &items);
        prop_assert_eq!(out.valid.len(), 1);
        prop_assert_eq!(out.valid[0].number_of_orders, 1);
        prop_assert_eq!(out.valid[0].total_amount_spent, price * Decimal::from(copies as u64));
    }
}
