//! CSV → typed records, via the configured column mapping.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::config::{ColumnsConfig, CustomerColumns, ItemColumns, OrderColumns};
use crate::error::ReconError;
use crate::model::{Customer, Item, Order, ReconInput};
use crate::naming::Entity;

/// Parsed CSV: header row plus data records.
struct Table {
    entity: Entity,
    headers: Vec<String>,
    records: Vec<csv::StringRecord>,
}

impl Table {
    fn parse(entity: Entity, csv_data: &str) -> Result<Self, ReconError> {
        let csv_err = |e: csv::Error| ReconError::Csv { entity: entity.to_string(), message: e.to_string() };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(csv_data.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(csv_err)?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let records = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(csv_err)?;

        Ok(Self { entity, headers, records })
    }

    fn idx(&self, column: &str) -> Result<usize, ReconError> {
        self.headers.iter().position(|h| h == column).ok_or_else(|| ReconError::MissingColumn {
            entity: self.entity.to_string(),
            column: column.into(),
        })
    }

    /// Every column not in `used`, keyed by header.
    fn attributes(&self, record: &csv::StringRecord, used: &[usize]) -> BTreeMap<String, String> {
        self.headers
            .iter()
            .enumerate()
            .filter(|(i, _)| !used.contains(i))
            .filter_map(|(i, h)| record.get(i).map(|v| (h.clone(), v.to_string())))
            .collect()
    }
}

fn field(record: &csv::StringRecord, idx: usize) -> String {
    record.get(idx).unwrap_or("").to_string()
}

pub fn load_customers(csv_data: &str, columns: &CustomerColumns) -> Result<Vec<Customer>, ReconError> {
    let table = Table::parse(Entity::Customers, csv_data)?;
    let reference_idx = table.idx(&columns.customer_reference)?;

    Ok(table
        .records
        .iter()
        .map(|record| Customer {
            customer_reference: field(record, reference_idx),
            attributes: table.attributes(record, &[reference_idx]),
        })
        .collect())
}

pub fn load_orders(csv_data: &str, columns: &OrderColumns) -> Result<Vec<Order>, ReconError> {
    let table = Table::parse(Entity::Orders, csv_data)?;
    let order_idx = table.idx(&columns.order_reference)?;
    let customer_idx = table.idx(&columns.customer_reference)?;
    let price_idx = table.idx(&columns.total_price)?;
    let used = [order_idx, customer_idx, price_idx];

    let mut orders = Vec::with_capacity(table.records.len());
    for (n, record) in table.records.iter().enumerate() {
        let raw = record.get(price_idx).unwrap_or("");
        let total_price = parse_decimal(raw).ok_or_else(|| ReconError::AmountParse {
            entity: table.entity.to_string(),
            row: n + 1,
            value: raw.into(),
        })?;

        orders.push(Order {
            order_reference: field(record, order_idx),
            customer_reference: field(record, customer_idx),
            total_price,
            attributes: table.attributes(record, &used),
        });
    }
    Ok(orders)
}

pub fn load_items(csv_data: &str, columns: &ItemColumns) -> Result<Vec<Item>, ReconError> {
    let table = Table::parse(Entity::Items, csv_data)?;
    let order_idx = table.idx(&columns.order_reference)?;

    Ok(table
        .records
        .iter()
        .map(|record| Item {
            order_reference: field(record, order_idx),
            attributes: table.attributes(record, &[order_idx]),
        })
        .collect())
}

/// Load all three files of a delivery.
pub fn load_input(
    customers_csv: &str,
    orders_csv: &str,
    items_csv: &str,
    columns: &ColumnsConfig,
) -> Result<ReconInput, ReconError> {
    Ok(ReconInput {
        customers: load_customers(customers_csv, &columns.customers)?,
        orders: load_orders(orders_csv, &columns.orders)?,
        items: load_items(items_csv, &columns.items)?,
    })
}

/// Plain decimal text, optionally padded; scientific notation as a fallback
/// for exports that write `1e2`.
fn parse_decimal(raw: &str) -> Option<Decimal> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s).or_else(|_| Decimal::from_scientific(s)).ok()
}
