use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One row of the partner's customers file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customer {
    pub customer_reference: String,
    /// Columns the reconciliation does not read, keyed by header.
    pub attributes: BTreeMap<String, String>,
}

/// One row of the partner's orders file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub order_reference: String,
    /// May dangle: nothing guarantees the customer exists.
    pub customer_reference: String,
    pub total_price: Decimal,
    pub attributes: BTreeMap<String, String>,
}

/// One row of the partner's items file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    /// May dangle: nothing guarantees the order exists.
    pub order_reference: String,
    pub attributes: BTreeMap<String, String>,
}

/// The three datasets of one daily delivery.
#[derive(Debug, Clone, Default)]
pub struct ReconInput {
    pub customers: Vec<Customer>,
    pub orders: Vec<Order>,
    pub items: Vec<Item>,
}

// ---------------------------------------------------------------------------
// Output records
// ---------------------------------------------------------------------------

/// Type discriminator carried by every output record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    CustomerMessage,
    ErrorMessage,
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CustomerMessage => write!(f, "customer_message"),
            Self::ErrorMessage => write!(f, "error_message"),
        }
    }
}

/// Per-customer spend over the orders that joined to at least one item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerSummary {
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub uuid: Uuid,
    pub customer_reference: String,
    pub number_of_orders: usize,
    /// Serialized as a JSON number carrying the exact decimal digits.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_amount_spent: Decimal,
}

/// Which orphan check produced an error record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorOrigin {
    /// Order whose customer_reference matches no customer.
    OrphanedOrder,
    /// Item whose order_reference matches no order.
    OrphanedItem,
}

/// A dangling reference, routed to the error stream instead of failing the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRecord {
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub uuid: Uuid,
    pub order_reference: String,
    /// Always null on the wire.
    pub customer_reference: Option<String>,
    pub message: String,
    #[serde(skip)]
    pub origin: ErrorOrigin,
}

/// The two output streams of a reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconOutput {
    pub valid: Vec<CustomerSummary>,
    pub errors: Vec<ErrorRecord>,
}

// ---------------------------------------------------------------------------
// Summary + Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub customers: usize,
    pub orders: usize,
    pub items: usize,
    pub valid_orders: usize,
    pub orphaned_orders: usize,
    pub valid_items: usize,
    pub orphaned_items: usize,
    pub joined_rows: usize,
    pub summaries: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<chrono::NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub output: ReconOutput,
}
