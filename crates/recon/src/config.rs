use serde::Deserialize;

use crate::error::ReconError;

/// Message stamped on every error record unless the config overrides it.
pub const DEFAULT_ERROR_MESSAGE: &str = "Something went wrong!";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Job configuration. Every section is optional; an empty document yields the
/// partner feed's standard layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartnerConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub files: FilesConfig,
    #[serde(default)]
    pub columns: ColumnsConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_name() -> String {
    "partner-daily".into()
}

impl Default for PartnerConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            files: FilesConfig::default(),
            columns: ColumnsConfig::default(),
            output: OutputConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Daily object naming: `{prefix}_{date}.{extension}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilesConfig {
    pub customers: String,
    pub orders: String,
    pub items: String,
    /// chrono strftime format for the date suffix.
    pub date_format: String,
    pub extension: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            customers: "customers".into(),
            orders: "orders".into(),
            items: "items".into(),
            date_format: "%Y%m%d".into(),
            extension: "csv".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnsConfig {
    pub customers: CustomerColumns,
    pub orders: OrderColumns,
    pub items: ItemColumns,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CustomerColumns {
    pub customer_reference: String,
}

impl Default for CustomerColumns {
    fn default() -> Self {
        Self { customer_reference: "customer_reference".into() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrderColumns {
    pub order_reference: String,
    pub customer_reference: String,
    pub total_price: String,
}

impl Default for OrderColumns {
    fn default() -> Self {
        Self {
            order_reference: "order_reference".into(),
            customer_reference: "customer_reference".into(),
            total_price: "total_price".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ItemColumns {
    pub order_reference: String,
}

impl Default for ItemColumns {
    fn default() -> Self {
        Self { order_reference: "order_reference".into() }
    }
}

// ---------------------------------------------------------------------------
// Output + Storage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub queue: String,
    pub table: String,
    pub error_message: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            queue: "partner_sqs_queue".into(),
            table: "partner_table".into(),
            error_message: DEFAULT_ERROR_MESSAGE.into(),
        }
    }
}

/// Local stand-ins for the object store, queue and table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Object-store root; each bucket is a sub-directory.
    pub root: String,
    /// Queue spool directory; each queue is a sub-directory.
    pub spool_dir: String,
    /// SQLite file backing the output table.
    pub database: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: ".".into(),
            spool_dir: "spool".into(),
            database: "partner.db".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl PartnerConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: PartnerConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let f = &self.files;

        // Prefixes must be non-empty and distinct
        for (entity, prefix) in [("customers", &f.customers), ("orders", &f.orders), ("items", &f.items)] {
            if prefix.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "files.{entity}: prefix must not be empty"
                )));
            }
        }
        if f.customers == f.orders || f.customers == f.items || f.orders == f.items {
            return Err(ReconError::ConfigValidation(
                "files: entity prefixes must be distinct".into(),
            ));
        }
        if f.extension.trim().is_empty() {
            return Err(ReconError::ConfigValidation("files.extension must not be empty".into()));
        }

        // Render a fixed date to catch empty or path-like suffixes
        let sample = sample_date_suffix(&f.date_format)?;
        if sample.is_empty() {
            return Err(ReconError::ConfigValidation(
                "files.date_format renders an empty suffix".into(),
            ));
        }
        if sample.contains('/') || sample.contains('\\') {
            return Err(ReconError::ConfigValidation(format!(
                "files.date_format must not produce path separators (got '{sample}')"
            )));
        }

        let c = &self.columns;
        for (name, value) in [
            ("columns.customers.customer_reference", &c.customers.customer_reference),
            ("columns.orders.order_reference", &c.orders.order_reference),
            ("columns.orders.customer_reference", &c.orders.customer_reference),
            ("columns.orders.total_price", &c.orders.total_price),
            ("columns.items.order_reference", &c.items.order_reference),
        ] {
            if value.is_empty() {
                return Err(ReconError::ConfigValidation(format!("{name} must not be empty")));
            }
        }

        if self.output.queue.trim().is_empty() {
            return Err(ReconError::ConfigValidation("output.queue must not be empty".into()));
        }
        if !is_sql_identifier(&self.output.table) {
            return Err(ReconError::ConfigValidation(format!(
                "output.table '{}' is not a valid table name",
                self.output.table
            )));
        }
        if self.output.error_message.is_empty() {
            return Err(ReconError::ConfigValidation(
                "output.error_message must not be empty".into(),
            ));
        }

        Ok(())
    }
}

fn sample_date_suffix(format: &str) -> Result<String, ReconError> {
    let date = chrono::NaiveDate::from_ymd_opt(2026, 1, 31)
        .ok_or_else(|| ReconError::ConfigValidation("invalid sample date".into()))?;
    format_date(format, date)
}

/// Render `date` with a strftime `format`.
pub(crate) fn format_date(format: &str, date: chrono::NaiveDate) -> Result<String, ReconError> {
    use std::fmt::Write;

    let mut out = String::new();
    // chrono reports bad specifiers through fmt::Error rather than panicking here
    write!(out, "{}", date.format(format)).map_err(|_| {
        ReconError::ConfigValidation(format!("files.date_format '{format}' is not a valid format"))
    })?;
    Ok(out)
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
name = "Acme Partner Feed"

[files]
customers = "acme_customers"
orders = "acme_orders"
items = "acme_items"
date_format = "%Y-%m-%d"
extension = "txt"

[columns.customers]
customer_reference = "cust_ref"

[columns.orders]
order_reference = "ord_ref"
customer_reference = "cust_ref"
total_price = "amount"

[columns.items]
order_reference = "ord_ref"

[output]
queue = "acme-queue"
table = "acme_results"
error_message = "dangling reference"

[storage]
root = "/srv/buckets"
spool_dir = "/srv/spool"
database = "/srv/acme.db"
"#;

    #[test]
    fn empty_document_uses_defaults() {
        let config = PartnerConfig::from_toml("").unwrap();
        assert_eq!(config.name, "partner-daily");
        assert_eq!(config.files.customers, "customers");
        assert_eq!(config.files.date_format, "%Y%m%d");
        assert_eq!(config.files.extension, "csv");
        assert_eq!(config.columns.orders.total_price, "total_price");
        assert_eq!(config.output.queue, "partner_sqs_queue");
        assert_eq!(config.output.table, "partner_table");
        assert_eq!(config.output.error_message, DEFAULT_ERROR_MESSAGE);
        assert_eq!(config.storage.spool_dir, "spool");
    }

    #[test]
    fn default_matches_empty_document() {
        let parsed = PartnerConfig::from_toml("").unwrap();
        let built = PartnerConfig::default();
        assert_eq!(format!("{parsed:?}"), format!("{built:?}"));
        assert!(built.validate().is_ok());
    }

    #[test]
    fn parse_full() {
        let config = PartnerConfig::from_toml(FULL).unwrap();
        assert_eq!(config.name, "Acme Partner Feed");
        assert_eq!(config.files.items, "acme_items");
        assert_eq!(config.files.extension, "txt");
        assert_eq!(config.columns.customers.customer_reference, "cust_ref");
        assert_eq!(config.columns.orders.total_price, "amount");
        assert_eq!(config.output.table, "acme_results");
        assert_eq!(config.output.error_message, "dangling reference");
        assert_eq!(config.storage.root, "/srv/buckets");
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = PartnerConfig::from_toml("[output]\nqueue = \"q2\"\n").unwrap();
        assert_eq!(config.output.queue, "q2");
        assert_eq!(config.output.table, "partner_table");
    }

    #[test]
    fn reject_unknown_key() {
        let err = PartnerConfig::from_toml("[output]\nqueu = \"typo\"\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn reject_duplicate_prefixes() {
        let err = PartnerConfig::from_toml("[files]\norders = \"customers\"\n").unwrap_err();
        assert!(err.to_string().contains("distinct"));
    }

    #[test]
    fn reject_empty_prefix() {
        let err = PartnerConfig::from_toml("[files]\nitems = \"\"\n").unwrap_err();
        assert!(err.to_string().contains("files.items"));
    }

    #[test]
    fn reject_path_like_date_format() {
        let err = PartnerConfig::from_toml("[files]\ndate_format = \"%Y/%m/%d\"\n").unwrap_err();
        assert!(err.to_string().contains("path separators"));
    }

    #[test]
    fn reject_bad_table_name() {
        let err = PartnerConfig::from_toml("[output]\ntable = \"partner-table\"\n").unwrap_err();
        assert!(err.to_string().contains("not a valid table name"));
    }

    #[test]
    fn reject_empty_error_message() {
        let err = PartnerConfig::from_toml("[output]\nerror_message = \"\"\n").unwrap_err();
        assert!(err.to_string().contains("error_message"));
    }

    #[test]
    fn sql_identifiers() {
        assert!(is_sql_identifier("partner_table"));
        assert!(is_sql_identifier("_t1"));
        assert!(!is_sql_identifier("1table"));
        assert!(!is_sql_identifier(""));
        assert!(!is_sql_identifier("drop table;"));
    }
}
