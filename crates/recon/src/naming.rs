use chrono::NaiveDate;
use serde::Serialize;

use crate::config::{format_date, FilesConfig};
use crate::error::ReconError;

/// The three entity files of a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Customers,
    Orders,
    Items,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customers => write!(f, "customers"),
            Self::Orders => write!(f, "orders"),
            Self::Items => write!(f, "items"),
        }
    }
}

/// Object keys expected for one day's delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyFiles {
    pub date: NaiveDate,
    pub customers: String,
    pub orders: String,
    pub items: String,
}

impl DailyFiles {
    /// `{prefix}_{date}.{extension}` for each entity. Fails on a date format
    /// chrono cannot render.
    pub fn for_date(files: &FilesConfig, date: NaiveDate) -> Result<Self, ReconError> {
        let suffix = format_date(&files.date_format, date)?;
        let key = |prefix: &str| format!("{prefix}_{suffix}.{}", files.extension);
        Ok(Self {
            date,
            customers: key(&files.customers),
            orders: key(&files.orders),
            items: key(&files.items),
        })
    }

    pub fn key(&self, entity: Entity) -> &str {
        match entity {
            Entity::Customers => &self.customers,
            Entity::Orders => &self.orders,
            Entity::Items => &self.items,
        }
    }

    pub fn all(&self) -> [(Entity, &str); 3] {
        [
            (Entity::Customers, self.customers.as_str()),
            (Entity::Orders, self.orders.as_str()),
            (Entity::Items, self.items.as_str()),
        ]
    }
}
