//! The four kinds of book entries and the small enums that hang off them.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The category a transaction is recorded under.
///
/// Each category gets its own tab in the UI and its own list in the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Goods or services sold to a customer, made up of line items.
    Sales,
    /// Money received from a customer.
    Received,
    /// Stock or goods bought from a vendor.
    Purchases,
    /// Running costs paid to a vendor.
    Expenses,
}

impl Category {
    /// All categories in the order their tabs are displayed.
    pub const ALL: [Category; 4] = [
        Category::Sales,
        Category::Received,
        Category::Purchases,
        Category::Expenses,
    ];

    /// The identifier used in URLs and JSON payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Sales => "sales",
            Category::Received => "received",
            Category::Purchases => "purchases",
            Category::Expenses => "expenses",
        }
    }

    /// The human readable tab label.
    pub fn label(self) -> &'static str {
        match self {
            Category::Sales => "Sales",
            Category::Received => "Received Amount",
            Category::Purchases => "Purchases",
            Category::Expenses => "Expenses",
        }
    }

    /// Who the other party is for this kind of transaction.
    pub fn entity(self) -> &'static str {
        match self {
            Category::Sales | Category::Received => "Customer",
            Category::Purchases | Category::Expenses => "Vendor",
        }
    }

    /// Whether records of this category show the description and reference columns.
    pub fn has_description(self) -> bool {
        !matches!(self, Category::Received)
    }

    /// Whether records of this category carry VAT.
    pub fn has_vat(self) -> bool {
        matches!(self, Category::Sales | Category::Purchases)
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sales" => Ok(Category::Sales),
            "received" => Ok(Category::Received),
            "purchases" => Ok(Category::Purchases),
            "expenses" => Ok(Category::Expenses),
            other => Err(Error::InvalidCategory(other.to_owned())),
        }
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// How a customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Paid in cash.
    #[default]
    Cash,
    /// Paid by bank transfer.
    Bank,
}

impl PaymentMethod {
    /// The identifier used in forms and JSON payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Bank => "bank",
        }
    }

    /// The human readable label.
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Bank => "Bank",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "bank" => Ok(PaymentMethod::Bank),
            other => Err(Error::InvalidPayload(format!(
                "unknown payment method \"{other}\", expected \"cash\" or \"bank\""
            ))),
        }
    }
}

impl ToSql for PaymentMethod {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for PaymentMethod {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// How much of a sale the customer has paid.
///
/// `None` is never stored, a sale without a paid status has a `NULL` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaidStatus {
    /// Nothing recorded yet.
    #[default]
    None,
    /// Part of the total has been paid.
    Partial,
    /// Paid in full.
    Full,
}

impl PaidStatus {
    /// All statuses in display order.
    pub const ALL: [PaidStatus; 3] = [PaidStatus::None, PaidStatus::Partial, PaidStatus::Full];

    /// The identifier used in forms and JSON payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            PaidStatus::None => "none",
            PaidStatus::Partial => "partial",
            PaidStatus::Full => "full",
        }
    }

    /// The human readable label.
    pub fn label(self) -> &'static str {
        match self {
            PaidStatus::None => "Not paid",
            PaidStatus::Partial => "Partially paid",
            PaidStatus::Full => "Paid in full",
        }
    }

    /// Collapse `none` into an absent value for storage.
    pub fn into_option(self) -> Option<PaidStatus> {
        match self {
            PaidStatus::None => None,
            status => Some(status),
        }
    }
}

impl FromStr for PaidStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" | "" => Ok(PaidStatus::None),
            "partial" => Ok(PaidStatus::Partial),
            "full" => Ok(PaidStatus::Full),
            other => Err(Error::InvalidPayload(format!(
                "unknown paid status \"{other}\", expected \"none\", \"partial\" or \"full\""
            ))),
        }
    }
}

impl ToSql for PaidStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for PaidStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        category::{Category, PaidStatus, PaymentMethod},
    };

    #[test]
    fn parses_every_category_from_its_identifier() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
        }
    }

    #[test]
    fn rejects_unknown_category() {
        assert_eq!(
            "refunds".parse::<Category>(),
            Err(Error::InvalidCategory("refunds".to_owned()))
        );
    }

    #[test]
    fn entity_depends_on_direction_of_money() {
        assert_eq!(Category::Sales.entity(), "Customer");
        assert_eq!(Category::Received.entity(), "Customer");
        assert_eq!(Category::Purchases.entity(), "Vendor");
        assert_eq!(Category::Expenses.entity(), "Vendor");
    }

    #[test]
    fn paid_status_none_is_not_stored() {
        assert_eq!(PaidStatus::None.into_option(), None);
        assert_eq!(PaidStatus::Full.into_option(), Some(PaidStatus::Full));
    }

    #[test]
    fn serde_uses_lowercase_identifiers() {
        let method: PaymentMethod = serde_json::from_str("\"bank\"").unwrap();
        assert_eq!(method, PaymentMethod::Bank);
        assert_eq!(
            serde_json::to_string(&Category::Received).unwrap(),
            "\"received\""
        );
    }
}
