//! The JSON shapes of a transaction: the record sent to clients, the payload
//! used to create one and the patch used to update one.

use serde::{Deserialize, Serialize};
use time::{Date, macros::format_description};

use crate::{
    Error,
    category::{Category, PaidStatus, PaymentMethod},
    sale::{LineItem, parse_structured_line_items, round_cents},
    transaction::{Transaction, TransactionBuilder, TransactionId},
};

/// A transaction as it is sent to API clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    #[serde(rename = "Id")]
    pub id: TransactionId,
    #[serde(rename = "Name")]
    pub name: String,
    /// The date formatted as `YYYY-MM-DD`.
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Reference")]
    pub reference: String,
    #[serde(rename = "Amount")]
    pub amount: f64,
    #[serde(rename = "VAT")]
    pub vat: f64,
    #[serde(rename = "Total")]
    pub total: f64,
    #[serde(rename = "Actions")]
    pub actions: Vec<String>,
    #[serde(rename = "Done")]
    pub done: bool,
    #[serde(rename = "Method", skip_serializing_if = "Option::is_none")]
    pub method: Option<PaymentMethod>,
    #[serde(rename = "PaidStatus", skip_serializing_if = "Option::is_none")]
    pub paid_status: Option<PaidStatus>,
    #[serde(rename = "Items", skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<LineItem>>,
}

impl From<&Transaction> for TransactionRecord {
    fn from(transaction: &Transaction) -> Self {
        let is_sale = matches!(transaction.category, Category::Sales);

        Self {
            id: transaction.id,
            name: transaction.name.clone(),
            date: transaction.date.to_string(),
            description: transaction.display_description(),
            reference: transaction.reference.clone(),
            amount: transaction.amount,
            vat: transaction.vat,
            total: transaction.total,
            actions: transaction.actions.clone(),
            done: transaction.done,
            method: transaction.method,
            paid_status: transaction.paid_status,
            items: is_sale.then(|| transaction.items.clone()),
        }
    }
}

/// A sale line as sent by API clients.
///
/// The line total and VAT are always derived from the quantity and price.
/// VAT is charged unless `vat` is given as zero.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ItemPayload {
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub vat: Option<f64>,
}

fn default_quantity() -> u32 {
    1
}

impl From<ItemPayload> for LineItem {
    fn from(item: ItemPayload) -> Self {
        let vat_applies = item.vat.is_none_or(|vat| vat != 0.0);

        LineItem::new(item.description.trim(), item.quantity, item.price, vat_applies)
    }
}

/// The body of a request to create a transaction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransactionPayload {
    /// The category, kept as text so an unknown value can be reported as an
    /// invalid transaction type.
    #[serde(rename = "type")]
    pub category: String,
    pub name: String,
    pub date: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub vat: Option<f64>,
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub actions: Option<Vec<String>>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub method: Option<PaymentMethod>,
    #[serde(default, rename = "paidStatus", alias = "paid_status")]
    pub paid_status: Option<PaidStatus>,
    #[serde(default)]
    pub items: Option<Vec<ItemPayload>>,
}

impl TransactionPayload {
    /// Validate the payload and turn it into a builder.
    ///
    /// # Errors
    /// Returns a:
    /// - [Error::InvalidCategory] if `type` is not one of the four categories,
    /// - [Error::InvalidPayload] if the name is blank or a non-sale has no amount,
    /// - [Error::InvalidDate] if the date is not `YYYY-MM-DD`.
    pub fn into_builder(self) -> Result<TransactionBuilder, Error> {
        let category: Category = self.category.parse()?;
        let name = validate_name(&self.name)?;
        let date = parse_date(&self.date)?;

        let mut builder = Transaction::build(category, name, date)
            .reference(self.reference.as_deref().unwrap_or_default().trim())
            .actions(self.actions.unwrap_or_default())
            .done(self.done);

        let description = self.description.unwrap_or_default();

        builder = match category {
            Category::Sales => {
                let items = self
                    .items
                    .filter(|items| !items.is_empty())
                    .map(|items| items.into_iter().map(LineItem::from).collect())
                    .or_else(|| parse_structured_line_items(&description));

                match items {
                    Some(items) => builder.items(items),
                    None => {
                        let amount = self.amount.unwrap_or_default();
                        let vat = self.vat.unwrap_or_default();
                        let total = self.total.unwrap_or(round_cents(amount + vat));
                        builder.description(description.trim()).amounts(amount, vat, total)
                    }
                }
            }
            Category::Received | Category::Purchases | Category::Expenses => {
                let amount = self.amount.ok_or_else(|| {
                    Error::InvalidPayload(format!("amount is required for {category} transactions"))
                })?;
                let (vat, total) = derive_amounts(category, amount, self.vat, self.total);

                builder.description(description.trim()).amounts(amount, vat, total)
            }
        };

        if let Some(method) = self.method {
            builder = builder.method(method);
        }

        if let Some(paid_status) = self.paid_status {
            builder = builder.paid_status(paid_status);
        }

        Ok(builder)
    }
}

/// The body of a request to update some fields of a transaction.
///
/// Keys may be given in the record form (`Name`, `VAT`) or the payload form
/// (`name`, `vat`). Absent keys keep their stored values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransactionPatch {
    #[serde(default, alias = "Name")]
    pub name: Option<String>,
    #[serde(default, alias = "Date")]
    pub date: Option<String>,
    #[serde(default, alias = "Description")]
    pub description: Option<String>,
    #[serde(default, alias = "Reference")]
    pub reference: Option<String>,
    #[serde(default, alias = "Amount")]
    pub amount: Option<f64>,
    #[serde(default, alias = "VAT")]
    pub vat: Option<f64>,
    #[serde(default, alias = "Total")]
    pub total: Option<f64>,
    #[serde(default, alias = "Actions")]
    pub actions: Option<Vec<String>>,
    #[serde(default, alias = "Done")]
    pub done: Option<bool>,
    #[serde(default, alias = "Method")]
    pub method: Option<PaymentMethod>,
    #[serde(
        default,
        rename = "paidStatus",
        alias = "PaidStatus",
        alias = "paid_status"
    )]
    pub paid_status: Option<PaidStatus>,
    #[serde(default, alias = "Items")]
    pub items: Option<Vec<ItemPayload>>,
}

impl TransactionPatch {
    /// Apply the patch on top of `current`.
    ///
    /// For sales, new items or a new description replace the line items and
    /// the totals are derived again. Amounts of a sale with line items are
    /// always derived from the items.
    ///
    /// # Errors
    /// Returns an [Error::InvalidPayload] if the new name is blank or an
    /// [Error::InvalidDate] if the new date is not `YYYY-MM-DD`.
    pub fn apply(self, current: &Transaction) -> Result<TransactionBuilder, Error> {
        let mut builder = current.to_builder();

        if let Some(name) = &self.name {
            builder.name = validate_name(name)?.to_owned();
        }

        if let Some(date) = &self.date {
            builder.date = parse_date(date)?;
        }

        if let Some(reference) = &self.reference {
            builder = builder.reference(reference.trim());
        }

        if let Some(actions) = self.actions {
            builder = builder.actions(actions);
        }

        if let Some(done) = self.done {
            builder = builder.done(done);
        }

        if let Some(method) = self.method {
            builder = builder.method(method);
        }

        if let Some(paid_status) = self.paid_status {
            builder = builder.paid_status(paid_status);
        }

        match current.category {
            Category::Sales => {
                let new_items = match (self.items, &self.description) {
                    (Some(items), _) if !items.is_empty() => {
                        Some(items.into_iter().map(LineItem::from).collect())
                    }
                    (_, Some(description)) => parse_structured_line_items(description),
                    _ => None,
                };

                if let Some(items) = new_items {
                    builder = builder.items(items);
                } else {
                    if let Some(description) = &self.description {
                        builder.items.clear();
                        builder = builder.description(description.trim());
                    }

                    if builder.items.is_empty() {
                        let amount = self.amount.unwrap_or(builder.amount);
                        let vat = self.vat.unwrap_or(builder.vat);
                        let total = self.total.unwrap_or(
                            if self.amount.is_some() || self.vat.is_some() {
                                round_cents(amount + vat)
                            } else {
                                builder.total
                            },
                        );
                        builder = builder.amounts(amount, vat, total);
                    }
                }
            }
            category @ (Category::Received | Category::Purchases | Category::Expenses) => {
                if let Some(description) = &self.description {
                    builder = builder.description(description.trim());
                }

                let amount = self.amount.unwrap_or(builder.amount);
                let vat = self.vat.or(Some(builder.vat));
                let total = self.total.or_else(|| {
                    let changed = self.amount.is_some() || self.vat.is_some();
                    (!changed).then_some(builder.total)
                });
                let (vat, total) = derive_amounts(category, amount, vat, total);

                builder = builder.amounts(amount, vat, total);
            }
        }

        Ok(builder)
    }
}

/// Fill in the VAT and total of a non-sale transaction.
///
/// Purchases default the total to amount plus VAT. Expenses and received
/// payments carry no VAT, and a received payment's total is its amount.
fn derive_amounts(
    category: Category,
    amount: f64,
    vat: Option<f64>,
    total: Option<f64>,
) -> (f64, f64) {
    match category {
        Category::Purchases | Category::Sales => {
            let vat = vat.unwrap_or_default();
            (vat, total.unwrap_or(round_cents(amount + vat)))
        }
        Category::Expenses => (0.0, total.unwrap_or(amount)),
        Category::Received => (0.0, amount),
    }
}

fn validate_name(name: &str) -> Result<&str, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::InvalidPayload("name must not be empty".to_owned()));
    }

    Ok(name)
}

/// Parse a date in the `YYYY-MM-DD` format.
///
/// # Errors
/// Returns [Error::InvalidDate] if `text` is not a valid date.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    Date::parse(text.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| Error::InvalidDate(text.to_owned()))
}
