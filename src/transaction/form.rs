//! The form data sent by the ledger page and its conversion into a builder.

use serde::Deserialize;

use crate::{
    Error,
    category::{Category, PaidStatus, PaymentMethod},
    reference::{ReferenceKind, ReferenceTags},
    sale::{LineItem, round_cents},
    transaction::{Transaction, TransactionBuilder, record::parse_date},
};

/// The fields of the add and edit forms on the ledger page.
///
/// Every field is optional at this level so that a missing field can be
/// reported with the same message as an empty one.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LedgerForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub vat: String,
    #[serde(default)]
    pub total: String,
    /// Payment notes of a received payment.
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub method: Option<PaymentMethod>,
    /// One action per line.
    #[serde(default)]
    pub actions: String,
    #[serde(default)]
    pub done: Option<String>,
    #[serde(default)]
    pub paid_status: String,
    #[serde(default)]
    pub item_description: Vec<String>,
    #[serde(default)]
    pub item_quantity: Vec<String>,
    #[serde(default)]
    pub item_price: Vec<String>,
    #[serde(default)]
    pub vat_applies: Option<String>,
    #[serde(default)]
    pub quotation_enabled: Option<String>,
    #[serde(default)]
    pub quotation_number: String,
    #[serde(default)]
    pub invoice_enabled: Option<String>,
    #[serde(default)]
    pub invoice_number: String,
    #[serde(default)]
    pub qb_enabled: Option<String>,
    #[serde(default)]
    pub qb_number: String,
    #[serde(default)]
    pub qb_estimate_enabled: Option<String>,
    #[serde(default)]
    pub qb_estimate_number: String,
}

/// Turn the repeated line item fields of the sale form into line items,
/// one per row, including blank rows.
///
/// Quantities below one become one and prices that are not numbers become
/// zero so that the table can always be redrawn.
pub fn line_item_rows(
    descriptions: &[String],
    quantities: &[String],
    prices: &[String],
    vat_applies: bool,
) -> Vec<LineItem> {
    let row_count = descriptions.len().max(quantities.len()).max(prices.len());

    (0..row_count)
        .map(|row| {
            let description = descriptions
                .get(row)
                .map(|text| text.trim())
                .unwrap_or_default();
            let quantity = quantities
                .get(row)
                .and_then(|text| text.trim().parse::<u32>().ok())
                .unwrap_or(1)
                .max(1);
            let price = prices
                .get(row)
                .and_then(|text| text.trim().parse::<f64>().ok())
                .filter(|price| price.is_finite())
                .unwrap_or_default();

            LineItem::new(description, quantity, price, vat_applies)
        })
        .collect()
}

impl LedgerForm {
    /// Every line item row of the sale form, including blank rows.
    pub fn line_items(&self) -> Vec<LineItem> {
        line_item_rows(
            &self.item_description,
            &self.item_quantity,
            &self.item_price,
            self.vat_applies.is_some(),
        )
    }

    /// The reference numbers of the ticked reference checkboxes.
    pub fn reference_tags(&self) -> ReferenceTags {
        let mut tags = ReferenceTags::default();

        for kind in ReferenceKind::ALL {
            let (enabled, number) = match kind {
                ReferenceKind::Quotation => (&self.quotation_enabled, &self.quotation_number),
                ReferenceKind::Invoice => (&self.invoice_enabled, &self.invoice_number),
                ReferenceKind::QuickBooks => (&self.qb_enabled, &self.qb_number),
                ReferenceKind::QuickBooksEstimate => {
                    (&self.qb_estimate_enabled, &self.qb_estimate_number)
                }
            };

            if enabled.is_some() {
                tags.set(kind, Some(number.trim().to_owned()));
            }
        }

        tags
    }

    /// The non-blank lines of the actions text area.
    pub fn action_list(&self) -> Vec<String> {
        self.actions
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Validate the form for `category` and turn it into a builder.
    ///
    /// # Errors
    /// Returns a:
    /// - [Error::MissingFields] with the message for the category if a
    ///   required field is empty,
    /// - [Error::InvalidDate] if the date is not `YYYY-MM-DD`,
    /// - [Error::InvalidPayload] if an amount is not a number.
    pub fn into_builder(self, category: Category) -> Result<TransactionBuilder, Error> {
        let name = self.name.trim();
        let has_amount = !self.amount.trim().is_empty();

        let missing = match category {
            Category::Sales => name.is_empty() || self.date.trim().is_empty(),
            Category::Received | Category::Expenses => {
                name.is_empty() || self.date.trim().is_empty() || !has_amount
            }
            Category::Purchases => {
                name.is_empty()
                    || self.date.trim().is_empty()
                    || !has_amount
                    || self.vat.trim().is_empty()
            }
        };

        if missing {
            return Err(Error::MissingFields(missing_fields_message(category).to_owned()));
        }

        let date = parse_date(&self.date)?;
        let builder = Transaction::build(category, name, date)
            .actions(self.action_list())
            .done(self.done.is_some());

        let builder = match category {
            Category::Sales => {
                let paid_status = self
                    .paid_status
                    .parse::<PaidStatus>()
                    .unwrap_or_default();

                builder
                    .items(
                        self.line_items()
                            .into_iter()
                            .filter(|item| !item.description.is_empty() || item.price != 0.0)
                            .collect(),
                    )
                    .reference(&self.reference_tags().encode())
                    .paid_status(paid_status)
            }
            Category::Received => {
                let amount = parse_amount("Amount", &self.amount)?;

                builder
                    .description(self.notes.trim())
                    .amounts(amount, 0.0, amount)
                    .method(self.method.unwrap_or_default())
            }
            Category::Purchases => {
                let amount = parse_amount("Amount", &self.amount)?;
                let vat = parse_amount("VAT", &self.vat)?;
                let total = parse_optional_amount("Total", &self.total)?
                    .unwrap_or(round_cents(amount + vat));

                builder
                    .description(self.description.trim())
                    .reference(self.reference.trim())
                    .amounts(amount, vat, total)
            }
            Category::Expenses => {
                let amount = parse_amount("Amount", &self.amount)?;
                let total = parse_optional_amount("Total", &self.total)?.unwrap_or(amount);

                builder
                    .description(self.description.trim())
                    .reference(self.reference.trim())
                    .amounts(amount, 0.0, total)
            }
        };

        Ok(builder)
    }
}

/// The message shown when a required field of the `category` form is empty.
pub fn missing_fields_message(category: Category) -> &'static str {
    match category {
        Category::Sales => "Customer name and date are required.",
        Category::Received => "Name, date, and amount are required.",
        Category::Purchases | Category::Expenses => "Please fill all required fields.",
    }
}

fn parse_amount(field: &str, text: &str) -> Result<f64, Error> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .ok_or_else(|| Error::InvalidPayload(format!("{field} \"{text}\" is not a number.")))
}

fn parse_optional_amount(field: &str, text: &str) -> Result<Option<f64>, Error> {
    if text.trim().is_empty() {
        Ok(None)
    } else {
        parse_amount(field, text).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Error,
        category::{Category, PaidStatus, PaymentMethod},
        sale::LineItem,
        transaction::form::{LedgerForm, line_item_rows},
    };

    fn parse(body: &str) -> LedgerForm {
        serde_html_form::from_str(body).unwrap()
    }

    #[test]
    fn parses_repeated_item_fields() {
        let form = parse(
            "name=Jane&date=2025-10-05&item_description=Widget&item_quantity=2&item_price=10\
            &item_description=Bolt&item_quantity=4&item_price=0.5&vat_applies=true",
        );

        assert_eq!(
            form.line_items(),
            vec![
                LineItem::new("Widget", 2, 10.0, true),
                LineItem::new("Bolt", 4, 0.5, true),
            ]
        );
    }

    #[test]
    fn bad_quantities_and_prices_are_forgiven_in_rows() {
        let rows = line_item_rows(
            &["Widget".to_owned()],
            &["0".to_owned()],
            &["abc".to_owned()],
            false,
        );

        assert_eq!(rows, vec![LineItem::new("Widget", 1, 0.0, false)]);
    }

    #[test]
    fn missing_row_fields_use_defaults() {
        let rows = line_item_rows(&["A".to_owned(), "B".to_owned()], &[], &["2".to_owned()], true);

        assert_eq!(
            rows,
            vec![LineItem::new("A", 1, 2.0, true), LineItem::new("B", 1, 0.0, true)]
        );
    }

    #[test]
    fn sale_requires_name_and_date() {
        let result = parse("name=&date=2025-10-05").into_builder(Category::Sales);

        assert_eq!(
            result,
            Err(Error::MissingFields("Customer name and date are required.".to_owned()))
        );
    }

    #[test]
    fn received_requires_amount() {
        let result = parse("name=Jane&date=2025-10-05&amount=").into_builder(Category::Received);

        assert_eq!(
            result,
            Err(Error::MissingFields("Name, date, and amount are required.".to_owned()))
        );
    }

    #[test]
    fn purchase_requires_vat() {
        let result =
            parse("name=Acme&date=2025-10-05&amount=100").into_builder(Category::Purchases);

        assert_eq!(
            result,
            Err(Error::MissingFields("Please fill all required fields.".to_owned()))
        );
    }

    #[test]
    fn rejects_bad_date() {
        let result =
            parse("name=Acme&date=tomorrow&amount=100").into_builder(Category::Expenses);

        assert_eq!(result, Err(Error::InvalidDate("tomorrow".to_owned())));
    }

    #[test]
    fn rejects_non_numeric_amount() {
        let result =
            parse("name=Acme&date=2025-10-05&amount=lots").into_builder(Category::Expenses);

        assert!(matches!(result, Err(Error::InvalidPayload(_))));
    }

    #[test]
    fn builds_sale_with_items_references_and_status() {
        let builder = parse(
            "name=Jane&date=2025-10-05\
            &item_description=Widget&item_quantity=2&item_price=10\
            &item_description=&item_quantity=1&item_price=\
            &vat_applies=true\
            &quotation_enabled=true&quotation_number=12\
            &qb_enabled=true&qb_number=\
            &invoice_number=99\
            &paid_status=full&actions=Sent+quote%0D%0A%0D%0ACalled&done=true",
        )
        .into_builder(Category::Sales)
        .unwrap();

        assert_eq!(builder.date, date!(2025 - 10 - 05));
        assert_eq!(builder.items, vec![LineItem::new("Widget", 2, 10.0, true)]);
        assert_eq!((builder.amount, builder.vat, builder.total), (20.0, 3.0, 23.0));
        assert_eq!(builder.reference, "Quotation#12, QB#");
        assert_eq!(builder.paid_status, Some(PaidStatus::Full));
        assert_eq!(builder.actions, vec!["Sent quote", "Called"]);
        assert!(builder.done);
    }

    #[test]
    fn builds_received_with_notes_and_method() {
        let builder = parse("name=Jane&date=2025-10-05&amount=50&notes=Deposit&method=bank")
            .into_builder(Category::Received)
            .unwrap();

        assert_eq!(builder.description, "Deposit");
        assert_eq!((builder.amount, builder.vat, builder.total), (50.0, 0.0, 50.0));
        assert_eq!(builder.method, Some(PaymentMethod::Bank));
        assert!(!builder.done);
    }

    #[test]
    fn purchase_total_is_calculated_when_empty() {
        let builder = parse("name=Acme&date=2025-10-05&amount=100&vat=15&total=&reference=PO-7")
            .into_builder(Category::Purchases)
            .unwrap();

        assert_eq!((builder.amount, builder.vat, builder.total), (100.0, 15.0, 115.0));
        assert_eq!(builder.reference, "PO-7");
    }

    #[test]
    fn expense_total_defaults_to_amount() {
        let builder = parse("name=Power+Co&date=2025-10-05&amount=80&total=")
            .into_builder(Category::Expenses)
            .unwrap();

        assert_eq!((builder.amount, builder.vat, builder.total), (80.0, 0.0, 80.0));
    }
}
