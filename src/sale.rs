//! Sale line items, VAT and the text encoding used for a sale's description.
//!
//! A sale is made up of one or more line items. Each line carries its own
//! total and VAT so that a customer who is exempt from VAT can be billed
//! without it. On the wire the items are also flattened into a description
//! string of the form
//!
//! ```text
//! #1: Widget | Qty: 2 | Price: 10 | Total: 20 | VAT: 3; #2: Bolt | Qty: 1 | Price: 0.5 | Total: 0.5 | VAT: 0.08
//! ```
//!
//! which [parse_line_items] turns back into items.

use serde::{Deserialize, Serialize};

/// The VAT rate applied to sale line items.
pub const VAT_RATE: f64 = 0.15;

/// Round `amount` to the nearest cent.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// A single line on a sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// What was sold.
    pub description: String,
    /// How many units were sold.
    pub quantity: u32,
    /// The price of a single unit, excluding VAT.
    pub price: f64,
    /// `quantity * price`, excluding VAT.
    pub total: f64,
    /// The VAT charged on `total`.
    pub vat: f64,
}

impl LineItem {
    /// Create a line item, deriving its total and VAT.
    pub fn new(description: &str, quantity: u32, price: f64, vat_applies: bool) -> Self {
        let total = round_cents(quantity as f64 * price);

        Self {
            description: description.to_owned(),
            quantity,
            price,
            total,
            vat: vat_for(total, vat_applies),
        }
    }

    /// An empty line with a quantity of one, used to seed new sale forms.
    pub fn blank() -> Self {
        Self::new("", 1, 0.0, false)
    }

    /// Recompute the VAT for this line, e.g. after the VAT checkbox is toggled.
    pub fn with_vat(mut self, vat_applies: bool) -> Self {
        self.vat = vat_for(self.total, vat_applies);
        self
    }

    fn fallback(text: &str) -> Self {
        Self {
            description: text.trim().to_owned(),
            quantity: 1,
            price: 0.0,
            total: 0.0,
            vat: 0.0,
        }
    }
}

fn vat_for(total: f64, vat_applies: bool) -> f64 {
    if vat_applies {
        round_cents(total * VAT_RATE)
    } else {
        0.0
    }
}

/// The amounts that make up a whole sale.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SaleTotals {
    /// The sum of the line totals, excluding VAT.
    pub amount: f64,
    /// The sum of the line VAT.
    pub vat: f64,
    /// `amount + vat`.
    pub total: f64,
}

impl SaleTotals {
    /// Sum the line items of a sale.
    pub fn from_items(items: &[LineItem]) -> Self {
        let amount = round_cents(items.iter().map(|item| item.total).sum());
        let vat = round_cents(items.iter().map(|item| item.vat).sum());

        Self {
            amount,
            vat,
            total: round_cents(amount + vat),
        }
    }
}

/// Whether any line on a sale charges VAT.
pub fn charges_vat(items: &[LineItem]) -> bool {
    items.iter().any(|item| item.vat != 0.0)
}

/// Flatten line items into the description string format.
pub fn encode_line_items(items: &[LineItem]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            format!(
                "#{}: {} | Qty: {} | Price: {} | Total: {} | VAT: {}",
                index + 1,
                item.description,
                item.quantity,
                item.price,
                item.total,
                item.vat
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Parse every segment of an encoded description.
///
/// Segments that are not in the line item format are kept as a line with
/// the segment text as its description and zero amounts. An empty
/// description gives a single blank line.
pub fn parse_line_items(description: &str) -> Vec<LineItem> {
    let items = description
        .split(';')
        .filter(|segment| !segment.trim().is_empty())
        .map(|segment| parse_line_item(segment).unwrap_or_else(|| LineItem::fallback(segment)))
        .collect::<Vec<_>>();

    if items.is_empty() {
        vec![LineItem::blank()]
    } else {
        items
    }
}

/// Parse every segment of an encoded description, or `None` if any segment
/// is not in the line item format.
pub fn parse_structured_line_items(description: &str) -> Option<Vec<LineItem>> {
    let items = description
        .split(';')
        .filter(|segment| !segment.trim().is_empty())
        .map(parse_line_item)
        .collect::<Option<Vec<_>>>()?;

    if items.is_empty() { None } else { Some(items) }
}

/// Parse a single `#<n>: <desc> | Qty: <q> | Price: <p> | Total: <t> | VAT: <v>` segment.
pub fn parse_line_item(segment: &str) -> Option<LineItem> {
    let rest = skip_item_number(segment)?;

    let fields = rest.split('|').collect::<Vec<_>>();
    if fields.len() < 5 {
        return None;
    }

    let (description, numbers) = fields.split_at(fields.len() - 4);
    let description = description.join("|");

    let quantity = labelled_number(numbers[0], "qty")?;
    let price = labelled_number(numbers[1], "price")?;
    let total = labelled_number(numbers[2], "total")?;
    let vat = labelled_number(numbers[3], "vat")?;

    Some(LineItem {
        description: description.trim().to_owned(),
        quantity: quantity.parse().ok()?,
        price: price.parse().ok()?,
        total: total.parse().ok()?,
        vat: vat.parse().ok()?,
    })
}

/// Find the first `#<digits>:` in `segment` and return the text after it.
fn skip_item_number(segment: &str) -> Option<&str> {
    segment.match_indices('#').find_map(|(start, _)| {
        let after_hash = &segment[start + 1..];
        let digits = after_hash
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(after_hash.len());

        if digits > 0 && after_hash[digits..].starts_with(':') {
            Some(&after_hash[digits + 1..])
        } else {
            None
        }
    })
}

/// Strip `<label>:` from a field and return the leading run of digits and dots.
fn labelled_number<'a>(field: &'a str, label: &str) -> Option<&'a str> {
    let field = field.trim_start();
    let (name, value) = field.split_once(':')?;

    if !name.trim().eq_ignore_ascii_case(label) {
        return None;
    }

    let value = value.trim_start();
    let end = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());

    if end == 0 { None } else { Some(&value[..end]) }
}
