//! Redraws the sale line items table while the sale form is being filled in.

use axum::response::{IntoResponse, Response};
use axum_extra::extract::Form;
use serde::Deserialize;

use crate::{
    sale::LineItem,
    transaction::{form::line_item_rows, view::sale_items_table},
};

/// What to do with the line items before redrawing them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleItemsOp {
    /// Recompute the line totals and VAT.
    #[default]
    Refresh,
    /// Append a blank line.
    Add,
    /// Remove the line at `index`.
    Remove,
}

/// The sale form fields that the items table depends on.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaleItemsForm {
    #[serde(default)]
    pub item_description: Vec<String>,
    #[serde(default)]
    pub item_quantity: Vec<String>,
    #[serde(default)]
    pub item_price: Vec<String>,
    #[serde(default)]
    pub vat_applies: Option<String>,
    #[serde(default)]
    pub op: SaleItemsOp,
    #[serde(default)]
    pub index: Option<usize>,
}

/// A route handler that applies `op` to the posted line items and responds
/// with the redrawn items table.
///
/// The last remaining line is never removed so that the form always has a row.
pub async fn sale_items_endpoint(Form(form): Form<SaleItemsForm>) -> Response {
    let vat_applies = form.vat_applies.is_some();
    let mut items = line_item_rows(
        &form.item_description,
        &form.item_quantity,
        &form.item_price,
        vat_applies,
    );

    match (form.op, form.index) {
        (SaleItemsOp::Add, _) => items.push(LineItem::blank().with_vat(vat_applies)),
        (SaleItemsOp::Remove, Some(index)) if index < items.len() && items.len() > 1 => {
            items.remove(index);
        }
        (SaleItemsOp::Remove, index) => {
            tracing::debug!("ignoring removal of line {index:?} from {} lines", items.len());
        }
        (SaleItemsOp::Refresh, _) => {}
    }

    if items.is_empty() {
        items.push(LineItem::blank().with_vat(vat_applies));
    }

    sale_items_table(&items, vat_applies).into_response()
}
