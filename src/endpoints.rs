//! The endpoint URIs.
//!
//! For endpoints that take parameters, e.g. '/ledger/{category}/{transaction_id}',
//! use [format_endpoint] or one of the helpers below.

use crate::{category::Category, transaction::TransactionId};

/// The root route which redirects to the sales ledger.
pub const ROOT: &str = "/";
/// The page with the form and list for one category, the add form posts here too.
pub const LEDGER_VIEW: &str = "/ledger/{category}";
/// The route for updating or deleting a transaction from the ledger page.
pub const LEDGER_TRANSACTION: &str = "/ledger/{category}/{transaction_id}";
/// The route for flipping the done flag of a transaction.
pub const LEDGER_TOGGLE_DONE: &str = "/ledger/{category}/{transaction_id}/done";
/// The route that re-renders the sale line items table.
pub const SALE_ITEMS: &str = "/sale-items";
/// The route for downloading a category as CSV.
pub const EXPORT: &str = "/export/{category}";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for listing a category as JSON.
pub const TRANSACTIONS_API: &str = "/transactions/{category}";
/// The route for creating a transaction from JSON.
pub const CREATE_TRANSACTION_API: &str = "/transaction";
/// The route for updating or deleting a transaction by its position in the list.
pub const TRANSACTION_AT_API: &str = "/transactions/{category}/{index}";
/// The route for updating or deleting a transaction by its ID.
pub const TRANSACTION_API: &str = "/api/transactions/{transaction_id}";

/// Replace the parameters in `endpoint_path` with `values`, in order.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/ledger/{category}', '{category}' is
/// the parameter.
///
/// Parameters without a matching value are left as is.
pub fn format_endpoint(endpoint_path: &str, values: &[&str]) -> String {
    let mut formatted = String::with_capacity(endpoint_path.len());
    let mut values = values.iter();
    let mut rest = endpoint_path;

    while let Some(start) = rest.find('{') {
        let Some(length) = rest[start..].find('}') else {
            break;
        };
        let end = start + length + 1;

        formatted.push_str(&rest[..start]);

        match values.next() {
            Some(value) => formatted.push_str(value),
            None => formatted.push_str(&rest[start..end]),
        }

        rest = &rest[end..];
    }

    formatted.push_str(rest);
    formatted
}

/// The ledger page for `category`.
pub fn ledger_view(category: Category) -> String {
    format_endpoint(LEDGER_VIEW, &[category.as_str()])
}

/// The route for updating or deleting `transaction_id` from the ledger page.
pub fn ledger_transaction(category: Category, transaction_id: TransactionId) -> String {
    format_endpoint(
        LEDGER_TRANSACTION,
        &[category.as_str(), &transaction_id.to_string()],
    )
}

/// The route for flipping the done flag of `transaction_id`.
pub fn ledger_toggle_done(category: Category, transaction_id: TransactionId) -> String {
    format_endpoint(
        LEDGER_TOGGLE_DONE,
        &[category.as_str(), &transaction_id.to_string()],
    )
}

/// The CSV export for `category`.
pub fn export(category: Category) -> String {
    format_endpoint(EXPORT, &[category.as_str()])
}
