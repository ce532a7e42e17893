//! Transactions for the four ledgers: sales, received payments, purchases and
//! expenses.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying, and managing transactions
//! - The ledger page with its htmx endpoints, the CSV export and the JSON API

mod api;
mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod export;
mod form;
mod ledger_page;
mod query;
mod record;
mod sale_items_endpoint;
mod view;

pub use api::{
    create_transaction_api, delete_transaction_api, delete_transaction_at_api,
    get_transactions_api, update_transaction_api, update_transaction_at_api,
};
pub use core::{
    Transaction, TransactionBuilder, TransactionId, create_transaction, create_transaction_tables,
    delete_transaction, get_transaction, get_transactions, toggle_done, transaction_id_at,
    update_transaction,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::{edit_transaction_endpoint, toggle_done_endpoint};
pub use export::export_transactions;
pub use ledger_page::{get_index_page, get_ledger_page};
pub use query::{LedgerQuery, LedgerTotals, SortColumn, SortOrder};
pub use record::{TransactionPatch, TransactionPayload, TransactionRecord};
pub use sale_items_endpoint::sale_items_endpoint;

#[cfg(test)]
pub use core::count_transactions;
