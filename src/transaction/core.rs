//! Defines the core data models and database queries for transactions.

use std::collections::HashMap;

use rusqlite::{Connection, Row, params};
use time::Date;

use crate::{
    Error,
    category::{Category, PaidStatus, PaymentMethod},
    sale::{LineItem, SaleTotals, charges_vat, encode_line_items},
};

/// Alias for the integer type used for transaction IDs.
pub type TransactionId = i64;

// ============================================================================
// MODELS
// ============================================================================

/// A single book entry: a sale, a payment received, a purchase or an expense.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The stable ID of the transaction.
    pub id: TransactionId,
    /// Which ledger the transaction belongs to.
    pub category: Category,
    /// The customer or vendor.
    pub name: String,
    /// When the transaction happened.
    pub date: Date,
    /// Free text for purchases and expenses, payment notes for received
    /// payments. Sales keep their lines in `items` instead, unless the sale
    /// was recorded with a description that is not in the line item format.
    pub description: String,
    /// Reference numbers, e.g. `Quotation#123, Invoice#45` for sales.
    pub reference: String,
    /// The amount excluding VAT.
    pub amount: f64,
    /// The VAT charged.
    pub vat: f64,
    /// The amount including VAT.
    pub total: f64,
    /// The line items of a sale, empty for other categories.
    pub items: Vec<LineItem>,
    /// Follow up notes, e.g. "Sent invoice", in the order they were entered.
    pub actions: Vec<String>,
    /// Whether the transaction has been fully processed.
    pub done: bool,
    /// How a received payment was made.
    pub method: Option<PaymentMethod>,
    /// How much of a sale has been paid.
    pub paid_status: Option<PaidStatus>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(category: Category, name: &str, date: Date) -> TransactionBuilder {
        TransactionBuilder {
            category,
            name: name.to_owned(),
            date,
            description: String::new(),
            reference: String::new(),
            amount: 0.0,
            vat: 0.0,
            total: 0.0,
            items: Vec::new(),
            actions: Vec::new(),
            done: false,
            method: matches!(category, Category::Received).then_some(PaymentMethod::Cash),
            paid_status: None,
        }
    }

    /// Start a builder from the stored state, used for partial updates.
    pub fn to_builder(&self) -> TransactionBuilder {
        TransactionBuilder {
            category: self.category,
            name: self.name.clone(),
            date: self.date,
            description: self.description.clone(),
            reference: self.reference.clone(),
            amount: self.amount,
            vat: self.vat,
            total: self.total,
            items: self.items.clone(),
            actions: self.actions.clone(),
            done: self.done,
            method: self.method,
            paid_status: self.paid_status,
        }
    }

    /// The description as shown to users and API clients.
    ///
    /// For sales with line items this is the encoded line item string.
    pub fn display_description(&self) -> String {
        if self.items.is_empty() {
            self.description.clone()
        } else {
            encode_line_items(&self.items)
        }
    }

    /// Whether any line of a sale charges VAT.
    pub fn charges_vat(&self) -> bool {
        if self.items.is_empty() {
            self.vat != 0.0
        } else {
            charges_vat(&self.items)
        }
    }
}

/// A builder for creating and updating [Transaction] instances.
///
/// Amounts are set with [TransactionBuilder::amounts] for every category
/// except sales with line items, where [TransactionBuilder::items] derives
/// them.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    pub category: Category,
    pub name: String,
    pub date: Date,
    pub description: String,
    pub reference: String,
    pub amount: f64,
    pub vat: f64,
    pub total: f64,
    pub items: Vec<LineItem>,
    pub actions: Vec<String>,
    pub done: bool,
    pub method: Option<PaymentMethod>,
    pub paid_status: Option<PaidStatus>,
}

impl TransactionBuilder {
    /// Set the free text description.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Set the reference text.
    pub fn reference(mut self, reference: &str) -> Self {
        self.reference = reference.to_owned();
        self
    }

    /// Set the amount, VAT and total.
    pub fn amounts(mut self, amount: f64, vat: f64, total: f64) -> Self {
        self.amount = amount;
        self.vat = vat;
        self.total = total;
        self
    }

    /// Set the line items of a sale and derive the amounts from them.
    ///
    /// The free text description is cleared since the items replace it.
    pub fn items(mut self, items: Vec<LineItem>) -> Self {
        let totals = SaleTotals::from_items(&items);
        self.amount = totals.amount;
        self.vat = totals.vat;
        self.total = totals.total;
        self.items = items;
        self.description.clear();
        self
    }

    /// Set the follow up actions, dropping blank entries.
    pub fn actions(mut self, actions: Vec<String>) -> Self {
        self.actions = actions
            .into_iter()
            .map(|action| action.trim().to_owned())
            .filter(|action| !action.is_empty())
            .collect();
        self
    }

    /// Mark the transaction as done or not.
    pub fn done(mut self, done: bool) -> Self {
        self.done = done;
        self
    }

    /// Set how a received payment was made.
    ///
    /// Ignored for categories other than received payments.
    pub fn method(mut self, method: PaymentMethod) -> Self {
        if matches!(self.category, Category::Received) {
            self.method = Some(method);
        }
        self
    }

    /// Set how much of a sale has been paid.
    ///
    /// Ignored for categories other than sales.
    pub fn paid_status(mut self, paid_status: PaidStatus) -> Self {
        if matches!(self.category, Category::Sales) {
            self.paid_status = paid_status.into_option();
        }
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const SELECT_COLUMNS: &str = "SELECT id, category, name, date, description, reference, amount, \
    vat, total, done, method, paid_status FROM \"transaction\"";

/// Create a new transaction in the database from a builder.
///
/// The transaction, its line items and its actions are written atomically.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    let id: TransactionId = sql_transaction
        .prepare(
            "INSERT INTO \"transaction\" \
                (category, name, date, description, reference, amount, vat, total, done, method, paid_status) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11) \
             RETURNING id",
        )?
        .query_row(
            params![
                builder.category,
                builder.name,
                builder.date,
                builder.description,
                builder.reference,
                builder.amount,
                builder.vat,
                builder.total,
                builder.done,
                builder.method,
                builder.paid_status,
            ],
            |row| row.get(0),
        )?;

    insert_children(id, &builder.items, &builder.actions, &sql_transaction)?;
    sql_transaction.commit()?;

    Ok(from_builder(id, builder))
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let mut transaction = connection
        .prepare(&format!("{SELECT_COLUMNS} WHERE id = :id"))?
        .query_one(&[(":id", &id)], map_transaction_row)?;

    let mut items = get_items(&[id], connection)?;
    let mut actions = get_actions(&[id], connection)?;
    transaction.items = items.remove(&id).unwrap_or_default();
    transaction.actions = actions.remove(&id).unwrap_or_default();

    Ok(transaction)
}

/// Retrieve every transaction in `category`, in the order they were entered.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions(
    category: Category,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut transactions = connection
        .prepare(&format!(
            "{SELECT_COLUMNS} WHERE category = :category ORDER BY id ASC"
        ))?
        .query_map(&[(":category", &category)], map_transaction_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let ids = transactions
        .iter()
        .map(|transaction| transaction.id)
        .collect::<Vec<_>>();
    let mut items = get_items(&ids, connection)?;
    let mut actions = get_actions(&ids, connection)?;

    for transaction in &mut transactions {
        transaction.items = items.remove(&transaction.id).unwrap_or_default();
        transaction.actions = actions.remove(&transaction.id).unwrap_or_default();
    }

    Ok(transactions)
}

/// Get the ID of the transaction at `position` in the list for `category`.
///
/// Positions count from zero in the order returned by [get_transactions].
/// Callers that go on to modify the transaction must hold the database lock
/// for the whole operation, otherwise the position may refer to a different
/// transaction by the time it is used.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if there is no transaction at `position`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn transaction_id_at(
    category: Category,
    position: usize,
    connection: &Connection,
) -> Result<TransactionId, Error> {
    let offset = i64::try_from(position).map_err(|_| Error::NotFound)?;

    connection
        .query_row(
            "SELECT id FROM \"transaction\" WHERE category = ?1 ORDER BY id ASC LIMIT 1 OFFSET ?2",
            params![category, offset],
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// Replace every field of the transaction `id` with the values in `builder`.
///
/// The category of a transaction never changes, the builder's category is
/// ignored.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    let category: Category = sql_transaction
        .prepare(
            "UPDATE \"transaction\" SET \
                name = ?1, date = ?2, description = ?3, reference = ?4, amount = ?5, \
                vat = ?6, total = ?7, done = ?8, method = ?9, paid_status = ?10 \
             WHERE id = ?11 \
             RETURNING category",
        )?
        .query_row(
            params![
                builder.name,
                builder.date,
                builder.description,
                builder.reference,
                builder.amount,
                builder.vat,
                builder.total,
                builder.done,
                builder.method,
                builder.paid_status,
                id,
            ],
            |row| row.get(0),
        )?;

    sql_transaction.execute("DELETE FROM sale_item WHERE transaction_id = ?1", [id])?;
    sql_transaction.execute(
        "DELETE FROM transaction_action WHERE transaction_id = ?1",
        [id],
    )?;
    insert_children(id, &builder.items, &builder.actions, &sql_transaction)?;
    sql_transaction.commit()?;

    Ok(from_builder(
        id,
        TransactionBuilder {
            category,
            ..builder
        },
    ))
}

/// Flip the done flag of the transaction `id` and return its new value.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn toggle_done(id: TransactionId, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(
            "UPDATE \"transaction\" SET done = NOT done WHERE id = ?1 RETURNING done",
            [id],
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// Delete the transaction `id` with its line items and actions.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    sql_transaction.execute("DELETE FROM sale_item WHERE transaction_id = ?1", [id])?;
    sql_transaction.execute(
        "DELETE FROM transaction_action WHERE transaction_id = ?1",
        [id],
    )?;
    let rows_affected =
        sql_transaction.execute("DELETE FROM \"transaction\" WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    sql_transaction.commit()?;

    Ok(())
}

/// Get the total number of transactions in `category`.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub fn count_transactions(category: Category, connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE category = ?1",
            [category],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Create the transaction tables in the database.
///
/// # Errors
/// Returns an error if the tables cannot be created or if there is an SQL error.
pub fn create_transaction_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                category TEXT NOT NULL,
                name TEXT NOT NULL,
                date TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                reference TEXT NOT NULL DEFAULT '',
                amount REAL NOT NULL,
                vat REAL NOT NULL,
                total REAL NOT NULL,
                done INTEGER NOT NULL DEFAULT 0,
                method TEXT,
                paid_status TEXT
                )",
        (),
    )?;

    // Lists and positional lookups are always per category in ID order.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_category_id ON \"transaction\"(category, id);",
        (),
    )?;

    connection.execute(
        "CREATE TABLE IF NOT EXISTS sale_item (
                transaction_id INTEGER NOT NULL,
                position INTEGER NOT NULL,
                description TEXT NOT NULL,
                quantity INTEGER NOT NULL,
                price REAL NOT NULL,
                total REAL NOT NULL,
                vat REAL NOT NULL,
                PRIMARY KEY(transaction_id, position),
                FOREIGN KEY(transaction_id) REFERENCES \"transaction\"(id) ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE TABLE IF NOT EXISTS transaction_action (
                transaction_id INTEGER NOT NULL,
                position INTEGER NOT NULL,
                action TEXT NOT NULL,
                PRIMARY KEY(transaction_id, position),
                FOREIGN KEY(transaction_id) REFERENCES \"transaction\"(id) ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction without its items or actions.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        category: row.get(1)?,
        name: row.get(2)?,
        date: row.get(3)?,
        description: row.get(4)?,
        reference: row.get(5)?,
        amount: row.get(6)?,
        vat: row.get(7)?,
        total: row.get(8)?,
        items: Vec::new(),
        actions: Vec::new(),
        done: row.get(9)?,
        method: row.get(10)?,
        paid_status: row.get(11)?,
    })
}

fn from_builder(id: TransactionId, builder: TransactionBuilder) -> Transaction {
    Transaction {
        id,
        category: builder.category,
        name: builder.name,
        date: builder.date,
        description: builder.description,
        reference: builder.reference,
        amount: builder.amount,
        vat: builder.vat,
        total: builder.total,
        items: builder.items,
        actions: builder.actions,
        done: builder.done,
        method: builder.method,
        paid_status: builder.paid_status,
    }
}

fn insert_children(
    id: TransactionId,
    items: &[LineItem],
    actions: &[String],
    connection: &Connection,
) -> Result<(), rusqlite::Error> {
    let mut insert_item = connection.prepare(
        "INSERT INTO sale_item (transaction_id, position, description, quantity, price, total, vat) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;

    for (position, item) in items.iter().enumerate() {
        insert_item.execute(params![
            id,
            position as i64,
            item.description,
            item.quantity,
            item.price,
            item.total,
            item.vat,
        ])?;
    }

    let mut insert_action = connection.prepare(
        "INSERT INTO transaction_action (transaction_id, position, action) VALUES (?1, ?2, ?3)",
    )?;

    for (position, action) in actions.iter().enumerate() {
        insert_action.execute(params![id, position as i64, action])?;
    }

    Ok(())
}

/// Load the line items for `ids`, grouped by transaction ID.
fn get_items(
    ids: &[TransactionId],
    connection: &Connection,
) -> Result<HashMap<TransactionId, Vec<LineItem>>, Error> {
    let mut grouped: HashMap<TransactionId, Vec<LineItem>> = HashMap::new();
    let mut statement = connection.prepare(
        "SELECT description, quantity, price, total, vat FROM sale_item \
         WHERE transaction_id = ?1 ORDER BY position ASC",
    )?;

    for id in ids {
        let items = statement
            .query_map([id], |row| {
                Ok(LineItem {
                    description: row.get(0)?,
                    quantity: row.get(1)?,
                    price: row.get(2)?,
                    total: row.get(3)?,
                    vat: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        if !items.is_empty() {
            grouped.insert(*id, items);
        }
    }

    Ok(grouped)
}

/// Load the actions for `ids`, grouped by transaction ID.
fn get_actions(
    ids: &[TransactionId],
    connection: &Connection,
) -> Result<HashMap<TransactionId, Vec<String>>, Error> {
    let mut grouped: HashMap<TransactionId, Vec<String>> = HashMap::new();
    let mut statement = connection.prepare(
        "SELECT action FROM transaction_action WHERE transaction_id = ?1 ORDER BY position ASC",
    )?;

    for id in ids {
        let actions = statement
            .query_map([id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        if !actions.is_empty() {
            grouped.insert(*id, actions);
        }
    }

    Ok(grouped)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        category::{Category, PaidStatus, PaymentMethod},
        db::initialize,
        sale::LineItem,
        transaction::{
            Transaction, count_transactions, create_transaction, delete_transaction,
            get_transaction, get_transactions, toggle_done, transaction_id_at, update_transaction,
        },
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();

        let result = create_transaction(
            Transaction::build(Category::Purchases, "Acme", date!(2025 - 10 - 05))
                .description("Paper")
                .reference("PO-1")
                .amounts(100.0, 15.0, 115.0),
            &conn,
        );

        match result {
            Ok(transaction) => {
                assert_eq!(transaction.id, 1);
                assert_eq!(transaction.total, 115.0);
            }
            Err(error) => panic!("Unexpected error: {error}"),
        }
    }

    #[test]
    fn sale_round_trips_items_and_actions() {
        let conn = get_test_connection();
        let items = vec![
            LineItem::new("Widget", 2, 10.0, true),
            LineItem::new("Bolt", 4, 0.5, true),
        ];
        let created = create_transaction(
            Transaction::build(Category::Sales, "Jane", date!(2025 - 10 - 05))
                .items(items.clone())
                .actions(vec!["Sent invoice".to_owned(), "  ".to_owned(), "Called".to_owned()])
                .paid_status(PaidStatus::Partial),
            &conn,
        )
        .unwrap();

        let got = get_transaction(created.id, &conn).unwrap();

        assert_eq!(got, created);
        assert_eq!(got.items, items);
        assert_eq!(got.actions, vec!["Sent invoice", "Called"]);
        assert_eq!(got.amount, 22.0);
        assert_eq!(got.vat, 3.3);
        assert_eq!(got.total, 25.3);
        assert_eq!(got.paid_status, Some(PaidStatus::Partial));
    }

    #[test]
    fn received_defaults_to_cash() {
        let conn = get_test_connection();

        let created = create_transaction(
            Transaction::build(Category::Received, "Jane", date!(2025 - 10 - 05))
                .amounts(50.0, 0.0, 50.0),
            &conn,
        )
        .unwrap();

        assert_eq!(created.method, Some(PaymentMethod::Cash));
    }

    #[test]
    fn method_is_ignored_outside_received() {
        let builder = Transaction::build(Category::Expenses, "Power Co", date!(2025 - 10 - 05))
            .method(PaymentMethod::Bank);

        assert_eq!(builder.method, None);
    }

    #[test]
    fn lists_only_the_requested_category_in_entry_order() {
        let conn = get_test_connection();
        for name in ["A", "B", "C"] {
            create_transaction(
                Transaction::build(Category::Expenses, name, date!(2025 - 10 - 05)),
                &conn,
            )
            .unwrap();
            create_transaction(
                Transaction::build(Category::Purchases, name, date!(2025 - 10 - 05)),
                &conn,
            )
            .unwrap();
        }

        let expenses = get_transactions(Category::Expenses, &conn).unwrap();

        let names = expenses
            .iter()
            .map(|transaction| transaction.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert!(
            expenses
                .iter()
                .all(|transaction| transaction.category == Category::Expenses)
        );
    }

    #[test]
    fn position_resolves_within_category() {
        let conn = get_test_connection();
        create_transaction(
            Transaction::build(Category::Sales, "first sale", date!(2025 - 10 - 05)),
            &conn,
        )
        .unwrap();
        let expense = create_transaction(
            Transaction::build(Category::Expenses, "first expense", date!(2025 - 10 - 05)),
            &conn,
        )
        .unwrap();

        assert_eq!(
            transaction_id_at(Category::Expenses, 0, &conn),
            Ok(expense.id)
        );
        assert_eq!(
            transaction_id_at(Category::Expenses, 1, &conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn update_replaces_fields_items_and_actions() {
        let conn = get_test_connection();
        let created = create_transaction(
            Transaction::build(Category::Sales, "Jane", date!(2025 - 10 - 05))
                .items(vec![LineItem::new("Widget", 1, 10.0, true)])
                .actions(vec!["Quote sent".to_owned()]),
            &conn,
        )
        .unwrap();

        let updated = update_transaction(
            created.id,
            created
                .to_builder()
                .items(vec![LineItem::new("Gadget", 3, 5.0, false)])
                .actions(vec![])
                .done(true),
            &conn,
        )
        .unwrap();

        let got = get_transaction(created.id, &conn).unwrap();
        assert_eq!(got, updated);
        assert_eq!(got.items.len(), 1);
        assert_eq!(got.items[0].description, "Gadget");
        assert_eq!(got.total, 15.0);
        assert!(got.actions.is_empty());
        assert!(got.done);
    }

    #[test]
    fn update_keeps_category() {
        let conn = get_test_connection();
        let created = create_transaction(
            Transaction::build(Category::Expenses, "Power Co", date!(2025 - 10 - 05)),
            &conn,
        )
        .unwrap();
        let mut builder = created.to_builder();
        builder.category = Category::Sales;

        let updated = update_transaction(created.id, builder, &conn).unwrap();

        assert_eq!(updated.category, Category::Expenses);
    }

    #[test]
    fn update_missing_transaction_fails() {
        let conn = get_test_connection();

        let result = update_transaction(
            42,
            Transaction::build(Category::Expenses, "Nobody", date!(2025 - 10 - 05)),
            &conn,
        );

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_removes_transaction_and_children() {
        let conn = get_test_connection();
        let created = create_transaction(
            Transaction::build(Category::Sales, "Jane", date!(2025 - 10 - 05))
                .items(vec![LineItem::new("Widget", 1, 10.0, true)])
                .actions(vec!["Quote sent".to_owned()]),
            &conn,
        )
        .unwrap();

        delete_transaction(created.id, &conn).unwrap();

        assert_eq!(get_transaction(created.id, &conn), Err(Error::NotFound));
        let orphans: i64 = conn
            .query_row(
                "SELECT (SELECT COUNT(*) FROM sale_item) + (SELECT COUNT(*) FROM transaction_action)",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn delete_missing_transaction_fails() {
        let conn = get_test_connection();

        assert_eq!(delete_transaction(7, &conn), Err(Error::NotFound));
    }

    #[test]
    fn toggle_done_flips_flag() {
        let conn = get_test_connection();
        let created = create_transaction(
            Transaction::build(Category::Expenses, "Power Co", date!(2025 - 10 - 05)),
            &conn,
        )
        .unwrap();

        assert_eq!(toggle_done(created.id, &conn), Ok(true));
        assert_eq!(toggle_done(created.id, &conn), Ok(false));
        assert_eq!(toggle_done(created.id + 1, &conn), Err(Error::NotFound));
    }

    #[test]
    fn get_count() {
        let conn = get_test_connection();
        let today = date!(2025 - 10 - 05);
        let want_count = 20;
        for i in 1..=want_count {
            create_transaction(
                Transaction::build(Category::Received, "Jane", today).amounts(i as f64, 0.0, i as f64),
                &conn,
            )
            .expect("Could not create transaction");
        }

        let got_count = count_transactions(Category::Received, &conn).expect("Could not get count");

        assert_eq!(want_count, got_count);
        assert_eq!(count_transactions(Category::Sales, &conn), Ok(0));
    }

    #[test]
    fn display_description_prefers_items() {
        let sale = Transaction::build(Category::Sales, "Jane", date!(2025 - 10 - 05))
            .description("ignored")
            .items(vec![LineItem::new("Widget", 1, 10.0, true)]);

        assert!(sale.description.is_empty());
        let conn = get_test_connection();
        let sale = create_transaction(sale, &conn).unwrap();
        assert_eq!(
            sale.display_description(),
            "#1: Widget | Qty: 1 | Price: 10 | Total: 10 | VAT: 1.5"
        );
    }
}
