//! The page with the form and the transaction list for one category.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::Category,
    endpoints,
    html::{PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    timezone::local_today,
    transaction::{
        LedgerQuery, LedgerTotals, Transaction, get_transaction, get_transactions,
        view::{FormMode, FormValues, transaction_form, transactions_list},
    },
};

/// The state needed for the ledger page.
#[derive(Debug, Clone)]
pub struct LedgerPageState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for LedgerPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Redirect to the first ledger.
pub async fn get_index_page() -> Redirect {
    Redirect::to(&endpoints::ledger_view(Category::Sales))
}

/// Render the ledger page for the category in the path.
///
/// When the query has `edit=<id>` the form is filled with that transaction.
pub async fn get_ledger_page(
    State(state): State<LedgerPageState>,
    Path(category): Path<String>,
    Query(query): Query<LedgerQuery>,
) -> Result<Response, Error> {
    let category: Category = category.parse()?;
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let editing = match query.edit {
        Some(id) => Some(get_transaction_in_category(category, id, &connection)?),
        None => None,
    };
    let transactions = get_transactions(category, &connection)
        .inspect_err(|error| tracing::error!("could not get {category} transactions: {error}"))?;
    drop(connection);

    let visible = query.apply(transactions);
    let totals = LedgerTotals::from_transactions(&visible);

    let (mode, values) = match &editing {
        Some(transaction) => (
            FormMode::Edit(transaction.id),
            FormValues::from_transaction(transaction),
        ),
        None => (FormMode::Create, FormValues::new(today)),
    };

    Ok(ledger_view(
        category,
        transaction_form(category, mode, &values, &query),
        transactions_list(category, &visible, &totals, &query),
    )
    .into_response())
}

/// Get the transaction `id` if it is recorded under `category`.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such transaction in `category`.
pub(crate) fn get_transaction_in_category(
    category: Category,
    id: i64,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = get_transaction(id, connection)?;

    if transaction.category == category {
        Ok(transaction)
    } else {
        Err(Error::NotFound)
    }
}

fn ledger_view(category: Category, form: Markup, list: Markup) -> Markup {
    let content = html! {
        (NavBar::new(category).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            (form)
            (list)
        }
    };

    base(category.label(), &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, Query, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        Error,
        category::Category,
        db::initialize,
        test_utils::{
            assert_form_input, assert_hx_endpoint, assert_valid_html, must_get_form,
            parse_html_document,
        },
        transaction::{LedgerQuery, Transaction, create_transaction},
    };

    use super::{LedgerPageState, get_ledger_page};

    fn get_test_state() -> LedgerPageState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        LedgerPageState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn add(state: &LedgerPageState, category: Category, name: &str, done: bool) -> Transaction {
        let connection = state.db_connection.lock().unwrap();
        create_transaction(
            Transaction::build(category, name, date!(2025 - 10 - 05))
                .amounts(10.0, 0.0, 10.0)
                .done(done),
            &connection,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn renders_rows_for_category_only() {
        let state = get_test_state();
        add(&state, Category::Expenses, "Power Co", false);
        add(&state, Category::Expenses, "Old bill", true);
        add(&state, Category::Purchases, "Acme", false);

        let response = get_ledger_page(
            State(state),
            Path("expenses".to_owned()),
            Query(LedgerQuery::default()),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let rows = html
            .select(&Selector::parse("tbody tr").unwrap())
            .collect::<Vec<_>>();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].text().any(|text| text.contains("Power Co")));
        let title = html
            .select(&Selector::parse("title").unwrap())
            .next()
            .unwrap()
            .text()
            .collect::<String>();
        assert_eq!(title, "Expenses - Bookkeeper");
    }

    #[tokio::test]
    async fn edit_query_fills_form() {
        let state = get_test_state();
        let transaction = add(&state, Category::Received, "Jane", false);

        let response = get_ledger_page(
            State(state),
            Path("received".to_owned()),
            Query(LedgerQuery {
                edit: Some(transaction.id),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        let form = must_get_form(&html, "form[hx-put]");
        assert_hx_endpoint(
            &form,
            &format!("/ledger/received/{}", transaction.id),
            "hx-put",
        );
        let name = html
            .select(&Selector::parse("input[name=name]").unwrap())
            .next()
            .unwrap();
        assert_eq!(name.value().attr("value"), Some("Jane"));
    }

    #[tokio::test]
    async fn purchase_form_requires_amount_and_vat() {
        let response = get_ledger_page(
            State(get_test_state()),
            Path("purchases".to_owned()),
            Query(LedgerQuery::default()),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        let form = must_get_form(&html, "form[hx-post]");
        assert_hx_endpoint(&form, "/ledger/purchases", "hx-post");
        assert_form_input(&form, "name", "text", true);
        assert_form_input(&form, "date", "date", true);
        assert_form_input(&form, "amount", "number", true);
        assert_form_input(&form, "vat", "number", true);
        assert_form_input(&form, "total", "number", false);
        assert_form_input(&form, "reference", "text", false);
    }

    #[tokio::test]
    async fn editing_transaction_from_other_category_is_not_found() {
        let state = get_test_state();
        let transaction = add(&state, Category::Received, "Jane", false);

        let result = get_ledger_page(
            State(state),
            Path("sales".to_owned()),
            Query(LedgerQuery {
                edit: Some(transaction.id),
                ..Default::default()
            }),
        )
        .await;

        assert_eq!(result.map(|_| ()), Err(Error::NotFound));
    }

    #[tokio::test]
    async fn unknown_category_is_not_found_page() {
        let state = get_test_state();

        let result = get_ledger_page(
            State(state),
            Path("refunds".to_owned()),
            Query(LedgerQuery::default()),
        )
        .await;

        let error = result.map(|_| ()).unwrap_err();
        assert_eq!(error, Error::InvalidCategory("refunds".to_owned()));
        assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
    }
}
