//! Downloads a category's transactions as a CSV file.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::Category,
    html::format_amount,
    transaction::{LedgerQuery, Transaction, get_transactions},
};

/// The state needed to export transactions.
#[derive(Debug, Clone)]
pub struct ExportState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

const HEADER: [&str; 9] = [
    "Name",
    "Date",
    "Description",
    "Reference",
    "Amount",
    "VAT",
    "Total",
    "Actions",
    "Done",
];

/// A route handler that responds with the transactions shown by the ledger
/// page for the same query, as a CSV attachment.
pub async fn export_transactions(
    State(state): State<ExportState>,
    Path(category): Path<String>,
    Query(query): Query<LedgerQuery>,
) -> Result<Response, Error> {
    let category: Category = category.parse()?;

    let transactions = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_transactions(category, &connection)?
    };

    let csv = write_csv(category, &query.apply(transactions))
        .inspect_err(|error| tracing::error!("could not export {category}: {error}"))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{category}.csv\""),
            ),
        ],
        csv,
    )
        .into_response())
}

/// Write `transactions` as CSV with the columns of the `category` ledger.
///
/// # Errors
/// Returns an [Error::CsvError] if a row could not be written.
pub fn write_csv(category: Category, transactions: &[Transaction]) -> Result<Vec<u8>, Error> {
    let with_method = matches!(category, Category::Received);
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = HEADER.to_vec();
    if with_method {
        header.push("Method");
    }
    writer.write_record(&header).map_err(csv_error)?;

    for transaction in transactions {
        let mut record = vec![
            transaction.name.clone(),
            transaction.date.to_string(),
            transaction.display_description(),
            transaction.reference.clone(),
            format_amount(transaction.amount),
            format_amount(transaction.vat),
            format_amount(transaction.total),
            transaction.actions.join(", "),
            transaction.done.to_string(),
        ];

        if with_method {
            record.push(
                transaction
                    .method
                    .unwrap_or_default()
                    .label()
                    .to_owned(),
            );
        }

        writer.write_record(&record).map_err(csv_error)?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))
}

fn csv_error(error: csv::Error) -> Error {
    Error::CsvError(error.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, Query, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        category::{Category, PaymentMethod},
        db::initialize,
        sale::LineItem,
        test_utils::{assert_content_type, get_header},
        transaction::{LedgerQuery, Transaction, create_transaction},
    };

    use super::{ExportState, export_transactions, write_csv};

    fn get_test_state() -> ExportState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        ExportState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    async fn body_text(response: axum::response::Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[test]
    fn writes_sale_rows() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let transaction = create_transaction(
            Transaction::build(Category::Sales, "Jane", date!(2025 - 10 - 05))
                .items(vec![LineItem::new("Widget", 2, 10.0, true)])
                .reference("Invoice#45")
                .actions(vec!["Sent".to_owned(), "Chased".to_owned()]),
            &connection,
        )
        .unwrap();

        let csv = String::from_utf8(write_csv(Category::Sales, &[transaction]).unwrap()).unwrap();

        assert_eq!(
            csv,
            "Name,Date,Description,Reference,Amount,VAT,Total,Actions,Done\n\
            Jane,2025-10-05,#1: Widget | Qty: 2 | Price: 10 | Total: 20 | VAT: 3,Invoice#45,\
            20.00,3.00,23.00,\"Sent, Chased\",false\n"
        );
    }

    #[tokio::test]
    async fn exports_received_with_method_as_attachment() {
        let state = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                Transaction::build(Category::Received, "Jane", date!(2025 - 10 - 05))
                    .amounts(50.0, 0.0, 50.0)
                    .method(PaymentMethod::Bank),
                &connection,
            )
            .unwrap();
        }

        let response = export_transactions(
            State(state),
            Path("received".to_owned()),
            Query(LedgerQuery::default()),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/csv; charset=utf-8");
        assert_eq!(
            get_header(&response, "content-disposition"),
            "attachment; filename=\"received.csv\""
        );
        let text = body_text(response).await;
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(
            lines,
            vec![
                "Name,Date,Description,Reference,Amount,VAT,Total,Actions,Done,Method",
                "Jane,2025-10-05,,,50.00,0.00,50.00,,false,Bank",
            ]
        );
    }

    #[tokio::test]
    async fn export_follows_list_query() {
        let state = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            for (name, done) in [("Open bill", false), ("Paid bill", true)] {
                create_transaction(
                    Transaction::build(Category::Expenses, name, date!(2025 - 10 - 05))
                        .amounts(5.0, 0.0, 5.0)
                        .done(done),
                    &connection,
                )
                .unwrap();
            }
        }

        let response = export_transactions(
            State(state),
            Path("expenses".to_owned()),
            Query(LedgerQuery::default()),
        )
        .await
        .unwrap();

        let text = body_text(response).await;
        assert!(text.contains("Open bill"));
        assert!(!text.contains("Paid bill"));
    }

    #[tokio::test]
    async fn unknown_category_is_an_error() {
        let result = export_transactions(
            State(get_test_state()),
            Path("refunds".to_owned()),
            Query(LedgerQuery::default()),
        )
        .await;

        assert_eq!(
            result.map(|_| ()),
            Err(Error::InvalidCategory("refunds".to_owned()))
        );
    }
}
