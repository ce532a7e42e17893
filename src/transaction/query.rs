//! Filtering, sorting and totals for the transaction list.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{
    sale::round_cents,
    transaction::{Transaction, TransactionId},
};

/// The column the transaction list is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortColumn {
    /// The order the transactions were entered in.
    #[default]
    Entry,
    Date,
    Name,
    Amount,
    Total,
}

impl SortColumn {
    pub fn as_str(self) -> &'static str {
        match self {
            SortColumn::Entry => "entry",
            SortColumn::Date => "date",
            SortColumn::Name => "name",
            SortColumn::Amount => "amount",
            SortColumn::Total => "total",
        }
    }
}

/// The direction of a sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn reverse(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// The query string of the ledger page and the CSV export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerQuery {
    /// Include transactions that are marked as done.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub show_done: bool,
    /// Only include transactions that contain this text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub sort: SortColumn,
    #[serde(default, skip_serializing_if = "is_default")]
    pub order: SortOrder,
    /// The transaction to show in the edit form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit: Option<TransactionId>,
}

impl LedgerQuery {
    /// Filter and sort `transactions`, which must be in entry order.
    pub fn apply(&self, transactions: Vec<Transaction>) -> Vec<Transaction> {
        let needle = self
            .search
            .as_deref()
            .map(|search| search.trim().to_lowercase())
            .filter(|search| !search.is_empty());

        let mut visible = transactions
            .into_iter()
            .filter(|transaction| self.show_done || !transaction.done)
            .filter(|transaction| match &needle {
                Some(needle) => matches_search(transaction, needle),
                None => true,
            })
            .collect::<Vec<_>>();

        // `sort_by` is stable so ties keep their entry order in both directions.
        visible.sort_by(|a, b| {
            let ordering = compare(self.sort, a, b);
            match self.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        visible
    }

    /// The query string for this query, without the leading `?`.
    pub fn to_query_string(&self) -> String {
        serde_urlencoded::to_string(self).unwrap_or_default()
    }

    /// `path` with this query appended.
    pub fn url_for(&self, path: &str) -> String {
        let query_string = self.to_query_string();

        if query_string.is_empty() {
            path.to_owned()
        } else {
            format!("{path}?{query_string}")
        }
    }

    /// The same query with the edit form closed.
    pub fn without_edit(&self) -> Self {
        Self {
            edit: None,
            ..self.clone()
        }
    }

    /// The query for clicking on the header of `column`.
    ///
    /// Clicking the current column flips the order, clicking another column
    /// sorts by it in ascending order.
    pub fn sorted_by(&self, column: SortColumn) -> Self {
        let order = if self.sort == column {
            self.order.reverse()
        } else {
            SortOrder::Asc
        };

        Self {
            sort: column,
            order,
            edit: None,
            ..self.clone()
        }
    }
}

fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

fn matches_search(transaction: &Transaction, needle: &str) -> bool {
    let contains = |text: &str| text.to_lowercase().contains(needle);

    contains(&transaction.name)
        || contains(&transaction.display_description())
        || contains(&transaction.reference)
        || transaction.actions.iter().any(|action| contains(action))
}

fn compare(column: SortColumn, a: &Transaction, b: &Transaction) -> Ordering {
    match column {
        SortColumn::Entry => a.id.cmp(&b.id),
        SortColumn::Date => a.date.cmp(&b.date),
        SortColumn::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortColumn::Amount => a.amount.total_cmp(&b.amount),
        SortColumn::Total => a.total.total_cmp(&b.total),
    }
}

/// The sums shown in the last row of the list.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LedgerTotals {
    pub count: usize,
    pub amount: f64,
    pub vat: f64,
    pub total: f64,
}

impl LedgerTotals {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let sum = |field: fn(&Transaction) -> f64| {
            round_cents(transactions.iter().map(field).sum())
        };

        Self {
            count: transactions.len(),
            amount: sum(|transaction| transaction.amount),
            vat: sum(|transaction| transaction.vat),
            total: sum(|transaction| transaction.total),
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        category::Category,
        transaction::{LedgerQuery, LedgerTotals, SortColumn, SortOrder, Transaction},
    };

    fn transaction(id: i64, name: &str, day: u8, total: f64, done: bool) -> Transaction {
        Transaction {
            id,
            category: Category::Purchases,
            name: name.to_owned(),
            date: date!(2025 - 10 - 01).replace_day(day).unwrap(),
            description: format!("{name} stuff"),
            reference: format!("PO-{id}"),
            amount: total,
            vat: 0.0,
            total,
            items: Vec::new(),
            actions: vec![format!("action {id}")],
            done,
            method: None,
            paid_status: None,
        }
    }

    fn fixture() -> Vec<Transaction> {
        vec![
            transaction(1, "charlie", 3, 30.0, false),
            transaction(2, "Alpha", 1, 10.0, true),
            transaction(3, "bravo", 2, 30.0, false),
            transaction(4, "delta", 2, 5.0, false),
        ]
    }

    fn ids(transactions: &[Transaction]) -> Vec<i64> {
        transactions.iter().map(|transaction| transaction.id).collect()
    }

    #[test]
    fn hides_done_by_default() {
        let got = LedgerQuery::default().apply(fixture());

        assert_eq!(ids(&got), vec![1, 3, 4]);
    }

    #[test]
    fn shows_done_when_asked() {
        let query = LedgerQuery {
            show_done: true,
            ..Default::default()
        };

        assert_eq!(ids(&query.apply(fixture())), vec![1, 2, 3, 4]);
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let by_name = LedgerQuery {
            search: Some("CHAR".to_owned()),
            ..Default::default()
        };
        let by_reference = LedgerQuery {
            search: Some("po-4".to_owned()),
            ..Default::default()
        };
        let by_action = LedgerQuery {
            search: Some("Action 3".to_owned()),
            ..Default::default()
        };
        let blank = LedgerQuery {
            search: Some("   ".to_owned()),
            ..Default::default()
        };

        assert_eq!(ids(&by_name.apply(fixture())), vec![1]);
        assert_eq!(ids(&by_reference.apply(fixture())), vec![4]);
        assert_eq!(ids(&by_action.apply(fixture())), vec![3]);
        assert_eq!(ids(&blank.apply(fixture())), vec![1, 3, 4]);
    }

    #[test]
    fn sorts_by_name_ignoring_case() {
        let query = LedgerQuery {
            show_done: true,
            sort: SortColumn::Name,
            ..Default::default()
        };

        assert_eq!(ids(&query.apply(fixture())), vec![2, 3, 1, 4]);
    }

    #[test]
    fn ties_keep_entry_order_in_both_directions() {
        let ascending = LedgerQuery {
            sort: SortColumn::Total,
            ..Default::default()
        };
        let descending = LedgerQuery {
            sort: SortColumn::Total,
            order: SortOrder::Desc,
            ..Default::default()
        };

        assert_eq!(ids(&ascending.apply(fixture())), vec![4, 1, 3]);
        assert_eq!(ids(&descending.apply(fixture())), vec![1, 3, 4]);
    }

    #[test]
    fn sorts_by_date_descending() {
        let query = LedgerQuery {
            sort: SortColumn::Date,
            order: SortOrder::Desc,
            ..Default::default()
        };

        assert_eq!(ids(&query.apply(fixture())), vec![1, 3, 4]);
    }

    #[test]
    fn header_click_flips_current_column_only() {
        let query = LedgerQuery {
            sort: SortColumn::Date,
            order: SortOrder::Asc,
            edit: Some(3),
            ..Default::default()
        };

        let same = query.sorted_by(SortColumn::Date);
        let other = query.sorted_by(SortColumn::Amount);

        assert_eq!((same.sort, same.order, same.edit), (SortColumn::Date, SortOrder::Desc, None));
        assert_eq!((other.sort, other.order), (SortColumn::Amount, SortOrder::Asc));
    }

    #[test]
    fn query_string_round_trips_through_serde() {
        let query = LedgerQuery {
            show_done: true,
            search: Some("a & b".to_owned()),
            sort: SortColumn::Amount,
            order: SortOrder::Desc,
            edit: None,
        };

        let text = query.to_query_string();

        assert_eq!(text, "show_done=true&search=a+%26+b&sort=amount&order=desc");
        assert_eq!(serde_urlencoded::from_str::<LedgerQuery>(&text).unwrap(), query);
    }

    #[test]
    fn default_query_adds_nothing_to_url() {
        assert_eq!(LedgerQuery::default().url_for("/ledger/sales"), "/ledger/sales");

        let query = LedgerQuery {
            edit: Some(4),
            ..Default::default()
        };
        assert_eq!(query.url_for("/ledger/sales"), "/ledger/sales?edit=4");
    }

    #[test]
    fn totals_sum_visible_rows() {
        let visible = LedgerQuery::default().apply(fixture());

        let totals = LedgerTotals::from_transactions(&visible);

        assert_eq!(
            totals,
            LedgerTotals {
                count: 3,
                amount: 65.0,
                vat: 0.0,
                total: 65.0
            }
        );
    }
}
