//! Markup for the ledger page: the add/edit form, the sale line items table
//! and the transactions table.

use maud::{Markup, html};
use time::Date;

use crate::{
    category::{Category, PaidStatus, PaymentMethod},
    endpoints,
    html::{
        BADGE_STYLE, BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE,
        FORM_CHECKBOX_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_SELECTED_STYLE, TABLE_ROW_STYLE,
        format_amount, loading_spinner, required_label, truncate,
    },
    reference::{ReferenceKind, ReferenceTags},
    sale::{LineItem, SaleTotals, parse_line_items},
    transaction::{LedgerQuery, LedgerTotals, SortColumn, SortOrder, Transaction, TransactionId},
};

/// The number of characters of a description shown in the table.
const DESCRIPTION_PREVIEW_LENGTH: usize = 80;

// ============================================================================
// FORM
// ============================================================================

/// The values the add or edit form starts with.
#[derive(Debug, Clone, PartialEq)]
pub struct FormValues {
    pub name: String,
    pub date: Date,
    pub description: String,
    pub reference: String,
    pub amount: Option<f64>,
    pub vat: Option<f64>,
    pub total: Option<f64>,
    pub method: PaymentMethod,
    pub actions: Vec<String>,
    pub done: bool,
    pub items: Vec<LineItem>,
    pub vat_applies: bool,
    pub references: ReferenceTags,
    pub paid_status: PaidStatus,
}

impl FormValues {
    /// The values of an empty add form.
    pub fn new(today: Date) -> Self {
        Self {
            name: String::new(),
            date: today,
            description: String::new(),
            reference: String::new(),
            amount: None,
            vat: None,
            total: None,
            method: PaymentMethod::Cash,
            actions: Vec::new(),
            done: false,
            items: vec![LineItem::blank()],
            vat_applies: true,
            references: ReferenceTags::default(),
            paid_status: PaidStatus::None,
        }
    }

    /// The values of the edit form for `transaction`.
    ///
    /// A sale stored with a free text description is split into line items
    /// so that it can be edited in the items table.
    pub fn from_transaction(transaction: &Transaction) -> Self {
        let items = if transaction.items.is_empty() {
            parse_line_items(&transaction.description)
        } else {
            transaction.items.clone()
        };

        Self {
            name: transaction.name.clone(),
            date: transaction.date,
            description: transaction.description.clone(),
            reference: transaction.reference.clone(),
            amount: Some(transaction.amount),
            vat: Some(transaction.vat),
            total: Some(transaction.total),
            method: transaction.method.unwrap_or_default(),
            actions: transaction.actions.clone(),
            done: transaction.done,
            items,
            vat_applies: transaction.charges_vat(),
            references: ReferenceTags::parse(&transaction.reference),
            paid_status: transaction.paid_status.unwrap_or_default(),
        }
    }
}

/// Whether the form adds a new transaction or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormMode {
    Create,
    Edit(TransactionId),
}

/// The add or edit form for `category`.
///
/// `query` is the list query of the page, carried through so that the page
/// looks the same after the form is submitted.
pub fn transaction_form(
    category: Category,
    mode: FormMode,
    values: &FormValues,
    query: &LedgerQuery,
) -> Markup {
    let list_query = query.without_edit();
    let (heading, submit_label) = match mode {
        FormMode::Create => (format!("Add {} Transaction", category.label()), "Add Transaction"),
        FormMode::Edit(_) => (format!("Edit {} Transaction", category.label()), "Save Changes"),
    };
    let create_url =
        matches!(mode, FormMode::Create).then(|| list_query.url_for(&endpoints::ledger_view(category)));
    let edit_url = match mode {
        FormMode::Edit(id) => Some(list_query.url_for(&endpoints::ledger_transaction(category, id))),
        FormMode::Create => None,
    };

    html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            h2 class="mb-4 text-xl font-bold" { (heading) }

            form
                hx-post=[create_url]
                hx-put=[edit_url]
                hx-target-error="#alert-container"
                hx-disabled-elt="find button[type='submit']"
                class="space-y-4"
            {
                (name_and_date_fields(category, values))

                @match category {
                    Category::Sales => (sale_fields(values)),
                    Category::Received => (received_fields(values)),
                    Category::Purchases | Category::Expenses => (purchase_fields(category, values)),
                }

                (status_fields(values))

                div class="flex gap-4"
                {
                    button type="submit" id="indicator" class=(BUTTON_PRIMARY_STYLE)
                    {
                        span class="htmx-indicator" { (loading_spinner()) }
                        (submit_label)
                    }

                    @if matches!(mode, FormMode::Edit(_)) {
                        a
                            href=(list_query.url_for(&endpoints::ledger_view(category)))
                            class=(BUTTON_SECONDARY_STYLE)
                        {
                            "Cancel"
                        }
                    }
                }
            }
        }
    }
}

fn name_and_date_fields(category: Category, values: &FormValues) -> Markup {
    html! {
        div
        {
            (required_label("name", &format!("{} Name", category.entity())))

            input
                name="name"
                id="name"
                type="text"
                value=(values.name)
                required
                autofocus
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            (required_label("date", "Date"))

            input
                name="date"
                id="date"
                type="date"
                value=(values.date)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}

fn sale_fields(values: &FormValues) -> Markup {
    html! {
        (sale_items_table(&values.items, values.vat_applies))

        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { "Reference Numbers" }

            @for kind in ReferenceKind::ALL {
                @let field = kind.field_name();
                @let number = values.references.get(kind);

                div class="flex items-center gap-3"
                {
                    input
                        name=(format!("{field}_enabled"))
                        id=(format!("{field}_enabled"))
                        type="checkbox"
                        value="true"
                        checked[number.is_some()]
                        class=(FORM_CHECKBOX_STYLE);

                    label for=(format!("{field}_enabled")) class="w-40 text-sm" { (kind.label()) }

                    input
                        name=(format!("{field}_number"))
                        id=(format!("{field}_number"))
                        type="text"
                        inputmode="numeric"
                        value=(number.unwrap_or_default())
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }
        }

        div
        {
            label for="paid_status" class=(FORM_LABEL_STYLE) { "Paid Status" }

            select name="paid_status" id="paid_status" class=(FORM_TEXT_INPUT_STYLE)
            {
                @for status in PaidStatus::ALL {
                    option value=(status.as_str()) selected[status == values.paid_status]
                    {
                        (status.label())
                    }
                }
            }
        }
    }
}

fn received_fields(values: &FormValues) -> Markup {
    html! {
        div
        {
            (required_label("amount", "Amount"))

            input
                name="amount"
                id="amount"
                type="number"
                step="0.01"
                value=[values.amount.map(format_amount)]
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="notes" class=(FORM_LABEL_STYLE) { "Notes" }

            textarea name="notes" id="notes" rows="2" class=(FORM_TEXT_INPUT_STYLE)
            {
                (values.description)
            }
        }

        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { "Payment Method" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                @for method in [PaymentMethod::Cash, PaymentMethod::Bank] {
                    @let id = format!("method-{}", method.as_str());

                    div class="flex items-center gap-3"
                    {
                        input
                            name="method"
                            id=(id)
                            type="radio"
                            value=(method.as_str())
                            checked[method == values.method]
                            class=(FORM_RADIO_INPUT_STYLE);

                        label for=(id) class=(FORM_RADIO_LABEL_STYLE) { (method.label()) }
                    }
                }
            }
        }
    }
}

fn purchase_fields(category: Category, values: &FormValues) -> Markup {
    let has_vat = category.has_vat();
    let total_label = if has_vat { "Total (with VAT)" } else { "Total" };

    html! {
        div
        {
            label for="description" class=(FORM_LABEL_STYLE) { "Description" }

            input
                name="description"
                id="description"
                type="text"
                value=(values.description)
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="reference" class=(FORM_LABEL_STYLE) { "Reference #" }

            input
                name="reference"
                id="reference"
                type="text"
                value=(values.reference)
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            (required_label("amount", "Amount"))

            input
                name="amount"
                id="amount"
                type="number"
                step="0.01"
                value=[values.amount.map(format_amount)]
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        @if has_vat {
            div
            {
                (required_label("vat", "VAT"))

                input
                    name="vat"
                    id="vat"
                    type="number"
                    step="0.01"
                    value=[values.vat.map(format_amount)]
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label for="total" class=(FORM_LABEL_STYLE) { (total_label) }

            input
                name="total"
                id="total"
                type="number"
                step="0.01"
                placeholder="Auto-calculated if empty"
                value=[values.total.map(format_amount)]
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}

fn status_fields(values: &FormValues) -> Markup {
    html! {
        div
        {
            label for="actions" class=(FORM_LABEL_STYLE) { "Actions (one per line)" }

            textarea name="actions" id="actions" rows="3" class=(FORM_TEXT_INPUT_STYLE)
            {
                (values.actions.join("\n"))
            }
        }

        div class="flex items-center gap-3"
        {
            input
                name="done"
                id="done"
                type="checkbox"
                value="true"
                checked[values.done]
                class=(FORM_CHECKBOX_STYLE);

            label for="done" class="text-sm" { "Mark as done" }
        }
    }
}

/// The editable line items of a sale with the VAT checkbox and the totals.
///
/// Changing any field posts the form to the sale items endpoint, which
/// answers with this table redrawn.
pub fn sale_items_table(items: &[LineItem], vat_applies: bool) -> Markup {
    let totals = SaleTotals::from_items(items);
    let can_remove = items.len() > 1;

    html! {
        div
            id="sale-items"
            hx-post=(endpoints::SALE_ITEMS)
            hx-trigger="change"
            hx-target="this"
            hx-swap="outerHTML"
            hx-include="closest form"
            class="space-y-2"
        {
            span class=(FORM_LABEL_STYLE) { "Items" }

            table class="w-full text-sm text-left"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th class="px-2 py-2" { "Description" }
                        th class="px-2 py-2 w-20" { "Qty" }
                        th class="px-2 py-2 w-28" { "Price" }
                        th class="px-2 py-2 text-right" { "Total" }
                        th class="px-2 py-2 text-right" { "VAT" }
                        th class="px-2 py-2" { span class="sr-only" { "Remove" } }
                    }
                }

                tbody
                {
                    @for (index, item) in items.iter().enumerate() {
                        tr
                        {
                            td class="px-2 py-1"
                            {
                                input
                                    name="item_description"
                                    type="text"
                                    aria-label="Item description"
                                    value=(item.description)
                                    class=(FORM_TEXT_INPUT_STYLE);
                            }

                            td class="px-2 py-1"
                            {
                                input
                                    name="item_quantity"
                                    type="number"
                                    min="1"
                                    step="1"
                                    aria-label="Quantity"
                                    value=(item.quantity)
                                    class=(FORM_TEXT_INPUT_STYLE);
                            }

                            td class="px-2 py-1"
                            {
                                input
                                    name="item_price"
                                    type="number"
                                    min="0"
                                    step="0.01"
                                    aria-label="Price"
                                    value=(item.price)
                                    class=(FORM_TEXT_INPUT_STYLE);
                            }

                            td class="px-2 py-1 text-right" { (format_amount(item.total)) }
                            td class="px-2 py-1 text-right" { (format_amount(item.vat)) }

                            td class="px-2 py-1"
                            {
                                button
                                    type="button"
                                    hx-post=(endpoints::SALE_ITEMS)
                                    hx-vals=(format!(r#"{{"op": "remove", "index": "{index}"}}"#))
                                    disabled[!can_remove]
                                    class=(BUTTON_DELETE_STYLE)
                                {
                                    "Remove"
                                }
                            }
                        }
                    }
                }
            }

            div class="flex items-center justify-between gap-4"
            {
                button
                    type="button"
                    hx-post=(endpoints::SALE_ITEMS)
                    hx-vals=r#"{"op": "add"}"#
                    class=(BUTTON_SECONDARY_STYLE)
                {
                    "Add Item"
                }

                div class="flex items-center gap-3"
                {
                    input
                        name="vat_applies"
                        id="vat_applies"
                        type="checkbox"
                        value="true"
                        checked[vat_applies]
                        class=(FORM_CHECKBOX_STYLE);

                    label for="vat_applies" class="text-sm" { "VAT 15%" }
                }
            }

            dl class="grid grid-cols-3 gap-2 text-sm"
            {
                div { dt class="text-gray-500" { "Amount" } dd id="sale-amount" { (format_amount(totals.amount)) } }
                div { dt class="text-gray-500" { "VAT" } dd id="sale-vat" { (format_amount(totals.vat)) } }
                div { dt class="text-gray-500" { "Total" } dd id="sale-total" class="font-semibold" { (format_amount(totals.total)) } }
            }
        }
    }
}

// ============================================================================
// LIST
// ============================================================================

/// The filter controls, the transactions table and its totals row.
pub fn transactions_list(
    category: Category,
    transactions: &[Transaction],
    totals: &LedgerTotals,
    query: &LedgerQuery,
) -> Markup {
    let columns = Columns::for_category(category);
    let list_query = query.without_edit();
    let view_url = endpoints::ledger_view(category);

    html! {
        section class="w-full space-y-4 overflow-x-auto"
        {
            div class="flex flex-wrap items-end justify-between gap-4"
            {
                h2 class="text-xl font-bold" { (category.label()) }

                form method="get" action=(view_url) class="flex flex-wrap items-end gap-3"
                {
                    @if query.sort != SortColumn::default() {
                        input type="hidden" name="sort" value=(query.sort.as_str());
                    }
                    @if query.order != SortOrder::default() {
                        input type="hidden" name="order" value="desc";
                    }

                    input
                        name="search"
                        type="search"
                        placeholder="Search"
                        aria-label="Search"
                        value=(query.search.as_deref().unwrap_or_default())
                        class=(FORM_TEXT_INPUT_STYLE);

                    div class="flex items-center gap-2"
                    {
                        input
                            name="show_done"
                            id="show_done"
                            type="checkbox"
                            value="true"
                            checked[query.show_done]
                            onchange="this.form.submit()"
                            class=(FORM_CHECKBOX_STYLE);

                        label for="show_done" class="text-sm whitespace-nowrap"
                        {
                            "Show Done Transactions"
                        }
                    }

                    button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Apply" }

                    a href=(list_query.url_for(&endpoints::export(category))) class=(LINK_STYLE)
                    {
                        "Export CSV"
                    }
                }
            }

            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        (sort_header("Name", SortColumn::Name, category, &list_query))
                        (sort_header("Date", SortColumn::Date, category, &list_query))
                        @if columns.description {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Reference" }
                        }
                        @if columns.method {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Method" }
                        }
                        (sort_header("Amount", SortColumn::Amount, category, &list_query))
                        @if columns.vat {
                            th scope="col" class=(TABLE_CELL_STYLE) { "VAT" }
                        }
                        (sort_header("Total", SortColumn::Total, category, &list_query))
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Done" }
                        th scope="col" class=(TABLE_CELL_STYLE) { span class="sr-only" { "Controls" } }
                    }
                }

                tbody
                {
                    @for transaction in transactions {
                        (transaction_row(transaction, &columns, query))
                    }

                    @if transactions.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td colspan=(columns.count()) class="px-4 py-6 text-center"
                            {
                                "No transactions to show."
                            }
                        }
                    }
                }

                tfoot
                {
                    tr class="font-semibold text-gray-900 dark:text-white"
                    {
                        td class=(TABLE_CELL_STYLE) colspan=(columns.leading_count())
                        {
                            "Totals (" (totals.count) ")"
                        }
                        td class=(TABLE_CELL_STYLE) data-total="amount" { (format_amount(totals.amount)) }
                        @if columns.vat {
                            td class=(TABLE_CELL_STYLE) data-total="vat" { (format_amount(totals.vat)) }
                        }
                        td class=(TABLE_CELL_STYLE) data-total="total" { (format_amount(totals.total)) }
                        td colspan="3" {}
                    }
                }
            }
        }
    }
}

/// Which optional columns a category's table shows.
struct Columns {
    description: bool,
    method: bool,
    vat: bool,
}

impl Columns {
    fn for_category(category: Category) -> Self {
        Self {
            description: category.has_description(),
            method: matches!(category, Category::Received),
            vat: category.has_vat(),
        }
    }

    /// The columns before the amount column.
    fn leading_count(&self) -> usize {
        2 + if self.description { 2 } else { 0 } + usize::from(self.method)
    }

    fn count(&self) -> usize {
        self.leading_count() + 1 + usize::from(self.vat) + 1 + 3
    }
}

fn sort_header(
    title: &str,
    column: SortColumn,
    category: Category,
    query: &LedgerQuery,
) -> Markup {
    let indicator = match (query.sort == column, query.order) {
        (true, SortOrder::Asc) => " ▲",
        (true, SortOrder::Desc) => " ▼",
        (false, _) => "",
    };
    let url = query
        .sorted_by(column)
        .url_for(&endpoints::ledger_view(category));

    html! {
        th scope="col" class=(TABLE_CELL_STYLE)
        {
            a href=(url) class="hover:underline" { (title) (indicator) }
        }
    }
}

fn transaction_row(transaction: &Transaction, columns: &Columns, query: &LedgerQuery) -> Markup {
    let category = transaction.category;
    let list_query = query.without_edit();
    let is_selected = query.edit == Some(transaction.id);
    let edit_url = LedgerQuery {
        edit: Some(transaction.id),
        ..list_query.clone()
    }
    .url_for(&endpoints::ledger_view(category));
    let delete_url = list_query.url_for(&endpoints::ledger_transaction(category, transaction.id));
    let toggle_url = list_query.url_for(&endpoints::ledger_toggle_done(category, transaction.id));
    let row_style = if is_selected {
        TABLE_ROW_SELECTED_STYLE
    } else {
        TABLE_ROW_STYLE
    };

    html! {
        tr class=(row_style) data-transaction-id=(transaction.id)
        {
            td class=(TABLE_CELL_STYLE)
            {
                span class="font-medium text-gray-900 dark:text-white" { (transaction.name) }

                @if let Some(paid_status) = transaction.paid_status {
                    br;
                    span class=(BADGE_STYLE) { (paid_status.label()) }
                }
            }
            td class=(TABLE_CELL_STYLE) { (transaction.date) }

            @if columns.description {
                td class=(TABLE_CELL_STYLE) { (description_cell(transaction)) }
                td class=(TABLE_CELL_STYLE) { (transaction.reference) }
            }

            @if columns.method {
                td class=(TABLE_CELL_STYLE)
                {
                    (transaction.method.unwrap_or_default().label())

                    @if !transaction.description.is_empty() {
                        br;
                        span class="text-xs" { (transaction.description) }
                    }
                }
            }

            td class=(TABLE_CELL_STYLE) { (format_amount(transaction.amount)) }

            @if columns.vat {
                td class=(TABLE_CELL_STYLE) { (format_amount(transaction.vat)) }
            }

            td class=(TABLE_CELL_STYLE) { (format_amount(transaction.total)) }

            td class=(TABLE_CELL_STYLE)
            {
                ul class="flex flex-wrap gap-1"
                {
                    @for action in &transaction.actions {
                        li class=(BADGE_STYLE) { (action) }
                    }
                }
            }

            td class=(TABLE_CELL_STYLE)
            {
                button
                    type="button"
                    hx-post=(toggle_url)
                    hx-target-error="#alert-container"
                    aria-pressed=(transaction.done)
                    title=(if transaction.done { "Mark as not done" } else { "Mark as done" })
                    class=(LINK_STYLE)
                {
                    @if transaction.done { "Done" } @else { "Open" }
                }
            }

            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    a href=(edit_url) class=(LINK_STYLE) { "Edit" }

                    button
                        type="button"
                        hx-delete=(delete_url)
                        hx-confirm=(format!(
                            "Are you sure you want to delete the transaction for '{}'? This cannot be undone.",
                            transaction.name
                        ))
                        hx-target-error="#alert-container"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Delete"
                    }
                }
            }
        }
    }
}

fn description_cell(transaction: &Transaction) -> Markup {
    if !transaction.items.is_empty() {
        return html! {
            ul class="space-y-1"
            {
                @for item in &transaction.items {
                    li
                    {
                        (item.description) " × " (item.quantity) " @ " (format_amount(item.price))
                    }
                }
            }
        };
    }

    match truncate(&transaction.description, DESCRIPTION_PREVIEW_LENGTH) {
        Some(preview) => html! {
            span title=(transaction.description) { (preview) "…" }
        },
        None => html! { (transaction.description) },
    }
}
