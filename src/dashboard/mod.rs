//! The dashboard page: the running total, the entry form, the transaction
//! history and a chart of the balance over time.

mod aggregation;
mod charts;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error, endpoints,
    html::{
        BUTTON_DANGER_STYLE, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        HeadElement, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, format_currency,
    },
    transaction::{Transaction, TransactionForm, TransactionState, get_transactions},
};

pub(crate) use aggregation::calculate_total;
use charts::{BALANCE_CHART_ID, ECHARTS_URL, balance_chart, chart_script};

/// Display the dashboard with every transaction.
pub async fn get_dashboard_page(State(state): State<TransactionState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions(&connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;

    Ok(dashboard_view(&transactions, &TransactionForm::default(), None).into_response())
}

/// Render the dashboard.
///
/// `transactions` must be ordered newest first. `form` holds the text to show
/// in the inputs and `error_message` is shown under the form.
pub(crate) fn dashboard_view(
    transactions: &[Transaction],
    form: &TransactionForm,
    error_message: Option<&str>,
) -> Markup {
    let total = calculate_total(transactions);
    let chart = balance_chart(transactions);

    let content = html!(
        div class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-2xl mb-6 text-center"
            {
                h1 class="text-2xl font-bold" { "Budget Tracker" }

                p class="text-xl mt-2"
                {
                    "Your total is: "
                    span #total { (format_currency(total)) }
                }
            }

            (transaction_form_view(form, error_message))

            section class="w-full max-w-2xl mb-6"
            {
                div
                    id=(BALANCE_CHART_ID)
                    class="min-h-[380px] rounded dark:bg-gray-100"
                {}
            }

            (transactions_table_view(transactions))
        }
    );

    base(
        "Dashboard",
        &[
            HeadElement::ScriptLink(ECHARTS_URL.to_owned()),
            chart_script(&chart),
        ],
        &content,
    )
}

fn transaction_form_view(form: &TransactionForm, error_message: Option<&str>) -> Markup {
    html!(
        form
            method="post"
            action=(endpoints::TRANSACTIONS_FORM)
            class="w-full max-w-2xl mb-6 space-y-4"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Name of transaction" }
                input
                    type="text"
                    name="name"
                    id="name"
                    placeholder="Name of transaction"
                    value=(form.name)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Transaction amount" }
                input
                    type="number"
                    name="amount"
                    id="amount"
                    step="0.01"
                    min="0"
                    placeholder="Transaction amount"
                    value=(form.amount)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="flex gap-4"
            {
                button
                    type="submit"
                    name="direction"
                    value="add"
                    class=(BUTTON_PRIMARY_STYLE)
                {
                    "+ Add Funds"
                }

                button
                    type="submit"
                    name="direction"
                    value="subtract"
                    class=(BUTTON_DANGER_STYLE)
                {
                    "- Subtract Funds"
                }
            }

            @if let Some(message) = error_message
            {
                p class="error text-red-500 text-base" { (message) }
            }
        }
    )
}

fn transactions_table_view(transactions: &[Transaction]) -> Markup {
    html!(
        section class="w-full max-w-2xl relative overflow-x-auto shadow-md rounded"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Transaction" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                    }
                }

                tbody #tbody
                {
                    @for transaction in transactions
                    {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (transaction.name) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(transaction.value)) }
                        }
                    }

                    @if transactions.is_empty()
                    {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td colspan="2" class=(TABLE_CELL_STYLE)
                            {
                                "No transactions yet. Add one using the form above."
                            }
                        }
                    }
                }
            }
        }
    )
}
