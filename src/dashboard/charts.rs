//! The cumulative balance chart shown on the dashboard.
//!
//! The chart is generated as JSON configuration for the ECharts library and
//! initialized by a small script in the page head.

use charming::{
    Chart,
    component::{Axis, Grid, Title},
    element::{AreaStyle, AxisLabel, AxisType, JsFunction, Tooltip, Trigger},
    series::Line,
};
use maud::PreEscaped;

use crate::{
    dashboard::aggregation::calculate_running_balances, html::HeadElement,
    transaction::Transaction,
};

/// The HTML element ID of the chart container.
pub(super) const BALANCE_CHART_ID: &str = "balance-chart";

/// The URL of the ECharts library.
pub(super) const ECHARTS_URL: &str =
    "https://cdn.jsdelivr.net/npm/echarts@5.6.0/dist/echarts.min.js";

/// A line chart of the balance after each transaction, oldest first.
pub(super) fn balance_chart(transactions: &[Transaction]) -> Chart {
    let (labels, values) = calculate_running_balances(transactions);

    Chart::new()
        .title(Title::new().text("Total Over Time"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .value_formatter(currency_formatter()),
        )
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(
            Line::new()
                .name("Total Over Time")
                .area_style(AreaStyle::new().color("#6666ff"))
                .data(values),
        )
}

/// Generates the JavaScript that initializes the chart once the page has loaded.
pub(super) fn chart_script(chart: &Chart) -> HeadElement {
    let script = format!(
        r#"document.addEventListener('DOMContentLoaded', function() {{
            const chart = echarts.init(document.getElementById("{BALANCE_CHART_ID}"));
            chart.setOption({chart});
            window.addEventListener('resize', chart.resize);
        }});"#
    );

    HeadElement::ScriptSource(PreEscaped(script))
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}
