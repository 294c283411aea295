//! Sales report endpoints

use api_types::report::{DailyReportQuery, DailySalesReport, TopSellingItem};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use engine::{Capability, User};

use crate::{ServerError, server::ServerState};

/// Daily sales summary for `?date=YYYY-MM-DD` in the business time zone.
pub async fn daily(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<DailyReportQuery>,
) -> Result<Json<DailySalesReport>, ServerError> {
    user.require(Capability::ViewReports)?;
    let report = state.engine.daily_sales_report(query.date).await?;

    Ok(Json(DailySalesReport {
        date: report.date,
        total_sales_minor: report.total_sales.minor(),
        total_transactions: report.total_transactions,
        average_transaction_minor: report.average_transaction.minor(),
        top_selling_items: report
            .top_selling_items
            .into_iter()
            .map(|item| TopSellingItem {
                menu_item_id: item.menu_item_id,
                name: item.name,
                quantity_sold: item.quantity_sold,
                revenue_minor: item.revenue.minor(),
            })
            .collect(),
    }))
}
