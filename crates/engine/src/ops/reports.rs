use chrono::NaiveDate;
use sea_orm::{
    ConnectionTrait, JoinType, QueryFilter, QueryOrder, QuerySelect, Statement, TransactionTrait,
    prelude::*,
};

use crate::{
    DailySalesReport, Money, ResultEngine, menu_items,
    reports::{SoldLine, top_selling_items},
    transaction_items, transactions,
    util::parse_uuid,
};

use super::{Engine, with_tx};

impl Engine {
    /// Sales summary for one calendar day in the business time zone.
    ///
    /// Header totals and top sellers are two independent reads over the same
    /// inclusive window `[00:00:00.000, 23:59:59.999]`.
    pub async fn daily_sales_report(&self, date: NaiveDate) -> ResultEngine<DailySalesReport> {
        let (start, end) = self.day_window(date)?;

        with_tx!(self, |db_tx| {
            let backend = db_tx.get_database_backend();
            let (total_sales_minor, total_transactions): (i64, i64) = {
                let stmt = Statement::from_sql_and_values(
                    backend,
                    "SELECT COALESCE(SUM(total_amount_minor), 0) AS sum, COUNT(*) AS count \
                     FROM transactions \
                     WHERE transaction_date BETWEEN ? AND ?",
                    vec![start.into(), end.into()],
                );
                let row = db_tx.query_one(stmt).await?;
                match row {
                    Some(row) => (row.try_get("", "sum")?, row.try_get("", "count")?),
                    None => (0, 0),
                }
            };

            let sold = transaction_items::Entity::find()
                .join(
                    JoinType::InnerJoin,
                    transaction_items::Relation::Transactions.def(),
                )
                .filter(transactions::Column::TransactionDate.between(start, end))
                .order_by_asc(transactions::Column::TransactionDate)
                .order_by_asc(transaction_items::Column::Id)
                .find_also_related(menu_items::Entity)
                .all(&db_tx)
                .await?;
            let lines = sold
                .into_iter()
                .map(|(item, menu_item)| {
                    Ok(SoldLine {
                        menu_item_id: parse_uuid(&item.menu_item_id, "menu item")?,
                        name: menu_item.map(|m| m.name).unwrap_or_default(),
                        quantity: item.quantity,
                        total_price: Money::new(item.total_price_minor),
                    })
                })
                .collect::<ResultEngine<Vec<_>>>()?;

            Ok(DailySalesReport::new(
                date,
                Money::new(total_sales_minor),
                u64::try_from(total_transactions).unwrap_or(0),
                top_selling_items(lines),
            ))
        })
    }
}
