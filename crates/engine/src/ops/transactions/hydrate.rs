use std::collections::HashMap;

use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, prelude::*};

use crate::{
    ResultEngine, Transaction, TransactionDetail, TransactionItem, menu_items, transaction_items,
    transactions, users,
};

use super::super::Engine;

/// Header ids bound per item query. SQLite caps bound variables per statement.
const HYDRATE_CHUNK: usize = 500;

impl Engine {
    /// Attaches items (with menu item names) and the cashier name to headers
    /// loaded with `find_also_related(users::Entity)`. Header order is kept.
    pub(super) async fn hydrate<C: ConnectionTrait>(
        db: &C,
        rows: Vec<(transactions::Model, Option<users::Model>)>,
    ) -> ResultEngine<Vec<TransactionDetail>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = rows.iter().map(|(tx, _)| tx.id.clone()).collect();
        let mut items_by_tx: HashMap<String, Vec<TransactionItem>> = HashMap::new();
        for chunk in ids.chunks(HYDRATE_CHUNK) {
            let item_rows = transaction_items::Entity::find()
                .filter(transaction_items::Column::TransactionId.is_in(chunk.iter().cloned()))
                .find_also_related(menu_items::Entity)
                .order_by_asc(transaction_items::Column::Id)
                .all(db)
                .await?;

            for (item, menu_item) in item_rows {
                let key = item.transaction_id.clone();
                let item = TransactionItem::from_model(item, menu_item.map(|m| m.name))?;
                items_by_tx.entry(key).or_default().push(item);
            }
        }

        let mut out = Vec::with_capacity(rows.len());
        for (tx, cashier) in rows {
            let items = items_by_tx.remove(&tx.id).unwrap_or_default();
            out.push(TransactionDetail {
                transaction: Transaction::try_from(tx)?,
                items,
                cashier_name: cashier.map(|u| u.full_name),
            });
        }
        Ok(out)
    }
}
