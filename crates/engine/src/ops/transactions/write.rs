use sea_orm::{ActiveModelTrait, EntityTrait, TransactionTrait};
use uuid::Uuid;

use crate::{
    NewTransactionCmd, ResultEngine, Transaction, TransactionItem,
    clock::stamp,
    settlement::{self, Inconsistency},
    transaction_items, transactions,
    util::normalize_optional_text,
};

use super::super::{Engine, with_tx};

impl Engine {
    /// Records a sale: the header and all of its items in one database
    /// transaction.
    ///
    /// Input is validated before anything is written. `change_amount` and
    /// each item's `total_price` are computed here; the header breakdown is
    /// stored as submitted. `transaction_date` and `created_at` come from the
    /// engine clock.
    ///
    /// Unknown cashier or menu item ids are rejected by the store's foreign
    /// keys and surface as [`EngineError::Database`](crate::EngineError::Database).
    pub async fn create_transaction(&self, cmd: NewTransactionCmd) -> ResultEngine<Transaction> {
        let settled = settlement::settle(&cmd)?;
        let id = Uuid::now_v7();

        for issue in settled.inconsistencies() {
            match issue {
                Inconsistency::SubtotalMismatch { declared, computed } => tracing::warn!(
                    transaction_id = %id,
                    %declared,
                    %computed,
                    "subtotal does not match the sum of item totals"
                ),
                Inconsistency::TotalMismatch { declared, expected } => tracing::warn!(
                    transaction_id = %id,
                    %declared,
                    %expected,
                    "total does not match subtotal + tax - discount"
                ),
                Inconsistency::Underpaid { shortfall } => tracing::warn!(
                    transaction_id = %id,
                    %shortfall,
                    "payment received is below the total"
                ),
            }
        }

        let NewTransactionCmd {
            customer_name,
            customer_phone,
            items,
            payment_method,
            notes,
            cashier_id,
            ..
        } = cmd;

        with_tx!(self, |db_tx| {
            let now = stamp(self.clock.as_ref());
            let header = Transaction {
                id,
                transaction_date: now,
                customer_name: normalize_optional_text(customer_name.as_deref()),
                customer_phone: normalize_optional_text(customer_phone.as_deref()),
                subtotal: settled.pass_through.subtotal,
                tax_amount: settled.pass_through.tax_amount,
                discount_amount: settled.pass_through.discount_amount,
                total_amount: settled.pass_through.total_amount,
                payment_method,
                payment_received: settled.payment_received,
                change_amount: settled.change_amount,
                notes: normalize_optional_text(notes.as_deref()),
                cashier_id,
                created_at: now,
            };
            transactions::ActiveModel::from(&header)
                .insert(&db_tx)
                .await?;

            let rows: Vec<transaction_items::ActiveModel> = items
                .into_iter()
                .zip(settled.line_totals.iter().copied())
                .map(|(line, total_price)| {
                    let item = TransactionItem {
                        id: Uuid::now_v7(),
                        transaction_id: id,
                        menu_item_id: line.menu_item_id,
                        menu_item_name: None,
                        quantity: line.quantity,
                        unit_price: line.unit_price,
                        total_price,
                        notes: normalize_optional_text(line.notes.as_deref()),
                    };
                    transaction_items::ActiveModel::from(&item)
                })
                .collect();
            let item_count = rows.len();
            transaction_items::Entity::insert_many(rows)
                .exec_without_returning(&db_tx)
                .await?;

            tracing::info!(
                transaction_id = %id,
                cashier_id = %cashier_id,
                items = item_count,
                total = %header.total_amount,
                "transaction recorded"
            );
            Ok(header)
        })
    }
}
