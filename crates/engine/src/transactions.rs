//! Sale transactions.
//!
//! A `Transaction` is an immutable ledger entry: it is written exactly once,
//! together with its [`TransactionItem`]s, and never updated or deleted.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, TransactionItem, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    DigitalWallet,
    BankTransfer,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::Card => "CARD",
            Self::DigitalWallet => "DIGITAL_WALLET",
            Self::BankTransfer => "BANK_TRANSFER",
        }
    }
}

impl TryFrom<&str> for PaymentMethod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "CASH" => Ok(Self::Cash),
            "CARD" => Ok(Self::Card),
            "DIGITAL_WALLET" => Ok(Self::DigitalWallet),
            "BANK_TRANSFER" => Ok(Self::BankTransfer),
            other => Err(EngineError::Validation(format!(
                "invalid payment method: {other}"
            ))),
        }
    }
}

/// Persisted transaction header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub transaction_date: DateTime<Utc>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub subtotal: Money,
    pub tax_amount: Money,
    pub discount_amount: Money,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    pub payment_received: Money,
    pub change_amount: Money,
    pub notes: Option<String>,
    pub cashier_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A transaction hydrated with its items and the cashier's display name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDetail {
    pub transaction: Transaction,
    pub items: Vec<TransactionItem>,
    /// `None` only if the cashier row could not be joined.
    pub cashier_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub transaction_date: DateTimeUtc,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub subtotal_minor: i64,
    pub tax_amount_minor: i64,
    pub discount_amount_minor: i64,
    pub total_amount_minor: i64,
    pub payment_method: String,
    pub payment_received_minor: i64,
    pub change_amount_minor: i64,
    pub notes: Option<String>,
    pub cashier_id: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transaction_items::Entity")]
    TransactionItems,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CashierId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Cashier,
}

impl Related<super::transaction_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionItems.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cashier.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            transaction_date: ActiveValue::Set(tx.transaction_date),
            customer_name: ActiveValue::Set(tx.customer_name.clone()),
            customer_phone: ActiveValue::Set(tx.customer_phone.clone()),
            subtotal_minor: ActiveValue::Set(tx.subtotal.minor()),
            tax_amount_minor: ActiveValue::Set(tx.tax_amount.minor()),
            discount_amount_minor: ActiveValue::Set(tx.discount_amount.minor()),
            total_amount_minor: ActiveValue::Set(tx.total_amount.minor()),
            payment_method: ActiveValue::Set(tx.payment_method.as_str().to_string()),
            payment_received_minor: ActiveValue::Set(tx.payment_received.minor()),
            change_amount_minor: ActiveValue::Set(tx.change_amount.minor()),
            notes: ActiveValue::Set(tx.notes.clone()),
            cashier_id: ActiveValue::Set(tx.cashier_id.to_string()),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            transaction_date: model.transaction_date,
            customer_name: model.customer_name,
            customer_phone: model.customer_phone,
            subtotal: Money::new(model.subtotal_minor),
            tax_amount: Money::new(model.tax_amount_minor),
            discount_amount: Money::new(model.discount_amount_minor),
            total_amount: Money::new(model.total_amount_minor),
            payment_method: PaymentMethod::try_from(model.payment_method.as_str())?,
            payment_received: Money::new(model.payment_received_minor),
            change_amount: Money::new(model.change_amount_minor),
            notes: model.notes,
            cashier_id: parse_uuid(&model.cashier_id, "cashier")?,
            created_at: model.created_at,
        })
    }
}
