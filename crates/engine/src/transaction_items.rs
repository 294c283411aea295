//! Transaction line items.
//!
//! A [`TransactionItem`] is one cart line captured at sale time. `unit_price`
//! is a snapshot (later menu price changes do not touch it) and `total_price`
//! is always `quantity × unit_price`, computed by the engine.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionItem {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub menu_item_id: Uuid,
    /// Display name joined from the menu at read time.
    pub menu_item_name: Option<String>,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_price: Money,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transaction_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub transaction_id: String,
    pub menu_item_id: String,
    pub quantity: i64,
    pub unit_price_minor: i64,
    pub total_price_minor: i64,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::TransactionId",
        to = "super::transactions::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Transactions,
    #[sea_orm(
        belongs_to = "super::menu_items::Entity",
        from = "Column::MenuItemId",
        to = "super::menu_items::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    MenuItems,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::menu_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MenuItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&TransactionItem> for ActiveModel {
    fn from(item: &TransactionItem) -> Self {
        Self {
            id: ActiveValue::Set(item.id.to_string()),
            transaction_id: ActiveValue::Set(item.transaction_id.to_string()),
            menu_item_id: ActiveValue::Set(item.menu_item_id.to_string()),
            quantity: ActiveValue::Set(item.quantity),
            unit_price_minor: ActiveValue::Set(item.unit_price.minor()),
            total_price_minor: ActiveValue::Set(item.total_price.minor()),
            notes: ActiveValue::Set(item.notes.clone()),
        }
    }
}

impl TransactionItem {
    pub(crate) fn from_model(model: Model, menu_item_name: Option<String>) -> Result<Self, EngineError> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction item")?,
            transaction_id: parse_uuid(&model.transaction_id, "transaction")?,
            menu_item_id: parse_uuid(&model.menu_item_id, "menu item")?,
            menu_item_name,
            quantity: model.quantity,
            unit_price: Money::new(model.unit_price_minor),
            total_price: Money::new(model.total_price_minor),
            notes: model.notes,
        })
    }
}
