//! Accounts: users, their roles and the capabilities each role grants.
//!
//! The engine stores users by a generated id; `username` is unique.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, RecordStatus, ResultEngine, util::parse_uuid};

/// What a request is allowed to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ManageCatalog,
    ManageUsers,
    ViewReports,
    Checkout,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::ManageCatalog,
        Capability::ManageUsers,
        Capability::ViewReports,
        Capability::Checkout,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ManageCatalog => "manage_catalog",
            Self::ManageUsers => "manage_users",
            Self::ViewReports => "view_reports",
            Self::Checkout => "checkout",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Kasir,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Kasir => "KASIR",
        }
    }

    /// Capabilities granted to the role. `KASIR` only checks out.
    pub fn capabilities(self) -> &'static [Capability] {
        match self {
            Self::Admin => &Capability::ALL,
            Self::Kasir => &[Capability::Checkout],
        }
    }

    pub fn grants(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "KASIR" => Ok(Self::Kasir),
            other => Err(EngineError::Validation(format!("invalid role: {other}"))),
        }
    }
}

/// A user account, without its credential.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub full_name: String,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn can(&self, capability: Capability) -> bool {
        self.status.is_active() && self.role.grants(capability)
    }

    /// Returns `Forbidden` unless the user holds `capability`.
    pub fn require(&self, capability: Capability) -> ResultEngine<()> {
        if self.can(capability) {
            Ok(())
        } else {
            Err(EngineError::Forbidden(format!(
                "{} lacks {}",
                self.username,
                capability.as_str()
            )))
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub username: String,
    pub password: String,
    pub role: String,
    pub full_name: String,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for User {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "user")?,
            username: model.username,
            role: Role::try_from(model.role.as_str())?,
            full_name: model.full_name,
            status: RecordStatus::try_from(model.status.as_str())?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
