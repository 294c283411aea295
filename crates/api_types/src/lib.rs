//! JSON request and response bodies of the kasir HTTP API.
//!
//! Money is always carried as integer minor units in `*_minor` fields
//! (`1550` is 15.50).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    Active,
    Inactive,
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Login {
        pub username: String,
        pub password: String,
    }

    /// The authenticated account and what it may do.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginResponse {
        pub user: super::user::UserView,
        /// Capability names, e.g. `checkout`, `view_reports`.
        pub capabilities: Vec<String>,
    }
}

pub mod user {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum Role {
        Admin,
        Kasir,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub username: String,
        pub password: String,
        pub role: Role,
        pub full_name: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct UserUpdate {
        pub full_name: Option<String>,
        pub role: Option<Role>,
        pub password: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub username: String,
        pub role: Role,
        pub full_name: String,
        pub status: RecordStatus,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct UserListQuery {
        pub include_inactive: Option<bool>,
    }
}

pub mod catalog {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        pub description: Option<String>,
    }

    /// Absent fields are left untouched; an empty description clears it.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub name: Option<String>,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub status: RecordStatus,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryListQuery {
        pub include_inactive: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MenuItemNew {
        pub name: String,
        pub description: Option<String>,
        /// Must be > 0.
        pub price_minor: i64,
        pub category_id: Uuid,
        pub image_ref: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct MenuItemUpdate {
        pub name: Option<String>,
        pub description: Option<String>,
        pub price_minor: Option<i64>,
        pub category_id: Option<Uuid>,
        pub image_ref: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MenuItemView {
        pub id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub price_minor: i64,
        pub category_id: Uuid,
        pub status: RecordStatus,
        pub image_ref: Option<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct MenuItemListQuery {
        pub category_id: Option<Uuid>,
        pub include_inactive: Option<bool>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum PaymentMethod {
        Cash,
        Card,
        DigitalWallet,
        BankTransfer,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionItemNew {
        pub menu_item_id: Uuid,
        pub quantity: i64,
        pub unit_price_minor: i64,
        pub notes: Option<String>,
    }

    /// Checkout request.
    ///
    /// `subtotal_minor`, `tax_amount_minor`, `discount_amount_minor` and
    /// `total_amount_minor` are stored as sent. The change and each line
    /// total are computed by the server.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub customer_name: Option<String>,
        pub customer_phone: Option<String>,
        pub items: Vec<TransactionItemNew>,
        pub subtotal_minor: i64,
        pub tax_amount_minor: i64,
        pub discount_amount_minor: i64,
        pub total_amount_minor: i64,
        pub payment_method: PaymentMethod,
        pub payment_received_minor: i64,
        pub notes: Option<String>,
        pub cashier_id: Uuid,
    }

    /// Transaction header.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        /// Server-assigned, UTC.
        pub transaction_date: DateTime<Utc>,
        pub customer_name: Option<String>,
        pub customer_phone: Option<String>,
        pub subtotal_minor: i64,
        pub tax_amount_minor: i64,
        pub discount_amount_minor: i64,
        pub total_amount_minor: i64,
        pub payment_method: PaymentMethod,
        pub payment_received_minor: i64,
        /// `payment_received_minor - total_amount_minor`, may be negative.
        pub change_amount_minor: i64,
        pub notes: Option<String>,
        pub cashier_id: Uuid,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionItemView {
        pub id: Uuid,
        pub menu_item_id: Uuid,
        pub menu_item_name: Option<String>,
        pub quantity: i64,
        pub unit_price_minor: i64,
        pub total_price_minor: i64,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionDetailView {
        #[serde(flatten)]
        pub transaction: TransactionView,
        pub items: Vec<TransactionItemView>,
        pub cashier_name: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionDetailView>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionListQuery {
        pub limit: Option<u64>,
        pub offset: Option<u64>,
    }

    /// Inclusive bounds on `transaction_date`, RFC3339.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct DateRangeQuery {
        pub start: DateTime<Utc>,
        pub end: DateTime<Utc>,
    }
}

pub mod report {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DailyReportQuery {
        /// Calendar day (`YYYY-MM-DD`) in the server's business time zone.
        pub date: NaiveDate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TopSellingItem {
        pub menu_item_id: Uuid,
        pub name: String,
        pub quantity_sold: i64,
        pub revenue_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DailySalesReport {
        pub date: NaiveDate,
        pub total_sales_minor: i64,
        pub total_transactions: u64,
        pub average_transaction_minor: i64,
        pub top_selling_items: Vec<TopSellingItem>,
    }
}
