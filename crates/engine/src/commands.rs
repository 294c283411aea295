//! Command structs for engine write operations.
//!
//! These types group parameters for checkout and catalog/account writes,
//! keeping call sites readable and avoiding long argument lists.

use uuid::Uuid;

use crate::{Money, PaymentMethod, Role};

/// One cart line submitted at checkout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartLine {
    pub menu_item_id: Uuid,
    pub quantity: i64,
    pub unit_price: Money,
    pub notes: Option<String>,
}

impl CartLine {
    #[must_use]
    pub fn new(menu_item_id: Uuid, quantity: i64, unit_price: Money) -> Self {
        Self {
            menu_item_id,
            quantity,
            unit_price,
            notes: None,
        }
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Create a sale transaction.
///
/// `subtotal`, `tax_amount`, `discount_amount` and `total_amount` are the
/// client's breakdown and are stored as given. Change and line totals are
/// always recomputed by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTransactionCmd {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub items: Vec<CartLine>,
    pub subtotal: Money,
    pub tax_amount: Money,
    pub discount_amount: Money,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    pub payment_received: Money,
    pub notes: Option<String>,
    pub cashier_id: Uuid,
}

impl NewTransactionCmd {
    #[must_use]
    pub fn new(
        cashier_id: Uuid,
        items: Vec<CartLine>,
        payment_method: PaymentMethod,
        payment_received: Money,
    ) -> Self {
        Self {
            customer_name: None,
            customer_phone: None,
            items,
            subtotal: Money::ZERO,
            tax_amount: Money::ZERO,
            discount_amount: Money::ZERO,
            total_amount: Money::ZERO,
            payment_method,
            payment_received,
            notes: None,
            cashier_id,
        }
    }

    /// Sets the header breakdown as computed by the client.
    #[must_use]
    pub fn amounts(mut self, subtotal: Money, tax: Money, discount: Money, total: Money) -> Self {
        self.subtotal = subtotal;
        self.tax_amount = tax;
        self.discount_amount = discount;
        self.total_amount = total;
        self
    }

    #[must_use]
    pub fn customer(mut self, name: impl Into<String>, phone: Option<String>) -> Self {
        self.customer_name = Some(name.into());
        self.customer_phone = phone;
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryNew {
    pub name: String,
    pub description: Option<String>,
}

/// Partial category update. `None` leaves a field untouched; a blank
/// description clears it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuItemNew {
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub category_id: Uuid,
    pub image_ref: Option<String>,
}

/// Partial menu item update. `None` leaves a field untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MenuItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub category_id: Option<Uuid>,
    pub image_ref: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserNew {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub full_name: String,
}

/// Partial user update. `None` leaves a field untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub password: Option<String>,
}

/// The privileged account seeded at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefaultAdmin {
    pub username: String,
    pub password: String,
    pub full_name: String,
}

impl Default for DefaultAdmin {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin123".to_string(),
            full_name: "Administrator".to_string(),
        }
    }
}
