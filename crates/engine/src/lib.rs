//! Back-office engine of the kasir point of sale.
//!
//! The [`Engine`] owns the database connection and exposes the catalog,
//! account, checkout and reporting operations. All money is carried as
//! [`Money`] (integer minor units).

pub use categories::Category;
pub use clock::{Clock, SystemClock};
pub use commands::{
    CartLine, CategoryNew, CategoryUpdate, DefaultAdmin, MenuItemNew, MenuItemUpdate,
    NewTransactionCmd, UserNew, UserUpdate,
};
pub use error::EngineError;
pub use menu_items::MenuItem;
pub use money::Money;
pub use ops::{BootstrapOutcome, Engine, EngineBuilder};
pub use reports::{DailySalesReport, TOP_SELLERS_LIMIT, TopSellingItem};
pub use status::RecordStatus;
pub use transaction_items::TransactionItem;
pub use transactions::{PaymentMethod, Transaction, TransactionDetail};
pub use users::{Capability, Role, User};

mod categories;
mod clock;
mod commands;
mod error;
mod menu_items;
mod money;
mod ops;
mod reports;
mod settlement;
mod status;
mod transaction_items;
mod transactions;
mod users;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
