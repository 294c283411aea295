//! Sale transactions: checkout writes and read-back queries.
//!
//! Every listing returns [`TransactionDetail`](crate::TransactionDetail)s
//! ordered newest first by `(created_at DESC, id DESC)`.

mod hydrate;
mod list;
mod write;
