//! Checkout and transaction read-back endpoints.

use api_types::transaction::{
    DateRangeQuery, PaymentMethod as ApiPaymentMethod, TransactionDetailView, TransactionItemView,
    TransactionListQuery, TransactionListResponse, TransactionNew, TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Capability, CartLine, EngineError, Money, NewTransactionCmd, Role, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_payment_method(method: engine::PaymentMethod) -> ApiPaymentMethod {
    match method {
        engine::PaymentMethod::Cash => ApiPaymentMethod::Cash,
        engine::PaymentMethod::Card => ApiPaymentMethod::Card,
        engine::PaymentMethod::DigitalWallet => ApiPaymentMethod::DigitalWallet,
        engine::PaymentMethod::BankTransfer => ApiPaymentMethod::BankTransfer,
    }
}

fn parse_payment_method(method: ApiPaymentMethod) -> engine::PaymentMethod {
    match method {
        ApiPaymentMethod::Cash => engine::PaymentMethod::Cash,
        ApiPaymentMethod::Card => engine::PaymentMethod::Card,
        ApiPaymentMethod::DigitalWallet => engine::PaymentMethod::DigitalWallet,
        ApiPaymentMethod::BankTransfer => engine::PaymentMethod::BankTransfer,
    }
}

fn map_transaction(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        transaction_date: tx.transaction_date,
        customer_name: tx.customer_name,
        customer_phone: tx.customer_phone,
        subtotal_minor: tx.subtotal.minor(),
        tax_amount_minor: tx.tax_amount.minor(),
        discount_amount_minor: tx.discount_amount.minor(),
        total_amount_minor: tx.total_amount.minor(),
        payment_method: map_payment_method(tx.payment_method),
        payment_received_minor: tx.payment_received.minor(),
        change_amount_minor: tx.change_amount.minor(),
        notes: tx.notes,
        cashier_id: tx.cashier_id,
        created_at: tx.created_at,
    }
}

fn map_detail(detail: engine::TransactionDetail) -> TransactionDetailView {
    TransactionDetailView {
        transaction: map_transaction(detail.transaction),
        items: detail
            .items
            .into_iter()
            .map(|item| TransactionItemView {
                id: item.id,
                menu_item_id: item.menu_item_id,
                menu_item_name: item.menu_item_name,
                quantity: item.quantity,
                unit_price_minor: item.unit_price.minor(),
                total_price_minor: item.total_price.minor(),
                notes: item.notes,
            })
            .collect(),
        cashier_name: detail.cashier_name,
    }
}

fn list_response(details: Vec<engine::TransactionDetail>) -> Json<TransactionListResponse> {
    Json(TransactionListResponse {
        transactions: details.into_iter().map(map_detail).collect(),
    })
}

/// Records a sale. A `KASIR` may only record sales under their own id.
pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    user.require(Capability::Checkout)?;
    if user.role == Role::Kasir && payload.cashier_id != user.id {
        return Err(EngineError::Forbidden(format!(
            "{} can only record transactions as themselves",
            user.username
        ))
        .into());
    }

    let items = payload
        .items
        .into_iter()
        .map(|item| CartLine {
            menu_item_id: item.menu_item_id,
            quantity: item.quantity,
            unit_price: Money::new(item.unit_price_minor),
            notes: item.notes,
        })
        .collect();
    let mut cmd = NewTransactionCmd::new(
        payload.cashier_id,
        items,
        parse_payment_method(payload.payment_method),
        Money::new(payload.payment_received_minor),
    )
    .amounts(
        Money::new(payload.subtotal_minor),
        Money::new(payload.tax_amount_minor),
        Money::new(payload.discount_amount_minor),
        Money::new(payload.total_amount_minor),
    );
    cmd.customer_name = payload.customer_name;
    cmd.customer_phone = payload.customer_phone;
    cmd.notes = payload.notes;

    let header = state.engine.create_transaction(cmd).await?;
    Ok((StatusCode::CREATED, Json(map_transaction(header))))
}

/// Without `view_reports` only the caller's own sales are readable.
pub async fn get_detail(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionDetailView>, ServerError> {
    user.require(Capability::Checkout)?;
    let detail = state
        .engine
        .transaction_by_id(id)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
    if !user.can(Capability::ViewReports) && detail.transaction.cashier_id != user.id {
        return Err(EngineError::Forbidden(format!(
            "{} can only read their own transactions",
            user.username
        ))
        .into());
    }
    Ok(Json(map_detail(detail)))
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    user.require(Capability::ViewReports)?;
    let details = state.engine.transactions(query.limit, query.offset).await?;
    Ok(list_response(details))
}

pub async fn by_date_range(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    user.require(Capability::ViewReports)?;
    let details = state
        .engine
        .transactions_by_date_range(query.start, query.end)
        .await?;
    Ok(list_response(details))
}

pub async fn by_cashier(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(cashier_id): Path<Uuid>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    user.require(Capability::ViewReports)?;
    let details = state.engine.transactions_by_cashier(cashier_id).await?;
    Ok(list_response(details))
}
