//! Menu item API endpoints.

use api_types::catalog::{MenuItemListQuery, MenuItemNew, MenuItemUpdate, MenuItemView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Capability, EngineError, Money, User};
use uuid::Uuid;

use crate::{ServerError, map_status, server::ServerState};

fn map_menu_item(item: engine::MenuItem) -> MenuItemView {
    MenuItemView {
        id: item.id,
        name: item.name,
        description: item.description,
        price_minor: item.price.minor(),
        category_id: item.category_id,
        status: map_status(item.status),
        image_ref: item.image_ref,
        created_at: item.created_at,
        updated_at: item.updated_at,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<MenuItemListQuery>,
) -> Result<Json<Vec<MenuItemView>>, ServerError> {
    user.require(Capability::Checkout)?;
    let items = state
        .engine
        .list_menu_items(query.category_id, query.include_inactive.unwrap_or(false))
        .await?
        .into_iter()
        .map(map_menu_item)
        .collect();
    Ok(Json(items))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MenuItemView>, ServerError> {
    user.require(Capability::Checkout)?;
    let item = state
        .engine
        .menu_item(id)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("menu item not exists".to_string()))?;
    Ok(Json(map_menu_item(item)))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<MenuItemNew>,
) -> Result<(StatusCode, Json<MenuItemView>), ServerError> {
    user.require(Capability::ManageCatalog)?;
    let item = state
        .engine
        .create_menu_item(engine::MenuItemNew {
            name: payload.name,
            description: payload.description,
            price: Money::new(payload.price_minor),
            category_id: payload.category_id,
            image_ref: payload.image_ref,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(map_menu_item(item))))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MenuItemUpdate>,
) -> Result<Json<MenuItemView>, ServerError> {
    user.require(Capability::ManageCatalog)?;
    let item = state
        .engine
        .update_menu_item(
            id,
            engine::MenuItemUpdate {
                name: payload.name,
                description: payload.description,
                price: payload.price_minor.map(Money::new),
                category_id: payload.category_id,
                image_ref: payload.image_ref,
            },
        )
        .await?;
    Ok(Json(map_menu_item(item)))
}

/// Soft delete.
pub async fn deactivate(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MenuItemView>, ServerError> {
    user.require(Capability::ManageCatalog)?;
    let item = state.engine.deactivate_menu_item(id).await?;
    Ok(Json(map_menu_item(item)))
}
