//! Categories API endpoints.

use api_types::catalog::{CategoryListQuery, CategoryNew, CategoryUpdate, CategoryView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Capability, EngineError, User};
use uuid::Uuid;

use crate::{ServerError, map_status, server::ServerState};

fn map_category(category: engine::Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        description: category.description,
        status: map_status(category.status),
        created_at: category.created_at,
        updated_at: category.updated_at,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<CategoryListQuery>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    user.require(Capability::Checkout)?;
    let categories = state
        .engine
        .list_categories(query.include_inactive.unwrap_or(false))
        .await?
        .into_iter()
        .map(map_category)
        .collect();
    Ok(Json(categories))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CategoryView>, ServerError> {
    user.require(Capability::Checkout)?;
    let category = state
        .engine
        .category(id)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;
    Ok(Json(map_category(category)))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    user.require(Capability::ManageCatalog)?;
    let category = state
        .engine
        .create_category(engine::CategoryNew {
            name: payload.name,
            description: payload.description,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(map_category(category))))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryUpdate>,
) -> Result<Json<CategoryView>, ServerError> {
    user.require(Capability::ManageCatalog)?;
    let category = state
        .engine
        .update_category(
            id,
            engine::CategoryUpdate {
                name: payload.name,
                description: payload.description,
            },
        )
        .await?;
    Ok(Json(map_category(category)))
}

/// Soft delete.
pub async fn deactivate(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CategoryView>, ServerError> {
    user.require(Capability::ManageCatalog)?;
    let category = state.engine.deactivate_category(id).await?;
    Ok(Json(map_category(category)))
}
