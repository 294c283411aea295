//! Login and user management endpoints.

use api_types::{
    auth::{Login, LoginResponse},
    user::{Role as ApiRole, UserListQuery, UserNew, UserUpdate, UserView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Capability, EngineError, Role, User};
use uuid::Uuid;

use crate::{ServerError, map_status, server::ServerState};

fn map_role(role: Role) -> ApiRole {
    match role {
        Role::Admin => ApiRole::Admin,
        Role::Kasir => ApiRole::Kasir,
    }
}

fn parse_role(role: ApiRole) -> Role {
    match role {
        ApiRole::Admin => Role::Admin,
        ApiRole::Kasir => Role::Kasir,
    }
}

fn map_user(user: User) -> UserView {
    UserView {
        id: user.id,
        username: user.username,
        role: map_role(user.role),
        full_name: user.full_name,
        status: map_status(user.status),
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

/// Checks credentials and returns the account with its capabilities.
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<Login>,
) -> Result<Json<LoginResponse>, ServerError> {
    let user = state
        .engine
        .authenticate(&payload.username, &payload.password)
        .await?;
    let capabilities = user
        .role
        .capabilities()
        .iter()
        .map(|c| c.as_str().to_string())
        .collect();
    tracing::info!(username = %user.username, "login");
    Ok(Json(LoginResponse {
        user: map_user(user),
        capabilities,
    }))
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Vec<UserView>>, ServerError> {
    user.require(Capability::ManageUsers)?;
    let users = state
        .engine
        .list_users(query.include_inactive.unwrap_or(false))
        .await?
        .into_iter()
        .map(map_user)
        .collect();
    Ok(Json(users))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserView>, ServerError> {
    user.require(Capability::ManageUsers)?;
    let found = state
        .engine
        .user(id)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
    Ok(Json(map_user(found)))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    user.require(Capability::ManageUsers)?;
    let created = state
        .engine
        .create_user(engine::UserNew {
            username: payload.username,
            password: payload.password,
            role: parse_role(payload.role),
            full_name: payload.full_name,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(map_user(created))))
}

/// An admin cannot change their own role.
pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<UserView>, ServerError> {
    user.require(Capability::ManageUsers)?;
    if id == user.id && payload.role.is_some_and(|role| parse_role(role) != user.role) {
        return Err(ServerError::Generic(
            "cannot change the role of the signed-in account".to_string(),
        ));
    }
    let updated = state
        .engine
        .update_user(
            id,
            engine::UserUpdate {
                full_name: payload.full_name,
                role: payload.role.map(parse_role),
                password: payload.password,
            },
        )
        .await?;
    Ok(Json(map_user(updated)))
}

/// Soft delete. An admin cannot deactivate their own account.
pub async fn deactivate(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserView>, ServerError> {
    user.require(Capability::ManageUsers)?;
    if id == user.id {
        return Err(ServerError::Generic(
            "cannot deactivate the signed-in account".to_string(),
        ));
    }
    let deactivated = state.engine.deactivate_user(id).await?;
    Ok(Json(map_user(deactivated)))
}
