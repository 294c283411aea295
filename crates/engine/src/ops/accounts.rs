use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    DefaultAdmin, EngineError, RecordStatus, ResultEngine, Role, User, UserNew, UserUpdate,
    clock::stamp,
    users,
    util::normalize_required,
};

use super::{Engine, with_tx};

/// Result of [`Engine::ensure_default_admin`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Created(User),
    /// An account with the default admin username is already present; it was
    /// left untouched.
    AlreadyExists,
}

fn require_password(password: &str) -> ResultEngine<()> {
    if password.is_empty() {
        return Err(EngineError::validation("password must not be empty"));
    }
    Ok(())
}

impl Engine {
    async fn user_by_username(
        &self,
        db_tx: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(db_tx)
            .await?)
    }

    async fn insert_user(
        &self,
        db_tx: &DatabaseTransaction,
        username: String,
        password: String,
        role: Role,
        full_name: String,
    ) -> ResultEngine<User> {
        if self.user_by_username(db_tx, &username).await?.is_some() {
            return Err(EngineError::ExistingKey(username));
        }
        let now = stamp(self.clock.as_ref());
        let model = users::ActiveModel {
            id: ActiveValue::Set(Uuid::now_v7().to_string()),
            username: ActiveValue::Set(username),
            password: ActiveValue::Set(password),
            role: ActiveValue::Set(role.as_str().to_string()),
            full_name: ActiveValue::Set(full_name),
            status: ActiveValue::Set(RecordStatus::Active.as_str().to_string()),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(db_tx)
        .await?;
        let user = User::try_from(model)?;
        tracing::info!(user_id = %user.id, username = %user.username, role = user.role.as_str(), "user created");
        Ok(user)
    }

    async fn user_model(&self, db_tx: &DatabaseTransaction, id: Uuid) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    /// Creates an account. Usernames are unique.
    pub async fn create_user(&self, cmd: UserNew) -> ResultEngine<User> {
        let username = normalize_required(&cmd.username, "username")?;
        let full_name = normalize_required(&cmd.full_name, "full name")?;
        require_password(&cmd.password)?;
        with_tx!(self, |db_tx| {
            self.insert_user(&db_tx, username, cmd.password, cmd.role, full_name)
                .await
        })
    }

    pub async fn update_user(&self, id: Uuid, cmd: UserUpdate) -> ResultEngine<User> {
        let full_name = cmd
            .full_name
            .as_deref()
            .map(|n| normalize_required(n, "full name"))
            .transpose()?;
        if let Some(password) = cmd.password.as_deref() {
            require_password(password)?;
        }
        with_tx!(self, |db_tx| {
            let mut active: users::ActiveModel = self.user_model(&db_tx, id).await?.into();
            if let Some(full_name) = full_name {
                active.full_name = ActiveValue::Set(full_name);
            }
            if let Some(role) = cmd.role {
                active.role = ActiveValue::Set(role.as_str().to_string());
            }
            if let Some(password) = cmd.password {
                active.password = ActiveValue::Set(password);
            }
            active.updated_at = ActiveValue::Set(stamp(self.clock.as_ref()));
            let model = active.update(&db_tx).await?;
            User::try_from(model)
        })
    }

    /// Soft-deletes an account. Its past transactions keep pointing at it.
    pub async fn deactivate_user(&self, id: Uuid) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let model = self.user_model(&db_tx, id).await?;
            if model.status == RecordStatus::Inactive.as_str() {
                return User::try_from(model);
            }
            let mut active: users::ActiveModel = model.into();
            active.status = ActiveValue::Set(RecordStatus::Inactive.as_str().to_string());
            active.updated_at = ActiveValue::Set(stamp(self.clock.as_ref()));
            let model = active.update(&db_tx).await?;
            tracing::info!(user_id = %id, "user deactivated");
            User::try_from(model)
        })
    }

    pub async fn user(&self, id: Uuid) -> ResultEngine<Option<User>> {
        with_tx!(self, |db_tx| {
            users::Entity::find_by_id(id.to_string())
                .one(&db_tx)
                .await?
                .map(User::try_from)
                .transpose()
        })
    }

    pub async fn user_exists(&self, id: Uuid) -> ResultEngine<bool> {
        Ok(self.user(id).await?.is_some())
    }

    /// Users ordered by username.
    pub async fn list_users(&self, include_inactive: bool) -> ResultEngine<Vec<User>> {
        with_tx!(self, |db_tx| {
            let mut query = users::Entity::find();
            if !include_inactive {
                query = query.filter(users::Column::Status.eq(RecordStatus::Active.as_str()));
            }
            query
                .order_by_asc(users::Column::Username)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(User::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Resolves an active user from its credentials.
    ///
    /// Unknown usernames, wrong passwords and inactive accounts all fail with
    /// [`EngineError::InvalidCredentials`].
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let Some(model) = self.user_by_username(&db_tx, username.trim()).await? else {
                return Err(EngineError::InvalidCredentials);
            };
            if model.password != password {
                return Err(EngineError::InvalidCredentials);
            }
            let user = User::try_from(model)?;
            if !user.status.is_active() {
                return Err(EngineError::InvalidCredentials);
            }
            Ok(user)
        })
    }

    /// Creates the default admin unless an account with its username exists.
    pub async fn ensure_default_admin(&self, admin: DefaultAdmin) -> ResultEngine<BootstrapOutcome> {
        let username = normalize_required(&admin.username, "username")?;
        let full_name = normalize_required(&admin.full_name, "full name")?;
        require_password(&admin.password)?;
        with_tx!(self, |db_tx| {
            if self.user_by_username(&db_tx, &username).await?.is_some() {
                tracing::debug!(%username, "default admin already present");
                return Ok(BootstrapOutcome::AlreadyExists);
            }
            let user = self
                .insert_user(&db_tx, username, admin.password, Role::Admin, full_name)
                .await?;
            Ok(BootstrapOutcome::Created(user))
        })
    }
}
