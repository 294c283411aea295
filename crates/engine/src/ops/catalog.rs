use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Category, CategoryNew, CategoryUpdate, EngineError, MenuItem, MenuItemNew, MenuItemUpdate,
    Money, RecordStatus, ResultEngine, categories,
    clock::stamp,
    menu_items,
    util::{normalize_optional_text, normalize_required},
};

use super::{Engine, with_tx};

fn require_positive_price(price: Money) -> ResultEngine<()> {
    if !price.is_positive() {
        return Err(EngineError::validation("price must be > 0"));
    }
    Ok(())
}

impl Engine {
    /// Fails unless the category exists and is active.
    async fn require_active_category(
        &self,
        db_tx: &DatabaseTransaction,
        category_id: Uuid,
    ) -> ResultEngine<()> {
        let Some(model) = categories::Entity::find_by_id(category_id.to_string())
            .one(db_tx)
            .await?
        else {
            return Err(EngineError::KeyNotFound("category not exists".to_string()));
        };
        if !RecordStatus::try_from(model.status.as_str())?.is_active() {
            return Err(EngineError::InactiveReference(format!(
                "category '{}' is inactive",
                model.name
            )));
        }
        Ok(())
    }

    async fn category_model(
        &self,
        db_tx: &DatabaseTransaction,
        id: Uuid,
    ) -> ResultEngine<categories::Model> {
        categories::Entity::find_by_id(id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))
    }

    async fn menu_item_model(
        &self,
        db_tx: &DatabaseTransaction,
        id: Uuid,
    ) -> ResultEngine<menu_items::Model> {
        menu_items::Entity::find_by_id(id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("menu item not exists".to_string()))
    }

    pub async fn create_category(&self, cmd: CategoryNew) -> ResultEngine<Category> {
        let name = normalize_required(&cmd.name, "category name")?;
        with_tx!(self, |db_tx| {
            let now = stamp(self.clock.as_ref());
            let model = categories::ActiveModel {
                id: ActiveValue::Set(Uuid::now_v7().to_string()),
                name: ActiveValue::Set(name),
                description: ActiveValue::Set(normalize_optional_text(cmd.description.as_deref())),
                status: ActiveValue::Set(RecordStatus::Active.as_str().to_string()),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            Category::try_from(model)
        })
    }

    /// Applies a partial update. A blank description clears it.
    pub async fn update_category(&self, id: Uuid, cmd: CategoryUpdate) -> ResultEngine<Category> {
        let name = cmd
            .name
            .as_deref()
            .map(|n| normalize_required(n, "category name"))
            .transpose()?;
        with_tx!(self, |db_tx| {
            let mut active: categories::ActiveModel =
                self.category_model(&db_tx, id).await?.into();
            if let Some(name) = name {
                active.name = ActiveValue::Set(name);
            }
            if let Some(description) = cmd.description.as_deref() {
                active.description = ActiveValue::Set(normalize_optional_text(Some(description)));
            }
            active.updated_at = ActiveValue::Set(stamp(self.clock.as_ref()));
            let model = active.update(&db_tx).await?;
            Category::try_from(model)
        })
    }

    /// Soft-deletes a category. Deactivating twice is a no-op.
    pub async fn deactivate_category(&self, id: Uuid) -> ResultEngine<Category> {
        with_tx!(self, |db_tx| {
            let model = self.category_model(&db_tx, id).await?;
            if model.status == RecordStatus::Inactive.as_str() {
                return Category::try_from(model);
            }
            let mut active: categories::ActiveModel = model.into();
            active.status = ActiveValue::Set(RecordStatus::Inactive.as_str().to_string());
            active.updated_at = ActiveValue::Set(stamp(self.clock.as_ref()));
            let model = active.update(&db_tx).await?;
            tracing::info!(category_id = %id, "category deactivated");
            Category::try_from(model)
        })
    }

    pub async fn category(&self, id: Uuid) -> ResultEngine<Option<Category>> {
        with_tx!(self, |db_tx| {
            categories::Entity::find_by_id(id.to_string())
                .one(&db_tx)
                .await?
                .map(Category::try_from)
                .transpose()
        })
    }

    /// Categories ordered by name. Inactive ones only when asked for.
    pub async fn list_categories(&self, include_inactive: bool) -> ResultEngine<Vec<Category>> {
        with_tx!(self, |db_tx| {
            let mut query = categories::Entity::find();
            if !include_inactive {
                query = query.filter(categories::Column::Status.eq(RecordStatus::Active.as_str()));
            }
            query
                .order_by_asc(categories::Column::Name)
                .order_by_asc(categories::Column::Id)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Category::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    pub async fn category_is_active(&self, id: Uuid) -> ResultEngine<bool> {
        Ok(self
            .category(id)
            .await?
            .is_some_and(|category| category.status.is_active()))
    }

    /// Adds a menu item to an active category.
    pub async fn create_menu_item(&self, cmd: MenuItemNew) -> ResultEngine<MenuItem> {
        let name = normalize_required(&cmd.name, "menu item name")?;
        require_positive_price(cmd.price)?;
        with_tx!(self, |db_tx| {
            self.require_active_category(&db_tx, cmd.category_id)
                .await?;
            let now = stamp(self.clock.as_ref());
            let model = menu_items::ActiveModel {
                id: ActiveValue::Set(Uuid::now_v7().to_string()),
                name: ActiveValue::Set(name),
                description: ActiveValue::Set(normalize_optional_text(cmd.description.as_deref())),
                price_minor: ActiveValue::Set(cmd.price.minor()),
                category_id: ActiveValue::Set(cmd.category_id.to_string()),
                status: ActiveValue::Set(RecordStatus::Active.as_str().to_string()),
                image_ref: ActiveValue::Set(normalize_optional_text(cmd.image_ref.as_deref())),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            MenuItem::try_from(model)
        })
    }

    /// Applies a partial update. Moving the item to another category requires
    /// that category to be active.
    pub async fn update_menu_item(&self, id: Uuid, cmd: MenuItemUpdate) -> ResultEngine<MenuItem> {
        let name = cmd
            .name
            .as_deref()
            .map(|n| normalize_required(n, "menu item name"))
            .transpose()?;
        if let Some(price) = cmd.price {
            require_positive_price(price)?;
        }
        with_tx!(self, |db_tx| {
            let model = self.menu_item_model(&db_tx, id).await?;
            if let Some(category_id) = cmd.category_id
                && category_id.to_string() != model.category_id
            {
                self.require_active_category(&db_tx, category_id).await?;
            }

            let mut active: menu_items::ActiveModel = model.into();
            if let Some(name) = name {
                active.name = ActiveValue::Set(name);
            }
            if let Some(description) = cmd.description.as_deref() {
                active.description = ActiveValue::Set(normalize_optional_text(Some(description)));
            }
            if let Some(price) = cmd.price {
                active.price_minor = ActiveValue::Set(price.minor());
            }
            if let Some(category_id) = cmd.category_id {
                active.category_id = ActiveValue::Set(category_id.to_string());
            }
            if let Some(image_ref) = cmd.image_ref.as_deref() {
                active.image_ref = ActiveValue::Set(normalize_optional_text(Some(image_ref)));
            }
            active.updated_at = ActiveValue::Set(stamp(self.clock.as_ref()));
            let model = active.update(&db_tx).await?;
            MenuItem::try_from(model)
        })
    }

    /// Soft-deletes a menu item. Past sales keep referencing it.
    pub async fn deactivate_menu_item(&self, id: Uuid) -> ResultEngine<MenuItem> {
        with_tx!(self, |db_tx| {
            let model = self.menu_item_model(&db_tx, id).await?;
            if model.status == RecordStatus::Inactive.as_str() {
                return MenuItem::try_from(model);
            }
            let mut active: menu_items::ActiveModel = model.into();
            active.status = ActiveValue::Set(RecordStatus::Inactive.as_str().to_string());
            active.updated_at = ActiveValue::Set(stamp(self.clock.as_ref()));
            let model = active.update(&db_tx).await?;
            tracing::info!(menu_item_id = %id, "menu item deactivated");
            MenuItem::try_from(model)
        })
    }

    pub async fn menu_item(&self, id: Uuid) -> ResultEngine<Option<MenuItem>> {
        with_tx!(self, |db_tx| {
            menu_items::Entity::find_by_id(id.to_string())
                .one(&db_tx)
                .await?
                .map(MenuItem::try_from)
                .transpose()
        })
    }

    /// Menu items ordered by name, optionally restricted to one category.
    pub async fn list_menu_items(
        &self,
        category_id: Option<Uuid>,
        include_inactive: bool,
    ) -> ResultEngine<Vec<MenuItem>> {
        with_tx!(self, |db_tx| {
            let mut query = menu_items::Entity::find();
            if let Some(category_id) = category_id {
                query = query.filter(menu_items::Column::CategoryId.eq(category_id.to_string()));
            }
            if !include_inactive {
                query = query.filter(menu_items::Column::Status.eq(RecordStatus::Active.as_str()));
            }
            query
                .order_by_asc(menu_items::Column::Name)
                .order_by_asc(menu_items::Column::Id)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(MenuItem::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Current catalog price of a menu item. Sales never read it; each sale
    /// line carries its own unit price.
    pub async fn menu_item_reference_price(&self, id: Uuid) -> ResultEngine<Option<Money>> {
        Ok(self.menu_item(id).await?.map(|item| item.price))
    }
}
