use sea_orm::{QueryFilter, QueryOrder, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{
    Category, EngineError, ResultEngine, SessionContext, categories,
    util::{normalize_optional_text, normalize_required_name},
};

use super::{Engine, session_user};

impl Engine {
    /// Create a category for the caller.
    ///
    /// Returns `Ok(None)` without touching the database when `ctx` is
    /// anonymous.
    pub async fn add_category(
        &self,
        ctx: &SessionContext,
        name: &str,
        description: Option<&str>,
        image_url: Option<&str>,
    ) -> ResultEngine<Option<Category>> {
        let name = normalize_required_name(name, "category")?;
        let Some(user_id) = session_user(ctx, "add_category") else {
            return Ok(None);
        };

        let category = Category {
            id: Uuid::new_v4(),
            name,
            description: normalize_optional_text(description),
            image_url: normalize_optional_text(image_url),
        };
        category.active_model(user_id).insert(&self.database).await?;
        tracing::debug!(category_id = %category.id, "category created");
        Ok(Some(category))
    }

    /// All categories of the caller, ordered by name.
    ///
    /// Rows without a usable name are skipped rather than reported.
    pub async fn list_categories(&self, ctx: &SessionContext) -> ResultEngine<Vec<Category>> {
        let Some(user_id) = session_user(ctx, "list_categories") else {
            return Ok(Vec::new());
        };

        let models = categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id.to_string()))
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?;

        Ok(models
            .into_iter()
            .filter(|model| !model.name.trim().is_empty())
            .filter_map(|model| match Category::try_from(model) {
                Ok(category) => Some(category),
                Err(err) => {
                    tracing::warn!("skipping category row: {err}");
                    None
                }
            })
            .collect())
    }

    /// A single category of the caller.
    pub async fn category(
        &self,
        ctx: &SessionContext,
        category_id: Uuid,
    ) -> ResultEngine<Option<Category>> {
        let Some(user_id) = session_user(ctx, "category") else {
            return Ok(None);
        };

        categories::Entity::find_by_id(category_id.to_string())
            .filter(categories::Column::UserId.eq(user_id.to_string()))
            .one(&self.database)
            .await?
            .map(Category::try_from)
            .transpose()
    }

    /// Overwrite name, description and image of a category.
    ///
    /// Expenses keep whatever category name they were saved with.
    pub async fn update_category(
        &self,
        ctx: &SessionContext,
        category_id: Uuid,
        name: &str,
        description: Option<&str>,
        image_url: Option<&str>,
    ) -> ResultEngine<Option<Category>> {
        let name = normalize_required_name(name, "category")?;
        let Some(user_id) = session_user(ctx, "update_category") else {
            return Ok(None);
        };

        let category = Category {
            id: category_id,
            name,
            description: normalize_optional_text(description),
            image_url: normalize_optional_text(image_url),
        };
        let result = categories::Entity::update_many()
            .col_expr(categories::Column::Name, Expr::value(category.name.clone()))
            .col_expr(
                categories::Column::Description,
                Expr::value(category.description.clone()),
            )
            .col_expr(
                categories::Column::ImageUrl,
                Expr::value(category.image_url.clone()),
            )
            .filter(categories::Column::Id.eq(category_id.to_string()))
            .filter(categories::Column::UserId.eq(user_id.to_string()))
            .exec(&self.database)
            .await?;

        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("category not exists".to_string()));
        }
        Ok(Some(category))
    }

    /// Delete a category. Deleting an unknown id is not an error.
    pub async fn delete_category(
        &self,
        ctx: &SessionContext,
        category_id: Uuid,
    ) -> ResultEngine<()> {
        let Some(user_id) = session_user(ctx, "delete_category") else {
            return Ok(());
        };

        categories::Entity::delete_many()
            .filter(categories::Column::Id.eq(category_id.to_string()))
            .filter(categories::Column::UserId.eq(user_id.to_string()))
            .exec(&self.database)
            .await?;
        Ok(())
    }
}
