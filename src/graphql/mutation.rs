//! Mutation root: create/update/delete for cuisines, ingredients, recipes.

use async_graphql::{Context, Object, Result, SimpleObject};
use tracing::info;

use crate::db::{self, DbPool};
use crate::error::AppError;

use super::types::{Cuisine, CuisineInput, Ingredient, IngredientInput, Recipe};

pub struct MutationRoot;

#[derive(SimpleObject)]
pub struct IngredientPayload {
    pub ingredient: Ingredient,
}

#[derive(SimpleObject)]
pub struct CuisinePayload {
    pub cuisine: Cuisine,
}

#[derive(SimpleObject)]
pub struct RecipePayload {
    pub recipe: Recipe,
}

/// Delete result: `status` is false when no row matched the id.
#[derive(SimpleObject)]
pub struct DeletePayload {
    pub status: bool,
}

#[Object]
impl MutationRoot {
    // ---- Ingredients ----

    async fn create_ingredient(
        &self,
        ctx: &Context<'_>,
        name: String,
        origin: String,
    ) -> Result<IngredientPayload> {
        let pool = ctx.data_unchecked::<DbPool>();
        let row = db::ingredient_create(pool, &name, &origin).await?;
        info!(id = row.id, name = %row.name, "ingredient created");
        Ok(IngredientPayload {
            ingredient: row.into(),
        })
    }

    async fn update_ingredient(
        &self,
        ctx: &Context<'_>,
        id: i64,
        name: Option<String>,
        origin: Option<String>,
    ) -> Result<IngredientPayload> {
        let pool = ctx.data_unchecked::<DbPool>();
        let row = db::ingredient_update(pool, id, name.as_deref(), origin.as_deref())
            .await?
            .ok_or_else(|| AppError::NotFound("could not find ingredient".to_string()))?;
        Ok(IngredientPayload {
            ingredient: row.into(),
        })
    }

    async fn delete_ingredient(&self, ctx: &Context<'_>, id: i64) -> Result<DeletePayload> {
        let pool = ctx.data_unchecked::<DbPool>();
        let status = db::ingredient_delete(pool, id).await?;
        info!(id, status, "ingredient delete");
        Ok(DeletePayload { status })
    }

    // ---- Cuisines ----

    async fn create_cuisine(&self, ctx: &Context<'_>, name: String) -> Result<CuisinePayload> {
        let pool = ctx.data_unchecked::<DbPool>();
        let row = db::cuisine_create(pool, &name).await?;
        info!(id = row.id, name = %row.name, "cuisine created");
        Ok(CuisinePayload {
            cuisine: row.into(),
        })
    }

    async fn update_cuisine(
        &self,
        ctx: &Context<'_>,
        id: i64,
        name: Option<String>,
    ) -> Result<CuisinePayload> {
        let pool = ctx.data_unchecked::<DbPool>();
        let row = db::cuisine_update(pool, id, name.as_deref())
            .await?
            .ok_or_else(|| AppError::NotFound("could not find cuisine".to_string()))?;
        Ok(CuisinePayload {
            cuisine: row.into(),
        })
    }

    async fn delete_cuisine(&self, ctx: &Context<'_>, id: i64) -> Result<DeletePayload> {
        let pool = ctx.data_unchecked::<DbPool>();
        let status = db::cuisine_delete(pool, id).await?;
        info!(id, status, "cuisine delete");
        Ok(DeletePayload { status })
    }

    // ---- Recipes ----

    /// Create a recipe, resolving its cuisine and ingredients in one
    /// transaction. Referenced ids must exist; name-only inputs get or
    /// create the row.
    async fn create_recipe(
        &self,
        ctx: &Context<'_>,
        name: String,
        steps: String,
        #[graphql(desc = "Use ID to reference a created object, otherwise input the other fields")]
        cuisine: CuisineInput,
        #[graphql(desc = "Use ID to reference a created object, otherwise input the other fields")]
        ingredients: Option<Vec<IngredientInput>>,
    ) -> Result<RecipePayload> {
        let pool = ctx.data_unchecked::<DbPool>();

        let cuisine_ref = cuisine.into_ref()?;
        let ingredient_refs = ingredients
            .unwrap_or_default()
            .into_iter()
            .map(IngredientInput::into_ref)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let row = db::recipe_create(pool, &name, &steps, cuisine_ref, ingredient_refs).await?;
        info!(id = row.id, name = %row.name, "recipe created");
        Ok(RecipePayload { recipe: row.into() })
    }

    /// Patch a recipe. A non-empty `ingredients` list replaces the whole
    /// ingredient set.
    async fn update_recipe(
        &self,
        ctx: &Context<'_>,
        id: i64,
        name: Option<String>,
        steps: Option<String>,
        ingredients: Option<Vec<i64>>,
        cuisine: Option<i64>,
    ) -> Result<RecipePayload> {
        let pool = ctx.data_unchecked::<DbPool>();
        let row = db::recipe_update(
            pool,
            id,
            name.as_deref(),
            steps.as_deref(),
            cuisine,
            ingredients.as_deref(),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("could not find recipe".to_string()))?;
        Ok(RecipePayload { recipe: row.into() })
    }

    async fn delete_recipe(&self, ctx: &Context<'_>, id: i64) -> Result<DeletePayload> {
        let pool = ctx.data_unchecked::<DbPool>();
        let status = db::recipe_delete(pool, id).await?;
        info!(id, status, "recipe delete");
        Ok(DeletePayload { status })
    }
}
