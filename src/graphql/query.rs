//! Query root: single-object lookups and filtered list queries.

use async_graphql::{Context, Object, Result};

use crate::db::{self, CuisineFilter, DbPool, IngredientFilter, Page, RecipeFilter};
use crate::error::AppError;

use super::types::{Cuisine, Ingredient, Recipe};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Look up a recipe by id and/or exact name.
    async fn recipe(
        &self,
        ctx: &Context<'_>,
        recipe_id: Option<i64>,
        name: Option<String>,
    ) -> Result<Recipe> {
        if recipe_id.is_none() && name.is_none() {
            return Err(
                AppError::Validation("must use either recipeId or name".to_string()).into(),
            );
        }
        let pool = ctx.data_unchecked::<DbPool>();
        let row = db::recipe_find(pool, recipe_id, name.as_deref())
            .await?
            .ok_or_else(|| AppError::NotFound("Recipe matching query does not exist.".to_string()))?;
        Ok(row.into())
    }

    async fn ingredient(&self, ctx: &Context<'_>, ingredient_id: i64) -> Result<Ingredient> {
        let pool = ctx.data_unchecked::<DbPool>();
        let row = db::ingredient_get(pool, ingredient_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("Ingredient matching query does not exist.".to_string())
            })?;
        Ok(row.into())
    }

    async fn cuisine(&self, ctx: &Context<'_>, cuisine_id: i64) -> Result<Cuisine> {
        let pool = ctx.data_unchecked::<DbPool>();
        let row = db::cuisine_get(pool, cuisine_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("Cuisine matching query does not exist.".to_string())
            })?;
        Ok(row.into())
    }

    /// List recipes. `name` and `cuisine` are case-insensitive substring
    /// filters; `ingredients` matches recipes using at least one of the
    /// named ingredients.
    async fn recipes(
        &self,
        ctx: &Context<'_>,
        offset: Option<i64>,
        limit: Option<i64>,
        name: Option<String>,
        cuisine: Option<String>,
        ingredients: Option<Vec<String>>,
    ) -> Result<Vec<Recipe>> {
        let pool = ctx.data_unchecked::<DbPool>();
        let filter = RecipeFilter {
            name,
            cuisine,
            ingredients,
        };
        let rows = db::recipe_list(pool, &filter, Page { offset, limit }).await?;
        Ok(rows.into_iter().map(Recipe::from).collect())
    }

    /// List ingredients.
    async fn ingredients(
        &self,
        ctx: &Context<'_>,
        offset: Option<i64>,
        limit: Option<i64>,
        name: Option<String>,
        origin: Option<String>,
        #[graphql(desc = "Search for a cuisine name that used these ingredients (e.g., \
                          Italian -> Tomato, Wheat, etc...)")]
        used_in: Option<Vec<String>>,
    ) -> Result<Vec<Ingredient>> {
        let pool = ctx.data_unchecked::<DbPool>();
        let filter = IngredientFilter {
            name,
            origin,
            used_in,
        };
        let rows = db::ingredient_list(pool, &filter, Page { offset, limit }).await?;
        Ok(rows.into_iter().map(Ingredient::from).collect())
    }

    /// List cuisines. `recipes` and `ingredients` match cuisines with at
    /// least one related recipe/ingredient from the given names.
    async fn cuisines(
        &self,
        ctx: &Context<'_>,
        offset: Option<i64>,
        limit: Option<i64>,
        name: Option<String>,
        recipes: Option<Vec<String>>,
        ingredients: Option<Vec<String>>,
    ) -> Result<Vec<Cuisine>> {
        let pool = ctx.data_unchecked::<DbPool>();
        let filter = CuisineFilter {
            name,
            recipes,
            ingredients,
        };
        let rows = db::cuisine_list(pool, &filter, Page { offset, limit }).await?;
        Ok(rows.into_iter().map(Cuisine::from).collect())
    }
}
