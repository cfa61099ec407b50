//! GraphQL object and input types for the food domain.

use async_graphql::{ComplexObject, Context, InputObject, Result, SimpleObject};
use chrono::{DateTime, Utc};

use crate::db::{self, CuisineRef, CuisineRow, DbPool, IngredientRef, IngredientRow, RecipeRow};
use crate::error::AppError;

/// Base URL used to absolutize stored media paths (cuisine banners).
/// Registered as schema data.
#[derive(Debug, Clone)]
pub struct PublicUrl(String);

impl PublicUrl {
    pub fn new(base: impl Into<String>) -> Self {
        Self(base.into().trim_end_matches('/').to_string())
    }

    /// Absolute URL for a stored path. Already-absolute URLs pass through.
    pub fn absolute(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.0, path.trim_start_matches('/'))
    }
}

/// A named culinary category linked to recipes and ingredients.
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Cuisine {
    pub id: i64,
    pub name: String,
    #[graphql(skip)]
    pub banner_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[ComplexObject]
impl Cuisine {
    /// Absolute URL of the banner image, if one is set.
    async fn banner(&self, ctx: &Context<'_>) -> Option<String> {
        let base = ctx.data_unchecked::<PublicUrl>();
        self.banner_path.as_deref().map(|p| base.absolute(p))
    }

    /// Recipes belonging to this cuisine.
    async fn recipes(&self, ctx: &Context<'_>) -> Result<Vec<Recipe>> {
        let pool = ctx.data_unchecked::<DbPool>();
        let rows = db::recipes_by_cuisine(pool, self.id).await?;
        Ok(rows.into_iter().map(Recipe::from).collect())
    }
}

/// A named substance with an origin, used by recipes.
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub origin: String,
    pub created_at: DateTime<Utc>,
}

#[ComplexObject]
impl Ingredient {
    /// Recipes using this ingredient.
    async fn recipes(&self, ctx: &Context<'_>) -> Result<Vec<Recipe>> {
        let pool = ctx.data_unchecked::<DbPool>();
        let rows = db::recipes_using_ingredient(pool, self.id).await?;
        Ok(rows.into_iter().map(Recipe::from).collect())
    }
}

/// A named procedure (steps) associating one cuisine and a set of ingredients.
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub steps: String,
    #[graphql(skip)]
    pub cuisine_id: i64,
    pub created_at: DateTime<Utc>,
}

#[ComplexObject]
impl Recipe {
    async fn cuisine(&self, ctx: &Context<'_>) -> Result<Cuisine> {
        let pool = ctx.data_unchecked::<DbPool>();
        let row = db::cuisine_get(pool, self.cuisine_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("Cuisine matching query does not exist.".to_string())
            })?;
        Ok(row.into())
    }

    async fn ingredients(&self, ctx: &Context<'_>) -> Result<Vec<Ingredient>> {
        let pool = ctx.data_unchecked::<DbPool>();
        let rows = db::recipe_ingredients(pool, self.id).await?;
        Ok(rows.into_iter().map(Ingredient::from).collect())
    }
}

impl From<CuisineRow> for Cuisine {
    fn from(row: CuisineRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            banner_path: row.banner,
            created_at: row.created_at,
        }
    }
}

impl From<IngredientRow> for Ingredient {
    fn from(row: IngredientRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            origin: row.origin,
            created_at: row.created_at,
        }
    }
}

impl From<RecipeRow> for Recipe {
    fn from(row: RecipeRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            steps: row.steps,
            cuisine_id: row.cuisine_id,
            created_at: row.created_at,
        }
    }
}

/// Use `id` to reference an existing cuisine, otherwise `name` gets or
/// creates one.
#[derive(Debug, Clone, InputObject)]
pub struct CuisineInput {
    pub id: Option<i64>,
    pub name: Option<String>,
}

impl CuisineInput {
    pub(crate) fn into_ref(self) -> std::result::Result<CuisineRef, AppError> {
        match (self.id, self.name) {
            (Some(id), _) => Ok(CuisineRef::ById(id)),
            (None, Some(name)) if !name.trim().is_empty() => Ok(CuisineRef::ByName(name)),
            (None, Some(_)) => Err(AppError::Validation("invalid cuisine object".to_string())),
            (None, None) => Err(AppError::Validation("cuisine cannot be empty".to_string())),
        }
    }
}

/// Use `id` to reference an existing ingredient, otherwise `name` and
/// `origin` get or create one.
#[derive(Debug, Clone, InputObject)]
pub struct IngredientInput {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub origin: Option<String>,
}

impl IngredientInput {
    pub(crate) fn into_ref(self) -> std::result::Result<IngredientRef, AppError> {
        match (self.id, self.name, self.origin) {
            (Some(id), _, _) => Ok(IngredientRef::ById(id)),
            (None, Some(name), Some(origin)) if !name.trim().is_empty() => {
                Ok(IngredientRef::New { name, origin })
            }
            _ => Err(AppError::Validation(
                "invalid ingredient object".to_string(),
            )),
        }
    }
}
