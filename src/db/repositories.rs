//! Repositories: cuisines, ingredients, recipes, and the recipe/ingredient join.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, Postgres, QueryBuilder};

use crate::error::{AppError, AppResult};

use super::filters::{alternation_pattern, contains_pattern};
use super::DbPool;

// ---- Rows ----

#[derive(Debug, Clone, FromRow)]
pub struct CuisineRow {
    pub id: i64,
    pub name: String,
    pub banner: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct IngredientRow {
    pub id: i64,
    pub name: String,
    pub origin: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct RecipeRow {
    pub id: i64,
    pub name: String,
    pub steps: String,
    pub cuisine_id: i64,
    pub created_at: DateTime<Utc>,
}

// ---- Filters and pagination ----

/// Offset/limit pagination for the list queries. Both optional.
#[derive(Debug, Clone, Copy, Default)]
pub struct Page {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default)]
pub struct RecipeFilter {
    /// Case-insensitive substring on recipe name.
    pub name: Option<String>,
    /// Case-insensitive substring on the related cuisine's name.
    pub cuisine: Option<String>,
    /// Matches recipes using at least one ingredient from this list.
    pub ingredients: Option<Vec<String>>,
}

#[derive(Debug, Default)]
pub struct IngredientFilter {
    pub name: Option<String>,
    pub origin: Option<String>,
    /// Cuisine names; matches ingredients used by a recipe of a matching cuisine.
    pub used_in: Option<Vec<String>>,
}

#[derive(Debug, Default)]
pub struct CuisineFilter {
    pub name: Option<String>,
    /// Recipe names belonging to the cuisine.
    pub recipes: Option<Vec<String>>,
    /// Ingredient names used by the cuisine's recipes.
    pub ingredients: Option<Vec<String>>,
}

fn push_page(qb: &mut QueryBuilder<'_, Postgres>, page: Page) {
    if let Some(limit) = page.limit {
        qb.push(" LIMIT ").push_bind(limit);
    }
    if let Some(offset) = page.offset {
        qb.push(" OFFSET ").push_bind(offset);
    }
}

// ---- Cuisines ----

pub async fn cuisine_get(pool: &DbPool, id: i64) -> AppResult<Option<CuisineRow>> {
    let row = sqlx::query_as::<_, CuisineRow>(
        "SELECT id, name, banner, created_at FROM cuisines WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn cuisine_create(pool: &DbPool, name: &str) -> AppResult<CuisineRow> {
    let row = sqlx::query_as::<_, CuisineRow>(
        "INSERT INTO cuisines (name) VALUES ($1) RETURNING id, name, banner, created_at",
    )
    .bind(name)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Patch name if given. Returns `None` when the row does not exist.
pub async fn cuisine_update(
    pool: &DbPool,
    id: i64,
    name: Option<&str>,
) -> AppResult<Option<CuisineRow>> {
    let row = sqlx::query_as::<_, CuisineRow>(
        r#"
        UPDATE cuisines SET name = COALESCE($2, name)
        WHERE id = $1
        RETURNING id, name, banner, created_at
        "#,
    )
    .bind(id)
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Returns `false` when the row does not exist.
pub async fn cuisine_delete(pool: &DbPool, id: i64) -> AppResult<bool> {
    let r = sqlx::query("DELETE FROM cuisines WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(r.rows_affected() > 0)
}

pub async fn cuisine_list(
    pool: &DbPool,
    filter: &CuisineFilter,
    page: Page,
) -> AppResult<Vec<CuisineRow>> {
    let mut qb = QueryBuilder::<Postgres>::new(
        "SELECT c.id, c.name, c.banner, c.created_at FROM cuisines c WHERE TRUE",
    );
    if let Some(name) = &filter.name {
        qb.push(" AND c.name ILIKE ").push_bind(contains_pattern(name));
    }
    if let Some(recipes) = &filter.recipes {
        qb.push(" AND EXISTS (SELECT 1 FROM recipes r WHERE r.cuisine_id = c.id AND r.name ~* ")
            .push_bind(alternation_pattern(recipes))
            .push(")");
    }
    if let Some(ingredients) = &filter.ingredients {
        qb.push(
            " AND EXISTS (SELECT 1 FROM recipes r \
             JOIN recipe_ingredients ri ON ri.recipe_id = r.id \
             JOIN ingredients i ON i.id = ri.ingredient_id \
             WHERE r.cuisine_id = c.id AND i.name ~* ",
        )
        .push_bind(alternation_pattern(ingredients))
        .push(")");
    }
    qb.push(" ORDER BY c.id");
    push_page(&mut qb, page);

    let rows = qb.build_query_as::<CuisineRow>().fetch_all(pool).await?;
    Ok(rows)
}

// ---- Ingredients ----

pub async fn ingredient_get(pool: &DbPool, id: i64) -> AppResult<Option<IngredientRow>> {
    let row = sqlx::query_as::<_, IngredientRow>(
        "SELECT id, name, origin, created_at FROM ingredients WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn ingredient_create(pool: &DbPool, name: &str, origin: &str) -> AppResult<IngredientRow> {
    let row = sqlx::query_as::<_, IngredientRow>(
        r#"
        INSERT INTO ingredients (name, origin)
        VALUES ($1, $2)
        RETURNING id, name, origin, created_at
        "#,
    )
    .bind(name)
    .bind(origin)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn ingredient_update(
    pool: &DbPool,
    id: i64,
    name: Option<&str>,
    origin: Option<&str>,
) -> AppResult<Option<IngredientRow>> {
    let row = sqlx::query_as::<_, IngredientRow>(
        r#"
        UPDATE ingredients SET name = COALESCE($2, name), origin = COALESCE($3, origin)
        WHERE id = $1
        RETURNING id, name, origin, created_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(origin)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn ingredient_delete(pool: &DbPool, id: i64) -> AppResult<bool> {
    let r = sqlx::query("DELETE FROM ingredients WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(r.rows_affected() > 0)
}

pub async fn ingredient_list(
    pool: &DbPool,
    filter: &IngredientFilter,
    page: Page,
) -> AppResult<Vec<IngredientRow>> {
    let mut qb = QueryBuilder::<Postgres>::new(
        "SELECT i.id, i.name, i.origin, i.created_at FROM ingredients i WHERE TRUE",
    );
    if let Some(name) = &filter.name {
        qb.push(" AND i.name ILIKE ").push_bind(contains_pattern(name));
    }
    if let Some(origin) = &filter.origin {
        qb.push(" AND i.origin ILIKE ").push_bind(contains_pattern(origin));
    }
    if let Some(used_in) = &filter.used_in {
        qb.push(
            " AND EXISTS (SELECT 1 FROM recipe_ingredients ri \
             JOIN recipes r ON r.id = ri.recipe_id \
             JOIN cuisines c ON c.id = r.cuisine_id \
             WHERE ri.ingredient_id = i.id AND c.name ~* ",
        )
        .push_bind(alternation_pattern(used_in))
        .push(")");
    }
    qb.push(" ORDER BY i.id");
    push_page(&mut qb, page);

    let rows = qb.build_query_as::<IngredientRow>().fetch_all(pool).await?;
    Ok(rows)
}

// ---- Recipes ----

pub async fn recipe_get(pool: &DbPool, id: i64) -> AppResult<Option<RecipeRow>> {
    let row = sqlx::query_as::<_, RecipeRow>(
        "SELECT id, name, steps, cuisine_id, created_at FROM recipes WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Single-row lookup by id and/or exact name; matches on the arguments given.
pub async fn recipe_find(
    pool: &DbPool,
    id: Option<i64>,
    name: Option<&str>,
) -> AppResult<Option<RecipeRow>> {
    let row = sqlx::query_as::<_, RecipeRow>(
        r#"
        SELECT id, name, steps, cuisine_id, created_at FROM recipes
        WHERE ($1::BIGINT IS NULL OR id = $1)
          AND ($2::TEXT IS NULL OR name = $2)
        ORDER BY id
        LIMIT 1
        "#,
    )
    .bind(id)
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Reference to a cuisine in `recipe_create`: an existing row by id, or a
/// name to get-or-create.
#[derive(Debug, Clone)]
pub enum CuisineRef {
    ById(i64),
    ByName(String),
}

/// Reference to an ingredient in `recipe_create`.
#[derive(Debug, Clone)]
pub enum IngredientRef {
    ById(i64),
    New { name: String, origin: String },
}

/// Create a recipe together with its cuisine and ingredients in one
/// transaction: resolving a bad reference rolls the whole operation back,
/// so no orphaned cuisines or ingredients are left behind.
pub async fn recipe_create(
    pool: &DbPool,
    name: &str,
    steps: &str,
    cuisine: CuisineRef,
    ingredients: Vec<IngredientRef>,
) -> AppResult<RecipeRow> {
    let mut tx = pool.begin().await?;

    let cuisine_id = match cuisine {
        CuisineRef::ById(id) => {
            let row = sqlx::query_as::<_, CuisineRow>(
                "SELECT id, name, banner, created_at FROM cuisines WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
            row.ok_or_else(|| AppError::Validation("invalid cuisine object".to_string()))?
                .id
        }
        CuisineRef::ByName(cuisine_name) => {
            // get-or-create; the no-op update makes RETURNING yield the
            // existing row on conflict
            let row = sqlx::query_as::<_, CuisineRow>(
                r#"
                INSERT INTO cuisines (name) VALUES ($1)
                ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
                RETURNING id, name, banner, created_at
                "#,
            )
            .bind(&cuisine_name)
            .fetch_one(&mut *tx)
            .await?;
            row.id
        }
    };

    let mut ingredient_ids: Vec<i64> = Vec::with_capacity(ingredients.len());
    for ingredient in ingredients {
        let id = match ingredient {
            IngredientRef::ById(id) => {
                let row = sqlx::query_as::<_, IngredientRow>(
                    "SELECT id, name, origin, created_at FROM ingredients WHERE id = $1",
                )
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
                row.ok_or_else(|| {
                    AppError::Validation("invalid ingredient object".to_string())
                })?
                .id
            }
            IngredientRef::New {
                name: ingredient_name,
                origin,
            } => {
                let row = sqlx::query_as::<_, IngredientRow>(
                    r#"
                    INSERT INTO ingredients (name, origin) VALUES ($1, $2)
                    ON CONFLICT (name, origin) DO UPDATE SET name = EXCLUDED.name
                    RETURNING id, name, origin, created_at
                    "#,
                )
                .bind(&ingredient_name)
                .bind(&origin)
                .fetch_one(&mut *tx)
                .await?;
                row.id
            }
        };
        ingredient_ids.push(id);
    }

    let recipe = sqlx::query_as::<_, RecipeRow>(
        r#"
        INSERT INTO recipes (name, steps, cuisine_id)
        VALUES ($1, $2, $3)
        RETURNING id, name, steps, cuisine_id, created_at
        "#,
    )
    .bind(name)
    .bind(steps)
    .bind(cuisine_id)
    .fetch_one(&mut *tx)
    .await?;

    for ingredient_id in &ingredient_ids {
        sqlx::query(
            r#"
            INSERT INTO recipe_ingredients (recipe_id, ingredient_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(recipe.id)
        .bind(ingredient_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(recipe)
}

/// Patch scalar fields; a non-empty `ingredient_ids` replaces the whole
/// ingredient set. Returns `None` when the recipe does not exist.
pub async fn recipe_update(
    pool: &DbPool,
    id: i64,
    name: Option<&str>,
    steps: Option<&str>,
    cuisine_id: Option<i64>,
    ingredient_ids: Option<&[i64]>,
) -> AppResult<Option<RecipeRow>> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, RecipeRow>(
        r#"
        UPDATE recipes
        SET name = COALESCE($2, name),
            steps = COALESCE($3, steps),
            cuisine_id = COALESCE($4, cuisine_id)
        WHERE id = $1
        RETURNING id, name, steps, cuisine_id, created_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(steps)
    .bind(cuisine_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(recipe) = row else {
        return Ok(None);
    };

    if let Some(ids) = ingredient_ids {
        if !ids.is_empty() {
            sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
                .bind(recipe.id)
                .execute(&mut *tx)
                .await?;
            for ingredient_id in ids {
                sqlx::query(
                    r#"
                    INSERT INTO recipe_ingredients (recipe_id, ingredient_id)
                    VALUES ($1, $2)
                    ON CONFLICT DO NOTHING
                    "#,
                )
                .bind(recipe.id)
                .bind(ingredient_id)
                .execute(&mut *tx)
                .await?;
            }
        }
    }

    tx.commit().await?;
    Ok(Some(recipe))
}

pub async fn recipe_delete(pool: &DbPool, id: i64) -> AppResult<bool> {
    let r = sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(r.rows_affected() > 0)
}

pub async fn recipe_list(
    pool: &DbPool,
    filter: &RecipeFilter,
    page: Page,
) -> AppResult<Vec<RecipeRow>> {
    let mut qb = QueryBuilder::<Postgres>::new(
        "SELECT r.id, r.name, r.steps, r.cuisine_id, r.created_at FROM recipes r WHERE TRUE",
    );
    if let Some(name) = &filter.name {
        qb.push(" AND r.name ILIKE ").push_bind(contains_pattern(name));
    }
    if let Some(cuisine) = &filter.cuisine {
        qb.push(" AND EXISTS (SELECT 1 FROM cuisines c WHERE c.id = r.cuisine_id AND c.name ILIKE ")
            .push_bind(contains_pattern(cuisine))
            .push(")");
    }
    if let Some(ingredients) = &filter.ingredients {
        qb.push(
            " AND EXISTS (SELECT 1 FROM recipe_ingredients ri \
             JOIN ingredients i ON i.id = ri.ingredient_id \
             WHERE ri.recipe_id = r.id AND i.name ~* ",
        )
        .push_bind(alternation_pattern(ingredients))
        .push(")");
    }
    qb.push(" ORDER BY r.id");
    push_page(&mut qb, page);

    let rows = qb.build_query_as::<RecipeRow>().fetch_all(pool).await?;
    Ok(rows)
}

// ---- Relations ----

pub async fn recipes_by_cuisine(pool: &DbPool, cuisine_id: i64) -> AppResult<Vec<RecipeRow>> {
    let rows = sqlx::query_as::<_, RecipeRow>(
        "SELECT id, name, steps, cuisine_id, created_at FROM recipes WHERE cuisine_id = $1 ORDER BY id",
    )
    .bind(cuisine_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn recipe_ingredients(pool: &DbPool, recipe_id: i64) -> AppResult<Vec<IngredientRow>> {
    let rows = sqlx::query_as::<_, IngredientRow>(
        r#"
        SELECT i.id, i.name, i.origin, i.created_at FROM ingredients i
        JOIN recipe_ingredients ri ON ri.ingredient_id = i.id
        WHERE ri.recipe_id = $1
        ORDER BY i.id
        "#,
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn recipes_using_ingredient(
    pool: &DbPool,
    ingredient_id: i64,
) -> AppResult<Vec<RecipeRow>> {
    let rows = sqlx::query_as::<_, RecipeRow>(
        r#"
        SELECT r.id, r.name, r.steps, r.cuisine_id, r.created_at FROM recipes r
        JOIN recipe_ingredients ri ON ri.recipe_id = r.id
        WHERE ri.ingredient_id = $1
        ORDER BY r.id
        "#,
    )
    .bind(ingredient_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
