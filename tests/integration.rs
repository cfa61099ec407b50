//! Integration tests: health, queries, mutations, and the transactional
//! recipe creation.
//!
//! Run with `cargo test`. Tests that need a database set:
//! - `TEST_DATABASE_URL` (Postgres; migrations are applied on startup)
//!
//! Each test is skipped when the variable is unset.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use cookbook::graphql::PublicUrl;
use cookbook::{build_schema, create_app, db, AppState};
use tower::util::ServiceExt;

async fn test_app() -> Option<axum::Router> {
    let database_url = match std::env::var("TEST_DATABASE_URL") {
        Ok(u) => u,
        Err(_) => {
            eprintln!("Skip integration test: set TEST_DATABASE_URL");
            return None;
        }
    };
    let pool = match db::create_pool(&database_url).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Skip integration test: {}", e);
            return None;
        }
    };
    if let Err(e) = db::run_migrations(&pool).await {
        eprintln!("Skip integration test: migrations: {}", e);
        return None;
    }
    let schema = build_schema(pool, PublicUrl::new("http://localhost:3000"));
    Some(create_app(AppState { schema }))
}

async fn gql(app: &axum::Router, query: &str) -> serde_json::Value {
    let body = serde_json::json!({ "query": query });
    let req = Request::builder()
        .method("POST")
        .uri("/graphql")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn unique(prefix: &str) -> String {
    let ts = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{prefix}-{ts}")
}

#[tokio::test]
async fn health_returns_ok() {
    let Some(app) = test_app().await else { return };

    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json.get("status").and_then(|v| v.as_str()), Some("ok"));
}

#[tokio::test]
async fn cuisine_create_query_update_delete() {
    let Some(app) = test_app().await else { return };
    let name = unique("italian");

    let res = gql(
        &app,
        &format!(r#"mutation {{ createCuisine(name: "{name}") {{ cuisine {{ id name banner }} }} }}"#),
    )
    .await;
    assert!(res.get("errors").is_none(), "create errors: {res}");
    let cuisine = &res["data"]["createCuisine"]["cuisine"];
    let id = cuisine["id"].as_i64().unwrap();
    assert_eq!(cuisine["name"].as_str(), Some(name.as_str()));
    assert!(cuisine["banner"].is_null());

    let res = gql(
        &app,
        &format!("query {{ cuisine(cuisineId: {id}) {{ id name }} }}"),
    )
    .await;
    assert!(res.get("errors").is_none(), "query errors: {res}");
    assert_eq!(res["data"]["cuisine"]["name"].as_str(), Some(name.as_str()));

    let renamed = unique("tuscan");
    let res = gql(
        &app,
        &format!(
            r#"mutation {{ updateCuisine(id: {id}, name: "{renamed}") {{ cuisine {{ name }} }} }}"#
        ),
    )
    .await;
    assert_eq!(
        res["data"]["updateCuisine"]["cuisine"]["name"].as_str(),
        Some(renamed.as_str())
    );

    let res = gql(
        &app,
        &format!("mutation {{ deleteCuisine(id: {id}) {{ status }} }}"),
    )
    .await;
    assert_eq!(res["data"]["deleteCuisine"]["status"].as_bool(), Some(true));

    // second delete: boolean failure flag, not an error
    let res = gql(
        &app,
        &format!("mutation {{ deleteCuisine(id: {id}) {{ status }} }}"),
    )
    .await;
    assert!(res.get("errors").is_none());
    assert_eq!(res["data"]["deleteCuisine"]["status"].as_bool(), Some(false));
}

#[tokio::test]
async fn ingredient_update_missing_is_an_error() {
    let Some(app) = test_app().await else { return };

    let res = gql(
        &app,
        r#"mutation { updateIngredient(id: 0, name: "x") { ingredient { id } } }"#,
    )
    .await;
    let message = res["errors"][0]["message"].as_str().unwrap_or_default();
    assert_eq!(message, "could not find ingredient");
}

#[tokio::test]
async fn recipe_query_requires_id_or_name() {
    let Some(app) = test_app().await else { return };

    let res = gql(&app, "query { recipe { id } }").await;
    let message = res["errors"][0]["message"].as_str().unwrap_or_default();
    assert_eq!(message, "must use either recipeId or name");
}

#[tokio::test]
async fn create_recipe_with_nested_cuisine_and_ingredients() {
    let Some(app) = test_app().await else { return };
    let cuisine = unique("mexican");
    let tomato = unique("tomato");
    let bean = unique("bean");
    let recipe = unique("chili");

    let res = gql(
        &app,
        &format!(
            r#"mutation {{
                createRecipe(
                    name: "{recipe}",
                    steps: "chop, simmer, serve",
                    cuisine: {{ name: "{cuisine}" }},
                    ingredients: [
                        {{ name: "{tomato}", origin: "Mexico" }},
                        {{ name: "{bean}", origin: "Mexico" }}
                    ]
                ) {{
                    recipe {{
                        id
                        name
                        cuisine {{ name }}
                        ingredients {{ name origin }}
                    }}
                }}
            }}"#
        ),
    )
    .await;
    assert!(res.get("errors").is_none(), "create errors: {res}");
    let created = &res["data"]["createRecipe"]["recipe"];
    assert_eq!(created["name"].as_str(), Some(recipe.as_str()));
    assert_eq!(created["cuisine"]["name"].as_str(), Some(cuisine.as_str()));
    let ingredients = created["ingredients"].as_array().unwrap();
    assert_eq!(ingredients.len(), 2);

    // reachable through the ingredient alternation filter
    let res = gql(
        &app,
        &format!(r#"query {{ recipes(ingredients: ["{tomato}"]) {{ name }} }}"#),
    )
    .await;
    let names: Vec<&str> = res["data"]["recipes"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["name"].as_str())
        .collect();
    assert!(names.contains(&recipe.as_str()), "got: {names:?}");

    // and by exact name through the single-object query
    let res = gql(
        &app,
        &format!(r#"query {{ recipe(name: "{recipe}") {{ id name }} }}"#),
    )
    .await;
    assert!(res.get("errors").is_none(), "query errors: {res}");
    assert_eq!(res["data"]["recipe"]["name"].as_str(), Some(recipe.as_str()));

    // usedIn: ingredients of the new cuisine
    let res = gql(
        &app,
        &format!(r#"query {{ ingredients(usedIn: ["{cuisine}"]) {{ name }} }}"#),
    )
    .await;
    let names: Vec<&str> = res["data"]["ingredients"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["name"].as_str())
        .collect();
    assert!(names.contains(&tomato.as_str()), "got: {names:?}");
    assert!(names.contains(&bean.as_str()), "got: {names:?}");
}

#[tokio::test]
async fn create_recipe_rejects_incomplete_ingredient_input() {
    let Some(app) = test_app().await else { return };
    let cuisine = unique("phantom");

    // missing origin is rejected during input validation, before any write
    let res = gql(
        &app,
        &format!(
            r#"mutation {{
                createRecipe(
                    name: "never",
                    steps: "never",
                    cuisine: {{ name: "{cuisine}" }},
                    ingredients: [{{ name: "incomplete" }}]
                ) {{ recipe {{ id }} }}
            }}"#
        ),
    )
    .await;
    let message = res["errors"][0]["message"].as_str().unwrap_or_default();
    assert_eq!(message, "invalid ingredient object");

    // nothing from the rejected mutation may be written
    let res = gql(
        &app,
        &format!(r#"query {{ cuisines(name: "{cuisine}") {{ id }} }}"#),
    )
    .await;
    assert_eq!(res["data"]["cuisines"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn create_recipe_missing_ingredient_id_rolls_back_cuisine() {
    let Some(app) = test_app().await else { return };
    let cuisine = unique("ghost");

    // the ingredient reference is well-formed, so the mutation reaches the
    // database: the cuisine is inserted first, then resolving the
    // nonexistent ingredient id fails and must roll the insert back
    let res = gql(
        &app,
        &format!(
            r#"mutation {{
                createRecipe(
                    name: "never",
                    steps: "never",
                    cuisine: {{ name: "{cuisine}" }},
                    ingredients: [{{ id: 999999999 }}]
                ) {{ recipe {{ id }} }}
            }}"#
        ),
    )
    .await;
    let message = res["errors"][0]["message"].as_str().unwrap_or_default();
    assert_eq!(message, "invalid ingredient object");

    let res = gql(
        &app,
        &format!(r#"query {{ cuisines(name: "{cuisine}") {{ id }} }}"#),
    )
    .await;
    assert_eq!(res["data"]["cuisines"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn create_recipe_rejects_empty_cuisine() {
    let Some(app) = test_app().await else { return };

    let res = gql(
        &app,
        r#"mutation {
            createRecipe(name: "x", steps: "y", cuisine: {}) { recipe { id } }
        }"#,
    )
    .await;
    let message = res["errors"][0]["message"].as_str().unwrap_or_default();
    assert_eq!(message, "cuisine cannot be empty");
}

#[tokio::test]
async fn update_recipe_replaces_ingredient_set() {
    let Some(app) = test_app().await else { return };
    let cuisine = unique("thai");
    let first = unique("lemongrass");
    let second = unique("galangal");
    let recipe = unique("soup");

    let res = gql(
        &app,
        &format!(
            r#"mutation {{
                createRecipe(
                    name: "{recipe}",
                    steps: "boil",
                    cuisine: {{ name: "{cuisine}" }},
                    ingredients: [{{ name: "{first}", origin: "Thailand" }}]
                ) {{ recipe {{ id }} }}
            }}"#
        ),
    )
    .await;
    assert!(res.get("errors").is_none(), "create errors: {res}");
    let recipe_id = res["data"]["createRecipe"]["recipe"]["id"].as_i64().unwrap();

    let res = gql(
        &app,
        &format!(
            r#"mutation {{ createIngredient(name: "{second}", origin: "Thailand") {{ ingredient {{ id }} }} }}"#
        ),
    )
    .await;
    let second_id = res["data"]["createIngredient"]["ingredient"]["id"]
        .as_i64()
        .unwrap();

    let renamed = unique("tom-kha");
    let res = gql(
        &app,
        &format!(
            r#"mutation {{
                updateRecipe(id: {recipe_id}, name: "{renamed}", ingredients: [{second_id}]) {{
                    recipe {{ name ingredients {{ id name }} }}
                }}
            }}"#
        ),
    )
    .await;
    assert!(res.get("errors").is_none(), "update errors: {res}");
    let updated = &res["data"]["updateRecipe"]["recipe"];
    assert_eq!(updated["name"].as_str(), Some(renamed.as_str()));
    let ingredients = updated["ingredients"].as_array().unwrap();
    assert_eq!(ingredients.len(), 1);
    assert_eq!(ingredients[0]["id"].as_i64(), Some(second_id));
}

#[tokio::test]
async fn delete_recipe_missing_returns_false() {
    let Some(app) = test_app().await else { return };

    let res = gql(&app, "mutation { deleteRecipe(id: 0) { status } }").await;
    assert!(res.get("errors").is_none());
    assert_eq!(res["data"]["deleteRecipe"]["status"].as_bool(), Some(false));
}
