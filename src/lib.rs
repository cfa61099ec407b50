//! Recipe catalog GraphQL API backed by PostgreSQL.
//!
//! Exposes queries and mutations over three entities (cuisines,
//! ingredients, recipes) through a single `/graphql` endpoint.

pub mod config;
pub mod db;
pub mod error;
pub mod graphql;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use graphql::{build_schema, CookbookSchema, PublicUrl};

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Json,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub schema: CookbookSchema,
}

/// Build the API router (graphql, health). Used by main and by integration tests.
pub fn create_app(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn graphql_handler(State(state): State<AppState>, req: GraphQLRequest) -> GraphQLResponse {
    state.schema.execute(req.into_inner()).await.into()
}

/// GET /graphql — GraphiQL IDE.
async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

/// GET /health — liveness probe.
async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "cookbook" })),
    )
}
