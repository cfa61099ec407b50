//! GraphQL schema: query/mutation roots, object types, and schema assembly.

pub mod mutation;
pub mod query;
pub mod types;

use async_graphql::{EmptySubscription, Schema};

use crate::db::DbPool;

use mutation::MutationRoot;
use query::QueryRoot;
pub use types::PublicUrl;

/// The cookbook GraphQL schema type.
pub type CookbookSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema with the database pool and public URL as context data.
pub fn build_schema(pool: DbPool, public_url: PublicUrl) -> CookbookSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(pool)
        .data(public_url)
        .finish()
}
