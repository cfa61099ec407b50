//! Database layer: pool, filter pattern helpers, and repositories for PostgreSQL.

mod filters;
mod pool;
mod repositories;

pub use filters::{alternation_pattern, contains_pattern};
pub use pool::{create_pool, run_migrations, DbPool};
pub use repositories::*;
