// All repository functions are generic over `E: Executor<'e, Database = Postgres>`
// so they accept both a `&PgPool` (direct query) and a `&mut Transaction` (atomic operations).
// Multi-statement operations take a `&mut PgConnection` instead.

pub mod card;
pub mod category;
pub mod tag;
pub mod token;
pub mod user;
