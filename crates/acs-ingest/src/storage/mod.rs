// PostgreSQL Storage
//
// - namespace: drop/create the per-release schema
// - sql: identifier quoting and DDL/DML text
// - loader: create + bulk insert + comment, one transaction per table variant
// - comments: COMMENT ON statements with collision-free dollar quoting

pub mod comments;
pub mod loader;
pub mod namespace;
pub mod sql;

pub use comments::{dollar_quote, CommentAnnotator};
pub use loader::RelationalLoader;
pub use namespace::{drop_and_create_namespace, namespace_for};
