//! Diffing: per-entity structural diffs and the ordered schema diff built
//! on top of them.
//!
//! Every differ compares canonical text first and only walks the structure
//! when the text differs. The structural path is the ground truth; the text
//! comparison is an optimization that never changes the result.

mod schema;
mod table;
mod view;

pub use schema::{diff_schemas, SchemaDiff};
pub use table::{diff_tables, diff_tables_structural};
pub use view::diff_views;
