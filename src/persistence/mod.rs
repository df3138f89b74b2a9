//! Persistence as tables needs to have the following components
//! - Value (a single cell: NULL, integer, float or text, totally ordered)
//! - Schema (ordered column definitions, at most one primary key)
//! - Row (based on a Schema, one value per column)
//! - Condition (a column compared against a literal, AND-ed in lists)
//! - Index (a B+tree from primary key to row position)
//! - Table (rows plus their index, enforcing the schema's constraints)
//! - Database (named tables owned together)
//!

//  All modules of this lib
mod condition;
mod database;
mod error;
mod index;
mod row;
mod schema;
mod table;
mod value;

//  External API
pub use condition::{Condition, Operator};
pub use database::Database;
pub use error::{ConstraintKind, Entity, TableError};
pub use index::{BPlusTree, DEFAULT_ORDER, FloatKey, MIN_ORDER, Range};
pub use row::Row;
pub use schema::{ColumnDef, Schema};
pub use table::{InsertReport, Table, TableSnapshot};
pub use value::{DataType, Value};
