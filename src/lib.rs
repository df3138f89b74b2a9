//! # ferrum_tables
//! An in-memory relational table store.
//!
//! Tables hold typed rows under a fixed column schema, enforce NOT NULL,
//! type and primary key constraints, and keep their primary key in a
//! B+tree so equality lookups and key ranges avoid full scans.
//!
//! ```
//! use ferrum_tables::persistence::{ColumnDef, Condition, DataType, Row, Table, Value};
//!
//! let mut table = Table::new(
//!     "T".to_string(),
//!     vec![
//!         ColumnDef::new("id", DataType::Int).primary_key(),
//!         ColumnDef::new("name", DataType::Text).not_null(),
//!     ],
//! )
//! .unwrap();
//!
//! table.insert_row(Row(vec![Value::Int(1), Value::from("a")])).unwrap();
//! let rows = table.select(&[Condition::eq("id", Value::Int(1))]);
//! assert_eq!(rows.len(), 1);
//! ```

pub mod cli;
pub mod config;
pub mod persistence;
