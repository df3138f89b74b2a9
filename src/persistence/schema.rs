use std::collections::HashSet;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::error::TableError;
use super::value::DataType;

/// Definition of a single column. Immutable once the owning table exists.
///
/// A primary key column is always treated as NOT NULL, whatever
/// `not_null` says.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    pub primary_key: bool,
    pub not_null: bool,
}

impl ColumnDef {
    pub fn new(name: &str, data_type: DataType) -> ColumnDef {
        ColumnDef {
            name: name.to_string(),
            data_type,
            primary_key: false,
            not_null: false,
        }
    }

    pub fn primary_key(mut self) -> ColumnDef {
        self.primary_key = true;
        self
    }

    pub fn not_null(mut self) -> ColumnDef {
        self.not_null = true;
        self
    }

    pub fn rejects_null(&self) -> bool {
        self.not_null || self.primary_key
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schema(Vec<ColumnDef>);

impl Schema {
    pub fn new(columns: Vec<ColumnDef>) -> Result<Schema, TableError> {
        //! Create a schema from an ordered list of [`ColumnDef`]s.
        //!
        //! Rejects an empty column list, repeated column names, more than
        //! one primary key and a primary key declared with type NULL.

        if columns.is_empty() {
            return Err(TableError::schema(
                "0 columns does not make a schema".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for column in columns.iter() {
            if !names.insert(column.name.as_str()) {
                return Err(TableError::schema(format!(
                    "column {} is defined more than once",
                    column.name
                )));
            }
        }

        let primary_keys: Vec<&ColumnDef> = columns.iter().filter(|c| c.primary_key).collect();
        if primary_keys.len() > 1 {
            return Err(TableError::schema(format!(
                "multiple primary keys are not supported: {}",
                primary_keys
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<&str>>()
                    .join(", ")
            )));
        }
        if let Some(pk) = primary_keys.first() {
            if pk.data_type == DataType::Null {
                return Err(TableError::schema(format!(
                    "primary key {} cannot be of type {}",
                    pk.name,
                    DataType::Null
                )));
            }
        }

        Ok(Schema(columns))
    }

    pub fn get(&self, index: usize) -> Option<&ColumnDef> {
        self.0.get(index)
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn position(&self, column_name: &str) -> Option<usize> {
        self.0.iter().position(|column| column.name == column_name)
    }

    pub fn primary_key_position(&self) -> Option<usize> {
        self.0.iter().position(|column| column.primary_key)
    }
}

impl Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let schema: Vec<String> = self
            .0
            .iter()
            .map(|col| format!("{} ({})", col.name.as_str(), col.data_type))
            .collect();
        write!(f, "{}", schema.join(" | "))
    }
}
