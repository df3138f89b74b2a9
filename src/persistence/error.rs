use std::fmt::Display;

use super::value::{DataType, Value};

/// The kind of object a [`TableError::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Table,
    Column,
}

impl Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entity::Table => write!(f, "table"),
            Entity::Column => write!(f, "column"),
        }
    }
}

/// Which column constraint a value broke.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintKind {
    NotNull,
    TypeMismatch { expected: DataType, found: DataType },
    DuplicateKey(Value),
    /// A primary key value the index cannot order (a NaN float).
    InvalidKey(Value),
}

/// Every failure the table engine reports back to its caller.
///
/// None of these are fatal: a failed call leaves the [`super::Table`]
/// exactly as it was before the call.
#[derive(Debug, Clone, PartialEq)]
pub enum TableError {
    SchemaViolation { reason: String },
    ConstraintViolation { column: String, kind: ConstraintKind },
    NotFound { entity: Entity, name: String },
}

impl TableError {
    pub(crate) fn schema(reason: String) -> TableError {
        TableError::SchemaViolation { reason }
    }

    pub(crate) fn constraint(column: &str, kind: ConstraintKind) -> TableError {
        TableError::ConstraintViolation {
            column: column.to_string(),
            kind,
        }
    }

    pub(crate) fn not_found(entity: Entity, name: &str) -> TableError {
        TableError::NotFound {
            entity,
            name: name.to_string(),
        }
    }
}

impl Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableError::SchemaViolation { reason } => write!(f, "schema violation: {}", reason),
            TableError::ConstraintViolation { column, kind } => match kind {
                ConstraintKind::NotNull => {
                    write!(f, "constraint violation: NULL value in NOT NULL column {}", column)
                }
                ConstraintKind::TypeMismatch { expected, found } => write!(
                    f,
                    "constraint violation: value of type {} not compatible with type {}, on column {}",
                    found, expected, column
                ),
                ConstraintKind::DuplicateKey(key) => write!(
                    f,
                    "constraint violation: duplicate primary key {} on column {}",
                    key, column
                ),
                ConstraintKind::InvalidKey(key) => write!(
                    f,
                    "constraint violation: {} cannot be used as a primary key, on column {}",
                    key, column
                ),
            },
            TableError::NotFound { entity, name } => {
                write!(f, "does not exist: {} '{}'", entity, name)
            }
        }
    }
}

impl std::error::Error for TableError {}
