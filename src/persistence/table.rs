use std::fmt::Display;

use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::condition::{Condition, Operator, matches_all};
use super::error::{ConstraintKind, Entity, TableError};
use super::index::PrimaryIndex;
use super::row::Row;
use super::schema::{ColumnDef, Schema};
use super::value::Value;
use crate::config::EngineConfig;

/// A schema-checked list of rows with an optional primary key.
///
/// When a primary key column exists, every row's key is stored in a
/// B+tree mapping it to the row's position in `rows`. Every operation keeps
/// that mapping exact: one entry per row, pointing at where the row
/// currently sits.
///
/// # Issues
/// - A table is not thread safe. Callers that share one must serialize
///   access themselves.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    schema: Schema,
    rows: Vec<Row>,
    primary_key: Option<usize>,
    index: Option<PrimaryIndex>,
}

/// Outcome of inserting many rows at once. Rejected rows do not stop the
/// rows after them.
#[derive(Debug, Default)]
pub struct InsertReport {
    pub inserted: usize,
    /// Offset of the row in the input list, and why it was refused.
    pub rejected: Vec<(usize, TableError)>,
}

/// Plain data copy of a table, without its index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub rows: Vec<Row>,
}

enum AccessPath {
    /// Single primary key equality, answered by the index.
    Index(Option<usize>),
    Scan,
}

impl Table {
    pub fn new(name: String, columns: Vec<ColumnDef>) -> Result<Table, TableError> {
        Table::with_config(name, columns, &EngineConfig::default())
    }

    pub fn with_config(
        name: String,
        columns: Vec<ColumnDef>,
        config: &EngineConfig,
    ) -> Result<Table, TableError> {
        //! Return a new, empty table with the given column definitions.
        //!
        //! A B+tree index is created for the primary key column, if there
        //! is one, using the configured fanout. An order below
        //! [`crate::persistence::MIN_ORDER`] is a schema violation.

        let schema = Schema::new(columns)?;
        let primary_key = schema.primary_key_position();
        let index = match primary_key.and_then(|position| schema.get(position)) {
            Some(column) => PrimaryIndex::for_type(column.data_type, config.index_order)
                .map_err(|reason| {
                    TableError::schema(format!("table {}: {}", name, reason))
                })?,
            None => None,
        };

        info!("created table {} ({})", name, schema);

        Ok(Table {
            name,
            schema,
            rows: Vec::new(),
            primary_key,
            index,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn columns(&self) -> &[ColumnDef] {
        self.schema.columns()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.schema.position(name)
    }

    pub fn primary_key(&self) -> Option<&ColumnDef> {
        self.primary_key.and_then(|position| self.schema.get(position))
    }

    pub fn index_len(&self) -> usize {
        self.index.as_ref().map_or(0, |index| index.len())
    }

    pub fn insert_row(&mut self, row: Row) -> Result<usize, TableError> {
        //! Validate the row against the schema and append it.
        //!
        //! Fails without changing anything when the row has the wrong
        //! width, puts NULL in a NOT NULL or primary key column, holds a
        //! value of the wrong type, or repeats an existing primary key.
        //!
        //! Returns the position the row was stored at.

        if let Err(error) = self.validate_row(&row) {
            warn!("row rejected by table {}: {}", self.name, error);
            return Err(error);
        }

        let position = self.rows.len();
        if let (Some(pk), Some(index)) = (self.primary_key, self.index.as_mut()) {
            index.insert(&row.0[pk], position);
        }
        self.rows.push(row);

        Ok(position)
    }

    pub fn insert_rows(&mut self, rows: Vec<Row>) -> InsertReport {
        //! Insert every row that passes validation, in order.
        //!
        //! This is not atomic. Rows inserted before a rejected one stay.

        let mut report = InsertReport::default();
        for (offset, row) in rows.into_iter().enumerate() {
            match self.insert_row(row) {
                Ok(_) => report.inserted += 1,
                Err(error) => report.rejected.push((offset, error)),
            }
        }

        debug!(
            "table {}: {} row(s) inserted, {} rejected",
            self.name,
            report.inserted,
            report.rejected.len()
        );
        report
    }

    pub fn select(&self, conditions: &[Condition]) -> Vec<Row> {
        //! Return copies of the rows matching every condition, in insertion
        //! order. No conditions selects everything.
        //!
        //! A lone `=` on the primary key is answered with one index lookup,
        //! anything else is a full scan.

        match self.access_path(conditions) {
            AccessPath::Index(position) => {
                debug!("table {}: select through primary key index", self.name);
                position
                    .and_then(|position| self.rows.get(position))
                    .cloned()
                    .into_iter()
                    .collect()
            }
            AccessPath::Scan => self
                .rows
                .iter()
                .filter(|row| matches_all(row, &self.schema, conditions))
                .cloned()
                .collect(),
        }
    }

    pub fn get_by_key(&self, key: &Value) -> Option<&Row> {
        let index = self.index.as_ref()?;
        index.find(key).and_then(|position| self.rows.get(position))
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.get_by_key(key).is_some()
    }

    pub fn select_key_range(&self, start: &Value, end: &Value) -> Result<Vec<Row>, TableError> {
        //! Rows whose primary key lies in `[start, end]`, in key order.
        //!
        //! Both bounds must have the primary key column's type.

        let (Some(column), Some(index)) = (self.primary_key(), self.index.as_ref()) else {
            return Err(TableError::schema(format!(
                "table {} has no primary key",
                self.name
            )));
        };

        for bound in [start, end] {
            if bound.data_type() != column.data_type {
                return Err(TableError::constraint(
                    &column.name,
                    ConstraintKind::TypeMismatch {
                        expected: column.data_type,
                        found: bound.data_type(),
                    },
                ));
            }
        }

        Ok(index
            .positions_in_range(start, end)
            .into_iter()
            .filter_map(|position| self.rows.get(position).cloned())
            .collect())
    }

    pub fn update(
        &mut self,
        assignments: &IndexMap<String, Value>,
        conditions: &[Condition],
    ) -> Result<usize, TableError> {
        //! Assign new values to the rows matching `conditions`.
        //!
        //! Every assignment column must exist, otherwise nothing changes and
        //! [`TableError::NotFound`] is returned. Past that point, single
        //! assignments that break a constraint (wrong type, NULL in a NOT
        //! NULL column, a primary key owned by another row) are skipped
        //! while the rest of the row is still updated.
        //!
        //! Returns the number of rows that matched, not the number of
        //! values that changed.

        let mut resolved = Vec::with_capacity(assignments.len());
        for (column_name, value) in assignments.iter() {
            let column = self
                .schema
                .position(column_name)
                .ok_or_else(|| TableError::not_found(Entity::Column, column_name))?;
            resolved.push((column, value));
        }

        let mut matched = 0;
        for position in 0..self.rows.len() {
            if !matches_all(&self.rows[position], &self.schema, conditions) {
                continue;
            }
            matched += 1;

            for &(column, value) in resolved.iter() {
                if let Err(error) = self.assign(position, column, value) {
                    warn!(
                        "table {}: skipped assignment on row {}: {}",
                        self.name, position, error
                    );
                }
            }
        }

        debug!("table {}: {} row(s) matched update", self.name, matched);
        Ok(matched)
    }

    pub fn remove(&mut self, conditions: &[Condition]) -> usize {
        //! Delete the rows matching `conditions` and return how many went.
        //!
        //! Surviving rows keep their relative order. Keys of deleted rows
        //! leave the index and the keys of shifted rows are repointed to
        //! their new positions before this returns.

        let rows = std::mem::take(&mut self.rows);
        let mut removed = 0;

        for row in rows {
            if matches_all(&row, &self.schema, conditions) {
                if let (Some(pk), Some(index)) = (self.primary_key, self.index.as_mut()) {
                    index.remove(&row.0[pk]);
                }
                removed += 1;
            } else {
                let position = self.rows.len();
                if removed > 0 {
                    if let (Some(pk), Some(index)) = (self.primary_key, self.index.as_mut()) {
                        index.update(&row.0[pk], position);
                    }
                }
                self.rows.push(row);
            }
        }

        debug!("table {}: {} row(s) removed", self.name, removed);
        removed
    }

    pub fn verify_index(&self) -> Result<(), String> {
        //! Check that the index holds exactly one entry per row, pointing
        //! at that row's position, and that the tree itself is well formed.

        let (Some(pk), Some(index)) = (self.primary_key, self.index.as_ref()) else {
            return Ok(());
        };

        index.check_invariants()?;
        if index.len() != self.rows.len() {
            return Err(format!(
                "index holds {} keys for {} rows",
                index.len(),
                self.rows.len()
            ));
        }

        for (position, row) in self.rows.iter().enumerate() {
            let key = &row.0[pk];
            match index.find(key) {
                Some(found) if found == position => {}
                other => {
                    return Err(format!(
                        "key {} points at {:?}, row is at {}",
                        key, other, position
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            name: self.name.clone(),
            columns: self.schema.columns().to_vec(),
            rows: self.rows.clone(),
        }
    }

    pub fn from_snapshot(
        snapshot: TableSnapshot,
        config: &EngineConfig,
    ) -> Result<Table, TableError> {
        //! Rebuild a table, and its index, from a snapshot.
        //!
        //! Every row goes through the normal insert checks. The first row
        //! that fails aborts the load.

        let mut table = Table::with_config(snapshot.name, snapshot.columns, config)?;
        for row in snapshot.rows {
            table.insert_row(row)?;
        }
        Ok(table)
    }

    fn validate_row(&self, row: &Row) -> Result<(), TableError> {
        if row.len() != self.schema.len() {
            return Err(TableError::schema(format!(
                "row has {} values, table {} has {} columns",
                row.len(),
                self.name,
                self.schema.len()
            )));
        }

        for (column, value) in self.schema.columns().iter().zip(row.0.iter()) {
            check_value(column, value)?;
        }

        if let (Some(pk), Some(index)) = (self.primary_key, self.index.as_ref()) {
            let key = &row.0[pk];
            let column = &self.schema.columns()[pk];
            if !index.accepts(key) {
                return Err(TableError::constraint(
                    &column.name,
                    ConstraintKind::InvalidKey(key.clone()),
                ));
            }
            if index.find(key).is_some() {
                return Err(TableError::constraint(
                    &column.name,
                    ConstraintKind::DuplicateKey(key.clone()),
                ));
            }
        }

        Ok(())
    }

    fn assign(&mut self, position: usize, column: usize, value: &Value) -> Result<(), TableError> {
        let column_def = &self.schema.columns()[column];
        check_value(column_def, value)?;

        if Some(column) == self.primary_key {
            if let Some(index) = self.index.as_mut() {
                if !index.accepts(value) {
                    return Err(TableError::constraint(
                        &column_def.name,
                        ConstraintKind::InvalidKey(value.clone()),
                    ));
                }
                match index.find(value) {
                    Some(owner) if owner != position => {
                        return Err(TableError::constraint(
                            &column_def.name,
                            ConstraintKind::DuplicateKey(value.clone()),
                        ));
                    }
                    // same key on the same row
                    Some(_) => {}
                    None => {
                        let old_key =
                            std::mem::replace(&mut self.rows[position].0[column], value.clone());
                        index.remove(&old_key);
                        index.insert(value, position);
                        return Ok(());
                    }
                }
            }
        }

        self.rows[position].0[column] = value.clone();
        Ok(())
    }

    fn access_path(&self, conditions: &[Condition]) -> AccessPath {
        let (Some(column), Some(index)) = (self.primary_key(), self.index.as_ref()) else {
            return AccessPath::Scan;
        };

        match conditions {
            [condition]
                if condition.operator == Operator::Eq
                    && condition.column_name == column.name
                    && index.accepts(&condition.value) =>
            {
                AccessPath::Index(index.find(&condition.value))
            }
            _ => AccessPath::Scan,
        }
    }
}

fn check_value(column: &ColumnDef, value: &Value) -> Result<(), TableError> {
    if value.is_null() {
        if column.rejects_null() {
            return Err(TableError::constraint(&column.name, ConstraintKind::NotNull));
        }
        return Ok(());
    }

    if value.data_type() != column.data_type {
        return Err(TableError::constraint(
            &column.name,
            ConstraintKind::TypeMismatch {
                expected: column.data_type,
                found: value.data_type(),
            },
        ));
    }
    Ok(())
}

impl Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rows: Vec<String> = self.rows.iter().map(|row| format!("{}", row)).collect();

        writeln!(f, "{}\n{}", self.schema, rows.join("\n"))
    }
}
