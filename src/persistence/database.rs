use indexmap::IndexMap;
use log::info;

use crate::config::EngineConfig;
use crate::persistence::{
    Condition, InsertReport, Row, Value,
    error::{Entity, TableError},
    schema::ColumnDef,
};

use super::table::Table;

/// The collective of multiple [`Table`] objects.
///
/// A [`Database`] owns its tables outright and hands out plain references;
/// a table lives until [`Database::drop_table`] removes it. The statement
/// layer goes through the `*_table`/`*_from` methods, which resolve the
/// table by name and report unknown tables and unknown condition columns as
/// [`TableError::NotFound`].
///
/// Tables are kept in an [`IndexMap`] so they list in creation order.
///
/// # Issues
/// - Single threaded only. Wrapping the database in a lock is up to the
///   caller.
#[derive(Debug)]
pub struct Database {
    name: String,
    config: EngineConfig,
    tables: IndexMap<String, Table>,
}

impl Database {
    pub fn new(name: String) -> Database {
        //! Create a new database with no tables.

        Database::with_config(name, EngineConfig::default())
    }

    pub fn with_config(name: String, config: EngineConfig) -> Database {
        Database {
            name,
            config,
            tables: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn create_table(&mut self, name: &str, columns: Vec<ColumnDef>) -> Result<(), TableError> {
        //! Create a [`Table`] and store it under `name`.
        //!
        //! Fails if the name is taken or the column definitions do not make
        //! a valid schema.

        if self.tables.contains_key(name) {
            return Err(TableError::schema(format!(
                "table {} already exists in database {}",
                name, self.name
            )));
        }

        let table = Table::with_config(name.to_string(), columns, &self.config)?;
        self.tables.insert(name.to_string(), table);

        Ok(())
    }

    pub fn drop_table(&mut self, name: &str) -> Result<Table, TableError> {
        //! Remove a table from the database and hand it back.

        let table = self
            .tables
            .shift_remove(name)
            .ok_or_else(|| TableError::not_found(Entity::Table, name))?;
        info!("dropped table {} from database {}", name, self.name);
        Ok(table)
    }

    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn get_table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub fn contains_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn insert_into_table(&mut self, table_name: &str, row: Row) -> Result<usize, TableError> {
        self.table_mut(table_name)?.insert_row(row)
    }

    pub fn insert_many_into_table(
        &mut self,
        table_name: &str,
        rows: Vec<Row>,
    ) -> Result<InsertReport, TableError> {
        //! Insert several rows, continuing past the ones that are refused.
        //!
        //! Only a missing table fails the whole call.

        Ok(self.table_mut(table_name)?.insert_rows(rows))
    }

    pub fn select_from(
        &self,
        table_name: &str,
        conditions: &[Condition],
    ) -> Result<Vec<Row>, TableError> {
        let table = self.table(table_name)?;
        check_condition_columns(table, conditions)?;
        Ok(table.select(conditions))
    }

    pub fn update_table(
        &mut self,
        table_name: &str,
        assignments: &IndexMap<String, Value>,
        conditions: &[Condition],
    ) -> Result<usize, TableError> {
        let table = self.table_mut(table_name)?;
        check_condition_columns(table, conditions)?;
        table.update(assignments, conditions)
    }

    pub fn delete_from_table(
        &mut self,
        table_name: &str,
        conditions: &[Condition],
    ) -> Result<usize, TableError> {
        //! Delete the matching rows of a table.
        //!
        //! Returns the total number of removed rows.

        let table = self.table_mut(table_name)?;
        check_condition_columns(table, conditions)?;
        Ok(table.remove(conditions))
    }

    fn table(&self, name: &str) -> Result<&Table, TableError> {
        self.tables
            .get(name)
            .ok_or_else(|| TableError::not_found(Entity::Table, name))
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut Table, TableError> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| TableError::not_found(Entity::Table, name))
    }
}

fn check_condition_columns(table: &Table, conditions: &[Condition]) -> Result<(), TableError> {
    match conditions
        .iter()
        .find(|condition| table.column_index(&condition.column_name).is_none())
    {
        Some(condition) => Err(TableError::not_found(
            Entity::Column,
            &condition.column_name,
        )),
        None => Ok(()),
    }
}
