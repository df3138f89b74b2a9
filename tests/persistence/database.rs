use indexmap::IndexMap;

use ferrum_tables::config::EngineConfig;
use ferrum_tables::persistence::{
    ColumnDef, Condition, DataType, Database, Entity, Operator, Row, TableError, Value,
};

fn _prepare_database() -> Database {
    let db_name = "test_db".to_string();
    Database::new(db_name)
}

fn _columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new("id", DataType::Int).primary_key(),
        ColumnDef::new("name", DataType::Text).not_null(),
    ]
}

fn _create_table(database: &mut Database, name: &str, data: Vec<(i64, &str)>) {
    database
        .create_table(name, _columns())
        .expect("invalid column definitions or table exists already");
    let rows = data
        .into_iter()
        .map(|(id, name)| Row(vec![Value::Int(id), Value::from(name)]))
        .collect();
    let report = database.insert_many_into_table(name, rows).unwrap();
    assert!(report.rejected.is_empty());
}

#[test]
fn database_create_table() {
    let mut database = _prepare_database();
    _create_table(
        &mut database,
        "test_tb1",
        vec![(1, "Jansen"), (2, "Bonega"), (3, "Maharashtra")],
    );

    assert!(database.contains_table("test_tb1"));
    assert_eq!(database.get_table("test_tb1").unwrap().len(), 3);
    assert_eq!(database.name(), "test_db");
}

#[test]
fn database_create_table_twice_fails() {
    let mut database = _prepare_database();
    database.create_table("test_tb1", _columns()).unwrap();

    let result = database.create_table("test_tb1", _columns());
    assert!(matches!(result, Err(TableError::SchemaViolation { .. })));
}

#[test]
fn database_lists_tables_in_creation_order() {
    let mut database = _prepare_database();
    for name in ["zeta", "alpha", "mid"] {
        database.create_table(name, _columns()).unwrap();
    }

    assert_eq!(database.table_names(), vec!["zeta", "alpha", "mid"]);

    database.drop_table("alpha").unwrap();
    assert_eq!(database.table_names(), vec!["zeta", "mid"]);
}

#[test]
fn database_drop_missing_table_is_not_found() {
    let mut database = _prepare_database();
    let result = database.drop_table("ghost");

    assert!(matches!(
        result,
        Err(TableError::NotFound {
            entity: Entity::Table,
            ..
        })
    ));
}

#[test]
fn database_insert_into_missing_table() {
    let mut database = _prepare_database();
    let result = database.insert_into_table("ghost", Row(vec![Value::Int(1)]));

    assert_eq!(
        result,
        Err(TableError::NotFound {
            entity: Entity::Table,
            name: "ghost".to_string(),
        })
    );
}

#[test]
fn database_insert_many_continues_past_failures() {
    let mut database = _prepare_database();
    database.create_table("test_tb1", _columns()).unwrap();

    let report = database
        .insert_many_into_table(
            "test_tb1",
            vec![
                Row(vec![Value::Int(1), Value::from("a")]),
                Row(vec![Value::from("x"), Value::from("b")]),
                Row(vec![Value::Int(3), Value::from("c")]),
            ],
        )
        .unwrap();

    assert_eq!(report.inserted, 2);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(database.get_table("test_tb1").unwrap().len(), 2);
}

#[test]
fn database_select_unknown_column_is_not_found() {
    let mut database = _prepare_database();
    _create_table(&mut database, "test_tb1", vec![(1, "Jansen")]);

    let result = database.select_from("test_tb1", &[Condition::eq("age", Value::Int(1))]);
    assert_eq!(
        result,
        Err(TableError::NotFound {
            entity: Entity::Column,
            name: "age".to_string(),
        })
    );
}

#[test]
fn database_update_and_delete() {
    let mut database = _prepare_database();
    _create_table(
        &mut database,
        "test_tb1",
        vec![(1, "Jansen"), (2, "Bonega"), (3, "Maharashtra")],
    );

    let mut assignments = IndexMap::new();
    assignments.insert("name".to_string(), Value::from("Lorem"));
    let updated = database
        .update_table(
            "test_tb1",
            &assignments,
            &[Condition::new("id", Operator::GtEq, Value::Int(2))],
        )
        .unwrap();
    assert_eq!(updated, 2);

    let deleted = database
        .delete_from_table("test_tb1", &[Condition::eq("id", Value::Int(1))])
        .unwrap();
    assert_eq!(deleted, 1);

    let rows = database.select_from("test_tb1", &[]).unwrap();
    assert_eq!(
        rows,
        vec![
            Row(vec![Value::Int(2), Value::from("Lorem")]),
            Row(vec![Value::Int(3), Value::from("Lorem")]),
        ]
    );

    let table = database.get_table("test_tb1").unwrap();
    assert!(!table.contains_key(&Value::Int(1)));
    table.verify_index().unwrap();
}

#[test]
fn database_delete_with_unknown_column_changes_nothing() {
    let mut database = _prepare_database();
    _create_table(&mut database, "test_tb1", vec![(1, "Jansen"), (2, "Bonega")]);

    let result = database.delete_from_table(
        "test_tb1",
        &[Condition::new("age", Operator::Gt, Value::Int(0))],
    );
    assert!(result.is_err());
    assert_eq!(database.get_table("test_tb1").unwrap().len(), 2);
}

#[test]
fn database_uses_configured_index_order() {
    let config = EngineConfig::default().with_index_order(3).unwrap();
    let mut database = Database::with_config("small".to_string(), config);
    database.create_table("test_tb1", _columns()).unwrap();

    let table = database.get_table_mut("test_tb1").unwrap();
    for id in 0..200 {
        table
            .insert_row(Row(vec![Value::Int(id), Value::from("n")]))
            .unwrap();
    }
    table.remove(&[Condition::new("id", Operator::Lt, Value::Int(150))]);

    assert_eq!(table.len(), 50);
    table.verify_index().unwrap();
}
