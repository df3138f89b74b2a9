//! The non-interactive front of the engine.
//!
//! - ferrum-tables --help          | Command Line Help
//! - ferrum-tables demo [--json]   | Run the scripted demo session.
//! - ferrum-tables config          | Show the effective configuration.
//!
//! `--order <n>` overrides the index fanout read from the environment.

use indexmap::IndexMap;

use crate::{
    cli::messages::{dim_argument, highlight_argument, system_message},
    config::EngineConfig,
    persistence::{ColumnDef, Condition, DataType, Database, Row, Value},
};

mod colors;
mod messages;
pub mod parsers;

const DEMO_TABLE: &str = "T";

pub fn resolve_config(order: Option<usize>) -> Result<EngineConfig, String> {
    //! Read the configuration from the environment, then apply the
    //! command line override.

    let config = EngineConfig::from_env()?;
    match order {
        Some(order) => config.with_index_order(order),
        None => Ok(config),
    }
}

pub fn show_config(config: &EngineConfig) {
    println!(
        "{}",
        system_message(
            "config",
            format!(
                "index order is {}",
                highlight_argument(&config.index_order.to_string())
            )
        )
    );
}

pub fn run_demo(config: EngineConfig, json: bool) -> Result<(), String> {
    //! Create `T(id INT PRIMARY KEY, name TEXT NOT NULL)`, run a few
    //! statements against it and print what each one did.

    let mut database = Database::with_config("demo".to_string(), config);
    database
        .create_table(
            DEMO_TABLE,
            vec![
                ColumnDef::new("id", DataType::Int).primary_key(),
                ColumnDef::new("name", DataType::Text).not_null(),
            ],
        )
        .map_err(|e| e.to_string())?;

    let rows = vec![
        Row(vec![Value::Int(1), Value::from("a")]),
        Row(vec![Value::Int(2), Value::from("b")]),
        Row(vec![Value::Int(2), Value::from("duplicate")]),
        Row(vec![Value::Int(3), Value::Null]),
    ];
    let report = database
        .insert_many_into_table(DEMO_TABLE, rows)
        .map_err(|e| e.to_string())?;
    say(format!("{} row(s) inserted", report.inserted));
    for (offset, error) in report.rejected.iter() {
        say(dim_argument(&format!("row {} rejected: {}", offset, error)));
    }

    let found = database
        .select_from(DEMO_TABLE, &[Condition::eq("id", Value::Int(2))])
        .map_err(|e| e.to_string())?;
    show_rows("select id = 2", &found);

    let mut assignments = IndexMap::new();
    assignments.insert("name".to_string(), Value::from("z"));
    let updated = database
        .update_table(DEMO_TABLE, &assignments, &[Condition::eq("id", Value::Int(1))])
        .map_err(|e| e.to_string())?;
    say(format!("{} row(s) matched update", updated));

    let removed = database
        .delete_from_table(DEMO_TABLE, &[Condition::eq("id", Value::Int(2))])
        .map_err(|e| e.to_string())?;
    say(format!("{} row(s) removed", removed));

    let remaining = database
        .select_from(DEMO_TABLE, &[])
        .map_err(|e| e.to_string())?;
    show_rows("select *", &remaining);

    let table = database
        .get_table(DEMO_TABLE)
        .ok_or_else(|| format!("err: does not exist: table {}", DEMO_TABLE))?;
    say(format!(
        "key 2 still indexed: {}",
        highlight_argument(&table.contains_key(&Value::Int(2)).to_string())
    ));

    if json {
        let snapshot = serde_json::to_string_pretty(&table.snapshot()).map_err(|e| e.to_string())?;
        println!("{}", snapshot);
    } else {
        println!("{}", table);
    }

    Ok(())
}

fn say(message: String) {
    println!("{}", system_message("ferrum", message));
}

fn show_rows(statement: &str, rows: &[Row]) {
    say(format!(
        "{} returned {} row(s)",
        highlight_argument(statement),
        rows.len()
    ));
    for row in rows {
        println!("  {}", row);
    }
}
