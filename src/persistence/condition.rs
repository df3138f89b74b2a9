//! Row filtering for select, update and delete.
//!
//! A list of [`Condition`]s is always AND-ed together, and an empty list
//! matches every row.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::row::Row;
use super::schema::Schema;
use super::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" => Ok(Operator::Eq),
            "!=" | "<>" => Ok(Operator::NotEq),
            "<" => Ok(Operator::Lt),
            ">" => Ok(Operator::Gt),
            "<=" => Ok(Operator::LtEq),
            ">=" => Ok(Operator::GtEq),
            other => Err(format!("invalid operator {}: not supported", other)),
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let operator = match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::LtEq => "<=",
            Operator::GtEq => ">=",
        };
        write!(f, "{}", operator)
    }
}

/// `<column> <operator> <literal>`, evaluated against one row at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub column_name: String,
    pub operator: Operator,
    pub value: Value,
}

impl Condition {
    pub fn new(column_name: &str, operator: Operator, value: Value) -> Condition {
        Condition {
            column_name: column_name.to_string(),
            operator,
            value,
        }
    }

    pub fn eq(column_name: &str, value: Value) -> Condition {
        Condition::new(column_name, Operator::Eq, value)
    }

    pub fn evaluate(&self, row: &Row, schema: &Schema) -> bool {
        //! Compare the row's value in `column_name` against the literal.
        //!
        //! A column missing from the schema (or from a short row) makes the
        //! condition false.

        let row_value = match schema.position(&self.column_name).and_then(|i| row.get(i)) {
            Some(value) => value,
            None => return false,
        };
        let literal = &self.value;

        match self.operator {
            Operator::Eq => row_value == literal,
            Operator::NotEq => row_value != literal,
            Operator::Lt => row_value.less_than(literal),
            Operator::Gt => !row_value.less_than(literal) && row_value != literal,
            Operator::LtEq => row_value.less_than(literal) || row_value == literal,
            Operator::GtEq => !row_value.less_than(literal),
        }
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.column_name, self.operator, self.value)
    }
}

pub(crate) fn matches_all(row: &Row, schema: &Schema, conditions: &[Condition]) -> bool {
    conditions
        .iter()
        .all(|condition| condition.evaluate(row, schema))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{ColumnDef, DataType};

    fn _schema() -> Schema {
        Schema::new(vec![
            ColumnDef::new("id", DataType::Int).primary_key(),
            ColumnDef::new("score", DataType::Float),
            ColumnDef::new("name", DataType::Text),
        ])
        .unwrap()
    }

    fn _row(id: i64, score: Value, name: &str) -> Row {
        Row(vec![Value::Int(id), score, Value::from(name)])
    }

    #[test]
    fn test_operator_from_str() {
        assert_eq!("<>".parse::<Operator>(), Ok(Operator::NotEq));
        assert_eq!(">=".parse::<Operator>(), Ok(Operator::GtEq));
        assert!("~".parse::<Operator>().is_err());
    }

    #[test]
    fn test_equality_operators() {
        let schema = _schema();
        let row = _row(2, Value::Float(1.5), "b");

        assert!(Condition::eq("id", Value::Int(2)).evaluate(&row, &schema));
        assert!(!Condition::eq("id", Value::Float(2.0)).evaluate(&row, &schema));
        assert!(Condition::new("id", Operator::NotEq, Value::Text("2".into())).evaluate(&row, &schema));
    }

    #[test]
    fn test_ordering_operators() {
        let schema = _schema();
        let row = _row(5, Value::Float(1.5), "m");

        assert!(Condition::new("id", Operator::Lt, Value::Int(6)).evaluate(&row, &schema));
        assert!(Condition::new("id", Operator::LtEq, Value::Int(5)).evaluate(&row, &schema));
        assert!(Condition::new("id", Operator::GtEq, Value::Int(5)).evaluate(&row, &schema));
        assert!(!Condition::new("id", Operator::Gt, Value::Int(5)).evaluate(&row, &schema));
        assert!(Condition::new("name", Operator::Gt, Value::from("a")).evaluate(&row, &schema));
        // Int sorts before Text regardless of the values
        assert!(Condition::new("id", Operator::Lt, Value::from("0")).evaluate(&row, &schema));
    }

    #[test]
    fn test_null_ordering() {
        let schema = _schema();
        let row = _row(1, Value::Null, "x");

        assert!(Condition::eq("score", Value::Null).evaluate(&row, &schema));
        assert!(Condition::new("score", Operator::Lt, Value::Float(-1e9)).evaluate(&row, &schema));
        assert!(!Condition::new("score", Operator::Gt, Value::Null).evaluate(&row, &schema));
        assert!(Condition::new("score", Operator::GtEq, Value::Null).evaluate(&row, &schema));
    }

    #[test]
    fn test_unknown_column_is_false() {
        let schema = _schema();
        let row = _row(1, Value::Null, "x");

        assert!(!Condition::eq("age", Value::Int(1)).evaluate(&row, &schema));
        assert!(!Condition::new("age", Operator::NotEq, Value::Int(1)).evaluate(&row, &schema));
    }

    #[test]
    fn test_matches_all() {
        let schema = _schema();
        let row = _row(3, Value::Float(0.5), "c");

        assert!(matches_all(&row, &schema, &[]));
        assert!(matches_all(
            &row,
            &schema,
            &[
                Condition::new("id", Operator::Gt, Value::Int(1)),
                Condition::eq("name", Value::from("c")),
            ]
        ));
        assert!(!matches_all(
            &row,
            &schema,
            &[
                Condition::new("id", Operator::Gt, Value::Int(1)),
                Condition::eq("name", Value::from("d")),
            ]
        ));
    }
}
