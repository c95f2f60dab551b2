//! Store-agnostic filter predicates.
//!
//! A [`RetrievalFilter`] compiles to one condition per set field. The
//! predicate renders to the LanceDB SQL filter dialect and can also be
//! evaluated in-process against [`ChunkMetadata`].

use crate::types::{ChunkMetadata, RetrievalFilter};
use std::fmt;

/// Filterable metadata column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Country,
    Year,
}

impl Field {
    pub fn column(&self) -> &'static str {
        match self {
            Field::Country => "country",
            Field::Year => "year",
        }
    }
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Gte,
    Lte,
}

impl Op {
    fn as_sql(&self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Gte => ">=",
            Op::Lte => "<=",
        }
    }
}

/// Literal compared against a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Int(i32),
}

/// One `field op value` comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub field: Field,
    pub op: Op,
    pub value: Value,
}

impl Condition {
    pub fn country_eq(country: &str) -> Self {
        Self {
            field: Field::Country,
            op: Op::Eq,
            value: Value::Text(country.to_string()),
        }
    }

    pub fn year_gte(year: i32) -> Self {
        Self {
            field: Field::Year,
            op: Op::Gte,
            value: Value::Int(year),
        }
    }

    pub fn year_lte(year: i32) -> Self {
        Self {
            field: Field::Year,
            op: Op::Lte,
            value: Value::Int(year),
        }
    }

    /// Evaluate against chunk metadata. Missing values never match.
    pub fn matches(&self, meta: &ChunkMetadata) -> bool {
        match (self.field, &self.value) {
            (Field::Country, Value::Text(expected)) => match meta.country.as_deref() {
                Some(country) => compare(self.op, country, expected.as_str()),
                None => false,
            },
            (Field::Year, Value::Int(expected)) => match meta.year {
                Some(year) => compare(self.op, &year, expected),
                None => false,
            },
            _ => false,
        }
    }
}

fn compare<T: PartialOrd + ?Sized>(op: Op, actual: &T, expected: &T) -> bool {
    match op {
        Op::Eq => actual == expected,
        Op::Gte => actual >= expected,
        Op::Lte => actual <= expected,
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::Text(text) => write!(
                f,
                "{} {} {}",
                self.field.column(),
                self.op.as_sql(),
                quote_sql_string(text)
            ),
            Value::Int(n) => write!(f, "{} {} {}", self.field.column(), self.op.as_sql(), n),
        }
    }
}

/// Quote a string literal for a LanceDB filter, doubling embedded quotes.
pub fn quote_sql_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Compiled filter predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Unconstrained,
    Single(Condition),
    And(Vec<Condition>),
}

impl Predicate {
    /// Build from conditions: none is unconstrained, one is used as-is,
    /// more become a conjunction.
    pub fn from_conditions(mut conditions: Vec<Condition>) -> Self {
        match conditions.len() {
            0 => Predicate::Unconstrained,
            1 => Predicate::Single(conditions.remove(0)),
            _ => Predicate::And(conditions),
        }
    }

    /// One condition per set filter field, in country, lower, upper order.
    pub fn from_filter(filter: &RetrievalFilter) -> Self {
        let mut conditions = Vec::with_capacity(3);
        if let Some(country) = &filter.country {
            conditions.push(Condition::country_eq(country));
        }
        if let Some(year_min) = filter.year_min {
            conditions.push(Condition::year_gte(year_min));
        }
        if let Some(year_max) = filter.year_max {
            conditions.push(Condition::year_lte(year_max));
        }
        Self::from_conditions(conditions)
    }

    pub fn conditions(&self) -> &[Condition] {
        match self {
            Predicate::Unconstrained => &[],
            Predicate::Single(condition) => std::slice::from_ref(condition),
            Predicate::And(conditions) => conditions,
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        matches!(self, Predicate::Unconstrained)
    }

    /// SQL `WHERE` expression, or `None` when unconstrained.
    pub fn to_sql(&self) -> Option<String> {
        match self {
            Predicate::Unconstrained => None,
            Predicate::Single(condition) => Some(condition.to_string()),
            Predicate::And(conditions) => Some(
                conditions
                    .iter()
                    .map(Condition::to_string)
                    .collect::<Vec<_>>()
                    .join(" AND "),
            ),
        }
    }

    pub fn matches(&self, meta: &ChunkMetadata) -> bool {
        self.conditions().iter().all(|c| c.matches(meta))
    }
}
