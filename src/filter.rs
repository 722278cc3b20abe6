//! Attribute filters for locating entities in collections
//!
//! A [`Filter`] is built from attribute tests whose keys may carry an
//! operator suffix: `age__gt`, `name__contains`, `created_at__le`. A bare
//! key tests equality. Items that lack the tested attribute are excluded,
//! never errored.
//!
//! ```rust,ignore
//! let group = Filter::new()
//!     .test("name__contains", "book club")?
//!     .find(&groups)?;
//! ```

use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// Comparison operator for one attribute test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Less than
    Lt,
    /// Greater than
    Gt,
    /// Less than or equal
    Le,
    /// Greater than or equal
    Ge,
    /// Equal
    Eq,
    /// Not equal
    Ne,
    /// Substring or array membership
    Contains,
}

impl Op {
    /// Split a key into its attribute name and operator.
    ///
    /// The suffix only counts when the `__` separator sits strictly inside
    /// the key, so attribute names that start or end with underscores stay
    /// intact. A suffix that is not a known operator is an error.
    pub fn split(key: &str) -> Result<(&str, Op)> {
        if let Some(idx) = key.rfind("__") {
            if idx > 0 && idx + 2 < key.len() {
                let (attr, suffix) = (&key[..idx], &key[idx + 2..]);
                let op = match suffix {
                    "lt" => Op::Lt,
                    "gt" => Op::Gt,
                    "le" => Op::Le,
                    "ge" => Op::Ge,
                    "eq" => Op::Eq,
                    "ne" => Op::Ne,
                    "contains" => Op::Contains,
                    other => return Err(Error::invalid_operator(other)),
                };
                return Ok((attr, op));
            }
        }
        Ok((key, Op::Eq))
    }

    fn suffix(self) -> &'static str {
        match self {
            Op::Lt => "lt",
            Op::Gt => "gt",
            Op::Le => "le",
            Op::Ge => "ge",
            Op::Eq => "eq",
            Op::Ne => "ne",
            Op::Contains => "contains",
        }
    }
}

/// One attribute test: attribute name, operator, reference value
#[derive(Debug, Clone)]
pub struct AttrTest {
    attr: String,
    op: Op,
    value: Value,
}

impl AttrTest {
    /// Whether the given JSON object passes this test.
    ///
    /// Objects missing the attribute fail the test rather than erroring.
    fn matches(&self, object: &Value) -> bool {
        let Some(field) = object.get(&self.attr) else {
            return false;
        };
        match self.op {
            Op::Eq => field == &self.value,
            Op::Ne => field != &self.value,
            Op::Lt => compare(field, &self.value) == Some(Ordering::Less),
            Op::Gt => compare(field, &self.value) == Some(Ordering::Greater),
            Op::Le => matches!(
                compare(field, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Op::Ge => matches!(
                compare(field, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Op::Contains => contains(field, &self.value),
        }
    }
}

impl fmt::Display for AttrTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}__{}={}", self.attr, self.op.suffix(), self.value)
    }
}

/// A conjunction of attribute tests
#[derive(Debug, Clone, Default)]
pub struct Filter {
    tests: Vec<AttrTest>,
}

impl Filter {
    /// Create an empty filter (matches everything)
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a test. The key may carry an operator suffix; an unknown suffix
    /// fails here, before the filter ever sees a collection.
    pub fn test(mut self, key: &str, value: impl Into<Value>) -> Result<Self> {
        let (attr, op) = Op::split(key)?;
        self.tests.push(AttrTest {
            attr: attr.to_string(),
            op,
            value: value.into(),
        });
        Ok(self)
    }

    /// Whether an item passes every test
    pub fn matches<T: Serialize>(&self, item: &T) -> bool {
        match serde_json::to_value(item) {
            Ok(object) => self.tests.iter().all(|test| test.matches(&object)),
            Err(_) => false,
        }
    }

    /// Keep only the items that pass every test
    pub fn apply<'x, T: Serialize>(&self, items: &'x [T]) -> Vec<&'x T> {
        items.iter().filter(|item| self.matches(item)).collect()
    }

    /// Find the single item matching every test.
    ///
    /// Zero matches or more than one are errors carrying the tests (and the
    /// match count) for diagnostics.
    pub fn find<'x, T: Serialize>(&self, items: &'x [T]) -> Result<&'x T> {
        let matches = self.apply(items);
        match matches.as_slice() {
            [] => Err(Error::NoMatches {
                tests: self.describe(),
            }),
            [only] => Ok(*only),
            many => Err(Error::MultipleMatches {
                tests: self.describe(),
                count: many.len(),
            }),
        }
    }

    fn describe(&self) -> String {
        self.tests
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Order two JSON scalars of the same kind; mixed kinds do not compare
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Substring test for strings, membership test for arrays
fn contains(field: &Value, value: &Value) -> bool {
    match (field, value) {
        (Value::String(haystack), Value::String(needle)) => haystack.contains(needle.as_str()),
        (Value::Array(entries), needle) => entries.contains(needle),
        _ => false,
    }
}
