//! Row filters for `Dataset::filter`.

use std::fmt;

use crate::value::{Row, Value};

/// Selection criteria for a dataset view.
pub enum Criteria {
    /// Every listed field equals the given value. A field missing from a row
    /// is treated as `Null`.
    Eq(Row),
    /// Arbitrary predicate over a row.
    Predicate(Box<dyn Fn(&Row) -> bool>),
}

impl Criteria {
    /// Matches rows whose fields equal every value in `fields`.
    pub fn eq(fields: Row) -> Self {
        Criteria::Eq(fields)
    }

    /// Matches rows accepted by `predicate`.
    ///
    /// The predicate runs while the store is being read, so it must not
    /// write to the store; doing so fails with `StoreBusy`.
    pub fn matching(predicate: impl Fn(&Row) -> bool + 'static) -> Self {
        Criteria::Predicate(Box::new(predicate))
    }

    pub(crate) fn matches(&self, row: &Row) -> bool {
        match self {
            Criteria::Eq(fields) => fields
                .iter()
                .all(|(field, expected)| row.get(field).unwrap_or(&Value::Null) == expected),
            Criteria::Predicate(predicate) => predicate(row),
        }
    }
}

impl From<Row> for Criteria {
    fn from(fields: Row) -> Self {
        Criteria::Eq(fields)
    }
}

impl fmt::Debug for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criteria::Eq(fields) => f.debug_tuple("Eq").field(fields).finish(),
            Criteria::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}
