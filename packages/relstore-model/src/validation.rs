//! Declarative validation rules and the per-field error map.

use std::fmt;

use indexmap::IndexMap;
use relstore_core::{row, Dataset, DbError, Row, Value};
use serde::Serialize;

static NULL: Value = Value::Null;

/// Validation messages keyed by field, in the order fields first failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors {
    fields: IndexMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message to a field's error list.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Messages recorded for `field`; empty if it passed.
    pub fn on(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, field: &str) -> bool {
        !self.on(field).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of fields with at least one error.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(f, m)| (f.as_str(), m.as_slice()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.fields {
            for message in messages {
                if !first {
                    f.write_str(", ")?;
                }
                write!(f, "{} {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// One declarative check on a model field.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// Value is present and not an empty string
    Presence(String),
    /// Displayed value has at least this many characters
    MinLength(String, usize),
    /// Value, when present, is a number within the bounds
    Numeric {
        field: String,
        gte: Option<f64>,
        lte: Option<f64>,
    },
    /// No other row of the kind's table holds the same value
    Unique(String),
    /// Value is one of the listed values
    Inclusion { field: String, allowed: Vec<Value> },
}

impl Rule {
    pub fn presence(field: &str) -> Self {
        Rule::Presence(field.to_string())
    }

    pub fn min_length(field: &str, length: usize) -> Self {
        Rule::MinLength(field.to_string(), length)
    }

    /// Numeric check without bounds; chain [`Rule::gte`] / [`Rule::lte`].
    pub fn numeric(field: &str) -> Self {
        Rule::Numeric {
            field: field.to_string(),
            gte: None,
            lte: None,
        }
    }

    pub fn unique(field: &str) -> Self {
        Rule::Unique(field.to_string())
    }

    pub fn inclusion<V: Into<Value>>(field: &str, allowed: impl IntoIterator<Item = V>) -> Self {
        Rule::Inclusion {
            field: field.to_string(),
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    /// Sets the lower bound of a numeric rule. Other rules are unchanged.
    pub fn gte(mut self, bound: impl Into<f64>) -> Self {
        if let Rule::Numeric { gte, .. } = &mut self {
            *gte = Some(bound.into());
        }
        self
    }

    /// Sets the upper bound of a numeric rule. Other rules are unchanged.
    pub fn lte(mut self, bound: impl Into<f64>) -> Self {
        if let Rule::Numeric { lte, .. } = &mut self {
            *lte = Some(bound.into());
        }
        self
    }

    /// Field the rule applies to.
    pub fn field(&self) -> &str {
        match self {
            Rule::Presence(field)
            | Rule::MinLength(field, _)
            | Rule::Unique(field)
            | Rule::Numeric { field, .. }
            | Rule::Inclusion { field, .. } => field,
        }
    }

    /// Runs the rule against `ctx`, appending any violations to `errors`.
    pub(crate) fn check(&self, ctx: &RuleContext<'_>, errors: &mut FieldErrors) -> Result<(), DbError> {
        let field = self.field();
        let value = ctx.values.get(field).unwrap_or(&NULL);

        match self {
            Rule::Presence(_) => {
                if value.is_blank() {
                    errors.add(field, "cannot be empty");
                }
            }
            Rule::MinLength(_, length) => {
                if value.is_null() || value.to_string().chars().count() < *length {
                    errors.add(field, format!("must be at least {} characters", length));
                }
            }
            Rule::Numeric { gte, lte, .. } => {
                if value.is_null() {
                    return Ok(());
                }
                let Some(number) = value.as_f64() else {
                    errors.add(field, "is not a number");
                    return Ok(());
                };
                if gte.is_some_and(|min| number < min) {
                    errors.add(field, "is too small");
                }
                if lte.is_some_and(|max| number > max) {
                    errors.add(field, "is too large");
                }
            }
            Rule::Unique(_) => {
                // Absent values never collide
                if value.is_null() {
                    return Ok(());
                }
                let own_key = ctx.values.get(ctx.primary_key).unwrap_or(&NULL);
                let taken = ctx
                    .dataset
                    .filter(row! { field => value.clone() })?
                    .all()?
                    .iter()
                    .any(|other| other.get(ctx.primary_key).unwrap_or(&NULL) != own_key);
                if taken {
                    errors.add(field, "is already taken");
                }
            }
            Rule::Inclusion { allowed, .. } => {
                if !allowed.contains(value) {
                    errors.add(field, "is not included in the list");
                }
            }
        }
        Ok(())
    }
}

/// What a rule needs to see: the model's buffer and its table.
pub(crate) struct RuleContext<'a> {
    pub values: &'a Row,
    pub dataset: &'a Dataset,
    pub primary_key: &'a str,
}
