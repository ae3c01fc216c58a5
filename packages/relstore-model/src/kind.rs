//! Model kind definitions.

use crate::association::Association;
use crate::validation::Rule;

/// Typed handle to a kind registered in a [`Registry`](crate::Registry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KindId(pub(crate) usize);

/// Declaration of one entity kind: its table, validation rules, and
/// associations.
///
/// # Example
/// ```
/// use relstore_model::{Association, ModelKind, Rule};
///
/// let author = ModelKind::new("Author", "authors")
///     .validates(Rule::presence("name"))
///     .validates(Rule::numeric("birth_year").gte(1800))
///     .association(Association::one_to_many("books"));
/// assert_eq!(author.rules().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ModelKind {
    name: String,
    table: String,
    rules: Vec<Rule>,
    associations: Vec<Association>,
}

impl ModelKind {
    pub fn new(name: &str, table: &str) -> Self {
        Self {
            name: name.to_string(),
            table: table.to_string(),
            rules: Vec::new(),
            associations: Vec::new(),
        }
    }

    /// Adds a validation rule. Rules run in the order they were added.
    pub fn validates(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Declares an association.
    pub fn association(mut self, association: Association) -> Self {
        self.associations.push(association);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn associations(&self) -> &[Association] {
        &self.associations
    }
}
