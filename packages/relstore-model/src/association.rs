//! Association declarations and their resolved form.
//!
//! An [`Association`] is what a kind declares; names it leaves unset are
//! filled from [`conventions`](crate::conventions) when the registry is
//! built, producing a [`ResolvedAssociation`] with a typed target.

use std::fmt;

use crate::conventions;
use crate::kind::KindId;

/// Cardinality of an association.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationKind {
    /// This row holds a foreign key to one target row
    ManyToOne,
    /// Target rows hold a foreign key to this row
    OneToMany,
    /// Rows are linked through a join table
    ManyToMany,
}

impl AssociationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssociationKind::ManyToOne => "many_to_one",
            AssociationKind::OneToMany => "one_to_many",
            AssociationKind::ManyToMany => "many_to_many",
        }
    }

    /// Returns whether the association yields many models.
    pub fn is_collection(&self) -> bool {
        !matches!(self, AssociationKind::ManyToOne)
    }
}

impl fmt::Display for AssociationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared association with optional explicit names.
#[derive(Debug, Clone, PartialEq)]
pub struct Association {
    pub name: String,
    pub kind: AssociationKind,
    pub target: Option<String>,
    pub key: Option<String>,
    pub join_table: Option<String>,
    pub left_key: Option<String>,
    pub right_key: Option<String>,
}

impl Association {
    fn new(name: &str, kind: AssociationKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            target: None,
            key: None,
            join_table: None,
            left_key: None,
            right_key: None,
        }
    }

    pub fn many_to_one(name: &str) -> Self {
        Self::new(name, AssociationKind::ManyToOne)
    }

    pub fn one_to_many(name: &str) -> Self {
        Self::new(name, AssociationKind::OneToMany)
    }

    pub fn many_to_many(name: &str, join_table: &str) -> Self {
        let mut association = Self::new(name, AssociationKind::ManyToMany);
        association.join_table = Some(join_table.to_string());
        association
    }

    /// Target kind name, overriding the one derived from the association name.
    pub fn target(mut self, kind: &str) -> Self {
        self.target = Some(kind.to_string());
        self
    }

    /// Foreign key column, on this row (many-to-one) or on target rows
    /// (one-to-many).
    pub fn key(mut self, column: &str) -> Self {
        self.key = Some(column.to_string());
        self
    }

    /// Join table column referring to this row.
    pub fn left_key(mut self, column: &str) -> Self {
        self.left_key = Some(column.to_string());
        self
    }

    /// Join table column referring to target rows.
    pub fn right_key(mut self, column: &str) -> Self {
        self.right_key = Some(column.to_string());
        self
    }

    /// Kind name this association points at.
    pub fn target_name(&self) -> String {
        self.target
            .clone()
            .unwrap_or_else(|| conventions::target_kind(&self.name))
    }

    /// Fills in every unset name and binds the target kind.
    pub(crate) fn resolve(&self, owner: &str, target: KindId) -> ResolvedAssociation {
        let link = match self.kind {
            AssociationKind::ManyToOne => Link::ManyToOne {
                foreign_key: self
                    .key
                    .clone()
                    .unwrap_or_else(|| format!("{}_id", self.name)),
            },
            AssociationKind::OneToMany => Link::OneToMany {
                foreign_key: self
                    .key
                    .clone()
                    .unwrap_or_else(|| conventions::foreign_key(owner)),
            },
            AssociationKind::ManyToMany => Link::ManyToMany {
                join_table: self
                    .join_table
                    .clone()
                    .unwrap_or_else(|| conventions::join_table(owner, &self.name)),
                left_key: self
                    .left_key
                    .clone()
                    .unwrap_or_else(|| conventions::foreign_key(owner)),
                right_key: self
                    .right_key
                    .clone()
                    .unwrap_or_else(|| format!("{}_id", conventions::singularize(&self.name))),
            },
        };
        ResolvedAssociation {
            name: self.name.clone(),
            target,
            link,
        }
    }
}

/// Association with every name fixed and the target bound to a kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAssociation {
    pub name: String,
    pub target: KindId,
    pub link: Link,
}

impl ResolvedAssociation {
    pub fn kind(&self) -> AssociationKind {
        match self.link {
            Link::ManyToOne { .. } => AssociationKind::ManyToOne,
            Link::OneToMany { .. } => AssociationKind::OneToMany,
            Link::ManyToMany { .. } => AssociationKind::ManyToMany,
        }
    }
}

/// How rows of two kinds are matched.
#[derive(Debug, Clone, PartialEq)]
pub enum Link {
    ManyToOne {
        foreign_key: String,
    },
    OneToMany {
        foreign_key: String,
    },
    ManyToMany {
        join_table: String,
        left_key: String,
        right_key: String,
    },
}
