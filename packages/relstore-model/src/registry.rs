//! Kind registry and the model query surface.
//!
//! Kinds are registered once at startup through [`RegistryBuilder`]. Building
//! the registry checks every table, rule field, and association against the
//! store schema, so a bad declaration fails there rather than on first use.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use relstore_core::{row, Criteria, Dataset, DbError, Row, Store, TableSchema};
use tracing::debug;

use crate::association::{Link, ResolvedAssociation};
use crate::error::{ModelError, Result};
use crate::kind::{KindId, ModelKind};
use crate::model::Model;
use crate::validation::Rule;

/// Registered kind with every name resolved.
#[derive(Debug)]
pub(crate) struct KindEntry {
    pub name: String,
    pub table: String,
    pub primary_key: String,
    pub rules: Vec<Rule>,
    pub associations: IndexMap<String, ResolvedAssociation>,
}

/// Collects kind declarations for a store.
#[derive(Debug)]
pub struct RegistryBuilder {
    store: Store,
    kinds: Vec<ModelKind>,
}

impl RegistryBuilder {
    pub fn new(store: &Store) -> Self {
        Self {
            store: store.clone(),
            kinds: Vec::new(),
        }
    }

    pub fn kind(mut self, kind: ModelKind) -> Self {
        self.kinds.push(kind);
        self
    }

    /// Resolves every declaration against the store schema.
    ///
    /// # Errors
    /// - `DuplicateKind` if two kinds share a name.
    /// - `UnknownKind` if an association targets an unregistered kind.
    /// - `Db(TableNotFound | FieldNotFound)` if a table, rule field, or
    ///   association key column does not exist.
    /// - `Db(InvalidSchema)` if a kind's table has no primary key.
    pub fn build(self) -> Result<Registry> {
        let mut by_name = HashMap::with_capacity(self.kinds.len());
        for (i, kind) in self.kinds.iter().enumerate() {
            if by_name.insert(kind.name().to_string(), KindId(i)).is_some() {
                return Err(ModelError::DuplicateKind(kind.name().to_string()));
            }
        }

        let schemas = self
            .kinds
            .iter()
            .map(|kind| self.store.schema_of(kind.table()))
            .collect::<std::result::Result<Vec<_>, DbError>>()?;

        let mut entries = Vec::with_capacity(self.kinds.len());
        for (kind, schema) in self.kinds.iter().zip(&schemas) {
            let primary_key = schema
                .primary_key()
                .map(|c| c.name.clone())
                .ok_or_else(|| DbError::InvalidSchema {
                    table: schema.name.clone(),
                    message: format!("kind {} needs a primary key", kind.name()),
                })?;

            for rule in kind.rules() {
                schema.require_column(rule.field())?;
            }

            let mut associations = IndexMap::new();
            for declared in kind.associations() {
                let target_name = declared.target_name();
                let target = *by_name
                    .get(&target_name)
                    .ok_or_else(|| ModelError::UnknownKind(target_name.clone()))?;
                let resolved = declared.resolve(kind.name(), target);
                self.check_link(schema, &schemas[target.0], &resolved.link)?;
                associations.insert(resolved.name.clone(), resolved);
            }

            debug!(
                kind = kind.name(),
                table = kind.table(),
                rules = kind.rules().len(),
                associations = associations.len(),
                "registered kind"
            );
            entries.push(KindEntry {
                name: kind.name().to_string(),
                table: kind.table().to_string(),
                primary_key,
                rules: kind.rules().to_vec(),
                associations,
            });
        }

        Ok(Registry {
            inner: Arc::new(RegistryInner {
                store: self.store,
                kinds: entries,
                by_name,
            }),
        })
    }

    fn check_link(&self, owner: &TableSchema, target: &TableSchema, link: &Link) -> Result<()> {
        match link {
            Link::ManyToOne { foreign_key } => {
                owner.require_column(foreign_key)?;
            }
            Link::OneToMany { foreign_key } => {
                target.require_column(foreign_key)?;
            }
            Link::ManyToMany {
                join_table,
                left_key,
                right_key,
            } => {
                let join = self.store.schema_of(join_table)?;
                join.require_column(left_key)?;
                join.require_column(right_key)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
struct RegistryInner {
    store: Store,
    kinds: Vec<KindEntry>,
    by_name: HashMap<String, KindId>,
}

/// Resolved kinds bound to a store. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

impl Registry {
    pub fn builder(store: &Store) -> RegistryBuilder {
        RegistryBuilder::new(store)
    }

    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    /// Looks up a kind by name.
    pub fn kind(&self, name: &str) -> Result<KindId> {
        self.inner
            .by_name
            .get(name)
            .copied()
            .ok_or_else(|| ModelError::UnknownKind(name.to_string()))
    }

    /// Name of a registered kind.
    pub fn kind_name(&self, kind: KindId) -> Option<&str> {
        self.inner.kinds.get(kind.0).map(|k| k.name.as_str())
    }

    /// Kind names in registration order.
    pub fn kind_names(&self) -> impl Iterator<Item = &str> {
        self.inner.kinds.iter().map(|k| k.name.as_str())
    }

    pub(crate) fn entry(&self, kind: KindId) -> Result<&KindEntry> {
        self.inner
            .kinds
            .get(kind.0)
            .ok_or_else(|| ModelError::UnknownKind(format!("#{}", kind.0)))
    }

    /// Unfiltered dataset over a kind's table.
    pub fn dataset(&self, kind: KindId) -> Result<Dataset> {
        Ok(self.store().dataset(&self.entry(kind)?.table))
    }

    fn wrap(&self, kind: KindId, rows: Vec<Row>) -> Vec<Model> {
        rows.into_iter()
            .map(|row| Model::from_row(self.clone(), kind, row))
            .collect()
    }

    /// Every row of a kind's table as a model.
    pub fn all_of(&self, kind: KindId) -> Result<Vec<Model>> {
        let rows = self.dataset(kind)?.all()?;
        Ok(self.wrap(kind, rows))
    }

    /// Models whose rows match `criteria`.
    pub fn filter(&self, kind: KindId, criteria: impl Into<Criteria>) -> Result<Vec<Model>> {
        let rows = self.dataset(kind)?.filter(criteria)?.all()?;
        Ok(self.wrap(kind, rows))
    }

    /// First model whose row matches `criteria`.
    pub fn first_of(&self, kind: KindId, criteria: impl Into<Criteria>) -> Result<Option<Model>> {
        let row = self.dataset(kind)?.filter(criteria)?.first()?;
        Ok(row.map(|row| Model::from_row(self.clone(), kind, row)))
    }

    /// Model with the given primary key.
    pub fn find(&self, kind: KindId, id: i64) -> Result<Option<Model>> {
        let primary_key = &self.entry(kind)?.primary_key;
        self.first_of(kind, row! { primary_key => id })
    }

    /// Unsaved model holding `attrs`.
    pub fn build(&self, kind: KindId, attrs: Row) -> Result<Model> {
        self.entry(kind)?;
        Ok(Model::from_row(self.clone(), kind, attrs))
    }

    /// Builds and saves a model.
    ///
    /// # Errors
    /// `Save` with the field errors if the model is invalid.
    pub fn create(&self, kind: KindId, attrs: Row) -> Result<Model> {
        let mut model = self.build(kind, attrs)?;
        model.save()?;
        Ok(model)
    }
}
