//! Model instances: a buffered row plus validation and associations.

use relstore_core::{row, Criteria, Row, Value};
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::association::{Link, ResolvedAssociation};
use crate::error::{ModelError, Result};
use crate::kind::KindId;
use crate::registry::Registry;
use crate::validation::{FieldErrors, RuleContext};

static NULL: Value = Value::Null;

/// One entity of a registered kind.
///
/// Field changes live in the model's buffer until [`Model::save`]. Models
/// read from the store are copies; two models of the same row do not see
/// each other's unsaved changes.
#[derive(Debug, Clone)]
pub struct Model {
    registry: Registry,
    kind: KindId,
    values: Row,
    errors: FieldErrors,
}

impl Model {
    pub(crate) fn from_row(registry: Registry, kind: KindId, values: Row) -> Self {
        Self {
            registry,
            kind,
            values,
            errors: FieldErrors::new(),
        }
    }

    pub fn kind(&self) -> KindId {
        self.kind
    }

    pub fn kind_name(&self) -> &str {
        self.registry.kind_name(self.kind).unwrap_or_default()
    }

    /// Value of `field` in the buffer, `Null` if unset.
    pub fn get(&self, field: &str) -> &Value {
        self.values.get(field).unwrap_or(&NULL)
    }

    /// Sets `field` in the buffer.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.values.insert(field.to_string(), value.into());
        self
    }

    /// Primary key, once the model has been saved.
    pub fn id(&self) -> Option<i64> {
        let entry = self.registry.entry(self.kind).ok()?;
        self.get(&entry.primary_key).as_i64()
    }

    pub fn values(&self) -> &Row {
        &self.values
    }

    pub fn is_new(&self) -> bool {
        self.id().is_none()
    }

    /// Errors from the last validity check.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Clears previous errors and reruns every rule of the kind.
    pub fn is_valid(&mut self) -> Result<bool> {
        self.errors.clear();
        let entry = self.registry.entry(self.kind)?;
        let dataset = self.registry.store().dataset(&entry.table);
        let ctx = RuleContext {
            values: &self.values,
            dataset: &dataset,
            primary_key: &entry.primary_key,
        };
        for rule in &entry.rules {
            rule.check(&ctx, &mut self.errors)?;
        }
        Ok(self.errors.is_empty())
    }

    /// Validates, then inserts a new row or updates the existing one.
    ///
    /// A new model takes the key assigned by the store.
    ///
    /// # Errors
    /// - `Save` carrying the field errors if the model is invalid.
    /// - `NotFound` if the model has a key but its row was deleted.
    pub fn save(&mut self) -> Result<()> {
        if !self.is_valid()? {
            debug!(kind = self.kind_name(), errors = %self.errors, "validation failed");
            return Err(ModelError::Save {
                kind: self.kind_name().to_string(),
                errors: self.errors.clone(),
            });
        }

        let entry = self.registry.entry(self.kind)?;
        let dataset = self.registry.store().dataset(&entry.table);
        let primary_key = entry.primary_key.as_str();

        match self.get(primary_key).as_i64() {
            None => {
                if let Some(key) = dataset.insert(self.values.clone())? {
                    if self.values.contains_key(primary_key) {
                        self.values.insert(primary_key.to_string(), Value::Integer(key));
                    } else {
                        self.values
                            .shift_insert(0, primary_key.to_string(), Value::Integer(key));
                    }
                    debug!(kind = %entry.name, id = key, "created");
                }
            }
            Some(id) => {
                let updated = dataset
                    .filter(row! { primary_key => id })?
                    .update(self.values.clone())?;
                if updated == 0 {
                    return Err(ModelError::NotFound {
                        kind: entry.name.clone(),
                        id,
                    });
                }
                debug!(kind = %entry.name, id, "saved");
            }
        }
        Ok(())
    }

    /// Merges `attrs` into the buffer and saves.
    pub fn update(&mut self, attrs: Row) -> Result<()> {
        self.values.extend(attrs);
        self.save()
    }

    /// Removes the model's row. The buffer is left as it was.
    ///
    /// # Returns
    /// Number of rows removed; 0 for an unsaved or already deleted model.
    pub fn delete(&self) -> Result<usize> {
        let Some(id) = self.id() else {
            return Ok(0);
        };
        let entry = self.registry.entry(self.kind)?;
        let removed = self
            .registry
            .store()
            .dataset(&entry.table)
            .filter(row! { entry.primary_key.as_str() => id })?
            .delete()?;
        debug!(kind = %entry.name, id, removed, "deleted");
        Ok(removed)
    }

    fn association(&self, name: &str) -> Result<&ResolvedAssociation> {
        let entry = self.registry.entry(self.kind)?;
        entry
            .associations
            .get(name)
            .ok_or_else(|| ModelError::UnknownAssociation {
                kind: entry.name.clone(),
                name: name.to_string(),
            })
    }

    fn mismatch(&self, association: &ResolvedAssociation, expected: &'static str) -> ModelError {
        ModelError::AssociationMismatch {
            kind: self.kind_name().to_string(),
            name: association.name.clone(),
            expected,
            actual: association.kind().as_str(),
        }
    }

    /// Resolves a many-to-one association.
    ///
    /// Returns `None` when the foreign key is unset or no target row has it.
    pub fn related_one(&self, name: &str) -> Result<Option<Model>> {
        let association = self.association(name)?;
        let Link::ManyToOne { foreign_key } = &association.link else {
            return Err(self.mismatch(association, "many_to_one"));
        };

        let key = self.get(foreign_key);
        if key.is_null() {
            return Ok(None);
        }
        let target_key = &self.registry.entry(association.target)?.primary_key;
        self.registry
            .first_of(association.target, row! { target_key => key.clone() })
    }

    /// Resolves a one-to-many or many-to-many association.
    ///
    /// Returns no models for an unsaved model.
    pub fn related_many(&self, name: &str) -> Result<Vec<Model>> {
        let association = self.association(name)?;
        let Some(id) = self.id() else {
            return Ok(Vec::new());
        };

        match &association.link {
            Link::OneToMany { foreign_key } => self
                .registry
                .filter(association.target, row! { foreign_key => id }),
            Link::ManyToMany {
                join_table,
                left_key,
                right_key,
            } => {
                let linked = self
                    .registry
                    .store()
                    .dataset(join_table)
                    .filter(row! { left_key => id })?
                    .pluck(right_key)?;
                let target_key = self.registry.entry(association.target)?.primary_key.clone();
                self.registry.filter(
                    association.target,
                    Criteria::matching(move |row| {
                        linked.contains(row.get(&target_key).unwrap_or(&Value::Null))
                    }),
                )
            }
            Link::ManyToOne { .. } => Err(self.mismatch(association, "one_to_many or many_to_many")),
        }
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}
