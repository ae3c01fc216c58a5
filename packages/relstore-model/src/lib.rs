//! Model layer for the in-memory relational store.
//!
//! Kinds declare validation rules and associations; a [`Registry`] resolves
//! them against a store at startup and exposes the query surface. Models
//! buffer a row, validate it, and resolve associations on demand with no
//! caching.

pub mod association;
pub mod bookstore;
pub mod conventions;
pub mod error;
pub mod kind;
pub mod model;
pub mod registry;
pub mod validation;

pub use association::{Association, AssociationKind, Link, ResolvedAssociation};
pub use bookstore::Bookstore;
pub use error::{ModelError, Result};
pub use kind::{KindId, ModelKind};
pub use model::Model;
pub use registry::{Registry, RegistryBuilder};
pub use validation::{FieldErrors, Rule};
