//! Bookstore catalog: table definitions, model kinds, and seed loading.

use std::path::Path;

use relstore_core::{BulkLoader, LoadReport, Store};

use crate::association::Association;
use crate::error::Result;
use crate::kind::{KindId, ModelKind};
use crate::registry::{Registry, RegistryBuilder};
use crate::validation::Rule;

/// Catalog tables in seed load order. Referenced tables come first.
pub const TABLES: [&str; 7] = [
    "authors",
    "publishers",
    "genres",
    "books",
    "stores",
    "book_genres",
    "inventories",
];

/// Defines every catalog table.
pub fn define_schema(store: &Store) -> relstore_core::Result<()> {
    store.define_table("authors", |t| {
        t.primary_key("id");
        t.string("name").not_null();
        t.string("country").not_null();
        t.integer("birth_year").not_null();
        t.string("biography").not_null();
    })?;
    store.define_table("publishers", |t| {
        t.primary_key("id");
        t.string("name").not_null();
        t.string("country").not_null();
        t.integer("founded_year").not_null();
        t.string("website");
    })?;
    store.define_table("genres", |t| {
        t.primary_key("id");
        t.string("name").not_null();
        t.string("description").not_null();
        t.string("shelf_code");
    })?;
    store.define_table("books", |t| {
        t.primary_key("id");
        t.string("title").not_null();
        t.decimal("price").not_null();
        t.date("publication_date").not_null();
        t.string("isbn").not_null();
        t.integer("page_count").not_null();
        t.integer("author_id").not_null();
        t.integer("publisher_id").not_null();
    })?;
    store.define_table("stores", |t| {
        t.primary_key("id");
        t.string("name").not_null();
        t.string("city").not_null();
        t.string("address").not_null();
        t.string("manager");
    })?;
    store.define_table("book_genres", |t| {
        t.primary_key("id");
        t.integer("book_id").not_null();
        t.integer("genre_id").not_null();
    })?;
    store.define_table("inventories", |t| {
        t.primary_key("id");
        t.integer("book_id").not_null();
        t.integer("store_id").not_null();
        t.integer("quantity").not_null();
        t.date("last_restocked").not_null();
    })?;
    Ok(())
}

/// Kind declarations for the catalog.
pub fn kinds() -> Vec<ModelKind> {
    vec![
        ModelKind::new("Author", "authors")
            .validates(Rule::presence("name"))
            .validates(Rule::presence("country"))
            .validates(Rule::presence("biography"))
            .validates(Rule::min_length("biography", 10))
            .validates(Rule::unique("name"))
            .validates(Rule::numeric("birth_year").gte(1800))
            .association(Association::one_to_many("books").target("Book").key("author_id")),
        ModelKind::new("Publisher", "publishers")
            .validates(Rule::presence("name"))
            .validates(Rule::presence("country"))
            .validates(Rule::numeric("founded_year").gte(1400))
            .validates(Rule::min_length("name", 3))
            .validates(Rule::unique("name"))
            .association(Association::one_to_many("books").target("Book").key("publisher_id")),
        ModelKind::new("Genre", "genres")
            .validates(Rule::presence("name"))
            .validates(Rule::presence("description"))
            .validates(Rule::min_length("description", 5))
            .validates(Rule::unique("name"))
            .association(
                Association::one_to_many("book_genres")
                    .target("BookGenre")
                    .key("genre_id"),
            ),
        ModelKind::new("Book", "books")
            .validates(Rule::presence("title"))
            .validates(Rule::presence("isbn"))
            .validates(Rule::presence("publication_date"))
            .validates(Rule::numeric("price").gte(0))
            .validates(Rule::numeric("page_count").gte(1))
            .validates(Rule::min_length("title", 3))
            .validates(Rule::unique("isbn"))
            .association(Association::many_to_one("author"))
            .association(Association::many_to_one("publisher"))
            .association(Association::many_to_many("genres", "book_genres").right_key("genre_id"))
            .association(
                Association::one_to_many("inventories")
                    .target("Inventory")
                    .key("book_id"),
            ),
        ModelKind::new("Store", "stores")
            .validates(Rule::presence("name"))
            .validates(Rule::presence("city"))
            .validates(Rule::presence("address"))
            .validates(Rule::min_length("name", 3))
            .validates(Rule::unique("name"))
            .association(
                Association::one_to_many("inventories")
                    .target("Inventory")
                    .key("store_id"),
            ),
        ModelKind::new("BookGenre", "book_genres")
            .validates(Rule::presence("book_id"))
            .validates(Rule::presence("genre_id"))
            .association(Association::many_to_one("book"))
            .association(Association::many_to_one("genre")),
        ModelKind::new("Inventory", "inventories")
            .validates(Rule::presence("book_id"))
            .validates(Rule::presence("store_id"))
            .validates(Rule::numeric("quantity").gte(0))
            .association(Association::many_to_one("book"))
            .association(Association::many_to_one("store")),
    ]
}

/// Catalog registry with a typed handle per kind.
#[derive(Debug, Clone)]
pub struct Bookstore {
    pub registry: Registry,
    pub author: KindId,
    pub publisher: KindId,
    pub genre: KindId,
    pub book: KindId,
    /// The `Store` kind: a shop holding inventory
    pub store: KindId,
    pub book_genre: KindId,
    pub inventory: KindId,
}

impl Bookstore {
    /// Registers the catalog kinds against a store whose schema is defined.
    pub fn register(store: &Store) -> Result<Self> {
        let registry = kinds()
            .into_iter()
            .fold(RegistryBuilder::new(store), RegistryBuilder::kind)
            .build()?;

        Ok(Self {
            author: registry.kind("Author")?,
            publisher: registry.kind("Publisher")?,
            genre: registry.kind("Genre")?,
            book: registry.kind("Book")?,
            store: registry.kind("Store")?,
            book_genre: registry.kind("BookGenre")?,
            inventory: registry.kind("Inventory")?,
            registry,
        })
    }

    /// Defines the schema, loads seed files from `seed_dir`, and registers
    /// the kinds.
    pub fn open(store: &Store, seed_dir: impl AsRef<Path>) -> Result<(Self, LoadReport)> {
        define_schema(store)?;
        let report = BulkLoader::new(store).load_dir(seed_dir, &TABLES)?;
        Ok((Self::register(store)?, report))
    }
}
