//! Shared fixtures for integration tests.

use relstore_core::{Store, StoreConfig};

/// Store with `authors` and `books` tables, no rows.
pub fn library_store() -> Store {
    let store = Store::with_config(StoreConfig {
        initial_table_capacity: 8,
        ..Default::default()
    });
    store
        .define_table("authors", |t| {
            t.primary_key("id");
            t.string("name").not_null();
            t.string("country");
        })
        .unwrap();
    store
        .define_table("books", |t| {
            t.primary_key("id");
            t.string("title").not_null();
            t.string("genre");
            t.integer("pages").default(0);
            t.integer("author_id");
        })
        .unwrap();
    store
}

/// Titles of every book, in table order.
pub fn titles(store: &Store) -> Vec<String> {
    store
        .dataset("books")
        .pluck("title")
        .unwrap()
        .into_iter()
        .map(|v| v.to_string())
        .collect()
}
