//! Inventory kind, including transactional bulk updates.

use ntest::timeout;
use relstore_core::{row, DbError, TransactionOptions, Value};
use relstore_model::ModelError;

use super::helpers::{date, isolated, text};

#[timeout(5000)]
#[test]
fn test_counts_seeded_inventory_rows() {
    isolated(|c| {
        assert_eq!(c.registry.all_of(c.inventory)?.len(), 4);
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_requires_book_and_store() {
    isolated(|c| {
        let mut no_book = c.registry.build(
            c.inventory,
            row! { "store_id" => 1, "quantity" => 1, "last_restocked" => date(2025, 1, 1) },
        )?;
        assert!(!no_book.is_valid()?);
        assert!(no_book.errors().has("book_id"));

        let mut no_store = c.registry.build(
            c.inventory,
            row! { "book_id" => 1, "quantity" => 1, "last_restocked" => date(2025, 1, 1) },
        )?;
        assert!(!no_store.is_valid()?);
        assert!(no_store.errors().has("store_id"));
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_validates_non_negative_quantity() {
    isolated(|c| {
        let mut inventory = c.registry.build(
            c.inventory,
            row! {
                "book_id" => 1,
                "store_id" => 1,
                "quantity" => -1,
                "last_restocked" => date(2025, 1, 1),
            },
        )?;
        assert!(!inventory.is_valid()?);
        assert_eq!(inventory.errors().on("quantity"), ["is too small"]);
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_creates_and_updates_entries() {
    isolated(|c| {
        let record = c.registry.create(
            c.inventory,
            row! {
                "book_id" => 1,
                "store_id" => 2,
                "quantity" => 3,
                "last_restocked" => date(2025, 2, 1),
            },
        )?;
        let id = record.id().unwrap();
        let found = c.registry.find(c.inventory, id)?.unwrap();
        assert_eq!(found.get("quantity"), &Value::from(3));

        let mut existing = c
            .registry
            .first_of(c.inventory, row! { "book_id" => 2, "store_id" => 1 })?
            .unwrap();
        existing.update(row! { "quantity" => 9 })?;
        let reloaded = c
            .registry
            .first_of(c.inventory, row! { "book_id" => 2, "store_id" => 1 })?
            .unwrap();
        assert_eq!(reloaded.get("quantity"), &Value::from(9));
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_associates_to_book_and_store() {
    isolated(|c| {
        let record = c
            .registry
            .first_of(c.inventory, row! { "book_id" => 1, "store_id" => 1 })?
            .unwrap();
        assert_eq!(
            text(&record.related_one("book")?.unwrap(), "title"),
            "To Kill a Mockingbird"
        );
        assert_eq!(
            text(&record.related_one("store")?.unwrap(), "name"),
            "Central Books"
        );
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_bulk_update_in_transaction() {
    isolated(|c| {
        let store = c.registry.store();
        let result = store.transaction(|_| {
            for mut inventory in c.registry.filter(c.inventory, row! { "book_id" => 2 })? {
                let quantity = inventory.get("quantity").as_i64().unwrap_or(0);
                inventory.update(row! { "quantity" => quantity + 1 })?;
            }
            Ok::<_, ModelError>("done")
        })?;
        assert_eq!(result, Some("done"));

        let quantities: Vec<Value> = c
            .registry
            .filter(c.inventory, row! { "book_id" => 2 })?
            .iter()
            .map(|i| i.get("quantity").clone())
            .collect();
        assert_eq!(quantities, vec![Value::from(4), Value::from(8)]);
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_failed_bulk_update_restores_every_row() {
    isolated(|c| {
        let store = c.registry.store();
        let err = store
            .transaction(|_| {
                for mut inventory in c.registry.all_of(c.inventory)? {
                    // The last row fails validation after the others saved
                    let quantity = if inventory.id() == Some(4) { -1 } else { 100 };
                    inventory.update(row! { "quantity" => quantity })?;
                }
                Ok::<_, ModelError>(())
            })
            .unwrap_err();
        assert!(matches!(err, ModelError::Save { .. }));

        let total: i64 = c
            .registry
            .all_of(c.inventory)?
            .iter()
            .filter_map(|i| i.get("quantity").as_i64())
            .sum();
        assert_eq!(total, 5 + 3 + 7 + 4);
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_always_rollback_discards_creation() {
    isolated(|c| {
        let store = c.registry.store();
        let initial = c.registry.all_of(c.inventory)?.len();
        let outcome = store.transaction_with(TransactionOptions::always_rollback(), |_| {
            c.registry.create(
                c.inventory,
                row! {
                    "book_id" => 1,
                    "store_id" => 1,
                    "quantity" => 1,
                    "last_restocked" => date(2025, 3, 1),
                },
            )?;
            Ok::<_, ModelError>(())
        })?;
        assert_eq!(outcome, None);
        assert_eq!(c.registry.all_of(c.inventory)?.len(), initial);

        // An explicit rollback signal from model code is also honoured
        let signalled = store.transaction(|_| {
            c.registry.create(
                c.inventory,
                row! { "book_id" => 3, "store_id" => 1, "quantity" => 2 },
            )?;
            Err::<(), _>(ModelError::Db(DbError::Rollback))
        })?;
        assert_eq!(signalled, None);
        assert_eq!(c.registry.all_of(c.inventory)?.len(), initial);
        Ok(())
    });
}
