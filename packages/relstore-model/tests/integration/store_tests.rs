//! Store kind (a shop holding inventory).

use ntest::timeout;
use relstore_core::{row, Value};

use super::helpers::{isolated, text};

#[timeout(5000)]
#[test]
fn test_has_seeded_stores() {
    isolated(|c| {
        assert_eq!(c.registry.all_of(c.store)?.len(), 2);
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_requires_name_city_and_address() {
    isolated(|c| {
        for (attrs, missing) in [
            (row! { "city" => "Test", "address" => "123 Lane" }, "name"),
            (row! { "name" => "Nameless", "address" => "123 Lane" }, "city"),
            (row! { "name" => "Nameless", "city" => "Test" }, "address"),
        ] {
            let mut shop = c.registry.build(c.store, attrs)?;
            assert!(!shop.is_valid()?);
            assert!(shop.errors().has(missing), "expected error on {}", missing);
        }
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_enforces_name_uniqueness() {
    isolated(|c| {
        let mut shop = c.registry.build(
            c.store,
            row! { "name" => "Central Books", "city" => "NY", "address" => "Elsewhere" },
        )?;
        assert!(!shop.is_valid()?);
        assert_eq!(shop.errors().on("name"), ["is already taken"]);
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_creates_updates_and_deletes() {
    isolated(|c| {
        c.registry.create(
            c.store,
            row! { "name" => "Corner Shop", "city" => "Paris", "address" => "7 Rue de Test" },
        )?;
        let corner = c
            .registry
            .first_of(c.store, row! { "name" => "Corner Shop" })?
            .unwrap();
        assert_eq!(text(&corner, "city"), "Paris");

        let mut central = c
            .registry
            .first_of(c.store, row! { "name" => "Central Books" })?
            .unwrap();
        central.update(row! { "manager" => "Carol" })?;
        // Saving an unchanged name does not collide with itself
        assert!(central.errors().is_empty());
        let reloaded = c
            .registry
            .first_of(c.store, row! { "name" => "Central Books" })?
            .unwrap();
        assert_eq!(text(&reloaded, "manager"), "Carol");

        let before = c.registry.all_of(c.store)?.len();
        corner.delete()?;
        assert_eq!(c.registry.all_of(c.store)?.len(), before - 1);
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_lists_inventories_and_groups_by_city() {
    isolated(|c| {
        let central = c
            .registry
            .first_of(c.store, row! { "name" => "Central Books" })?
            .unwrap();
        assert_eq!(central.related_many("inventories")?.len(), 2);

        let mut cities: Vec<Value> = c
            .registry
            .dataset(c.store)?
            .group_and_count("city")?
            .into_iter()
            .map(|(city, _)| city)
            .collect();
        cities.sort_by(|a, b| a.sort_cmp(b));
        assert_eq!(cities, vec![Value::from("London"), Value::from("New York")]);
        Ok(())
    });
}
