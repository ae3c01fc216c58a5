//! Publisher kind.

use ntest::timeout;
use relstore_core::{row, Value};

use super::helpers::{isolated, text};

#[timeout(5000)]
#[test]
fn test_loads_seeded_publishers() {
    isolated(|c| {
        assert_eq!(c.registry.all_of(c.publisher)?.len(), 2);
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_validations() {
    isolated(|c| {
        let mut unnamed = c
            .registry
            .build(c.publisher, row! { "country" => "USA", "founded_year" => 2000 })?;
        assert!(!unnamed.is_valid()?);
        assert!(unnamed.errors().has("name"));

        let mut duplicate = c.registry.build(
            c.publisher,
            row! { "name" => "Penguin Books", "country" => "USA", "founded_year" => 2001 },
        )?;
        assert!(!duplicate.is_valid()?);

        let mut ancient = c.registry.build(
            c.publisher,
            row! { "name" => "Ancient", "country" => "Egypt", "founded_year" => 1000 },
        )?;
        assert!(!ancient.is_valid()?);
        assert_eq!(ancient.errors().on("founded_year"), ["is too small"]);
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_creates_updates_and_deletes() {
    isolated(|c| {
        c.registry.create(
            c.publisher,
            row! {
                "name" => "Orbit",
                "country" => "USA",
                "founded_year" => 1974,
                "website" => "https://example.com",
            },
        )?;
        let orbit = c
            .registry
            .first_of(c.publisher, row! { "name" => "Orbit" })?
            .unwrap();
        assert_eq!(text(&orbit, "country"), "USA");

        let mut harper = c
            .registry
            .first_of(c.publisher, row! { "name" => "HarperCollins" })?
            .unwrap();
        harper.update(row! { "website" => "https://updated.example.com" })?;
        let reloaded = c
            .registry
            .first_of(c.publisher, row! { "name" => "HarperCollins" })?
            .unwrap();
        assert_eq!(text(&reloaded, "website"), "https://updated.example.com");

        let before = c.registry.all_of(c.publisher)?.len();
        orbit.delete()?;
        assert_eq!(c.registry.all_of(c.publisher)?.len(), before - 1);
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_has_many_books() {
    isolated(|c| {
        let penguin = c
            .registry
            .first_of(c.publisher, row! { "name" => "Penguin Books" })?
            .unwrap();
        assert_eq!(penguin.related_many("books")?.len(), 1);
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_groups_and_orders() {
    isolated(|c| {
        let publishers = c.registry.dataset(c.publisher)?;
        let grouped = publishers.group_and_count("country")?;
        assert!(grouped.contains(&(Value::from("UK"), 1)));

        let ordered = publishers.order_by("founded_year")?.pluck("name")?;
        assert_eq!(ordered.first(), Some(&Value::from("Penguin Books")));
        Ok(())
    });
}
