//! Book kind: validations, persistence, and associations.

use ntest::timeout;
use relstore_core::{row, Value};
use relstore_model::ModelError;

use super::helpers::{date, isolated, text};

#[timeout(5000)]
#[test]
fn test_counts_seeded_books() {
    isolated(|c| {
        assert_eq!(c.registry.all_of(c.book)?.len(), 3);
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_validates_presence_of_title() {
    isolated(|c| {
        let mut book = c.registry.build(
            c.book,
            row! {
                "price" => 1,
                "publication_date" => date(2025, 1, 1),
                "isbn" => "x",
                "page_count" => 10,
                "author_id" => 1,
                "publisher_id" => 1,
            },
        )?;
        assert!(!book.is_valid()?);
        assert!(book.errors().has("title"));
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_validates_unique_isbn() {
    isolated(|c| {
        let mut book = c.registry.build(
            c.book,
            row! {
                "title" => "Duplicate",
                "price" => 1,
                "publication_date" => date(2025, 1, 1),
                "isbn" => "9780451524935",
                "page_count" => 50,
                "author_id" => 1,
                "publisher_id" => 1,
            },
        )?;
        assert!(!book.is_valid()?);
        assert_eq!(book.errors().on("isbn"), ["is already taken"]);
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_validates_page_count_minimum() {
    isolated(|c| {
        let mut book = c.registry.build(
            c.book,
            row! {
                "title" => "Zero Pages",
                "price" => 1,
                "publication_date" => date(2025, 1, 1),
                "isbn" => "123",
                "page_count" => 0,
                "author_id" => 1,
                "publisher_id" => 1,
            },
        )?;
        assert!(!book.is_valid()?);
        assert_eq!(book.errors().on("page_count"), ["is too small"]);
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_invalid_save_reports_errors() {
    isolated(|c| {
        let err = c
            .registry
            .create(c.book, row! { "title" => "No", "price" => -2.5 })
            .unwrap_err();
        let errors = err.field_errors().unwrap();
        assert!(matches!(err, ModelError::Save { ref kind, .. } if kind == "Book"));
        assert_eq!(
            errors.on("title"),
            ["must be at least 3 characters"]
        );
        assert_eq!(errors.on("price"), ["is too small"]);
        assert!(errors.has("isbn"));
        assert!(errors.has("publication_date"));
        assert_eq!(c.registry.all_of(c.book)?.len(), 3);
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_creates_a_new_book() {
    isolated(|c| {
        let book = c.registry.create(
            c.book,
            row! {
                "title" => "New Release",
                "price" => 15.0,
                "publication_date" => date(2025, 2, 2),
                "isbn" => "1111111111",
                "page_count" => 250,
                "author_id" => 1,
                "publisher_id" => 1,
            },
        )?;
        assert_eq!(book.id(), Some(4));
        let found = c
            .registry
            .first_of(c.book, row! { "isbn" => "1111111111" })?
            .unwrap();
        assert_eq!(text(&found, "title"), "New Release");
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_updates_price() {
    isolated(|c| {
        let mut book = c.registry.first_of(c.book, row! { "title" => "1984" })?.unwrap();
        book.update(row! { "price" => 12.0 })?;
        let reloaded = c.registry.first_of(c.book, row! { "title" => "1984" })?.unwrap();
        assert_eq!(reloaded.get("price"), &Value::from(12.0));
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_deletes_a_book() {
    isolated(|c| {
        let book = c.registry.create(
            c.book,
            row! {
                "title" => "To Delete",
                "price" => 5.0,
                "publication_date" => date(2024, 1, 1),
                "isbn" => "DELETEISBN",
                "page_count" => 120,
                "author_id" => 1,
                "publisher_id" => 1,
            },
        )?;
        let before = c.registry.all_of(c.book)?.len();
        book.delete()?;
        assert_eq!(c.registry.all_of(c.book)?.len(), before - 1);
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_associates_to_author_and_publisher() {
    isolated(|c| {
        let book = c.registry.first_of(c.book, row! { "title" => "1984" })?.unwrap();
        let author = book.related_one("author")?.unwrap();
        assert_eq!(text(&author, "name"), "George Orwell");
        let publisher = book.related_one("publisher")?.unwrap();
        assert_eq!(text(&publisher, "name"), "Penguin Books");
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_fetches_genres() {
    isolated(|c| {
        let book = c.registry.first_of(c.book, row! { "title" => "1984" })?.unwrap();
        let mut names: Vec<String> = book
            .related_many("genres")?
            .iter()
            .map(|g| text(g, "name"))
            .collect();
        names.sort();
        assert_eq!(names, vec!["Classics", "Dystopian"]);
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_lists_inventories() {
    isolated(|c| {
        let book = c.registry.find(c.book, 2)?.unwrap();
        assert_eq!(book.related_many("inventories")?.len(), 2);
        Ok(())
    });
}
