//! BookGenre join kind.

use ntest::timeout;
use pretty_assertions::assert_eq;
use relstore_core::{row, Value};

use super::helpers::{isolated, text};

#[timeout(5000)]
#[test]
fn test_counts_seed_rows() {
    isolated(|c| {
        assert_eq!(c.registry.all_of(c.book_genre)?.len(), 5);
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_requires_both_keys() {
    isolated(|c| {
        let mut no_book = c.registry.build(c.book_genre, row! { "genre_id" => 1 })?;
        assert!(!no_book.is_valid()?);

        let mut no_genre = c.registry.build(c.book_genre, row! { "book_id" => 1 })?;
        assert!(!no_genre.is_valid()?);

        let mut nulls = c.registry.build(
            c.book_genre,
            row! { "book_id" => Value::Null, "genre_id" => Value::Null },
        )?;
        assert!(!nulls.is_valid()?);
        assert_eq!(nulls.errors().len(), 2);
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_creates_updates_and_deletes_links() {
    isolated(|c| {
        let link = c
            .registry
            .create(c.book_genre, row! { "book_id" => 1, "genre_id" => 2 })?;
        let found = c.registry.find(c.book_genre, link.id().unwrap())?.unwrap();
        assert_eq!(found.get("book_id"), &Value::from(1));

        let mut moved = c
            .registry
            .create(c.book_genre, row! { "book_id" => 1, "genre_id" => 3 })?;
        moved.update(row! { "genre_id" => 1 })?;
        let reloaded = c.registry.find(c.book_genre, moved.id().unwrap())?.unwrap();
        assert_eq!(reloaded.get("genre_id"), &Value::from(1));

        let before = c.registry.all_of(c.book_genre)?.len();
        link.delete()?;
        assert_eq!(c.registry.all_of(c.book_genre)?.len(), before - 1);
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_fetches_related_book_and_genre() {
    isolated(|c| {
        let link = c
            .registry
            .first_of(c.book_genre, row! { "book_id" => 2, "genre_id" => 2 })?
            .unwrap();
        assert_eq!(text(&link.related_one("book")?.unwrap(), "title"), "1984");
        assert_eq!(text(&link.related_one("genre")?.unwrap(), "name"), "Dystopian");
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_counts_links_per_book() {
    isolated(|c| {
        let counts = c.registry.dataset(c.book_genre)?.group_and_count("book_id")?;
        assert_eq!(
            counts,
            vec![(Value::from(1), 1), (Value::from(2), 2), (Value::from(3), 2)]
        );
        Ok(())
    });
}
