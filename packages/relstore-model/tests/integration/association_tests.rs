//! Association resolution across kinds.

use ntest::timeout;
use relstore_core::{row, Value};

use relstore_model::ModelError;

use super::helpers::{isolated, text};

#[timeout(5000)]
#[test]
fn test_one_to_many_partitions_children() {
    isolated(|c| {
        let total: usize = c
            .registry
            .all_of(c.author)?
            .iter()
            .map(|author| author.related_many("books").map(|books| books.len()))
            .sum::<Result<usize, ModelError>>()?;
        assert_eq!(total, c.registry.all_of(c.book)?.len());
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_many_to_one_follows_foreign_key() {
    isolated(|c| {
        for book in c.registry.all_of(c.book)? {
            let author = book.related_one("author")?.unwrap();
            assert_eq!(author.id(), book.get("author_id").as_i64());
        }
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_many_to_many_through_join_table() {
    isolated(|c| {
        let book = c
            .registry
            .first_of(c.book, row! { "title" => "1984" })?
            .unwrap();
        let mut genres: Vec<String> = book
            .related_many("genres")?
            .iter()
            .map(|g| text(g, "name"))
            .collect();
        genres.sort();
        assert_eq!(genres, ["Classics", "Dystopian"]);

        c.registry
            .create(c.book_genre, row! { "book_id" => book.id(), "genre_id" => 3 })?;
        assert_eq!(book.related_many("genres")?.len(), 3);
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_wrong_cardinality_is_rejected() {
    isolated(|c| {
        let author = c.registry.find(c.author, 1)?.unwrap();
        match author.related_one("books") {
            Err(ModelError::AssociationMismatch {
                expected, actual, ..
            }) => {
                assert_eq!(expected, "many_to_one");
                assert_eq!(actual, "one_to_many");
            }
            other => panic!("expected a mismatch, got {:?}", other),
        }

        let book = c.registry.find(c.book, 1)?.unwrap();
        assert!(matches!(
            book.related_many("author"),
            Err(ModelError::AssociationMismatch { .. })
        ));
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_unknown_association() {
    isolated(|c| {
        let book = c.registry.find(c.book, 1)?.unwrap();
        match book.related_many("reviews") {
            Err(ModelError::UnknownAssociation { kind, name }) => {
                assert_eq!(kind, "Book");
                assert_eq!(name, "reviews");
            }
            other => panic!("expected UnknownAssociation, got {:?}", other),
        }
        Ok(())
    });
}

#[timeout(5000)]
#[test]
fn test_unsaved_and_unlinked_models() {
    isolated(|c| {
        let author = c.registry.build(c.author, row! { "name" => "Nobody" })?;
        assert!(author.related_many("books")?.is_empty());

        let book = c
            .registry
            .build(c.book, row! { "title" => "Orphan", "author_id" => Value::Null })?;
        assert!(book.related_one("author")?.is_none());

        let dangling = c
            .registry
            .build(c.book, row! { "title" => "Dangling", "author_id" => 99 })?;
        assert!(dangling.related_one("author")?.is_none());
        Ok(())
    });
}
