//! Naming conventions used for association defaults.
//!
//! These only fill in names an association did not set explicitly.

/// Singular form of a table-style plural: `inventories` -> `inventory`,
/// `books` -> `book`. Words ending in `ss` are left alone.
pub fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        format!("{}y", stem)
    } else if word.ends_with("ss") {
        word.to_string()
    } else if let Some(stem) = word.strip_suffix('s') {
        stem.to_string()
    } else {
        word.to_string()
    }
}

/// `book_genre` -> `BookGenre`.
pub fn camelize(word: &str) -> String {
    word.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// `BookGenre` -> `book_genre`.
pub fn underscore(word: &str) -> String {
    let mut out = String::with_capacity(word.len() + 4);
    for (i, c) in word.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Kind name an association called `name` points at by default.
pub fn target_kind(name: &str) -> String {
    camelize(&singularize(name))
}

/// Foreign key column referring to `kind`: `BookGenre` -> `book_genre_id`.
pub fn foreign_key(kind: &str) -> String {
    format!("{}_id", underscore(kind))
}

/// Join table linking `kind` to the association `name`: `Book`, `genres` ->
/// `book_genres`.
pub fn join_table(kind: &str, name: &str) -> String {
    format!("{}_{}", underscore(kind), name)
}
