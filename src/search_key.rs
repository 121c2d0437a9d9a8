//! Search key selection
//!
//! Picks the best available identifier for a record. Standard numbers beat
//! bibliographic data: ISBN over ISSN over title/author.

use crate::record::{FieldMapping, Record};

/// What to search the classification service with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchKey {
    Isbn(String),
    Issn(String),
    Title(String),
    TitleAuthor { title: String, author: String },
    /// OCLC work index identifier, used for the disambiguating second lookup
    WorkIndex(String),
}

/// Select the search key for one record, or `None` when no mapped field
/// holds a usable value. Priority: ISBN, then ISSN, then title (with author
/// when present).
pub fn select_search_key(record: &Record, mapping: &FieldMapping) -> Option<SearchKey> {
    let field = |name: &Option<String>| -> Option<String> {
        name.as_deref()
            .and_then(|n| record.get(n))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    if let Some(isbn) = field(&mapping.isbn) {
        return Some(SearchKey::Isbn(isbn));
    }
    if let Some(issn) = field(&mapping.issn) {
        return Some(SearchKey::Issn(issn));
    }
    match (field(&mapping.title), field(&mapping.author)) {
        (Some(title), Some(author)) => Some(SearchKey::TitleAuthor { title, author }),
        (Some(title), None) => Some(SearchKey::Title(title)),
        _ => None,
    }
}
