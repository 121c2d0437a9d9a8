//! Canonical record representation and column mapping
//!
//! A [`Record`] is an ordered field-name -> value mapping, one per CSV row.
//! Headerless input gets synthetic positional field names so that the rest of
//! the pipeline only ever deals with named fields.

use crate::errors::SubjectifyError;
use serde::{Deserialize, Serialize};

/// Synthetic field name for column `index` of a headerless file.
pub fn positional_name(index: usize) -> String {
    format!("col{}", index)
}

/// One row of input/output data. Field order is insertion order and is
/// preserved through processing and into the output file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Record { fields: pairs }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Overwrite an existing field or append a new one at the end.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    pub fn has_value(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.trim().is_empty())
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Which input columns hold the four kinds of bibliographic data.
/// Immutable for the duration of a batch run. Fields hold resolved column
/// names (synthetic ones for headerless input), or `None` when that kind of
/// data is not present in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    pub isbn: Option<String>,
    pub issn: Option<String>,
    pub author: Option<String>,
    pub title: Option<String>,
}

impl FieldMapping {
    /// The fixed default layout: `isbn,issn,author,title`.
    pub fn default_columns() -> Self {
        FieldMapping {
            isbn: Some("isbn".to_string()),
            issn: Some("issn".to_string()),
            author: Some("author".to_string()),
            title: Some("title".to_string()),
        }
    }

    /// Build a mapping from explicit 0-based column indices, validated
    /// against the known column names. Out-of-range indices are fatal.
    pub fn from_indices(
        isbn: Option<usize>,
        issn: Option<usize>,
        author: Option<usize>,
        title: Option<usize>,
        names: &[String],
    ) -> Result<Self, SubjectifyError> {
        let resolve = |idx: Option<usize>, what: &str| -> Result<Option<String>, SubjectifyError> {
            match idx {
                None => Ok(None),
                Some(i) if i < names.len() => Ok(Some(names[i].clone())),
                Some(i) => Err(SubjectifyError::Validation(format!(
                    "{} column index {} is out of range (file has {} columns)",
                    what,
                    i,
                    names.len()
                ))),
            }
        };

        Ok(FieldMapping {
            isbn: resolve(isbn, "isbn")?,
            issn: resolve(issn, "issn")?,
            author: resolve(author, "author")?,
            title: resolve(title, "title")?,
        })
    }

    /// Guess the mapping from a header row. For each field, a
    /// case-insensitive exact name match wins; otherwise the first header
    /// containing the name as a substring is used.
    pub fn infer(header: &[String]) -> Self {
        FieldMapping {
            isbn: find_column(header, "isbn"),
            issn: find_column(header, "issn"),
            author: find_column(header, "author"),
            title: find_column(header, "title"),
        }
    }

    pub fn is_unmapped(&self) -> bool {
        self.isbn.is_none() && self.issn.is_none() && self.author.is_none() && self.title.is_none()
    }
}

fn find_column(header: &[String], want: &str) -> Option<String> {
    if let Some(h) = header.iter().find(|h| h.eq_ignore_ascii_case(want)) {
        return Some(h.clone());
    }
    header
        .iter()
        .find(|h| h.to_ascii_lowercase().contains(want))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn set_appends_new_fields_in_order() {
        let mut rec = Record::from_pairs(vec![("isbn".into(), "123".into())]);
        rec.set("ddc", "813.54");
        rec.set("lcc", "PS3572");
        let names: Vec<&str> = rec.field_names().collect();
        assert_eq!(names, vec!["isbn", "ddc", "lcc"]);
        assert_eq!(rec.get("ddc"), Some("813.54"));
    }

    #[test]
    fn set_overwrites_existing_field() {
        let mut rec = Record::from_pairs(vec![("ddc".into(), "old".into())]);
        rec.set("ddc", "new");
        assert_eq!(rec.len(), 1);
        assert_eq!(rec.get("ddc"), Some("new"));
    }

    #[test]
    fn infer_prefers_exact_match_over_substring() {
        let h = header(&["isbn13", "ISBN", "Author Name", "Book Title"]);
        let mapping = FieldMapping::infer(&h);
        assert_eq!(mapping.isbn.as_deref(), Some("ISBN"));
        assert_eq!(mapping.author.as_deref(), Some("Author Name"));
        assert_eq!(mapping.title.as_deref(), Some("Book Title"));
        assert_eq!(mapping.issn, None);
    }

    #[test]
    fn infer_falls_back_to_first_substring_match() {
        let h = header(&["id", "isbn13", "isbn10"]);
        let mapping = FieldMapping::infer(&h);
        assert_eq!(mapping.isbn.as_deref(), Some("isbn13"));
    }

    #[test]
    fn from_indices_rejects_out_of_range() {
        let names = header(&["a", "b"]);
        let err = FieldMapping::from_indices(Some(5), None, None, None, &names).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn from_indices_maps_to_column_names() {
        let names = header(&["col0", "col1", "col2"]);
        let mapping =
            FieldMapping::from_indices(Some(2), None, None, Some(0), &names).unwrap();
        assert_eq!(mapping.isbn.as_deref(), Some("col2"));
        assert_eq!(mapping.title.as_deref(), Some("col0"));
        assert_eq!(mapping.issn, None);
    }
}
