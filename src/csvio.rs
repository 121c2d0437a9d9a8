//! CSV reading and writing
//!
//! Thin wrappers around the csv crate. Reading normalizes every row into the
//! canonical [`Record`] shape; writing pads rows against the full output
//! header so the file stays rectangular even when only some rows resolved.

use std::path::Path;

use crate::errors::SubjectifyError;
use crate::processor::{DDC_FIELD, LCC_FIELD};
use crate::record::{positional_name, Record};

/// The fixed default 4-column layout.
pub const DEFAULT_FIELDS: [&str; 4] = ["isbn", "issn", "author", "title"];

/// How to obtain field names for the input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMode {
    /// First row names the columns
    File,
    /// No header row; assume the default `isbn,issn,author,title` layout
    Default,
    /// No header row; synthetic positional field names
    Headerless { skip_first_row: bool },
}

/// Read the input file into records. Returns the resolved field names along
/// with one record per data row.
pub fn load_records(
    path: &Path,
    mode: HeaderMode,
) -> Result<(Vec<String>, Vec<Record>), SubjectifyError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = reader.records();
    let mut names: Vec<String> = match mode {
        HeaderMode::File => match rows.next() {
            Some(row) => row?.iter().map(|s| s.to_string()).collect(),
            None => {
                return Err(SubjectifyError::Validation(
                    "input file is empty, expected a header row".to_string(),
                ))
            }
        },
        HeaderMode::Default => DEFAULT_FIELDS.iter().map(|s| s.to_string()).collect(),
        HeaderMode::Headerless { skip_first_row } => {
            if skip_first_row {
                let _ = rows.next().transpose()?;
            }
            Vec::new()
        }
    };

    let mut records = Vec::new();
    for row in rows {
        let row = row?;
        // Widen the name list when a row has more columns than seen so far
        while names.len() < row.len() {
            names.push(positional_name(names.len()));
        }
        let pairs = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), row.get(i).unwrap_or("").to_string()))
            .collect();
        records.push(Record::from_pairs(pairs));
    }

    Ok((names, records))
}

/// Write all records to the output file, appending the classifier columns to
/// the field list. Rows missing a field are padded with empty values; one
/// output row per input record, in order.
pub fn write_records(
    path: &Path,
    field_names: &[String],
    records: &[Record],
    write_header: bool,
) -> Result<(), SubjectifyError> {
    let mut names: Vec<String> = field_names.to_vec();
    for extra in [DDC_FIELD, LCC_FIELD] {
        if !names.iter().any(|n| n == extra) {
            names.push(extra.to_string());
        }
    }

    let mut writer = csv::WriterBuilder::new().from_path(path)?;
    if write_header {
        writer.write_record(&names)?;
    }
    for record in records {
        writer.write_record(names.iter().map(|n| record.get(n).unwrap_or("")))?;
    }
    writer.flush().map_err(SubjectifyError::Io)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn default_mode_uses_fixed_field_names() {
        let f = csv_file("9780441172719,,Frank Herbert,Dune\n,,Ursula Le Guin,The Dispossessed\n");
        let (names, records) = load_records(f.path(), HeaderMode::Default).unwrap();
        assert_eq!(names, DEFAULT_FIELDS);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("isbn"), Some("9780441172719"));
        assert_eq!(records[1].get("author"), Some("Ursula Le Guin"));
        assert_eq!(records[1].get("isbn"), Some(""));
    }

    #[test]
    fn file_mode_reads_header_row() {
        let f = csv_file("Identifier,Book Title\n9780441172719,Dune\n");
        let (names, records) = load_records(f.path(), HeaderMode::File).unwrap();
        assert_eq!(names, vec!["Identifier", "Book Title"]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("Book Title"), Some("Dune"));
    }

    #[test]
    fn headerless_mode_gets_positional_names() {
        let f = csv_file("a,b,c\nd,e,f\n");
        let (names, records) =
            load_records(f.path(), HeaderMode::Headerless { skip_first_row: false }).unwrap();
        assert_eq!(names, vec!["col0", "col1", "col2"]);
        assert_eq!(records[1].get("col2"), Some("f"));
    }

    #[test]
    fn headerless_mode_can_skip_a_header_row() {
        let f = csv_file("ignore,me\na,b\n");
        let (_, records) =
            load_records(f.path(), HeaderMode::Headerless { skip_first_row: true }).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("col0"), Some("a"));
    }

    #[test]
    fn short_rows_are_padded_with_empty_values() {
        let f = csv_file("9780441172719,,Frank Herbert,Dune\n123\n");
        let (_, records) = load_records(f.path(), HeaderMode::Default).unwrap();
        assert_eq!(records[1].get("isbn"), Some("123"));
        assert_eq!(records[1].get("title"), Some(""));
    }

    #[test]
    fn empty_file_in_file_mode_is_fatal() {
        let f = csv_file("");
        let err = load_records(f.path(), HeaderMode::File).unwrap_err();
        assert!(matches!(err, SubjectifyError::Validation(_)));
    }

    #[test]
    fn write_appends_classifier_columns_and_pads() {
        let names: Vec<String> = DEFAULT_FIELDS.iter().map(|s| s.to_string()).collect();
        let mut resolved = Record::from_pairs(vec![
            ("isbn".into(), "111".into()),
            ("issn".into(), String::new()),
            ("author".into(), String::new()),
            ("title".into(), String::new()),
        ]);
        resolved.set(DDC_FIELD, "813.54");
        resolved.set(LCC_FIELD, "PS3558");
        let unresolved = Record::from_pairs(vec![
            ("isbn".into(), "222".into()),
            ("issn".into(), String::new()),
            ("author".into(), String::new()),
            ("title".into(), String::new()),
        ]);

        let out = NamedTempFile::new().unwrap();
        write_records(out.path(), &names, &[resolved, unresolved], true).unwrap();

        let content = std::fs::read_to_string(out.path()).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("isbn,issn,author,title,ddc,lcc"));
        assert_eq!(lines.next(), Some("111,,,,813.54,PS3558"));
        assert_eq!(lines.next(), Some("222,,,,,"));
    }
}
