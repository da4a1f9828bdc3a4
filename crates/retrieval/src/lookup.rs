//! Exact-key lookup over a small CSV reference table.

use docqa_core::{AppError, AppResult};
use std::collections::HashMap;
use std::io;
use std::path::Path;

/// Observation returned when no row matches. Not an error.
pub const LOOKUP_NOT_FOUND: &str = "Not found.";

/// A static table keyed by one designated column.
///
/// The table is loaded once; lookups are exact and case-sensitive. When a key
/// repeats, the first row wins.
#[derive(Debug, Clone)]
pub struct LookupTable {
    key_field: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    index: HashMap<String, usize>,
}

impl LookupTable {
    /// Load a CSV file whose first row holds the column names.
    pub fn from_path(path: &Path, key_field: &str) -> AppResult<Self> {
        tracing::debug!("Loading lookup table from {:?}", path);
        let file = std::fs::File::open(path).map_err(|e| {
            AppError::Lookup(format!("Failed to open lookup table {:?}: {}", path, e))
        })?;
        Self::from_reader(file, key_field)
    }

    /// Load CSV data from any reader.
    pub fn from_reader<R: io::Read>(reader: R, key_field: &str) -> AppResult<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| AppError::Lookup(format!("Failed to read CSV headers: {}", e)))?
            .iter()
            .map(str::to_string)
            .collect::<Vec<_>>();

        let rows = csv_reader
            .records()
            .map(|record| {
                record
                    .map(|r| r.iter().map(str::to_string).collect::<Vec<_>>())
                    .map_err(|e| AppError::Lookup(format!("Failed to read CSV row: {}", e)))
            })
            .collect::<AppResult<Vec<_>>>()?;

        Self::from_records(headers, rows, key_field)
    }

    /// Build a table from column names and rows.
    pub fn from_records(
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
        key_field: &str,
    ) -> AppResult<Self> {
        let key_column = headers.iter().position(|h| h == key_field).ok_or_else(|| {
            AppError::Lookup(format!("Key field '{}' not found in table columns", key_field))
        })?;

        let mut index = HashMap::new();
        for (i, row) in rows.iter().enumerate() {
            if let Some(key) = row.get(key_column) {
                index.entry(key.clone()).or_insert(i);
            }
        }

        tracing::debug!("Lookup table has {} rows keyed by '{}'", rows.len(), key_field);

        Ok(Self {
            key_field: key_field.to_string(),
            headers,
            rows,
            index,
        })
    }

    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Format the matching row as `field: value` lines, or the not-found sentinel.
    pub fn lookup(&self, key: &str) -> String {
        match self.index.get(key) {
            Some(&row) => self.headers
                .iter()
                .zip(self.rows[row].iter())
                .map(|(field, value)| format!("{}: {}", field, value))
                .collect::<Vec<_>>()
                .join("\n"),
            None => {
                tracing::debug!("No lookup row for key '{}'", key);
                LOOKUP_NOT_FOUND.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "name,limit,rate\nBank A,1000,5%\nBank B,2000,6%\nBank A,9999,0%\n";

    #[test]
    fn test_lookup_single_row() {
        let table = LookupTable::from_records(
            vec!["name".to_string(), "limit".to_string()],
            vec![vec!["Bank A".to_string(), "1000".to_string()]],
            "name",
        )
        .unwrap();

        let result = table.lookup("Bank A");
        assert!(result.contains("name: Bank A"));
        assert!(result.contains("limit: 1000"));
        assert_eq!(table.lookup("Unknown"), LOOKUP_NOT_FOUND);
    }

    #[test]
    fn test_lookup_from_csv_keeps_column_order() {
        let table = LookupTable::from_reader(CSV.as_bytes(), "name").unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.lookup("Bank B"), "name: Bank B\nlimit: 2000\nrate: 6%");
    }

    #[test]
    fn test_first_duplicate_wins() {
        let table = LookupTable::from_reader(CSV.as_bytes(), "name").unwrap();
        assert!(table.lookup("Bank A").contains("limit: 1000"));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let table = LookupTable::from_reader(CSV.as_bytes(), "name").unwrap();
        assert_eq!(table.lookup("bank a"), LOOKUP_NOT_FOUND);
    }

    #[test]
    fn test_missing_key_field() {
        let result = LookupTable::from_reader(CSV.as_bytes(), "id");
        assert!(matches!(result, Err(AppError::Lookup(_))));
    }

    #[test]
    fn test_from_path() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), CSV).unwrap();

        let table = LookupTable::from_path(temp.path(), "name").unwrap();
        assert_eq!(table.key_field(), "name");
        assert!(!table.is_empty());
    }

    #[test]
    fn test_from_missing_path() {
        let result = LookupTable::from_path(Path::new("/nonexistent/table.csv"), "name");
        assert!(result.is_err());
    }
}
