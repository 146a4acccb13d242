//! CSV file I/O utilities with atomic writes
//!
//! Provides safe table read/write operations that won't corrupt data on
//! failure. Each table is a headered CSV file of serde row structs.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::SpendlogError;

/// Read all rows from a CSV table, returning an empty vec if the file
/// doesn't exist yet
pub fn read_rows<T, P>(path: P) -> Result<Vec<T>, SpendlogError>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| SpendlogError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: T = result.map_err(|e| {
            SpendlogError::Storage(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        rows.push(row);
    }
    Ok(rows)
}

/// Write rows to a CSV table atomically (write to temp, then rename)
///
/// This ensures that the file is either completely written or not modified
/// at all, preventing corruption on crashes or power failures.
pub fn write_rows_atomic<T, P>(path: P, rows: &[T]) -> Result<(), SpendlogError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            SpendlogError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Create temp file in same directory (important for atomic rename)
    let temp_path = path.with_extension("csv.tmp");

    let file = File::create(&temp_path)
        .map_err(|e| SpendlogError::Storage(format!("Failed to create temp file: {}", e)))?;

    let mut writer = csv::Writer::from_writer(BufWriter::new(file));
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| SpendlogError::Storage(format!("Failed to serialize row: {}", e)))?;
    }

    let mut inner = writer
        .into_inner()
        .map_err(|e| SpendlogError::Storage(format!("Failed to flush data: {}", e)))?;

    inner
        .flush()
        .map_err(|e| SpendlogError::Storage(format!("Failed to flush data: {}", e)))?;

    // Sync to disk before rename
    inner
        .get_ref()
        .sync_all()
        .map_err(|e| SpendlogError::Storage(format!("Failed to sync data: {}", e)))?;

    // Atomic rename
    fs::rename(&temp_path, path).map_err(|e| {
        // Try to clean up temp file if rename fails
        let _ = fs::remove_file(&temp_path);
        SpendlogError::Storage(format!("Failed to rename temp file: {}", e))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestRow {
        name: String,
        value: i32,
    }

    #[test]
    fn test_read_nonexistent_returns_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nonexistent.csv");

        let rows: Vec<TestRow> = read_rows(&path).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.csv");

        let rows = vec![
            TestRow {
                name: "first".to_string(),
                value: 1,
            },
            TestRow {
                name: "with, comma".to_string(),
                value: 2,
            },
        ];

        write_rows_atomic(&path, &rows).unwrap();
        assert!(path.exists());

        let loaded: Vec<TestRow> = read_rows(&path).unwrap();
        assert_eq!(rows, loaded);
    }

    #[test]
    fn test_atomic_write_no_temp_file_left() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.csv");
        let temp_path = temp_dir.path().join("test.csv.tmp");

        let rows = vec![TestRow {
            name: "test".to_string(),
            value: 42,
        }];

        write_rows_atomic(&path, &rows).unwrap();

        assert!(path.exists());
        assert!(!temp_path.exists());
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("test.csv");

        let rows = vec![TestRow {
            name: "test".to_string(),
            value: 42,
        }];

        write_rows_atomic(&path, &rows).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_malformed_row_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.csv");
        fs::write(&path, "name,value\nok,not-a-number\n").unwrap();

        let result: Result<Vec<TestRow>, _> = read_rows(&path);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("bad.csv"));
    }
}
