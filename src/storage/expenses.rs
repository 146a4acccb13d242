//! Expense repository for CSV storage
//!
//! Manages loading and saving expense records to expenses.csv. Insertion
//! order is preserved: query results and top-N tie-breaks depend on it.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SpendlogError;
use crate::models::{Expense, ExpenseId, Money};

use super::csv_io::{read_rows, write_rows_atomic};

/// Flat row shape of the expenses table; the column order here is the
/// external file contract
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ExpenseRow {
    id: ExpenseId,
    amount: String,
    date: NaiveDate,
    category: String,
    description: String,
    payment_method: String,
    tags: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&Expense> for ExpenseRow {
    fn from(expense: &Expense) -> Self {
        Self {
            id: expense.id,
            amount: expense.amount.to_decimal_string(),
            date: expense.date,
            category: expense.category.clone(),
            description: expense.description.clone(),
            payment_method: expense.payment_method.clone(),
            tags: expense
                .tags
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(";"),
            created_at: expense.created_at,
            updated_at: expense.updated_at,
        }
    }
}

impl TryFrom<ExpenseRow> for Expense {
    type Error = SpendlogError;

    fn try_from(row: ExpenseRow) -> Result<Self, Self::Error> {
        let amount = Money::parse(&row.amount)
            .map_err(|e| SpendlogError::Storage(format!("Bad amount in expenses table: {}", e)))?;
        let tags: BTreeSet<String> = row
            .tags
            .split(';')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();
        Ok(Self {
            id: row.id,
            amount,
            date: row.date,
            category: row.category,
            description: row.description,
            payment_method: row.payment_method,
            tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for expense persistence, preserving insertion order
pub struct ExpenseRepository {
    path: PathBuf,
    data: RwLock<Vec<Expense>>,
}

impl ExpenseRepository {
    /// Create a new expense repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(Vec::new()),
        }
    }

    /// Load expenses from disk
    pub fn load(&self) -> Result<(), SpendlogError> {
        let rows: Vec<ExpenseRow> = read_rows(&self.path)?;

        let mut expenses = Vec::with_capacity(rows.len());
        for row in rows {
            expenses.push(Expense::try_from(row)?);
        }

        let mut data = self
            .data
            .write()
            .map_err(|e| SpendlogError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        tracing::debug!(count = expenses.len(), "loaded expenses table");
        *data = expenses;
        Ok(())
    }

    /// Save expenses to disk in insertion order
    pub fn save(&self) -> Result<(), SpendlogError> {
        let data = self
            .data
            .read()
            .map_err(|e| SpendlogError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let rows: Vec<ExpenseRow> = data.iter().map(ExpenseRow::from).collect();
        tracing::debug!(count = rows.len(), "saving expenses table");
        write_rows_atomic(&self.path, &rows)
    }

    /// Get an expense by ID
    pub fn get(&self, id: ExpenseId) -> Result<Option<Expense>, SpendlogError> {
        let data = self
            .data
            .read()
            .map_err(|e| SpendlogError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.iter().find(|e| e.id == id).cloned())
    }

    /// Get all expenses in insertion order
    pub fn get_all(&self) -> Result<Vec<Expense>, SpendlogError> {
        let data = self
            .data
            .read()
            .map_err(|e| SpendlogError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.clone())
    }

    /// Append a new expense at the end of the store
    pub fn append(&self, expense: Expense) -> Result<(), SpendlogError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| SpendlogError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.push(expense);
        Ok(())
    }

    /// Replace an expense in place, preserving its position
    ///
    /// Returns false if no record with the same ID exists.
    pub fn replace(&self, expense: Expense) -> Result<bool, SpendlogError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| SpendlogError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        match data.iter_mut().find(|e| e.id == expense.id) {
            Some(slot) => {
                *slot = expense;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove an expense; returns false if it wasn't present
    pub fn remove(&self, id: ExpenseId) -> Result<bool, SpendlogError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| SpendlogError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let before = data.len();
        data.retain(|e| e.id != id);
        Ok(data.len() < before)
    }

    /// Count expenses
    pub fn count(&self) -> Result<usize, SpendlogError> {
        let data = self
            .data
            .read()
            .map_err(|e| SpendlogError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }
}
