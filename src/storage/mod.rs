//! Storage layer for persistence
//!
//! Two CSV tables under the data directory: expenses.csv and budgets.csv.
//! Repositories hold records in memory behind RwLocks; every write goes
//! through an atomic temp-file-and-rename so a crash never leaves a
//! half-written table.

mod budgets;
mod csv_io;
mod expenses;

pub use budgets::BudgetRepository;
pub use expenses::ExpenseRepository;

use crate::config::SpendlogPaths;
use crate::error::SpendlogError;

/// Coordinates the repositories over one data directory
pub struct Storage {
    pub expenses: ExpenseRepository,
    pub budgets: BudgetRepository,
}

impl Storage {
    /// Create storage rooted at the given paths
    pub fn new(paths: &SpendlogPaths) -> Self {
        Self {
            expenses: ExpenseRepository::new(paths.expenses_file()),
            budgets: BudgetRepository::new(paths.budgets_file()),
        }
    }

    /// Load both tables from disk; missing files mean empty tables
    pub fn load_all(&self) -> Result<(), SpendlogError> {
        self.expenses.load()?;
        self.budgets.load()?;
        tracing::info!(
            expenses = self.expenses.count()?,
            budgets = self.budgets.count()?,
            "storage loaded"
        );
        Ok(())
    }

    /// Save both tables to disk
    pub fn save_all(&self) -> Result<(), SpendlogError> {
        self.expenses.save()?;
        self.budgets.save()?;
        tracing::info!("storage saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Budget, BudgetScope, Expense, Money, NewExpense, Period};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendlogPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(&paths);
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_fresh_storage_is_empty() {
        let (_temp_dir, storage) = create_test_storage();
        assert_eq!(storage.expenses.count().unwrap(), 0);
        assert_eq!(storage.budgets.count().unwrap(), 0);
    }

    #[test]
    fn test_save_and_reload_both_tables() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendlogPaths::with_base_dir(temp_dir.path().to_path_buf());

        {
            let storage = Storage::new(&paths);
            storage.load_all().unwrap();

            let expense = Expense::from_draft(NewExpense::new(
                Money::from_cents(5000),
                NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
                "Gold",
                "Card",
            ))
            .unwrap();
            storage.expenses.append(expense).unwrap();

            let budget = Budget::new(
                BudgetScope::Overall,
                Period::monthly(2025, 1),
                Money::from_cents(100000),
            )
            .unwrap();
            storage.budgets.upsert(budget).unwrap();

            storage.save_all().unwrap();
        }

        let storage = Storage::new(&paths);
        storage.load_all().unwrap();
        assert_eq!(storage.expenses.count().unwrap(), 1);
        assert_eq!(storage.budgets.count().unwrap(), 1);
    }
}
