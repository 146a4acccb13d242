//! Budget repository for CSV storage
//!
//! Budgets are keyed by (scope, period), so setting a budget for a pair
//! that already has one overwrites it. The BTreeMap keeps listings in a
//! deterministic order: overall first, then categories alphabetically.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::SpendlogError;
use crate::models::{Budget, BudgetScope, Money, Period};

use super::csv_io::{read_rows, write_rows_atomic};

/// Flat row shape of the budgets table
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BudgetRow {
    scope: String,
    period: String,
    limit: String,
}

impl From<&Budget> for BudgetRow {
    fn from(budget: &Budget) -> Self {
        Self {
            scope: budget.scope.to_string(),
            period: budget.period.to_string(),
            limit: budget.limit.to_decimal_string(),
        }
    }
}

impl TryFrom<BudgetRow> for Budget {
    type Error = SpendlogError;

    fn try_from(row: BudgetRow) -> Result<Self, Self::Error> {
        let scope = BudgetScope::parse(&row.scope);
        let period = Period::parse(&row.period)
            .map_err(|e| SpendlogError::Storage(format!("Bad period in budgets table: {}", e)))?;
        let limit = Money::parse(&row.limit)
            .map_err(|e| SpendlogError::Storage(format!("Bad limit in budgets table: {}", e)))?;
        Budget::new(scope, period, limit)
    }
}

/// Repository for budget persistence
pub struct BudgetRepository {
    path: PathBuf,
    data: RwLock<BTreeMap<(BudgetScope, Period), Budget>>,
}

impl BudgetRepository {
    /// Create a new budget repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(BTreeMap::new()),
        }
    }

    /// Load budgets from disk
    pub fn load(&self) -> Result<(), SpendlogError> {
        let rows: Vec<BudgetRow> = read_rows(&self.path)?;

        let mut budgets = BTreeMap::new();
        for row in rows {
            let budget = Budget::try_from(row)?;
            budgets.insert(budget.key(), budget);
        }

        let mut data = self
            .data
            .write()
            .map_err(|e| SpendlogError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        tracing::debug!(count = budgets.len(), "loaded budgets table");
        *data = budgets;
        Ok(())
    }

    /// Save budgets to disk
    pub fn save(&self) -> Result<(), SpendlogError> {
        let data = self
            .data
            .read()
            .map_err(|e| SpendlogError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let rows: Vec<BudgetRow> = data.values().map(BudgetRow::from).collect();
        tracing::debug!(count = rows.len(), "saving budgets table");
        write_rows_atomic(&self.path, &rows)
    }

    /// Get the budget for a (scope, period) pair
    pub fn get(&self, scope: &BudgetScope, period: &Period) -> Result<Option<Budget>, SpendlogError> {
        let data = self
            .data
            .read()
            .map_err(|e| SpendlogError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&(scope.clone(), period.clone())).cloned())
    }

    /// Get all budgets, overall scope first then categories alphabetically
    pub fn get_all(&self) -> Result<Vec<Budget>, SpendlogError> {
        let data = self
            .data
            .read()
            .map_err(|e| SpendlogError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.values().cloned().collect())
    }

    /// Insert or overwrite a budget; returns the previous budget if any
    pub fn upsert(&self, budget: Budget) -> Result<Option<Budget>, SpendlogError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| SpendlogError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.insert(budget.key(), budget))
    }

    /// Remove a budget; returns false if it wasn't present
    pub fn remove(&self, scope: &BudgetScope, period: &Period) -> Result<bool, SpendlogError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| SpendlogError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(&(scope.clone(), period.clone())).is_some())
    }

    /// Count budgets
    pub fn count(&self) -> Result<usize, SpendlogError> {
        let data = self
            .data
            .read()
            .map_err(|e| SpendlogError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }
}
