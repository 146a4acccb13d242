//! Budget service
//!
//! Budget upsert/removal plus overspend alerts. A budget is keyed by its
//! (scope, period) pair, so setting one for an existing key overwrites it.

use crate::error::{SpendlogError, SpendlogResult};
use crate::models::{Budget, BudgetScope, Money, Period};
use crate::storage::Storage;

/// A budget whose actual spend has exceeded its limit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverspendAlert {
    pub scope: BudgetScope,
    pub period: Period,
    pub limit: Money,
    pub actual: Money,
    /// How far past the limit the actual spend is (always positive)
    pub overage: Money,
}

/// Service for budget operations
pub struct BudgetService<'a> {
    storage: &'a Storage,
}

impl<'a> BudgetService<'a> {
    /// Create a new budget service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Set a budget, overwriting any existing budget for the same
    /// (scope, period) key
    pub fn set_budget(
        &self,
        scope: BudgetScope,
        period: Period,
        limit: Money,
    ) -> SpendlogResult<Budget> {
        let budget = Budget::new(scope, period, limit)?;

        let previous = self.storage.budgets.upsert(budget.clone())?;
        self.storage.budgets.save()?;

        tracing::info!(
            scope = %budget.scope,
            period = %budget.period,
            limit = %budget.limit,
            replaced = previous.is_some(),
            "budget set"
        );
        Ok(budget)
    }

    /// Remove a budget; targeting a missing key is an error
    pub fn remove_budget(&self, scope: &BudgetScope, period: &Period) -> SpendlogResult<()> {
        if !self.storage.budgets.remove(scope, period)? {
            return Err(SpendlogError::budget_not_found(format!(
                "{} / {}",
                scope, period
            )));
        }
        self.storage.budgets.save()?;

        tracing::info!(scope = %scope, period = %period, "budget removed");
        Ok(())
    }

    /// List all budgets, overall scope first then categories alphabetically
    pub fn list_budgets(&self) -> SpendlogResult<Vec<Budget>> {
        self.storage.budgets.get_all()
    }

    /// Check every stored budget against actual spend
    ///
    /// A budget alerts only when actual spend strictly exceeds its limit;
    /// spending exactly the limit is not an overspend.
    pub fn alerts(&self) -> SpendlogResult<Vec<OverspendAlert>> {
        let expenses = self.storage.expenses.get_all()?;
        let budgets = self.storage.budgets.get_all()?;

        let mut alerts = Vec::new();
        for budget in budgets {
            let actual: Money = expenses
                .iter()
                .filter(|e| budget.period.contains(e.date))
                .filter(|e| budget.scope.matches_category(&e.category))
                .map(|e| e.amount)
                .sum();

            if actual > budget.limit {
                tracing::warn!(
                    scope = %budget.scope,
                    period = %budget.period,
                    limit = %budget.limit,
                    actual = %actual,
                    "budget overspent"
                );
                alerts.push(OverspendAlert {
                    overage: actual - budget.limit,
                    scope: budget.scope,
                    period: budget.period,
                    limit: budget.limit,
                    actual,
                });
            }
        }
        Ok(alerts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpendlogPaths;
    use crate::models::NewExpense;
    use crate::services::ExpenseService;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendlogPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(&paths);
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn add_expense(storage: &Storage, cents: i64, category: &str, day: u32) {
        ExpenseService::new(storage)
            .add(NewExpense::new(
                Money::from_cents(cents),
                NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
                category,
                "Card",
            ))
            .unwrap();
    }

    #[test]
    fn test_set_budget_overwrites_same_key() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BudgetService::new(&storage);

        let scope = BudgetScope::Category("Gold".to_string());
        let period = Period::monthly(2025, 1);

        service
            .set_budget(scope.clone(), period.clone(), Money::from_cents(10000))
            .unwrap();
        service
            .set_budget(scope.clone(), period.clone(), Money::from_cents(20000))
            .unwrap();

        let budgets = service.list_budgets().unwrap();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].limit.cents(), 20000);
    }

    #[test]
    fn test_set_budget_rejects_zero_limit() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BudgetService::new(&storage);

        let err = service
            .set_budget(BudgetScope::Overall, Period::monthly(2025, 1), Money::zero())
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_remove_missing_budget_is_not_found() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BudgetService::new(&storage);

        let err = service
            .remove_budget(&BudgetScope::Overall, &Period::monthly(2025, 1))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_alert_only_when_strictly_over_limit() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BudgetService::new(&storage);

        add_expense(&storage, 10000, "Gold", 5);
        service
            .set_budget(
                BudgetScope::Category("Gold".to_string()),
                Period::monthly(2025, 1),
                Money::from_cents(10000),
            )
            .unwrap();

        // Exactly at the limit: no alert
        assert!(service.alerts().unwrap().is_empty());

        add_expense(&storage, 1, "Gold", 6);
        let alerts = service.alerts().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].actual.cents(), 10001);
        assert_eq!(alerts[0].overage.cents(), 1);
    }

    #[test]
    fn test_overall_budget_aggregates_all_categories() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BudgetService::new(&storage);

        add_expense(&storage, 6000, "Gold", 5);
        add_expense(&storage, 5000, "Ads", 10);

        service
            .set_budget(
                BudgetScope::Overall,
                Period::monthly(2025, 1),
                Money::from_cents(10000),
            )
            .unwrap();

        let alerts = service.alerts().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].actual.cents(), 11000);
    }

    #[test]
    fn test_custom_period_budget_alerts() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BudgetService::new(&storage);

        add_expense(&storage, 8000, "Gold", 5);
        add_expense(&storage, 5000, "Gold", 20);

        service
            .set_budget(
                BudgetScope::Category("Gold".to_string()),
                Period::custom(
                    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                    NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
                ),
                Money::from_cents(10000),
            )
            .unwrap();

        // Only the Jan 5 expense falls in the range, under the limit
        assert!(service.alerts().unwrap().is_empty());

        // A record on the inclusive end date pushes it over
        add_expense(&storage, 3000, "Gold", 10);
        let alerts = service.alerts().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].actual.cents(), 11000);
        assert_eq!(alerts[0].overage.cents(), 1000);
    }

    #[test]
    fn test_alerts_ignore_expenses_outside_period() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BudgetService::new(&storage);

        add_expense(&storage, 20000, "Gold", 5);
        service
            .set_budget(
                BudgetScope::Category("Gold".to_string()),
                Period::monthly(2025, 2),
                Money::from_cents(10000),
            )
            .unwrap();

        assert!(service.alerts().unwrap().is_empty());
    }
}
