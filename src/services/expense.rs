//! Expense service
//!
//! CRUD and query operations over the expense table. Every mutation is
//! validated first and persisted immediately after it is applied, so a
//! failed call never leaves the store changed.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::error::{SpendlogError, SpendlogResult};
use crate::models::{Expense, ExpenseId, ExpenseUpdate, Money, NewExpense};
use crate::storage::Storage;

/// Predicates a queried expense must satisfy; unset fields match everything
///
/// All supplied predicates must hold at once. The tag predicate matches when
/// the expense shares at least one tag with the filter.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub categories: Option<BTreeSet<String>>,
    pub payment_methods: Option<BTreeSet<String>>,
    pub min_amount: Option<Money>,
    pub max_amount: Option<Money>,
    pub tags: Option<BTreeSet<String>>,
}

impl ExpenseFilter {
    /// A filter that matches every expense
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date_from(mut self, date: NaiveDate) -> Self {
        self.date_from = Some(date);
        self
    }

    pub fn date_to(mut self, date: NaiveDate) -> Self {
        self.date_to = Some(date);
        self
    }

    pub fn categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    pub fn payment_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.payment_methods = Some(methods.into_iter().map(Into::into).collect());
        self
    }

    pub fn min_amount(mut self, amount: Money) -> Self {
        self.min_amount = Some(amount);
        self
    }

    pub fn max_amount(mut self, amount: Money) -> Self {
        self.max_amount = Some(amount);
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Check whether an expense satisfies every supplied predicate
    pub fn matches(&self, expense: &Expense) -> bool {
        if let Some(from) = self.date_from {
            if expense.date < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if expense.date > to {
                return false;
            }
        }
        if let Some(categories) = &self.categories {
            if !categories.contains(&expense.category) {
                return false;
            }
        }
        if let Some(methods) = &self.payment_methods {
            if !methods.contains(&expense.payment_method) {
                return false;
            }
        }
        if let Some(min) = self.min_amount {
            if expense.amount < min {
                return false;
            }
        }
        if let Some(max) = self.max_amount {
            if expense.amount > max {
                return false;
            }
        }
        if let Some(tags) = &self.tags {
            if !expense.has_any_tag(tags) {
                return false;
            }
        }
        true
    }
}

/// Field a query result can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Date,
    Amount,
    Category,
}

/// Service for expense operations
pub struct ExpenseService<'a> {
    storage: &'a Storage,
}

impl<'a> ExpenseService<'a> {
    /// Create a new expense service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Validate and record a new expense, returning the stored record
    pub fn add(&self, draft: NewExpense) -> SpendlogResult<Expense> {
        let expense = Expense::from_draft(draft)?;

        self.storage.expenses.append(expense.clone())?;
        self.storage.expenses.save()?;

        tracing::info!(
            id = %expense.id,
            amount = %expense.amount,
            category = %expense.category,
            "expense added"
        );
        Ok(expense)
    }

    /// Apply a partial update, preserving the record's id and position
    pub fn update(&self, id: ExpenseId, update: ExpenseUpdate) -> SpendlogResult<Expense> {
        let mut expense = self
            .storage
            .expenses
            .get(id)?
            .ok_or_else(|| SpendlogError::expense_not_found(id.to_string()))?;

        expense.apply_update(update)?;

        self.storage.expenses.replace(expense.clone())?;
        self.storage.expenses.save()?;

        tracing::info!(id = %expense.id, "expense updated");
        Ok(expense)
    }

    /// Delete an expense; targeting a missing id is an error, not a no-op
    pub fn delete(&self, id: ExpenseId) -> SpendlogResult<()> {
        if !self.storage.expenses.remove(id)? {
            return Err(SpendlogError::expense_not_found(id.to_string()));
        }
        self.storage.expenses.save()?;

        tracing::info!(id = %id, "expense deleted");
        Ok(())
    }

    /// Look up a single expense
    pub fn get(&self, id: ExpenseId) -> SpendlogResult<Expense> {
        self.storage
            .expenses
            .get(id)?
            .ok_or_else(|| SpendlogError::expense_not_found(id.to_string()))
    }

    /// Return the expenses matching all of the filter's predicates
    ///
    /// Result order is insertion order unless a sort key is given; sorts
    /// are stable, so equal keys keep their insertion order.
    pub fn query(
        &self,
        filter: &ExpenseFilter,
        sort: Option<SortKey>,
    ) -> SpendlogResult<Vec<Expense>> {
        let mut matched: Vec<Expense> = self
            .storage
            .expenses
            .get_all()?
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect();

        match sort {
            Some(SortKey::Date) => matched.sort_by_key(|e| e.date),
            Some(SortKey::Amount) => matched.sort_by_key(|e| e.amount),
            Some(SortKey::Category) => matched.sort_by(|a, b| a.category.cmp(&b.category)),
            None => {}
        }

        Ok(matched)
    }
}
