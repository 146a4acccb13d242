//! Read-side reporting engine
//!
//! Pure functions over slices of expenses: no state is held between calls,
//! so the same inputs always produce the same report. Callers pick the
//! subset (typically via `ExpenseService::query`) and a function here
//! aggregates it.
//!
//! Statistics are returned in currency units as floats; the amounts
//! themselves stay in integer cents until this edge. Empty input is never
//! an error: undefined statistics come back as `None`.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{Budget, BudgetScope, Expense, Granularity, Money, Period};

/// Summary statistics over the amount field
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub total: Money,
    /// None when there are no expenses
    pub mean: Option<f64>,
    /// None when there are no expenses; midpoint of the two middle values
    /// for an even count
    pub median: Option<f64>,
    /// Population standard deviation; None when there are no expenses
    pub std_dev: Option<f64>,
    pub min: Option<Money>,
    pub max: Option<Money>,
}

/// One category's share of spending
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySlice {
    pub category: String,
    pub count: usize,
    pub total: Money,
    pub mean: f64,
    /// Share of the grand total, 0..=100
    pub percentage: f64,
}

/// Spending in one time bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendPoint {
    pub period: Period,
    pub count: usize,
    pub total: Money,
}

/// One budget's limit against actual spend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetComparison {
    pub scope: BudgetScope,
    pub limit: Money,
    pub actual: Money,
    /// actual − limit; negative while under budget
    pub variance: Money,
    /// True iff actual strictly exceeds the limit
    pub overspent: bool,
}

/// Compute summary statistics over the amount field
pub fn summary(expenses: &[Expense]) -> Summary {
    if expenses.is_empty() {
        return Summary {
            count: 0,
            total: Money::zero(),
            mean: None,
            median: None,
            std_dev: None,
            min: None,
            max: None,
        };
    }

    let count = expenses.len();
    let total: Money = expenses.iter().map(|e| e.amount).sum();
    let mean = total.to_f64() / count as f64;

    let mut cents: Vec<i64> = expenses.iter().map(|e| e.amount.cents()).collect();
    cents.sort_unstable();
    let median = if count % 2 == 1 {
        cents[count / 2] as f64 / 100.0
    } else {
        (cents[count / 2 - 1] + cents[count / 2]) as f64 / 200.0
    };

    let variance_sum: f64 = expenses
        .iter()
        .map(|e| {
            let d = e.amount.to_f64() - mean;
            d * d
        })
        .sum();
    let std_dev = (variance_sum / count as f64).sqrt();

    Summary {
        count,
        total,
        mean: Some(mean),
        median: Some(median),
        std_dev: Some(std_dev),
        min: Some(Money::from_cents(cents[0])),
        max: Some(Money::from_cents(cents[count - 1])),
    }
}

/// Break spending down by category, sorted by category name
///
/// Percentages are shares of the grand total and sum to 100 within float
/// rounding for non-empty input. Empty input yields an empty vec.
pub fn category_breakdown(expenses: &[Expense]) -> Vec<CategorySlice> {
    let mut groups: BTreeMap<&str, (usize, Money)> = BTreeMap::new();
    for expense in expenses {
        let entry = groups.entry(&expense.category).or_insert((0, Money::zero()));
        entry.0 += 1;
        entry.1 += expense.amount;
    }

    let grand_total: Money = expenses.iter().map(|e| e.amount).sum();

    groups
        .into_iter()
        .map(|(category, (count, total))| CategorySlice {
            category: category.to_string(),
            count,
            total,
            mean: total.to_f64() / count as f64,
            percentage: if grand_total.is_zero() {
                0.0
            } else {
                total.to_f64() / grand_total.to_f64() * 100.0
            },
        })
        .collect()
}

/// Bucket spending over time, ordered by bucket start
///
/// Buckets with no expenses are omitted; callers must not assume the
/// sequence is gap-free.
pub fn time_trend(expenses: &[Expense], granularity: Granularity) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<Period, (usize, Money)> = BTreeMap::new();
    for expense in expenses {
        let bucket = granularity.bucket_of(expense.date);
        let entry = buckets.entry(bucket).or_insert((0, Money::zero()));
        entry.0 += 1;
        entry.1 += expense.amount;
    }

    buckets
        .into_iter()
        .map(|(period, (count, total))| TrendPoint {
            period,
            count,
            total,
        })
        .collect()
}

/// The n largest expenses by amount, descending
///
/// Ties keep their original slice order. When n is at least the slice
/// length, every expense comes back.
pub fn top_n(expenses: &[Expense], n: usize) -> Vec<Expense> {
    let mut ranked = expenses.to_vec();
    // Stable sort, so equal amounts preserve insertion order
    ranked.sort_by(|a, b| b.amount.cmp(&a.amount));
    ranked.truncate(n);
    ranked
}

/// Compare each budget for the given period against actual spend
///
/// Budgets match on period equality, not range overlap. An overall scope
/// aggregates every expense dated within the period; a category scope only
/// that category's. Results are ordered by scope, overall first.
pub fn budget_vs_actual(
    expenses: &[Expense],
    budgets: &[Budget],
    period: &Period,
) -> Vec<BudgetComparison> {
    let mut comparisons: Vec<BudgetComparison> = budgets
        .iter()
        .filter(|b| &b.period == period)
        .map(|budget| {
            let actual: Money = expenses
                .iter()
                .filter(|e| period.contains(e.date))
                .filter(|e| budget.scope.matches_category(&e.category))
                .map(|e| e.amount)
                .sum();
            BudgetComparison {
                scope: budget.scope.clone(),
                limit: budget.limit,
                actual,
                variance: actual - budget.limit,
                overspent: actual > budget.limit,
            }
        })
        .collect();

    comparisons.sort_by(|a, b| a.scope.cmp(&b.scope));
    comparisons
}

/// Summary statistics restricted to a date range (inclusive on both ends)
pub fn range_summary(expenses: &[Expense], start: NaiveDate, end: NaiveDate) -> Summary {
    let in_range: Vec<Expense> = expenses
        .iter()
        .filter(|e| e.date >= start && e.date <= end)
        .cloned()
        .collect();
    summary(&in_range)
}
