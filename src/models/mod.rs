//! Core data models for spendlog
//!
//! This module contains all the data structures that represent the expense
//! tracking domain: expenses, budgets, periods, and monetary amounts.

pub mod budget;
pub mod expense;
pub mod ids;
pub mod money;
pub mod period;

pub use budget::{Budget, BudgetScope};
pub use expense::{Expense, ExpenseUpdate, NewExpense};
pub use ids::ExpenseId;
pub use money::Money;
pub use period::{Granularity, Period};
