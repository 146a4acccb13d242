//! Business logic services
//!
//! Services sit between callers and storage: they validate inputs, apply
//! mutations, and persist after every change. Each service borrows the
//! storage owned by the caller; nothing is held in process-wide state.

mod budget;
mod expense;

pub use budget::{BudgetService, OverspendAlert};
pub use expense::{ExpenseFilter, ExpenseService, SortKey};
