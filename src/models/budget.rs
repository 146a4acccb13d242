//! Budget model
//!
//! A [`Budget`] is a spending limit for a scope (overall or one category)
//! within a [`Period`]. At most one budget exists per (scope, period) pair;
//! the repository enforces this by keying on both.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;
use super::period::Period;
use crate::error::{SpendlogError, SpendlogResult};

/// The aggregation boundary a budget applies to
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BudgetScope {
    /// All expenses regardless of category
    Overall,
    /// Only expenses in the named category
    Category(String),
}

impl BudgetScope {
    /// Parse the persisted scope label ("overall" is reserved)
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.eq_ignore_ascii_case("overall") {
            Self::Overall
        } else {
            Self::Category(s.to_string())
        }
    }

    /// Check whether an expense category falls inside this scope
    pub fn matches_category(&self, category: &str) -> bool {
        match self {
            Self::Overall => true,
            Self::Category(name) => name == category,
        }
    }
}

impl fmt::Display for BudgetScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overall => write!(f, "overall"),
            Self::Category(name) => write!(f, "{}", name),
        }
    }
}

/// A spending limit for a scope and period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    /// Overall or a specific category
    pub scope: BudgetScope,

    /// The period the limit applies to
    pub period: Period,

    /// Limit amount (always positive)
    pub limit: Money,
}

impl Budget {
    /// Create a budget, validating the limit
    pub fn new(scope: BudgetScope, period: Period, limit: Money) -> SpendlogResult<Self> {
        if !limit.is_positive() {
            return Err(SpendlogError::validation(
                "limit",
                format!("must be greater than zero, got {}", limit),
            ));
        }
        Ok(Self {
            scope,
            period,
            limit,
        })
    }

    /// The map key a budget is stored under
    pub fn key(&self) -> (BudgetScope, Period) {
        (self.scope.clone(), self.period.clone())
    }
}
