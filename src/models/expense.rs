//! Expense record model
//!
//! An [`Expense`] is a single recorded spending event. Records enter the
//! store through a validated [`NewExpense`] draft and are modified through
//! an [`ExpenseUpdate`] patch, so malformed data is rejected at the
//! boundary rather than propagated inward.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ids::ExpenseId;
use super::money::Money;
use crate::error::{SpendlogError, SpendlogResult};

/// A single recorded spending event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier, assigned on creation and stable for the record's lifetime
    pub id: ExpenseId,

    /// Amount spent (always positive)
    pub amount: Money,

    /// Date the expense occurred
    pub date: NaiveDate,

    /// Category label (open set, non-empty)
    pub category: String,

    /// Free-text description
    #[serde(default)]
    pub description: String,

    /// Payment method label (open set, non-empty)
    pub payment_method: String,

    /// Tag labels
    #[serde(default)]
    pub tags: BTreeSet<String>,

    /// When the record was created
    pub created_at: DateTime<Utc>,

    /// When the record was last modified
    pub updated_at: DateTime<Utc>,
}

/// A draft expense, validated before it becomes a stored [`Expense`]
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub amount: Money,
    pub date: NaiveDate,
    pub category: String,
    pub description: String,
    pub payment_method: String,
    pub tags: BTreeSet<String>,
}

impl NewExpense {
    /// Create a draft with the required fields and empty metadata
    pub fn new(
        amount: Money,
        date: NaiveDate,
        category: impl Into<String>,
        payment_method: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            date,
            category: category.into(),
            description: String::new(),
            payment_method: payment_method.into(),
            tags: BTreeSet::new(),
        }
    }

    /// Attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Attach tags
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Validate the draft, identifying the offending field on failure
    pub fn validate(&self) -> SpendlogResult<()> {
        validate_amount(self.amount)?;
        validate_category(&self.category)?;
        validate_payment_method(&self.payment_method)?;
        Ok(())
    }
}

impl Expense {
    /// Promote a validated draft into a stored record with a fresh identifier
    pub fn from_draft(draft: NewExpense) -> SpendlogResult<Self> {
        draft.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: ExpenseId::new(),
            amount: draft.amount,
            date: draft.date,
            category: draft.category.trim().to_string(),
            description: draft.description,
            payment_method: draft.payment_method.trim().to_string(),
            tags: draft.tags,
            created_at: now,
            updated_at: now,
        })
    }

    /// Check whether this expense carries at least one of the given tags
    pub fn has_any_tag(&self, tags: &BTreeSet<String>) -> bool {
        !self.tags.is_disjoint(tags)
    }

    /// Apply a validated patch, preserving the identifier
    pub fn apply_update(&mut self, update: ExpenseUpdate) -> SpendlogResult<()> {
        update.validate()?;

        if let Some(amount) = update.amount {
            self.amount = amount;
        }
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(category) = update.category {
            self.category = category.trim().to_string();
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(payment_method) = update.payment_method {
            self.payment_method = payment_method.trim().to_string();
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// A partial update to an existing expense; only the supplied fields change
#[derive(Debug, Clone, Default)]
pub struct ExpenseUpdate {
    pub amount: Option<Money>,
    pub date: Option<NaiveDate>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub payment_method: Option<String>,
    pub tags: Option<BTreeSet<String>>,
}

impl ExpenseUpdate {
    /// An empty patch
    pub fn new() -> Self {
        Self::default()
    }

    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn payment_method(mut self, payment_method: impl Into<String>) -> Self {
        self.payment_method = Some(payment_method.into());
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

    /// Check whether the patch changes anything at all
    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.date.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.payment_method.is_none()
            && self.tags.is_none()
    }

    /// Re-validate only the fields this patch touches
    pub fn validate(&self) -> SpendlogResult<()> {
        if let Some(amount) = self.amount {
            validate_amount(amount)?;
        }
        if let Some(category) = &self.category {
            validate_category(category)?;
        }
        if let Some(payment_method) = &self.payment_method {
            validate_payment_method(payment_method)?;
        }
        Ok(())
    }
}

fn validate_amount(amount: Money) -> SpendlogResult<()> {
    if amount.is_positive() {
        Ok(())
    } else {
        Err(SpendlogError::validation(
            "amount",
            format!("must be greater than zero, got {}", amount),
        ))
    }
}

fn validate_category(category: &str) -> SpendlogResult<()> {
    if category.trim().is_empty() {
        Err(SpendlogError::validation("category", "must not be empty"))
    } else {
        Ok(())
    }
}

fn validate_payment_method(payment_method: &str) -> SpendlogResult<()> {
    if payment_method.trim().is_empty() {
        Err(SpendlogError::validation(
            "payment_method",
            "must not be empty",
        ))
    } else {
        Ok(())
    }
}
