//! Monthly budget status for a category.
//!
//! A category's `budget_limit` caps what may be spent in it per calendar
//! month. A limit of zero means the category is not budgeted.

use serde::{Deserialize, Serialize};

/// Share of the limit above which a budget counts as nearly used up
pub const NEAR_LIMIT_RATIO: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetStatus {
    NoLimit,
    OnTrack,
    NearLimit,
    OverBudget,
}

/// Evaluated budget for one category and month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub status: BudgetStatus,

    /// Spent as a percentage of the limit, capped at 100
    pub percent_used: f64,
}

impl BudgetSummary {
    pub fn evaluate(limit: f64, spent: f64) -> Self {
        if limit <= 0.0 {
            return Self {
                status: BudgetStatus::NoLimit,
                percent_used: 0.0,
            };
        }

        let ratio = spent / limit;
        let status = if spent > limit {
            BudgetStatus::OverBudget
        } else if ratio > NEAR_LIMIT_RATIO {
            BudgetStatus::NearLimit
        } else {
            BudgetStatus::OnTrack
        };

        Self {
            status,
            percent_used: (ratio * 100.0).min(100.0),
        }
    }
}
