//! Dashboard aggregates.
//!
//! Everything is recomputed per request from the base tables. The SQL does
//! the grouping; the small reducers here turn grouped rows into the shapes
//! the dashboard consumes and are tested on their own.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::collections::BTreeMap;

use crate::auth::authorization::Owner;
use crate::calendar::{add_days, month_start, next_month_start, sub_months};
use crate::models::account::Account;
use crate::models::recurring_rule::{Frequency, RecurringRule};
use crate::models::transaction::TransactionType;

/// How far ahead upcoming bills are listed, in days
pub const UPCOMING_BILLS_DAYS: u64 = 7;

/// Length of the income/expense trend, in months
pub const TREND_MONTHS: u32 = 12;

/// Label for spending whose category no longer exists
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingBill {
    pub id: i64,
    pub description: Option<String>,
    pub amount: f64,
    pub next_run_date: NaiveDate,
    pub frequency: Frequency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    /// Sum of all account balances
    pub net_worth: f64,
    pub monthly_income: f64,
    pub monthly_expense: f64,
    pub upcoming_bills: Vec<UpcomingBill>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTrend {
    /// `YYYY-MM`
    pub month: String,
    pub income: f64,
    pub expense: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpending {
    pub name: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charts {
    /// Ascending by month
    pub history: Vec<MonthlyTrend>,

    /// Descending by total
    pub categories: Vec<CategorySpending>,
}

/// Net worth, this month's totals and the bills due in the next week
pub async fn overview(pool: &SqlitePool, owner: Owner, today: NaiveDate) -> Result<Overview, sqlx::Error> {
    let net_worth = Account::net_worth(pool, owner).await?;

    let month_rows: Vec<(TransactionType, f64)> = sqlx::query_as(
        r#"
        SELECT type, COALESCE(SUM(amount), 0.0)
        FROM transactions
        WHERE user_id = ? AND transaction_date >= ? AND transaction_date < ?
        GROUP BY type
        "#,
    )
    .bind(owner)
    .bind(month_start(today))
    .bind(next_month_start(today))
    .fetch_all(pool)
    .await?;

    let (monthly_income, monthly_expense) = fold_type_totals(&month_rows);

    let upcoming_bills = RecurringRule::upcoming_expenses(
        pool,
        owner,
        today,
        add_days(today, UPCOMING_BILLS_DAYS),
    )
    .await?
    .into_iter()
    .map(|rule| UpcomingBill {
        id: rule.id,
        description: rule.description,
        amount: rule.amount,
        next_run_date: rule.next_run_date,
        frequency: rule.frequency,
    })
    .collect();

    Ok(Overview {
        net_worth,
        monthly_income,
        monthly_expense,
        upcoming_bills,
    })
}

/// Twelve-month income/expense trend and all-time spending by category
pub async fn charts(pool: &SqlitePool, owner: Owner, today: NaiveDate) -> Result<Charts, sqlx::Error> {
    let trend_rows: Vec<(String, TransactionType, f64)> = sqlx::query_as(
        r#"
        SELECT strftime('%Y-%m', transaction_date) AS month, type, COALESCE(SUM(amount), 0.0)
        FROM transactions
        WHERE user_id = ? AND transaction_date >= ?
        GROUP BY month, type
        ORDER BY month ASC
        "#,
    )
    .bind(owner)
    .bind(sub_months(today, TREND_MONTHS))
    .fetch_all(pool)
    .await?;

    let categories: Vec<(String, f64)> = sqlx::query_as(
        r#"
        SELECT COALESCE(c.name, ?) AS name, COALESCE(SUM(t.amount), 0.0) AS total
        FROM transactions t
        LEFT JOIN categories c ON c.id = t.category_id
        WHERE t.user_id = ? AND t.type = 'EXPENSE'
        GROUP BY COALESCE(c.name, ?)
        HAVING total > 0
        ORDER BY total DESC, name ASC
        "#,
    )
    .bind(UNCATEGORIZED)
    .bind(owner)
    .bind(UNCATEGORIZED)
    .fetch_all(pool)
    .await?;

    Ok(Charts {
        history: fold_trend(&trend_rows),
        categories: categories
            .into_iter()
            .map(|(name, total)| CategorySpending { name, total })
            .collect(),
    })
}

/// Splits per-type sums into (income, expense)
pub fn fold_type_totals(rows: &[(TransactionType, f64)]) -> (f64, f64) {
    rows.iter().fold((0.0, 0.0), |(income, expense), (kind, total)| match kind {
        TransactionType::Income => (income + total, expense),
        TransactionType::Expense => (income, expense + total),
    })
}

/// Folds (month, type, total) rows into one entry per month, ascending
pub fn fold_trend(rows: &[(String, TransactionType, f64)]) -> Vec<MonthlyTrend> {
    let mut months: BTreeMap<&str, (f64, f64)> = BTreeMap::new();

    for (month, kind, total) in rows {
        let entry = months.entry(month.as_str()).or_insert((0.0, 0.0));
        match kind {
            TransactionType::Income => entry.0 += total.abs(),
            TransactionType::Expense => entry.1 += total.abs(),
        }
    }

    months
        .into_iter()
        .map(|(month, (income, expense))| MonthlyTrend {
            month: month.to_string(),
            income,
            expense,
        })
        .collect()
}
