/// Database models for Ledgerline
///
/// Each model owns the SQL for its table. Every function that touches
/// user data takes an [`Owner`](crate::auth::authorization::Owner) and
/// filters by it.
///
/// # Models
///
/// - `user`: Registered users and registration seeding
/// - `account`: Wallets, bank accounts and cards with a manual balance
/// - `category`: Income/expense categories with monthly budgets
/// - `transaction`: Dated income and expense entries
/// - `recurring_rule`: Templates realized by the recurring processor
/// - `savings_goal`: Goals that grow through contributions
/// - `settings`: Per-user localization
/// - `activity_log`: Append-only audit trail
///
/// # Example
///
/// ```no_run
/// use ledgerline_shared::models::account::{Account, AccountInput, AccountType};
/// use ledgerline_shared::auth::authorization::Owner;
/// use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool) -> Result<(), sqlx::Error> {
/// let owner = Owner::new(1);
/// let account = Account::create(&pool, owner, AccountInput {
///     name: "Checking".to_string(),
///     account_type: AccountType::Bank,
///     balance: 1200.0,
///     color: None,
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```

pub mod account;
pub mod activity_log;
pub mod category;
pub mod recurring_rule;
pub mod savings_goal;
pub mod settings;
pub mod transaction;
pub mod user;
