//! Typed services over [`ApiClient`](crate::client::ApiClient).
//!
//! Each service is a thin pass-through: it builds a `RequestDescriptor` and
//! lets the client apply caching, retries and invalidation.

pub mod auth;
pub mod goals;
pub mod reports;
pub mod resource;
pub mod transactions;

use crate::models::{
    Account, Budget, Category, CreateAccount, CreateBudget, CreateCategory, CreateGoal,
    CreateTransaction, Goal, Transaction, UpdateAccount, UpdateBudget, UpdateCategory, UpdateGoal,
    UpdateTransaction,
};

pub use auth::AuthService;
pub use reports::ReportsService;
pub use resource::ResourceService;

pub type AccountsService = ResourceService<Account, CreateAccount, UpdateAccount>;
pub type TransactionsService = ResourceService<Transaction, CreateTransaction, UpdateTransaction>;
pub type CategoriesService = ResourceService<Category, CreateCategory, UpdateCategory>;
pub type BudgetsService = ResourceService<Budget, CreateBudget, UpdateBudget>;
pub type GoalsService = ResourceService<Goal, CreateGoal, UpdateGoal>;
