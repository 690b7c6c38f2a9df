//! Operations handlers call after validation. Each one is scoped to the
//! identity the gate resolved.

pub mod auth;
pub mod customers;
pub mod dashboard;

pub use auth::AuthService;
pub use customers::CustomerService;
pub use dashboard::{Dashboard, dashboard_for};
