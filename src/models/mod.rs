pub mod auth_token;
pub mod customer;
pub mod user;

pub use auth_token::AuthToken;
pub use customer::{Customer, CustomerData};
pub use user::{PublicUser, User};
