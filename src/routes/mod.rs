pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod users;

use axum::Router;
use axum::routing::{get, post, put};

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        // Account
        .route("/api/users/me", put(users::update_profile))
        .route("/api/users/me/password", put(users::change_password))
        // Customers
        .route(
            "/api/customers",
            get(customers::list).post(customers::create),
        )
        .route("/api/customers/chart", get(customers::chart))
        .route(
            "/api/customers/{id}",
            get(customers::get)
                .put(customers::update)
                .delete(customers::delete),
        )
        .route("/api/customers/{id}/image", put(customers::update_image))
        // Dashboard
        .route("/api/dashboard", get(dashboard::show))
}
