use std::sync::Arc;

use crate::auth::gate::{AuthGate, PublicPaths};
use crate::auth::jwt::TokenService;
use crate::config::Config;
use crate::db::{CredentialStore, CustomerStore};
use crate::rate_limit::LoginRateLimiter;
use crate::services::{AuthService, CustomerService};
use crate::storage::FileStorage;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub tokens: Arc<TokenService>,
    pub gate: AuthGate,
    pub auth: AuthService,
    pub customers: CustomerService,
}

impl AppState {
    /// Wires services onto whichever backend the caller picked.
    pub fn new(
        config: Config,
        credentials: Arc<dyn CredentialStore>,
        customers: Arc<dyn CustomerStore>,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(
            &config.jwt_secret,
            chrono::Duration::hours(config.token_ttl_hours),
        ));
        let gate = AuthGate::new(
            tokens.clone(),
            credentials.clone(),
            PublicPaths::new(config.public_paths.clone()),
        );
        let auth = AuthService::new(credentials, tokens.clone(), LoginRateLimiter::default());
        let customers = CustomerService::new(customers, FileStorage::new(&config.upload_dir));

        Self {
            config,
            tokens,
            gate,
            auth,
            customers,
        }
    }
}
