use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use crate::db::{CredentialStore, CustomerStore, StoreError};
use crate::models::{AuthToken, Customer, User};

/// Process-local store with the same contract as `PgStore`.
/// Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<Uuid, User>,
    /// email -> user id, enforces uniqueness
    emails: DashMap<String, Uuid>,
    tokens: DashMap<Uuid, AuthToken>,
    customers: DashMap<Uuid, Customer>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let Some(id) = self.emails.get(email).map(|e| *e.value()) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn save(&self, user: &User) -> Result<User, StoreError> {
        let previous_email = self.users.get(&user.id).map(|u| u.email.clone());

        match self.emails.entry(user.email.clone()) {
            Entry::Occupied(entry) if *entry.get() != user.id => {
                return Err(StoreError::ConstraintViolation(
                    "email already exists".to_string(),
                ));
            }
            Entry::Occupied(_) => {}
            Entry::Vacant(entry) => {
                entry.insert(user.id);
            }
        }

        if let Some(old) = previous_email.filter(|old| *old != user.email) {
            self.emails.remove_if(&old, |_, owner| *owner == user.id);
        }

        let mut stored = user.clone();
        if let Some(existing) = self.users.get(&user.id) {
            stored.created_at = existing.created_at;
        }
        self.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_user_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
    ) -> Result<Option<AuthToken>, StoreError> {
        Ok(self
            .tokens
            .iter()
            .find(|t| t.user_id == user_id && t.token_hash == token_hash)
            .map(|t| t.value().clone()))
    }

    async fn save_token(&self, token: &AuthToken) -> Result<AuthToken, StoreError> {
        self.tokens.insert(token.id, token.clone());
        Ok(token.clone())
    }

    async fn delete_tokens_for_user(&self, user_id: Uuid) -> Result<(), StoreError> {
        self.tokens.retain(|_, t| t.user_id != user_id);
        Ok(())
    }
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Customer>, StoreError> {
        let mut rows: Vec<Customer> = self
            .customers
            .iter()
            .filter(|c| c.user_id == user_id)
            .map(|c| c.value().clone())
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn find_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Customer>, StoreError> {
        Ok(self
            .customers
            .get(&id)
            .filter(|c| c.user_id == user_id)
            .map(|c| c.value().clone()))
    }

    async fn insert(&self, customer: &Customer) -> Result<Customer, StoreError> {
        match self.customers.entry(customer.id) {
            Entry::Occupied(_) => Err(StoreError::ConstraintViolation(
                "customer already exists".to_string(),
            )),
            Entry::Vacant(entry) => {
                entry.insert(customer.clone());
                Ok(customer.clone())
            }
        }
    }

    async fn update(&self, customer: &Customer) -> Result<Option<Customer>, StoreError> {
        let Some(mut row) = self.customers.get_mut(&customer.id) else {
            return Ok(None);
        };
        if row.user_id != customer.user_id {
            return Ok(None);
        }
        let created_at = row.created_at;
        *row = Customer {
            created_at,
            ..customer.clone()
        };
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        Ok(self
            .customers
            .remove_if(&id, |_, c| c.user_id == user_id)
            .is_some())
    }

    async fn count_by_type(&self, user_id: Uuid) -> Result<Vec<(String, i64)>, StoreError> {
        let mut counts: HashMap<String, i64> = HashMap::new();
        for row in self.customers.iter().filter(|c| c.user_id == user_id) {
            *counts.entry(row.customer_type.clone()).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }
}
