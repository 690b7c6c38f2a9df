use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::db::CustomerStore;
use crate::error::AppError;
use crate::models::{Customer, CustomerData};
use crate::storage::{FileStorage, UploadedFile};

pub const IMAGE_PREFIX: &str = "cover";

/// Owner-scoped customer records and their images. A record that exists
/// but belongs to someone else is reported exactly like a missing one.
pub struct CustomerService {
    store: Arc<dyn CustomerStore>,
    files: FileStorage,
    /// Serializes mutations of one record so an image swap can't interleave
    /// with another write to the same row.
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl CustomerService {
    pub fn new(store: Arc<dyn CustomerStore>, files: FileStorage) -> Self {
        Self {
            store,
            files,
            locks: DashMap::new(),
        }
    }

    pub fn files(&self) -> &FileStorage {
        &self.files
    }

    /// Holds the record's mutex until the returned guard drops. The map
    /// entry is removed once nobody holds or waits on it.
    async fn lock_record(&self, id: Uuid) -> RecordGuard<'_> {
        let mutex = self.locks.entry(id).or_default().clone();
        RecordGuard {
            locks: &self.locks,
            id,
            guard: Some(mutex.lock_owned().await),
        }
    }

    async fn owns(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        Ok(self.store.find_for_user(id, user_id).await?.is_some())
    }

    /// Newest first.
    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Customer>, AppError> {
        let mut customers = self.store.list_by_user(user_id).await?;
        customers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(customers)
    }

    pub async fn get_by_id_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Customer>, AppError> {
        Ok(self.store.find_for_user(id, user_id).await?)
    }

    /// Inserts the row, then stores a non-empty image under the new id and
    /// writes the row again with its filename. If the image can't be
    /// written the error is returned and the row stays without an image.
    pub async fn create(
        &self,
        data: CustomerData,
        user_id: Uuid,
        image: Option<&UploadedFile>,
    ) -> Result<Customer, AppError> {
        let mut customer = self
            .store
            .insert(&Customer::for_insert(data, user_id))
            .await?;
        tracing::info!(customer_id = %customer.id, %user_id, "customer created");

        let Some(image) = image.filter(|f| !f.is_empty()) else {
            return Ok(customer);
        };

        let _guard = self.lock_record(customer.id).await;

        let filename = self.files.store(image, customer.id, IMAGE_PREFIX).await?;
        customer.image_url = Some(filename);
        customer.touch();

        self.store
            .update(&customer)
            .await?
            .ok_or_else(|| AppError::NotFound("customer not found".to_string()))
    }

    /// Replaces the text fields. The stored image reference is carried over
    /// unchanged.
    pub async fn update(
        &self,
        id: Uuid,
        data: CustomerData,
        user_id: Uuid,
    ) -> Result<Option<Customer>, AppError> {
        if !self.owns(id, user_id).await? {
            return Ok(None);
        }
        let _guard = self.lock_record(id).await;

        let Some(mut customer) = self.store.find_for_user(id, user_id).await? else {
            return Ok(None);
        };
        customer.apply(data);
        customer.touch();
        Ok(self.store.update(&customer).await?)
    }

    /// `None` when the record is not the caller's or no usable file was sent.
    /// The old image is removed best-effort before the new one is written.
    pub async fn update_image(
        &self,
        id: Uuid,
        image: Option<&UploadedFile>,
        user_id: Uuid,
    ) -> Result<Option<Customer>, AppError> {
        let Some(image) = image.filter(|f| !f.is_empty()) else {
            return Ok(None);
        };
        if !self.owns(id, user_id).await? {
            return Ok(None);
        }
        let _guard = self.lock_record(id).await;

        let Some(mut customer) = self.store.find_for_user(id, user_id).await? else {
            return Ok(None);
        };

        let old = customer.image_url.take();
        if let Some(old) = &old {
            if !self.files.delete(old).await {
                tracing::warn!(customer_id = %id, filename = %old, "old image was not removed");
            }
        }

        let prefix = replacement_prefix(old.as_deref());
        let filename = self.files.store(image, customer.id, &prefix).await?;
        customer.image_url = Some(filename);
        customer.touch();

        Ok(self.store.update(&customer).await?)
    }

    /// No-op for ids the caller doesn't own. The image goes first; failing
    /// to remove it never keeps the row alive.
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        if !self.owns(id, user_id).await? {
            return Ok(());
        }
        let _guard = self.lock_record(id).await;

        let Some(customer) = self.store.find_for_user(id, user_id).await? else {
            return Ok(());
        };

        if let Some(image) = &customer.image_url {
            self.files.delete(image).await;
        }
        if self.store.delete(id, user_id).await? {
            tracing::info!(customer_id = %id, %user_id, "customer deleted");
        }
        Ok(())
    }

    /// Record count per stored type string. Empty when the caller has none.
    pub async fn chart_summary(&self, user_id: Uuid) -> Result<BTreeMap<String, i64>, AppError> {
        Ok(self
            .store
            .count_by_type(user_id)
            .await?
            .into_iter()
            .collect())
    }
}

struct RecordGuard<'a> {
    locks: &'a DashMap<Uuid, Arc<Mutex<()>>>,
    id: Uuid,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for RecordGuard<'_> {
    fn drop(&mut self) {
        // Release first so the map holds the only remaining handle.
        self.guard.take();
        self.locks
            .remove_if(&self.id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

/// A prefix whose filename can't collide with the image being replaced.
fn replacement_prefix(old: Option<&str>) -> String {
    loop {
        let prefix = format!("{IMAGE_PREFIX}-{:08x}", rand::random::<u32>());
        if !old.is_some_and(|old| old.starts_with(&format!("{prefix}_"))) {
            return prefix;
        }
    }
}
