use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_CUSTOMER_TYPE: &str = "Regular";
pub const VIP_CUSTOMER_TYPE: &str = "VIP";

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub customer_type: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The mutable text fields of a customer, as submitted by a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(rename = "type")]
    pub customer_type: Option<String>,
}

impl Customer {
    /// Builds the row for a first insert: assigns id, owner and timestamps,
    /// and falls back to the default type when none was given.
    pub fn for_insert(data: CustomerData, user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            name: data.name,
            email: data.email,
            phone: data.phone,
            address: data.address,
            customer_type: data
                .customer_type
                .unwrap_or_else(|| DEFAULT_CUSTOMER_TYPE.to_string()),
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites the text fields. Owner, id and image are left alone.
    /// An absent type keeps the stored one.
    pub fn apply(&mut self, data: CustomerData) {
        self.name = data.name;
        self.email = data.email;
        self.phone = data.phone;
        self.address = data.address;
        if let Some(customer_type) = data.customer_type {
            self.customer_type = customer_type;
        }
    }

    /// Called before every update is persisted.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn is_vip(&self) -> bool {
        self.customer_type.eq_ignore_ascii_case(VIP_CUSTOMER_TYPE)
    }
}
