use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An API caller. `api_key` and `email` are unique across merchants.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Merchant {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub api_key: String,
    pub api_secret: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Merchant {
    pub fn new(
        id: Uuid,
        name: impl Into<String>,
        email: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            email: email.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
