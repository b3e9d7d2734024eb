//! Simulated actors and catalog entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered shopper, as stored in the `user` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// `M` or `F`; first and last names are chosen to match.
    pub gender: String,
    pub address: String,
    pub ip_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The identity a session acts under. Every event it emits carries these values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
    pub ip_address: String,
    pub user_agent: String,
}

impl Identity {
    /// Build an identity for a user browsing with the given user agent.
    pub fn for_user(user: &User, user_agent: impl Into<String>) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            ip_address: user.ip_address.clone(),
            user_agent: user_agent.into(),
        }
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub main_category: String,
    pub sub_category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}
