//! Consumer Model (用户)

use serde::{Deserialize, Serialize};

/// Consumer entity (account holder owning one or more connections)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Consumer {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create consumer payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumerCreate {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Update consumer payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsumerUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

/// Consumer list filters (query string)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsumerQuery {
    /// Matches name, email or phone
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}
