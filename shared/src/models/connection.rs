//! Connection Model (用水连接)

use serde::{Deserialize, Serialize};

use super::consumer::Consumer;
use crate::types::DateInput;

/// Connection type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum ConnectionType {
    #[default]
    Residential,
    Commercial,
}

/// Connection status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum ConnectionStatus {
    #[default]
    Active,
    Disconnected,
}

/// Connection entity (one metered hookup of one consumer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Connection {
    pub id: i64,
    pub consumer_id: i64,
    /// 水表编号 (全局唯一)
    pub meter_number: String,
    pub address: String,
    /// 接通日期 (Unix millis)
    pub connection_date: i64,
    pub connection_type: ConnectionType,
    pub status: ConnectionStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create connection payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionCreate {
    pub consumer_id: i64,
    pub meter_number: String,
    pub address: String,
    /// Defaults to the creation time when omitted
    #[serde(default)]
    pub connection_date: Option<DateInput>,
    #[serde(default)]
    pub connection_type: Option<ConnectionType>,
}

/// Update connection payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionUpdate {
    pub address: Option<String>,
    pub connection_type: Option<ConnectionType>,
    pub status: Option<ConnectionStatus>,
}

/// Connection with its owning consumer (for detail views and populated bills)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionDetail {
    #[serde(flatten)]
    pub connection: Connection,
    pub consumer: Consumer,
}

/// Connection list filters (query string)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionQuery {
    pub consumer_id: Option<i64>,
    pub status: Option<ConnectionStatus>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}
