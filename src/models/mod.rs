//! # Data Models
//!
//! SeaORM entities for every table plus the API-facing response types.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod access_log;
pub mod activity_log;
pub mod admin;
pub mod feedback;
pub mod guest;
pub mod mac_address;
pub mod notification;
pub mod rfid_tag;
pub mod room;
pub mod service_request;

pub use access_log::Entity as AccessLog;
pub use activity_log::Entity as ActivityLog;
pub use admin::Entity as Admin;
pub use feedback::Entity as Feedback;
pub use guest::Entity as Guest;
pub use mac_address::Entity as MacAddress;
pub use notification::Entity as Notification;
pub use rfid_tag::Entity as RfidTag;
pub use room::Entity as Room;
pub use service_request::Entity as ServiceRequest;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "innkeeper".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
