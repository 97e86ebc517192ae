//! # Repository Layer
//!
//! One repository per table. Each borrows any [`sea_orm::ConnectionTrait`]
//! implementor, so the same code runs against the pool or inside a
//! transaction.

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

pub use access_log::AccessLogRepository;
pub use activity_log::ActivityLogRepository;
pub use admin::AdminRepository;
pub use feedback::FeedbackRepository;
pub use guest::GuestRepository;
pub use mac_address::MacAddressRepository;
pub use notification::{NotificationDraft, NotificationRepository};
pub use rfid_tag::RfidTagRepository;
pub use room::RoomRepository;
pub use service_request::ServiceRequestRepository;
