//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL, with async support through `diesel-async` and `bb8`
//! connection pooling.
//!
//! The adapters stay thin: they translate between Diesel row structs and
//! domain types, and map database failures onto `RepositoryError`. Row
//! structs (`models.rs`) and table definitions (`schema.rs`) are internal
//! to this module.

mod diesel_check_in_repository;
mod diesel_friend_repository;
mod diesel_hotspot_repository;
mod diesel_notification_repository;
mod diesel_profile_repository;
mod diesel_rating_repository;
mod diesel_saved_hotspot_repository;
mod error_map;
mod models;
mod pool;
mod schema;

pub use diesel_check_in_repository::DieselCheckInRepository;
pub use diesel_friend_repository::DieselFriendRepository;
pub use diesel_hotspot_repository::DieselHotspotRepository;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_profile_repository::DieselProfileRepository;
pub use diesel_rating_repository::DieselRatingRepository;
pub use diesel_saved_hotspot_repository::DieselSavedHotspotRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
