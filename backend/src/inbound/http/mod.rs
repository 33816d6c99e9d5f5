//! HTTP adapter: handlers, DTOs, session helpers, and the error envelope.
//!
//! Every route lives under `/api/v1` and speaks camelCase JSON. Failures
//! are serialised through [`error::ApiError`], which carries the request's
//! trace id when one is in scope.

pub mod auth;
pub mod check_ins;
pub mod error;
pub mod friends;
pub mod health;
pub mod hotspots;
pub mod itinerary;
pub mod notifications;
pub mod profiles;
pub mod ratings;
pub mod session;
pub mod state;
pub mod validation;

#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;
